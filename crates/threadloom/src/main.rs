//! Demo binary: run the pipeline against the configured endpoint with a
//! built-in sample roster and write the bundle to disk as JSON.

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use threadloom::{Orchestrator, Persona, PipelineConfig, RunRequest};

#[derive(Parser, Debug)]
#[command(name = "threadloom", about = "Generate a simulated weekly content calendar")]
struct Args {
    /// Number of posts to plan for the week.
    #[arg(long, default_value_t = 3)]
    posts_per_week: u32,

    /// Week number to plan (1..=52).
    #[arg(long, default_value_t = 1)]
    week: u32,

    /// Refinement iteration ceiling.
    #[arg(long, default_value_t = 2)]
    max_iterations: u32,

    /// Output path for the generated bundle.
    #[arg(long, default_value = "content_calendar.json")]
    output: String,

    /// Seed for the comment-threading dice (reproducible runs).
    #[arg(long)]
    seed: Option<u64>,
}

fn sample_personas() -> Vec<Persona> {
    vec![
        Persona {
            username: "riley_ops".into(),
            name: "Riley Hart".into(),
            background: "Head of operations at a SaaS startup, accidental owner of every board deck".into(),
            style: "Professional but candid, shares what went wrong".into(),
            expertise: "Operations, presentations, board reporting".into(),
            quirks: vec![
                "Miro boards for everything".into(),
                "color-coded folders".into(),
            ],
            posting_patterns: "Weekday mornings before standup".into(),
        },
        Persona {
            username: "jordan_consults".into(),
            name: "Jordan Brooks".into(),
            background: "Independent consultant for early-stage founders".into(),
            style: "Thoughtful, narrative-first, war stories".into(),
            expertise: "Strategy, competitive analysis, storytelling".into(),
            quirks: vec![
                "keeps an archive of favorite decks".into(),
                "writes at a cafe".into(),
            ],
            posting_patterns: "Evenings and weekends".into(),
        },
        Persona {
            username: "emily_econ".into(),
            name: "Emily Chen".into(),
            background: "Economics major juggling group projects and a part-time job".into(),
            style: "Practical, tired, a little self-deprecating".into(),
            expertise: "Academic presentations, research summaries".into(),
            quirks: vec!["outlines everything in a doc first".into()],
            posting_patterns: "Late nights near deadlines".into(),
        },
    ]
}

const SAMPLE_COMPANY: &str = "Outlinely is an AI-assisted tool that turns written \
outlines into structured slide decks. Users paste content, pick a style, and \
export to PowerPoint, Google Slides, or PDF. Target users: startup operators, \
consultants, and educators.";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = Args::parse();
    let config = PipelineConfig::default();
    info!(
        endpoint = %config.endpoint.url,
        model = %config.endpoint.model,
        "Starting content pipeline"
    );

    let request = RunRequest {
        company_info: SAMPLE_COMPANY.into(),
        personas: sample_personas(),
        communities: vec![
            "r/startups".into(),
            "r/consulting".into(),
            "r/productivity".into(),
        ],
        target_keywords: vec![
            "presentation tools".into(),
            "pitch deck help".into(),
            "slide design tips".into(),
        ],
        posts_per_week: args.posts_per_week,
        week_number: args.week,
        max_iterations: args.max_iterations,
    };

    let orchestrator = Orchestrator::from_config(config)?;
    let content = match args.seed {
        Some(seed) => {
            let mut dice = threadloom::RandomDice::seeded(seed);
            orchestrator.run_with_dice(request, &mut dice).await?
        }
        None => orchestrator.run(request).await?,
    };

    let json = serde_json::to_string_pretty(&content)?;
    std::fs::write(&args.output, json)
        .with_context(|| format!("failed to write {}", args.output))?;

    info!(
        output = %args.output,
        posts = content.posts.len(),
        comments = content.comments.len(),
        overall = content.quality_assessment.overall,
        "Calendar written"
    );
    Ok(())
}
