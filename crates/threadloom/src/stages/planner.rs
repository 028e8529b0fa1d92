//! Planner stage: produce the initial week plan.
//!
//! Failure here is fatal for the run — without a plan nothing downstream
//! can execute. The stage leaves run state untouched and surfaces the error
//! to the orchestrator.

use tracing::{info, warn};

use crate::client::GenerationClient;
use crate::config::PipelineConfig;
use crate::error::StageError;
use crate::model::{RunState, WeekPlan};
use crate::prompts;
use crate::stages::format_personas;

/// Produce a `WeekPlan` for the requested week.
///
/// The requested item count is best-effort: the generation capability
/// decides how honest to be, and the stage only fails when the reply does
/// not parse into the plan schema or references unknown personas.
pub async fn plan_week(
    client: &GenerationClient,
    config: &PipelineConfig,
    state: &RunState,
) -> Result<WeekPlan, StageError> {
    let personas = format_personas(&state.personas);
    let communities = state.communities.join("\n");
    let keywords = state.target_keywords.join("\n");
    let posts_per_week = state.posts_per_week.to_string();
    let week_number = state.week_number.to_string();

    let plan: WeekPlan = client
        .invoke(
            prompts::PLANNER_TEMPLATE,
            &[
                ("company_info", state.company_info.as_str()),
                ("personas", personas.as_str()),
                ("communities", communities.as_str()),
                ("keywords", keywords.as_str()),
                ("posts_per_week", posts_per_week.as_str()),
                ("week_number", week_number.as_str()),
            ],
            config.temperatures.planner,
        )
        .await?;

    if plan.items.is_empty() {
        return Err(StageError::Schema("planner returned an empty item list".into()));
    }
    plan.validate_personas(&state.personas)?;

    if plan.items.len() != state.posts_per_week as usize {
        warn!(
            requested = state.posts_per_week,
            returned = plan.items.len(),
            "Planner returned a different item count than requested"
        );
    }
    info!(
        week = plan.week_number,
        items = plan.items.len(),
        "Planner produced week plan"
    );

    Ok(plan)
}
