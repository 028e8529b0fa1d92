//! Pipeline stages. Each stage is a free async function taking the
//! generation client, the pipeline config, and (a view of) the run state,
//! and returning its artifact or a `StageError`. Stages never mutate run
//! state themselves — the orchestrator owns every write.

pub mod content;
pub mod final_critic;
pub mod plan_critic;
pub mod planner;
pub mod refinement;

use crate::model::Persona;

/// Render the persona roster the way the planner prompt expects it.
pub(crate) fn format_personas(personas: &[Persona]) -> String {
    personas
        .iter()
        .map(|p| {
            format!(
                "Username: {}\nName: {}\nBackground: {}\nStyle: {}\nExpertise: {}\nPosting patterns: {}",
                p.username, p.name, p.background, p.style, p.expertise, p.posting_patterns
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Render a persona's quirks for a generation prompt.
pub(crate) fn format_quirks(persona: &Persona) -> String {
    if persona.quirks.is_empty() {
        "natural, human".to_string()
    } else {
        persona.quirks.join(", ")
    }
}
