//! Refinement stage: rewrite the plan to address the critic's findings.
//!
//! The iteration counter is advanced by the orchestrator before this stage
//! runs, success or not — a systematically failing refinement call must not
//! produce an infinite loop. On failure the prior plan stays in place.

use tracing::info;

use crate::client::GenerationClient;
use crate::config::PipelineConfig;
use crate::error::StageError;
use crate::model::{RunState, WeekPlan};
use crate::prompts;

/// Produce a replacement plan addressing the cited issues.
pub async fn refine_plan(
    client: &GenerationClient,
    config: &PipelineConfig,
    state: &RunState,
) -> Result<WeekPlan, StageError> {
    let plan = state
        .plan
        .as_ref()
        .ok_or_else(|| StageError::Validation("no plan available to refine".into()))?;
    let plan_json = serde_json::to_string_pretty(plan)
        .map_err(|e| StageError::Schema(format!("failed to serialize plan: {e}")))?;

    // A critique may be absent when the critic itself failed; refine against
    // empty findings rather than skipping the consumed iteration.
    let (issues, suggestions) = match &state.quality {
        Some(q) => (
            serde_json::to_string_pretty(&q.issues)
                .map_err(|e| StageError::Schema(e.to_string()))?,
            serde_json::to_string_pretty(&q.suggestions)
                .map_err(|e| StageError::Schema(e.to_string()))?,
        ),
        None => ("[]".to_string(), "[]".to_string()),
    };

    let refined: WeekPlan = client
        .invoke(
            prompts::REFINEMENT_TEMPLATE,
            &[
                ("issues", issues.as_str()),
                ("suggestions", suggestions.as_str()),
                ("plan_json", plan_json.as_str()),
                ("company_info", state.company_info.as_str()),
            ],
            config.temperatures.refinement,
        )
        .await?;

    if refined.items.is_empty() {
        return Err(StageError::Schema(
            "refinement returned an empty item list".into(),
        ));
    }
    refined.validate_personas(&state.personas)?;

    info!(
        iteration = state.refinement_iteration,
        items = refined.items.len(),
        "Plan refined"
    );

    Ok(refined)
}
