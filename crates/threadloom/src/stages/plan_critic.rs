//! Plan critic stage: score the current plan.
//!
//! Returns the parsed score together with the raw critique payload; the
//! orchestrator records both on the run state. A failure here is a
//! transient fault the orchestrator absorbs — the previous score (if any)
//! is retained and the gate treats the failed call as "no improvement",
//! which still consumes one refinement opportunity.

use tracing::info;

use crate::client::GenerationClient;
use crate::config::PipelineConfig;
use crate::error::StageError;
use crate::model::{QualityScore, RunState};
use crate::prompts;

/// Score the current plan. Returns `(score, raw_payload)`.
pub async fn critique_plan(
    client: &GenerationClient,
    config: &PipelineConfig,
    state: &RunState,
) -> Result<(QualityScore, String), StageError> {
    let plan = state
        .plan
        .as_ref()
        .ok_or_else(|| StageError::Validation("no plan available to critique".into()))?;
    let plan_json = serde_json::to_string_pretty(plan)
        .map_err(|e| StageError::Schema(format!("failed to serialize plan: {e}")))?;

    let (score, raw) = client
        .invoke_with_raw::<QualityScore>(
            prompts::PLAN_CRITIC_TEMPLATE,
            &[
                ("plan_json", plan_json.as_str()),
                ("company_info", state.company_info.as_str()),
            ],
            config.temperatures.plan_critic,
        )
        .await?;
    let score = score.clamped();

    info!(
        overall = score.overall,
        issues = score.issues.len(),
        iteration = state.refinement_iteration,
        "Plan critique complete"
    );

    Ok((score, raw))
}
