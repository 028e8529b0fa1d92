//! Final critic stage: score the fully generated bundle.
//!
//! Failure here is absorbed by the orchestrator: generation succeeded even
//! if scoring did not, so the bundle goes back to the caller with its
//! all-zero placeholder instead of failing the run.

use tracing::info;

use crate::client::GenerationClient;
use crate::config::PipelineConfig;
use crate::error::StageError;
use crate::model::{GeneratedContent, QualityScore};
use crate::prompts;

/// Assess the whole bundle. Returns `(score, raw_payload)`.
pub async fn assess_content(
    client: &GenerationClient,
    config: &PipelineConfig,
    content: &GeneratedContent,
) -> Result<(QualityScore, String), StageError> {
    let posts_json = serde_json::to_string_pretty(&content.posts)
        .map_err(|e| StageError::Schema(format!("failed to serialize posts: {e}")))?;
    let comments_json = serde_json::to_string_pretty(&content.comments)
        .map_err(|e| StageError::Schema(format!("failed to serialize comments: {e}")))?;

    let (score, raw) = client
        .invoke_with_raw::<QualityScore>(
            prompts::FINAL_CRITIC_TEMPLATE,
            &[
                ("posts_json", posts_json.as_str()),
                ("comments_json", comments_json.as_str()),
            ],
            config.temperatures.final_critic,
        )
        .await?;
    let score = score.clamped();

    info!(
        overall = score.overall,
        naturalness = score.naturalness,
        subtlety = score.subtlety,
        "Final assessment complete"
    );

    Ok((score, raw))
}
