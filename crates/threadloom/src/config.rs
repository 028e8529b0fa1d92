use std::time::Duration;

use serde::Deserialize;

/// Generation endpoint configuration (OpenAI-compatible chat completions).
#[derive(Debug, Clone, Deserialize)]
pub struct Endpoint {
    pub url: String,
    pub model: String,
    pub api_key: String,
}

impl Default for Endpoint {
    fn default() -> Self {
        Self {
            url: std::env::var("THREADLOOM_LLM_URL")
                .unwrap_or_else(|_| "http://localhost:8080/v1".into()),
            model: std::env::var("THREADLOOM_LLM_MODEL")
                .unwrap_or_else(|_| "llama-3.3-70b-versatile".into()),
            api_key: std::env::var("THREADLOOM_LLM_API_KEY")
                .unwrap_or_else(|_| "not-needed".into()),
        }
    }
}

/// Sampling temperature per call site.
///
/// Planning and refinement run warm for plan coherence with some variety,
/// content generation runs hot for linguistic diversity, critics run cold
/// for scoring stability.
#[derive(Debug, Clone)]
pub struct StageTemperatures {
    pub planner: f64,
    pub plan_critic: f64,
    pub refinement: f64,
    pub content: f64,
    pub final_critic: f64,
}

impl Default for StageTemperatures {
    fn default() -> Self {
        Self {
            planner: 0.8,
            plan_critic: 0.3,
            refinement: 0.8,
            content: 0.9,
            final_critic: 0.2,
        }
    }
}

/// Top-level pipeline configuration.
///
/// The convergence threshold and iteration ceiling live here so the gate
/// rule is configured in exactly one place.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub endpoint: Endpoint,
    /// Plan critique score at or above which the pipeline proceeds to
    /// content generation without further refinement.
    pub convergence_threshold: f64,
    /// Per-request timeout for each generation call.
    pub request_timeout: Duration,
    pub temperatures: StageTemperatures,
    /// Comment delays reported by the generator are clamped into
    /// `[min_comment_delay_minutes, max_comment_delay_minutes]`.
    pub min_comment_delay_minutes: i64,
    pub max_comment_delay_minutes: i64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            endpoint: Endpoint::default(),
            convergence_threshold: 7.5,
            request_timeout: Duration::from_secs(120),
            temperatures: StageTemperatures::default(),
            min_comment_delay_minutes: 5,
            max_comment_delay_minutes: 720,
        }
    }
}
