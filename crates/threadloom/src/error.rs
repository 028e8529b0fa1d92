//! Pipeline error taxonomy with stage attribution and absorption policy.
//!
//! Every fault in the pipeline is one of three kinds, and every fault is
//! attributed to the stage that produced it. The orchestrator consults
//! `Stage::absorbs_failure()` to decide whether a fault aborts the run.
//!
//! ## Absorption table
//!
//! | Stage             | On failure                                          |
//! |-------------------|-----------------------------------------------------|
//! | Intake            | fatal — request never entered the pipeline          |
//! | Planner           | fatal — no plan, nothing downstream can run         |
//! | PlanCritic        | absorbed — prior score kept, loop budget still ticks|
//! | Refinement        | absorbed — prior plan kept, iteration still advances|
//! | ContentGeneration | fatal at stage level; per-item and per-comment      |
//! |                   | faults are skipped inside the stage                 |
//! | FinalCritic       | absorbed — bundle keeps its placeholder score       |

use std::fmt;

use thiserror::Error;

/// The pipeline stages, used for error attribution and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Boundary validation of the incoming request.
    Intake,
    /// Producing the initial week plan.
    Planner,
    /// Scoring the current plan.
    PlanCritic,
    /// Rewriting the plan from critique feedback.
    Refinement,
    /// Expanding the plan into posts and comments.
    ContentGeneration,
    /// Scoring the finished content bundle.
    FinalCritic,
}

impl Stage {
    /// Whether the orchestrator absorbs a failure from this stage instead of
    /// aborting the run. A single flaky critic or refinement call must never
    /// kill an otherwise-successful run.
    pub fn absorbs_failure(self) -> bool {
        matches!(self, Self::PlanCritic | Self::Refinement | Self::FinalCritic)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Intake => write!(f, "intake"),
            Self::Planner => write!(f, "planner"),
            Self::PlanCritic => write!(f, "plan_critic"),
            Self::Refinement => write!(f, "refinement"),
            Self::ContentGeneration => write!(f, "content_generation"),
            Self::FinalCritic => write!(f, "final_critic"),
        }
    }
}

/// A fault produced inside a single stage, before stage attribution.
#[derive(Debug, Error)]
pub enum StageError {
    /// The external generation capability was unreachable or errored.
    #[error("generation backend failed: {0}")]
    Generation(String),

    /// The capability answered, but the payload did not match the expected
    /// structured shape.
    #[error("schema mismatch: {0}")]
    Schema(String),

    /// A business-rule violation, e.g. an unknown persona reference inside
    /// a plan item.
    #[error("validation failed: {0}")]
    Validation(String),
}

/// The single structured failure surfaced to the caller: which stage failed
/// and why. Absorbed faults never become a `PipelineError`.
#[derive(Debug, Error)]
#[error("pipeline failed in {stage} stage: {source}")]
pub struct PipelineError {
    pub stage: Stage,
    #[source]
    pub source: StageError,
}

impl PipelineError {
    pub fn at(stage: Stage, source: StageError) -> Self {
        Self { stage, source }
    }
}
