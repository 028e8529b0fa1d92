//! Pipeline state machine — explicit states and legal transition guards.
//!
//! The orchestrator drives a directed graph with exactly one conditional
//! branch: after a plan critique, the convergence gate chooses between
//! refining the plan and generating content. Modelling the graph as a typed
//! state machine makes every transition auditable and catches illegal jumps.

use std::fmt;
use std::time::Instant;

use serde::{Deserialize, Serialize};

/// The set of pipeline states.
///
/// Every run starts at `Planning` and terminates at `Completed` or `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    /// Producing the initial week plan.
    Planning,
    /// Scoring the current plan against naturalness heuristics.
    CritiquingPlan,
    /// Rewriting the plan from critique feedback.
    RefiningPlan,
    /// Expanding the approved plan into posts and comments.
    GeneratingContent,
    /// Scoring the finished bundle.
    FinalReview,
    /// Final content produced — terminal state.
    Completed,
    /// Unrecoverable fault — terminal state.
    Failed,
}

impl PipelineState {
    /// Whether this is a terminal state (no further transitions allowed).
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Planning => write!(f, "Planning"),
            Self::CritiquingPlan => write!(f, "CritiquingPlan"),
            Self::RefiningPlan => write!(f, "RefiningPlan"),
            Self::GeneratingContent => write!(f, "GeneratingContent"),
            Self::FinalReview => write!(f, "FinalReview"),
            Self::Completed => write!(f, "Completed"),
            Self::Failed => write!(f, "Failed"),
        }
    }
}

/// Legal transitions between pipeline states.
///
/// ```text
/// Planning → CritiquingPlan
/// CritiquingPlan → RefiningPlan | GeneratingContent
/// RefiningPlan → CritiquingPlan
/// GeneratingContent → FinalReview
/// FinalReview → Completed
/// ```
fn is_legal_transition(from: PipelineState, to: PipelineState) -> bool {
    use PipelineState::*;

    // Any non-terminal state can transition to Failed.
    if to == Failed && !from.is_terminal() {
        return true;
    }

    matches!(
        (from, to),
        (Planning, CritiquingPlan)
            // The gate's conditional branch
            | (CritiquingPlan, RefiningPlan)
            | (CritiquingPlan, GeneratingContent)
            | (RefiningPlan, CritiquingPlan)
            | (GeneratingContent, FinalReview)
            | (FinalReview, Completed)
    )
}

/// A single recorded state transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionRecord {
    pub from: PipelineState,
    pub to: PipelineState,
    /// Refinement iteration at the time of transition.
    pub iteration: u32,
    /// Milliseconds since the state machine was created.
    pub elapsed_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Error returned when an illegal transition is attempted.
#[derive(Debug, Clone)]
pub struct IllegalTransition {
    pub from: PipelineState,
    pub to: PipelineState,
}

impl fmt::Display for IllegalTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "illegal state transition: {} → {}", self.from, self.to)
    }
}

impl std::error::Error for IllegalTransition {}

/// The pipeline state machine.
///
/// Tracks the current state, enforces legal transitions, and keeps the full
/// transition log for diagnostics.
pub struct StateMachine {
    current: PipelineState,
    iteration: u32,
    created_at: Instant,
    transitions: Vec<TransitionRecord>,
}

impl StateMachine {
    /// Create a new state machine starting at `Planning`.
    pub fn new() -> Self {
        Self {
            current: PipelineState::Planning,
            iteration: 0,
            created_at: Instant::now(),
            transitions: Vec::new(),
        }
    }

    pub fn current(&self) -> PipelineState {
        self.current
    }

    pub fn iteration(&self) -> u32 {
        self.iteration
    }

    /// Set the refinement iteration counter (called by the orchestrator).
    pub fn set_iteration(&mut self, iteration: u32) {
        self.iteration = iteration;
    }

    /// Attempt to advance to the next state.
    pub fn advance(
        &mut self,
        to: PipelineState,
        reason: Option<&str>,
    ) -> Result<(), IllegalTransition> {
        if !is_legal_transition(self.current, to) {
            return Err(IllegalTransition {
                from: self.current,
                to,
            });
        }

        let record = TransitionRecord {
            from: self.current,
            to,
            iteration: self.iteration,
            elapsed_ms: self.created_at.elapsed().as_millis() as u64,
            reason: reason.map(String::from),
        };

        tracing::debug!(
            from = %self.current,
            to = %to,
            iteration = self.iteration,
            "State transition"
        );

        self.transitions.push(record);
        self.current = to;
        Ok(())
    }

    /// Transition to `Failed` from any non-terminal state.
    pub fn fail(&mut self, reason: &str) -> Result<(), IllegalTransition> {
        self.advance(PipelineState::Failed, Some(reason))
    }

    pub fn is_terminal(&self) -> bool {
        self.current.is_terminal()
    }

    pub fn transitions(&self) -> &[TransitionRecord] {
        &self.transitions
    }

    /// One-line history summary for run logs.
    pub fn summary(&self) -> String {
        let states: Vec<String> = self.transitions.iter().map(|t| t.to.to_string()).collect();
        format!(
            "{} → {} ({}ms, {} transitions)",
            PipelineState::Planning,
            self.current,
            self.created_at.elapsed().as_millis(),
            self.transitions.len(),
        ) + if states.is_empty() {
            String::new()
        } else {
            format!(" [{}]", states.join(" → "))
        }
        .as_str()
    }
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}
