//! threadloom — LLM-driven planner/critic pipeline for simulated social
//! content calendars.
//!
//! The pipeline plans a week of posting intent, critiques the plan against
//! naturalness heuristics, refines it under a bounded iteration budget,
//! expands the approved plan into posts and threaded comments, and runs a
//! final quality assessment over the bundle. Every stage delegates text
//! generation to an external capability behind `client::CompletionBackend`.

pub mod client;
pub mod config;
pub mod error;
pub mod gate;
pub mod model;
pub mod orchestrator;
pub mod prompts;
pub mod stages;
pub mod state_machine;

pub use client::{CompletionBackend, GenerationClient, HttpBackend};
pub use config::{Endpoint, PipelineConfig, StageTemperatures};
pub use error::{PipelineError, Stage, StageError};
pub use gate::GateDecision;
pub use model::{
    Comment, ContentPlanItem, GeneratedContent, Persona, Post, QualityScore, RunRequest, RunState,
    WeekPlan,
};
pub use orchestrator::Orchestrator;
pub use stages::content::{RandomDice, SequenceDice, ThreadDice};
pub use state_machine::{PipelineState, StateMachine};
