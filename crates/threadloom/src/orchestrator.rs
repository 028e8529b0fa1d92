//! Orchestration loop: plan → critique → (refine → critique)* → generate →
//! final review.
//!
//! The orchestrator owns the single run-state object and is the only writer
//! to it; stages compute artifacts and hand them back. Faults follow the
//! absorption table in `error`: planner and content-generation failures
//! abort the run, critic and refinement failures are absorbed so one flaky
//! call never kills an otherwise-successful run.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::client::{GenerationClient, HttpBackend};
use crate::config::PipelineConfig;
use crate::error::{PipelineError, Stage, StageError};
use crate::gate::{self, GateDecision};
use crate::model::{GeneratedContent, RunRequest, RunState};
use crate::prompts;
use crate::stages::content::{RandomDice, ThreadDice};
use crate::stages::{content, final_critic, plan_critic, planner, refinement};
use crate::state_machine::{PipelineState, StateMachine};

pub struct Orchestrator {
    client: GenerationClient,
    config: PipelineConfig,
}

impl Orchestrator {
    pub fn new(client: GenerationClient, config: PipelineConfig) -> Self {
        Self { client, config }
    }

    /// Build an orchestrator wired to the configured HTTP endpoint.
    pub fn from_config(config: PipelineConfig) -> Result<Self, StageError> {
        let backend = HttpBackend::new(&config)?;
        Ok(Self::new(GenerationClient::new(Arc::new(backend)), config))
    }

    /// Run the full pipeline with entropy-seeded threading dice.
    pub async fn run(&self, request: RunRequest) -> Result<GeneratedContent, PipelineError> {
        let mut dice = RandomDice::new();
        self.run_with_dice(request, &mut dice).await
    }

    /// Run the full pipeline with caller-supplied threading dice.
    pub async fn run_with_dice(
        &self,
        request: RunRequest,
        dice: &mut dyn ThreadDice,
    ) -> Result<GeneratedContent, PipelineError> {
        request
            .validate()
            .map_err(|e| PipelineError::at(Stage::Intake, e))?;
        let mut state = RunState::new(request);
        let mut fsm = StateMachine::new();

        info!(
            week = state.week_number,
            posts = state.posts_per_week,
            max_iterations = state.max_iterations,
            prompt_version = prompts::PROMPT_VERSION,
            "Pipeline run starting"
        );

        // Planning — fatal on failure, run state untouched.
        match planner::plan_week(&self.client, &self.config, &state).await {
            Ok(plan) => state.plan = Some(plan),
            Err(e) => {
                let _ = fsm.fail("planner failed");
                error!(error = %e, summary = %fsm.summary(), "Planner failed — aborting run");
                return Err(PipelineError::at(Stage::Planner, e));
            }
        }
        advance(&mut fsm, PipelineState::CritiquingPlan, None);

        // Critique/refine loop. Terminates because every Refine decision
        // advances the iteration counter and the gate proceeds once the
        // counter reaches the ceiling.
        loop {
            match plan_critic::critique_plan(&self.client, &self.config, &state).await {
                Ok((score, raw)) => {
                    state.quality = Some(score);
                    state.plan_critique = Some(raw);
                }
                Err(e) => {
                    // Absorbed: prior score retained, and the failed call
                    // still consumes one refinement opportunity below.
                    warn!(error = %e, "Plan critic failed — retaining previous score");
                }
            }

            let overall = state.overall_score();
            match gate::decide(
                overall,
                state.refinement_iteration,
                state.max_iterations,
                self.config.convergence_threshold,
            ) {
                GateDecision::Proceed => {
                    let reason = format!(
                        "overall {overall:.1}, iteration {}/{}",
                        state.refinement_iteration, state.max_iterations
                    );
                    advance(&mut fsm, PipelineState::GeneratingContent, Some(&reason));
                    break;
                }
                GateDecision::Refine => {
                    advance(
                        &mut fsm,
                        PipelineState::RefiningPlan,
                        Some(&format!(
                            "overall {overall:.1} below {:.1}",
                            self.config.convergence_threshold
                        )),
                    );
                    // The counter advances whether or not refinement
                    // succeeds — ceiling safety over retry fairness.
                    state.refinement_iteration += 1;
                    fsm.set_iteration(state.refinement_iteration);

                    match refinement::refine_plan(&self.client, &self.config, &state).await {
                        Ok(plan) => state.plan = Some(plan),
                        Err(e) => {
                            warn!(
                                error = %e,
                                iteration = state.refinement_iteration,
                                "Refinement failed — keeping prior plan"
                            );
                        }
                    }
                    advance(&mut fsm, PipelineState::CritiquingPlan, None);
                }
            }
        }

        // Content generation — fatal on stage-level failure; per-item and
        // per-comment faults were already absorbed inside the stage.
        match content::generate_content(&self.client, &self.config, &state, dice).await {
            Ok(bundle) => state.generated = Some(bundle),
            Err(e) => {
                let _ = fsm.fail("content generation failed");
                error!(error = %e, summary = %fsm.summary(), "Content generation failed — aborting run");
                return Err(PipelineError::at(Stage::ContentGeneration, e));
            }
        }
        advance(&mut fsm, PipelineState::FinalReview, None);

        if let Some(bundle) = state.generated.take() {
            let bundle =
                match final_critic::assess_content(&self.client, &self.config, &bundle).await {
                    Ok((score, raw)) => {
                        state.content_critique = Some(raw);
                        GeneratedContent {
                            quality_assessment: score,
                            ..bundle
                        }
                    }
                    Err(e) => {
                        // Absorbed: generation succeeded even if scoring
                        // did not. The placeholder zero score stands.
                        warn!(error = %e, "Final critic failed — returning bundle with placeholder score");
                        bundle
                    }
                };
            advance(&mut fsm, PipelineState::Completed, None);
            info!(
                posts = bundle.posts.len(),
                comments = bundle.comments.len(),
                overall = bundle.quality_assessment.overall,
                summary = %fsm.summary(),
                "Pipeline run complete"
            );
            return Ok(bundle);
        }

        // Unreachable by construction: the bundle was just stored above.
        let _ = fsm.fail("run ended without a content bundle");
        Err(PipelineError::at(
            Stage::ContentGeneration,
            StageError::Validation("run ended without a content bundle".into()),
        ))
    }
}

/// Issue a transition that is legal by construction; log if it is not.
fn advance(fsm: &mut StateMachine, to: PipelineState, reason: Option<&str>) {
    if let Err(err) = fsm.advance(to, reason) {
        error!(%err, "state machine rejected transition");
    }
}
