//! Domain value types shared across all stages, plus the mutable run state.
//!
//! Plans and scores are replaced wholesale by the stage that produces them —
//! nothing here is patched field-by-field. `RunState` is the single carrier
//! threaded through the orchestrator; exactly one writer is active at any
//! time under the sequential execution model.

use chrono::NaiveDateTime;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::StageError;

/// A simulated author. Immutable once supplied; referenced by username
/// everywhere else in the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Persona {
    pub username: String,
    pub name: String,
    pub background: String,
    pub style: String,
    pub expertise: String,
    #[serde(default)]
    pub quirks: Vec<String>,
    #[serde(default)]
    pub posting_patterns: String,
}

/// Intent for a single post: who posts where, about what, and who engages.
/// Represents intent only — no generated text lives here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ContentPlanItem {
    pub community: String,
    pub target_keyword: String,
    pub primary_persona: String,
    pub commenting_personas: Vec<String>,
    pub angle: String,
    pub engagement_strategy: String,
    /// `YYYY-MM-DD`
    pub scheduled_date: String,
    /// `HH:MM`
    pub scheduled_time: String,
}

/// A week's worth of planned intent, produced and replaced wholesale by the
/// planner and refinement stages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct WeekPlan {
    pub week_number: u32,
    pub start_date: String,
    pub items: Vec<ContentPlanItem>,
    #[serde(default)]
    pub quality_score: Option<f64>,
}

impl WeekPlan {
    /// Reject plans that reference personas outside the supplied roster.
    pub fn validate_personas(&self, roster: &[Persona]) -> Result<(), StageError> {
        let known = |username: &str| roster.iter().any(|p| p.username == username);
        for item in &self.items {
            if !known(&item.primary_persona) {
                return Err(StageError::Validation(format!(
                    "plan item for {} names unknown primary persona `{}`",
                    item.community, item.primary_persona
                )));
            }
            for commenter in &item.commenting_personas {
                if !known(commenter) {
                    return Err(StageError::Validation(format!(
                        "plan item for {} names unknown commenting persona `{}`",
                        item.community, commenter
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Quality assessment on five bounded dimensions plus free-text findings.
///
/// A critic call produces a fresh instance every time; scores are never
/// mutated in place. `overall` is the sole authority for the convergence
/// gate — it is reported by the critic, never recomputed from the four
/// sub-dimensions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct QualityScore {
    pub naturalness: f64,
    pub authenticity: f64,
    pub engagement_potential: f64,
    pub subtlety: f64,
    pub overall: f64,
    #[serde(default)]
    pub issues: Vec<String>,
    #[serde(default)]
    pub suggestions: Vec<String>,
}

impl QualityScore {
    /// Placeholder score attached to a bundle before the final critic runs.
    /// Intentionally "unknown ⇒ lowest score": a bundle returned after a
    /// final-critic failure reports 0 even if the content is good.
    pub fn zero() -> Self {
        Self {
            naturalness: 0.0,
            authenticity: 0.0,
            engagement_potential: 0.0,
            subtlety: 0.0,
            overall: 0.0,
            issues: Vec::new(),
            suggestions: Vec::new(),
        }
    }

    /// Force every dimension into `[0, 10]`. Critic models occasionally
    /// return out-of-range numbers; downstream code assumes the bounds hold.
    pub fn clamped(mut self) -> Self {
        for dim in [
            &mut self.naturalness,
            &mut self.authenticity,
            &mut self.engagement_potential,
            &mut self.subtlety,
            &mut self.overall,
        ] {
            *dim = dim.clamp(0.0, 10.0);
        }
        self
    }
}

/// A generated post. Created exactly once per plan item, immutable after.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub community: String,
    pub title: String,
    pub body: String,
    pub author: String,
    pub timestamp: NaiveDateTime,
    pub keyword_ids: Vec<String>,
}

/// A generated comment. Comments form a forest per post: at most one parent,
/// and the parent always belongs to the same post and was created earlier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub post_id: String,
    /// `None` ⇒ top-level comment on the post.
    pub parent_comment_id: Option<String>,
    pub text: String,
    pub author: String,
    pub timestamp: NaiveDateTime,
    /// Minutes after the post (top-level) or parent comment (threaded).
    pub delay_minutes: i64,
}

/// The terminal artifact: everything generated for the week plus its
/// quality assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedContent {
    pub posts: Vec<Post>,
    pub comments: Vec<Comment>,
    pub quality_assessment: QualityScore,
}

/// The validated inputs for one pipeline run.
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub company_info: String,
    pub personas: Vec<Persona>,
    pub communities: Vec<String>,
    pub target_keywords: Vec<String>,
    pub posts_per_week: u32,
    pub week_number: u32,
    pub max_iterations: u32,
}

impl RunRequest {
    /// Re-check the boundary contract. The request-handling collaborator
    /// validates before calling in; this is defense in depth.
    pub fn validate(&self) -> Result<(), StageError> {
        if self.personas.len() < 2 {
            return Err(StageError::Validation(format!(
                "at least 2 personas required, got {}",
                self.personas.len()
            )));
        }
        for (i, p) in self.personas.iter().enumerate() {
            if self.personas[..i].iter().any(|q| q.username == p.username) {
                return Err(StageError::Validation(format!(
                    "duplicate persona username `{}`",
                    p.username
                )));
            }
        }
        if self.communities.is_empty() {
            return Err(StageError::Validation(
                "at least one target community required".into(),
            ));
        }
        if self.target_keywords.is_empty() {
            return Err(StageError::Validation(
                "at least one target keyword required".into(),
            ));
        }
        if !(1..=15).contains(&self.posts_per_week) {
            return Err(StageError::Validation(format!(
                "posts_per_week must be 1..=15, got {}",
                self.posts_per_week
            )));
        }
        if !(1..=52).contains(&self.week_number) {
            return Err(StageError::Validation(format!(
                "week_number must be 1..=52, got {}",
                self.week_number
            )));
        }
        Ok(())
    }
}

/// Mutable carrier threaded through every stage of one run.
///
/// Created once from a validated request, updated stage-by-stage, discarded
/// after the terminal stage hands the final artifact back to the caller.
#[derive(Debug)]
pub struct RunState {
    pub company_info: String,
    pub personas: Vec<Persona>,
    pub communities: Vec<String>,
    pub target_keywords: Vec<String>,
    pub posts_per_week: u32,
    pub week_number: u32,

    pub plan: Option<WeekPlan>,
    /// Raw plan-critic payload, kept alongside the parsed score for
    /// traceability.
    pub plan_critique: Option<String>,
    pub quality: Option<QualityScore>,

    /// Monotonically non-decreasing; never exceeds `max_iterations`.
    pub refinement_iteration: u32,
    pub max_iterations: u32,

    pub generated: Option<GeneratedContent>,
    /// Raw final-critic payload.
    pub content_critique: Option<String>,
}

impl RunState {
    pub fn new(request: RunRequest) -> Self {
        Self {
            company_info: request.company_info,
            personas: request.personas,
            communities: request.communities,
            target_keywords: request.target_keywords,
            posts_per_week: request.posts_per_week,
            week_number: request.week_number,
            plan: None,
            plan_critique: None,
            quality: None,
            refinement_iteration: 0,
            max_iterations: request.max_iterations,
            generated: None,
            content_critique: None,
        }
    }

    /// Look up a persona by username.
    pub fn persona(&self, username: &str) -> Option<&Persona> {
        self.personas.iter().find(|p| p.username == username)
    }

    /// The overall score the gate decides on: latest critique, or 0 when no
    /// critique has succeeded yet.
    pub fn overall_score(&self) -> f64 {
        self.quality.as_ref().map(|q| q.overall).unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn persona(username: &str) -> Persona {
        Persona {
            username: username.into(),
            name: username.to_uppercase(),
            background: "ops lead at a small startup".into(),
            style: "casual, first-person".into(),
            expertise: "operations".into(),
            quirks: vec!["color-coded folders".into()],
            posting_patterns: "weekday mornings".into(),
        }
    }

    fn plan_item(primary: &str, commenters: &[&str]) -> ContentPlanItem {
        ContentPlanItem {
            community: "r/startups".into(),
            target_keyword: "deck tools".into(),
            primary_persona: primary.into(),
            commenting_personas: commenters.iter().map(|s| s.to_string()).collect(),
            angle: "late-night deck panic".into(),
            engagement_strategy: "one short agreement, one story".into(),
            scheduled_date: "2026-03-02".into(),
            scheduled_time: "09:30".into(),
        }
    }

    #[test]
    fn validate_personas_accepts_known_roster() {
        let plan = WeekPlan {
            week_number: 1,
            start_date: "2026-03-02".into(),
            items: vec![plan_item("riley", &["jordan"])],
            quality_score: None,
        };
        let roster = vec![persona("riley"), persona("jordan")];
        assert!(plan.validate_personas(&roster).is_ok());
    }

    #[test]
    fn validate_personas_rejects_unknown_commenter() {
        let plan = WeekPlan {
            week_number: 1,
            start_date: "2026-03-02".into(),
            items: vec![plan_item("riley", &["ghost"])],
            quality_score: None,
        };
        let roster = vec![persona("riley"), persona("jordan")];
        let err = plan.validate_personas(&roster).unwrap_err();
        assert!(err.to_string().contains("ghost"));
    }

    #[test]
    fn validate_personas_rejects_unknown_primary() {
        let plan = WeekPlan {
            week_number: 1,
            start_date: "2026-03-02".into(),
            items: vec![plan_item("nobody", &[])],
            quality_score: None,
        };
        assert!(plan.validate_personas(&[persona("riley")]).is_err());
    }

    #[test]
    fn quality_score_clamped_forces_bounds() {
        let score = QualityScore {
            naturalness: 12.0,
            authenticity: -3.0,
            engagement_potential: 5.5,
            subtlety: 10.0,
            overall: 11.2,
            issues: vec![],
            suggestions: vec![],
        }
        .clamped();
        assert_eq!(score.naturalness, 10.0);
        assert_eq!(score.authenticity, 0.0);
        assert_eq!(score.engagement_potential, 5.5);
        assert_eq!(score.overall, 10.0);
    }

    #[test]
    fn zero_score_is_all_zero() {
        let score = QualityScore::zero();
        assert_eq!(score.overall, 0.0);
        assert_eq!(score.naturalness, 0.0);
        assert!(score.issues.is_empty());
    }

    #[test]
    fn run_request_validation_bounds() {
        let base = RunRequest {
            company_info: "a tool".into(),
            personas: vec![persona("riley"), persona("jordan")],
            communities: vec!["r/startups".into()],
            target_keywords: vec!["deck tools".into()],
            posts_per_week: 3,
            week_number: 1,
            max_iterations: 2,
        };
        assert!(base.validate().is_ok());

        let mut too_few = base.clone();
        too_few.personas.truncate(1);
        assert!(too_few.validate().is_err());

        let mut dup = base.clone();
        dup.personas.push(persona("riley"));
        assert!(dup.validate().is_err());

        let mut many_posts = base.clone();
        many_posts.posts_per_week = 16;
        assert!(many_posts.validate().is_err());

        let mut bad_week = base.clone();
        bad_week.week_number = 53;
        assert!(bad_week.validate().is_err());

        let mut no_keywords = base;
        no_keywords.target_keywords.clear();
        assert!(no_keywords.validate().is_err());
    }

    #[test]
    fn overall_score_defaults_to_zero_without_critique() {
        let state = RunState::new(RunRequest {
            company_info: "a tool".into(),
            personas: vec![persona("riley"), persona("jordan")],
            communities: vec!["r/startups".into()],
            target_keywords: vec!["deck tools".into()],
            posts_per_week: 1,
            week_number: 1,
            max_iterations: 2,
        });
        assert_eq!(state.overall_score(), 0.0);
        assert_eq!(state.refinement_iteration, 0);
    }

    #[test]
    fn generated_content_serde_roundtrip() {
        let content = GeneratedContent {
            posts: vec![Post {
                id: "P1".into(),
                community: "r/startups".into(),
                title: "anyone else dread deck week".into(),
                body: "somehow I became the slides person".into(),
                author: "riley".into(),
                timestamp: NaiveDateTime::parse_from_str("2026-03-02 09:30", "%Y-%m-%d %H:%M")
                    .unwrap(),
                keyword_ids: vec!["deck tools".into()],
            }],
            comments: vec![Comment {
                id: "C1".into(),
                post_id: "P1".into(),
                parent_comment_id: None,
                text: "same here tbh".into(),
                author: "jordan".into(),
                timestamp: NaiveDateTime::parse_from_str("2026-03-02 10:15", "%Y-%m-%d %H:%M")
                    .unwrap(),
                delay_minutes: 45,
            }],
            quality_assessment: QualityScore::zero(),
        };

        let json = serde_json::to_string(&content).unwrap();
        let restored: GeneratedContent = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, content);
    }
}
