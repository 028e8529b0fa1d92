//! Content generation stage: expand an approved plan into posts and
//! threaded comments.
//!
//! The stage's defining property is per-item fault isolation. A failed
//! comment is logged and skipped without touching its siblings; a failed
//! post drops that item's post and planned comments but never the remaining
//! items. A run degrades to partial output instead of failing atomically.
//!
//! The bundle leaves this stage carrying an all-zero placeholder score that
//! the final critic overwrites.

use std::collections::VecDeque;

use chrono::{Duration, NaiveDateTime};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use schemars::JsonSchema;
use serde::Deserialize;
use tracing::{info, warn};

use crate::client::GenerationClient;
use crate::config::PipelineConfig;
use crate::error::StageError;
use crate::model::{Comment, ContentPlanItem, GeneratedContent, Persona, Post, QualityScore, RunState};
use crate::prompts;
use crate::stages::format_quirks;

/// Source of the comment-threading coin flip.
///
/// Injectable so tests can force either branch deterministically.
pub trait ThreadDice: Send {
    /// Whether the next eligible comment threads under the most recent
    /// comment instead of attaching top-level.
    fn should_thread(&mut self) -> bool;
}

/// Production dice: an even coin flip per eligible comment.
pub struct RandomDice(StdRng);

impl RandomDice {
    pub fn new() -> Self {
        Self(StdRng::from_entropy())
    }

    /// Seeded variant for reproducible runs.
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl Default for RandomDice {
    fn default() -> Self {
        Self::new()
    }
}

impl ThreadDice for RandomDice {
    fn should_thread(&mut self) -> bool {
        self.0.gen_bool(0.5)
    }
}

/// Scripted dice for deterministic replay. Returns `false` (top-level) once
/// the script is exhausted.
pub struct SequenceDice {
    choices: VecDeque<bool>,
}

impl SequenceDice {
    pub fn new(choices: impl IntoIterator<Item = bool>) -> Self {
        Self {
            choices: choices.into_iter().collect(),
        }
    }
}

impl ThreadDice for SequenceDice {
    fn should_thread(&mut self) -> bool {
        self.choices.pop_front().unwrap_or(false)
    }
}

/// Shape the post generator returns.
#[derive(Debug, Deserialize, JsonSchema)]
struct PostDraft {
    title: String,
    body: String,
}

/// Shape the comment generator returns.
#[derive(Debug, Deserialize, JsonSchema)]
struct CommentDraft {
    text: String,
    delay_minutes: i64,
}

/// Expand the approved plan into a content bundle, in plan order.
pub async fn generate_content(
    client: &GenerationClient,
    config: &PipelineConfig,
    state: &RunState,
    dice: &mut dyn ThreadDice,
) -> Result<GeneratedContent, StageError> {
    let plan = state
        .plan
        .as_ref()
        .ok_or_else(|| StageError::Validation("no approved plan to generate from".into()))?;

    let mut posts: Vec<Post> = Vec::new();
    let mut comments: Vec<Comment> = Vec::new();

    for (index, item) in plan.items.iter().enumerate() {
        let item_no = index + 1;
        let Some(author) = state.persona(&item.primary_persona) else {
            warn!(
                persona = %item.primary_persona,
                community = %item.community,
                "Unknown primary persona — skipping plan item"
            );
            continue;
        };
        let post_time = match parse_schedule(&item.scheduled_date, &item.scheduled_time) {
            Ok(t) => t,
            Err(e) => {
                warn!(error = %e, community = %item.community, "Unparseable schedule — skipping plan item");
                continue;
            }
        };

        let draft = match generate_post(client, config, state, item, author).await {
            Ok(d) => d,
            Err(e) => {
                warn!(
                    error = %e,
                    item = item_no,
                    community = %item.community,
                    "Post generation failed — skipping item and its planned comments"
                );
                continue;
            }
        };

        let post = Post {
            id: format!("P{item_no}"),
            community: item.community.clone(),
            title: draft.title,
            body: draft.body,
            author: author.username.clone(),
            timestamp: post_time,
            keyword_ids: vec![item.target_keyword.clone()],
        };
        info!(post = %post.id, community = %post.community, author = %post.author, "Post created");

        for (slot, username) in item.commenting_personas.iter().enumerate() {
            let Some(commenter) = state.persona(username) else {
                warn!(persona = %username, post = %post.id, "Unknown commenting persona — skipping comment");
                continue;
            };

            // From the second commenting slot onward, thread under the most
            // recent comment on this post half the time. The dice is only
            // consulted when a threading candidate actually exists.
            let parent = if slot > 0 {
                latest_comment(&comments, &post.id)
                    .filter(|_| dice.should_thread())
                    .map(|c| (c.id.clone(), c.text.clone(), c.timestamp))
            } else {
                None
            };

            let draft = match generate_comment(
                client,
                config,
                state,
                item,
                &post,
                commenter,
                parent.as_ref().map(|(_, text, _)| text.as_str()),
            )
            .await
            {
                Ok(d) => d,
                Err(e) => {
                    warn!(
                        error = %e,
                        post = %post.id,
                        persona = %username,
                        "Comment generation failed — skipping comment"
                    );
                    continue;
                }
            };

            let delay = draft
                .delay_minutes
                .clamp(config.min_comment_delay_minutes, config.max_comment_delay_minutes);
            let anchor = parent.as_ref().map(|(_, _, ts)| *ts).unwrap_or(post.timestamp);
            let comment = Comment {
                id: format!("C{}", comments.len() + 1),
                post_id: post.id.clone(),
                parent_comment_id: parent.map(|(id, _, _)| id),
                text: draft.text,
                author: commenter.username.clone(),
                timestamp: anchor + Duration::minutes(delay),
                delay_minutes: delay,
            };
            info!(comment = %comment.id, post = %post.id, author = %comment.author, threaded = comment.parent_comment_id.is_some(), "Comment created");
            comments.push(comment);
        }

        posts.push(post);
    }

    info!(
        posts = posts.len(),
        comments = comments.len(),
        "Content generation complete"
    );

    Ok(GeneratedContent {
        posts,
        comments,
        quality_assessment: QualityScore::zero(),
    })
}

async fn generate_post(
    client: &GenerationClient,
    config: &PipelineConfig,
    state: &RunState,
    item: &ContentPlanItem,
    author: &Persona,
) -> Result<PostDraft, StageError> {
    let quirks = format_quirks(author);
    client
        .invoke(
            prompts::POST_TEMPLATE,
            &[
                ("persona_username", author.username.as_str()),
                ("persona_background", author.background.as_str()),
                ("persona_style", author.style.as_str()),
                ("persona_expertise", author.expertise.as_str()),
                ("persona_quirks", quirks.as_str()),
                ("community", item.community.as_str()),
                ("angle", item.angle.as_str()),
                ("target_keyword", item.target_keyword.as_str()),
                ("company_info", state.company_info.as_str()),
            ],
            config.temperatures.content,
        )
        .await
}

#[allow(clippy::too_many_arguments)]
async fn generate_comment(
    client: &GenerationClient,
    config: &PipelineConfig,
    state: &RunState,
    item: &ContentPlanItem,
    post: &Post,
    commenter: &Persona,
    parent_text: Option<&str>,
) -> Result<CommentDraft, StageError> {
    let parent = parent_text.unwrap_or("None (top-level comment)");
    client
        .invoke(
            prompts::COMMENT_TEMPLATE,
            &[
                ("post_title", post.title.as_str()),
                ("post_body", post.body.as_str()),
                ("post_author", post.author.as_str()),
                ("commenter_username", commenter.username.as_str()),
                ("commenter_background", commenter.background.as_str()),
                ("commenter_style", commenter.style.as_str()),
                ("parent_comment", parent),
                ("company_info", state.company_info.as_str()),
                ("engagement_strategy", item.engagement_strategy.as_str()),
            ],
            config.temperatures.content,
        )
        .await
}

fn parse_schedule(date: &str, time: &str) -> Result<NaiveDateTime, StageError> {
    NaiveDateTime::parse_from_str(&format!("{date} {time}"), "%Y-%m-%d %H:%M")
        .map_err(|e| StageError::Schema(format!("bad scheduled date/time `{date} {time}`: {e}")))
}

/// The most recent comment already created for a post, if any.
fn latest_comment<'a>(comments: &'a [Comment], post_id: &str) -> Option<&'a Comment> {
    comments.iter().rev().find(|c| c.post_id == post_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_schedule_accepts_plan_format() {
        let t = parse_schedule("2026-03-02", "09:30").unwrap();
        assert_eq!(t.format("%Y-%m-%d %H:%M").to_string(), "2026-03-02 09:30");
    }

    #[test]
    fn parse_schedule_rejects_garbage() {
        assert!(parse_schedule("next tuesday", "morning").is_err());
        assert!(parse_schedule("2026-03-02", "9am").is_err());
    }

    #[test]
    fn sequence_dice_replays_script_then_defaults_to_top_level() {
        let mut dice = SequenceDice::new([true, false]);
        assert!(dice.should_thread());
        assert!(!dice.should_thread());
        assert!(!dice.should_thread());
    }

    #[test]
    fn seeded_dice_is_reproducible() {
        let mut a = RandomDice::seeded(42);
        let mut b = RandomDice::seeded(42);
        for _ in 0..16 {
            assert_eq!(a.should_thread(), b.should_thread());
        }
    }

    #[test]
    fn latest_comment_is_scoped_to_the_post() {
        let ts = NaiveDateTime::parse_from_str("2026-03-02 10:00", "%Y-%m-%d %H:%M").unwrap();
        let comment = |id: &str, post_id: &str| Comment {
            id: id.into(),
            post_id: post_id.into(),
            parent_comment_id: None,
            text: "+1".into(),
            author: "jordan".into(),
            timestamp: ts,
            delay_minutes: 30,
        };
        let comments = vec![comment("C1", "P1"), comment("C2", "P2"), comment("C3", "P1")];
        assert_eq!(latest_comment(&comments, "P1").unwrap().id, "C3");
        assert_eq!(latest_comment(&comments, "P2").unwrap().id, "C2");
        assert!(latest_comment(&comments, "P3").is_none());
    }

    #[test]
    fn comment_draft_ignores_extra_fields() {
        let draft: CommentDraft = serde_json::from_str(
            r#"{"text": "same here", "delay_minutes": 45,
                "engagement_type": "agreement", "reasoning": "short and casual"}"#,
        )
        .unwrap();
        assert_eq!(draft.delay_minutes, 45);
    }
}
