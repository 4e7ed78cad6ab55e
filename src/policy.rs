//! policy.rs — Pure decision logic mapping evaluations (posts) or raw text
//! (replies to our comments) onto action decisions. No I/O, suitable for
//! unit tests and offline evaluation.
//!
//! The post variant is threshold-driven; the reply variant applies priority
//! rules directly on the text. A question always wins, even when phrased as
//! a thank-you.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::Thresholds;
use crate::prefilter::AFFIRMATION_GLYPHS;
use crate::types::{ActionDecision, ActionLabel, ContentType, EvaluationResult};

/// Word-boundary match for question-lead words and phrases, so "sandwiches"
/// does not read as "which".
static QUESTION_LEAD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(what|when|where|why|how|which|who|can you|could you|would you|do you|does|is it|are you|will you)\b",
    )
    .expect("valid question-lead regex")
});

/// Thank-you markers for replies. Substring match; "thank" also covers
/// "thanks" and "thank you".
const REPLY_THANKS: &[&str] = &["thank", "appreciated"];

/// Replies under this length can be classed as plain acknowledgments.
const REPLY_ACK_MAX_CHARS: usize = 40;

/// Replies above this length are worth a substantive answer.
const REPLY_DISCUSSION_MIN_CHARS: usize = 50;

/// Map a post evaluation onto an action decision.
///
/// Likes fire at `like_score >= thresholds.like`; comments at
/// `comment_score >= thresholds.comment`, or at the lower
/// `thresholds.job_comment` when the post is a job posting. The policy treats
/// model and heuristic evaluations identically.
pub fn decide_post_action(eval: &EvaluationResult, thresholds: &Thresholds) -> ActionDecision {
    let should_like = eval.like_score >= thresholds.like;
    let should_comment = eval.comment_score >= thresholds.comment
        || (eval.is_job_post && eval.comment_score >= thresholds.job_comment);

    let label = if should_comment {
        ActionLabel::LikeAndComment
    } else if should_like {
        ActionLabel::LikeOnly
    } else {
        ActionLabel::Skip
    };

    ActionDecision {
        should_like,
        should_comment,
        should_reply: false,
        generated_text: None,
        label,
        content_type: eval.content_type,
    }
}

/// Classify a reply to one of our comments and decide how to respond.
///
/// Priority order:
/// 1. question (`?` or a question-lead word) → like + reply, overrides all;
/// 2. short thank-you → like only;
/// 3. longer than 50 chars → like + reply as a discussion;
/// 4. anything else short → like only.
///
/// `generated_text` is left empty here; the engine requests it from the
/// text-generation collaborator whenever `should_reply` survives gating.
pub fn analyze_reply(text: &str) -> ActionDecision {
    let trimmed = text.trim();

    if is_question(trimmed) {
        return ActionDecision::like_and_reply(ContentType::Question);
    }

    let chars = trimmed.chars().count();
    if chars < REPLY_ACK_MAX_CHARS && contains_thanks(trimmed) {
        return ActionDecision::like_only(ContentType::Acknowledgment);
    }

    if chars > REPLY_DISCUSSION_MIN_CHARS {
        return ActionDecision::like_and_reply(ContentType::Discussion);
    }

    ActionDecision::like_only(ContentType::Acknowledgment)
}

fn is_question(text: &str) -> bool {
    text.contains('?') || QUESTION_LEAD.is_match(text)
}

fn contains_thanks(text: &str) -> bool {
    let lower = text.to_lowercase();
    REPLY_THANKS.iter().any(|p| lower.contains(p))
        || AFFIRMATION_GLYPHS.iter().any(|g| text.contains(g))
}
