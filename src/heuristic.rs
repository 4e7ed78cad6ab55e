//! heuristic.rs — Deterministic, call-free scorer used when every model
//! provider is unavailable or returned garbage. By contract it cannot fail,
//! so it is the correctness backstop of the evaluator: callers always get a
//! usable `EvaluationResult` out of it.

use crate::types::{ContentType, EvalSource, EvaluationResult};

/// Phrases indicating a job posting. Case-insensitive substring match.
const JOB_KEYWORDS: &[&str] = &[
    "hiring",
    "job opening",
    "we're hiring",
    "join our team",
    "position",
    "vacancy",
    "career",
    "opportunity",
    "apply now",
    "looking for",
    "seeking",
    "recruitment",
    "job opportunity",
];

/// Phrases indicating the author is explicitly inviting engagement.
const ENGAGEMENT_KEYWORDS: &[&str] = &[
    "what do you think",
    "your thoughts",
    "comment below",
    "share your",
    "let me know",
    "interested",
];

/// Words that mark substantive, experience-driven writing.
const SUBSTANCE_KEYWORDS: &[&str] = &["insights", "lessons", "experience"];

/// Score `text` without any external call.
///
/// Base scores are 5/4 (like/comment); job posts get 7/9, engagement prompts
/// 6/7. Longer texts and substance keywords add up to +3 to the like score.
/// Both scores are capped at 10. Hashtags participate in keyword detection
/// alongside the body text.
pub fn heuristic_evaluate(text: &str, hashtags: &[String]) -> EvaluationResult {
    let mut haystack = text.to_lowercase();
    for tag in hashtags {
        haystack.push(' ');
        haystack.push_str(&tag.to_lowercase());
    }

    let is_job = contains_any(&haystack, JOB_KEYWORDS);
    let wants_engagement = contains_any(&haystack, ENGAGEMENT_KEYWORDS);

    let (mut like, comment): (u8, u8) = if is_job {
        (7, 9)
    } else if wants_engagement {
        (6, 7)
    } else {
        (5, 4)
    };

    let chars = text.chars().count();
    if chars > 500 {
        like += 1;
    }
    if chars > 1000 {
        like += 1;
    }
    if contains_any(&haystack, SUBSTANCE_KEYWORDS) {
        like += 1;
    }

    let content_type = if is_job { ContentType::Job } else { ContentType::Other };
    let mut out = EvaluationResult::new(like.min(10), comment.min(10), EvalSource::Heuristic)
        .with_content_type(content_type)
        .with_reasoning("heuristic evaluation");
    out.is_job_post = is_job;
    out
}

fn contains_any(haystack_lower: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack_lower.contains(n))
}
