//! prefilter.rs — Cheap acknowledgment gate that short-circuits evaluation
//! for trivially low-value replies ("thanks", "congrats", a lone 👍).
//!
//! Cost avoidance, not correctness: a false negative just falls through to
//! the full evaluator.

/// Thank-you / congratulation phrases, matched as case-insensitive substrings.
pub(crate) const ACK_PHRASES: &[&str] = &[
    "thank you",
    "thanks",
    "thank u",
    "ty",
    "thx",
    "congratulations",
    "congrats",
    "congratulation",
    "well done",
];

/// Emoji commonly used as a stand-alone affirmation.
pub(crate) const AFFIRMATION_GLYPHS: &[&str] = &["👍", "🙏", "💯", "🎉", "❤️", "🔥", "✅"];

/// Length/word bounds under which a reply can qualify as a pure acknowledgment.
pub const ACK_MAX_CHARS: usize = 40;
pub const ACK_MAX_WORDS: usize = 3;

/// Decide whether `text` is a pure acknowledgment not worth evaluating.
///
/// Rules, in order:
/// 1. A question mark disqualifies, no matter how short the text is.
/// 2. Under 40 chars *and* at most 3 whitespace-separated words *and* any
///    acknowledgment phrase or affirmation glyph appears → trivial.
/// 3. Everything else is not trivial.
pub fn is_trivial_acknowledgment(text: &str) -> bool {
    is_trivial_acknowledgment_with(text, ACK_MAX_CHARS, ACK_MAX_WORDS)
}

/// Same check with configurable bounds (see `config::EngagementConfig`).
pub fn is_trivial_acknowledgment_with(text: &str, max_chars: usize, max_words: usize) -> bool {
    let trimmed = text.trim();
    if trimmed.contains('?') {
        return false;
    }
    if trimmed.chars().count() >= max_chars {
        return false;
    }
    if trimmed.split_whitespace().count() > max_words {
        return false;
    }

    let lower = trimmed.to_lowercase();
    ACK_PHRASES.iter().any(|p| lower.contains(p))
        || AFFIRMATION_GLYPHS.iter().any(|g| trimmed.contains(g))
}
