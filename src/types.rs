//! types.rs — Core data model: content items, evaluation records, action
//! decisions and ledger entries.
//!
//! Everything downstream (policy, gate, engine) speaks these types, so the
//! invariants live here: scores are always clamped into [0,10] and every
//! evaluation carries its provenance (`source`) without behavior depending
//! on it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Where a piece of content was encountered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Post,
    Reply,
}

/// A unit of third-party text to be evaluated. Built once by the external
/// extraction collaborator, consumed once, then discarded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    /// Stable dedup key: canonical URL or a synthesized token
    /// (see `ledger::content_key`).
    pub id: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hashtags: Vec<String>,
    pub source_kind: SourceKind,
}

impl ContentItem {
    pub fn post(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            hashtags: Vec::new(),
            source_kind: SourceKind::Post,
        }
    }

    pub fn reply(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            hashtags: Vec::new(),
            source_kind: SourceKind::Reply,
        }
    }

    pub fn with_hashtags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.hashtags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Character count of the text (not bytes; hashtags excluded).
    pub fn length_chars(&self) -> usize {
        self.text.chars().count()
    }
}

/// Coarse classification of content. Serialized kebab-case; unknown wire
/// values deserialize as `Other` rather than failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContentType {
    Job,
    ThoughtLeadership,
    News,
    PersonalStory,
    Promotional,
    Question,
    Acknowledgment,
    Discussion,
    Other,
}

impl ContentType {
    /// Tolerant mapping from free-form model output.
    pub fn from_wire(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "job" => Self::Job,
            "thought-leadership" | "thought_leadership" => Self::ThoughtLeadership,
            "news" => Self::News,
            "personal-story" | "personal_story" => Self::PersonalStory,
            "promotional" => Self::Promotional,
            "question" => Self::Question,
            "acknowledgment" | "acknowledgement" => Self::Acknowledgment,
            "discussion" => Self::Discussion,
            _ => Self::Other,
        }
    }
}

impl<'de> Deserialize<'de> for ContentType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(ContentType::from_wire(&s))
    }
}

/// Provenance of an evaluation. Callers may log it but must not branch on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvalSource {
    Model,
    Heuristic,
}

/// Normalized engagement-worthiness scoring for one `ContentItem`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationResult {
    /// Always within [0,10].
    pub like_score: u8,
    /// Always within [0,10].
    pub comment_score: u8,
    pub is_job_post: bool,
    #[serde(rename = "postType")]
    pub content_type: ContentType,
    pub reasoning: String,
    pub source: EvalSource,
}

impl EvaluationResult {
    pub fn new(like_score: u8, comment_score: u8, source: EvalSource) -> Self {
        Self {
            like_score: like_score.min(10),
            comment_score: comment_score.min(10),
            is_job_post: false,
            content_type: ContentType::Other,
            reasoning: String::new(),
            source,
        }
    }

    /// Zero-engagement result for content under the length floor.
    pub fn too_short() -> Self {
        Self {
            like_score: 0,
            comment_score: 0,
            is_job_post: false,
            content_type: ContentType::Other,
            reasoning: "content too short".to_string(),
            source: EvalSource::Heuristic,
        }
    }

    pub fn job_post(mut self) -> Self {
        self.is_job_post = true;
        self.content_type = ContentType::Job;
        self
    }

    pub fn with_reasoning(mut self, reasoning: impl Into<String>) -> Self {
        self.reasoning = reasoning.into();
        self
    }

    pub fn with_content_type(mut self, content_type: ContentType) -> Self {
        self.content_type = content_type;
        self
    }
}

/// Clamp a raw numeric score from the wire into [0,10].
pub fn clamp_score(raw: f64) -> u8 {
    if !raw.is_finite() || raw <= 0.0 {
        0
    } else if raw >= 10.0 {
        10
    } else {
        raw.round() as u8
    }
}

/// The three external side effects the engine can authorize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Like,
    Comment,
    Reply,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Like => "like",
            Self::Comment => "comment",
            Self::Reply => "reply",
        }
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Summary label for an `ActionDecision`. The boolean flags are authoritative;
/// the label exists for logs and reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActionLabel {
    LikeOnly,
    LikeAndComment,
    LikeAndReply,
    Skip,
}

/// What to do about one piece of content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionDecision {
    pub should_like: bool,
    pub should_comment: bool,
    pub should_reply: bool,
    /// Non-empty whenever `should_comment`/`should_reply` survived gating and
    /// a generator was consulted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_text: Option<String>,
    pub label: ActionLabel,
    pub content_type: ContentType,
}

impl ActionDecision {
    pub fn skip(content_type: ContentType) -> Self {
        Self {
            should_like: false,
            should_comment: false,
            should_reply: false,
            generated_text: None,
            label: ActionLabel::Skip,
            content_type,
        }
    }

    pub fn like_only(content_type: ContentType) -> Self {
        Self {
            should_like: true,
            label: ActionLabel::LikeOnly,
            ..Self::skip(content_type)
        }
    }

    pub fn like_and_comment(content_type: ContentType) -> Self {
        Self {
            should_like: true,
            should_comment: true,
            label: ActionLabel::LikeAndComment,
            ..Self::skip(content_type)
        }
    }

    pub fn like_and_reply(content_type: ContentType) -> Self {
        Self {
            should_like: true,
            should_reply: true,
            label: ActionLabel::LikeAndReply,
            ..Self::skip(content_type)
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.generated_text = Some(text.into());
        self
    }

    /// True if at least one action flag is set.
    pub fn wants_any(&self) -> bool {
        self.should_like || self.should_comment || self.should_reply
    }
}

/// Append-only record that an action was *executed* for a content item.
/// At most one entry may ever exist per `(content_id, action_kind)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    pub content_id: String,
    pub action_kind: ActionKind,
    pub recorded_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<String>,
}
