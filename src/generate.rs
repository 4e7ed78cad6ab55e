//! generate.rs — Text-generation collaborator for comments and replies.
//! Reuses the model fallback chain; when every model fails, a canned
//! per-content-type comment is used, so generation as a whole never fails
//! and a reply decision always ends up with non-empty text.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tracing::warn;

use crate::evaluate::provider::{InferenceProvider, ModelChain};
use crate::types::ContentType;

/// Upper bound for generated engagement text.
const MAX_GENERATED_CHARS: usize = 300;

const GENERATE_MAX_TOKENS: u32 = 120;

/// Produces engagement text. Implementations must return non-empty text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, content_text: &str, content_type: ContentType) -> String;
}

/// Fixed comments used when model generation is unavailable or fails.
fn canned_pool(content_type: ContentType) -> &'static [&'static str] {
    match content_type {
        ContentType::Question => &[
            "Great question, happy to share more details.",
            "Good question! Let me expand on that.",
        ],
        ContentType::Job => &[
            "Sounds like a great opportunity, thanks for sharing!",
            "Best of luck with the search, sharing with my network.",
        ],
        ContentType::Discussion => &[
            "Thanks for adding your perspective, that matches what we have seen.",
            "Appreciate the thoughtful take, there is a lot to unpack here.",
        ],
        _ => &[
            "Great insights, thanks for sharing!",
            "Really valuable perspective, thanks for posting.",
            "Thanks for sharing this!",
        ],
    }
}

/// Canned-only generator for offline runs and tests.
#[derive(Default)]
pub struct CannedGenerator {
    cursor: AtomicUsize,
}

impl CannedGenerator {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TextGenerator for CannedGenerator {
    async fn generate(&self, _content_text: &str, content_type: ContentType) -> String {
        let pool = canned_pool(content_type);
        let i = self.cursor.fetch_add(1, Ordering::Relaxed) % pool.len();
        pool[i].to_string()
    }
}

/// Model-backed generator with the canned pool as last resort.
pub struct ChainTextGenerator<P: InferenceProvider> {
    chain: ModelChain<P>,
    canned: CannedGenerator,
}

impl<P: InferenceProvider> ChainTextGenerator<P> {
    pub fn new(chain: ModelChain<P>) -> Self {
        Self {
            chain,
            canned: CannedGenerator::new(),
        }
    }
}

#[async_trait]
impl<P: InferenceProvider> TextGenerator for ChainTextGenerator<P> {
    async fn generate(&self, content_text: &str, content_type: ContentType) -> String {
        let prompt = generation_prompt(content_text, content_type);
        match self.chain.complete(&prompt, GENERATE_MAX_TOKENS).await {
            Ok(raw) => {
                let text = tidy(&raw);
                if text.is_empty() {
                    self.canned.generate(content_text, content_type).await
                } else {
                    text
                }
            }
            Err(e) => {
                warn!(error = %e, "text generation failed, using canned comment");
                self.canned.generate(content_text, content_type).await
            }
        }
    }
}

fn generation_prompt(content_text: &str, content_type: ContentType) -> String {
    let intent = match content_type {
        ContentType::Question => "Answer the question briefly and helpfully.",
        ContentType::Job => "Write a short supportive comment for this job posting.",
        ContentType::Discussion => "Write a short reply that adds one concrete point.",
        _ => "Write a short, genuine engagement comment.",
    };
    format!(
        "{intent} One or two sentences, professional tone, no hashtags, no emojis. \
         Output only the comment.\n\nContent:\n{content_text}"
    )
}

/// Collapse whitespace, strip wrapping quotes and cap the length.
fn tidy(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len().min(MAX_GENERATED_CHARS));
    let mut prev_space = false;
    for ch in raw.chars() {
        let c = if ch.is_whitespace() { ' ' } else { ch };
        if c == ' ' {
            if !prev_space && !out.is_empty() {
                out.push(' ');
            }
            prev_space = true;
        } else {
            out.push(c);
            prev_space = false;
        }
        if out.chars().count() >= MAX_GENERATED_CHARS {
            break;
        }
    }
    out.trim_matches(['"', ' ']).to_string()
}
