//! Evaluation pipeline: length floor → model fallback chain → response
//! validation → heuristic backstop.
//!
//! `Evaluator::evaluate` is a total function: no provider or parse failure
//! escapes it. An unavailable inference backend degrades scoring quality,
//! never availability.

pub mod parse;
pub mod provider;

pub use parse::{parse_evaluation, ParseError};
pub use provider::{
    InferenceProvider, ModelChain, OpenAiCompatProvider, ProviderError, ScriptedProvider,
};

use metrics::{counter, describe_counter};
use once_cell::sync::OnceCell;
use tracing::{debug, warn};

use crate::fallback::{first_success, ChainError};
use crate::heuristic::heuristic_evaluate;
use crate::types::{ContentItem, EvaluationResult};

/// Content shorter than this is never sent to a provider.
pub const MIN_CONTENT_CHARS: usize = 20;

/// Token budget for one evaluation request.
pub const EVAL_MAX_TOKENS: u32 = 250;

/// One-time metrics registration (series show up even before first increment).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("engage_eval_total", "Content items evaluated.");
        describe_counter!(
            "engage_eval_short_total",
            "Items under the length floor, returned as zero-engagement."
        );
        describe_counter!("engage_eval_model_total", "Evaluations served by a model.");
        describe_counter!(
            "engage_eval_heuristic_total",
            "Evaluations served by the heuristic fallback."
        );
    });
}

/// Why the model path of an evaluation produced nothing usable.
#[derive(Debug, thiserror::Error)]
enum EvalFailure {
    #[error("model chain failed: {0}")]
    Chain(ChainError<ProviderError>),
    #[error("model reply rejected: {0}")]
    Parse(#[from] ParseError),
}

/// Stages of the evaluation fallback: the model path first, then the
/// heuristic, which by contract cannot fail.
#[derive(Clone, Copy)]
enum Stage {
    Model,
    Heuristic,
}

pub struct Evaluator<P: InferenceProvider> {
    chain: ModelChain<P>,
    max_tokens: u32,
    min_content_chars: usize,
    /// When false the model path is skipped entirely (heuristic-only runs).
    enabled: bool,
}

impl<P: InferenceProvider> Evaluator<P> {
    pub fn new(chain: ModelChain<P>) -> Self {
        Self {
            chain,
            max_tokens: EVAL_MAX_TOKENS,
            min_content_chars: MIN_CONTENT_CHARS,
            enabled: true,
        }
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_limits(mut self, max_tokens: u32, min_content_chars: usize) -> Self {
        self.max_tokens = max_tokens;
        self.min_content_chars = min_content_chars;
        self
    }

    pub fn provider(&self) -> &P {
        self.chain.provider_ref()
    }

    /// Evaluate one content item. Always returns a usable result.
    pub async fn evaluate(&self, item: &ContentItem) -> EvaluationResult {
        ensure_metrics_described();
        counter!("engage_eval_total").increment(1);

        if item.length_chars() < self.min_content_chars {
            debug!(id = %item.id, chars = item.length_chars(), "under length floor, skipping providers");
            counter!("engage_eval_short_total").increment(1);
            return EvaluationResult::too_short();
        }

        if !self.enabled {
            counter!("engage_eval_heuristic_total").increment(1);
            return heuristic_evaluate(&item.text, &item.hashtags);
        }

        let prompt = evaluation_prompt(item);
        let outcome = first_success(
            [Stage::Model, Stage::Heuristic],
            |stage| {
                let prompt = prompt.as_str();
                async move {
                    match stage {
                        Stage::Model => {
                            let raw = self
                                .chain
                                .complete(prompt, self.max_tokens)
                                .await
                                .map_err(EvalFailure::Chain)?;
                            Ok(parse_evaluation(&raw)?)
                        }
                        Stage::Heuristic => Ok(heuristic_evaluate(&item.text, &item.hashtags)),
                    }
                }
            },
            |e: &EvalFailure| {
                // Everything on the way to the heuristic is absorbed.
                warn!(id = %item.id, error = %e, "model evaluation failed, falling back");
                true
            },
        )
        .await;

        match outcome {
            Ok(eval) => {
                match eval.source {
                    crate::types::EvalSource::Model => {
                        counter!("engage_eval_model_total").increment(1)
                    }
                    crate::types::EvalSource::Heuristic => {
                        counter!("engage_eval_heuristic_total").increment(1)
                    }
                }
                eval
            }
            // The heuristic stage is infallible, so the chain cannot exhaust;
            // keep the function total anyway.
            Err(_) => heuristic_evaluate(&item.text, &item.hashtags),
        }
    }
}

/// Fixed evaluation prompt. The wire contract (field names, ranges) matches
/// `parse::WireEvaluation`.
fn evaluation_prompt(item: &ContentItem) -> String {
    let hashtags = if item.hashtags.is_empty() {
        "none".to_string()
    } else {
        item.hashtags.join(", ")
    };
    format!(
        "Evaluate this social feed post for engagement worthiness.\n\
         \n\
         Post text:\n{}\n\
         \n\
         Hashtags: {}\n\
         \n\
         Respond with a single JSON object and nothing else:\n\
         {{\"likeScore\": <0-10>, \"commentScore\": <0-10>, \"isJobPost\": <true|false>, \
         \"postType\": \"<job|thought-leadership|news|personal-story|promotional|question|acknowledgment|discussion|other>\", \
         \"reasoning\": \"<one short sentence>\"}}",
        item.text, hashtags
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EvalSource;

    fn item(text: &str) -> ContentItem {
        ContentItem::post("urn:demo:1", text)
    }

    #[tokio::test]
    async fn short_content_never_touches_a_provider() {
        let provider = ScriptedProvider::new();
        let evaluator = Evaluator::new(ModelChain::new(provider, vec!["m-a".into()]));
        let eval = evaluator.evaluate(&item("short")).await;
        assert_eq!((eval.like_score, eval.comment_score), (0, 0));
        assert_eq!(eval.reasoning, "content too short");
        assert_eq!(evaluator.provider().call_count(), 0);
    }

    #[tokio::test]
    async fn disabled_evaluator_is_heuristic_only() {
        let provider = ScriptedProvider::new().respond(
            "m-a",
            Ok(r#"{"likeScore": 9, "commentScore": 9, "isJobPost": false}"#),
        );
        let evaluator =
            Evaluator::new(ModelChain::new(provider, vec!["m-a".into()])).with_enabled(false);
        let eval = evaluator
            .evaluate(&item("Plenty of text, but providers are switched off."))
            .await;
        assert_eq!(eval.source, EvalSource::Heuristic);
        assert_eq!(evaluator.provider().call_count(), 0);
    }

    #[tokio::test]
    async fn model_result_is_used_when_parseable() {
        let provider = ScriptedProvider::new().respond(
            "m-a",
            Ok(r#"{"likeScore": 8, "commentScore": 6, "isJobPost": false, "postType": "news"}"#),
        );
        let evaluator = Evaluator::new(ModelChain::new(provider, vec!["m-a".into()]));
        let eval = evaluator
            .evaluate(&item("A long enough piece of content to evaluate."))
            .await;
        assert_eq!(eval.source, EvalSource::Model);
        assert_eq!(eval.like_score, 8);
    }

    #[tokio::test]
    async fn unparseable_model_reply_falls_back_to_heuristic() {
        let provider =
            ScriptedProvider::new().respond("m-a", Ok("I would rate this post quite highly."));
        let evaluator = Evaluator::new(ModelChain::new(provider, vec!["m-a".into()]));
        let eval = evaluator
            .evaluate(&item("We're hiring a senior platform engineer, apply now."))
            .await;
        assert_eq!(eval.source, EvalSource::Heuristic);
        assert!(eval.is_job_post);
    }

    #[tokio::test]
    async fn transport_abort_falls_back_to_heuristic() {
        let provider = ScriptedProvider::new().respond(
            "m-a",
            Err(ProviderError::Transport {
                message: "dns failure".into(),
            }),
        );
        let evaluator = Evaluator::new(ModelChain::new(provider, vec!["m-a".into(), "m-b".into()]));
        let eval = evaluator
            .evaluate(&item("Some ordinary content that is long enough."))
            .await;
        assert_eq!(eval.source, EvalSource::Heuristic);
        // The fatal error must have prevented the second model attempt.
        assert_eq!(evaluator.provider().call_count(), 1);
    }
}
