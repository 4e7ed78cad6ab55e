//! # Engagement Engine
//! Wires the pipeline: pre-filter → evaluator → decision policy → action
//! gate → text generation. One content item is processed fully before the
//! next; the provider calls inside the evaluator are the only suspension
//! points.
//!
//! The engine never writes the ledger. It hands back a gated decision; the
//! external executor performs the actions and records them after confirmed
//! success.

use std::sync::Arc;

use metrics::{counter, describe_counter};
use once_cell::sync::OnceCell;
use serde::Serialize;
use tracing::info;

use crate::config::EngagementConfig;
use crate::evaluate::provider::InferenceProvider;
use crate::evaluate::{Evaluator, ModelChain};
use crate::generate::TextGenerator;
use crate::ledger::{ActionGate, SharedLedger};
use crate::policy::{analyze_reply, decide_post_action};
use crate::prefilter::is_trivial_acknowledgment_with;
use crate::types::{
    ActionDecision, ActionKind, ActionLabel, ContentItem, ContentType, EvalSource,
    EvaluationResult,
};

fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("engage_items_total", "Content items processed.");
        describe_counter!(
            "engage_prefiltered_total",
            "Items short-circuited by the acknowledgment pre-filter."
        );
        describe_counter!(
            "engage_actions_suppressed_total",
            "Action flags cleared by the idempotency gate."
        );
    });
}

/// Result of processing a feed post.
#[derive(Debug, Clone, Serialize)]
pub struct PostOutcome {
    pub evaluation: EvaluationResult,
    pub decision: ActionDecision,
    /// True when the pre-filter skipped evaluation entirely.
    pub prefiltered: bool,
}

/// Result of processing a reply to one of our comments.
#[derive(Debug, Clone, Serialize)]
pub struct ReplyOutcome {
    pub decision: ActionDecision,
    pub prefiltered: bool,
}

pub struct EngagementEngine<P: InferenceProvider> {
    config: EngagementConfig,
    evaluator: Evaluator<P>,
    gate: ActionGate,
    generator: Arc<dyn TextGenerator>,
}

impl<P: InferenceProvider> EngagementEngine<P> {
    pub fn new(
        config: EngagementConfig,
        provider: P,
        ledger: SharedLedger,
        generator: Arc<dyn TextGenerator>,
    ) -> Self {
        let chain = ModelChain::new(provider, config.models.clone());
        let evaluator = Evaluator::new(chain)
            .with_limits(config.max_tokens, config.min_content_chars)
            .with_enabled(config.enabled);
        Self {
            config,
            evaluator,
            gate: ActionGate::new(ledger),
            generator,
        }
    }

    pub fn config(&self) -> &EngagementConfig {
        &self.config
    }

    /// Evaluate a feed post, decide, and gate the decision. The returned
    /// decision carries generated comment text when commenting survived.
    pub async fn process_post(&self, item: &ContentItem) -> PostOutcome {
        ensure_metrics_described();
        counter!("engage_items_total").increment(1);

        if self.is_trivial(&item.text) {
            counter!("engage_prefiltered_total").increment(1);
            info!(id = %item.id, "pre-filtered as trivial acknowledgment");
            return PostOutcome {
                evaluation: EvaluationResult::new(0, 0, EvalSource::Heuristic)
                    .with_content_type(ContentType::Acknowledgment)
                    .with_reasoning("trivial acknowledgment"),
                decision: ActionDecision::skip(ContentType::Acknowledgment),
                prefiltered: true,
            };
        }

        let evaluation = self.evaluator.evaluate(item).await;
        let decision = decide_post_action(&evaluation, &self.config.thresholds);
        let mut decision = self.gate_decision(&item.id, decision).await;

        if decision.should_comment {
            let text = self
                .generator
                .generate(&item.text, decision.content_type)
                .await;
            decision = decision.with_text(text);
        }

        info!(
            id = %item.id,
            like = decision.should_like,
            comment = decision.should_comment,
            source = ?evaluation.source,
            "post decision"
        );

        PostOutcome {
            evaluation,
            decision,
            prefiltered: false,
        }
    }

    /// Classify a reply to one of our comments and gate the response.
    pub async fn process_reply(&self, item: &ContentItem) -> ReplyOutcome {
        ensure_metrics_described();
        counter!("engage_items_total").increment(1);

        let (analyzed, prefiltered) = if self.is_trivial(&item.text) {
            counter!("engage_prefiltered_total").increment(1);
            (ActionDecision::like_only(ContentType::Acknowledgment), true)
        } else {
            (analyze_reply(&item.text), false)
        };

        let mut decision = self.gate_decision(&item.id, analyzed).await;

        if decision.should_reply {
            let text = self
                .generator
                .generate(&item.text, decision.content_type)
                .await;
            decision = decision.with_text(text);
        }

        info!(id = %item.id, label = ?decision.label, "reply decision");

        ReplyOutcome {
            decision,
            prefiltered,
        }
    }

    fn is_trivial(&self, text: &str) -> bool {
        is_trivial_acknowledgment_with(text, self.config.ack_max_chars, self.config.ack_max_words)
    }

    /// Clear any action flag the ledger says was already executed, then
    /// refresh the summary label.
    async fn gate_decision(
        &self,
        content_id: &str,
        mut decision: ActionDecision,
    ) -> ActionDecision {
        let mut suppressed = 0u64;
        if decision.should_like && !self.gate.authorize(content_id, ActionKind::Like).await {
            decision.should_like = false;
            suppressed += 1;
        }
        if decision.should_comment && !self.gate.authorize(content_id, ActionKind::Comment).await {
            decision.should_comment = false;
            suppressed += 1;
        }
        if decision.should_reply && !self.gate.authorize(content_id, ActionKind::Reply).await {
            decision.should_reply = false;
            suppressed += 1;
        }
        if suppressed > 0 {
            counter!("engage_actions_suppressed_total").increment(suppressed);
            decision.label = relabel(&decision);
        }
        decision
    }
}

fn relabel(d: &ActionDecision) -> ActionLabel {
    if d.should_reply {
        ActionLabel::LikeAndReply
    } else if d.should_comment {
        ActionLabel::LikeAndComment
    } else if d.should_like {
        ActionLabel::LikeOnly
    } else {
        ActionLabel::Skip
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluate::provider::ScriptedProvider;
    use crate::generate::CannedGenerator;
    use crate::ledger::{Ledger, MemoryLedger};

    fn engine_with(
        provider: ScriptedProvider,
        ledger: SharedLedger,
    ) -> EngagementEngine<ScriptedProvider> {
        let config = EngagementConfig {
            models: vec!["m-a".into()],
            ..EngagementConfig::default()
        };
        EngagementEngine::new(config, provider, ledger, Arc::new(CannedGenerator::new()))
    }

    #[tokio::test]
    async fn job_post_flows_through_to_comment_with_text() {
        let provider = ScriptedProvider::new().respond(
            "m-a",
            Ok(r#"{"likeScore": 8, "commentScore": 9, "isJobPost": true, "postType": "job"}"#),
        );
        let engine = engine_with(provider, MemoryLedger::shared());
        let item = ContentItem::post("urn:post:1", "We're hiring a platform engineer, apply now!");
        let out = engine.process_post(&item).await;
        assert!(out.decision.should_like && out.decision.should_comment);
        assert!(out
            .decision
            .generated_text
            .as_deref()
            .is_some_and(|t| !t.is_empty()));
    }

    #[tokio::test]
    async fn prefiltered_post_skips_evaluation() {
        let engine = engine_with(ScriptedProvider::new(), MemoryLedger::shared());
        let out = engine
            .process_post(&ContentItem::post("urn:post:2", "Congrats!"))
            .await;
        assert!(out.prefiltered);
        assert_eq!(out.decision.label, ActionLabel::Skip);
        assert_eq!(engine.evaluator.provider().call_count(), 0);
    }

    #[tokio::test]
    async fn already_liked_post_is_not_liked_again() {
        let ledger = Arc::new(MemoryLedger::new());
        ledger
            .record("urn:post:3", ActionKind::Like, None)
            .await
            .unwrap();
        let provider = ScriptedProvider::new().respond(
            "m-a",
            Ok(r#"{"likeScore": 8, "commentScore": 3, "isJobPost": false}"#),
        );
        let engine = engine_with(provider, ledger);
        let out = engine
            .process_post(&ContentItem::post(
                "urn:post:3",
                "A long enough post about shipping infrastructure.",
            ))
            .await;
        assert!(!out.decision.should_like);
        assert_eq!(out.decision.label, ActionLabel::Skip);
    }

    #[tokio::test]
    async fn question_reply_gets_generated_text() {
        let engine = engine_with(ScriptedProvider::new(), MemoryLedger::shared());
        let out = engine
            .process_reply(&ContentItem::reply(
                "urn:reply:1",
                "How did you handle the migration?",
            ))
            .await;
        assert_eq!(out.decision.label, ActionLabel::LikeAndReply);
        assert_eq!(out.decision.content_type, ContentType::Question);
        assert!(out.decision.generated_text.is_some());
    }

    #[tokio::test]
    async fn trivial_reply_is_prefiltered_to_like_only() {
        let engine = engine_with(ScriptedProvider::new(), MemoryLedger::shared());
        let out = engine
            .process_reply(&ContentItem::reply("urn:reply:2", "Thank you!"))
            .await;
        assert!(out.prefiltered);
        assert_eq!(out.decision.label, ActionLabel::LikeOnly);
        assert!(out.decision.generated_text.is_none());
    }
}
