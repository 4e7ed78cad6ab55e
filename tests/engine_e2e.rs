// tests/engine_e2e.rs
// Full pipeline smoke: pre-filter → evaluator → policy → gate → generation,
// with a scripted provider and an in-memory ledger standing in for the
// external collaborators.

use std::sync::Arc;

use feed_engagement_engine::{
    ActionKind, ActionLabel, CannedGenerator, ContentItem, EngagementConfig, EngagementEngine,
    Ledger, MemoryLedger, ProviderError, ScriptedProvider, SharedLedger,
};

fn engine(
    provider: ScriptedProvider,
    ledger: SharedLedger,
) -> EngagementEngine<ScriptedProvider> {
    let config = EngagementConfig {
        models: vec!["primary".into(), "backup".into()],
        ..EngagementConfig::default()
    };
    EngagementEngine::new(config, provider, ledger, Arc::new(CannedGenerator::new()))
}

#[tokio::test]
async fn executor_records_make_the_second_run_a_no_op() {
    let provider = ScriptedProvider::new().respond(
        "primary",
        Ok(r#"{"likeScore": 9, "commentScore": 9, "isJobPost": false, "postType": "thought-leadership"}"#),
    );
    let ledger = Arc::new(MemoryLedger::new());
    let engine = engine(provider, ledger.clone());

    let item = ContentItem::post(
        "urn:post:42",
        "A long reflection on what a decade of incident reviews taught our team.",
    );

    let first = engine.process_post(&item).await;
    assert!(first.decision.should_like && first.decision.should_comment);

    // External executor confirms both actions.
    ledger.record(&item.id, ActionKind::Like, None).await.unwrap();
    ledger
        .record(&item.id, ActionKind::Comment, first.decision.generated_text.clone())
        .await
        .unwrap();

    let second = engine.process_post(&item).await;
    assert!(!second.decision.wants_any());
    assert_eq!(second.decision.label, ActionLabel::Skip);
}

#[tokio::test]
async fn degraded_backend_still_produces_decisions() {
    // Primary rate limited, backup answers garbage: the run must still come
    // back with a usable decision via the heuristic.
    let provider = ScriptedProvider::new()
        .respond(
            "primary",
            Err(ProviderError::RateLimited {
                model: "primary".into(),
            }),
        )
        .respond("backup", Ok("sorry, I cannot evaluate this content"));
    let engine = engine(provider, MemoryLedger::shared());

    let out = engine
        .process_post(&ContentItem::post(
            "urn:post:43",
            "We're hiring two engineers for the storage team, apply now.",
        ))
        .await;

    assert!(out.evaluation.is_job_post);
    assert!(out.decision.should_comment);
    assert!(out.decision.generated_text.is_some());
}

#[tokio::test]
async fn reply_pipeline_gates_previously_answered_replies() {
    let ledger = Arc::new(MemoryLedger::new());
    ledger
        .record("urn:reply:7", ActionKind::Reply, None)
        .await
        .unwrap();
    let engine = engine(ScriptedProvider::new(), ledger);

    let out = engine
        .process_reply(&ContentItem::reply(
            "urn:reply:7",
            "Which benchmarks did you run against the old setup?",
        ))
        .await;

    // Question detected, but the reply was already sent once; only the like
    // survives and no text is generated.
    assert!(out.decision.should_like);
    assert!(!out.decision.should_reply);
    assert_eq!(out.decision.label, ActionLabel::LikeOnly);
    assert!(out.decision.generated_text.is_none());
}
