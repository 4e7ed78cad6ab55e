// tests/evaluator_fallback.rs
// Fallback-chain properties across the evaluator: rate limits advance the
// chain, garbage output lands on the heuristic, scores stay in range, and
// short content never reaches a provider.

use feed_engagement_engine::{
    ContentItem, EvalSource, Evaluator, ModelChain, ProviderError, ScriptedProvider,
};

fn post(text: &str) -> ContentItem {
    ContentItem::post("urn:test:post", text)
}

#[tokio::test]
async fn rate_limited_a_then_unparseable_b_ends_heuristic() {
    let provider = ScriptedProvider::new()
        .respond(
            "model-a",
            Err(ProviderError::RateLimited {
                model: "model-a".into(),
            }),
        )
        .respond("model-b", Ok("no json in this reply, just vibes"));
    let evaluator = Evaluator::new(ModelChain::new(
        provider,
        vec!["model-a".into(), "model-b".into()],
    ));

    let eval = evaluator
        .evaluate(&post("A reasonably long post about distributed systems."))
        .await;

    assert_eq!(eval.source, EvalSource::Heuristic);
    assert_eq!(
        evaluator.provider().called_models(),
        vec!["model-a", "model-b"],
        "provider B must be attempted after A is rate limited"
    );
}

#[tokio::test]
async fn scores_always_lie_in_range() {
    let provider = ScriptedProvider::new().respond(
        "model-a",
        Ok(r#"{"likeScore": 99, "commentScore": -7, "isJobPost": false}"#),
    );
    let evaluator = Evaluator::new(ModelChain::new(provider, vec!["model-a".into()]));

    let samples = [
        "short",
        "A medium length post with nothing remarkable in it.",
        &"lessons learned ".repeat(80),
    ];
    for text in samples {
        let eval = evaluator.evaluate(&post(text)).await;
        assert!(eval.like_score <= 10, "like {} out of range", eval.like_score);
        assert!(
            eval.comment_score <= 10,
            "comment {} out of range",
            eval.comment_score
        );
    }
}

#[tokio::test]
async fn under_length_floor_returns_zeros_without_provider_call() {
    let provider = ScriptedProvider::new().respond("model-a", Ok("irrelevant"));
    let evaluator = Evaluator::new(ModelChain::new(provider, vec!["model-a".into()]));

    let eval = evaluator.evaluate(&post("short")).await;

    assert_eq!(eval.like_score, 0);
    assert_eq!(eval.comment_score, 0);
    assert!(!eval.is_job_post);
    assert_eq!(eval.reasoning, "content too short");
    assert_eq!(evaluator.provider().call_count(), 0);
}

#[tokio::test]
async fn evaluator_is_total_even_when_everything_fails() {
    let provider = ScriptedProvider::new(); // unscripted models fail as transport errors
    let evaluator = Evaluator::new(ModelChain::new(provider, vec!["model-a".into()]));

    let eval = evaluator
        .evaluate(&post("We're hiring! Looking for someone with experience."))
        .await;

    assert_eq!(eval.source, EvalSource::Heuristic);
    assert!(eval.is_job_post);
    assert!(eval.like_score >= 7);
    assert!(eval.comment_score >= 9);
}
