//! Offline demo: runs a handful of posts and replies through the full
//! pipeline with an in-memory ledger and canned text generation, then
//! replays one item to show the idempotency gate denying the duplicate.

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use feed_engagement_engine::{
    ActionKind, CannedGenerator, ContentItem, EngagementConfig, EngagementEngine, Ledger,
    MemoryLedger, OpenAiCompatProvider,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    // Without config/engagement.toml this degrades to heuristic-only.
    let config = EngagementConfig::load_or_default();
    let provider = OpenAiCompatProvider::new(config.base_url.clone(), config.api_key.clone());
    let ledger = Arc::new(MemoryLedger::new());
    let engine = EngagementEngine::new(
        config,
        provider,
        ledger.clone(),
        Arc::new(CannedGenerator::new()),
    );

    let posts = [
        ContentItem::post(
            "urn:post:hiring",
            "We're hiring a senior Rust engineer to work on our ingestion pipeline. Apply now!",
        )
        .with_hashtags(["rustlang", "hiring"]),
        ContentItem::post(
            "urn:post:lessons",
            "Three lessons from a year of running our own inference cluster: capacity planning \
             beats autoscaling heroics, observability debt compounds, and cheap GPUs are never \
             cheap. What do you think?",
        ),
        ContentItem::post("urn:post:thanks", "Thanks everyone!"),
    ];

    for item in &posts {
        let out = engine.process_post(item).await;
        println!("{}", serde_json::to_string_pretty(&out)?);

        // Simulate the external executor: act, then record.
        if out.decision.should_like {
            ledger.record(&item.id, ActionKind::Like, None).await?;
        }
        if out.decision.should_comment {
            ledger
                .record(&item.id, ActionKind::Comment, out.decision.generated_text.clone())
                .await?;
        }
    }

    // Second pass over the first post: the gate must deny everything now.
    let replay = engine.process_post(&posts[0]).await;
    println!("replay decision: {}", serde_json::to_string(&replay.decision)?);

    let replies = [
        ContentItem::reply("urn:reply:q", "How large is the team working on this?"),
        ContentItem::reply("urn:reply:ack", "Congrats, well deserved!"),
    ];
    for item in &replies {
        let out = engine.process_reply(item).await;
        println!("{}", serde_json::to_string_pretty(&out)?);
    }

    println!("engage-demo done ({} ledger entries)", ledger.entries().len());
    Ok(())
}
