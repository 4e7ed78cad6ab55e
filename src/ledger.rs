//! ledger.rs — The at-most-once boundary. The gate only ever *reads* the
//! ledger; the external executor records an entry after the action has
//! confirmedly happened. A crash between authorization and execution
//! therefore never leaves a false "already handled" record.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use metrics::{counter, describe_counter};
use once_cell::sync::OnceCell;
use tracing::{debug, warn};

use crate::types::{ActionKind, LedgerEntry};

fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("engage_gate_checks_total", "Gate authorization checks.");
        describe_counter!(
            "engage_gate_denied_total",
            "Authorizations denied (duplicate or ledger error)."
        );
    });
}

/// External append-only store of executed `(content, action)` pairs.
#[async_trait]
pub trait Ledger: Send + Sync {
    async fn exists(&self, content_id: &str, action: ActionKind) -> anyhow::Result<bool>;
    /// Called by the executor after confirmed success, never by the gate.
    async fn record(
        &self,
        content_id: &str,
        action: ActionKind,
        metadata: Option<String>,
    ) -> anyhow::Result<()>;
}

pub type SharedLedger = Arc<dyn Ledger>;

/// Decides whether an action may proceed. Read-only over the ledger.
pub struct ActionGate {
    ledger: SharedLedger,
}

impl ActionGate {
    pub fn new(ledger: SharedLedger) -> Self {
        Self { ledger }
    }

    /// `true` iff no ledger entry exists for `(content_id, action)`.
    ///
    /// A ledger read error denies authorization: acting blind could break the
    /// at-most-once contract, skipping one item cannot.
    pub async fn authorize(&self, content_id: &str, action: ActionKind) -> bool {
        ensure_metrics_described();
        counter!("engage_gate_checks_total").increment(1);
        match self.ledger.exists(content_id, action).await {
            Ok(true) => {
                debug!(content_id, action = %action, "already acted on, denying");
                counter!("engage_gate_denied_total").increment(1);
                false
            }
            Ok(false) => true,
            Err(e) => {
                warn!(content_id, action = %action, error = %e, "ledger read failed, denying");
                counter!("engage_gate_denied_total").increment(1);
                false
            }
        }
    }
}

/// In-memory ledger for tests, demos and single-session runs.
#[derive(Default)]
pub struct MemoryLedger {
    inner: Mutex<Vec<LedgerEntry>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedLedger {
        Arc::new(Self::new())
    }

    pub fn entries(&self) -> Vec<LedgerEntry> {
        self.inner.lock().expect("ledger mutex poisoned").clone()
    }
}

#[async_trait]
impl Ledger for MemoryLedger {
    async fn exists(&self, content_id: &str, action: ActionKind) -> anyhow::Result<bool> {
        let v = self.inner.lock().expect("ledger mutex poisoned");
        Ok(v.iter()
            .any(|e| e.content_id == content_id && e.action_kind == action))
    }

    async fn record(
        &self,
        content_id: &str,
        action: ActionKind,
        metadata: Option<String>,
    ) -> anyhow::Result<()> {
        let mut v = self.inner.lock().expect("ledger mutex poisoned");
        // Uniqueness per (content_id, action_kind); re-recording is a no-op.
        if v.iter()
            .any(|e| e.content_id == content_id && e.action_kind == action)
        {
            return Ok(());
        }
        v.push(LedgerEntry {
            content_id: content_id.to_string(),
            action_kind: action,
            recorded_at: Utc::now(),
            metadata,
        });
        Ok(())
    }
}

/// Stable dedup key for a content item: its canonical URL when one exists,
/// otherwise a short hash token synthesized from the text.
pub fn content_key(canonical_url: Option<&str>, text: &str) -> String {
    if let Some(url) = canonical_url {
        let trimmed = url.trim();
        if !trimmed.is_empty() {
            return trimmed.trim_end_matches('/').to_string();
        }
    }
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(text.trim().as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(4 + 16);
    out.push_str("txt:");
    for b in digest.iter().take(8) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}
