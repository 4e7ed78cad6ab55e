// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod config;
pub mod engine;
pub mod evaluate;
pub mod fallback;
pub mod generate;
pub mod heuristic;
pub mod job;
pub mod ledger;
pub mod policy;
pub mod prefilter;
pub mod types;

// ---- Re-exports for stable public API ----
pub use config::{EngagementConfig, Thresholds};
pub use engine::{EngagementEngine, PostOutcome, ReplyOutcome};
pub use evaluate::{
    parse_evaluation, Evaluator, InferenceProvider, ModelChain, OpenAiCompatProvider, ParseError,
    ProviderError, ScriptedProvider,
};
pub use fallback::{first_success, ChainError};
pub use generate::{CannedGenerator, ChainTextGenerator, TextGenerator};
pub use heuristic::heuristic_evaluate;
pub use job::{start_job, JobHandle, JobStatus};
pub use ledger::{content_key, ActionGate, Ledger, MemoryLedger, SharedLedger};
pub use policy::{analyze_reply, decide_post_action};
pub use prefilter::is_trivial_acknowledgment;
pub use types::{
    ActionDecision, ActionKind, ActionLabel, ContentItem, ContentType, EvalSource,
    EvaluationResult, LedgerEntry, SourceKind,
};
