//! fallback.rs — "First success in an ordered sequence of fallible
//! producers", parameterized over which errors are worth continuing past.
//!
//! The same combinator drives two chains: model-to-model inside
//! `evaluate::provider::ModelChain` (rate limits continue, transport errors
//! abort) and the model-to-heuristic step in `evaluate::Evaluator` (where
//! everything is non-fatal and the final producer cannot fail).

use std::future::Future;

/// Why a chain produced no value.
#[derive(Debug, PartialEq, Eq)]
pub enum ChainError<E> {
    /// A producer failed with an error classified as fatal; remaining
    /// producers were not attempted.
    Fatal(E),
    /// Every producer was attempted and none succeeded. Carries the
    /// non-fatal errors in attempt order.
    Exhausted(Vec<E>),
}

impl<E: std::fmt::Display> std::fmt::Display for ChainError<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChainError::Fatal(e) => write!(f, "chain aborted: {e}"),
            ChainError::Exhausted(errs) => {
                write!(f, "chain exhausted after {} attempt(s)", errs.len())
            }
        }
    }
}

impl<E: std::fmt::Display + std::fmt::Debug> std::error::Error for ChainError<E> {}

/// Try `attempt` against each source in order, awaiting one at a time.
///
/// Returns the first `Ok`. An error for which `non_fatal` returns `false`
/// aborts the whole chain immediately; non-fatal errors are collected and the
/// next source is tried.
pub async fn first_success<S, T, E, F, Fut, C>(
    sources: impl IntoIterator<Item = S>,
    mut attempt: F,
    mut non_fatal: C,
) -> Result<T, ChainError<E>>
where
    F: FnMut(S) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    C: FnMut(&E) -> bool,
{
    let mut skipped = Vec::new();
    for source in sources {
        match attempt(source).await {
            Ok(value) => return Ok(value),
            Err(e) if non_fatal(&e) => skipped.push(e),
            Err(e) => return Err(ChainError::Fatal(e)),
        }
    }
    Err(ChainError::Exhausted(skipped))
}
