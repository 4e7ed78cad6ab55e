//! job.rs — Explicit handle for a background engagement session.
//!
//! `start_job` returns as soon as the task is spawned; completion is a
//! separate concern observed through `status()` or `join()`. There is no
//! module-level "current job" slot: whoever starts a job holds its handle
//! and passes it back in to cancel or inspect it.

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Running,
    Finished,
    Cancelled,
}

/// Handle to a spawned session task.
pub struct JobHandle {
    name: String,
    handle: JoinHandle<()>,
    cancel_tx: watch::Sender<bool>,
}

/// Spawn a background job. The closure receives a cancellation receiver it
/// should poll (`changed().await` or `*borrow()`) at its own suspension
/// points.
pub fn start_job<F, Fut>(name: impl Into<String>, f: F) -> JobHandle
where
    F: FnOnce(watch::Receiver<bool>) -> Fut,
    Fut: std::future::Future<Output = ()> + Send + 'static,
{
    let name = name.into();
    let (cancel_tx, cancel_rx) = watch::channel(false);
    info!(job = %name, "starting background job");
    let handle = tokio::spawn(f(cancel_rx));
    JobHandle {
        name,
        handle,
        cancel_tx,
    }
}

impl JobHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current lifecycle state. A job that observed cancellation and exited
    /// reports `Cancelled`, not `Finished`.
    pub fn status(&self) -> JobStatus {
        if !self.handle.is_finished() {
            JobStatus::Running
        } else if *self.cancel_tx.borrow() {
            JobStatus::Cancelled
        } else {
            JobStatus::Finished
        }
    }

    /// Request cancellation. Returns immediately; the task exits at its next
    /// check of the cancel signal.
    pub fn cancel(&self) {
        info!(job = %self.name, "cancelling background job");
        let _ = self.cancel_tx.send(true);
    }

    /// Wait for the task to exit and report its final status.
    pub async fn join(self) -> JobStatus {
        let cancelled = *self.cancel_tx.borrow();
        let _ = self.handle.await;
        if cancelled || *self.cancel_tx.borrow() {
            JobStatus::Cancelled
        } else {
            JobStatus::Finished
        }
    }
}
