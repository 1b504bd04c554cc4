//! Debounced, fire-and-forget persistence.
//!
//! Save requests go to a single background task. Each request replaces the
//! pending snapshot and pushes the deadline out by the debounce window; when
//! the window passes without a new request the latest snapshot is written.
//! Writes are spawned and not ordered against each other.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::{JoinError, JoinSet};
use tokio::time::{sleep_until, Instant};

use crate::models::Curriculum;
use crate::remote::{RemoteError, RemoteStore};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_secs(1);

/// Outcome of the saves performed since the previous flush.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveReport {
    /// Save requests received.
    pub requested: usize,
    /// Writes issued to the remote store.
    pub attempted: usize,
    pub succeeded: usize,
    pub failures: Vec<String>,
}

impl SaveReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

enum Command {
    Schedule(Box<Curriculum>),
    Flush(oneshot::Sender<SaveReport>),
}

/// Handle to the background save task.
///
/// Must be created inside a tokio runtime. Dropping the handle writes any
/// pending snapshot and stops the task.
pub struct DebouncedSaver {
    tx: mpsc::UnboundedSender<Command>,
}

impl DebouncedSaver {
    pub fn spawn(remote: Arc<dyn RemoteStore>, window: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run(remote, window, rx));
        Self { tx }
    }

    /// Requests a save of `doc`, superseding any pending request.
    pub fn schedule(&self, doc: Curriculum) {
        if self.tx.send(Command::Schedule(Box::new(doc))).is_err() {
            tracing::warn!("Save worker stopped, dropping save request");
        }
    }

    /// Writes the pending snapshot now and waits for every in-flight save.
    pub async fn flush(&self) -> SaveReport {
        let (reply, rx) = oneshot::channel();
        if self.tx.send(Command::Flush(reply)).is_err() {
            return SaveReport::default();
        }
        rx.await.unwrap_or_default()
    }
}

async fn run(
    remote: Arc<dyn RemoteStore>,
    window: Duration,
    mut rx: mpsc::UnboundedReceiver<Command>,
) {
    let mut pending: Option<Curriculum> = None;
    let mut deadline: Option<Instant> = None;
    let mut in_flight: JoinSet<Result<(), RemoteError>> = JoinSet::new();
    let mut report = SaveReport::default();

    loop {
        tokio::select! {
            command = rx.recv() => match command {
                Some(Command::Schedule(doc)) => {
                    report.requested += 1;
                    pending = Some(*doc);
                    deadline = Some(Instant::now() + window);
                }
                Some(Command::Flush(reply)) => {
                    deadline = None;
                    if let Some(doc) = pending.take() {
                        start_save(&mut in_flight, &remote, doc, &mut report);
                    }
                    while let Some(result) = in_flight.join_next().await {
                        record(&mut report, result);
                    }
                    let _ = reply.send(std::mem::take(&mut report));
                }
                None => {
                    if let Some(doc) = pending.take() {
                        start_save(&mut in_flight, &remote, doc, &mut report);
                    }
                    while let Some(result) = in_flight.join_next().await {
                        record(&mut report, result);
                    }
                    break;
                }
            },
            _ = wait_until(deadline) => {
                deadline = None;
                if let Some(doc) = pending.take() {
                    start_save(&mut in_flight, &remote, doc, &mut report);
                }
            }
            Some(result) = in_flight.join_next(), if !in_flight.is_empty() => {
                record(&mut report, result);
            }
        }
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

fn start_save(
    in_flight: &mut JoinSet<Result<(), RemoteError>>,
    remote: &Arc<dyn RemoteStore>,
    doc: Curriculum,
    report: &mut SaveReport,
) {
    report.attempted += 1;
    let remote = Arc::clone(remote);
    tracing::debug!("Saving curriculum to remote store");
    in_flight.spawn(async move { remote.save(&doc).await });
}

fn record(report: &mut SaveReport, result: Result<Result<(), RemoteError>, JoinError>) {
    match result {
        Ok(Ok(())) => {
            report.succeeded += 1;
            tracing::debug!("Curriculum saved");
        }
        Ok(Err(e)) => {
            tracing::error!("Failed to save progress: {}", e);
            report.failures.push(e.to_string());
        }
        Err(e) => {
            tracing::error!("Save task failed: {}", e);
            report.failures.push(e.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MetaPatch;
    use crate::remote::MemoryRemoteStore;

    fn doc_with_goal(goal: &str) -> Curriculum {
        let mut doc = Curriculum::bundled();
        doc.meta.apply(MetaPatch {
            goal: Some(goal.to_string()),
            ..MetaPatch::default()
        });
        doc
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_collapses_to_latest_snapshot() {
        let remote = Arc::new(MemoryRemoteStore::new());
        let saver = DebouncedSaver::spawn(remote.clone(), Duration::from_secs(1));

        for goal in ["one", "two", "three"] {
            saver.schedule(doc_with_goal(goal));
        }
        tokio::time::sleep(Duration::from_secs(2)).await;

        let saves = remote.saves();
        assert_eq!(saves.len(), 1);
        assert_eq!(saves[0].meta.goal, "three");
    }

    #[tokio::test(start_paused = true)]
    async fn test_nothing_saved_before_window_elapses() {
        let remote = Arc::new(MemoryRemoteStore::new());
        let saver = DebouncedSaver::spawn(remote.clone(), Duration::from_secs(1));

        saver.schedule(doc_with_goal("early"));
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(remote.save_count(), 0);

        // A new request pushes the deadline out again.
        saver.schedule(doc_with_goal("later"));
        tokio::time::sleep(Duration::from_millis(700)).await;
        assert_eq!(remote.save_count(), 0);

        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(remote.save_count(), 1);
        assert_eq!(remote.saves()[0].meta.goal, "later");
    }

    #[tokio::test(start_paused = true)]
    async fn test_separate_bursts_save_separately() {
        let remote = Arc::new(MemoryRemoteStore::new());
        let saver = DebouncedSaver::spawn(remote.clone(), Duration::from_secs(1));

        saver.schedule(doc_with_goal("first"));
        tokio::time::sleep(Duration::from_secs(2)).await;
        saver.schedule(doc_with_goal("second"));
        tokio::time::sleep(Duration::from_secs(2)).await;

        let goals: Vec<String> = remote.saves().into_iter().map(|d| d.meta.goal).collect();
        assert_eq!(goals, vec!["first", "second"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_flush_saves_pending_immediately() {
        let remote = Arc::new(MemoryRemoteStore::new());
        let saver = DebouncedSaver::spawn(remote.clone(), Duration::from_secs(60));

        saver.schedule(doc_with_goal("a"));
        saver.schedule(doc_with_goal("b"));
        let report = saver.flush().await;

        assert_eq!(report.requested, 2);
        assert_eq!(report.attempted, 1);
        assert_eq!(report.succeeded, 1);
        assert!(report.is_clean());
        assert_eq!(remote.stored().unwrap().meta.goal, "b");

        // The report resets after each flush.
        assert_eq!(saver.flush().await, SaveReport::default());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_save_is_reported_without_retry() {
        let remote = Arc::new(MemoryRemoteStore::new());
        remote.set_fail_save(true);
        let saver = DebouncedSaver::spawn(remote.clone(), Duration::from_secs(1));

        saver.schedule(doc_with_goal("x"));
        tokio::time::sleep(Duration::from_secs(5)).await;
        let report = saver.flush().await;

        assert_eq!(remote.save_count(), 1);
        assert_eq!(report.attempted, 1);
        assert_eq!(report.failures.len(), 1);
    }
}
