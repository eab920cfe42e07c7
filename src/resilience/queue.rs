//! Failed operation queue.
//!
//! # Responsibilities
//! - Park operations that exhausted their retries while offline
//! - Replay every parked operation when connectivity returns
//! - Requeue replays that fail again for the next reconnect
//!
//! # Design Decisions
//! - The lock is only held for push / snapshot-and-clear, never across an await
//! - Replays run concurrently with no ordering between entries
//! - No retry cap across reconnect cycles
//! - Capacity and dedup are opt-in (`QueuePolicy`); the default is unbounded

use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use futures_util::future::{join_all, BoxFuture};
use uuid::Uuid;

use crate::config::QueueConfig;
use crate::observability::metrics;

/// Error type returned by replayable operations.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Future produced by one invocation of a queued operation.
pub type OperationFuture = BoxFuture<'static, Result<(), BoxError>>;

/// A zero-argument action that can be invoked any number of times.
pub type Operation = Arc<dyn Fn() -> OperationFuture + Send + Sync>;

/// A deferred action waiting for connectivity to return.
pub struct QueuedOperation {
    /// Stable identifier, kept across requeues.
    pub id: Uuid,
    /// Human-readable label (e.g., "Fetch: https://example.com/feed.json").
    pub context: String,
    /// When this entry was (re)enqueued.
    pub enqueued_at: DateTime<Utc>,
    operation: Operation,
}

impl QueuedOperation {
    fn new(operation: Operation, context: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            context,
            enqueued_at: Utc::now(),
            operation,
        }
    }

    fn requeued(self) -> Self {
        Self {
            enqueued_at: Utc::now(),
            ..self
        }
    }
}

impl fmt::Debug for QueuedOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueuedOperation")
            .field("id", &self.id)
            .field("context", &self.context)
            .field("enqueued_at", &self.enqueued_at)
            .finish_non_exhaustive()
    }
}

/// Capacity and dedup rules for the queue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueuePolicy {
    /// Evict the oldest entry once this many are pending.
    pub max_entries: Option<usize>,
    /// An enqueue replaces a pending entry with the same context.
    pub dedupe_by_context: bool,
}

impl From<&QueueConfig> for QueuePolicy {
    fn from(config: &QueueConfig) -> Self {
        Self {
            max_entries: config.max_entries,
            dedupe_by_context: config.dedupe_by_context,
        }
    }
}

/// Result of one drain-and-retry pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainReport {
    pub attempted: usize,
    pub succeeded: usize,
    pub requeued: usize,
}

/// In-memory list of operations to replay on reconnect.
#[derive(Debug, Default)]
pub struct FailedOperationQueue {
    entries: Mutex<Vec<QueuedOperation>>,
    policy: QueuePolicy,
}

impl FailedOperationQueue {
    pub fn new(policy: QueuePolicy) -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            policy,
        }
    }

    pub fn policy(&self) -> QueuePolicy {
        self.policy
    }

    fn entries(&self) -> MutexGuard<'_, Vec<QueuedOperation>> {
        self.entries.lock().expect("failed operation queue mutex poisoned")
    }

    /// Park `operation` under `context`. Returns the entry id.
    pub fn enqueue(&self, operation: Operation, context: impl Into<String>) -> Uuid {
        let entry = QueuedOperation::new(operation, context.into());
        let id = entry.id;
        tracing::info!(op_id = %id, context = %entry.context, "Operation queued for replay");
        self.push(entry);
        id
    }

    /// Park a closure that builds a fresh future on every invocation.
    pub fn enqueue_fn<F, Fut, E>(&self, operation: F, context: impl Into<String>) -> Uuid
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), E>> + Send + 'static,
        E: Into<BoxError> + 'static,
    {
        let operation: Operation = Arc::new(move || -> OperationFuture {
            let fut = operation();
            Box::pin(async move { fut.await.map_err(|e| -> BoxError { e.into() }) })
        });
        self.enqueue(operation, context)
    }

    fn push(&self, entry: QueuedOperation) {
        let mut entries = self.entries();

        if self.policy.dedupe_by_context {
            entries.retain(|existing| {
                let duplicate = existing.context == entry.context;
                if duplicate {
                    tracing::debug!(op_id = %existing.id, context = %existing.context, "Replacing duplicate queued operation");
                }
                !duplicate
            });
        }

        if let Some(max) = self.policy.max_entries {
            while entries.len() >= max.max(1) {
                let evicted = entries.remove(0);
                tracing::warn!(
                    op_id = %evicted.id,
                    context = %evicted.context,
                    max_entries = max,
                    "Queue full, dropping oldest operation"
                );
            }
        }

        entries.push(entry);
        metrics::record_queue_depth(entries.len());
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    /// Context labels of pending entries, oldest first.
    pub fn contexts(&self) -> Vec<String> {
        self.entries().iter().map(|e| e.context.clone()).collect()
    }

    pub fn ids(&self) -> Vec<Uuid> {
        self.entries().iter().map(|e| e.id).collect()
    }

    /// Snapshot and clear the queue, then replay every entry concurrently.
    ///
    /// Entries whose replay fails are pushed back with a fresh timestamp.
    pub async fn drain_and_retry(&self) -> DrainReport {
        let batch = std::mem::take(&mut *self.entries());
        metrics::record_queue_depth(self.len());

        if batch.is_empty() {
            return DrainReport::default();
        }

        tracing::info!(count = batch.len(), "Retrying failed operations");

        let outcomes = join_all(batch.into_iter().map(|entry| async move {
            match (entry.operation)().await {
                Ok(()) => {
                    tracing::info!(op_id = %entry.id, context = %entry.context, "Successfully retried");
                    metrics::record_replay(true);
                    true
                }
                Err(e) => {
                    tracing::warn!(op_id = %entry.id, context = %entry.context, error = %e, "Retry failed, requeueing");
                    metrics::record_replay(false);
                    self.push(entry.requeued());
                    false
                }
            }
        }))
        .await;

        let attempted = outcomes.len();
        let succeeded = outcomes.iter().filter(|ok| **ok).count();
        DrainReport {
            attempted,
            succeeded,
            requeued: attempted - succeeded,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::time::Instant;

    fn counting_op(calls: &Arc<AtomicUsize>, succeed: bool) -> Operation {
        let calls = calls.clone();
        Arc::new(move || -> OperationFuture {
            let calls = calls.clone();
            Box::pin(async move {
                calls.fetch_add(1, Ordering::SeqCst);
                let outcome: Result<(), BoxError> = if succeed {
                    Ok(())
                } else {
                    Err("still unreachable".into())
                };
                outcome
            })
        })
    }

    #[tokio::test]
    async fn test_drain_requeues_only_failures() {
        let queue = FailedOperationQueue::default();
        let calls = Arc::new(AtomicUsize::new(0));

        queue.enqueue(counting_op(&calls, true), "Fetch: /a");
        queue.enqueue(counting_op(&calls, false), "Fetch: /b");
        queue.enqueue(counting_op(&calls, true), "Fetch: /c");
        queue.enqueue(counting_op(&calls, false), "Fetch: /d");

        let report = queue.drain_and_retry().await;

        assert_eq!(calls.load(Ordering::SeqCst), 4);
        assert_eq!(
            report,
            DrainReport {
                attempted: 4,
                succeeded: 2,
                requeued: 2
            }
        );
        assert_eq!(queue.len(), 2);
        let mut contexts = queue.contexts();
        contexts.sort();
        assert_eq!(contexts, vec!["Fetch: /b", "Fetch: /d"]);
    }

    #[tokio::test]
    async fn test_requeued_entry_keeps_id_with_new_timestamp() {
        let queue = FailedOperationQueue::default();
        let calls = Arc::new(AtomicUsize::new(0));
        let id = queue.enqueue(counting_op(&calls, false), "Fetch: /flaky");
        let first_stamp = queue.entries()[0].enqueued_at;

        tokio::time::sleep(Duration::from_millis(5)).await;
        queue.drain_and_retry().await;

        let entries = queue.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, id);
        assert!(entries[0].enqueued_at > first_stamp);
    }

    #[tokio::test]
    async fn test_unbounded_retries_across_drains() {
        let queue = FailedOperationQueue::default();
        let calls = Arc::new(AtomicUsize::new(0));
        queue.enqueue(counting_op(&calls, false), "Fetch: /down");

        for _ in 0..5 {
            queue.drain_and_retry().await;
        }

        assert_eq!(calls.load(Ordering::SeqCst), 5);
        assert_eq!(queue.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_drain() {
        let queue = FailedOperationQueue::default();
        assert_eq!(queue.drain_and_retry().await, DrainReport::default());
    }

    #[tokio::test(start_paused = true)]
    async fn test_replays_run_concurrently() {
        let queue = FailedOperationQueue::default();
        for i in 0..3 {
            queue.enqueue_fn(
                || async {
                    tokio::time::sleep(Duration::from_secs(1)).await;
                    Ok::<(), BoxError>(())
                },
                format!("slow-{}", i),
            );
        }

        let started = Instant::now();
        let report = queue.drain_and_retry().await;

        assert_eq!(report.succeeded, 3);
        assert_eq!(started.elapsed(), Duration::from_secs(1));
    }

    #[test]
    fn test_default_policy_keeps_duplicates() {
        let queue = FailedOperationQueue::default();
        let calls = Arc::new(AtomicUsize::new(0));
        queue.enqueue(counting_op(&calls, false), "Fetch: /same");
        queue.enqueue(counting_op(&calls, false), "Fetch: /same");
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn test_dedupe_by_context() {
        let queue = FailedOperationQueue::new(QueuePolicy {
            max_entries: None,
            dedupe_by_context: true,
        });
        let calls = Arc::new(AtomicUsize::new(0));
        queue.enqueue(counting_op(&calls, false), "Fetch: /same");
        queue.enqueue(counting_op(&calls, false), "Fetch: /other");
        let newest = queue.enqueue(counting_op(&calls, false), "Fetch: /same");

        assert_eq!(queue.contexts(), vec!["Fetch: /other", "Fetch: /same"]);
        assert_eq!(queue.entries()[1].id, newest);
    }

    #[test]
    fn test_cap_evicts_oldest() {
        let queue = FailedOperationQueue::new(QueuePolicy {
            max_entries: Some(2),
            dedupe_by_context: false,
        });
        let calls = Arc::new(AtomicUsize::new(0));
        queue.enqueue(counting_op(&calls, false), "first");
        queue.enqueue(counting_op(&calls, false), "second");
        queue.enqueue(counting_op(&calls, false), "third");

        assert_eq!(queue.contexts(), vec!["second", "third"]);
    }
}
