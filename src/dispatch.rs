use crate::hook::Shared;
use crate::record::LogRecord;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

/// How `fire` hands a record to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DispatchMode {
    /// The caller waits for the write and gets its result.
    #[default]
    Sync,
    /// The record is queued for a worker and `fire` returns at once.
    Async,
}

/// What to do with a record when the async queue is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverflowPolicy {
    /// Discard the incoming record.
    #[default]
    DropNewest,
    /// Evict the oldest queued record to make room.
    DropOldest,
}

/// Counters kept by a hook.
#[derive(Debug, Default)]
pub struct DispatchStats {
    submitted: AtomicU64,
    written: AtomicU64,
    failed: AtomicU64,
    dropped: AtomicU64,
}

/// Point-in-time copy of [`DispatchStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatsSnapshot {
    /// Records handed to `fire`.
    pub submitted: u64,
    /// Documents the backend accepted.
    pub written: u64,
    /// Writes the backend rejected.
    pub failed: u64,
    /// Records discarded by the async queue without a write.
    pub dropped: u64,
}

impl DispatchStats {
    pub(crate) fn record_submitted(&self) {
        self.submitted.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_written(&self) {
        self.written.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            submitted: self.submitted.load(Ordering::Relaxed),
            written: self.written.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Pushed {
    Queued,
    /// Queued after evicting the oldest record.
    Evicted,
    Rejected,
}

struct QueueState {
    jobs: VecDeque<LogRecord>,
    closed: bool,
}

/// Fixed-capacity record queue shared by the workers.
struct WorkQueue {
    state: Mutex<QueueState>,
    capacity: usize,
    policy: OverflowPolicy,
    ready: Notify,
}

impl WorkQueue {
    fn new(capacity: usize, policy: OverflowPolicy) -> Self {
        WorkQueue {
            state: Mutex::new(QueueState {
                jobs: VecDeque::with_capacity(capacity),
                closed: false,
            }),
            capacity,
            policy,
            ready: Notify::new(),
        }
    }

    fn push(&self, record: LogRecord) -> Pushed {
        let pushed = {
            let mut state = self.state.lock();
            if state.closed {
                return Pushed::Rejected;
            }
            if state.jobs.len() < self.capacity {
                state.jobs.push_back(record);
                Pushed::Queued
            } else {
                match self.policy {
                    OverflowPolicy::DropNewest => return Pushed::Rejected,
                    OverflowPolicy::DropOldest => {
                        state.jobs.pop_front();
                        state.jobs.push_back(record);
                        Pushed::Evicted
                    }
                }
            }
        };
        self.ready.notify_one();
        pushed
    }

    /// Next record, or `None` once the queue is closed and empty.
    async fn pop(&self) -> Option<LogRecord> {
        loop {
            let notified = self.ready.notified();
            tokio::pin!(notified);
            {
                let mut state = self.state.lock();
                if let Some(record) = state.jobs.pop_front() {
                    return Some(record);
                }
                if state.closed {
                    return None;
                }
                // register before unlocking so close() cannot slip past
                notified.as_mut().enable();
            }
            notified.await;
        }
    }

    fn close(&self) {
        self.state.lock().closed = true;
        self.ready.notify_waiters();
    }
}

/// Worker pool behind async mode.
pub(crate) struct Dispatcher {
    queue: Arc<WorkQueue>,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl Dispatcher {
    /// Spawn `workers` tasks draining a queue of `capacity` records.
    ///
    /// Both values are raised to at least one.
    pub(crate) fn spawn(shared: Arc<Shared>, capacity: usize, workers: usize, policy: OverflowPolicy) -> Self {
        let queue = Arc::new(WorkQueue::new(capacity.max(1), policy));

        let handles = (0..workers.max(1))
            .map(|worker| {
                let queue = Arc::clone(&queue);
                let shared = Arc::clone(&shared);
                tokio::spawn(async move {
                    while let Some(record) = queue.pop().await {
                        match shared.write(record).await {
                            Ok(index) => tracing::debug!(worker, %index, "log document written"),
                            Err(err) => tracing::warn!(worker, error = %err, "log document lost"),
                        }
                    }
                })
            })
            .collect();

        Dispatcher {
            queue,
            workers: Mutex::new(handles),
        }
    }

    /// Enqueue without waiting. Discarded records are counted as dropped.
    pub(crate) fn submit(&self, record: LogRecord, stats: &DispatchStats) {
        match self.queue.push(record) {
            Pushed::Queued => {}
            Pushed::Evicted | Pushed::Rejected => stats.record_dropped(),
        }
    }

    /// Stop accepting records; workers exit once the queue is drained.
    pub(crate) fn close(&self) {
        self.queue.close();
    }

    /// Close the queue and wait for every worker to finish.
    pub(crate) async fn shutdown(&self) {
        self.close();
        let handles: Vec<JoinHandle<()>> = std::mem::take(&mut *self.workers.lock());
        for handle in handles {
            if let Err(err) = handle.await {
                tracing::warn!(error = %err, "log worker ended abnormally");
            }
        }
    }
}
