// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fire-and-forget usage recording.
//!
//! Records go onto a bounded queue drained by one background task. The
//! request path never waits on the store and never sees its errors.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use switchyard_core::{SwitchyardError, UsageRecord, UsageStore};

enum Command {
    Record(Box<UsageRecord>),
    /// Acknowledged once every earlier command has been handled.
    Flush(oneshot::Sender<()>),
}

/// Handle to the background usage writer. Cheap to clone.
#[derive(Clone)]
pub struct UsageRecorder {
    tx: mpsc::Sender<Command>,
    dropped: Arc<AtomicU64>,
    failed: Arc<AtomicU64>,
}

impl UsageRecorder {
    /// Spawn the writer task on the current runtime.
    ///
    /// The task ends once every handle is dropped and the queue is drained.
    pub fn spawn(store: Arc<dyn UsageStore>, capacity: usize) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let failed = Arc::new(AtomicU64::new(0));
        let handle = tokio::spawn(run_writer(store, rx, Arc::clone(&failed)));
        let recorder = Self {
            tx,
            dropped: Arc::new(AtomicU64::new(0)),
            failed,
        };
        (recorder, handle)
    }

    /// Queue a record. Never blocks, never errors; a full queue drops it.
    pub fn record(&self, record: UsageRecord) {
        match self.tx.try_send(Command::Record(Box::new(record))) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(Command::Record(record))) => {
                let dropped = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                warn!(
                    caller_id = %record.caller_id,
                    provider = %record.provider,
                    status = %record.status,
                    dropped,
                    "usage queue full; record dropped"
                );
            }
            Err(_) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                warn!("usage writer stopped; record dropped");
            }
        }
    }

    /// Wait until every record queued before this call has been handled.
    pub async fn flush(&self) -> Result<(), SwitchyardError> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.tx
            .send(Command::Flush(ack_tx))
            .await
            .map_err(|_| SwitchyardError::Internal("usage writer stopped".into()))?;
        ack_rx
            .await
            .map_err(|_| SwitchyardError::Internal("usage writer stopped".into()))
    }

    /// Records discarded because the queue was full or closed.
    pub fn dropped_count(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Records the store refused to persist.
    pub fn failed_count(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }
}

async fn run_writer(
    store: Arc<dyn UsageStore>,
    mut rx: mpsc::Receiver<Command>,
    failed: Arc<AtomicU64>,
) {
    while let Some(command) = rx.recv().await {
        match command {
            Command::Record(record) => {
                if let Err(e) = store.insert_usage(&record).await {
                    failed.fetch_add(1, Ordering::Relaxed);
                    warn!(
                        error = %e,
                        record_id = %record.id,
                        provider = %record.provider,
                        "usage record not persisted"
                    );
                }
            }
            Command::Flush(ack) => {
                let _ = ack.send(());
            }
        }
    }
    debug!("usage writer stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use switchyard_core::UsageStatus;
    use switchyard_test_utils::MemoryUsageStore;

    fn record(provider: &str) -> UsageRecord {
        UsageRecord::new("caller", "agent", provider, "model", UsageStatus::Success)
    }

    #[tokio::test]
    async fn flush_waits_for_queued_records() {
        let store = Arc::new(MemoryUsageStore::new());
        let (recorder, _handle) = UsageRecorder::spawn(store.clone(), 8);

        recorder.record(record("openai"));
        recorder.record(record("anthropic"));
        recorder.flush().await.unwrap();

        let providers: Vec<String> = store.records().into_iter().map(|r| r.provider).collect();
        assert_eq!(providers, ["openai", "anthropic"]);
    }

    #[tokio::test]
    async fn store_failures_are_swallowed_and_counted() {
        let store = Arc::new(MemoryUsageStore::new());
        store.fail_writes(true);
        let (recorder, _handle) = UsageRecorder::spawn(store.clone(), 8);

        recorder.record(record("openai"));
        recorder.flush().await.unwrap();

        assert!(store.records().is_empty());
        assert_eq!(recorder.failed_count(), 1);
    }

    #[tokio::test]
    async fn full_queue_drops_instead_of_blocking() {
        let store = Arc::new(MemoryUsageStore::new());
        store.pause_writes();
        let (recorder, _handle) = UsageRecorder::spawn(store.clone(), 1);

        // The writer takes the first record and parks inside the store; the
        // second fills the queue; the rest are dropped.
        recorder.record(record("a"));
        tokio::task::yield_now().await;
        store.wait_for_parked_write().await;
        for _ in 0..4 {
            recorder.record(record("b"));
        }
        assert_eq!(recorder.dropped_count(), 3);

        store.resume_writes();
        recorder.flush().await.unwrap();
        assert_eq!(store.records().len(), 2);
    }

    #[tokio::test]
    async fn writer_stops_when_handles_drop() {
        let store = Arc::new(MemoryUsageStore::new());
        let (recorder, handle) = UsageRecorder::spawn(store.clone(), 4);
        recorder.record(record("a"));
        drop(recorder);
        handle.await.unwrap();
        assert_eq!(store.records().len(), 1);
    }
}
