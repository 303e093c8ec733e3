//! Asynchronous audit queue.
//!
//! Lifecycle operations hand events to an [`AuditPublisher`] after their unit
//! of work commits. The publisher never waits: events go onto a bounded
//! channel and a background worker drains them into an [`AuditSink`]. A full
//! queue, a closed worker, or a failing sink costs the event, never the
//! operation that produced it.

mod sink;

pub use sink::SqlAuditSink;

use std::sync::Arc;

use gg_core::entities::AuditEvent;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::ports::AuditSink;

enum AuditMessage {
    Event(AuditEvent),
    Flush(oneshot::Sender<()>),
}

/// Handle for enqueueing audit events.
#[derive(Clone)]
pub struct AuditPublisher {
    tx: Option<mpsc::Sender<AuditMessage>>,
}

impl AuditPublisher {
    /// Spawn the worker on the current Tokio runtime.
    ///
    /// The worker exits once every publisher clone is dropped and the queue
    /// is drained.
    #[must_use]
    pub fn spawn(sink: Arc<dyn AuditSink>, capacity: usize) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let handle = tokio::spawn(run_worker(rx, sink));
        (Self { tx: Some(tx) }, handle)
    }

    /// A publisher that discards every event.
    #[must_use]
    pub const fn disabled() -> Self {
        Self { tx: None }
    }

    /// Enqueue an event without waiting.
    pub fn publish(&self, event: AuditEvent) {
        let Some(tx) = &self.tx else {
            return;
        };
        let request_id = event.request_id.clone();
        let action = event.action;
        match tx.try_send(AuditMessage::Event(event)) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!(%request_id, %action, "audit queue full, event dropped");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                warn!(%request_id, %action, "audit worker stopped, event dropped");
            }
        }
    }

    /// Wait until every event enqueued before this call has been handed to
    /// the sink.
    pub async fn flush(&self) {
        let Some(tx) = &self.tx else {
            return;
        };
        let (ack_tx, ack_rx) = oneshot::channel();
        if tx.send(AuditMessage::Flush(ack_tx)).await.is_err() {
            return;
        }
        let _ = ack_rx.await;
    }
}

async fn run_worker(mut rx: mpsc::Receiver<AuditMessage>, sink: Arc<dyn AuditSink>) {
    while let Some(message) = rx.recv().await {
        match message {
            AuditMessage::Event(event) => {
                if let Err(e) = sink.append(&event).await {
                    warn!(
                        request_id = %event.request_id,
                        action = %event.action,
                        error = %e,
                        "failed to record audit event"
                    );
                }
            }
            AuditMessage::Flush(ack) => {
                let _ = ack.send(());
            }
        }
    }
    debug!("audit worker stopped");
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use chrono::Utc;
    use gg_core::enums::AuditAction;
    use pretty_assertions::assert_eq;

    use super::*;

    #[derive(Default)]
    struct RecordingSink {
        events: Mutex<Vec<AuditEvent>>,
    }

    #[async_trait::async_trait]
    impl AuditSink for RecordingSink {
        async fn append(&self, event: &AuditEvent) -> anyhow::Result<()> {
            self.events.lock().unwrap().push(event.clone());
            Ok(())
        }
    }

    struct FailingSink;

    #[async_trait::async_trait]
    impl AuditSink for FailingSink {
        async fn append(&self, _event: &AuditEvent) -> anyhow::Result<()> {
            anyhow::bail!("sink offline")
        }
    }

    fn event(request_id: &str) -> AuditEvent {
        AuditEvent {
            request_id: request_id.into(),
            user_id: Some("usr-00000001".into()),
            action: AuditAction::StatusChanged,
            details: serde_json::json!({"from": "IN_PROGRESS", "to": "REPAIRED"}),
            occurred_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn delivers_in_order_after_flush() {
        let sink = Arc::new(RecordingSink::default());
        let (publisher, _worker) = AuditPublisher::spawn(sink.clone(), 8);
        publisher.publish(event("req-00000001"));
        publisher.publish(event("req-00000002"));
        publisher.flush().await;

        let ids: Vec<String> = sink
            .events
            .lock()
            .unwrap()
            .iter()
            .map(|e| e.request_id.clone())
            .collect();
        assert_eq!(ids, vec!["req-00000001", "req-00000002"]);
    }

    #[tokio::test]
    async fn failing_sink_does_not_stop_worker() {
        let (publisher, worker) = AuditPublisher::spawn(Arc::new(FailingSink), 8);
        publisher.publish(event("req-00000001"));
        publisher.flush().await;
        publisher.publish(event("req-00000002"));
        publisher.flush().await;
        assert!(!worker.is_finished());
    }

    #[tokio::test]
    async fn worker_exits_when_publishers_drop() {
        let sink = Arc::new(RecordingSink::default());
        let (publisher, worker) = AuditPublisher::spawn(sink.clone(), 8);
        publisher.publish(event("req-00000001"));
        drop(publisher);
        worker.await.unwrap();
        assert_eq!(sink.events.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn disabled_publisher_is_a_no_op() {
        let publisher = AuditPublisher::disabled();
        publisher.publish(event("req-00000001"));
        publisher.flush().await;
    }
}
