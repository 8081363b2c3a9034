//! Bounded queues connecting the pool roles.

use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};

use super::types::{Message, OutcomeKind, WorkItem};

/// Sending half of the work queue.
pub type WorkSender = mpsc::Sender<Message<WorkItem>>;

/// Sending half of an outcome queue.
pub type OutcomeSender = mpsc::Sender<Message<String>>;

/// Receiving half of the work queue, shared by every worker.
///
/// Cloning yields another consumer of the same queue: each message is
/// delivered to exactly one of them.
#[derive(Clone)]
pub struct WorkQueue {
    rx: Arc<Mutex<mpsc::Receiver<Message<WorkItem>>>>,
}

impl WorkQueue {
    /// Waits for the next message. `None` means every sender is gone.
    pub async fn recv(&self) -> Option<Message<WorkItem>> {
        self.rx.lock().await.recv().await
    }
}

/// Creates the bounded work queue.
pub fn work_queue(capacity: usize) -> (WorkSender, WorkQueue) {
    let (tx, rx) = mpsc::channel(capacity);
    (
        tx,
        WorkQueue {
            rx: Arc::new(Mutex::new(rx)),
        },
    )
}

/// Handle for emitting outcomes of one kind.
///
/// Cheaply cloneable; every worker holds one per kind. A handle without a
/// queue belongs to a kind that has no log configured, so outcomes are only
/// traced.
#[derive(Clone)]
pub struct OutcomeHandle {
    kind: OutcomeKind,
    tx: Option<OutcomeSender>,
}

impl OutcomeHandle {
    /// Create a handle that forwards to a logger queue.
    pub fn new(kind: OutcomeKind, tx: OutcomeSender) -> Self {
        Self { kind, tx: Some(tx) }
    }

    /// Create a handle for a kind with no log configured.
    pub fn disabled(kind: OutcomeKind) -> Self {
        Self { kind, tx: None }
    }

    pub fn kind(&self) -> OutcomeKind {
        self.kind
    }

    /// Whether outcomes reach a logger.
    pub fn is_logged(&self) -> bool {
        self.tx.is_some()
    }

    /// Emit an outcome.
    ///
    /// Waits while the queue is full. If the logger is gone the error is
    /// traced and the caller carries on.
    pub async fn emit(&self, id: String) {
        match &self.tx {
            Some(tx) => {
                if let Err(e) = tx.send(Message::Item(id)).await {
                    tracing::error!("Failed to emit {} outcome: {}", self.kind, e);
                }
            }
            None => {
                tracing::info!("{} outcome for {} (no log configured)", self.kind, id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str) -> WorkItem {
        WorkItem::new(format!("/v/{}.mov", name), "/a").unwrap()
    }

    #[tokio::test]
    async fn test_each_item_delivered_once() {
        let (tx, queue) = work_queue(10);
        let other = queue.clone();

        tx.send(Message::Item(item("a"))).await.unwrap();
        tx.send(Message::Item(item("b"))).await.unwrap();

        let first = queue.recv().await.unwrap();
        let second = other.recv().await.unwrap();

        assert_eq!(first, Message::Item(item("a")));
        assert_eq!(second, Message::Item(item("b")));
    }

    #[tokio::test]
    async fn test_recv_none_after_senders_dropped() {
        let (tx, queue) = work_queue(1);
        drop(tx);
        assert!(queue.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_emit_forwards_to_queue() {
        let (tx, mut rx) = mpsc::channel(10);
        let handle = OutcomeHandle::new(OutcomeKind::NoAudio, tx);

        handle.emit("a".to_string()).await;

        assert!(handle.is_logged());
        assert_eq!(rx.recv().await, Some(Message::Item("a".to_string())));
    }

    #[tokio::test]
    async fn test_emit_disabled_does_not_block() {
        let handle = OutcomeHandle::disabled(OutcomeKind::Failed);
        for i in 0..1000 {
            handle.emit(format!("id-{}", i)).await;
        }
        assert!(!handle.is_logged());
        assert_eq!(handle.kind(), OutcomeKind::Failed);
    }

    #[tokio::test]
    async fn test_emit_closed_queue() {
        let (tx, rx) = mpsc::channel::<Message<String>>(10);
        let handle = OutcomeHandle::new(OutcomeKind::Failed, tx);
        drop(rx);

        // Should not panic, just trace an error
        handle.emit("a".to_string()).await;
    }

    #[test]
    fn test_try_send_full_queue() {
        let (tx, _queue) = work_queue(1);
        assert!(tx.try_send(Message::Item(item("a"))).is_ok());
        assert!(tx.try_send(Message::Item(item("b"))).is_err());
    }
}
