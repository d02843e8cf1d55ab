//! Bounded queue between content mutations and the dispatcher.
//!
//! Producers hold a cloneable [`CallbackSender`]. The single consumer, the dispatch loop,
//! owns the [`CallbackReceiver`]. When every sender is dropped the receiver yields `None`
//! and the loop ends.

use keeper_core::ChangeNotifier;
use tokio::sync::mpsc::{self, error::TrySendError};

/// A change notification: the content of `file_id` was created, edited or deleted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallbackRequest {
    pub file_id: String,
}

impl CallbackRequest {
    pub fn new(file_id: impl Into<String>) -> Self {
        Self {
            file_id: file_id.into(),
        }
    }
}

/// Create a notification channel holding up to `capacity` pending requests.
///
/// A capacity of zero is raised to one.
pub fn callback_channel(capacity: usize) -> (CallbackSender, CallbackReceiver) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (CallbackSender { tx }, CallbackReceiver { rx })
}

#[derive(Clone, Debug)]
pub struct CallbackSender {
    tx: mpsc::Sender<CallbackRequest>,
}

impl CallbackSender {
    /// Enqueue a request, waiting for capacity if the channel is full.
    ///
    /// Returns `false` if the receiver is gone; the request is logged and dropped.
    pub async fn send(&self, request: CallbackRequest) -> bool {
        match self.tx.send(request).await {
            Ok(()) => true,
            Err(mpsc::error::SendError(request)) => {
                tracing::warn!(
                    file_id = %request.file_id,
                    "callback channel closed, dropping notification"
                );
                false
            }
        }
    }

    /// Enqueue a request without ever blocking the caller.
    ///
    /// When the channel is full, the send moves to a detached task that waits for capacity,
    /// so notifications are not lost while the dispatcher is alive.
    pub fn notify_file(&self, file_id: &str) {
        match self.tx.try_send(CallbackRequest::new(file_id)) {
            Ok(()) => {
                tracing::debug!(file_id, "notification queued");
            }
            Err(TrySendError::Full(request)) => {
                let Ok(handle) = tokio::runtime::Handle::try_current() else {
                    tracing::error!(
                        file_id,
                        "callback channel full outside a runtime, dropping notification"
                    );
                    return;
                };
                tracing::debug!(file_id, "callback channel full, deferring notification");
                let sender = self.clone();
                handle.spawn(async move {
                    sender.send(request).await;
                });
            }
            Err(TrySendError::Closed(request)) => {
                tracing::warn!(
                    file_id = %request.file_id,
                    "callback channel closed, dropping notification"
                );
            }
        }
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

impl ChangeNotifier for CallbackSender {
    fn notify(&self, file_id: &str) {
        self.notify_file(file_id);
    }
}

#[derive(Debug)]
pub struct CallbackReceiver {
    rx: mpsc::Receiver<CallbackRequest>,
}

impl CallbackReceiver {
    /// Next pending request, or `None` once every sender has been dropped.
    pub async fn recv(&mut self) -> Option<CallbackRequest> {
        self.rx.recv().await
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn test_send_and_receive_in_order() {
        let (tx, mut rx) = callback_channel(4);
        assert!(tx.send(CallbackRequest::new("a")).await);
        assert!(tx.send(CallbackRequest::new("b")).await);

        assert_eq!(rx.recv().await, Some(CallbackRequest::new("a")));
        assert_eq!(rx.recv().await, Some(CallbackRequest::new("b")));
    }

    #[tokio::test]
    async fn test_cloned_senders_share_the_queue() {
        let (tx, mut rx) = callback_channel(4);
        let other = tx.clone();
        other.notify("x");
        tx.notify("y");

        let mut got = vec![rx.recv().await.unwrap().file_id, rx.recv().await.unwrap().file_id];
        got.sort();
        assert_eq!(got, ["x", "y"]);
    }

    #[tokio::test]
    async fn test_zero_capacity_is_raised_to_one() {
        let (tx, mut rx) = callback_channel(0);
        tx.notify("only");
        assert_eq!(rx.recv().await.unwrap().file_id, "only");
    }

    #[tokio::test]
    async fn test_full_channel_defers_instead_of_dropping() {
        let (tx, mut rx) = callback_channel(1);
        tx.notify("first");
        // Channel is full now; this must not block and must not be lost.
        tx.notify("second");

        assert_eq!(rx.recv().await.unwrap().file_id, "first");
        let second = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap();
        assert_eq!(second.unwrap().file_id, "second");
    }

    #[tokio::test]
    async fn test_send_after_receiver_dropped() {
        let (tx, rx) = callback_channel(1);
        drop(rx);
        assert!(tx.is_closed());
        assert!(!tx.send(CallbackRequest::new("gone")).await);
        // Must not panic.
        tx.notify("gone");
    }

    #[tokio::test]
    async fn test_receiver_ends_when_senders_dropped() {
        let (tx, mut rx) = callback_channel(1);
        drop(tx);
        assert_eq!(rx.recv().await, None);
    }
}
