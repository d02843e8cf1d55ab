//! The dispatch loop: drains the notification channel and fans each payload out to the
//! file's listeners.
//!
//! Every notification is handled in its own task, so the loop goes straight back to
//! waiting on the channel. Within a notification, deliveries run concurrently behind a
//! semaphore. A failing delivery is logged and counted, and never affects its siblings.

use std::sync::Arc;

use bytes::Bytes;
use keeper_core::models::Listener;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::assembly::{prepare_listeners_data, NotificationSource};
use crate::channel::{CallbackReceiver, CallbackRequest};
use crate::error::CallbackResult;
use crate::requests_controller::RequestsController;

/// Outcome counts for one notification.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    pub delivered: usize,
    pub failed: usize,
}

/// Consumer side of the callback pipeline.
pub struct CallbackService {
    receiver: CallbackReceiver,
    handler: NotificationHandler,
}

impl CallbackService {
    /// # Arguments
    ///
    /// * `receiver` - Consumer end of the notification channel.
    /// * `source` - Read access to files, contents and listeners.
    /// * `controller` - Per-listener delivery with retry.
    /// * `max_concurrent` - In-flight deliveries allowed per notification. Zero is raised to one.
    pub fn new(
        receiver: CallbackReceiver,
        source: Arc<dyn NotificationSource>,
        controller: RequestsController,
        max_concurrent: usize,
    ) -> Self {
        Self {
            receiver,
            handler: NotificationHandler {
                source,
                controller,
                max_concurrent: max_concurrent.max(1),
            },
        }
    }

    /// Run until `cancel` fires or every sender has been dropped.
    ///
    /// Notifications already being handled when the loop stops are awaited before this
    /// returns. Their deliveries observe `cancel` themselves.
    pub async fn run(mut self, cancel: CancellationToken) {
        tracing::info!("callback service started");
        let mut in_flight = JoinSet::new();

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::info!("stopping callback service");
                    break;
                }
                Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                    if let Err(err) = joined {
                        tracing::error!(%err, "callback handler task failed");
                    }
                }
                request = self.receiver.recv() => {
                    let Some(request) = request else {
                        tracing::info!("callback channel closed, stopping callback service");
                        break;
                    };
                    tracing::info!(file_id = %request.file_id, "received callback request");
                    let handler = self.handler.clone();
                    let cancel = cancel.clone();
                    in_flight.spawn(async move {
                        // Failures are logged inside; the loop only cares that the task ended.
                        let _ = handler.handle(request, &cancel).await;
                    });
                }
            }
        }

        while let Some(joined) = in_flight.join_next().await {
            if let Err(err) = joined {
                tracing::error!(%err, "callback handler task failed");
            }
        }
        tracing::info!("callback service stopped");
    }

    /// Handle a single notification outside the loop.
    pub async fn handle_notification(
        &self,
        request: CallbackRequest,
        cancel: &CancellationToken,
    ) -> CallbackResult<DispatchSummary> {
        self.handler.handle(request, cancel).await
    }
}

#[derive(Clone)]
struct NotificationHandler {
    source: Arc<dyn NotificationSource>,
    controller: RequestsController,
    max_concurrent: usize,
}

impl NotificationHandler {
    async fn handle(
        &self,
        request: CallbackRequest,
        cancel: &CancellationToken,
    ) -> CallbackResult<DispatchSummary> {
        let (listeners, payload) =
            match prepare_listeners_data(self.source.as_ref(), &request.file_id).await {
                Ok(prepared) => prepared,
                Err(err) => {
                    tracing::error!(file_id = %request.file_id, %err, "error while preparing callback data");
                    return Err(err);
                }
            };

        if listeners.is_empty() {
            tracing::debug!(file_id = %request.file_id, "no listeners registered");
            return Ok(DispatchSummary::default());
        }

        let summary = self.send_to_listeners(cancel, listeners, payload).await;
        if summary.failed > 0 {
            tracing::error!(
                file_id = %request.file_id,
                failed = summary.failed,
                delivered = summary.delivered,
                "error while sending callbacks"
            );
        }
        Ok(summary)
    }

    async fn send_to_listeners(
        &self,
        cancel: &CancellationToken,
        listeners: Vec<Listener>,
        payload: Bytes,
    ) -> DispatchSummary {
        let limiter = Arc::new(Semaphore::new(self.max_concurrent));
        let mut deliveries = JoinSet::new();
        let mut summary = DispatchSummary::default();

        for listener in listeners {
            let Ok(permit) = limiter.clone().acquire_owned().await else {
                tracing::error!("callback limiter closed");
                summary.failed += 1;
                continue;
            };
            let controller = self.controller.clone();
            let cancel = cancel.clone();
            let payload = payload.clone();
            deliveries.spawn(async move {
                let _permit = permit;
                let result = controller
                    .send_request_with_retry(&cancel, &listener.callback_endpoint, payload)
                    .await;
                (listener, result)
            });
        }

        while let Some(joined) = deliveries.join_next().await {
            match joined {
                Ok((_, Ok(()))) => summary.delivered += 1,
                Ok((listener, Err(err))) => {
                    tracing::error!(listener_id = %listener.id, %err, "callback delivery failed");
                    summary.failed += 1;
                }
                Err(err) => {
                    tracing::error!(%err, "callback delivery task failed");
                    summary.failed += 1;
                }
            }
        }

        summary
    }
}
