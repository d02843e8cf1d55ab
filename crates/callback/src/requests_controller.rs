//! Delivery of one payload to one listener, with retry.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tokio_util::sync::CancellationToken;

use crate::config::RetryPolicy;
use crate::error::{DeliveryError, TransportError};
use crate::transport::CallbackTransport;

/// Backoff to wait after the 0-indexed `attempt` failed: `min(base * 2^attempt, max)`.
pub fn backoff_delay(attempt: u32, base: Duration, max: Duration) -> Duration {
    2u32.checked_pow(attempt)
        .and_then(|factor| base.checked_mul(factor))
        .map_or(max, |delay| delay.min(max))
}

/// Sends payloads to listener endpoints, retrying transient failures.
#[derive(Clone)]
pub struct RequestsController {
    transport: Arc<dyn CallbackTransport>,
    policy: RetryPolicy,
}

impl RequestsController {
    pub fn new(transport: Arc<dyn CallbackTransport>, policy: RetryPolicy) -> Self {
        Self { transport, policy }
    }

    /// Deliver `data` to `endpoint`.
    ///
    /// A response below 500 ends the loop with success. A 5xx response or a network error
    /// is retried after [`backoff_delay`], up to `max_attempts` attempts in total. No wait
    /// follows the final attempt.
    ///
    /// # Errors
    ///
    /// * [`DeliveryError::Fatal`] if the request cannot be built. Not retried.
    /// * [`DeliveryError::Cancelled`] if `cancel` fires during an attempt or a backoff wait.
    /// * [`DeliveryError::MaxRetries`] once every attempt has failed.
    pub async fn send_request_with_retry(
        &self,
        cancel: &CancellationToken,
        endpoint: &str,
        data: Bytes,
    ) -> Result<(), DeliveryError> {
        let max_attempts = self.policy.max_attempts.max(1);

        for attempt in 0..max_attempts {
            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(cancelled(endpoint)),
                outcome = self.transport.post(endpoint, data.clone(), self.policy.request_timeout) => outcome,
            };

            match outcome {
                Ok(status) if status < 500 => {
                    tracing::info!(endpoint, status, "callback delivered");
                    return Ok(());
                }
                Ok(status) => {
                    tracing::warn!(endpoint, status, attempt, "server error from listener");
                }
                Err(TransportError::Network(reason)) => {
                    tracing::warn!(endpoint, attempt, %reason, "error sending callback");
                }
                Err(TransportError::InvalidRequest(reason)) => {
                    tracing::error!(endpoint, %reason, "callback request cannot be sent");
                    return Err(DeliveryError::Fatal {
                        endpoint: endpoint.to_owned(),
                        reason,
                    });
                }
            }

            if attempt + 1 == max_attempts {
                break;
            }

            let delay = backoff_delay(attempt, self.policy.base_delay, self.policy.max_delay);
            tracing::debug!(endpoint, ?delay, "retrying callback");
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(cancelled(endpoint)),
                _ = tokio::time::sleep(delay) => {}
            }
        }

        Err(DeliveryError::MaxRetries {
            endpoint: endpoint.to_owned(),
        })
    }
}

fn cancelled(endpoint: &str) -> DeliveryError {
    tracing::debug!(endpoint, "callback delivery cancelled");
    DeliveryError::Cancelled {
        endpoint: endpoint.to_owned(),
    }
}
