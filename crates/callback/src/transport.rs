//! Outbound HTTP used to reach listener endpoints.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
#[cfg(test)]
use mockall::automock;
use reqwest::header::CONTENT_TYPE;

use crate::error::TransportError;

/// One POST of a JSON payload to a listener endpoint.
///
/// Implementations return the HTTP status code of the response. Classification into
/// success and retry is left to [`crate::RequestsController`].
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CallbackTransport: Send + Sync {
    async fn post(
        &self,
        endpoint: &str,
        body: Bytes,
        timeout: Duration,
    ) -> Result<u16, TransportError>;
}

/// [`CallbackTransport`] backed by a shared `reqwest` client.
#[derive(Clone, Debug, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CallbackTransport for HttpTransport {
    async fn post(
        &self,
        endpoint: &str,
        body: Bytes,
        timeout: Duration,
    ) -> Result<u16, TransportError> {
        let response = self
            .client
            .post(endpoint)
            .header(CONTENT_TYPE, "application/json")
            .timeout(timeout)
            .body(body)
            .send()
            .await
            .map_err(classify)?;
        Ok(response.status().as_u16())
    }
}

fn classify(err: reqwest::Error) -> TransportError {
    if err.is_builder() {
        TransportError::InvalidRequest(err.to_string())
    } else {
        TransportError::Network(err.to_string())
    }
}
