//! Pluggable request transport.
//!
//! Feeds only ever talk to a [`Transport`]. The default implementation is
//! [`ReqwestTransport`]; tests and embedders can provide their own.

use async_trait::async_trait;

use crate::http_client::{ClientRequest, Response, Result};

/// Sends a validated [`ClientRequest`] and returns the raw response.
///
/// Implementations return `Ok` for every HTTP status and reserve `Err` for
/// failures to obtain a response at all.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform the request.
    async fn send(&self, request: &ClientRequest) -> Result<Response>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    async fn send(&self, request: &ClientRequest) -> Result<Response> {
        (**self).send(request).await
    }
}

#[cfg(feature = "reqwest")]
pub use self::reqwest_transport::ReqwestTransport;

#[cfg(feature = "reqwest")]
mod reqwest_transport {
    use std::time::Duration;

    use async_trait::async_trait;
    use tracing::warn;

    use super::Transport;
    use crate::http_client::{ClientError, ClientRequest, Response, Result};

    /// [`Transport`] backed by a shared `reqwest` client.
    #[derive(Debug, Clone)]
    pub struct ReqwestTransport {
        http: reqwest::Client,
    }

    impl ReqwestTransport {
        /// Build a transport with a default per-request timeout.
        pub fn new(timeout_ms: u64) -> Result<Self> {
            let http = reqwest::Client::builder()
                .timeout(Duration::from_millis(timeout_ms))
                .build()
                .map_err(|e| ClientError::Connection(format!("failed to create HTTP client: {e}")))?;
            Ok(Self { http })
        }

        /// Wrap an existing client.
        pub const fn with_client(http: reqwest::Client) -> Self {
            Self { http }
        }
    }

    #[async_trait]
    impl Transport for ReqwestTransport {
        async fn send(&self, request: &ClientRequest) -> Result<Response> {
            let mut builder = self.http.get(request.url().clone());
            for (name, value) in request.headers() {
                builder = builder.header(name.as_str(), value.as_str());
            }
            if let Some(timeout) = request.timeout_duration() {
                builder = builder.timeout(timeout);
            }

            let response = builder
                .send()
                .await
                .map_err(|e| map_reqwest_error(&e, request.timeout()))?;

            let status = response.status().as_u16();
            let headers = response
                .headers()
                .iter()
                .filter_map(|(name, value)| {
                    value
                        .to_str()
                        .ok()
                        .map(|v| (name.as_str().to_string(), v.to_string()))
                })
                .collect();
            let body = response
                .bytes()
                .await
                .map_err(|e| map_reqwest_error(&e, request.timeout()))?;

            Ok(Response::new(status, headers, body.to_vec()))
        }
    }

    fn map_reqwest_error(err: &reqwest::Error, timeout_ms: Option<u64>) -> ClientError {
        if err.is_timeout() {
            ClientError::Timeout { timeout_ms }
        } else if err.is_builder() {
            ClientError::InvalidUrl(err.to_string())
        } else if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            warn!(error = %err, "request failed");
            ClientError::Connection(err.to_string())
        }
    }
}
