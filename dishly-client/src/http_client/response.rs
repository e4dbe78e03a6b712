//! HTTP response from API requests.

use serde::de::DeserializeOwned;

use super::error::{ClientError, Result};
use crate::constants::MAX_ERROR_BODY_CHARS;

/// HTTP response from an API request.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct Response {
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl Response {
    /// Create a new response.
    #[must_use]
    pub const fn new(status: u16, headers: Vec<(String, String)>, body: Vec<u8>) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Response with a JSON body.
    #[must_use]
    pub fn json_body(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self::new(
            status,
            vec![("content-type".to_string(), crate::constants::MIME_JSON.to_string())],
            body.into(),
        )
    }

    /// Check if response is successful (2xx).
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// `204 No Content`.
    #[must_use]
    pub const fn is_no_content(&self) -> bool {
        self.status == 204
    }

    /// Turn a non-2xx response into [`ClientError::Status`].
    ///
    /// The error keeps the first characters of the body for diagnostics.
    pub fn error_for_status(self) -> Result<Self> {
        if self.is_success() {
            return Ok(self);
        }
        let body = String::from_utf8_lossy(&self.body)
            .chars()
            .take(MAX_ERROR_BODY_CHARS)
            .collect();
        Err(ClientError::Status {
            status: self.status,
            body,
        })
    }

    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(|e| ClientError::Decode(e.to_string()))
    }
}
