//! HTTP client error types.

/// Errors returned while building, sending or decoding an API request.
///
/// ```
/// use dishly_client::ClientError;
///
/// let err = ClientError::Status { status: 503, body: "maintenance".to_string() };
/// assert!(err.is_retryable());
/// assert_eq!(err.status(), Some(503));
///
/// let err = ClientError::Decode("expected `items`".to_string());
/// assert!(!err.is_retryable());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ClientError {
    /// The request URL is malformed or not http(s).
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// A header value would break the request framing.
    ///
    /// Header values must not contain CR (`\r`) or LF (`\n`).
    #[error("invalid header: {0}")]
    InvalidHeader(String),

    /// The server could not be reached or the connection broke mid-response.
    #[error("connection failed: {0}")]
    Connection(String),

    /// No response within the configured timeout.
    #[error("{}", timeout_message(.timeout_ms))]
    Timeout {
        /// Configured timeout, if known.
        timeout_ms: Option<u64>,
    },

    /// The server answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    Status {
        /// Status code.
        status: u16,
        /// Start of the response body.
        body: String,
    },

    /// The response body is not the expected JSON.
    #[error("failed to decode response: {0}")]
    Decode(String),
}

impl ClientError {
    /// Whether the same request may succeed if sent again.
    ///
    /// Connection failures, timeouts, `429 Too Many Requests` and 5xx answers
    /// are transient. Everything else will fail the same way.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Connection(_) | Self::Timeout { .. } => true,
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            Self::InvalidUrl(_) | Self::InvalidHeader(_) | Self::Decode(_) => false,
        }
    }

    /// HTTP status of a [`Status`](Self::Status) error.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[allow(clippy::ref_option)]
fn timeout_message(timeout_ms: &Option<u64>) -> String {
    match timeout_ms {
        Some(ms) => format!("request timed out after {ms}ms"),
        None => "request timed out".to_string(),
    }
}

/// Result type for HTTP client operations.
pub type Result<T> = std::result::Result<T, ClientError>;
