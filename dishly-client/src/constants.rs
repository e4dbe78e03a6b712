//! Centralized constants for the dishly-client crate.
//!
//! # Environment Variables
//!
//! | Variable            | Default                 | Description                      |
//! |---------------------|-------------------------|----------------------------------|
//! | `DISHLY_API_URL`    | `http://localhost:8080` | Base URL of the Dishly API       |
//! | `DISHLY_PAGE_LIMIT` | 10                      | Items requested per page         |
//! | `DISHLY_TIMEOUT_MS` | 30000                   | Per-request timeout              |
//! | `DISHLY_CONFIG`     | (none)                  | Path of a TOML config file (CLI) |
//! | `DISHLY_TOKEN`      | (none)                  | Bearer token (CLI)               |

// ============================================================================
// DEFAULTS
// ============================================================================

/// API base URL used when none is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Request timeout used when none is configured.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Longest response body kept in a [`ClientError::Status`](crate::ClientError::Status).
pub const MAX_ERROR_BODY_CHARS: usize = 200;

// ============================================================================
// ENVIRONMENT VARIABLES
// ============================================================================

/// Overrides the API base URL.
pub const ENV_API_URL: &str = "DISHLY_API_URL";

/// Overrides the page size.
pub const ENV_PAGE_LIMIT: &str = "DISHLY_PAGE_LIMIT";

/// Overrides the request timeout, in milliseconds.
pub const ENV_TIMEOUT_MS: &str = "DISHLY_TIMEOUT_MS";

/// Path of a TOML configuration file.
pub const ENV_CONFIG_PATH: &str = "DISHLY_CONFIG";

/// Bearer token for authenticated feeds.
pub const ENV_TOKEN: &str = "DISHLY_TOKEN";

// ============================================================================
// HTTP
// ============================================================================

/// `Accept` header name.
pub const HEADER_ACCEPT: &str = "Accept";

/// `Authorization` header name.
pub const HEADER_AUTHORIZATION: &str = "Authorization";

/// JSON media type.
pub const MIME_JSON: &str = "application/json";

/// Query parameter carrying the page size.
pub const QUERY_LIMIT: &str = "limit";

/// Query parameter carrying the cursor.
pub const QUERY_CURSOR: &str = "cursor";
