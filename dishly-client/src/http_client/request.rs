//! Request builder for API calls.

use std::fmt;
use std::time::Duration;

use tracing::debug;
use url::Url;

use super::error::{ClientError, Result};
use super::response::Response;
use crate::constants::{HEADER_ACCEPT, HEADER_AUTHORIZATION, MIME_JSON};
use crate::transport::Transport;

/// GET request builder for the Dishly API.
///
/// Build a request and send it through a [`Transport`].
///
/// ```
/// use dishly_client::ClientRequest;
/// use url::Url;
///
/// let base = Url::parse("https://api.dishly.app").unwrap();
/// let req = ClientRequest::get(&base, "/api/recipes/cursor")
///     .unwrap()
///     .query("limit", 10)
///     .query_opt("cursor", Some("42"))
///     .bearer(Some("tok"));
///
/// assert_eq!(req.url().as_str(), "https://api.dishly.app/api/recipes/cursor?limit=10&cursor=42");
/// assert_eq!(req.header_value("authorization"), Some("Bearer tok"));
/// ```
#[derive(Debug, Clone)]
#[must_use = "request must be sent with .send_with()"]
#[non_exhaustive]
pub struct ClientRequest {
    url: Url,
    headers: Vec<(String, String)>,
    timeout_ms: Option<u64>,
}

impl ClientRequest {
    /// Create a request for an absolute URL.
    pub fn new(url: Url) -> Self {
        Self {
            url,
            headers: vec![(HEADER_ACCEPT.to_string(), MIME_JSON.to_string())],
            timeout_ms: None,
        }
    }

    /// Create a request for `path` under `base`.
    ///
    /// Any path already on `base` is kept as a prefix, so a base of
    /// `https://host/dishly` and a path of `/api/recipes` address
    /// `https://host/dishly/api/recipes`.
    pub fn get(base: &Url, path: &str) -> Result<Self> {
        let joined = format!(
            "{}/{}",
            base.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        let url = Url::parse(&joined).map_err(|e| ClientError::InvalidUrl(format!("{joined}: {e}")))?;
        Ok(Self::new(url))
    }

    /// Append a query parameter.
    pub fn query(mut self, key: &str, value: impl fmt::Display) -> Self {
        self.url
            .query_pairs_mut()
            .append_pair(key, &value.to_string());
        self
    }

    /// Append a query parameter if a value is present.
    pub fn query_opt(self, key: &str, value: Option<&str>) -> Self {
        match value {
            Some(value) => self.query(key, value),
            None => self,
        }
    }

    /// Add a header.
    ///
    /// Values are checked when the request is sent.
    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// Attach a bearer token, if one is present.
    pub fn bearer(self, token: Option<&str>) -> Self {
        match token {
            Some(token) => self.header(HEADER_AUTHORIZATION, &format!("Bearer {token}")),
            None => self,
        }
    }

    /// Set request timeout in milliseconds.
    pub const fn timeout_ms(mut self, ms: u64) -> Self {
        self.timeout_ms = Some(ms);
        self
    }

    /// Get the URL.
    #[inline]
    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    /// Get the headers.
    #[inline]
    #[must_use]
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// First header named `name` (case-insensitive).
    #[must_use]
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Configured timeout in milliseconds.
    #[must_use]
    pub const fn timeout(&self) -> Option<u64> {
        self.timeout_ms
    }

    /// Configured timeout as a [`Duration`].
    #[must_use]
    pub fn timeout_duration(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// Check the request before it leaves the process.
    ///
    /// # Errors
    ///
    /// - [`ClientError::InvalidUrl`] for anything but `http`/`https`
    /// - [`ClientError::InvalidHeader`] for CR or LF in a header (header injection)
    pub fn validate(&self) -> Result<()> {
        if !matches!(self.url.scheme(), "http" | "https") {
            return Err(ClientError::InvalidUrl(format!(
                "URL must start with http:// or https://: {}",
                self.url
            )));
        }
        for (name, value) in &self.headers {
            if name.contains(['\r', '\n']) || value.contains(['\r', '\n']) {
                return Err(ClientError::InvalidHeader(format!(
                    "{name} must not contain CR or LF characters"
                )));
            }
        }
        Ok(())
    }

    // =========================================================================
    // Sending
    // =========================================================================

    /// Validate the request and send it through `transport`.
    ///
    /// Any HTTP status is returned as a [`Response`]; see
    /// [`Response::error_for_status`].
    pub async fn send_with(self, transport: &dyn Transport) -> Result<Response> {
        self.validate()?;
        debug!(url = %self.url, "sending request");
        let response = transport.send(&self).await?;
        debug!(url = %self.url, status = response.status, "received response");
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("http://localhost:8080").unwrap()
    }

    #[test]
    fn test_get_keeps_base_path() {
        let base = Url::parse("https://host/dishly/").unwrap();
        let req = ClientRequest::get(&base, "/api/recipes/cursor").unwrap();
        assert_eq!(req.url().as_str(), "https://host/dishly/api/recipes/cursor");
    }

    #[test]
    fn test_query_values_are_encoded() {
        let req = ClientRequest::get(&base(), "/api/recipes/search/cursor")
            .unwrap()
            .query("name", "mac & cheese");
        assert_eq!(req.url().query(), Some("name=mac+%26+cheese"));
    }

    #[test]
    fn test_query_opt_skips_none() {
        let req = ClientRequest::get(&base(), "/x").unwrap().query_opt("cursor", None);
        assert_eq!(req.url().query(), None);
    }

    #[test]
    fn test_accepts_json_by_default() {
        let req = ClientRequest::get(&base(), "/x").unwrap();
        assert_eq!(req.header_value("Accept"), Some("application/json"));
        assert_eq!(req.header_value("authorization"), None);
    }

    #[test]
    fn test_header_injection_rejected() {
        let req = ClientRequest::get(&base(), "/x")
            .unwrap()
            .bearer(Some("tok\r\nX-Evil: 1"));
        assert!(matches!(req.validate(), Err(ClientError::InvalidHeader(_))));
    }

    #[test]
    fn test_non_http_scheme_rejected() {
        let req = ClientRequest::new(Url::parse("file:///etc/passwd").unwrap());
        assert!(matches!(req.validate(), Err(ClientError::InvalidUrl(_))));
    }

    #[test]
    fn test_timeout() {
        let req = ClientRequest::get(&base(), "/x").unwrap().timeout_ms(1_500);
        assert_eq!(req.timeout(), Some(1_500));
        assert_eq!(req.timeout_duration(), Some(Duration::from_millis(1_500)));
    }
}
