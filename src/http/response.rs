//! Response wrapper returned by every HTTP call.

use super::{Headers, HttpError};
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

/// Status, headers and fully-read body of one HTTP exchange.
///
/// The body is buffered eagerly so a response can be logged, mapped to an
/// entity and validated against a schema without re-reading the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    status: u16,
    headers: Headers,
    body: String,
}

impl ApiResponse {
    /// Build a response from parts.
    ///
    /// Mostly useful for feeding canned bodies into schema checks.
    #[must_use]
    pub const fn new(status: u16, headers: Headers, body: String) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    pub(super) fn from_ureq(url: &Url, response: ureq::Response) -> Result<Self, HttpError> {
        let status = response.status();
        let headers = response
            .headers_names()
            .into_iter()
            .filter_map(|name| {
                let value = response.header(&name)?.to_owned();
                Some((name, value))
            })
            .collect();
        let body = response.into_string().map_err(|source| HttpError::Body {
            url: url.to_string(),
            source,
        })?;
        Ok(Self {
            status,
            headers,
            body,
        })
    }

    /// HTTP status code.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// Return `true` for any 2xx status.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Response headers in the order the server sent them.
    #[must_use]
    pub const fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Look up a header by name, ignoring ASCII case.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Raw body text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.body
    }

    /// Deserialise the body as a single value.
    ///
    /// # Errors
    ///
    /// Returns an error when the body is not JSON or does not match `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.body)
    }

    /// Deserialise the body as an ordered list, preserving server order.
    ///
    /// # Errors
    ///
    /// Returns an error when the body is not a JSON array of `T`.
    pub fn json_list<T: DeserializeOwned>(&self) -> Result<Vec<T>, serde_json::Error> {
        serde_json::from_str(&self.body)
    }

    /// Parse the body into an untyped JSON value.
    ///
    /// # Errors
    ///
    /// Returns an error when the body is not JSON.
    pub fn json_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::from_str(&self.body)
    }

    /// Pretty-printed body for logs; falls back to the raw text.
    #[must_use]
    pub fn pretty(&self) -> String {
        self.json_value()
            .ok()
            .and_then(|value| serde_json::to_string_pretty(&value).ok())
            .unwrap_or_else(|| self.body.clone())
    }
}
