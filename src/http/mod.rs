//! Base HTTP client.
//!
//! [`HttpClient`] wraps a `ureq` agent and exposes the four verbs used by the
//! request layer. Every request carries `Content-Type: application/json` plus
//! any caller-supplied headers. Calls are synchronous and are never retried;
//! any status the server returns comes back as an [`ApiResponse`], and only
//! transport failures surface as [`HttpError`].

mod error;
mod response;

pub use error::HttpError;
pub use response::ApiResponse;

use crate::constants::{CONTENT_TYPE, VALUE_CONTENT_TYPE};
use indexmap::IndexMap;
use serde::Serialize;
use std::{fmt, time::Duration};
use tracing::debug;
use url::Url;

/// Ordered header map sent with, or received from, a request.
pub type Headers = IndexMap<String, String>;

/// Header map containing only the JSON content type.
#[must_use]
pub fn base_headers() -> Headers {
    let mut headers = Headers::new();
    headers.insert(CONTENT_TYPE.to_owned(), VALUE_CONTENT_TYPE.to_owned());
    headers
}

/// Synchronous JSON-over-HTTP client.
#[derive(Clone)]
pub struct HttpClient {
    agent: ureq::Agent,
    timeout: Option<Duration>,
}

impl fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpClient")
            .field("agent", &"<ureq::Agent>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new(None)
    }
}

impl HttpClient {
    /// Create a client; `timeout` bounds each whole request when set.
    ///
    /// Without a timeout the agent's defaults apply.
    #[must_use]
    pub fn new(timeout: Option<Duration>) -> Self {
        let builder = ureq::AgentBuilder::new();
        let agent = match timeout {
            Some(limit) => builder.timeout(limit),
            None => builder,
        }
        .build();
        Self { agent, timeout }
    }

    /// Send a GET request.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] when no response could be obtained.
    pub fn get(&self, url: &Url, headers: &Headers) -> Result<ApiResponse, HttpError> {
        self.dispatch("GET", url, headers, None)
    }

    /// Send a POST request with `body` encoded as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] when encoding fails or no response arrives.
    pub fn post<B>(&self, url: &Url, headers: &Headers, body: &B) -> Result<ApiResponse, HttpError>
    where
        B: Serialize + ?Sized,
    {
        let payload = encode(url, body)?;
        self.dispatch("POST", url, headers, Some(&payload))
    }

    /// Send a PUT request with `body` encoded as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] when encoding fails or no response arrives.
    pub fn put<B>(&self, url: &Url, headers: &Headers, body: &B) -> Result<ApiResponse, HttpError>
    where
        B: Serialize + ?Sized,
    {
        let payload = encode(url, body)?;
        self.dispatch("PUT", url, headers, Some(&payload))
    }

    /// Send a DELETE request.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] when no response could be obtained.
    pub fn delete(&self, url: &Url, headers: &Headers) -> Result<ApiResponse, HttpError> {
        self.dispatch("DELETE", url, headers, None)
    }

    fn dispatch(
        &self,
        method: &'static str,
        url: &Url,
        headers: &Headers,
        body: Option<&str>,
    ) -> Result<ApiResponse, HttpError> {
        let request = headers.iter().fold(
            self.agent
                .request_url(method, url)
                .set(CONTENT_TYPE, VALUE_CONTENT_TYPE),
            |request, (name, value)| request.set(name, value),
        );
        debug!(method, %url, "sending request");
        let outcome = match body {
            Some(payload) => request.send_string(payload),
            None => request.call(),
        };
        let response = match outcome {
            Ok(response) | Err(ureq::Error::Status(_, response)) => response,
            Err(err) => {
                return Err(HttpError::Transport {
                    method,
                    url: url.to_string(),
                    source: Box::new(err),
                });
            }
        };
        let api = ApiResponse::from_ureq(url, response)?;
        debug!(method, %url, status = api.status(), "received response");
        Ok(api)
    }
}

fn encode<B: Serialize + ?Sized>(url: &Url, body: &B) -> Result<String, HttpError> {
    serde_json::to_string(body).map_err(|source| HttpError::Encode {
        url: url.to_string(),
        source,
    })
}

/// Append `segments` to the path of `base`, percent-encoding each one.
///
/// A trailing slash on the base path is absorbed so
/// `https://host/` and `https://host` resolve identically.
///
/// # Errors
///
/// Returns [`HttpError::InvalidUrl`] when `base` cannot carry a path (for
/// example `mailto:` URLs).
pub fn join_segments<'a, I>(base: &Url, segments: I) -> Result<Url, HttpError>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| HttpError::InvalidUrl {
            url: base.to_string(),
        })?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}
