//! Error types for the base HTTP client.

use miette::Diagnostic;
use thiserror::Error;

/// Failures raised while sending a request or reading its response.
///
/// Non-2xx statuses are not errors: they reach the caller as an ordinary
/// [`ApiResponse`](super::ApiResponse).
#[derive(Debug, Error, Diagnostic)]
pub enum HttpError {
    /// The request never produced a response (DNS, connect, TLS, I/O).
    #[error("{method} {url} failed: {source}")]
    #[diagnostic(code(crudcheck::http::transport))]
    Transport {
        /// HTTP verb of the failed request.
        method: &'static str,
        /// Target URL.
        url: String,
        /// Underlying agent error.
        #[source]
        source: Box<ureq::Error>,
    },
    /// The response arrived but its body could not be read as text.
    #[error("failed to read response body from {url}")]
    #[diagnostic(code(crudcheck::http::body))]
    Body {
        /// Target URL.
        url: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The request payload could not be serialised.
    #[error("failed to encode request body for {url}")]
    #[diagnostic(code(crudcheck::http::encode))]
    Encode {
        /// Target URL.
        url: String,
        /// Underlying serialisation error.
        #[source]
        source: serde_json::Error,
    },
    /// The base URL cannot be extended with path segments.
    #[error("base URL '{url}' cannot carry path segments")]
    #[diagnostic(
        code(crudcheck::http::invalid_url),
        help("use an absolute http or https URL such as https://example.mockapi.io")
    )]
    InvalidUrl {
        /// Offending URL.
        url: String,
    },
}
