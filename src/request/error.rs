//! Error types for the request clients.

use crate::{fixture::FixtureError, http::HttpError};
use miette::Diagnostic;
use thiserror::Error;

/// Failures raised by an [`EntityRequest`](super::EntityRequest).
#[derive(Debug, Error, Diagnostic)]
pub enum RequestError {
    /// The underlying HTTP exchange failed.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Http(#[from] HttpError),
    /// The server answered with a status the operation does not accept.
    #[error("expected status {expected}, got {actual}: {body}")]
    #[diagnostic(
        code(crudcheck::request::unexpected_status),
        help("the response body is included for diagnosis; no retry was attempted")
    )]
    UnexpectedStatus {
        /// Status the operation required.
        expected: u16,
        /// Status the server returned.
        actual: u16,
        /// Raw response body.
        body: String,
    },
    /// A body could not be mapped to the entity type.
    #[error("failed to decode {kind} JSON")]
    #[diagnostic(code(crudcheck::request::decode))]
    Decode {
        /// Entity kind being decoded, for example `client`.
        kind: &'static str,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },
    /// The default entity could not be loaded.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Fixture(#[from] FixtureError),
    /// An item operation was given an empty id.
    #[error("{kind} id must not be empty")]
    #[diagnostic(code(crudcheck::request::empty_id))]
    EmptyId {
        /// Entity kind addressed.
        kind: &'static str,
    },
    /// No entity matched the lookup.
    #[error("no {kind} matches '{key}'")]
    #[diagnostic(code(crudcheck::request::not_found))]
    NotFound {
        /// Entity kind searched.
        kind: &'static str,
        /// Lookup key, such as a name.
        key: String,
    },
}
