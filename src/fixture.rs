//! Fixture loading.
//!
//! A fixture is a JSON file holding one entity, used to seed default records
//! before a scenario runs. Loading returns a [`Result`] so callers cannot
//! quietly post an empty record when the file is missing or malformed.

use crate::model::decode_record;
use camino::{Utf8Path, Utf8PathBuf};
use miette::Diagnostic;
use serde::de::DeserializeOwned;
use std::fs;
use thiserror::Error;
use tracing::{debug, warn};

/// Failures raised while loading a fixture file.
#[derive(Debug, Error, Diagnostic)]
pub enum FixtureError {
    /// The file could not be opened or read.
    #[error("failed to read fixture {path}")]
    #[diagnostic(
        code(crudcheck::fixture::read),
        help("check the configured fixture directory")
    )]
    Read {
        /// Path that was attempted.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The file is not valid JSON for the requested entity.
    #[error("fixture {path} is not a valid record")]
    #[diagnostic(code(crudcheck::fixture::parse))]
    Parse {
        /// Path that was parsed.
        path: Utf8PathBuf,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },
}

/// Load one record of type `E` from the JSON file at `path`.
///
/// # Errors
///
/// Returns [`FixtureError::Read`] when the file cannot be read and
/// [`FixtureError::Parse`] when its contents do not describe an `E`.
///
/// # Examples
///
/// ```rust,no_run
/// use crudcheck::{fixture, model::Client};
///
/// let client: Client = fixture::load("data/defaultClient.json".as_ref())?;
/// # Ok::<(), crudcheck::fixture::FixtureError>(())
/// ```
pub fn load<E: DeserializeOwned>(path: &Utf8Path) -> Result<E, FixtureError> {
    let text = fs::read_to_string(path).map_err(|source| {
        warn!(%path, error = %source, "fixture could not be read");
        FixtureError::Read {
            path: path.to_owned(),
            source,
        }
    })?;
    let record = decode_record(&text).map_err(|source| {
        warn!(%path, error = %source, "fixture could not be parsed");
        FixtureError::Parse {
            path: path.to_owned(),
            source,
        }
    })?;
    debug!(%path, "loaded fixture");
    Ok(record)
}
