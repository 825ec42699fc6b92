//! JSON Schema validation for response bodies.
//!
//! Schemas live as JSON files under a single root directory. The root is
//! opened as a capability directory, so a schema name can only ever resolve
//! to a file inside it. Each check reads and compiles the schema afresh;
//! nothing is cached between calls.

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8::Dir};
use miette::Diagnostic;
use serde_json::Value;
use std::fmt;
use thiserror::Error;
use tracing::{debug, warn};

/// Failures raised before a body can be judged against a schema.
///
/// A body that merely violates the schema is not an error; it yields a
/// [`SchemaReport`] with violations.
#[derive(Debug, Error, Diagnostic)]
pub enum SchemaError {
    /// The schema name is absolute or walks out of the schema root.
    #[error("schema name '{name}' must be a relative path inside the schema directory")]
    #[diagnostic(code(crudcheck::schema::invalid_name))]
    InvalidName {
        /// Rejected name.
        name: String,
    },
    /// The schema root or file could not be read.
    #[error("failed to read schema '{name}' from {root}")]
    #[diagnostic(
        code(crudcheck::schema::read),
        help("check the configured schema directory")
    )]
    Read {
        /// Requested schema name.
        name: String,
        /// Schema root directory.
        root: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The schema file is not JSON.
    #[error("schema '{name}' is not valid JSON")]
    #[diagnostic(code(crudcheck::schema::parse))]
    Parse {
        /// Requested schema name.
        name: String,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },
    /// The schema is JSON but not a usable JSON Schema document.
    #[error("schema '{name}' could not be compiled: {message}")]
    #[diagnostic(code(crudcheck::schema::compile))]
    Compile {
        /// Requested schema name.
        name: String,
        /// Compiler message.
        message: String,
    },
    /// The body under test is not JSON.
    #[error("response body is not JSON")]
    #[diagnostic(code(crudcheck::schema::body))]
    Body {
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },
}

/// One failed schema keyword.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// JSON pointer to the offending part of the instance.
    pub path: String,
    /// Human-readable description.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = if self.path.is_empty() { "/" } else { &self.path };
        write!(f, "{path}: {}", self.message)
    }
}

/// Outcome of validating one body against one schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaReport {
    /// Name of the schema that was applied.
    pub schema: String,
    /// Every violation found; empty when the body conforms.
    pub violations: Vec<Violation>,
}

impl SchemaReport {
    /// Return `true` when the body conforms.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Named JSON Schema documents rooted at one directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaStore {
    root: Utf8PathBuf,
}

impl SchemaStore {
    /// Create a store reading schemas from `root`.
    ///
    /// The directory is opened lazily on each check, so a missing root is
    /// reported by [`SchemaStore::check`] rather than here.
    #[must_use]
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory the store reads from.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Read and parse the schema called `name`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] when the name is rejected or the file cannot
    /// be read or parsed.
    pub fn load(&self, name: &str) -> Result<Value, SchemaError> {
        let relative = validate_name(name)?;
        let read_error = |source| SchemaError::Read {
            name: name.to_owned(),
            root: self.root.clone(),
            source,
        };
        let dir = Dir::open_ambient_dir(&self.root, ambient_authority()).map_err(read_error)?;
        let text = dir.read_to_string(relative).map_err(read_error)?;
        serde_json::from_str(&text).map_err(|source| SchemaError::Parse {
            name: name.to_owned(),
            source,
        })
    }

    /// Validate `instance` against the schema called `name`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] when the schema cannot be loaded or compiled.
    pub fn check(&self, name: &str, instance: &Value) -> Result<SchemaReport, SchemaError> {
        let schema = self.load(name)?;
        let validator =
            jsonschema::validator_for(&schema).map_err(|err| SchemaError::Compile {
                name: name.to_owned(),
                message: err.to_string(),
            })?;
        let violations: Vec<Violation> = validator
            .iter_errors(instance)
            .map(|err| Violation {
                path: err.instance_path.to_string(),
                message: err.to_string(),
            })
            .collect();
        if violations.is_empty() {
            debug!(schema = name, "body conforms to schema");
        } else {
            warn!(schema = name, count = violations.len(), "body violates schema");
        }
        Ok(SchemaReport {
            schema: name.to_owned(),
            violations,
        })
    }

    /// Validate raw body text against the schema called `name`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Body`] when `body` is not JSON, or any error
    /// from [`SchemaStore::check`].
    pub fn check_text(&self, name: &str, body: &str) -> Result<SchemaReport, SchemaError> {
        let instance = serde_json::from_str(body).map_err(|source| SchemaError::Body { source })?;
        self.check(name, &instance)
    }
}

fn validate_name(name: &str) -> Result<&Utf8Path, SchemaError> {
    let path = Utf8Path::new(name);
    let only_normal = path
        .components()
        .all(|component| matches!(component, Utf8Component::Normal(_)));
    if name.is_empty() || !only_normal {
        return Err(SchemaError::InvalidName {
            name: name.to_owned(),
        });
    }
    Ok(path)
}
