//! Error types for command execution.

use miette::Diagnostic;
use thiserror::Error;

/// Failures specific to running a command, beyond request errors.
#[derive(Debug, Error, Diagnostic)]
pub enum RunnerError {
    /// No subcommand was supplied.
    #[error("no command given")]
    #[diagnostic(code(crudcheck::runner::missing_command), help("run with --help"))]
    MissingCommand,
    /// `--active` was used with a collection that has no activity flag.
    #[error("--active only applies to resources")]
    #[diagnostic(code(crudcheck::runner::active_filter))]
    ActiveFilter,
    /// The fetched body does not satisfy the schema.
    #[error("{count} schema violation(s) against {schema}")]
    #[diagnostic(code(crudcheck::runner::schema_violations))]
    SchemaViolations {
        /// Schema that was applied.
        schema: String,
        /// Number of violations found.
        count: usize,
    },
}
