//! BDD test module providing fixtures and step definitions.
//!
//! Step definitions are registered via `#[given]`, `#[when]`, and `#[then]`
//! attribute macros from rstest-bdd.

pub mod assertions;
pub mod fixtures;
pub mod steps;
