//! Step definition modules for BDD scenarios.
//!
//! Each module contains step definitions for one collection. Steps are
//! registered via `#[given]`, `#[when]`, and `#[then]` attribute macros, so
//! nothing needs re-exporting.

mod clients;
mod resources;
