//! Test utilities for the request clients and behavioural scenarios.
//!
//! The crate provides an in-process mock REST API, a single-shot HTTP
//! fixture for canned responses, scratch fixture directories and a
//! scoped environment guard for configuration tests.

pub mod env;
pub mod error;
pub mod fixtures;
pub mod http;
pub mod mock_api;
mod wire;

pub use env::ScopedEnv;
pub use mock_api::MockApi;
pub use wire::RecordedRequest;
