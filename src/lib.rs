//! crudcheck core library.
//!
//! Request clients, fixtures, schema validation and seeding helpers for
//! exercising the `clients` and `resources` collections of a mock REST API.
//! The behavioural test suite and the `crudcheck` binary are both built on
//! these modules.

pub mod cli;
pub mod constants;
pub mod fixture;
pub mod http;
pub mod model;
pub mod request;
pub mod runner;
pub mod schema;
pub mod seed;
