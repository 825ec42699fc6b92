//! Shared assertion helpers for BDD steps.

use crate::bdd::fixtures::TestWorld;
use anyhow::{Result, ensure};

/// Assert that the last response carried `expected`.
pub fn assert_status(world: &TestWorld, expected: u16) -> Result<()> {
    let response = world.last_response()?;
    ensure!(
        response.status() == expected,
        "expected status {expected}, got {} with body {}",
        response.status(),
        response.text()
    );
    Ok(())
}

/// Assert that the last response body satisfies `schema` or not.
pub fn assert_schema(world: &TestWorld, schema: &str, valid: bool) -> Result<()> {
    let response = world.last_response()?;
    let resources = world.resources()?;
    ensure!(
        resources.validate_schema(&response, schema) == valid,
        "expected body {} {schema}: {}",
        if valid { "to satisfy" } else { "to violate" },
        response.text()
    );
    Ok(())
}
