//! Step definitions for resource scenarios.

use crate::bdd::assertions::{assert_schema, assert_status};
use crate::bdd::fixtures::TestWorld;
use anyhow::{Context, Result, ensure};
use crudcheck::constants::{RESOURCE_LIST_SCHEMA, RESOURCE_SCHEMA, STATUS_OK};
use crudcheck::model::{Entity, Resource};
use crudcheck::request::expect_status;
use crudcheck::seed;
use rstest_bdd_macros::{given, then, when};
use serde_json::{Value, json};

/// Interpret a step value as JSON when it parses, otherwise as plain text.
fn field_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_owned()))
}

fn last_resource(world: &TestWorld) -> Result<Resource> {
    world
        .last_resource
        .get()
        .context("the last created resource should have been retrieved")
}

// ---------------------------------------------------------------------------
// Given steps
// ---------------------------------------------------------------------------

#[given("there are at least {count:usize} active resources in the system")]
fn at_least_active(world: &TestWorld, count: usize) -> Result<()> {
    let resources = world.resources()?;
    let total = seed::ensure_at_least(&resources, count, Resource::is_active)?;
    ensure!(total >= count, "only {total} active resources after seeding");
    Ok(())
}

#[given("there are at least {count:usize} resources in the system")]
fn at_least_resources(world: &TestWorld, count: usize) -> Result<()> {
    let resources = world.resources()?;
    let total = seed::ensure_at_least(&resources, count, |_| true)?;
    ensure!(total >= count, "only {total} resources after seeding");
    Ok(())
}

#[given("a resource named {name:string} was stored without an active flag")]
fn resource_without_flag(world: &TestWorld, name: &str) -> Result<()> {
    let id = world.with_api(|api| {
        api.insert(
            "resources",
            json!({"name": name, "trademark": "Acme", "stock": 3, "price": "10.00"}),
        )
    })?;
    tracing::debug!(%id, "stored incomplete resource");
    Ok(())
}

// ---------------------------------------------------------------------------
// When steps
// ---------------------------------------------------------------------------

#[when("I retrieve the list of all active resources")]
fn list_active(world: &TestWorld) -> Result<()> {
    let resources = world.resources()?;
    let response = resources.list()?;
    expect_status(&response, STATUS_OK)?;
    let active: Vec<Resource> = resources
        .entity_list_from_response(&response)?
        .into_iter()
        .filter(Resource::is_active)
        .collect();
    world.active_resources.set(active);
    world.record(response);
    Ok(())
}

#[when("I retrieve the last created resource")]
fn retrieve_last(world: &TestWorld) -> Result<()> {
    let resources = world.resources()?;
    let last = resources.last_created()?;
    let id = last.id().context("listed resource should have an id")?;
    let response = resources.get_by_id(id)?;
    world.last_resource.set(last);
    world.record(response);
    Ok(())
}

#[when("I set {field:string} to {value:string} for the update")]
fn stage_field(world: &TestWorld, field: &str, value: &str) -> Result<()> {
    let mut pending = world.pending_update.get().unwrap_or_default();
    pending.insert(field.to_owned(), field_value(value));
    world.pending_update.set(pending);
    Ok(())
}

#[when("I send the prepared update for the last created resource")]
fn send_update(world: &TestWorld) -> Result<()> {
    let resources = world.resources()?;
    let last = last_resource(world)?;
    let id = last.id().context("resource should have an id")?.to_owned();
    let Value::Object(mut body) = serde_json::to_value(last.without_id())? else {
        anyhow::bail!("resource should serialise to an object");
    };
    body.extend(world.pending_update.get().unwrap_or_default());
    let patch = resources.entity_from_json_text(&Value::Object(body).to_string())?;
    let response = resources.update(&patch, &id)?;
    world.pending_update.clear();
    world.record(response);
    Ok(())
}

// ---------------------------------------------------------------------------
// Then steps
// ---------------------------------------------------------------------------

#[then("I update all the active resources as inactive")]
fn deactivate_all(world: &TestWorld) -> Result<()> {
    let resources = world.resources()?;
    let active = world
        .active_resources
        .get()
        .context("active resources should have been listed")?;
    for resource in active {
        let id = resource.id().context("listed resource should have an id")?;
        let response = resources.update(&resource.without_id().with_active(false), id)?;
        expect_status(&response, STATUS_OK)?;
        world.record(response);
    }
    Ok(())
}

#[then("no active resources should remain")]
fn none_active(world: &TestWorld) -> Result<()> {
    let remaining: Vec<Resource> = world
        .resources()?
        .list_entities()?
        .into_iter()
        .filter(Resource::is_active)
        .collect();
    ensure!(remaining.is_empty(), "still active: {remaining:?}");
    Ok(())
}

#[then("the response should have a status code of {status:u16}")]
fn response_status(world: &TestWorld, status: u16) -> Result<()> {
    assert_status(world, status)
}

#[then("the response body should match the resources JSON schema")]
fn list_schema(world: &TestWorld) -> Result<()> {
    assert_schema(world, RESOURCE_LIST_SCHEMA, true)
}

#[then("the response body should match the resource JSON schema")]
fn item_schema(world: &TestWorld) -> Result<()> {
    assert_schema(world, RESOURCE_SCHEMA, true)
}

#[then("the response body should not match the resource JSON schema")]
fn item_schema_rejected(world: &TestWorld) -> Result<()> {
    assert_schema(world, RESOURCE_SCHEMA, false)
}

#[then("the response body should contain the updated data")]
fn updated_data(world: &TestWorld) -> Result<()> {
    let original = last_resource(world)?;
    let updated = world
        .resources()?
        .entity_from_response(&world.last_response()?)?;
    ensure!(
        updated.id == original.id,
        "update answered for {:?}, expected {:?}",
        updated.id,
        original.id
    );
    ensure!(updated != original, "resource {original:?} was not changed");
    Ok(())
}
