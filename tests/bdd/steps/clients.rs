//! Step definitions for client scenarios.

use crate::bdd::assertions::{assert_schema, assert_status};
use crate::bdd::fixtures::TestWorld;
use anyhow::{Context, Result, ensure};
use crudcheck::constants::{CLIENT_LIST_SCHEMA, CLIENT_SCHEMA};
use crudcheck::model::{Client, Entity};
use crudcheck::seed;
use rstest_bdd_macros::{given, then, when};

fn current_client(world: &TestWorld) -> Result<Client> {
    world
        .client
        .get()
        .context("a client should have been prepared or fetched")
}

fn update_client(world: &TestWorld, f: impl FnOnce(Client) -> Client) -> Result<()> {
    let client = world.client.get().unwrap_or_default();
    world.client.set(f(client));
    Ok(())
}

// ---------------------------------------------------------------------------
// Given steps
// ---------------------------------------------------------------------------

#[given("there are at least {count:usize} registered clients in the system")]
fn at_least_clients(world: &TestWorld, count: usize) -> Result<()> {
    let clients = world.clients()?;
    let total = seed::ensure_at_least(&clients, count, |_| true)?;
    ensure!(total >= count, "only {total} clients after seeding");
    Ok(())
}

#[given("I have a client named {name:string} {last_name:string}")]
fn client_named(world: &TestWorld, name: &str, last_name: &str) -> Result<()> {
    world
        .client
        .set(Client::default().with_name(name).with_last_name(last_name));
    Ok(())
}

#[given("the client lives in {city:string}, {country:string}")]
fn client_lives_in(world: &TestWorld, city: &str, country: &str) -> Result<()> {
    update_client(world, |client| client.with_city(city).with_country(country))
}

#[given("the client can be reached at {phone:string} and {email:string}")]
fn client_contact(world: &TestWorld, phone: &str, email: &str) -> Result<()> {
    update_client(world, |client| client.with_phone(phone).with_email(email))
}

// ---------------------------------------------------------------------------
// When steps
// ---------------------------------------------------------------------------

#[when("I retrieve the details of the client with id {id:string}")]
fn get_client_by_id(world: &TestWorld, id: &str) -> Result<()> {
    let response = world.clients()?.get_by_id(id)?;
    world.record(response);
    Ok(())
}

#[when("I retrieve the details of the client with name {name:string}")]
fn get_client_by_name(world: &TestWorld, name: &str) -> Result<()> {
    let clients = world.clients()?;
    let found = clients.find_by_name(name)?;
    let id = found.id().context("listed client should have an id")?;
    let response = clients.get_by_id(id)?;
    if response.status() == 200 {
        world.client.set(clients.entity_from_response(&response)?);
    }
    world.record(response);
    Ok(())
}

#[when("I retrieve the details of the created client")]
fn get_created_client(world: &TestWorld) -> Result<()> {
    let clients = world.clients()?;
    let created = clients.entity_from_response(&world.last_response()?)?;
    let id = created.id().context("created client should have an id")?;
    let response = clients.get_by_id(id)?;
    world.record(response);
    Ok(())
}

#[when("I save her current phone number")]
fn save_phone(world: &TestWorld) -> Result<()> {
    let phone = current_client(world)?
        .phone
        .context("client should have a phone number")?;
    world.saved_phone.set(phone);
    Ok(())
}

#[when("I update the phone number of that client to {phone:string}")]
fn update_phone(world: &TestWorld, phone: &str) -> Result<()> {
    let clients = world.clients()?;
    let client = current_client(world)?;
    let id = client.id().context("client should have an id")?.to_owned();
    let body = serde_json::to_string(&client.without_id().with_phone(phone))?;
    let patch = clients.entity_from_json_text(&body)?;
    let response = clients.update(&patch, &id)?;
    world.record(response);
    Ok(())
}

#[when("I send a GET request to view all the clients")]
fn list_clients(world: &TestWorld) -> Result<()> {
    let response = world.clients()?.list()?;
    world.record(response);
    Ok(())
}

#[when("I send a POST request to create a client")]
fn create_client(world: &TestWorld) -> Result<()> {
    let client = current_client(world)?;
    let response = world.clients()?.create(&client)?;
    world.record(response);
    Ok(())
}

#[when("I send a DELETE request to delete the client with ID {id:string}")]
fn delete_client(world: &TestWorld, id: &str) -> Result<()> {
    let response = world.clients()?.delete(id)?;
    world.record(response);
    Ok(())
}

// ---------------------------------------------------------------------------
// Then steps
// ---------------------------------------------------------------------------

#[then("the client should have a status code of {status:u16}")]
fn client_status(world: &TestWorld, status: u16) -> Result<()> {
    assert_status(world, status)
}

#[then("the response should include the details of the created client")]
fn created_client_echoed(world: &TestWorld) -> Result<()> {
    let submitted = current_client(world)?;
    let created = world
        .clients()?
        .entity_from_response(&world.last_response()?)?;
    ensure!(created.id.is_some(), "created client should carry an id");
    ensure!(
        created.without_id() == submitted,
        "expected {submitted:?}, got {created:?}"
    );
    Ok(())
}

#[then("the client name should be {name:string}")]
fn client_name_is(world: &TestWorld, name: &str) -> Result<()> {
    let client = world
        .clients()?
        .entity_from_response(&world.last_response()?)?;
    ensure!(client.name.as_deref() == Some(name), "client {client:?}");
    Ok(())
}

#[then("the client phone number should be {phone:string}")]
fn client_phone_is(world: &TestWorld, phone: &str) -> Result<()> {
    let client = world
        .clients()?
        .entity_from_response(&world.last_response()?)?;
    ensure!(client.phone.as_deref() == Some(phone), "client {client:?}");
    Ok(())
}

#[then("the client phone number should differ from the saved one")]
fn client_phone_changed(world: &TestWorld) -> Result<()> {
    let saved = world
        .saved_phone
        .get()
        .context("a phone number should have been saved")?;
    let client = world
        .clients()?
        .entity_from_response(&world.last_response()?)?;
    ensure!(
        client.phone.as_deref() != Some(saved.as_str()),
        "phone number {saved} was not changed"
    );
    Ok(())
}

#[then("the client list should contain at least {count:usize} clients")]
fn client_list_len(world: &TestWorld, count: usize) -> Result<()> {
    let clients = world
        .clients()?
        .entity_list_from_response(&world.last_response()?)?;
    ensure!(clients.len() >= count, "only {} clients listed", clients.len());
    Ok(())
}

#[then("the client list should be empty")]
fn client_list_empty(world: &TestWorld) -> Result<()> {
    let clients = world
        .clients()?
        .entity_list_from_response(&world.last_response()?)?;
    ensure!(clients.is_empty(), "clients remain: {clients:?}");
    Ok(())
}

#[then("validates the response with client JSON schema")]
fn client_schema(world: &TestWorld) -> Result<()> {
    assert_schema(world, CLIENT_SCHEMA, true)
}

#[then("validates the response with client list JSON schema")]
fn client_list_schema(world: &TestWorld) -> Result<()> {
    assert_schema(world, CLIENT_LIST_SCHEMA, true)
}

#[then("I delete all the registered clients")]
fn delete_all_clients(world: &TestWorld) -> Result<()> {
    let deleted = seed::purge(&world.clients()?)?;
    tracing::info!(deleted, "deleted every client");
    Ok(())
}
