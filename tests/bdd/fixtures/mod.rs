//! Fixture modules for BDD scenarios.
//!
//! The `TestWorld` struct holds all state for one scenario. Non-Clone types
//! use `RefCell<Option<T>>` directly, while Clone types use `Slot<T>`.
//!
//! Every scenario talks to its own in-process mock API, started lazily on
//! the first request, so scenarios never observe each other's records.

// The `#[fixture]` macro generates types that cannot have doc comments attached
#![allow(
    missing_docs,
    reason = "Generated fixture types cannot have doc comments attached"
)]

use anyhow::{Context, Result};
use camino::Utf8Path;
use crudcheck::http::ApiResponse;
use crudcheck::model::{Client, Resource};
use crudcheck::request::{ClientRequest, RequestConfig, ResourceRequest};
use rstest::fixture;
use rstest_bdd::Slot;
use serde_json::{Map, Value};
use std::cell::RefCell;
use std::time::Duration;
use test_support::MockApi;
use url::Url;

/// Combined test world for all BDD scenarios.
#[derive(Default)]
pub struct TestWorld {
    /// Mock API serving this scenario (non-Clone).
    pub api: RefCell<Option<MockApi>>,
    /// Last response received by any step.
    pub response: Slot<ApiResponse>,

    // Client state
    /// Client built or fetched by the current scenario.
    pub client: Slot<Client>,
    /// Phone number remembered before an update.
    pub saved_phone: Slot<String>,

    // Resource state
    /// Active resources selected for bulk updates.
    pub active_resources: Slot<Vec<Resource>>,
    /// Final entry of the resource listing.
    pub last_resource: Slot<Resource>,
    /// Fields collected for the next resource update.
    pub pending_update: Slot<Map<String, Value>>,
}

impl TestWorld {
    /// Base URL of this scenario's mock API, starting it on first use.
    pub fn base_url(&self) -> Result<String> {
        let mut api = self.api.borrow_mut();
        if api.is_none() {
            *api = Some(MockApi::start().context("start mock API")?);
        }
        api.as_ref()
            .map(MockApi::base_url)
            .context("mock API should be running")
    }

    /// Run `f` against the running mock API.
    pub fn with_api<R>(&self, f: impl FnOnce(&MockApi) -> R) -> Result<R> {
        self.base_url()?;
        self.api
            .borrow()
            .as_ref()
            .map(f)
            .context("mock API should be running")
    }

    fn request_config(&self) -> Result<RequestConfig> {
        let root = Utf8Path::new(env!("CARGO_MANIFEST_DIR"));
        let base = self.base_url()?;
        let url = Url::parse(&base).with_context(|| format!("parse mock URL {base}"))?;
        Ok(RequestConfig::new(url)
            .with_fixture_dir(root.join("data"))
            .with_schema_dir(root.join("schemas"))
            .with_timeout(Some(Duration::from_secs(5))))
    }

    /// Request client for the `clients` collection.
    pub fn clients(&self) -> Result<ClientRequest> {
        Ok(ClientRequest::new(&self.request_config()?))
    }

    /// Request client for the `resources` collection.
    pub fn resources(&self) -> Result<ResourceRequest> {
        Ok(ResourceRequest::new(&self.request_config()?))
    }

    /// Last response captured by a step.
    pub fn last_response(&self) -> Result<ApiResponse> {
        self.response
            .get()
            .context("a request should have been sent")
    }

    /// Store `response` as the scenario's latest and log its body.
    pub fn record(&self, response: ApiResponse) {
        tracing::info!(status = response.status(), body = %response.pretty(), "response");
        self.response.set(response);
    }
}

impl Drop for TestWorld {
    fn drop(&mut self) {
        let scenario = std::thread::current().name().map(str::to_owned);
        tracing::info!(?scenario, "scenario finished");
        self.api.borrow_mut().take();
    }
}

/// Fixture providing a fresh `TestWorld` for each scenario.
#[fixture]
pub fn world() -> TestWorld {
    let scenario = std::thread::current().name().map(str::to_owned);
    tracing::info!(?scenario, "scenario started");
    TestWorld::default()
}
