//! Per-entity request clients.
//!
//! [`EntityRequest`] composes the base [`HttpClient`] with the collection
//! path templates `/api/v1/{collection}` and `/api/v1/{collection}/{id}`,
//! maps bodies to [`Entity`] values, posts default fixtures and checks bodies
//! against JSON Schemas. Every operation is a single stateless round trip;
//! statuses are only enforced by the helpers that say so.

mod error;

pub use error::RequestError;

use crate::{
    constants::{API_PREFIX, DEFAULT_FIXTURE_DIR, DEFAULT_SCHEMA_DIR, STATUS_OK},
    fixture,
    http::{ApiResponse, Headers, HttpClient, base_headers, join_segments},
    model::{Client, Entity, Resource, decode_record, decode_records},
    schema::{SchemaError, SchemaReport, SchemaStore},
};
use camino::{Utf8Path, Utf8PathBuf};
use std::{fmt, marker::PhantomData, time::Duration};
use tracing::{debug, warn};
use url::Url;

/// Connection and file-location settings shared by every request client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestConfig {
    base_url: Url,
    fixture_dir: Utf8PathBuf,
    schema_dir: Utf8PathBuf,
    timeout: Option<Duration>,
}

impl RequestConfig {
    /// Settings for `base_url` with the default fixture and schema
    /// directories and no explicit timeout.
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            fixture_dir: Utf8PathBuf::from(DEFAULT_FIXTURE_DIR),
            schema_dir: Utf8PathBuf::from(DEFAULT_SCHEMA_DIR),
            timeout: None,
        }
    }

    /// Replace the directory holding default fixtures.
    #[must_use]
    pub fn with_fixture_dir(mut self, dir: impl Into<Utf8PathBuf>) -> Self {
        self.fixture_dir = dir.into();
        self
    }

    /// Replace the directory holding JSON Schemas.
    #[must_use]
    pub fn with_schema_dir(mut self, dir: impl Into<Utf8PathBuf>) -> Self {
        self.schema_dir = dir.into();
        self
    }

    /// Bound each request by `timeout`.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Base URL requests are resolved against.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Directory holding default fixtures.
    #[must_use]
    pub fn fixture_dir(&self) -> &Utf8Path {
        &self.fixture_dir
    }

    /// Directory holding JSON Schemas.
    #[must_use]
    pub fn schema_dir(&self) -> &Utf8Path {
        &self.schema_dir
    }

    /// Per-request timeout, if any.
    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

/// Request client for one collection of the mock API.
pub struct EntityRequest<E> {
    http: HttpClient,
    base_url: Url,
    fixture_dir: Utf8PathBuf,
    schemas: SchemaStore,
    headers: Headers,
    _entity: PhantomData<fn() -> E>,
}

/// Request client for the `clients` collection.
pub type ClientRequest = EntityRequest<Client>;
/// Request client for the `resources` collection.
pub type ResourceRequest = EntityRequest<Resource>;

impl<E> Clone for EntityRequest<E> {
    fn clone(&self) -> Self {
        Self {
            http: self.http.clone(),
            base_url: self.base_url.clone(),
            fixture_dir: self.fixture_dir.clone(),
            schemas: self.schemas.clone(),
            headers: self.headers.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E: Entity> fmt::Debug for EntityRequest<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityRequest")
            .field("collection", &E::COLLECTION)
            .field("base_url", &self.base_url.as_str())
            .field("fixture_dir", &self.fixture_dir)
            .field("schemas", &self.schemas)
            .finish_non_exhaustive()
    }
}

impl<E: Entity> EntityRequest<E> {
    /// Build a client from `config`.
    #[must_use]
    pub fn new(config: &RequestConfig) -> Self {
        Self {
            http: HttpClient::new(config.timeout()),
            base_url: config.base_url().clone(),
            fixture_dir: config.fixture_dir().to_owned(),
            schemas: SchemaStore::new(config.schema_dir()),
            headers: base_headers(),
            _entity: PhantomData,
        }
    }

    /// Schema store used by [`EntityRequest::check_schema`].
    #[must_use]
    pub const fn schemas(&self) -> &SchemaStore {
        &self.schemas
    }

    /// Fetch the whole collection.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::Http`] when no response arrives.
    pub fn list(&self) -> Result<ApiResponse, RequestError> {
        let url = self.collection_url()?;
        Ok(self.http.get(&url, &self.headers)?)
    }

    /// Fetch one record by id.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::EmptyId`] for an empty `id`, or
    /// [`RequestError::Http`] when no response arrives.
    pub fn get_by_id(&self, id: &str) -> Result<ApiResponse, RequestError> {
        let url = self.item_url(id)?;
        Ok(self.http.get(&url, &self.headers)?)
    }

    /// Post `entity` to the collection.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::Http`] when no response arrives.
    pub fn create(&self, entity: &E) -> Result<ApiResponse, RequestError> {
        let url = self.collection_url()?;
        Ok(self.http.post(&url, &self.headers, entity)?)
    }

    /// Replace the fields of record `id` with those set on `entity`.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::EmptyId`] for an empty `id`, or
    /// [`RequestError::Http`] when no response arrives.
    pub fn update(&self, entity: &E, id: &str) -> Result<ApiResponse, RequestError> {
        let url = self.item_url(id)?;
        Ok(self.http.put(&url, &self.headers, entity)?)
    }

    /// Delete record `id`.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::EmptyId`] for an empty `id`, or
    /// [`RequestError::Http`] when no response arrives.
    pub fn delete(&self, id: &str) -> Result<ApiResponse, RequestError> {
        let url = self.item_url(id)?;
        Ok(self.http.delete(&url, &self.headers)?)
    }

    /// Map a response body to one record.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::Decode`] when the body is not a record.
    pub fn entity_from_response(&self, response: &ApiResponse) -> Result<E, RequestError> {
        decode_record(response.text()).map_err(decode_error::<E>)
    }

    /// Map a response body to records in server order.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::Decode`] when the body is not a list of
    /// records.
    pub fn entity_list_from_response(
        &self,
        response: &ApiResponse,
    ) -> Result<Vec<E>, RequestError> {
        decode_records(response.text()).map_err(decode_error::<E>)
    }

    /// Parse literal JSON text into a record.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::Decode`] when `text` is not a record.
    pub fn entity_from_json_text(&self, text: &str) -> Result<E, RequestError> {
        decode_record(text).map_err(decode_error::<E>)
    }

    /// Load the default record from the fixture directory.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::Fixture`] when the file is missing or invalid.
    pub fn default_entity(&self) -> Result<E, RequestError> {
        Ok(fixture::load(&self.fixture_dir.join(E::DEFAULT_FIXTURE))?)
    }

    /// Post the default record from the fixture directory.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::Fixture`] when the fixture cannot be loaded,
    /// in which case nothing is sent, or [`RequestError::Http`] when no
    /// response arrives.
    pub fn create_default(&self) -> Result<ApiResponse, RequestError> {
        let entity = self.default_entity()?;
        self.create(&entity)
    }

    /// Validate `response` against the schema called `schema`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] when the schema cannot be used or the body is
    /// not JSON. Violations are reported in the [`SchemaReport`].
    pub fn check_schema(
        &self,
        response: &ApiResponse,
        schema: &str,
    ) -> Result<SchemaReport, SchemaError> {
        self.schemas.check_text(schema, response.text())
    }

    /// Return `true` when `response` satisfies the schema called `schema`.
    ///
    /// Every failure, including an unusable schema, yields `false` and is
    /// logged.
    #[must_use]
    pub fn validate_schema(&self, response: &ApiResponse, schema: &str) -> bool {
        match self.check_schema(response, schema) {
            Ok(report) => {
                for violation in &report.violations {
                    warn!(schema, %violation, "schema violation");
                }
                report.is_valid()
            }
            Err(err) => {
                warn!(schema, error = %err, "schema validation could not run");
                false
            }
        }
    }

    /// List the collection, requiring status 200.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::UnexpectedStatus`] for any other status, or a
    /// transport or decode error.
    pub fn list_entities(&self) -> Result<Vec<E>, RequestError> {
        let response = self.list()?;
        expect_status(&response, STATUS_OK)?;
        self.entity_list_from_response(&response)
    }

    /// The last record in the collection listing.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::NotFound`] when the collection is empty, or
    /// any error from [`EntityRequest::list_entities`].
    pub fn last_created(&self) -> Result<E, RequestError> {
        self.list_entities()?
            .pop()
            .ok_or_else(|| RequestError::NotFound {
                kind: E::KIND,
                key: "last created".to_owned(),
            })
    }

    fn collection_url(&self) -> Result<Url, RequestError> {
        let segments = API_PREFIX.into_iter().chain([E::COLLECTION]);
        Ok(join_segments(&self.base_url, segments)?)
    }

    /// An empty id would collapse onto the collection URL.
    fn item_url(&self, id: &str) -> Result<Url, RequestError> {
        if id.is_empty() {
            return Err(RequestError::EmptyId { kind: E::KIND });
        }
        let segments = API_PREFIX.into_iter().chain([E::COLLECTION, id]);
        Ok(join_segments(&self.base_url, segments)?)
    }
}

impl EntityRequest<Client> {
    /// Fetch client `id` and return its name.
    ///
    /// Any status other than 200 fails immediately.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::UnexpectedStatus`] for a non-200 status, or a
    /// transport or decode error.
    pub fn get_name(&self, id: &str) -> Result<Option<String>, RequestError> {
        let response = self.get_by_id(id)?;
        expect_status(&response, STATUS_OK)?;
        Ok(self.entity_from_response(&response)?.name)
    }

    /// First listed client whose name matches `name`, ignoring case.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::NotFound`] when no client matches, or any
    /// error from [`EntityRequest::list_entities`].
    pub fn find_by_name(&self, name: &str) -> Result<Client, RequestError> {
        let found = self
            .list_entities()?
            .into_iter()
            .find(|client| client.matches_name(name));
        debug!(name, found = found.is_some(), "looked up client by name");
        found.ok_or_else(|| RequestError::NotFound {
            kind: Client::KIND,
            key: name.to_owned(),
        })
    }
}

/// Require `response` to carry `expected`, keeping the body for diagnosis.
///
/// # Errors
///
/// Returns [`RequestError::UnexpectedStatus`] on a mismatch.
pub fn expect_status(response: &ApiResponse, expected: u16) -> Result<(), RequestError> {
    if response.status() == expected {
        return Ok(());
    }
    Err(RequestError::UnexpectedStatus {
        expected,
        actual: response.status(),
        body: response.text().to_owned(),
    })
}

fn decode_error<E: Entity>(source: serde_json::Error) -> RequestError {
    RequestError::Decode {
        kind: E::KIND,
        source,
    }
}
