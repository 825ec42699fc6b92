//! Process-wide constants for the mock API contract.
//!
//! Paths are kept as separate prefix and collection segments so callers can
//! build `/api/v1/{collection}` and `/api/v1/{collection}/{id}` without string
//! templating.

/// Header name used for the request content type.
pub const CONTENT_TYPE: &str = "Content-Type";
/// Media type sent with every request.
pub const VALUE_CONTENT_TYPE: &str = "application/json";

/// Collection segment for client records.
pub const CLIENTS_PATH: &str = "clients";
/// Collection segment for resource records.
pub const RESOURCES_PATH: &str = "resources";

/// Path segments preceding every collection.
pub const API_PREFIX: [&str; 2] = ["api", "v1"];

/// Base URL of the hosted mock service.
pub const DEFAULT_BASE_URL: &str = "https://63b6dfe11907f863aa04ff81.mockapi.io";

/// Directory holding the default entity fixtures.
pub const DEFAULT_FIXTURE_DIR: &str = "data";
/// Directory holding the JSON Schema documents.
pub const DEFAULT_SCHEMA_DIR: &str = "schemas";

/// Fixture file used by [`crate::request::ClientRequest::create_default`].
pub const DEFAULT_CLIENT_FIXTURE: &str = "defaultClient.json";
/// Fixture file used by [`crate::request::ResourceRequest::create_default`].
pub const DEFAULT_RESOURCE_FIXTURE: &str = "defaultResource.json";

/// Schema describing a single client.
pub const CLIENT_SCHEMA: &str = "clientSchema.json";
/// Schema describing a list of clients.
pub const CLIENT_LIST_SCHEMA: &str = "clientListSchema.json";
/// Schema describing a single resource.
pub const RESOURCE_SCHEMA: &str = "resourceSchema.json";
/// Schema describing a list of resources.
pub const RESOURCE_LIST_SCHEMA: &str = "resourceListSchema.json";

/// Status returned by successful reads, updates and deletes.
pub const STATUS_OK: u16 = 200;
/// Status returned by successful creates.
pub const STATUS_CREATED: u16 = 201;
