//! Client record.

use super::{Entity, text, text_setters};
use crate::constants::{CLIENT_LIST_SCHEMA, CLIENT_SCHEMA, CLIENTS_PATH, DEFAULT_CLIENT_FIXTURE};
use serde::{Deserialize, Serialize};

/// A client with personal and contact details.
///
/// ```
/// use crudcheck::model::Client;
///
/// let client = Client::default()
///     .with_name("John")
///     .with_last_name("Doe")
///     .with_country("USA");
/// assert_eq!(client.name.as_deref(), Some("John"));
/// assert!(client.id.is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    /// First name.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "text::lenient"
    )]
    pub name: Option<String>,
    /// Last name.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "text::lenient"
    )]
    pub last_name: Option<String>,
    /// Country of residence.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "text::lenient"
    )]
    pub country: Option<String>,
    /// City of residence.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "text::lenient"
    )]
    pub city: Option<String>,
    /// Identifier assigned by the service.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "text::lenient"
    )]
    pub id: Option<String>,
    /// Phone number.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "text::lenient"
    )]
    pub phone: Option<String>,
    /// Email address.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "text::lenient"
    )]
    pub email: Option<String>,
}

text_setters!(Client {
    name => with_name,
    last_name => with_last_name,
    country => with_country,
    city => with_city,
    id => with_id,
    phone => with_phone,
    email => with_email,
});

impl Client {
    /// Return `true` when the first name equals `name`, ignoring case.
    #[must_use]
    pub fn matches_name(&self, name: &str) -> bool {
        self.name
            .as_deref()
            .is_some_and(|own| own.to_lowercase() == name.to_lowercase())
    }
}

impl Entity for Client {
    const COLLECTION: &'static str = CLIENTS_PATH;
    const KIND: &'static str = "client";
    const DEFAULT_FIXTURE: &'static str = DEFAULT_CLIENT_FIXTURE;
    const SCHEMA: &'static str = CLIENT_SCHEMA;
    const LIST_SCHEMA: &'static str = CLIENT_LIST_SCHEMA;

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn set_id(&mut self, id: Option<String>) {
        self.id = id;
    }
}
