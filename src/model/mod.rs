//! Data records exchanged with the mock API.
//!
//! [`Client`] and [`Resource`] are plain attribute bags: every field is
//! optional, equality is structural and nothing is validated locally. Both
//! serialise with camelCase keys and omit absent fields, so a record built in
//! a test posts exactly the fields that were set.
//!
//! The shared [`Entity`] trait lets the request layer treat both records
//! uniformly.

use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use std::fmt;

mod client;
mod resource;
mod text;

pub use client::Client;
pub use resource::Resource;

/// Record type served by a collection of the mock API.
pub trait Entity: Serialize + DeserializeOwned + Clone + PartialEq + fmt::Debug {
    /// Collection path segment, for example `clients`.
    const COLLECTION: &'static str;
    /// Singular label used in log and error messages.
    const KIND: &'static str;
    /// File name of the default fixture within the fixture directory.
    const DEFAULT_FIXTURE: &'static str;
    /// Schema describing one record.
    const SCHEMA: &'static str;
    /// Schema describing a list of records.
    const LIST_SCHEMA: &'static str;

    /// Identifier assigned by the remote service, if any.
    fn id(&self) -> Option<&str>;

    /// Replace the identifier.
    fn set_id(&mut self, id: Option<String>);

    /// Copy of the record with the identifier cleared.
    ///
    /// Used to compare what was sent with what the service echoed back.
    #[must_use]
    fn without_id(&self) -> Self {
        let mut copy = self.clone();
        copy.set_id(None);
        copy
    }
}

/// Generates consuming `with_*` setters for optional text fields.
macro_rules! text_setters {
    ($ty:ident { $($field:ident => $setter:ident),* $(,)? }) => {
        impl $ty {
            $(
                #[doc = concat!("Set `", stringify!($field), "`, returning the updated record.")]
                #[must_use]
                pub fn $setter(mut self, value: impl Into<String>) -> Self {
                    self.$field = Some(value.into());
                    self
                }
            )*
        }
    };
}

pub(crate) use text_setters;

/// Decode one record from JSON text, accepting only a JSON object.
///
/// The derived record deserialisers would also fill fields by position from
/// a JSON array; going through a [`Map`] rules that out.
///
/// # Errors
///
/// Returns an error when `text` is not a JSON object or its fields do not
/// fit `E`.
pub fn decode_record<E: DeserializeOwned>(text: &str) -> Result<E, serde_json::Error> {
    let fields: Map<String, Value> = serde_json::from_str(text)?;
    serde_json::from_value(Value::Object(fields))
}

/// Decode a JSON array of records, each of which must be a JSON object.
///
/// # Errors
///
/// Returns an error when `text` is not an array of objects or any element
/// does not fit `E`.
pub fn decode_records<E: DeserializeOwned>(text: &str) -> Result<Vec<E>, serde_json::Error> {
    let rows: Vec<Map<String, Value>> = serde_json::from_str(text)?;
    rows.into_iter()
        .map(|fields| serde_json::from_value(Value::Object(fields)))
        .collect()
}
