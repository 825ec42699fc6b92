//! Resource record.

use super::{Entity, text, text_setters};
use crate::constants::{
    DEFAULT_RESOURCE_FIXTURE, RESOURCE_LIST_SCHEMA, RESOURCE_SCHEMA, RESOURCES_PATH,
};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// A stocked item with pricing, tags and an activity flag.
///
/// `stock` and `price` are kept as text because the service does not agree
/// with itself on their JSON type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    /// Display name.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "text::lenient"
    )]
    pub name: Option<String>,
    /// Brand.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "text::lenient"
    )]
    pub trademark: Option<String>,
    /// Units available.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "text::lenient"
    )]
    pub stock: Option<String>,
    /// Unit price.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "text::lenient"
    )]
    pub price: Option<String>,
    /// Free-form description.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "text::lenient"
    )]
    pub description: Option<String>,
    /// Identifier assigned by the service.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "text::lenient"
    )]
    pub id: Option<String>,
    /// Comma-joined tag list.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "text::lenient"
    )]
    pub tags: Option<String>,
    /// Whether the resource is offered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

text_setters!(Resource {
    name => with_name,
    trademark => with_trademark,
    stock => with_stock,
    price => with_price,
    description => with_description,
    id => with_id,
});

impl Resource {
    /// Set the activity flag, returning the updated record.
    #[must_use]
    pub const fn with_active(mut self, active: bool) -> Self {
        self.active = Some(active);
        self
    }

    /// Store `tags` in the comma-joined wire form.
    ///
    /// Blank entries are dropped and surrounding whitespace is trimmed.
    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = tags
            .into_iter()
            .map(|tag| tag.as_ref().trim().to_owned())
            .filter(|tag| !tag.is_empty())
            .join(",");
        self.tags = Some(joined);
        self
    }

    /// Split the stored tags into individual entries.
    #[must_use]
    pub fn tag_list(&self) -> Vec<String> {
        self.tags
            .as_deref()
            .map(|joined| {
                joined
                    .split(',')
                    .map(str::trim)
                    .filter(|tag| !tag.is_empty())
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Return `true` only when the flag is present and set.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.unwrap_or(false)
    }
}

impl Entity for Resource {
    const COLLECTION: &'static str = RESOURCES_PATH;
    const KIND: &'static str = "resource";
    const DEFAULT_FIXTURE: &'static str = DEFAULT_RESOURCE_FIXTURE;
    const SCHEMA: &'static str = RESOURCE_SCHEMA;
    const LIST_SCHEMA: &'static str = RESOURCE_LIST_SCHEMA;

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn set_id(&mut self, id: Option<String>) {
        self.id = id;
    }
}
