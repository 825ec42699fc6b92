//! Lenient decoding for textual fields.
//!
//! Mock services are inconsistent about whether `id`, `stock` or `price` are
//! strings or numbers. The records store them as text either way.

use serde::{Deserialize, Deserializer, de::Error as _};
use serde_json::Value;

pub(super) fn lenient<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => Ok(Some(text)),
        Some(Value::Number(number)) => Ok(Some(number.to_string())),
        Some(other) => Err(D::Error::custom(format!(
            "expected a string or number, found {other}"
        ))),
    }
}
