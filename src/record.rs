//! Item records: the permissive string-keyed mappings users submit

use crate::DataError;
use serde::Serialize;
use serde_json::{Map, Value};

/// One raw order line item as entered by a user.
///
/// Field access is permissive by contract: a missing or null key reads as
/// the empty string, and non-string values read as their JSON display form
/// (so an `order_external_id` of `1042` and `"1042"` are the same id).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ItemRecord(Map<String, Value>);

impl ItemRecord {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Read a field as text, defaulting to `""` when absent or null.
    pub fn field(&self, key: &str) -> String {
        match self.0.get(key) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }
}

/// Parse a JSON document into a list of item records.
///
/// The document must be a list of objects. A non-object element rejects
/// the whole document with the offending index, so totals can never be
/// computed over a partially-read list.
pub fn parse_items(text: &str) -> Result<Vec<ItemRecord>, DataError> {
    let value: Value = serde_json::from_str(text)?;
    let Value::Array(elements) = value else {
        return Err(DataError::InvalidShape {
            found: value_kind(&value),
        });
    };
    elements
        .into_iter()
        .enumerate()
        .map(|(index, element)| match element {
            Value::Object(fields) => Ok(ItemRecord::new(fields)),
            _ => Err(DataError::InvalidItem { index }),
        })
        .collect()
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
