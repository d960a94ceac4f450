//! Raw request fields as submitted by HTML forms or JSON clients.
//!
//! Every entity normalizes its input from a [`Fields`] map, so the coercion
//! rules live in one place regardless of how the body was encoded.

use std::collections::HashMap;

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FieldsError {
    #[error("Malformed JSON body: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Expected a JSON object")]
    NotAnObject,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    List(Vec<String>),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fields(HashMap<String, FieldValue>);

impl Fields {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses an `application/x-www-form-urlencoded` body.
    ///
    /// Repeated keys and keys suffixed with `[]` collect into a list.
    #[must_use]
    pub fn from_urlencoded(body: &[u8]) -> Self {
        let mut fields = Self::new();
        for (key, value) in url::form_urlencoded::parse(body) {
            match key.strip_suffix("[]") {
                Some(base) => fields.push(base, value.into_owned()),
                None => fields.append(&key, value.into_owned()),
            }
        }
        fields
    }

    /// Parses a JSON object body. Scalars become text, arrays become lists
    /// and `null` is treated as an absent field.
    pub fn from_json_slice(body: &[u8]) -> Result<Self, FieldsError> {
        let Value::Object(map) = serde_json::from_slice::<Value>(body)? else {
            return Err(FieldsError::NotAnObject);
        };

        let mut fields = Self::new();
        for (key, value) in map {
            match value {
                Value::Null => {}
                Value::Array(items) => {
                    let list = items.into_iter().filter_map(scalar_text).collect();
                    fields.0.insert(key, FieldValue::List(list));
                }
                other => {
                    if let Some(text) = scalar_text(other) {
                        fields.0.insert(key, FieldValue::Text(text));
                    }
                }
            }
        }
        Ok(fields)
    }

    #[must_use]
    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.0
            .insert(key.to_string(), FieldValue::Text(value.into()));
        self
    }

    #[cfg(test)]
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Text value of a field. Lists are joined with commas.
    #[must_use]
    pub fn text(&self, key: &str) -> Option<String> {
        match self.0.get(key)? {
            FieldValue::Text(text) => Some(text.clone()),
            FieldValue::List(items) => Some(items.join(",")),
        }
    }

    /// Numeric value of a present field; `Some(None)` when it does not parse.
    #[must_use]
    pub fn number(&self, key: &str) -> Option<Option<f64>> {
        self.text(key).map(|raw| parse_number(&raw))
    }

    /// List value of a present field. A text value is split on commas and
    /// each part trimmed; empty parts are dropped.
    #[must_use]
    pub fn list(&self, key: &str) -> Option<Vec<String>> {
        match self.0.get(key)? {
            FieldValue::List(items) => Some(items.clone()),
            FieldValue::Text(text) => Some(
                text.split(',')
                    .map(str::trim)
                    .filter(|part| !part.is_empty())
                    .map(str::to_string)
                    .collect(),
            ),
        }
    }

    fn append(&mut self, key: &str, value: String) {
        match self.0.get_mut(key) {
            Some(FieldValue::Text(previous)) => {
                let first = std::mem::take(previous);
                self.0
                    .insert(key.to_string(), FieldValue::List(vec![first, value]));
            }
            Some(FieldValue::List(items)) => items.push(value),
            None => {
                self.0.insert(key.to_string(), FieldValue::Text(value));
            }
        }
    }

    fn push(&mut self, key: &str, value: String) {
        match self.0.get_mut(key) {
            Some(FieldValue::List(items)) => items.push(value),
            Some(FieldValue::Text(previous)) => {
                let first = std::mem::take(previous);
                self.0
                    .insert(key.to_string(), FieldValue::List(vec![first, value]));
            }
            None => {
                self.0.insert(key.to_string(), FieldValue::List(vec![value]));
            }
        }
    }
}

fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Lenient numeric parse: blank input is zero, anything non-finite is `None`.
#[must_use]
pub fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Some(0.0);
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}
