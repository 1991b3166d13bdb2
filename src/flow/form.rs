//! Accumulated wizard form state.
//!
//! A flat field-name → value map filled in step by step. Values get
//! presence and type coercion only — semantic validation is not this
//! layer's job.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single form field value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(Decimal),
    Text(String),
}

/// The form accumulated across wizard steps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormData {
    fields: BTreeMap<String, FieldValue>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: FieldValue) {
        self.fields.insert(key.into(), value);
    }

    pub fn set_text(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.set(key, FieldValue::Text(value.into()));
    }

    pub fn set_number(&mut self, key: impl Into<String>, value: Decimal) {
        self.set(key, FieldValue::Number(value));
    }

    /// Merge another form into this one, later values winning.
    pub fn merge(&mut self, other: FormData) {
        self.fields.extend(other.fields);
    }

    /// Text view of a field. Numbers coerce to their decimal rendering.
    pub fn text(&self, key: &str) -> Option<String> {
        match self.fields.get(key)? {
            FieldValue::Text(s) => Some(s.clone()),
            FieldValue::Number(n) => Some(n.to_string()),
        }
    }

    /// Numeric view of a field. Text coerces when it parses as a decimal.
    pub fn number(&self, key: &str) -> Option<Decimal> {
        match self.fields.get(key)? {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(s) => s.trim().parse().ok(),
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn clear(&mut self) {
        self.fields.clear();
    }
}
