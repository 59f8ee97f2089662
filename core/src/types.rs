//! Inputs and results of the ToyDB operations.
//!
//! # Design
//! Records are open-ended JSON, so the client never models their shape. The
//! typed pieces are the operation inputs (collection names, field selectors)
//! and the one result with a special case, `Collections`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Limit sent by `query` when the caller gives none.
pub const DEFAULT_QUERY_LIMIT: u32 = 10;

/// Text of `Collections::Empty`.
pub const NO_COLLECTIONS: &str = "No collection Created yet";

/// A single stored document: field name to JSON value.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// Result of listing collections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Collections {
    Names(Vec<String>),
    /// The server answered with a JSON `null`: nothing has been created yet.
    Empty,
}

impl Collections {
    pub fn names(&self) -> &[String] {
        match self {
            Collections::Names(names) => names,
            Collections::Empty => &[],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.names().is_empty()
    }
}

impl fmt::Display for Collections {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Collections::Names(names) => f.write_str(&names.join(", ")),
            Collections::Empty => f.write_str(NO_COLLECTIONS),
        }
    }
}

/// Options for `DbClient::query`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryOptions {
    pub collection: String,
    /// Maximum number of records. `None` and `Some(0)` both mean the default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl QueryOptions {
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            limit: None,
        }
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub(crate) fn effective_limit(&self) -> u32 {
        match self.limit {
            Some(0) | None => DEFAULT_QUERY_LIMIT,
            Some(n) => n,
        }
    }
}

/// The value side of a field selector.
///
/// Sent on the wire as its plain text rendering (`42`, `true`, `abc`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
}

impl FieldValue {
    /// Only empty text counts as missing; `0` and `false` are real values.
    pub fn is_missing(&self) -> bool {
        matches!(self, FieldValue::Text(s) if s.is_empty())
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Bool(b) => write!(f, "{b}"),
            FieldValue::Number(n) => write!(f, "{n}"),
            FieldValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

macro_rules! field_value_from_int {
    ($($t:ty),*) => {
        $(impl From<$t> for FieldValue {
            fn from(n: $t) -> Self {
                FieldValue::Number(n.into())
            }
        })*
    };
}

field_value_from_int!(i32, i64, u32, u64);

/// Target of `update_field` and `add_new_field`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldUpdate {
    pub collection: String,
    pub id: String,
    pub field: String,
    pub value: FieldValue,
}

impl FieldUpdate {
    pub fn new(
        collection: impl Into<String>,
        id: impl Into<String>,
        field: impl Into<String>,
        value: impl Into<FieldValue>,
    ) -> Self {
        Self {
            collection: collection.into(),
            id: id.into(),
            field: field.into(),
            value: value.into(),
        }
    }
}
