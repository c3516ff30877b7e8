use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

pub mod event;
pub mod value;

pub use event::{DocumentEvent, EventKindError};
pub use value::{DocumentFields, FieldValue, Link, LinkKind};

/// Separator between a field name and its value in a composite value.
pub const FIELD_SEPARATOR: &str = "::";

/// Canonical `field:: value` string.
///
/// Used both as the displayed suggestion and as the deduplication key of the
/// suggestion index, so equality is plain string equality. Cloning is cheap.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompositeValue(Arc<str>);

impl CompositeValue {
    pub fn new(field: &str, value_text: &str) -> Self {
        Self(Arc::from(format!("{field}{FIELD_SEPARATOR} {value_text}")))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Text before the first `::`, or the whole value when there is none.
    #[must_use]
    pub fn field_name(&self) -> &str {
        self.0
            .split_once(FIELD_SEPARATOR)
            .map_or(&*self.0, |(field, _)| field)
    }
}

impl fmt::Display for CompositeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CompositeValue {
    fn from(raw: &str) -> Self {
        Self(Arc::from(raw))
    }
}

impl From<String> for CompositeValue {
    fn from(raw: String) -> Self {
        Self(Arc::from(raw))
    }
}

impl AsRef<str> for CompositeValue {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Delimited region of one line the cursor currently sits in.
///
/// Offsets count characters, not bytes, and exclude the delimiters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerSpan {
    pub query: String,
    pub start: usize,
    pub end: usize,
}

impl TriggerSpan {
    pub fn new(query: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            query: query.into(),
            start,
            end,
        }
    }

    #[must_use]
    pub fn contains(&self, cursor: usize) -> bool {
        cursor >= self.start && cursor <= self.end
    }
}

pub fn serialize_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(Into::into)
}

pub fn serialize_json_pretty<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(Into::into)
}
