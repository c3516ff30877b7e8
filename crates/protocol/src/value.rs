use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LinkKind {
    #[default]
    File,
    Header,
    Block,
}

/// Reference to another document in the same vault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Target path, possibly with directories and extension.
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
    /// Header or block id for non-file links.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subpath: Option<String>,
    #[serde(default)]
    pub embed: bool,
    #[serde(default)]
    pub kind: LinkKind,
}

impl Link {
    pub fn file(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            display: None,
            subpath: None,
            embed: false,
            kind: LinkKind::File,
        }
    }

    #[must_use]
    pub fn with_display(mut self, display: impl Into<String>) -> Self {
        self.display = Some(display.into());
        self
    }

    #[must_use]
    pub fn with_subpath(mut self, kind: LinkKind, subpath: impl Into<String>) -> Self {
        self.kind = kind;
        self.subpath = Some(subpath.into());
        self
    }

    #[must_use]
    pub fn embedded(mut self) -> Self {
        self.embed = true;
        self
    }

    /// File name of the target with directories and extension stripped.
    #[must_use]
    pub fn base_name(&self) -> &str {
        let name = self.path.rsplit('/').next().unwrap_or(&self.path);
        match name.rfind('.') {
            Some(dot) if dot > 0 => &name[..dot],
            _ => name,
        }
    }
}

/// Raw value of a metadata field as produced by field extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    Null,
    Text(String),
    Number(f64),
    Boolean(bool),
    Link(Link),
    List(Vec<FieldValue>),
    Object(BTreeMap<String, FieldValue>),
}

impl FieldValue {
    pub fn text(raw: impl Into<String>) -> Self {
        Self::Text(raw.into())
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Coerces the field into a sequence of items.
    ///
    /// A list yields its elements, anything else is a one-item sequence. Null
    /// items are dropped. Nested lists are not expanded further.
    pub fn flatten(&self) -> impl Iterator<Item = &FieldValue> {
        let items: &[FieldValue] = match self {
            Self::List(items) => items,
            other => std::slice::from_ref(other),
        };
        items.iter().filter(|item| !item.is_null())
    }
}

impl From<&str> for FieldValue {
    fn from(raw: &str) -> Self {
        Self::Text(raw.to_string())
    }
}

impl From<f64> for FieldValue {
    fn from(raw: f64) -> Self {
        Self::Number(raw)
    }
}

impl From<bool> for FieldValue {
    fn from(raw: bool) -> Self {
        Self::Boolean(raw)
    }
}

impl From<Link> for FieldValue {
    fn from(link: Link) -> Self {
        Self::Link(link)
    }
}

/// Ordered `field -> value` pairs of one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentFields {
    entries: Vec<(String, FieldValue)>,
}

impl DocumentFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: impl Into<String>, value: impl Into<FieldValue>) {
        self.entries.push((field.into(), value.into()));
    }

    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.push(field, value);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.entries
            .iter()
            .map(|(field, value)| (field.as_str(), value))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for DocumentFields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(field, value)| (field.into(), value.into()))
                .collect(),
        }
    }
}
