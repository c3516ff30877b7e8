use crate::{IndexerError, Result};
use fieldsuggest_protocol::{CompositeValue, FIELD_SEPARATOR};
use regex::Regex;

/// Compiled exclusion patterns for field names and document paths.
#[derive(Debug, Clone, Default)]
pub struct FilterPolicy {
    ignored_fields: Vec<Regex>,
    ignored_paths: Vec<Regex>,
}

impl FilterPolicy {
    /// Policy that lets every field and document through.
    pub fn allow_all() -> Self {
        Self::default()
    }

    /// Compiles both pattern lists.
    ///
    /// Field patterns are anchored at the start of the composite value and
    /// must match the whole field name up to the `::` separator; path
    /// patterns match anywhere in the path. Blank patterns are skipped.
    pub fn new(ignored_fields: &[String], ignored_paths: &[String]) -> Result<Self> {
        let ignored_fields = ignored_fields
            .iter()
            .filter_map(|pattern| normalize_pattern(pattern))
            .map(|pattern| compile(pattern, &format!("^(?:{pattern}){FIELD_SEPARATOR}")))
            .collect::<Result<Vec<_>>>()?;
        let ignored_paths = ignored_paths
            .iter()
            .filter_map(|pattern| normalize_pattern(pattern))
            .map(|pattern| compile(pattern, pattern))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            ignored_fields,
            ignored_paths,
        })
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.ignored_fields.is_empty() || !self.ignored_paths.is_empty()
    }

    #[must_use]
    pub fn is_field_allowed(&self, value: &CompositeValue) -> bool {
        !self
            .ignored_fields
            .iter()
            .any(|regex| regex.is_match(value.as_str()))
    }

    #[must_use]
    pub fn is_document_allowed(&self, path: &str) -> bool {
        !self.ignored_paths.iter().any(|regex| regex.is_match(path))
    }
}

fn normalize_pattern(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

fn compile(pattern: &str, expr: &str) -> Result<Regex> {
    Regex::new(expr).map_err(|source| IndexerError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}
