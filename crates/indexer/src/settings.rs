use crate::filter::FilterPolicy;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default settings file looked up at the vault root.
pub const SETTINGS_FILE_NAME: &str = ".fieldsuggest.toml";

pub const DEFAULT_MAX_SUGGESTIONS: usize = 10;

/// User-facing configuration.
///
/// ```toml
/// ignored_fields = ["created", "aliases?"]
/// ignored_files = ["^templates/"]
/// max_suggestions = 10
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Regular expressions matched against whole field names.
    pub ignored_fields: Vec<String>,

    /// Regular expressions matched anywhere in a document path.
    pub ignored_files: Vec<String>,

    pub max_suggestions: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            ignored_fields: Vec::new(),
            ignored_files: Vec::new(),
            max_suggestions: DEFAULT_MAX_SUGGESTIONS,
        }
    }
}

impl Settings {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    /// Loads `path` when it exists, defaults otherwise.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Builds a pattern list from newline-separated text, one pattern per
    /// non-blank line.
    pub fn patterns_from_lines(text: &str) -> Vec<String> {
        text.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn compile(&self) -> Result<FilterPolicy> {
        FilterPolicy::new(&self.ignored_fields, &self.ignored_files)
    }

    /// Whether switching to `other` changes which values are indexed.
    #[must_use]
    pub fn filters_differ(&self, other: &Self) -> bool {
        self.ignored_fields != other.ignored_fields || self.ignored_files != other.ignored_files
    }
}
