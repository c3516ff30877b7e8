use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Change notification for a single document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DocumentEvent {
    /// Content changed; also sent for newly created documents.
    Update { path: String },
    Rename { old_path: String, path: String },
    Delete { path: String },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EventKindError {
    #[error("unknown document event kind: {0}")]
    Unknown(String),

    #[error("rename event for {0} is missing the old path")]
    MissingOldPath(String),
}

impl DocumentEvent {
    /// Builds an event from the host's string-typed notification.
    pub fn parse(
        kind: &str,
        path: impl Into<String>,
        old_path: Option<String>,
    ) -> Result<Self, EventKindError> {
        let path = path.into();
        match kind {
            "update" | "create" => Ok(Self::Update { path }),
            "delete" => Ok(Self::Delete { path }),
            "rename" => match old_path {
                Some(old_path) => Ok(Self::Rename { old_path, path }),
                None => Err(EventKindError::MissingOldPath(path)),
            },
            other => Err(EventKindError::Unknown(other.to_string())),
        }
    }

    /// Path the document lives at after the event.
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::Update { path } | Self::Rename { path, .. } | Self::Delete { path } => path,
        }
    }
}
