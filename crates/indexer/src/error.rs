use thiserror::Error;

pub type Result<T> = std::result::Result<T, IndexerError>;

#[derive(Error, Debug)]
pub enum IndexerError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Invalid settings: {0}")]
    SettingsError(#[from] toml::de::Error),

    #[error("Invalid vault path: {0}")]
    InvalidPath(String),

    #[error("{0}")]
    Other(String),
}
