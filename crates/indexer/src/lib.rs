//! # Field Suggest Indexer
//!
//! Corpus-wide catalogue of `field:: value` suggestions.
//!
//! ## Pipeline
//!
//! ```text
//! Vault
//!     │
//!     ├──> Vault Scanner (.gitignore aware)
//!     │      └─> Markdown documents
//!     │
//!     ├──> Extractor (frontmatter + inline fields, filter policy)
//!     │      └─> Contributed set per document
//!     │
//!     └──> Suggestion Index (reference counted)
//!            └─> Unique composite values
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use fieldsuggest_indexer::{
//!     DefaultStringifier, Extractor, MarkdownVault, Settings, SuggestionIndex,
//! };
//!
//! fn main() -> fieldsuggest_indexer::Result<()> {
//!     let vault = MarkdownVault::open("/path/to/vault")?;
//!     let policy = Settings::default().compile()?;
//!     let extractor = Extractor::new(&policy, &DefaultStringifier);
//!
//!     let mut index = SuggestionIndex::new();
//!     let stats = index.build_full(&vault, &extractor);
//!
//!     println!("{} documents, {} values", stats.documents_indexed, index.len());
//!     Ok(())
//! }
//! ```

mod error;
mod extract;
mod filter;
mod format;
mod index;
mod parse;
mod scanner;
mod settings;
mod source;
mod stats;
mod vault;
mod watcher;

pub use error::{IndexerError, Result};
pub use extract::{ContributedSet, Extractor, RESERVED_FIELD};
pub use filter::FilterPolicy;
pub use format::{format_composite, DefaultStringifier};
pub use index::SuggestionIndex;
pub use parse::{parse_document, parse_link, parse_value};
pub use scanner::{
    is_candidate_document, is_document_file, is_indexable_document, relative_document_path,
    VaultScanner,
};
pub use settings::{Settings, DEFAULT_MAX_SUGGESTIONS, SETTINGS_FILE_NAME};
pub use source::{FieldSource, MemorySource, ValueStringifier};
pub use stats::IndexStats;
pub use vault::MarkdownVault;
pub use watcher::{translate_event, VaultWatcher};
