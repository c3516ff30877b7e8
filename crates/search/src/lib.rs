//! # Field Suggest Search
//!
//! Ranks composite values against the query typed inside a trigger span.
//!
//! ```
//! use fieldsuggest_protocol::CompositeValue;
//! use fieldsuggest_search::SuggestionMatcher;
//!
//! let values = vec![
//!     CompositeValue::new("status", "open"),
//!     CompositeValue::new("owner", "ann"),
//! ];
//! let mut matcher = SuggestionMatcher::new(10);
//! let found = matcher.suggest("open", &values);
//! assert_eq!(found[0].value.as_str(), "status:: open");
//! ```

mod fuzzy;
mod highlight;

pub use fuzzy::SuggestionMatcher;
pub use highlight::{ranges_from_indices, Suggestion};
