use crate::filter::FilterPolicy;
use crate::format::format_composite;
use crate::source::ValueStringifier;
use fieldsuggest_protocol::{CompositeValue, DocumentFields};
use std::collections::HashSet;

/// Field name reserved for implicit file metadata; never suggested.
pub const RESERVED_FIELD: &str = "file";

/// Composite values one document contributes, deduplicated, in first-seen
/// order. Equality ignores order.
#[derive(Debug, Clone, Default)]
pub struct ContributedSet {
    order: Vec<CompositeValue>,
    members: HashSet<CompositeValue>,
}

impl ContributedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` when the value was already present.
    pub fn insert(&mut self, value: CompositeValue) -> bool {
        if !self.members.insert(value.clone()) {
            return false;
        }
        self.order.push(value);
        true
    }

    #[must_use]
    pub fn contains(&self, value: &CompositeValue) -> bool {
        self.members.contains(value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CompositeValue> {
        self.order.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl PartialEq for ContributedSet {
    fn eq(&self, other: &Self) -> bool {
        self.members == other.members
    }
}

impl Eq for ContributedSet {}

impl FromIterator<CompositeValue> for ContributedSet {
    fn from_iter<I: IntoIterator<Item = CompositeValue>>(iter: I) -> Self {
        let mut set = Self::new();
        for value in iter {
            set.insert(value);
        }
        set
    }
}

/// Turns a document's raw fields into its contributed set.
#[derive(Clone, Copy)]
pub struct Extractor<'a> {
    policy: &'a FilterPolicy,
    stringifier: &'a dyn ValueStringifier,
}

impl<'a> Extractor<'a> {
    pub fn new(policy: &'a FilterPolicy, stringifier: &'a dyn ValueStringifier) -> Self {
        Self {
            policy,
            stringifier,
        }
    }

    #[must_use]
    pub fn is_document_allowed(&self, path: &str) -> bool {
        self.policy.is_document_allowed(path)
    }

    /// Formats every non-null item of every field and keeps the values the
    /// field patterns allow.
    pub fn composite_values(&self, fields: &DocumentFields) -> ContributedSet {
        let mut set = ContributedSet::new();
        for (field, value) in fields.iter() {
            if field == RESERVED_FIELD {
                continue;
            }
            for item in value.flatten() {
                let composite = format_composite(field, item, self.stringifier);
                if self.policy.is_field_allowed(&composite) {
                    set.insert(composite);
                }
            }
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::DefaultStringifier;
    use fieldsuggest_protocol::{FieldValue, Link};
    use pretty_assertions::assert_eq;

    fn values(set: &ContributedSet) -> Vec<&str> {
        set.iter().map(CompositeValue::as_str).collect()
    }

    #[test]
    fn flattens_lists_and_skips_nulls() {
        let fields = DocumentFields::new()
            .with(
                "tags",
                FieldValue::List(vec![
                    FieldValue::text("a"),
                    FieldValue::Null,
                    FieldValue::text("b"),
                ]),
            )
            .with("empty", FieldValue::Null)
            .with("who", Link::file("people/Ann.md"));

        let policy = FilterPolicy::allow_all();
        let set = Extractor::new(&policy, &DefaultStringifier).composite_values(&fields);
        assert_eq!(values(&set), vec!["tags:: a", "tags:: b", "who:: [[Ann]]"]);
    }

    #[test]
    fn repeated_values_are_counted_once() {
        let fields = DocumentFields::new()
            .with("status", "open")
            .with("status", "open")
            .with("x", FieldValue::List(vec![FieldValue::text("1"), FieldValue::text("1")]));

        let policy = FilterPolicy::allow_all();
        let set = Extractor::new(&policy, &DefaultStringifier).composite_values(&fields);
        assert_eq!(values(&set), vec!["status:: open", "x:: 1"]);
    }

    #[test]
    fn skips_reserved_and_ignored_fields() {
        let fields = DocumentFields::new()
            .with("file", "meta")
            .with("created", "today")
            .with("kept", "yes");

        let policy = FilterPolicy::new(&["created".to_string()], &[]).unwrap();
        let set = Extractor::new(&policy, &DefaultStringifier).composite_values(&fields);
        assert_eq!(values(&set), vec!["kept:: yes"]);
    }

    #[test]
    fn set_equality_ignores_order() {
        let a: ContributedSet = ["x:: 1", "y:: 2"].into_iter().map(CompositeValue::from).collect();
        let b: ContributedSet = ["y:: 2", "x:: 1"].into_iter().map(CompositeValue::from).collect();
        assert_eq!(a, b);
    }
}
