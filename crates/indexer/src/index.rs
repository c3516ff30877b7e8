use crate::extract::{ContributedSet, Extractor};
use crate::source::FieldSource;
use crate::stats::IndexStats;
use fieldsuggest_protocol::{CompositeValue, DocumentFields};
use log::{debug, info};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

/// Corpus-wide, reference-counted catalogue of composite values.
///
/// Each document's contributed set is remembered so that an event touching a
/// single document is reconciled against its previous contribution only:
///
/// ```text
/// old set O, new set N
///   O \ N  -> refcount - 1, evicted from `values` at zero
///   N \ O  -> refcount + 1, appended to `values` when new
///   O ∩ N  -> untouched
/// ```
///
/// Readers take [`SuggestionIndex::snapshot`]; the value list is copied on
/// write only while a snapshot is still alive.
#[derive(Debug, Default)]
pub struct SuggestionIndex {
    values: Arc<Vec<CompositeValue>>,
    refcount: HashMap<CompositeValue, usize>,
    contributed: HashMap<String, ContributedSet>,
}

impl SuggestionIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Discards all state and indexes every allowed document of `source`.
    pub fn build_full<F>(&mut self, source: &F, extractor: &Extractor<'_>) -> IndexStats
    where
        F: FieldSource + ?Sized,
    {
        let start = Instant::now();
        let mut stats = IndexStats::new();
        let mut values = Vec::new();
        let mut refcount: HashMap<CompositeValue, usize> = HashMap::new();
        let mut contributed: HashMap<String, ContributedSet> = HashMap::new();

        for path in source.list_documents() {
            stats.documents_scanned += 1;
            if !extractor.is_document_allowed(&path) {
                stats.add_ignored();
                continue;
            }
            if contributed.contains_key(&path) {
                debug!("Skipping duplicate document {path}");
                continue;
            }
            let Some(fields) = source.fields(&path) else {
                debug!("Skipping unrecognized document {path}");
                stats.add_unrecognized();
                continue;
            };

            // the set is deduplicated, so a document adds at most 1 per value
            let set = extractor.composite_values(&fields);
            for value in set.iter() {
                let count = refcount.entry(value.clone()).or_insert(0);
                if *count == 0 {
                    values.push(value.clone());
                }
                *count += 1;
            }
            stats.add_document(set.len());
            contributed.insert(path, set);
        }

        self.values = Arc::new(values);
        self.refcount = refcount;
        self.contributed = contributed;

        stats.unique_values = self.values.len();
        stats.time_ms = start.elapsed().as_millis() as u64;
        info!(
            "Rebuilt suggestion index ({} values from {} documents, {}ms)",
            stats.unique_values, stats.documents_indexed, stats.time_ms
        );
        stats
    }

    /// Reconciles one document against its current fields.
    ///
    /// Also used for newly created documents. Ignored paths are left alone.
    pub fn apply_update(&mut self, path: &str, fields: &DocumentFields, extractor: &Extractor<'_>) {
        if !extractor.is_document_allowed(path) {
            return;
        }
        let next = extractor.composite_values(fields);
        self.reconcile(path, next);
    }

    /// Moves a document to a new path.
    ///
    /// `fields` is only consulted when the document becomes visible under its
    /// new path; `None` means the path is not a document, and anything it
    /// contributed before is dropped.
    pub fn apply_rename<G>(
        &mut self,
        old_path: &str,
        new_path: &str,
        fields: G,
        extractor: &Extractor<'_>,
    ) where
        G: FnOnce() -> Option<DocumentFields>,
    {
        match (
            extractor.is_document_allowed(old_path),
            extractor.is_document_allowed(new_path),
        ) {
            (true, true) => match self.contributed.remove(old_path) {
                Some(set) => {
                    if old_path != new_path {
                        self.apply_delete(new_path);
                    }
                    self.contributed.insert(new_path.to_string(), set);
                }
                None => self.update_from(new_path, fields, extractor),
            },
            (false, true) => self.update_from(new_path, fields, extractor),
            (true, false) => self.apply_delete(old_path),
            (false, false) => {}
        }
    }

    /// Drops every contribution of `path`. Unknown paths are a no-op.
    pub fn apply_delete(&mut self, path: &str) {
        let Some(old) = self.contributed.remove(path) else {
            return;
        };
        let evicted: HashSet<CompositeValue> =
            old.iter().filter(|value| self.release(value)).cloned().collect();
        if !evicted.is_empty() {
            Arc::make_mut(&mut self.values).retain(|value| !evicted.contains(value));
        }
    }

    fn update_from<G>(&mut self, path: &str, fields: G, extractor: &Extractor<'_>)
    where
        G: FnOnce() -> Option<DocumentFields>,
    {
        match fields() {
            Some(fields) => self.apply_update(path, &fields, extractor),
            None => {
                debug!("No fields for {path}, dropping its entry");
                self.apply_delete(path);
            }
        }
    }

    fn reconcile(&mut self, path: &str, next: ContributedSet) {
        let previous = self.contributed.remove(path).unwrap_or_default();

        let evicted: HashSet<CompositeValue> = previous
            .iter()
            .filter(|value| !next.contains(value))
            .filter(|value| self.release(value))
            .cloned()
            .collect();

        let added: Vec<&CompositeValue> = next
            .iter()
            .filter(|value| !previous.contains(value))
            .collect();

        if !evicted.is_empty() || !added.is_empty() {
            let values = Arc::make_mut(&mut self.values);
            if !evicted.is_empty() {
                values.retain(|value| !evicted.contains(value));
            }
            for value in added {
                let count = self.refcount.entry(value.clone()).or_insert(0);
                if *count == 0 {
                    values.push(value.clone());
                }
                *count += 1;
            }
        }

        self.contributed.insert(path.to_string(), next);
    }

    /// Decrements `value`; returns `true` when it reached zero and was dropped.
    fn release(&mut self, value: &CompositeValue) -> bool {
        let Some(count) = self.refcount.get_mut(value) else {
            return false;
        };
        if *count > 1 {
            *count -= 1;
            return false;
        }
        self.refcount.remove(value);
        true
    }

    /// Unique values currently visible, in first-seen order.
    #[must_use]
    pub fn values(&self) -> &[CompositeValue] {
        &self.values
    }

    /// Immutable view of the value list for readers outside the owner.
    #[must_use]
    pub fn snapshot(&self) -> Arc<Vec<CompositeValue>> {
        Arc::clone(&self.values)
    }

    /// Number of documents contributing `value`.
    #[must_use]
    pub fn refcount(&self, value: &CompositeValue) -> usize {
        self.refcount.get(value).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn refcounts(&self) -> &HashMap<CompositeValue, usize> {
        &self.refcount
    }

    #[must_use]
    pub fn contributed(&self, path: &str) -> Option<&ContributedSet> {
        self.contributed.get(path)
    }

    #[must_use]
    pub fn document_count(&self) -> usize {
        self.contributed.len()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Checks that `values`, `refcount` and the contributed sets agree.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        let mut expected: HashMap<&CompositeValue, usize> = HashMap::new();
        for set in self.contributed.values() {
            for value in set.iter() {
                *expected.entry(value).or_insert(0) += 1;
            }
        }

        let unique: HashSet<&CompositeValue> = self.values.iter().collect();
        unique.len() == self.values.len()
            && unique.len() == expected.len()
            && self.refcount.len() == expected.len()
            && expected.iter().all(|(value, count)| {
                unique.contains(value) && self.refcount.get(*value) == Some(count)
            })
    }
}
