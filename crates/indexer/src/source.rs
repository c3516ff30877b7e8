use fieldsuggest_protocol::{DocumentFields, FieldValue};

/// Supplies the documents of a corpus and their metadata fields.
pub trait FieldSource {
    /// Every document path in the corpus.
    fn list_documents(&self) -> Vec<String>;

    /// Current fields of one document, or `None` when the path is not a
    /// document the source understands.
    fn fields(&self, path: &str) -> Option<DocumentFields>;
}

/// Default textual representation of raw field values.
pub trait ValueStringifier {
    fn stringify(&self, value: &FieldValue) -> String;
}

impl<T: FieldSource + ?Sized> FieldSource for &T {
    fn list_documents(&self) -> Vec<String> {
        (**self).list_documents()
    }

    fn fields(&self, path: &str) -> Option<DocumentFields> {
        (**self).fields(path)
    }
}

/// In-memory corpus, kept in insertion order.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    documents: Vec<(String, DocumentFields)>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, path: impl Into<String>, fields: DocumentFields) -> Self {
        self.insert(path, fields);
        self
    }

    /// Adds a document or replaces the fields of an existing one.
    pub fn insert(&mut self, path: impl Into<String>, fields: DocumentFields) {
        let path = path.into();
        match self.documents.iter_mut().find(|(p, _)| *p == path) {
            Some(entry) => entry.1 = fields,
            None => self.documents.push((path, fields)),
        }
    }

    pub fn remove(&mut self, path: &str) -> Option<DocumentFields> {
        let pos = self.documents.iter().position(|(p, _)| p == path)?;
        Some(self.documents.remove(pos).1)
    }

    /// Moves a document to a new path, keeping its position.
    pub fn rename(&mut self, old_path: &str, new_path: impl Into<String>) -> bool {
        let new_path = new_path.into();
        if new_path == old_path {
            return self.fields(old_path).is_some();
        }
        self.remove(&new_path);
        match self.documents.iter_mut().find(|(p, _)| p == old_path) {
            Some(entry) => {
                entry.0 = new_path;
                true
            }
            None => false,
        }
    }
}

impl FieldSource for MemorySource {
    fn list_documents(&self) -> Vec<String> {
        self.documents.iter().map(|(path, _)| path.clone()).collect()
    }

    fn fields(&self, path: &str) -> Option<DocumentFields> {
        self.documents
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, fields)| fields.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_source_replaces_and_renames_in_place() {
        let mut source = MemorySource::new()
            .with("a.md", DocumentFields::new().with("k", "1"))
            .with("b.md", DocumentFields::new());

        source.insert("a.md", DocumentFields::new().with("k", "2"));
        assert_eq!(source.list_documents(), vec!["a.md", "b.md"]);
        assert_eq!(
            source.fields("a.md"),
            Some(DocumentFields::new().with("k", "2"))
        );

        assert!(source.rename("a.md", "c.md"));
        assert_eq!(source.list_documents(), vec!["c.md", "b.md"]);
        assert!(source.fields("a.md").is_none());
        assert!(!source.rename("missing.md", "d.md"));
    }
}
