use serde::{Deserialize, Serialize};

/// Statistics about a full index build
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStats {
    /// Documents listed by the field source
    pub documents_scanned: usize,

    /// Documents whose fields were indexed
    pub documents_indexed: usize,

    /// Documents excluded by path patterns
    pub documents_ignored: usize,

    /// Documents the field source did not recognise
    pub documents_unrecognized: usize,

    /// Composite values contributed, summed over documents
    pub contributions: usize,

    /// Distinct composite values in the index
    pub unique_values: usize,

    /// Time taken in milliseconds
    pub time_ms: u64,
}

impl IndexStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_document(&mut self, contributions: usize) {
        self.documents_indexed += 1;
        self.contributions += contributions;
    }

    pub fn add_ignored(&mut self) {
        self.documents_ignored += 1;
    }

    pub fn add_unrecognized(&mut self) {
        self.documents_unrecognized += 1;
    }
}
