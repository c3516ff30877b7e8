use crate::parse::parse_document;
use crate::scanner::{is_indexable_document, relative_document_path, VaultScanner};
use crate::source::FieldSource;
use crate::{IndexerError, Result};
use fieldsuggest_protocol::DocumentFields;
use std::path::{Path, PathBuf};

/// Markdown files under a directory, read from disk on demand.
#[derive(Debug, Clone)]
pub struct MarkdownVault {
    root: PathBuf,
}

impl MarkdownVault {
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        if !root.is_dir() {
            return Err(IndexerError::InvalidPath(root.display().to_string()));
        }
        Ok(Self {
            root: root.canonicalize()?,
        })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute location of a vault-relative document path.
    #[must_use]
    pub fn resolve(&self, path: &str) -> PathBuf {
        path.split('/')
            .filter(|part| !part.is_empty())
            .fold(self.root.clone(), |acc, part| acc.join(part))
    }
}

impl FieldSource for MarkdownVault {
    fn list_documents(&self) -> Vec<String> {
        VaultScanner::new(&self.root)
            .scan()
            .iter()
            .filter_map(|path| relative_document_path(&self.root, path))
            .collect()
    }

    /// `None` for anything [`list_documents`](Self::list_documents) would
    /// not report, so an update never indexes what a rebuild skips.
    fn fields(&self, path: &str) -> Option<DocumentFields> {
        let absolute = self.resolve(path);
        if !is_indexable_document(&self.root, &absolute) {
            return None;
        }
        match std::fs::read_to_string(&absolute) {
            Ok(text) => Some(parse_document(&text)),
            Err(err) => {
                log::debug!("Cannot read {}: {err}", absolute.display());
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldsuggest_protocol::FieldValue;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn lists_and_reads_documents() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("people")).unwrap();
        fs::write(temp.path().join("people/ann.md"), "role:: editor\n").unwrap();
        fs::write(temp.path().join("todo.md"), "- [ ] call [who:: Ann]\n").unwrap();
        fs::write(temp.path().join("photo.jpg"), "binary").unwrap();

        let vault = MarkdownVault::open(temp.path()).unwrap();
        assert_eq!(vault.list_documents(), vec!["people/ann.md", "todo.md"]);

        let fields = vault.fields("people/ann.md").unwrap();
        let pairs: Vec<_> = fields.iter().collect();
        assert_eq!(pairs, vec![("role", &FieldValue::text("editor"))]);

        assert!(vault.fields("photo.jpg").is_none());
        assert!(vault.fields("missing.md").is_none());
    }

    #[test]
    fn excluded_documents_have_no_fields() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join(".drafts")).unwrap();
        fs::write(temp.path().join(".gitignore"), "private.md\n").unwrap();
        fs::write(temp.path().join(".drafts/x.md"), "k:: hidden").unwrap();
        fs::write(temp.path().join("private.md"), "k:: private").unwrap();
        fs::write(temp.path().join("public.md"), "k:: public").unwrap();

        let vault = MarkdownVault::open(temp.path()).unwrap();
        assert_eq!(vault.list_documents(), vec!["public.md"]);
        assert!(vault.fields(".drafts/x.md").is_none());
        assert!(vault.fields("private.md").is_none());
        assert!(vault.fields("public.md").is_some());
    }

    #[test]
    fn open_rejects_non_directories() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("note.md");
        fs::write(&file, "").unwrap();
        assert!(matches!(
            MarkdownVault::open(&file),
            Err(IndexerError::InvalidPath(_))
        ));
    }
}
