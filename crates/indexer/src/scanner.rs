use ignore::gitignore::{Gitignore, GitignoreBuilder};
use ignore::WalkBuilder;
use std::path::{Component, Path, PathBuf};

/// Scanner for finding markdown documents in a vault
pub struct VaultScanner {
    root: PathBuf,
}

impl VaultScanner {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Scan the vault for documents (.gitignore aware), sorted by path.
    ///
    /// Only the vault's own `.gitignore` files apply, with or without a git
    /// repository, so that [`is_candidate_document`] can answer the same
    /// question for a single path.
    pub fn scan(&self) -> Vec<PathBuf> {
        let mut files = Vec::new();

        let root = self.root.clone();
        let mut builder = WalkBuilder::new(&self.root);
        builder
            .hidden(true)
            .parents(false)
            .ignore(false)
            .git_ignore(true)
            .git_global(false)
            .git_exclude(false)
            .require_git(false);
        builder.filter_entry(move |entry| !is_ignored_scope(entry.path(), &root));

        for result in builder.build() {
            match result {
                Ok(entry) => {
                    let Some(file_type) = entry.file_type() else {
                        continue;
                    };
                    if !file_type.is_file() {
                        continue;
                    }

                    let path = entry.path();
                    if !is_document_file(path) {
                        continue;
                    }

                    if exceeds_size_cap(path) {
                        continue;
                    }

                    files.push(path.to_path_buf());
                }
                Err(e) => log::warn!("Failed to read entry: {e}"),
            }
        }

        files.sort();
        log::debug!("Found {} documents", files.len());
        files
    }
}

/// Whether `path` names a markdown document
pub fn is_document_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("md"))
}

/// Vault-relative path with `/` separators, or `None` outside the vault
pub fn relative_document_path(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let mut parts = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(name) => parts.push(name.to_string_lossy().into_owned()),
            Component::CurDir => {}
            _ => return None,
        }
    }
    (!parts.is_empty()).then(|| parts.join("/"))
}

/// Whether `path` would be listed by [`VaultScanner::scan`] if it exists:
/// a markdown file outside hidden entries, ignored scopes and `.gitignore`
/// rules of the vault. File size is not considered.
pub fn is_candidate_document(root: &Path, path: &Path) -> bool {
    if !is_document_file(path) || is_ignored_scope(path, root) {
        return false;
    }
    let Ok(relative) = path.strip_prefix(root) else {
        return false;
    };

    let components: Vec<&std::ffi::OsStr> = relative
        .components()
        .map(|component| match component {
            Component::Normal(name) => Some(name),
            _ => None,
        })
        .collect::<Option<_>>()
        .unwrap_or_default();
    if components.is_empty()
        || components
            .iter()
            .any(|name| name.to_string_lossy().starts_with('.'))
    {
        return false;
    }

    let mut matchers: Vec<Gitignore> = load_gitignore(root).into_iter().collect();
    let mut current = root.to_path_buf();
    for (idx, name) in components.iter().enumerate() {
        current.push(name);
        let is_dir = idx + 1 < components.len();
        if is_gitignored(&matchers, &current, is_dir) {
            return false;
        }
        if is_dir {
            matchers.extend(load_gitignore(&current));
        }
    }
    true
}

/// [`is_candidate_document`] plus the size cap applied by the scanner.
pub fn is_indexable_document(root: &Path, path: &Path) -> bool {
    is_candidate_document(root, path) && !exceeds_size_cap(path)
}

fn exceeds_size_cap(path: &Path) -> bool {
    let Ok(meta) = std::fs::metadata(path) else {
        return false;
    };
    if meta.len() <= MAX_FILE_SIZE_BYTES {
        return false;
    }
    log::debug!(
        "Skipping large document {} ({} bytes > {})",
        path.display(),
        meta.len(),
        MAX_FILE_SIZE_BYTES
    );
    true
}

fn load_gitignore(dir: &Path) -> Option<Gitignore> {
    let file = dir.join(".gitignore");
    if !file.is_file() {
        return None;
    }
    let mut builder = GitignoreBuilder::new(dir);
    if let Some(err) = builder.add(&file) {
        log::debug!("Partially invalid {}: {err}", file.display());
    }
    builder.build().ok()
}

/// Nearest `.gitignore` with an opinion wins.
fn is_gitignored(matchers: &[Gitignore], path: &Path, is_dir: bool) -> bool {
    for matcher in matchers.iter().rev() {
        let matched = matcher.matched(path, is_dir);
        if matched.is_ignore() {
            return true;
        }
        if matched.is_whitelist() {
            return false;
        }
    }
    false
}

pub(crate) fn is_ignored_scope(path: &Path, root: &Path) -> bool {
    if let Ok(relative) = path.strip_prefix(root) {
        for component in relative.components() {
            if let Component::Normal(name) = component {
                let lowered = name.to_string_lossy().to_lowercase();
                if IGNORED_SCOPES.iter().any(|ignored| ignored == &lowered) {
                    return true;
                }
            }
        }
    }
    false
}

const IGNORED_SCOPES: &[&str] = &[
    ".git",
    ".obsidian",
    ".trash",
    "node_modules",
];

const MAX_FILE_SIZE_BYTES: u64 = 4 * 1024 * 1024;
