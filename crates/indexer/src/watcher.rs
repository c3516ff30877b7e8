use crate::scanner::{is_candidate_document, relative_document_path};
use crate::{IndexerError, Result};
use fieldsuggest_protocol::DocumentEvent;
use log::{debug, warn};
use notify::event::{ModifyKind, RenameMode};
use notify::{Config as NotifyConfig, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;

const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// Filesystem watcher that reports vault changes as document events.
pub struct VaultWatcher {
    root: PathBuf,
    events: mpsc::Receiver<notify::Result<Event>>,
    _watcher: RecommendedWatcher,
}

impl VaultWatcher {
    /// Starts watching `root` recursively.
    pub fn start(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        if !root.is_dir() {
            return Err(IndexerError::InvalidPath(root.display().to_string()));
        }
        let root = root.canonicalize()?;

        let (sender, events) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let mut watcher = RecommendedWatcher::new(
            move |res| {
                let _ = sender.blocking_send(res);
            },
            NotifyConfig::default(),
        )
        .map_err(|e| IndexerError::Other(format!("watcher init failed: {e}")))?;
        watcher
            .watch(&root, RecursiveMode::Recursive)
            .map_err(|e| IndexerError::Other(format!("failed to watch {}: {e}", root.display())))?;

        debug!("Watching {}", root.display());
        Ok(Self {
            root,
            events,
            _watcher: watcher,
        })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Waits for the next filesystem change that touches documents.
    ///
    /// Returns `None` once the underlying watcher has shut down.
    pub async fn next_events(&mut self) -> Option<Vec<DocumentEvent>> {
        loop {
            match self.events.recv().await? {
                Ok(event) => {
                    let translated = translate_event(&self.root, &event);
                    if !translated.is_empty() {
                        return Some(translated);
                    }
                }
                Err(err) => warn!("Watcher error: {err}"),
            }
        }
    }
}

/// Maps one raw notify event onto document events for paths inside `root`.
pub fn translate_event(root: &Path, event: &Event) -> Vec<DocumentEvent> {
    let mut out = Vec::new();
    match event.kind {
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) if event.paths.len() == 2 => {
            let old_path = document_path(root, &event.paths[0]);
            let path = document_path(root, &event.paths[1]);
            match (old_path, path) {
                (Some(old_path), Some(path)) => out.push(DocumentEvent::Rename { old_path, path }),
                (None, Some(path)) => out.push(DocumentEvent::Update { path }),
                (Some(path), None) => out.push(DocumentEvent::Delete { path }),
                (None, None) => {}
            }
        }
        EventKind::Modify(ModifyKind::Name(RenameMode::From)) | EventKind::Remove(_) => {
            out.extend(
                event
                    .paths
                    .iter()
                    .filter_map(|p| document_path(root, p))
                    .map(|path| DocumentEvent::Delete { path }),
            );
        }
        EventKind::Modify(ModifyKind::Name(_)) => {
            for raw in &event.paths {
                let Some(path) = document_path(root, raw) else {
                    continue;
                };
                if raw.exists() {
                    out.push(DocumentEvent::Update { path });
                } else {
                    out.push(DocumentEvent::Delete { path });
                }
            }
        }
        EventKind::Create(_) | EventKind::Modify(_) => {
            out.extend(
                event
                    .paths
                    .iter()
                    .filter_map(|p| document_path(root, p))
                    .map(|path| DocumentEvent::Update { path }),
            );
        }
        EventKind::Access(_) | EventKind::Any | EventKind::Other => {}
    }
    out.dedup();
    out
}

fn document_path(root: &Path, path: &Path) -> Option<String> {
    if !is_candidate_document(root, path) {
        return None;
    }
    relative_document_path(root, path)
}
