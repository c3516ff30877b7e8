use fieldsuggest_indexer::{
    DefaultStringifier, Extractor, FieldSource, FilterPolicy, IndexStats, Result, Settings,
    SuggestionIndex, ValueStringifier,
};
use fieldsuggest_protocol::{DocumentEvent, TriggerSpan};
use fieldsuggest_search::{Suggestion, SuggestionMatcher};
use log::{debug, info};
use serde::Serialize;

/// Span under the cursor and the values ranked against its query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuggestionContext {
    pub span: TriggerSpan,
    pub suggestions: Vec<Suggestion>,
}

/// Owns the suggestion index for one corpus and answers completion requests.
pub struct SuggestSession<F: FieldSource> {
    source: F,
    settings: Settings,
    policy: FilterPolicy,
    stringifier: Box<dyn ValueStringifier + Send + Sync>,
    index: SuggestionIndex,
    matcher: SuggestionMatcher,
    last_build: Option<IndexStats>,
}

impl<F: FieldSource> SuggestSession<F> {
    pub fn new(source: F, settings: Settings) -> Result<Self> {
        let policy = settings.compile()?;
        let matcher = SuggestionMatcher::new(settings.max_suggestions);
        Ok(Self {
            source,
            settings,
            policy,
            stringifier: Box::new(DefaultStringifier),
            index: SuggestionIndex::new(),
            matcher,
            last_build: None,
        })
    }

    #[must_use]
    pub fn with_stringifier(
        mut self,
        stringifier: impl ValueStringifier + Send + Sync + 'static,
    ) -> Self {
        self.stringifier = Box::new(stringifier);
        self
    }

    /// Builds the index from scratch; events are accepted from here on.
    pub fn initialize(&mut self) -> IndexStats {
        self.rebuild()
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.last_build.is_some()
    }

    pub fn handle_event(&mut self, event: DocumentEvent) {
        if !self.is_ready() {
            debug!("Index not built yet, ignoring {event:?}");
            return;
        }

        let extractor = Extractor::new(&self.policy, self.stringifier.as_ref());
        match &event {
            DocumentEvent::Update { path } => match self.source.fields(path) {
                Some(fields) => self.index.apply_update(path, &fields, &extractor),
                None => {
                    debug!("No fields for {path}, dropping its entry");
                    self.index.apply_delete(path);
                }
            },
            DocumentEvent::Rename { old_path, path } => {
                let source = &self.source;
                self.index
                    .apply_rename(old_path, path, || source.fields(path), &extractor);
            }
            DocumentEvent::Delete { path } => self.index.apply_delete(path),
        }
        debug!(
            "Applied {event:?}: {} unique values across {} documents",
            self.index.len(),
            self.index.document_count()
        );
    }

    /// Entry point for hosts that report changes as `(kind, path, old_path)`.
    pub fn handle_raw_event(&mut self, kind: &str, path: &str, old_path: Option<&str>) {
        match DocumentEvent::parse(kind, path, old_path.map(str::to_string)) {
            Ok(event) => self.handle_event(event),
            Err(err) => debug!("Ignoring document event: {err}"),
        }
    }

    /// Swaps in new settings. A change to either pattern list rebuilds the
    /// index; invalid patterns leave the session untouched.
    pub fn update_settings(&mut self, settings: Settings) -> Result<()> {
        let policy = settings.compile()?;
        let rebuild = self.settings.filters_differ(&settings);

        self.matcher.set_max_suggestions(settings.max_suggestions);
        self.policy = policy;
        self.settings = settings;

        if rebuild && self.is_ready() {
            info!("Filter patterns changed, rebuilding suggestion index");
            self.rebuild();
        }
        Ok(())
    }

    /// Ranked suggestions for the span under `cursor`, if any.
    pub fn suggest(&mut self, line: &str, cursor: usize) -> Option<SuggestionContext> {
        let span = fieldsuggest_trigger::resolve(line, cursor)?;
        let suggestions = self.matcher.suggest(&span.query, self.index.values());
        Some(SuggestionContext { span, suggestions })
    }

    #[must_use]
    pub fn index(&self) -> &SuggestionIndex {
        &self.index
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    #[must_use]
    pub fn source(&self) -> &F {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut F {
        &mut self.source
    }

    /// Statistics of the most recent full build.
    #[must_use]
    pub fn last_build(&self) -> Option<&IndexStats> {
        self.last_build.as_ref()
    }

    fn rebuild(&mut self) -> IndexStats {
        let extractor = Extractor::new(&self.policy, self.stringifier.as_ref());
        let stats = self.index.build_full(&self.source, &extractor);
        self.last_build = Some(stats.clone());
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldsuggest_indexer::MemorySource;
    use fieldsuggest_protocol::{DocumentFields, FieldValue};
    use pretty_assertions::assert_eq;

    fn doc(pairs: &[(&str, &str)]) -> DocumentFields {
        pairs.iter().map(|(k, v)| (*k, *v)).collect()
    }

    fn session() -> SuggestSession<MemorySource> {
        let source = MemorySource::new()
            .with("a.md", doc(&[("status", "open"), ("owner", "ann")]))
            .with("templates/t.md", doc(&[("status", "template")]))
            .with("b.md", doc(&[("status", "done")]));
        let settings = Settings {
            ignored_files: vec!["^templates/".to_string()],
            ..Settings::default()
        };
        SuggestSession::new(source, settings).unwrap()
    }

    fn values(session: &SuggestSession<MemorySource>) -> Vec<&str> {
        session.index().values().iter().map(|v| v.as_str()).collect()
    }

    #[test]
    fn events_before_initialize_are_ignored() {
        let mut session = session();
        session.source_mut().insert("c.md", doc(&[("k", "v")]));
        session.handle_event(DocumentEvent::Update {
            path: "c.md".to_string(),
        });
        assert!(!session.is_ready());
        assert!(session.index().is_empty());

        let stats = session.initialize();
        assert_eq!(stats.documents_indexed, 3);
        assert_eq!(stats.documents_ignored, 1);
        assert_eq!(
            values(&session),
            vec!["status:: open", "owner:: ann", "status:: done", "k:: v"]
        );
    }

    #[test]
    fn suggests_inside_trigger_spans() {
        let mut session = session();
        session.initialize();

        let context = session.suggest("met (own) today", 6).unwrap();
        assert_eq!(context.span, TriggerSpan::new("own", 5, 8));
        let names: Vec<_> = context.suggestions.iter().map(|s| s.value.as_str()).collect();
        assert_eq!(names, vec!["owner:: ann"]);

        let context = session.suggest("()", 1).unwrap();
        assert_eq!(context.suggestions.len(), 3);

        assert!(session.suggest("no span here", 3).is_none());
    }

    #[test]
    fn raw_events_are_dispatched() {
        let mut session = session();
        session.initialize();

        session
            .source_mut()
            .insert("b.md", doc(&[("status", "blocked")]));
        session.handle_raw_event("update", "b.md", None);
        session.source_mut().rename("a.md", "archive/a.md");
        session.handle_raw_event("rename", "archive/a.md", Some("a.md"));
        session.handle_raw_event("explode", "a.md", None);
        session.handle_raw_event("rename", "x.md", None);

        assert_eq!(
            values(&session),
            vec!["status:: open", "owner:: ann", "status:: blocked"]
        );
        assert!(session.index().contributed("archive/a.md").is_some());

        session.source_mut().remove("archive/a.md");
        session.handle_raw_event("delete", "archive/a.md", None);
        assert_eq!(values(&session), vec!["status:: blocked"]);
        assert!(session.index().is_consistent());
    }

    #[test]
    fn update_for_vanished_document_drops_its_values() {
        let mut session = session();
        session.initialize();

        session.source_mut().remove("b.md");
        session.handle_event(DocumentEvent::Update {
            path: "b.md".to_string(),
        });
        assert_eq!(values(&session), vec!["status:: open", "owner:: ann"]);
        assert!(session.index().contributed("b.md").is_none());
        assert!(session.index().is_consistent());
    }

    #[test]
    fn updates_to_excluded_vault_documents_match_a_rebuild() {
        use fieldsuggest_indexer::MarkdownVault;
        use std::fs;

        let temp = tempfile::TempDir::new().unwrap();
        let root = temp.path();
        fs::write(root.join(".gitignore"), "private.md\n").unwrap();
        fs::write(root.join("a.md"), "status:: open\n").unwrap();

        let vault = MarkdownVault::open(root).unwrap();
        let mut session = SuggestSession::new(vault, Settings::default()).unwrap();
        session.initialize();

        fs::create_dir_all(root.join(".drafts")).unwrap();
        fs::write(root.join(".drafts/x.md"), "status:: hidden\n").unwrap();
        fs::write(root.join("private.md"), "status:: private\n").unwrap();
        for path in [".drafts/x.md", "private.md"] {
            session.handle_event(DocumentEvent::Update {
                path: path.to_string(),
            });
        }

        let incremental: Vec<String> = session
            .index()
            .values()
            .iter()
            .map(|v| v.as_str().to_string())
            .collect();
        session.initialize();
        let rebuilt: Vec<String> = session
            .index()
            .values()
            .iter()
            .map(|v| v.as_str().to_string())
            .collect();
        assert_eq!(incremental, vec!["status:: open".to_string()]);
        assert_eq!(incremental, rebuilt);
    }

    #[test]
    fn changed_patterns_rebuild_the_index() {
        let mut session = session();
        session.initialize();

        session
            .update_settings(Settings {
                ignored_fields: vec!["owner".to_string()],
                ..Settings::default()
            })
            .unwrap();
        assert_eq!(
            values(&session),
            vec!["status:: open", "status:: template", "status:: done"]
        );
    }

    #[test]
    fn limit_only_change_keeps_the_index() {
        let mut session = session();
        session.initialize();
        let before = session.last_build().cloned();

        let mut settings = session.settings().clone();
        settings.max_suggestions = 1;
        session.update_settings(settings).unwrap();

        assert_eq!(session.last_build().cloned(), before);
        assert_eq!(session.suggest("()", 1).unwrap().suggestions.len(), 1);
    }

    #[test]
    fn invalid_patterns_keep_previous_settings() {
        let mut session = session();
        session.initialize();
        let result = session.update_settings(Settings {
            ignored_fields: vec!["(".to_string()],
            ..Settings::default()
        });
        assert!(result.is_err());
        assert_eq!(session.settings().ignored_files, vec!["^templates/".to_string()]);
        assert_eq!(values(&session).len(), 3);
    }

    struct Shouting;

    impl ValueStringifier for Shouting {
        fn stringify(&self, value: &FieldValue) -> String {
            DefaultStringifier.stringify(value).to_uppercase()
        }
    }

    #[test]
    fn custom_stringifier_formats_non_text_values() {
        let tags = FieldValue::List(vec![
            FieldValue::text("x"),
            FieldValue::List(vec![FieldValue::text("y")]),
        ]);
        let source = MemorySource::new().with("a.md", DocumentFields::new().with("tags", tags));
        let mut session = SuggestSession::new(source, Settings::default())
            .unwrap()
            .with_stringifier(Shouting);
        session.initialize();
        assert_eq!(values(&session), vec!["tags:: x", "tags:: Y"]);
    }
}
