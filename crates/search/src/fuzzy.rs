use crate::highlight::{ranges_from_indices, Suggestion};
use fieldsuggest_protocol::CompositeValue;
use nucleo_matcher::pattern::{CaseMatching, Normalization, Pattern};
use nucleo_matcher::{Matcher, Utf32String};

/// Fuzzy ranking of composite values using nucleo-matcher
pub struct SuggestionMatcher {
    matcher: Matcher,
    max_suggestions: usize,
}

impl SuggestionMatcher {
    pub fn new(max_suggestions: usize) -> Self {
        Self {
            matcher: Matcher::new(nucleo_matcher::Config::DEFAULT),
            max_suggestions,
        }
    }

    pub fn set_max_suggestions(&mut self, max_suggestions: usize) {
        self.max_suggestions = max_suggestions;
    }

    /// Ranks `values` against `query`.
    ///
    /// A blank query yields the first values in index order. Otherwise
    /// matches are sorted by score descending, ties keep index order.
    pub fn suggest(&mut self, query: &str, values: &[CompositeValue]) -> Vec<Suggestion> {
        if query.trim().is_empty() {
            return values
                .iter()
                .take(self.max_suggestions)
                .cloned()
                .map(Suggestion::unranked)
                .collect();
        }

        let pattern = Pattern::parse(query, CaseMatching::Smart, Normalization::Smart);
        let mut indices = Vec::new();
        let mut scored: Vec<Suggestion> = values
            .iter()
            .filter_map(|value| {
                indices.clear();
                let haystack = Utf32String::from(value.as_str());
                let score = pattern.indices(haystack.slice(..), &mut self.matcher, &mut indices)?;
                Some(Suggestion::new(
                    value.clone(),
                    score,
                    ranges_from_indices(&indices),
                ))
            })
            .collect();

        // Stable sort keeps index order among equal scores
        scored.sort_by(|a, b| b.score.cmp(&a.score));
        scored.truncate(self.max_suggestions);

        log::debug!(
            "Query {query:?} matched {} of {} values",
            scored.len(),
            values.len()
        );
        scored
    }
}

impl Default for SuggestionMatcher {
    fn default() -> Self {
        Self::new(10)
    }
}
