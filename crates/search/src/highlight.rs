use fieldsuggest_protocol::CompositeValue;
use serde::{Deserialize, Serialize};
use std::ops::Range;

const MARK_OPEN: &str = "<mark>";
const MARK_CLOSE: &str = "</mark>";

/// One ranked completion candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub value: CompositeValue,

    /// Matcher score; `0` when no query was given.
    pub score: u32,

    /// Matched character ranges, sorted and non-overlapping.
    pub highlights: Vec<Range<usize>>,
}

impl Suggestion {
    pub fn new(value: CompositeValue, score: u32, highlights: Vec<Range<usize>>) -> Self {
        Self {
            value,
            score,
            highlights,
        }
    }

    pub fn unranked(value: CompositeValue) -> Self {
        Self::new(value, 0, Vec::new())
    }

    /// The value with every highlighted range wrapped in `<mark>` tags.
    pub fn marked(&self) -> String {
        let mut out = String::with_capacity(self.value.as_str().len());
        let mut ranges = self.highlights.iter().peekable();
        let mut open = false;
        for (idx, ch) in self.value.as_str().chars().enumerate() {
            if open && ranges.peek().is_some_and(|r| r.end == idx) {
                out.push_str(MARK_CLOSE);
                open = false;
                ranges.next();
            }
            if !open && ranges.peek().is_some_and(|r| r.start == idx && r.end > idx) {
                out.push_str(MARK_OPEN);
                open = true;
            }
            out.push(ch);
        }
        if open {
            out.push_str(MARK_CLOSE);
        }
        out
    }
}

/// Collapses matched character indices into contiguous ranges.
pub fn ranges_from_indices(indices: &[u32]) -> Vec<Range<usize>> {
    let mut sorted: Vec<usize> = indices.iter().map(|&i| i as usize).collect();
    sorted.sort_unstable();
    sorted.dedup();

    let mut ranges: Vec<Range<usize>> = Vec::new();
    for idx in sorted {
        match ranges.last_mut() {
            Some(last) if last.end == idx => last.end = idx + 1,
            _ => ranges.push(idx..idx + 1),
        }
    }
    ranges
}
