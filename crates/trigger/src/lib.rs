//! # Trigger span resolution
//!
//! Decides whether the cursor sits inside a `( ... )` or `[ ... ]` span on the
//! current line and, if so, which text the user is typing there.
//!
//! ```text
//! test (person:: Bo|) testing      cursor after "Bo"
//!       └──────────┘               span: "person:: Bo", 6..17
//! ```
//!
//! Markdown links (`[text](url)`) and wiki links (`[[note]]`) never trigger.
//! All offsets are character offsets into the line.
//!
//! ## Example
//!
//! ```
//! use fieldsuggest_trigger::resolve;
//!
//! let span = resolve("test (capture) testing", 6).expect("span");
//! assert_eq!(span.query, "capture");
//! assert_eq!((span.start, span.end), (6, 13));
//! assert!(resolve("[test](https://example.com)", 3).is_none());
//! ```

mod scanner;

pub use fieldsuggest_protocol::TriggerSpan;
pub use scanner::SpanScanner;

/// Returns the span containing `cursor`, if any.
///
/// Spans are visited left to right and the first one whose captured text
/// range `[start, end]` contains the cursor wins.
#[must_use]
pub fn resolve(line: &str, cursor: usize) -> Option<TriggerSpan> {
    SpanScanner::new(line).find(|span| span.contains(cursor))
}

/// Every candidate span on the line, regardless of cursor position.
#[must_use]
pub fn spans(line: &str) -> Vec<TriggerSpan> {
    SpanScanner::new(line).collect()
}

/// Replaces the captured text of `span` with `value`.
///
/// Offsets past the end of the line are clamped to the line end.
#[must_use]
pub fn apply_completion(line: &str, span: &TriggerSpan, value: &str) -> String {
    let start = byte_offset(line, span.start);
    let end = byte_offset(line, span.end.max(span.start));

    let mut out = String::with_capacity(line.len() - (end - start) + value.len());
    out.push_str(&line[..start]);
    out.push_str(value);
    out.push_str(&line[end..]);
    out
}

fn byte_offset(line: &str, char_offset: usize) -> usize {
    line.char_indices()
        .nth(char_offset)
        .map_or(line.len(), |(idx, _)| idx)
}
