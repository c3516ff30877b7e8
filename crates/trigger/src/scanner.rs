use fieldsuggest_protocol::TriggerSpan;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Delimiter {
    Paren,
    Square,
}

impl Delimiter {
    fn opening(ch: char) -> Option<Self> {
        match ch {
            '(' => Some(Self::Paren),
            '[' => Some(Self::Square),
            _ => None,
        }
    }

    fn close(self) -> char {
        match self {
            Self::Paren => ')',
            Self::Square => ']',
        }
    }
}

/// Left-to-right iterator over the non-overlapping trigger spans of a line.
///
/// Scanning resumes after the closing delimiter of every span it yields, so
/// an opening delimiter inside an earlier span never starts a new one.
pub struct SpanScanner {
    chars: Vec<char>,
    pos: usize,
}

impl SpanScanner {
    pub fn new(line: &str) -> Self {
        Self {
            chars: line.chars().collect(),
            pos: 0,
        }
    }

    fn at(&self, idx: usize) -> Option<char> {
        self.chars.get(idx).copied()
    }

    fn before(&self, idx: usize) -> Option<char> {
        idx.checked_sub(1).and_then(|prev| self.at(prev))
    }

    fn is_boundary_after(&self, idx: usize) -> bool {
        self.at(idx + 1).map_or(true, char::is_whitespace)
    }

    /// `()` or `[]` with the cursor slot between the delimiters.
    fn empty_span(&self, open: usize, delim: Delimiter) -> Option<TriggerSpan> {
        if self.at(open + 1) != Some(delim.close()) {
            return None;
        }
        match delim {
            // second `[` of a `[[` wiki link
            Delimiter::Square if self.before(open) == Some('[') => return None,
            // empty url part of `[text]()`
            Delimiter::Paren if self.before(open) == Some(']') => return None,
            _ => {}
        }
        if matches!(self.at(open + 2), Some(']' | '(')) {
            return None;
        }
        Some(TriggerSpan::new(String::new(), open + 1, open + 1))
    }

    /// Shortest non-empty run up to a closing delimiter at a word boundary.
    ///
    /// Returns the span together with the index of its closing delimiter.
    fn filled_span(&self, open: usize, delim: Delimiter) -> Option<(TriggerSpan, usize)> {
        if !self.before(open).map_or(true, char::is_whitespace) {
            return None;
        }
        if delim == Delimiter::Square && self.at(open + 1) == Some('[') {
            return None;
        }

        let close = (open + 2..self.chars.len())
            .find(|&idx| self.chars[idx] == delim.close() && self.is_boundary_after(idx))?;
        let query: String = self.chars[open + 1..close].iter().collect();
        Some((TriggerSpan::new(query, open + 1, close), close))
    }

    /// Index of the last character of the `[text](url)` link opened at
    /// `open`. An unterminated url part runs to the end of the line.
    fn markdown_link_end(&self, open: usize) -> Option<usize> {
        let text_close = self.balanced_close(open, Delimiter::Square)?;
        if self.at(text_close + 1) != Some('(') {
            return None;
        }
        let url_end = self
            .balanced_close(text_close + 1, Delimiter::Paren)
            .unwrap_or(self.chars.len() - 1);
        Some(url_end)
    }

    fn balanced_close(&self, open: usize, delim: Delimiter) -> Option<usize> {
        let open_char = self.chars[open];
        let mut depth = 0usize;
        for idx in open + 1..self.chars.len() {
            let ch = self.chars[idx];
            if ch == open_char {
                depth += 1;
            } else if ch == delim.close() {
                if depth == 0 {
                    return Some(idx);
                }
                depth -= 1;
            }
        }
        None
    }
}

impl Iterator for SpanScanner {
    type Item = TriggerSpan;

    fn next(&mut self) -> Option<TriggerSpan> {
        while self.pos < self.chars.len() {
            let open = self.pos;
            let Some(delim) = Delimiter::opening(self.chars[open]) else {
                self.pos += 1;
                continue;
            };

            // nothing inside a markdown link triggers
            if delim == Delimiter::Square {
                if let Some(end) = self.markdown_link_end(open) {
                    self.pos = end + 1;
                    continue;
                }
            }

            if let Some(span) = self.empty_span(open, delim) {
                self.pos = open + 2;
                return Some(span);
            }
            if let Some((span, close)) = self.filled_span(open, delim) {
                self.pos = close + 1;
                return Some(span);
            }
            self.pos += 1;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scanner_resumes_after_each_span() {
        let mut scanner = SpanScanner::new("(a) (b)");
        assert_eq!(scanner.next(), Some(TriggerSpan::new("a", 1, 2)));
        assert_eq!(scanner.next(), Some(TriggerSpan::new("b", 5, 6)));
        assert_eq!(scanner.next(), None);
    }

    #[test]
    fn inner_openers_are_consumed_by_outer_span() {
        let found: Vec<_> = SpanScanner::new("(x [y] z)").collect();
        assert_eq!(found, vec![TriggerSpan::new("x [y] z", 1, 8)]);
    }

    #[test]
    fn markdown_link_detection_balances_nested_brackets() {
        let scanner = SpanScanner::new("[a [b] c](url)");
        assert!(scanner.markdown_link_end(0).is_some());
        let scanner = SpanScanner::new("[a [b](url) c]");
        assert!(scanner.markdown_link_end(0).is_none());
    }

    #[test]
    fn markdown_link_end_covers_the_url_part() {
        let scanner = SpanScanner::new("[a](b (c) d) tail");
        assert_eq!(scanner.markdown_link_end(0), Some(11));
        let scanner = SpanScanner::new("[a](unfinished (x");
        assert_eq!(scanner.markdown_link_end(0), Some(16));
    }

    #[test]
    fn unterminated_spans_yield_nothing() {
        assert_eq!(SpanScanner::new("(open and never closed").count(), 0);
        assert_eq!(SpanScanner::new("[").count(), 0);
        assert_eq!(SpanScanner::new("").count(), 0);
    }
}
