//! Grammar primitives.
//!
//! Every dialect grammar in this crate is built from the same three low-level
//! operations over a [`Fragment`] (a slice of the original authored string
//! that remembers its absolute position):
//!
//! - **Bounded look-ahead scan** (`scan_until`): find a stop character within
//!   a bounded number of characters without committing the cursor.
//! - **Delimiter isolation** (`isolate`): cut out the contents of a balanced
//!   `open .. close` pair, respecting double-quoted spans, and hand back the
//!   remainder after the close delimiter.
//! - **Cursor-preserving sub-parsing**: any `Fragment` produced by the above
//!   keeps the absolute byte offset of its first character, so an error found
//!   deep inside a nested sub-grammar still reports its location in the
//!   original string, not relative to the substring.
//!
//! Faults raised here are positional only ([`ScanFault`]); the dialect that
//! invoked the primitive attaches the source field name and converts to a
//! full `ParseError`.

/// A view into the original input that tracks where it came from.
///
/// `start` is the absolute byte offset of `text[0]` in the string the parse
/// began with. Sub-fragments produced by the methods below stay anchored.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Fragment<'a> {
    text: &'a str,
    start: usize,
}

/// A positional fault raised by a primitive, before field attribution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ScanFault {
    /// Absolute byte offset in the original input.
    pub offset: usize,
    /// What was actually found there (short snippet, or "end of input").
    pub found: String,
    /// The tokens that would have been accepted.
    pub expected: Vec<&'static str>,
}

impl ScanFault {
    pub fn new(offset: usize, found: impl Into<String>, expected: &'static str) -> Self {
        ScanFault { offset, found: found.into(), expected: vec![expected] }
    }
}

/// Result of a successful delimiter isolation.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Isolated<'a> {
    /// Contents between the delimiters (exclusive).
    pub inner: Fragment<'a>,
    /// Everything after the close delimiter.
    pub rest: Fragment<'a>,
}

impl<'a> Fragment<'a> {
    pub fn new(text: &'a str) -> Self {
        Fragment { text, start: 0 }
    }

    pub fn as_str(&self) -> &'a str {
        self.text
    }

    /// Absolute byte offset of the first character.
    pub fn start(&self) -> usize {
        self.start
    }

    /// Absolute byte offset one past the last character.
    pub fn end(&self) -> usize {
        self.start + self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Sub-fragment over a local byte range, keeping absolute anchoring.
    fn slice(&self, from: usize, to: usize) -> Fragment<'a> {
        Fragment { text: &self.text[from..to], start: self.start + from }
    }

    /// Trim surrounding whitespace without losing the cursor.
    pub fn trim(&self) -> Fragment<'a> {
        let trimmed = self.text.trim_start();
        let lead = self.text.len() - trimmed.len();
        let trimmed = trimmed.trim_end();
        self.slice(lead, lead + trimmed.len())
    }

    pub fn first_char(&self) -> Option<char> {
        self.text.chars().next()
    }

    /// Fragment with the first character removed; no-op on empty input.
    pub fn skip_first(&self) -> Fragment<'a> {
        let w = self.first_char().map(char::len_utf8).unwrap_or(0);
        self.slice(w, self.text.len())
    }

    /// Bounded look-ahead: the local byte index of the first character for
    /// which `stop` returns true, looking at most `limit` characters ahead.
    ///
    /// Returns `None` when no stop character occurs inside the bound. The
    /// cursor is not advanced; callers decide what to do with the index.
    pub fn scan_until(&self, stop: impl Fn(char) -> bool, limit: usize) -> Option<usize> {
        for (seen, (idx, ch)) in self.text.char_indices().enumerate() {
            if seen >= limit {
                return None;
            }
            if stop(ch) {
                return Some(idx);
            }
        }
        None
    }

    /// Split off the longest leading run of characters accepted by `keep`.
    pub fn take_while(&self, keep: impl Fn(char) -> bool) -> (Fragment<'a>, Fragment<'a>) {
        let split = self.text.char_indices().find(|&(_, ch)| !keep(ch)).map(|(idx, _)| idx).unwrap_or(self.text.len());
        (self.slice(0, split), self.slice(split, self.text.len()))
    }

    /// Delimiter isolation: when the fragment starts (after whitespace) with
    /// `open`, cut out everything up to the matching `close` and return the
    /// inner fragment plus the rest after the close delimiter.
    ///
    /// Double-quoted spans inside the delimiters are opaque: a `close`
    /// character inside quotes does not terminate the isolation. Returns
    /// `Ok(None)` when the fragment does not start with `open` (the caller's
    /// grammar treats the group as absent).
    pub fn isolate(&self, open: char, close: char) -> Result<Option<Isolated<'a>>, ScanFault> {
        let at = self.trim();
        if at.first_char() != Some(open) {
            return Ok(None);
        }
        let body = at.skip_first();
        let mut in_quotes = false;
        for (idx, ch) in body.text.char_indices() {
            match ch {
                '"' => in_quotes = !in_quotes,
                c if c == close && !in_quotes => {
                    let inner = body.slice(0, idx);
                    let rest = body.slice(idx + close.len_utf8(), body.text.len());
                    return Ok(Some(Isolated { inner, rest }));
                }
                _ => {}
            }
        }
        let expected = match close {
            ']' => "closing `]`",
            ')' => "closing `)`",
            '"' => "closing `\"`",
            _ => "closing delimiter",
        };
        Err(ScanFault::new(at.start(), snippet(at.text), expected))
    }

    /// Quote-aware list split on `sep`. Separators inside double quotes are
    /// part of the item. Empty input yields no items.
    pub fn split_list(&self, sep: char) -> Vec<Fragment<'a>> {
        if self.text.is_empty() {
            return Vec::new();
        }
        let mut items = Vec::new();
        let mut item_start = 0usize;
        let mut in_quotes = false;
        for (idx, ch) in self.text.char_indices() {
            match ch {
                '"' => in_quotes = !in_quotes,
                c if c == sep && !in_quotes => {
                    items.push(self.slice(item_start, idx));
                    item_start = idx + sep.len_utf8();
                }
                _ => {}
            }
        }
        items.push(self.slice(item_start, self.text.len()));
        items
    }

    /// When the fragment starts with a double quote, take the quoted literal.
    ///
    /// Returns the inner fragment (between the quotes) and the rest after the
    /// closing quote; `Ok(None)` when the fragment does not start with `"`.
    pub fn take_quoted(&self) -> Result<Option<Isolated<'a>>, ScanFault> {
        let at = self.trim();
        if at.first_char() != Some('"') {
            return Ok(None);
        }
        let body = at.skip_first();
        match body.text.find('"') {
            Some(idx) => {
                Ok(Some(Isolated { inner: body.slice(0, idx), rest: body.slice(idx + 1, body.text.len()) }))
            }
            None => Err(ScanFault::new(at.start(), snippet(at.text), "closing `\"`")),
        }
    }
}

/// Short preview of the text at a fault location, for error messages.
pub(crate) fn snippet(text: &str) -> String {
    if text.is_empty() {
        return "end of input".to_string();
    }
    let cut: String = text.chars().take(12).collect();
    if cut.len() < text.len() { format!("{cut}…") } else { cut }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trim_preserves_absolute_offsets() {
        let frag = Fragment::new("  hello  ");
        let trimmed = frag.trim();
        assert_eq!(trimmed.as_str(), "hello");
        assert_eq!(trimmed.start(), 2);
        assert_eq!(trimmed.end(), 7);
    }

    #[test]
    fn scan_until_respects_limit() {
        let frag = Fragment::new("abcdef;gh");
        assert_eq!(frag.scan_until(|c| c == ';', 10), Some(6));
        assert_eq!(frag.scan_until(|c| c == ';', 6), None);
        assert_eq!(frag.scan_until(|c| c == 'x', 10), None);
    }

    #[test]
    fn isolate_returns_inner_and_rest() {
        let frag = Fragment::new("[Alpha & Beta](rest)");
        let iso = frag.isolate('[', ']').unwrap().unwrap();
        assert_eq!(iso.inner.as_str(), "Alpha & Beta");
        assert_eq!(iso.inner.start(), 1);
        assert_eq!(iso.rest.as_str(), "(rest)");
        assert_eq!(iso.rest.start(), 14);
    }

    #[test]
    fn isolate_is_quote_opaque() {
        let frag = Fragment::new(r#"("a;b)"; c)"#);
        let iso = frag.isolate('(', ')').unwrap().unwrap();
        assert_eq!(iso.inner.as_str(), r#""a;b)"; c"#);
    }

    #[test]
    fn isolate_missing_close_is_a_fault() {
        let frag = Fragment::new("[never closed");
        let fault = frag.isolate('[', ']').unwrap_err();
        assert_eq!(fault.offset, 0);
        assert_eq!(fault.expected, vec!["closing `]`"]);
    }

    #[test]
    fn isolate_absent_group_is_none() {
        let frag = Fragment::new("no brackets here");
        assert!(frag.isolate('[', ']').unwrap().is_none());
    }

    #[test]
    fn split_list_keeps_quoted_separators() {
        let frag = Fragment::new(r#"one; "two; half"; three"#);
        let items: Vec<&str> = frag.split_list(';').iter().map(|f| f.as_str()).collect();
        assert_eq!(items, vec!["one", r#" "two; half""#, " three"]);
    }

    #[test]
    fn split_list_offsets_stay_absolute() {
        let frag = Fragment::new("a&b");
        let items = frag.split_list('&');
        assert_eq!(items[1].as_str(), "b");
        assert_eq!(items[1].start(), 2);
    }

    #[test]
    fn take_quoted_unterminated_is_a_fault() {
        let frag = Fragment::new("\"open ended");
        assert!(frag.take_quoted().is_err());
    }
}
