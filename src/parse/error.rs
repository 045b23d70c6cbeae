//! Author-facing parse errors.
//!
//! A `ParseError` means a dialect *claimed* the input and found it malformed;
//! it stops the dialect fallback chain immediately and is surfaced to the
//! author with the offending field, the exact location, and the set of
//! tokens that would have been accepted there. Contrast with a dialect
//! simply having no opinion, which is silent fallthrough.

use super::scan::ScanFault;
use thiserror::Error;

/// The authored field a parse error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryField {
    Type,
    Topics,
    Keywords,
    Relations,
}

impl EntryField {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryField::Type => "type",
            EntryField::Topics => "topics",
            EntryField::Keywords => "keywords",
            EntryField::Relations => "relations",
        }
    }
}

impl std::fmt::Display for EntryField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A structural error in an authored entry field.
///
/// `offset` is the absolute byte offset in the string the parse started
/// from; `line`/`column` are 1-based and derived from the same string, so a
/// fault discovered inside a nested sub-parse still points at the right spot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field} (line {line}, column {column}): found {found:?}, expected {}", .expected.join(" | "))]
pub struct ParseError {
    pub field: EntryField,
    pub offset: usize,
    pub line: u32,
    pub column: u32,
    pub found: String,
    pub expected: Vec<&'static str>,
}

impl ParseError {
    /// Attach field and line/column information to a positional fault.
    pub(crate) fn from_fault(field: EntryField, source: &str, fault: ScanFault) -> Self {
        let (line, column) = line_column(source, fault.offset);
        ParseError { field, offset: fault.offset, line, column, found: fault.found, expected: fault.expected }
    }
}

/// 1-based line and column of a byte offset, counting characters per line.
fn line_column(source: &str, offset: usize) -> (u32, u32) {
    let clamped = offset.min(source.len());
    let before = &source[..clamped];
    let line = before.bytes().filter(|&b| b == b'\n').count() as u32 + 1;
    let line_start = before.rfind('\n').map(|idx| idx + 1).unwrap_or(0);
    let column = before[line_start..].chars().count() as u32 + 1;
    (line, column)
}
