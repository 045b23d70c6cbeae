//! Classic dialect: the whole entry in one key string.
//!
//! ```text
//! $Npc[Bob & Tavern](bob; +friend; -stranger; :Tavern; ?Bar; @Door; !dead)
//!  ^type ^topics      ^matchers
//! ```
//!
//! The `$` marker is what claims the input for this dialect: a key string
//! without it is silently no opinion, a key string with it that fails any
//! sub-grammar is a hard parse error. Topic and matcher groups are both
//! optional; `[]`/absent means no topics.

use super::error::{EntryField, ParseError};
use super::scan::{Fragment, ScanFault, snippet};
use super::tokens::{parse_matcher_list, parse_topic_list};
use crate::model::{EntryTypeDef, ParsedEntryData, TypeKind};

/// The character that claims a key string for the Classic dialect.
pub(crate) const TYPE_MARKER: char = '$';

/// Parse a raw key string. `None` means the input is not Classic at all;
/// `Some(Err(..))` means it is Classic and malformed.
pub(crate) fn parse(raw: &str) -> Option<Result<ParsedEntryData, ParseError>> {
    let at = Fragment::new(raw).trim();
    if at.first_char() != Some(TYPE_MARKER) {
        return None;
    }
    Some(parse_claimed(raw, at))
}

fn parse_claimed(source: &str, at: Fragment<'_>) -> Result<ParsedEntryData, ParseError> {
    // Type: marker + one-or-more word characters.
    let after_marker = at.skip_first();
    let (word, rest) = after_marker.take_while(|c| c.is_alphanumeric() || c == '_');
    if word.is_empty() {
        let fault = ScanFault::new(after_marker.start(), snippet(after_marker.as_str()), "entry type word");
        return Err(ParseError::from_fault(EntryField::Type, source, fault));
    }
    let type_def = EntryTypeDef::new(TypeKind::StateEngine, word.as_str());

    // Optional `[...]` topic group.
    let (topics, rest) = match rest.isolate('[', ']') {
        Err(fault) => return Err(ParseError::from_fault(EntryField::Topics, source, fault)),
        Ok(Some(iso)) => (parse_topic_list(iso.inner, source)?, iso.rest),
        Ok(None) => (Vec::new(), rest),
    };

    // Optional `(...)` matcher group.
    let (matchers, rest) = match rest.isolate('(', ')') {
        Err(fault) => return Err(ParseError::from_fault(EntryField::Keywords, source, fault)),
        Ok(Some(iso)) => (parse_matcher_list(iso.inner, source)?, iso.rest),
        Ok(None) => (Vec::new(), rest),
    };

    let tail = rest.trim();
    if !tail.is_empty() {
        let fault = ScanFault::new(tail.start(), snippet(tail.as_str()), "end of entry");
        return Err(ParseError::from_fault(EntryField::Keywords, source, fault));
    }

    Ok(ParsedEntryData::from_matchers(type_def, topics, matchers))
}
