//! Sub-grammars shared by the Classic and Attribute dialects.
//!
//! Topic lists and matcher tokens read the same whether they arrive inside a
//! Classic key string or as a discrete attribute value. Both functions take a
//! [`Fragment`] plus the original source string, so faults found here report
//! absolute locations.

use super::error::{EntryField, ParseError};
use super::scan::{Fragment, ScanFault, snippet};
use crate::model::{KeywordDef, KeywordMode, MatcherDef, RelationDef, RelationMode};

/// `&`-separated topic list. Every item is trimmed and must be non-empty;
/// an empty fragment yields an empty list.
pub(crate) fn parse_topic_list(frag: Fragment<'_>, source: &str) -> Result<Vec<String>, ParseError> {
    let body = frag.trim();
    if body.is_empty() {
        return Ok(Vec::new());
    }
    let mut topics = Vec::new();
    for item in body.split_list('&') {
        let topic = item.trim();
        if topic.is_empty() {
            let fault = ScanFault::new(item.start(), "".to_string(), "topic");
            return Err(ParseError::from_fault(EntryField::Topics, source, fault));
        }
        topics.push(topic.as_str().to_string());
    }
    Ok(topics)
}

/// `;`-separated matcher list. A dangling separator before the close of the
/// group is tolerated; empty tokens anywhere else are errors.
pub(crate) fn parse_matcher_list(frag: Fragment<'_>, source: &str) -> Result<Vec<MatcherDef>, ParseError> {
    let body = frag.trim();
    if body.is_empty() {
        return Ok(Vec::new());
    }
    let items = body.split_list(';');
    let last = items.len() - 1;
    let mut matchers = Vec::new();
    for (idx, item) in items.into_iter().enumerate() {
        if item.trim().is_empty() {
            if idx == last {
                continue;
            }
            let fault = ScanFault::new(item.start(), "".to_string(), "matcher token");
            return Err(ParseError::from_fault(EntryField::Keywords, source, fault));
        }
        matchers.push(parse_matcher_token(item, source)?);
    }
    Ok(matchers)
}

/// One matcher token.
///
/// A token is a relation only when it starts with a relation sigil (`:` `?`
/// `@` `!`); otherwise it is a keyword with an optional polarity sigil (`+`
/// `-`) and either a quoted exact-match literal or a bare trimmed phrase.
pub(crate) fn parse_matcher_token(frag: Fragment<'_>, source: &str) -> Result<MatcherDef, ParseError> {
    let token = frag.trim();
    let Some(first) = token.first_char() else {
        let fault = ScanFault::new(token.start(), "".to_string(), "matcher token");
        return Err(ParseError::from_fault(EntryField::Keywords, source, fault));
    };

    if let Some(mode) = RelationMode::from_sigil(first) {
        let topic = parse_relation_topic(token.skip_first(), source)?;
        return Ok(MatcherDef::Relation(RelationDef::new(mode, topic)));
    }

    let (mode, value_part) = match KeywordMode::from_sigil(first) {
        Some(mode) => (mode, token.skip_first()),
        None => (KeywordMode::Include, token),
    };
    let (exact, value) = parse_keyword_value(value_part, source)?;
    Ok(MatcherDef::Keyword(KeywordDef { mode, exact, value }))
}

/// Relation topic after the sigil: a bare trimmed phrase, or a quoted one.
pub(crate) fn parse_relation_topic(frag: Fragment<'_>, source: &str) -> Result<String, ParseError> {
    let body = frag.trim();
    match body.take_quoted().map_err(|fault| ParseError::from_fault(EntryField::Relations, source, fault))? {
        Some(iso) => {
            if iso.inner.is_empty() {
                let fault = ScanFault::new(iso.inner.start(), "".to_string(), "relation topic");
                return Err(ParseError::from_fault(EntryField::Relations, source, fault));
            }
            expect_exhausted(iso.rest, source, EntryField::Relations)?;
            Ok(iso.inner.as_str().to_string())
        }
        None => {
            if body.is_empty() {
                let fault = ScanFault::new(body.start(), "".to_string(), "relation topic");
                return Err(ParseError::from_fault(EntryField::Relations, source, fault));
            }
            Ok(body.as_str().to_string())
        }
    }
}

/// Keyword value after the polarity sigil: `(exact, value)`.
fn parse_keyword_value(frag: Fragment<'_>, source: &str) -> Result<(bool, String), ParseError> {
    let body = frag.trim();
    match body.take_quoted().map_err(|fault| ParseError::from_fault(EntryField::Keywords, source, fault))? {
        Some(iso) => {
            if iso.inner.is_empty() {
                let fault = ScanFault::new(iso.inner.start(), "".to_string(), "keyword literal");
                return Err(ParseError::from_fault(EntryField::Keywords, source, fault));
            }
            expect_exhausted(iso.rest, source, EntryField::Keywords)?;
            Ok((true, iso.inner.as_str().to_string()))
        }
        None => {
            if body.is_empty() {
                let fault = ScanFault::new(body.start(), "".to_string(), "keyword phrase");
                return Err(ParseError::from_fault(EntryField::Keywords, source, fault));
            }
            Ok((false, body.as_str().to_string()))
        }
    }
}

/// Require nothing but whitespace to remain in `rest`.
pub(crate) fn expect_exhausted(rest: Fragment<'_>, source: &str, field: EntryField) -> Result<(), ParseError> {
    let tail = rest.trim();
    if tail.is_empty() {
        return Ok(());
    }
    let fault = ScanFault::new(tail.start(), snippet(tail.as_str()), "end of token");
    Err(ParseError::from_fault(field, source, fault))
}
