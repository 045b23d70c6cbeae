//! Attribute dialect: discrete named fields in the entry's attribute map.
//!
//! Recognized keys are `@type`, `@topics`, `@keywords` and `@relations`;
//! each value is independently grammatical and reuses the Classic
//! sub-grammars (`&`-separated topics, `;`-separated matcher tokens). A key
//! that is absent is no opinion for that field only; a key that is present
//! and malformed is a parse error.

use super::error::{EntryField, ParseError};
use super::scan::{Fragment, ScanFault, snippet};
use super::tokens::{parse_matcher_token, parse_relation_topic, parse_topic_list};
use crate::model::{
    EntryTypeDef, KeywordDef, KeywordMode, MatcherDef, RelationDef, RelationMode, TypeKind,
};

pub(crate) const TYPE_KEY: &str = "@type";
pub(crate) const TOPICS_KEY: &str = "@topics";
pub(crate) const KEYWORDS_KEY: &str = "@keywords";
pub(crate) const RELATIONS_KEY: &str = "@relations";

/// `@type`: a bare word, with the Classic `$` marker tolerated.
pub(crate) fn parse_type(value: &str) -> Result<EntryTypeDef, ParseError> {
    let at = Fragment::new(value).trim();
    match regex!(r"^\$?(\w+)$").captures(at.as_str()) {
        Some(caps) => Ok(EntryTypeDef::new(TypeKind::StateEngine, caps.get(1).unwrap().as_str())),
        None => {
            let fault = ScanFault::new(at.start(), snippet(at.as_str()), "entry type word");
            Err(ParseError::from_fault(EntryField::Type, value, fault))
        }
    }
}

/// `@topics`: an `&`-separated topic list; a blank value is an empty list.
pub(crate) fn parse_topics(value: &str) -> Result<Vec<String>, ParseError> {
    parse_topic_list(Fragment::new(value), value)
}

/// `@keywords`: matcher tokens that must all be keywords.
pub(crate) fn parse_keywords(value: &str) -> Result<Vec<KeywordDef>, ParseError> {
    let mut keywords = Vec::new();
    for item in list_items(value) {
        match parse_matcher_token(item, value)? {
            MatcherDef::Keyword(kw) => keywords.push(kw),
            MatcherDef::Relation(_) => {
                let fault = ScanFault::new(item.trim().start(), snippet(item.trim().as_str()), "keyword matcher");
                return Err(ParseError::from_fault(EntryField::Keywords, value, fault));
            }
        }
    }
    Ok(keywords)
}

/// `@relations`: relation tokens; a token without a sigil defaults to
/// `AllOf`, while keyword polarity sigils are rejected outright.
pub(crate) fn parse_relations(value: &str) -> Result<Vec<RelationDef>, ParseError> {
    let mut relations = Vec::new();
    for item in list_items(value) {
        let token = item.trim();
        let Some(first) = token.first_char() else { continue };
        if let Some(mode) = RelationMode::from_sigil(first) {
            relations.push(RelationDef::new(mode, parse_relation_topic(token.skip_first(), value)?));
        } else if KeywordMode::from_sigil(first).is_some() {
            let fault = ScanFault::new(token.start(), snippet(token.as_str()), "relation sigil or bare topic");
            return Err(ParseError::from_fault(EntryField::Relations, value, fault));
        } else {
            relations.push(RelationDef::new(RelationMode::AllOf, parse_relation_topic(token, value)?));
        }
    }
    Ok(relations)
}

fn list_items(value: &str) -> Vec<Fragment<'_>> {
    let body = Fragment::new(value).trim();
    if body.is_empty() {
        return Vec::new();
    }
    body.split_list(';').into_iter().filter(|item| !item.trim().is_empty()).collect()
}
