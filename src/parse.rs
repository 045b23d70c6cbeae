//! Entry-language parsing.
//!
//! Authors write entries in a small, ambiguous language with three dialects.
//! For every field (type / topics / keywords / relations) the dialects are
//! tried in a fixed priority order:
//!
//! ```text
//! key string ── Classic ──┐ claimed? use it for every field
//!                         │ (malformed ⇒ hard error, chain stops)
//! attributes ── Attribute ┼ per-field: @type/@topics/@keywords/@relations
//!                         │
//! key string ── Field ────┘ fallback: comma-separated keyword list
//! ```
//!
//! A dialect can have *no opinion* (the raw input simply is not written in
//! it), produce a value, or produce a [`ParseError`]. An error means the
//! dialect claimed the input and found it malformed; it stops the chain
//! immediately and is surfaced to the author with field, location and the
//! accepted-token set.
//!
//! ## Memoization
//!
//! The same raw string may be queried several times in one turn - multiple
//! entry kinds probe "is this mine?", and type/topics/keywords/relations are
//! read independently. [`ParseSession`] computes each dialect's parse of a
//! given raw string at most once and reuses the outcome, value or error
//! alike, keyed by the exact input string rather than entry identity.
//!
//! ## Responsibilities by module
//!
//! - `scan.rs`: grammar primitives (bounded look-ahead, delimiter isolation,
//!   cursor-preserving sub-parsing).
//! - `tokens.rs`: the topic-list and matcher-token sub-grammars shared by
//!   Classic and Attribute.
//! - `classic.rs` / `attribute.rs` / `field.rs`: the dialects.
//! - `error.rs`: author-facing error type with absolute locations.

#[path = "parse/attribute.rs"]
mod attribute;
#[path = "parse/classic.rs"]
mod classic;
#[path = "parse/error.rs"]
mod error;
#[path = "parse/field.rs"]
mod field;
#[path = "parse/scan.rs"]
mod scan;
#[path = "parse/tokens.rs"]
mod tokens;

pub use error::{EntryField, ParseError};

use std::collections::{BTreeMap, HashMap};

use crate::model::{EntryTypeDef, KeywordDef, ParsedEntryData, RelationDef};

/// Memoized parsing for one turn.
///
/// Each map is keyed by the exact raw string handed to the dialect. Cached
/// errors are real results: probing the same malformed string twice reports
/// the same error without re-parsing.
#[derive(Debug, Default)]
pub struct ParseSession {
    classic: HashMap<String, Option<Result<ParsedEntryData, ParseError>>>,
    attr_type: HashMap<String, Result<EntryTypeDef, ParseError>>,
    attr_topics: HashMap<String, Result<Vec<String>, ParseError>>,
    attr_keywords: HashMap<String, Result<Vec<KeywordDef>, ParseError>>,
    attr_relations: HashMap<String, Result<Vec<RelationDef>, ParseError>>,
    field: HashMap<String, ParsedEntryData>,
}

impl ParseSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run the full dialect chain for one raw entry.
    ///
    /// When the Classic dialect claims the key string it answers every
    /// field at once. Otherwise each field independently falls through to
    /// the Attribute dialect (when its key is present) and finally to the
    /// Field fallback.
    pub fn parse(&mut self, key: &str, attributes: &BTreeMap<String, String>) -> Result<ParsedEntryData, ParseError> {
        if let Some(outcome) = self.classic(key) {
            return outcome;
        }

        let fallback = self.field(key);

        let type_def = match attributes.get(attribute::TYPE_KEY) {
            Some(value) => self.attr_type(value)?,
            None => fallback.type_def.clone(),
        };
        let topics = match attributes.get(attribute::TOPICS_KEY) {
            Some(value) => self.attr_topics(value)?,
            None => fallback.topics.clone(),
        };
        let keywords = match attributes.get(attribute::KEYWORDS_KEY) {
            Some(value) => self.attr_keywords(value)?,
            None => fallback.keywords.clone(),
        };
        let relations = match attributes.get(attribute::RELATIONS_KEY) {
            Some(value) => self.attr_relations(value)?,
            None => fallback.relations.clone(),
        };

        Ok(ParsedEntryData { type_def, topics, keywords, relations })
    }

    /// The Classic dialect's opinion on a key string, memoized.
    pub fn classic(&mut self, key: &str) -> Option<Result<ParsedEntryData, ParseError>> {
        self.classic.entry(key.to_string()).or_insert_with(|| classic::parse(key)).clone()
    }

    fn field(&mut self, key: &str) -> ParsedEntryData {
        self.field.entry(key.to_string()).or_insert_with(|| field::parse(key)).clone()
    }

    fn attr_type(&mut self, value: &str) -> Result<EntryTypeDef, ParseError> {
        self.attr_type.entry(value.to_string()).or_insert_with(|| attribute::parse_type(value)).clone()
    }

    fn attr_topics(&mut self, value: &str) -> Result<Vec<String>, ParseError> {
        self.attr_topics.entry(value.to_string()).or_insert_with(|| attribute::parse_topics(value)).clone()
    }

    fn attr_keywords(&mut self, value: &str) -> Result<Vec<KeywordDef>, ParseError> {
        self.attr_keywords.entry(value.to_string()).or_insert_with(|| attribute::parse_keywords(value)).clone()
    }

    fn attr_relations(&mut self, value: &str) -> Result<Vec<RelationDef>, ParseError> {
        self.attr_relations.entry(value.to_string()).or_insert_with(|| attribute::parse_relations(value)).clone()
    }
}
