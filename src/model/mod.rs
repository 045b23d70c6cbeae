//! Typed results of entry-language parsing, and the relation-evaluation view.
//!
//! The parser dialects all funnel into [`ParsedEntryData`]; matchers arrive
//! as one flat sequence and are partitioned into keywords vs. relations by
//! mode, never by where they appeared in the source.

mod matcher;
mod relatable;
mod used_topics;

pub use matcher::{KeywordDef, KeywordMode, MatcherDef, RelationDef, RelationMode};
pub use relatable::RelatableEntry;
pub use used_topics::UsedTopics;

use serde::{Deserialize, Serialize};

/// How an entry's raw input classified, before any kind claims it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeKind {
    /// A plain entry with no entry-language marker.
    Vanilla,
    /// An entry authored in the state-engine entry language.
    StateEngine,
    /// Nothing recognizable; kinds may still claim it explicitly.
    Unknown,
}

/// The parsed type of a raw entry. Produced once per entry; immutable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryTypeDef {
    pub kind: TypeKind,
    pub value: String,
}

impl EntryTypeDef {
    pub fn new(kind: TypeKind, value: impl Into<String>) -> Self {
        EntryTypeDef { kind, value: value.into() }
    }

    pub fn unknown() -> Self {
        EntryTypeDef { kind: TypeKind::Unknown, value: String::new() }
    }
}

/// Output contract of every parser dialect.
///
/// Topics are unordered, but the first topic is primary by convention for
/// character-like entry kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedEntryData {
    pub type_def: EntryTypeDef,
    pub topics: Vec<String>,
    pub keywords: Vec<KeywordDef>,
    pub relations: Vec<RelationDef>,
}

impl Default for ParsedEntryData {
    fn default() -> Self {
        ParsedEntryData {
            type_def: EntryTypeDef::unknown(),
            topics: Vec::new(),
            keywords: Vec::new(),
            relations: Vec::new(),
        }
    }
}

impl ParsedEntryData {
    /// Partition a flat matcher sequence into the keyword and relation lists.
    pub fn from_matchers(type_def: EntryTypeDef, topics: Vec<String>, matchers: Vec<MatcherDef>) -> Self {
        let (keywords, relations) = matcher::partition(matchers);
        ParsedEntryData { type_def, topics, keywords, relations }
    }
}
