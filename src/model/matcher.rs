//! Keyword and relation matcher definitions.
//!
//! A matcher token from the entry language is classified as a relation only
//! when it carries a relation sigil; everything else is a keyword. The sigil
//! tables here are the single source of truth for both parsing and the
//! re-serialization used by turn-cache shadows.

use serde::{Deserialize, Serialize};

/// Keyword polarity: include keywords pull an entry in, exclude keywords
/// veto a text match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeywordMode {
    Include,
    Exclude,
}

impl KeywordMode {
    pub fn from_sigil(sigil: char) -> Option<Self> {
        match sigil {
            '+' => Some(KeywordMode::Include),
            '-' => Some(KeywordMode::Exclude),
            _ => None,
        }
    }
}

/// How a relation's topic is tested against the used-topic history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationMode {
    AllOf,
    AtLeastOne,
    Immediate,
    Negated,
}

impl RelationMode {
    pub fn from_sigil(sigil: char) -> Option<Self> {
        match sigil {
            ':' => Some(RelationMode::AllOf),
            '?' => Some(RelationMode::AtLeastOne),
            '@' => Some(RelationMode::Immediate),
            '!' => Some(RelationMode::Negated),
            _ => None,
        }
    }

    pub fn sigil(&self) -> char {
        match self {
            RelationMode::AllOf => ':',
            RelationMode::AtLeastOne => '?',
            RelationMode::Immediate => '@',
            RelationMode::Negated => '!',
        }
    }
}

/// A text-presence test. `exact` keywords match on word boundaries; plain
/// keywords match as case-insensitive substrings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordDef {
    pub mode: KeywordMode,
    pub exact: bool,
    pub value: String,
}

impl KeywordDef {
    pub fn include(value: impl Into<String>) -> Self {
        KeywordDef { mode: KeywordMode::Include, exact: false, value: value.into() }
    }

    pub fn exclude(value: impl Into<String>) -> Self {
        KeywordDef { mode: KeywordMode::Exclude, exact: false, value: value.into() }
    }

    pub fn exact(value: impl Into<String>) -> Self {
        KeywordDef { mode: KeywordMode::Include, exact: true, value: value.into() }
    }

    pub fn is_include(&self) -> bool {
        self.mode == KeywordMode::Include
    }

    /// Classic-syntax rendering, the inverse of matcher-token parsing.
    pub fn render(&self) -> String {
        let value = if self.exact { format!("\"{}\"", self.value) } else { self.value.clone() };
        match self.mode {
            KeywordMode::Include => value,
            KeywordMode::Exclude => format!("-{value}"),
        }
    }
}

/// A topic-presence test against the used-topic history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationDef {
    pub mode: RelationMode,
    pub topic: String,
}

impl RelationDef {
    pub fn new(mode: RelationMode, topic: impl Into<String>) -> Self {
        RelationDef { mode, topic: topic.into() }
    }

    /// Classic-syntax rendering, always sigil-prefixed.
    pub fn render(&self) -> String {
        format!("{}{}", self.mode.sigil(), self.topic)
    }
}

/// A single parsed matcher token, before partitioning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MatcherDef {
    Keyword(KeywordDef),
    Relation(RelationDef),
}

/// Partition a flat matcher sequence by mode, preserving source order
/// within each list.
pub(crate) fn partition(matchers: Vec<MatcherDef>) -> (Vec<KeywordDef>, Vec<RelationDef>) {
    let mut keywords = Vec::new();
    let mut relations = Vec::new();
    for matcher in matchers {
        match matcher {
            MatcherDef::Keyword(kw) => keywords.push(kw),
            MatcherDef::Relation(rel) => relations.push(rel),
        }
    }
    (keywords, relations)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sigils_round_trip() {
        for mode in [RelationMode::AllOf, RelationMode::AtLeastOne, RelationMode::Immediate, RelationMode::Negated] {
            assert_eq!(RelationMode::from_sigil(mode.sigil()), Some(mode));
        }
    }

    #[test]
    fn keyword_rendering() {
        assert_eq!(KeywordDef::include("bob").render(), "bob");
        assert_eq!(KeywordDef::exclude("bob").render(), "-bob");
        assert_eq!(KeywordDef::exact("old bob").render(), "\"old bob\"");
    }

    #[test]
    fn partition_splits_by_mode_in_order() {
        let matchers = vec![
            MatcherDef::Keyword(KeywordDef::include("a")),
            MatcherDef::Relation(RelationDef::new(RelationMode::Negated, "dead")),
            MatcherDef::Keyword(KeywordDef::exclude("b")),
        ];
        let (keywords, relations) = partition(matchers);
        assert_eq!(keywords.len(), 2);
        assert_eq!(keywords[0].value, "a");
        assert_eq!(relations.len(), 1);
        assert_eq!(relations[0].topic, "dead");
    }
}
