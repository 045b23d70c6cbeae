//! Field dialect: the backward-compatible fallback.
//!
//! The key string is read as a plain comma-separated keyword list. When the
//! first segment is a single word it doubles as the (vanilla) type value.
//! This dialect never errors and always has an opinion, so it terminates
//! the fallback chain; entries that reach it are vanilla entries.

use super::scan::Fragment;
use crate::model::{EntryTypeDef, KeywordDef, ParsedEntryData, TypeKind};

pub(crate) fn parse(raw: &str) -> ParsedEntryData {
    let body = Fragment::new(raw).trim();
    if body.is_empty() {
        return ParsedEntryData::default();
    }

    let mut keywords = Vec::new();
    let mut type_value = String::new();
    for (idx, item) in body.split_list(',').into_iter().enumerate() {
        let segment = item.trim();
        if segment.is_empty() {
            continue;
        }
        // Bounded look-ahead: a short, space-free first segment names the entry.
        if idx == 0 && segment.scan_until(char::is_whitespace, 64).is_none() && segment.as_str().len() <= 64 {
            type_value = segment.as_str().to_string();
        }
        keywords.push(KeywordDef::include(segment.as_str()));
    }

    ParsedEntryData {
        type_def: EntryTypeDef::new(TypeKind::Vanilla, type_value),
        topics: Vec::new(),
        keywords,
        relations: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comma_list_becomes_include_keywords() {
        let parsed = parse("bob, friend, tavern keeper");
        assert_eq!(parsed.type_def.kind, TypeKind::Vanilla);
        assert_eq!(parsed.type_def.value, "bob");
        assert_eq!(
            parsed.keywords,
            vec![KeywordDef::include("bob"), KeywordDef::include("friend"), KeywordDef::include("tavern keeper")]
        );
        assert!(parsed.topics.is_empty());
        assert!(parsed.relations.is_empty());
    }

    #[test]
    fn multi_word_first_segment_leaves_type_unnamed() {
        let parsed = parse("tavern keeper, bob");
        assert_eq!(parsed.type_def.kind, TypeKind::Vanilla);
        assert_eq!(parsed.type_def.value, "");
        assert_eq!(parsed.keywords.len(), 2);
    }

    #[test]
    fn empty_key_string_is_unknown() {
        let parsed = parse("   ");
        assert_eq!(parsed.type_def.kind, TypeKind::Unknown);
        assert!(parsed.keywords.is_empty());
    }
}
