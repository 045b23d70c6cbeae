//! Default entry behaviors, as free functions.
//!
//! Concrete kinds call these from their own hook implementations when they
//! only want to deviate in part; the trait's default methods delegate here
//! unchanged.

use super::matchable::{KeywordScan, MatchView};
use super::{AssocParams, EntryRecord, ScoreParams};
use crate::Source;
use crate::model::UsedTopics;

/// Default keyword test: exclusions veto, and when include keywords exist at
/// least one must have hit. An entry without include keywords passes
/// trivially (its relevance comes from relations alone).
pub fn check_keywords(record: &EntryRecord, scan: &KeywordScan) -> bool {
    if scan.excluded {
        return false;
    }
    !record.has_include_keyword() || scan.unique_matched > 0
}

/// Default relation test for a source: the history window starts at the
/// source's own depth (history sources) or at the most recent turn (all
/// others) and extends to the configured horizon.
pub fn check_relations(record: &EntryRecord, used: &UsedTopics, source: &Source, horizon: usize) -> Option<usize> {
    let start = match source {
        Source::History(depth) => *depth as isize,
        _ => 0,
    };
    let end = horizon.saturating_sub(1);
    record.relatable().check(used, start, end)
}

/// Default associator.
///
/// - every source must offer literal text to match against;
/// - `playerMemory` additionally demands at least one include keyword;
/// - `implicitRef` demands an include keyword or a relation, and accepts on
///   a keyword hit against the target's text or a relation hit against the
///   target's topic set;
/// - everything else demands the keyword test AND the relation test, and a
///   history match records the entry's topics as used at that depth.
pub fn associate(record: &mut EntryRecord, view: &MatchView, params: &mut AssocParams<'_>) -> bool {
    let Some(text) = params.text else {
        return false;
    };

    match params.source.clone() {
        Source::PlayerMemory => {
            if !record.has_include_keyword() {
                return false;
            }
            view.scan(&params.source, text).matched()
        }
        Source::ImplicitRef(_) => {
            let target = params.target.expect("implicitRef association offered without a target entry");
            if !record.has_include_keyword() && record.relations().is_empty() {
                return false;
            }
            if record.has_include_keyword() && view.scan(&params.source, text).matched() {
                return true;
            }
            if record.relations().is_empty() {
                return false;
            }
            match record.relatable().check_topics(&target.topics, true) {
                Some(count) => {
                    record.relation_counts.insert(params.source.clone(), count);
                    true
                }
                None => false,
            }
        }
        source => {
            // No matchers means no signal to match on; such an entry only
            // gets in after the modifier pass gives it some.
            if !record.has_matchers() {
                return false;
            }
            let scan = view.scan(&source, text);
            if !check_keywords(record, &scan) {
                return false;
            }
            match check_relations(record, params.used, &source, params.horizon) {
                None => false,
                Some(count) => {
                    record.relation_counts.insert(source.clone(), count);
                    if let Source::History(depth) = source {
                        params.used.record(depth, record.topics.iter().cloned());
                    }
                    true
                }
            }
        }
    }
}

/// Default cross-modify behavior: an entry that carries topics but no
/// matchers of its own inherits keywords and relations from a topic-sharing
/// sibling - but only when exactly one such donor exists. With several
/// eligible donors the inheritance would be ambiguous, so nothing happens.
pub fn inherit_matchers(record: &mut EntryRecord, siblings: &[EntryRecord]) {
    if record.has_matchers() || record.topics.is_empty() {
        return;
    }
    let donors: Vec<&EntryRecord> = siblings
        .iter()
        .filter(|sibling| sibling.id != record.id && sibling.has_matchers() && sibling.shares_topic_with(record))
        .collect();
    if let [donor] = donors[..] {
        record.keywords = donor.keywords.clone();
        record.set_relations(donor.relations().to_vec());
    }
}

/// Default valuator: `10 × scalar × keyword_part × relations_part`, clamped
/// to `[0, 1000]`.
///
/// The keyword part rewards distinct matched keywords plus a bonus for extra
/// occurrences; keywords that exist but failed to match halve the scalar
/// instead of zeroing the score. Exclude keywords and negated relations act
/// as small multipliers: an entry that survived its own vetoes is more
/// specific than one that never had any.
pub fn score(params: &ScoreParams<'_>) -> f64 {
    let record = params.record;
    let includes = record.keywords.iter().filter(|kw| kw.is_include()).count();
    let exclusives = record.keywords.len() - includes;

    let mut scalar = params.base_scalar;
    let (unique, bonus) = if includes > 0 {
        if params.scan.unique_matched > 0 {
            let extra = params.scan.total_hits.saturating_sub(params.scan.unique_matched);
            (params.scan.unique_matched as f64, extra as f64 / params.scan.unique_matched as f64)
        } else {
            scalar *= 0.5;
            (0.0, 1.0)
        }
    } else {
        (0.0, 1.0)
    };
    let keyword_part = (unique + bonus) * 1.1f64.powi(exclusives as i32);

    let relation_matches = record.relation_counts.get(params.source).copied().unwrap_or(0);
    let relations_part = (relation_matches as f64 + 1.0) * 1.1f64.powi(record.relatable().negated_count() as i32);

    (10.0 * scalar * keyword_part * relations_part).clamp(0.0, 1000.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EntryId;
    use crate::model::{KeywordDef, ParsedEntryData, RelationDef, RelationMode};

    fn entry(id: &str, topics: &[&str], keywords: Vec<KeywordDef>, relations: Vec<RelationDef>) -> EntryRecord {
        let parsed = ParsedEntryData {
            topics: topics.iter().map(|t| t.to_string()).collect(),
            keywords,
            relations,
            ..Default::default()
        };
        EntryRecord::new(EntryId::new(id), parsed, "", 20)
    }

    fn score_of(record: &EntryRecord, source: &Source, scan: KeywordScan) -> f64 {
        score(&ScoreParams { source, record, scan, base_scalar: 1.0 })
    }

    #[test]
    fn matched_keywords_score_higher_than_unmatched() {
        let record = entry("bob", &["Bob"], vec![KeywordDef::include("bob"), KeywordDef::include("friend")], vec![]);
        let source = Source::History(0);

        let matched = score_of(&record, &source, KeywordScan { unique_matched: 2, total_hits: 2, excluded: false });
        let unmatched = score_of(&record, &source, KeywordScan::default());
        assert_eq!(matched, 20.0);
        assert_eq!(unmatched, 5.0);
        assert!(matched > unmatched);
    }

    #[test]
    fn extra_occurrences_raise_the_bonus() {
        let record = entry("bob", &[], vec![KeywordDef::include("bob")], vec![]);
        let source = Source::History(0);
        let flat = score_of(&record, &source, KeywordScan { unique_matched: 1, total_hits: 1, excluded: false });
        let repeated = score_of(&record, &source, KeywordScan { unique_matched: 1, total_hits: 3, excluded: false });
        assert!(repeated > flat);
    }

    #[test]
    fn keywordless_entries_score_on_relations_alone() {
        let mut record = entry("cave", &[], vec![], vec![RelationDef::new(RelationMode::AllOf, "Cave")]);
        let source = Source::History(1);
        record.relation_counts.insert(source.clone(), 1);
        // keyword part (0 + 1) = 1, relations part (1 + 1) = 2.
        assert_eq!(score_of(&record, &source, KeywordScan::default()), 20.0);
    }

    #[test]
    fn scores_clamp_at_one_thousand() {
        let record = entry("big", &[], vec![KeywordDef::include("x")], vec![]);
        let source = Source::History(0);
        let scan = KeywordScan { unique_matched: 1, total_hits: 100_000, excluded: false };
        assert_eq!(score_of(&record, &source, scan), 1000.0);
    }

    #[test]
    fn single_donor_inheritance() {
        let donor = entry("a", &["Cave"], vec![KeywordDef::include("cave")], vec![]);
        let mut receiver = entry("b", &["Cave"], vec![], vec![]);
        inherit_matchers(&mut receiver, &[donor.clone()]);
        assert_eq!(receiver.keywords, donor.keywords);
    }

    #[test]
    fn two_donors_mean_no_inheritance() {
        let donor_a = entry("a", &["Cave"], vec![KeywordDef::include("cave")], vec![]);
        let donor_b = entry("c", &["Cave"], vec![KeywordDef::include("cavern")], vec![]);
        let mut receiver = entry("b", &["Cave"], vec![], vec![]);
        inherit_matchers(&mut receiver, &[donor_a, donor_b]);
        assert!(receiver.keywords.is_empty());
        assert!(receiver.relations().is_empty());
    }
}
