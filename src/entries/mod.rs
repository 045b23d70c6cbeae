//! The polymorphic entry record contract.
//!
//! Entry state and entry behavior are split: [`EntryRecord`] owns the data
//! (parsed matchers, topics, the derived relation view, per-source match
//! counts), while [`EntryBehavior`] is the per-kind hook set the engine
//! drives through the turn pipeline. Default hook behavior lives in
//! [`defaults`] as free functions, so concrete kinds call into the shared
//! logic directly instead of relying on virtual "super" dispatch.
//!
//! Lifecycle of a record: constructed during discovery from parsed data,
//! mutated exactly once in the modifier stage, then treated as fixed for the
//! rest of the turn (association only appends per-source match counts).
//! At end of turn it is serialized to a plain shadow record and discarded;
//! no identity survives across turns.

pub mod defaults;
mod kinds;
mod matchable;

pub use kinds::builtin_kinds;
pub use matchable::{KeywordScan, MatchView};

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::model::{
    EntryTypeDef, KeywordDef, ParsedEntryData, RelatableEntry, RelationDef, TypeKind, UsedTopics,
};
use crate::{EntryId, Source, SourceKinds};

/// Per-turn entry state.
#[derive(Debug, Clone)]
pub struct EntryRecord {
    pub id: EntryId,
    pub type_def: EntryTypeDef,
    /// Unordered, but the first topic is primary by convention.
    pub topics: Vec<String>,
    pub keywords: Vec<KeywordDef>,
    relations: Vec<RelationDef>,
    relatable: RelatableEntry,
    /// The entry's body text, injected when the entry wins a slot.
    pub text: String,
    /// Relation match counts per association source. Only scoring reads this.
    pub relation_counts: HashMap<Source, usize>,
}

impl EntryRecord {
    pub fn new(id: EntryId, parsed: ParsedEntryData, text: impl Into<String>, horizon: usize) -> Self {
        let relatable = RelatableEntry::new(&parsed.relations, horizon);
        EntryRecord {
            id,
            type_def: parsed.type_def,
            topics: parsed.topics,
            keywords: parsed.keywords,
            relations: parsed.relations,
            relatable,
            text: text.into(),
            relation_counts: HashMap::new(),
        }
    }

    pub fn relations(&self) -> &[RelationDef] {
        &self.relations
    }

    /// Replace the relation list. The derived [`RelatableEntry`] is rebuilt
    /// in the same call; there is no way to leave the two out of sync.
    pub fn set_relations(&mut self, relations: Vec<RelationDef>) {
        self.relatable = RelatableEntry::new(&relations, self.relatable.horizon());
        self.relations = relations;
    }

    pub fn push_relation(&mut self, relation: RelationDef) {
        let mut relations = std::mem::take(&mut self.relations);
        relations.push(relation);
        self.set_relations(relations);
    }

    pub fn relatable(&self) -> &RelatableEntry {
        &self.relatable
    }

    pub fn primary_topic(&self) -> Option<&str> {
        self.topics.first().map(String::as_str)
    }

    pub fn topic_set(&self) -> HashSet<String> {
        self.topics.iter().cloned().collect()
    }

    pub fn has_include_keyword(&self) -> bool {
        self.keywords.iter().any(KeywordDef::is_include)
    }

    pub fn has_matchers(&self) -> bool {
        !self.keywords.is_empty() || !self.relations.is_empty()
    }

    pub fn shares_topic_with(&self, other: &EntryRecord) -> bool {
        self.topics.iter().any(|topic| other.topics.contains(topic))
    }

    /// Short author-facing label for reports.
    pub fn label(&self) -> String {
        if self.type_def.value.is_empty() {
            format!("[{}]", self.id)
        } else {
            format!("{} [{}]", self.type_def.value, self.id)
        }
    }
}

/// The target of an `ImplicitRef` association: a read-only slice of the
/// implicitly-included entry the association refers to.
#[derive(Debug, Clone)]
pub struct RefTarget {
    pub id: EntryId,
    pub topics: HashSet<String>,
    pub text: String,
}

/// Inputs to an association probe for one (entry, source) pair.
pub struct AssocParams<'a> {
    pub source: Source,
    /// The literal text the source offers for matching, when it has any.
    pub text: Option<&'a str>,
    /// The running used-topic record; history matches write into it.
    pub used: &'a mut UsedTopics,
    /// Set iff `source` is `ImplicitRef`.
    pub target: Option<&'a RefTarget>,
    /// Configured history window depth.
    pub horizon: usize,
}

/// Inputs to the valuator for one surviving (entry, source) pair.
pub struct ScoreParams<'a> {
    pub source: &'a Source,
    pub record: &'a EntryRecord,
    pub scan: KeywordScan,
    pub base_scalar: f64,
}

/// A resolved winner for one source slot.
#[derive(Debug, Clone, PartialEq)]
pub struct Winner {
    pub entry: EntryId,
    pub source: Source,
    pub score: f64,
}

/// Neighbor access for the pre-rule stage.
///
/// `before`/`after` are meaningful for history sources only and iterate the
/// candidate associations at older (deeper) and newer (shallower) depths
/// respectively; `get_for` reaches any other source's candidate list.
pub struct PreRuleContext<'a> {
    pub record: &'a EntryRecord,
    pub source: &'a Source,
    pub(crate) candidates: &'a BTreeMap<Source, Vec<EntryId>>,
}

impl<'a> PreRuleContext<'a> {
    fn depth(&self) -> Option<usize> {
        match self.source {
            Source::History(depth) => Some(*depth),
            _ => None,
        }
    }

    /// Candidate associations at older history depths than the current one.
    pub fn before(&self) -> Vec<(usize, &'a EntryId)> {
        self.history_neighbors(|other, current| other > current)
    }

    /// Candidate associations at newer history depths than the current one.
    pub fn after(&self) -> Vec<(usize, &'a EntryId)> {
        self.history_neighbors(|other, current| other < current)
    }

    /// Other candidates for the current source.
    pub fn current(&self) -> Vec<&'a EntryId> {
        self.candidates
            .get(self.source)
            .map(|ids| ids.iter().filter(|id| **id != self.record.id).collect())
            .unwrap_or_default()
    }

    pub fn get_for(&self, source: &Source) -> &'a [EntryId] {
        self.candidates.get(source).map(Vec::as_slice).unwrap_or(&[])
    }

    fn history_neighbors(&self, keep: impl Fn(usize, usize) -> bool) -> Vec<(usize, &'a EntryId)> {
        let Some(current) = self.depth() else { return Vec::new() };
        let mut neighbors = Vec::new();
        for (source, ids) in self.candidates {
            if let Source::History(depth) = source {
                if keep(*depth, current) {
                    neighbors.extend(ids.iter().map(|id| (*depth, id)));
                }
            }
        }
        neighbors
    }
}

/// Winner-acceptance inputs for the post-rule stage.
///
/// `selected` only exposes winners of sources resolved *earlier* in the
/// fixed resolution order (history newest to oldest, then implicitRef,
/// frontMemory, authorsNote, playerMemory, implicit).
pub struct PostRuleContext<'a> {
    pub record: &'a EntryRecord,
    pub source: &'a Source,
    pub score: f64,
    pub(crate) neighbors: &'a [(EntryId, f64)],
    pub(crate) winners: &'a [Winner],
}

impl<'a> PostRuleContext<'a> {
    /// The other scored candidates for this source.
    pub fn neighbors(&self) -> impl Iterator<Item = (&'a EntryId, f64)> {
        let own = &self.record.id;
        self.neighbors.iter().filter(move |(id, _)| id != own).map(|(id, score)| (id, *score))
    }

    /// Winners already resolved this turn.
    pub fn selected(&self) -> impl Iterator<Item = &'a Winner> {
        self.winners.iter()
    }
}

/// The per-kind behavior hooks.
///
/// Every method has a default that delegates to [`defaults`]; concrete kinds
/// override the hooks they care about and may still call the free functions
/// for the shared parts.
pub trait EntryBehavior {
    /// Kind name as it appears in the entry language (`$Npc` ⇒ `"Npc"`).
    fn kind(&self) -> &'static str;

    /// Whether this kind claims an entry with the given parsed type.
    fn claims(&self, type_def: &EntryTypeDef) -> bool {
        type_def.kind == TypeKind::StateEngine && type_def.value.eq_ignore_ascii_case(self.kind())
    }

    /// Which source categories this kind can ever match. `None` means
    /// implicitRef, playerMemory and history.
    fn target_sources(&self) -> Option<SourceKinds> {
        None
    }

    /// Sort/emission weight. `None` means unprioritized.
    fn priority(&self) -> Option<i32> {
        None
    }

    /// Kind- and source-specific scoring scalar.
    fn base_scalar(&self, _record: &EntryRecord, _source: &Source) -> f64 {
        1.0
    }

    /// Blocking issues with this entry; any issue removes the entry and
    /// blocks the turn.
    fn validate(&self, _record: &EntryRecord) -> Vec<String> {
        Vec::new()
    }

    /// One-shot self-mutation with read-only snapshots of all siblings.
    fn modify(&self, record: &mut EntryRecord, siblings: &[EntryRecord]) {
        defaults::inherit_matchers(record, siblings);
    }

    /// Does this entry apply to this source?
    fn associate(&self, record: &mut EntryRecord, view: &MatchView, params: &mut AssocParams<'_>) -> bool {
        defaults::associate(record, view, params)
    }

    /// Acceptance gate run per surviving association; `false` drops it.
    fn pre_rule(&self, _ctx: &PreRuleContext<'_>) -> bool {
        true
    }

    /// Acceptance gate run while resolving winners; `false` passes the slot
    /// to the next candidate in the randomized order.
    fn post_rule(&self, _ctx: &PostRuleContext<'_>) -> bool {
        true
    }

    /// Numeric weight of one surviving association.
    fn score(&self, params: &ScoreParams<'_>) -> f64 {
        defaults::score(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RelationMode;

    fn record(relations: &[(RelationMode, &str)]) -> EntryRecord {
        let parsed = ParsedEntryData {
            relations: relations.iter().map(|(mode, topic)| RelationDef::new(*mode, *topic)).collect(),
            ..Default::default()
        };
        EntryRecord::new(EntryId::new("test"), parsed, "", 20)
    }

    #[test]
    fn relation_assignment_rebuilds_the_derived_view() {
        let mut entry = record(&[]);
        assert!(entry.relatable().is_trivial());

        entry.push_relation(RelationDef::new(RelationMode::Negated, "dead"));
        assert_eq!(entry.relatable().negated_count(), 1);
        assert!(entry.relatable().topics_of_interest().contains("dead"));

        entry.set_relations(vec![RelationDef::new(RelationMode::AllOf, "Cave")]);
        assert_eq!(entry.relatable().negated_count(), 0);
        assert!(entry.relatable().topics_for_match().contains("Cave"));
    }

    #[test]
    fn pre_rule_context_splits_history_neighbors() {
        let entry = record(&[]);
        let mut candidates: BTreeMap<Source, Vec<EntryId>> = BTreeMap::new();
        candidates.insert(Source::History(0), vec![EntryId::new("new")]);
        candidates.insert(Source::History(2), vec![EntryId::new("test"), EntryId::new("peer")]);
        candidates.insert(Source::History(5), vec![EntryId::new("old")]);
        candidates.insert(Source::Implicit, vec![EntryId::new("imp")]);

        let source = Source::History(2);
        let ctx = PreRuleContext { record: &entry, source: &source, candidates: &candidates };

        let before: Vec<usize> = ctx.before().into_iter().map(|(depth, _)| depth).collect();
        assert_eq!(before, vec![5]);
        let after: Vec<usize> = ctx.after().into_iter().map(|(depth, _)| depth).collect();
        assert_eq!(after, vec![0]);
        assert_eq!(ctx.current().len(), 1);
        assert_eq!(ctx.get_for(&Source::Implicit).len(), 1);
    }
}
