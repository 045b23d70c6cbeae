//! Relation satisfaction against a topic history.
//!
//! `RelatableEntry` is a derived, read-only view over an entry's relation
//! list: four topic sets split by mode plus two unions. It is rebuilt whole
//! whenever relations are (re)assigned, never partially mutated, so the sets
//! can never drift out of sync with the relation list that produced them.

use std::collections::HashSet;

use super::matcher::{RelationDef, RelationMode};
use super::used_topics::UsedTopics;

#[derive(Debug, Clone, Default)]
pub struct RelatableEntry {
    all_of: HashSet<String>,
    at_least_one: HashSet<String>,
    immediate: HashSet<String>,
    negated: HashSet<String>,
    topics_of_interest: HashSet<String>,
    topics_for_match: HashSet<String>,
    /// History window horizon (the configured entry count).
    horizon: usize,
}

impl RelatableEntry {
    pub fn new(relations: &[RelationDef], horizon: usize) -> Self {
        let mut this = RelatableEntry { horizon, ..Default::default() };
        for relation in relations {
            let topic = relation.topic.clone();
            match relation.mode {
                RelationMode::AllOf => this.all_of.insert(topic),
                RelationMode::AtLeastOne => this.at_least_one.insert(topic),
                RelationMode::Immediate => this.immediate.insert(topic),
                RelationMode::Negated => this.negated.insert(topic),
            };
        }
        this.topics_of_interest = this
            .all_of
            .iter()
            .chain(&this.at_least_one)
            .chain(&this.immediate)
            .chain(&this.negated)
            .cloned()
            .collect();
        this.topics_for_match =
            this.all_of.iter().chain(&this.at_least_one).chain(&this.immediate).cloned().collect();
        this
    }

    pub fn horizon(&self) -> usize {
        self.horizon
    }

    /// Union of every relation topic, negated included. Empty means the
    /// entry is uninterested in all topic sets by definition.
    pub fn topics_of_interest(&self) -> &HashSet<String> {
        &self.topics_of_interest
    }

    /// Union of the positive relation topics (negated excluded).
    pub fn topics_for_match(&self) -> &HashSet<String> {
        &self.topics_for_match
    }

    pub fn negated_count(&self) -> usize {
        self.negated.len()
    }

    pub fn is_trivial(&self) -> bool {
        self.topics_of_interest.is_empty()
    }

    /// Evaluate the relations against the used-topic history over depths
    /// `max(start, 0)..=end`, with `Immediate` tested against depth `start`
    /// alone.
    ///
    /// `None` means a category failed. `Some(n)` is the summed match count;
    /// an entry with no relations matches trivially as `Some(0)`, never as a
    /// failure.
    pub fn check(&self, used: &UsedTopics, start: isize, end: usize) -> Option<usize> {
        let window = used.union_range(start, end);
        let mut total = 0usize;

        if self.negated.iter().any(|topic| window.contains(topic.as_str())) {
            return None;
        }

        if !self.at_least_one.is_empty() {
            let hits = self.at_least_one.iter().filter(|topic| window.contains(topic.as_str())).count();
            if hits == 0 {
                return None;
            }
            total += hits;
        }

        if !self.all_of.is_empty() {
            if !self.all_of.iter().all(|topic| window.contains(topic.as_str())) {
                return None;
            }
            total += self.all_of.len();
        }

        if !self.immediate.is_empty() {
            let at_start = used.at(start.max(0) as usize);
            let satisfied = match at_start {
                Some(topics) => self.immediate.iter().all(|topic| topics.contains(topic)),
                None => false,
            };
            if !satisfied {
                return None;
            }
            total += self.immediate.len();
        }

        Some(total)
    }

    /// Same logic against a flat topic set instead of a ranged history.
    ///
    /// Used when relating to a sibling entry's own topic set. When
    /// `include_immediate` is set, `Immediate` topics are folded into the
    /// `AllOf` subset rule; otherwise they are ignored.
    pub fn check_topics(&self, topics: &HashSet<String>, include_immediate: bool) -> Option<usize> {
        let mut total = 0usize;

        if self.negated.iter().any(|topic| topics.contains(topic)) {
            return None;
        }

        if !self.at_least_one.is_empty() {
            let hits = self.at_least_one.iter().filter(|topic| topics.contains(*topic)).count();
            if hits == 0 {
                return None;
            }
            total += hits;
        }

        if !self.all_of.is_empty() {
            if !self.all_of.iter().all(|topic| topics.contains(topic)) {
                return None;
            }
            total += self.all_of.len();
        }

        if include_immediate && !self.immediate.is_empty() {
            if !self.immediate.iter().all(|topic| topics.contains(topic)) {
                return None;
            }
            total += self.immediate.len();
        }

        Some(total)
    }
}
