//! Turn-scoped cache collaborator.
//!
//! The engine treats the cache as a single-writer, last-write-wins store
//! keyed by a fixed string per engine instance. A completed turn writes one
//! [`TurnSnapshot`]; a blocked turn writes nothing, leaving the previous
//! turn's snapshot as the still-valid latest state. Consumers running
//! slightly behind read the nearest prior snapshot and shift its history
//! offsets forward with [`TurnSnapshot::shifted_to`].
//!
//! Entry identity does not survive a turn: only the shadow fields
//! (id/type/topics/keywords/relations) are persisted, and the next turn
//! re-hydrates them through the parser from the rendered key string.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::entries::EntryRecord;
use crate::model::{KeywordDef, RelationDef};
use crate::{EntryId, Source};

/// The single snapshot a completed turn leaves behind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnSnapshot {
    /// The turn this snapshot was written for.
    pub turn: u64,
    /// Every resolved winner, in resolution order.
    pub winners: Vec<WinnerRecord>,
    /// The serialized entry table, for cross-turn change detection.
    pub entries: Vec<EntryShadow>,
}

impl TurnSnapshot {
    /// View this snapshot from a later turn: history depths shift down by
    /// the number of turns elapsed, so "depth 0 at turn N" reads as "depth
    /// k at turn N+k". Non-history winners are unaffected.
    pub fn shifted_to(&self, current_turn: u64) -> TurnSnapshot {
        let elapsed = current_turn.saturating_sub(self.turn) as usize;
        let winners = self
            .winners
            .iter()
            .map(|winner| {
                let source = match &winner.source {
                    Source::History(depth) => Source::History(depth + elapsed),
                    other => other.clone(),
                };
                WinnerRecord { source, ..winner.clone() }
            })
            .collect();
        TurnSnapshot { turn: self.turn, winners, entries: self.entries.clone() }
    }
}

/// One winner as persisted in a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WinnerRecord {
    pub entry: EntryId,
    pub source: Source,
    pub score: f64,
}

/// The serialized form of an entry: exactly the fields that survive a turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryShadow {
    pub id: EntryId,
    pub entry_type: String,
    pub topics: Vec<String>,
    pub keywords: Vec<KeywordDef>,
    pub relations: Vec<RelationDef>,
}

impl EntryShadow {
    pub fn of(record: &EntryRecord) -> Self {
        EntryShadow {
            id: record.id.clone(),
            entry_type: record.type_def.value.clone(),
            topics: record.topics.clone(),
            keywords: record.keywords.clone(),
            relations: record.relations().to_vec(),
        }
    }

    /// Render back to a key string the parser accepts. For typed entries
    /// this is Classic syntax; re-parsing it yields identical
    /// topics/keywords/relations. Vanilla shadows render as the Field
    /// dialect's comma list.
    pub fn to_key(&self) -> String {
        if self.entry_type.is_empty() {
            let keywords: Vec<&str> = self.keywords.iter().map(|kw| kw.value.as_str()).collect();
            return keywords.join(", ");
        }

        let mut key = format!("${}", self.entry_type);
        if !self.topics.is_empty() {
            key.push('[');
            key.push_str(&self.topics.join(" & "));
            key.push(']');
        }
        let matchers: Vec<String> = self
            .keywords
            .iter()
            .map(KeywordDef::render)
            .chain(self.relations.iter().map(RelationDef::render))
            .collect();
        if !matchers.is_empty() {
            key.push('(');
            key.push_str(&matchers.join("; "));
            key.push(')');
        }
        key
    }
}

/// Write/read access the engine requires from the cache collaborator.
pub trait TurnCache {
    fn write(&mut self, key: &str, snapshot: TurnSnapshot);
    fn read(&self, key: &str) -> Option<TurnSnapshot>;
}

/// In-memory reference cache: one latest snapshot per key.
#[derive(Debug, Clone, Default)]
pub struct MemoryTurnCache {
    slots: HashMap<String, TurnSnapshot>,
}

impl MemoryTurnCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Nearest-prior read: the latest snapshot under `key`, with history
    /// offsets shifted to be valid at `current_turn`.
    pub fn read_shifted(&self, key: &str, current_turn: u64) -> Option<TurnSnapshot> {
        self.slots.get(key).map(|snapshot| snapshot.shifted_to(current_turn))
    }
}

impl TurnCache for MemoryTurnCache {
    fn write(&mut self, key: &str, snapshot: TurnSnapshot) {
        self.slots.insert(key.to_string(), snapshot);
    }

    fn read(&self, key: &str) -> Option<TurnSnapshot> {
        self.slots.get(key).cloned()
    }
}
