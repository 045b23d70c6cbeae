use std::collections::BTreeMap;

use crate::cache::TurnCache;
use crate::engine::StateEngine;
use crate::history::HistoryView;
use crate::report::ValidationReport;
use crate::EntryId;

/// Engine configuration.
///
/// One knob: how many history turns the engine looks back over (the window
/// depth relation checks and history association run against).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    pub entry_count: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig { entry_count: 20 }
    }
}

/// A raw authored entry as handed to the engine.
///
/// The parser dialects read `key` (Classic and Field) and `attributes`
/// (Attribute dialect); `text` is the body injected when the entry wins a
/// slot.
#[derive(Debug, Clone, PartialEq)]
pub struct RawEntry {
    pub id: String,
    pub key: String,
    pub attributes: BTreeMap<String, String>,
    pub text: String,
}

impl RawEntry {
    pub fn new(id: impl Into<String>, key: impl Into<String>, text: impl Into<String>) -> Self {
        RawEntry { id: id.into(), key: key.into(), attributes: BTreeMap::new(), text: text.into() }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

/// Everything one turn needs.
///
/// `authors_note`/`front_memory` carry externally set slot content; the
/// engine only competes for a slot the turn arrived without.
#[derive(Clone, Copy)]
pub struct TurnInput<'a> {
    pub turn: u64,
    pub entries: &'a [RawEntry],
    pub history: &'a dyn HistoryView,
    pub player_memory: Option<&'a str>,
    pub authors_note: Option<&'a str>,
    pub front_memory: Option<&'a str>,
}

impl<'a> TurnInput<'a> {
    pub fn new(turn: u64, entries: &'a [RawEntry], history: &'a dyn HistoryView) -> Self {
        TurnInput { turn, entries, history, player_memory: None, authors_note: None, front_memory: None }
    }

    pub fn with_player_memory(mut self, memory: &'a str) -> Self {
        self.player_memory = Some(memory);
        self
    }

    pub fn with_authors_note(mut self, note: &'a str) -> Self {
        self.authors_note = Some(note);
        self
    }

    pub fn with_front_memory(mut self, front: &'a str) -> Self {
        self.front_memory = Some(front);
        self
    }
}

/// One winning entry's contribution to the turn's output.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextItem {
    pub entry: EntryId,
    pub text: String,
    pub score: f64,
}

/// The output groups of a completed turn.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TurnReport {
    pub turn: u64,
    /// Free-form context items (implicit, implicitRef and playerMemory
    /// winners), topic-family clustered.
    pub context_items: Vec<ContextItem>,
    pub front_memory: Option<ContextItem>,
    pub authors_note: Option<ContextItem>,
    /// One winner per won history depth, shallowest first.
    pub history_items: Vec<(usize, ContextItem)>,
}

/// What a turn produced: output groups, or the report that blocked it.
#[derive(Debug, Clone, PartialEq)]
pub enum TurnOutcome {
    Completed(TurnReport),
    Blocked(ValidationReport),
}

impl TurnOutcome {
    pub fn is_blocked(&self) -> bool {
        matches!(self, TurnOutcome::Blocked(_))
    }

    pub fn report(&self) -> Option<&TurnReport> {
        match self {
            TurnOutcome::Completed(report) => Some(report),
            TurnOutcome::Blocked(_) => None,
        }
    }
}

/// Process one turn with a default-configured engine.
///
/// Embedders that process many turns should build a [`StateEngine`] once
/// and reuse it; this free function exists for the one-shot case.
pub fn process_turn(input: &TurnInput<'_>, cache: &mut dyn TurnCache) -> TurnOutcome {
    StateEngine::new(EngineConfig::default()).process_turn(input, cache)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryTurnCache;
    use crate::history::VecHistory;

    #[test]
    fn one_shot_turn_processing() {
        let entries = vec![RawEntry::new("bob", "$Npc[Bob](bob)", "Bob runs the tavern.")];
        let history = VecHistory::player(["Bob waved."]);
        let mut cache = MemoryTurnCache::new();

        let outcome = process_turn(&TurnInput::new(1, &entries, &history), &mut cache);
        let report = outcome.report().expect("turn should complete");
        assert_eq!(report.turn, 1);
        assert_eq!(report.history_items.len(), 1);
    }

    #[test]
    fn raw_entry_attribute_builder() {
        let entry = RawEntry::new("x", "cave, dragon", "...")
            .with_attribute("@type", "Lore")
            .with_attribute("@topics", "Cave");
        assert_eq!(entry.attributes.len(), 2);
    }
}
