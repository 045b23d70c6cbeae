//! Per-turn working state.
//!
//! One [`TurnContext`] is created per turn, owned exclusively by that turn's
//! execution, and discarded at the end. Nothing here is persisted directly;
//! the materialize stage derives the cache snapshot from it.

use std::collections::BTreeMap;

use crate::entries::{EntryRecord, MatchView, Winner};
use crate::history::HistoryStep;
use crate::model::UsedTopics;
use crate::report::ValidationReport;
use crate::{EntryId, Source};

/// One discovered entry plus its kind binding and match view.
pub(crate) struct EntryCell {
    /// Index into the engine's behavior registry.
    pub kind: usize,
    pub record: EntryRecord,
    /// Compiled keyword matchers; rebuilt at the wrap stage so matchers
    /// gained in the modifier pass compile too.
    pub view: MatchView,
}

pub(crate) struct TurnContext {
    /// Configured history window depth.
    pub horizon: usize,
    /// The entry table. Stable for the turn once validation has run.
    pub cells: Vec<EntryCell>,
    /// Processing order (indices into `cells`) from the dependency sort.
    pub order: Vec<usize>,
    /// The materialized history window, most recent first.
    pub window: Vec<HistoryStep>,
    /// Topics recorded as used per history depth during association.
    pub used: UsedTopics,
    /// Candidate entries per source, in association order.
    pub candidates: BTreeMap<Source, Vec<EntryId>>,
    /// Scored candidates per source, zero weights already discarded.
    pub scores: BTreeMap<Source, Vec<(EntryId, f64)>>,
    /// Resolved winners, in resolution order.
    pub winners: Vec<Winner>,
    /// Parse errors and validation issues collected before the block check.
    pub report: ValidationReport,
}

impl TurnContext {
    pub fn new(horizon: usize) -> Self {
        TurnContext {
            horizon,
            cells: Vec::new(),
            order: Vec::new(),
            window: Vec::new(),
            used: UsedTopics::new(),
            candidates: BTreeMap::new(),
            scores: BTreeMap::new(),
            winners: Vec::new(),
            report: ValidationReport::new(),
        }
    }
}

/// Look up the cell an association refers to.
///
/// An association pointing at an entry that is not in the table is a
/// programming-logic fault, not an input problem; it aborts loudly instead
/// of being swallowed.
pub(crate) fn cell_of<'a>(cells: &'a [EntryCell], id: &EntryId) -> &'a EntryCell {
    cells
        .iter()
        .find(|cell| cell.record.id == *id)
        .unwrap_or_else(|| panic!("entry {id} is referenced by an association but missing from the table"))
}
