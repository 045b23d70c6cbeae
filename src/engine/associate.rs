//! Association stage.
//!
//! The cross-product of entries × eligible sources, walked in processing
//! order. Every accepted history association records the entry's topics in
//! the used-topic map as a side effect, which later-ordered entries' relation
//! checks consult - the ordering stage exists to make that read coherent.
//!
//! Sources offered to an entry:
//!
//! - `implicit` when the kind targets it;
//! - `playerMemory` when the input carries player memory text;
//! - `authorsNote` / `frontMemory` only when the turn did not arrive with
//!   those slots externally set;
//! - one `implicitRef` probe per implicitly-included entry (second pass,
//!   after the implicit candidates are known);
//! - every history depth in the window.
//!
//! The matching text for the slot sources (`implicit`, `authorsNote`,
//! `frontMemory`) is the most recent history step: those slots are about the
//! current narrative position, which is what depth 0 holds.

use super::context::{TurnContext, cell_of};
use super::debug_enabled;
use crate::api::TurnInput;
use crate::entries::{AssocParams, EntryBehavior, RefTarget};
use crate::{Source, SourceKinds};

pub(crate) fn run(ctx: &mut TurnContext, behaviors: &[Box<dyn EntryBehavior>], input: &TurnInput<'_>) {
    let order = ctx.order.clone();
    let horizon = ctx.horizon;

    // First pass: every source whose candidate set does not depend on other
    // associations.
    {
        let TurnContext { cells, window, used, candidates, .. } = ctx;
        let latest_text: Option<String> = window.first().map(|step| step.text.clone());

        for &idx in &order {
            let cell = &mut cells[idx];
            let behavior = &behaviors[cell.kind];
            let targets = behavior.target_sources().unwrap_or_else(SourceKinds::unspecified_default);

            let mut offers: Vec<(Source, Option<&str>)> = Vec::new();
            if targets.contains(SourceKinds::IMPLICIT) {
                offers.push((Source::Implicit, latest_text.as_deref()));
            }
            if targets.contains(SourceKinds::PLAYER_MEMORY) {
                if let Some(memory) = input.player_memory {
                    offers.push((Source::PlayerMemory, Some(memory)));
                }
            }
            if targets.contains(SourceKinds::AUTHORS_NOTE) && input.authors_note.is_none() {
                offers.push((Source::AuthorsNote, latest_text.as_deref()));
            }
            if targets.contains(SourceKinds::FRONT_MEMORY) && input.front_memory.is_none() {
                offers.push((Source::FrontMemory, latest_text.as_deref()));
            }
            if targets.contains(SourceKinds::HISTORY) {
                for (depth, step) in window.iter().enumerate() {
                    offers.push((Source::History(depth), Some(step.text.as_str())));
                }
            }

            for (source, text) in offers {
                let mut params =
                    AssocParams { source: source.clone(), text, used: &mut *used, target: None, horizon };
                if behavior.associate(&mut cell.record, &cell.view, &mut params) {
                    if debug_enabled() {
                        eprintln!("[associate] {} <- {}", source, cell.record.id);
                    }
                    candidates.entry(source).or_default().push(cell.record.id.clone());
                }
            }
        }
    }

    // Second pass: implicitRef against every implicitly-included entry.
    let targets_list: Vec<RefTarget> = ctx
        .candidates
        .get(&Source::Implicit)
        .map(|ids| {
            ids.iter()
                .map(|id| {
                    let cell = cell_of(&ctx.cells, id);
                    RefTarget {
                        id: id.clone(),
                        topics: cell.record.topic_set(),
                        text: cell.record.text.clone(),
                    }
                })
                .collect()
        })
        .unwrap_or_default();
    if targets_list.is_empty() {
        return;
    }

    let TurnContext { cells, used, candidates, .. } = ctx;
    for &idx in &order {
        let cell = &mut cells[idx];
        let behavior = &behaviors[cell.kind];
        let targets = behavior.target_sources().unwrap_or_else(SourceKinds::unspecified_default);
        if !targets.contains(SourceKinds::IMPLICIT_REF) {
            continue;
        }
        for target in &targets_list {
            if target.id == cell.record.id {
                continue;
            }
            let source = Source::ImplicitRef(target.id.clone());
            let mut params = AssocParams {
                source: source.clone(),
                text: Some(target.text.as_str()),
                used: &mut *used,
                target: Some(target),
                horizon,
            };
            if behavior.associate(&mut cell.record, &cell.view, &mut params) {
                if debug_enabled() {
                    eprintln!("[associate] {} <- {}", source, cell.record.id);
                }
                candidates.entry(source).or_default().push(cell.record.id.clone());
            }
        }
    }
}
