//! Pre-rule stage.
//!
//! Each surviving (entry, source) association gets one pre-rule probe with
//! neighbor access: `before`/`current`/`after` around a history source, and
//! `get_for` for any other source. A `false` drops that single association;
//! the entry's other associations are untouched.
//!
//! Note the asymmetry with post-rules: pre-rules see history-relative
//! neighbors around the association being probed, post-rules later see a
//! source-type-based global resolution order. Entry kinds depend on both
//! orders as they are.

use super::context::{TurnContext, cell_of};
use super::debug_enabled;
use crate::entries::{EntryBehavior, PreRuleContext};

pub(crate) fn apply_pre_rules(ctx: &mut TurnContext, behaviors: &[Box<dyn EntryBehavior>]) {
    let mut removals = Vec::new();
    for (source, ids) in &ctx.candidates {
        for id in ids {
            let cell = cell_of(&ctx.cells, id);
            let probe = PreRuleContext { record: &cell.record, source, candidates: &ctx.candidates };
            if !behaviors[cell.kind].pre_rule(&probe) {
                if debug_enabled() {
                    eprintln!("[pre-rule] dropping {} <- {}", source, id);
                }
                removals.push((source.clone(), id.clone()));
            }
        }
    }

    for (source, id) in removals {
        if let Some(ids) = ctx.candidates.get_mut(&source) {
            ids.retain(|candidate| *candidate != id);
        }
    }
    ctx.candidates.retain(|_, ids| !ids.is_empty());
}
