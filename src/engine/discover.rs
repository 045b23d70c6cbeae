//! Discovery and validation stages.
//!
//! Discovery runs the parser chain over every raw input item and hands the
//! parsed entry to the first registered kind that claims its type. A type
//! no kind claims is expected control flow - debug-logged and skipped, never
//! surfaced to the author. A parse error is an author problem and becomes a
//! validation issue.
//!
//! Validation then runs each entry's own `validate` hook; any issue removes
//! the entry from the table and is added to the report. A non-empty report
//! blocks the turn before anything associates.

use super::context::{EntryCell, TurnContext};
use super::debug_enabled;
use crate::api::TurnInput;
use crate::entries::{EntryBehavior, EntryRecord, MatchView};
use crate::parse::ParseSession;
use crate::EntryId;

pub(crate) fn run(ctx: &mut TurnContext, behaviors: &[Box<dyn EntryBehavior>], input: &TurnInput<'_>) {
    let mut session = ParseSession::new();

    for raw in input.entries {
        let parsed = match session.parse(&raw.key, &raw.attributes) {
            Ok(parsed) => parsed,
            Err(error) => {
                ctx.report.push(format!("entry [{}]", raw.id), vec![error.to_string()]);
                continue;
            }
        };

        let Some(kind) = behaviors.iter().position(|behavior| behavior.claims(&parsed.type_def)) else {
            if debug_enabled() {
                eprintln!(
                    "[discover] no kind claims type {:?} ({:?}) for entry {}; skipping",
                    parsed.type_def.value, parsed.type_def.kind, raw.id
                );
            }
            continue;
        };

        let record = EntryRecord::new(EntryId::new(raw.id.clone()), parsed, raw.text.clone(), ctx.horizon);
        if debug_enabled() {
            eprintln!("[discover] {} claimed by kind {}", record.label(), behaviors[kind].kind());
        }
        ctx.cells.push(EntryCell { kind, record, view: MatchView::default() });
    }
}

/// Run per-entry validators; issues remove the entry and feed the report.
pub(crate) fn validate(ctx: &mut TurnContext, behaviors: &[Box<dyn EntryBehavior>]) {
    let mut kept = Vec::with_capacity(ctx.cells.len());
    for cell in ctx.cells.drain(..) {
        let issues = behaviors[cell.kind].validate(&cell.record);
        if issues.is_empty() {
            kept.push(cell);
        } else {
            if debug_enabled() {
                eprintln!("[validate] {} blocked: {:?}", cell.record.label(), issues);
            }
            ctx.report.push(cell.record.label(), issues);
        }
    }
    ctx.cells = kept;
}
