//! Scoring and winner selection.
//!
//! Per source: clamp every surviving candidate's score, discard zero
//! weights, then draw a weight-proportional randomized order and walk it
//! through the post-rules. The first accepted candidate wins the source -
//! except `implicit`, which admits several winners bounded to one per entry
//! kind and skips entries already used for any other source.
//!
//! Sources resolve in a fixed order: history depths newest to oldest, then
//! implicitRef, frontMemory, authorsNote, playerMemory, implicit. Post-rules
//! can only see winners of sources resolved earlier in that order.

use std::collections::HashSet;

use rand::Rng;

use super::context::{EntryCell, TurnContext, cell_of};
use super::debug_enabled;
use super::roulette::Roulette;
use crate::api::TurnInput;
use crate::entries::{EntryBehavior, KeywordScan, PostRuleContext, ScoreParams, Winner};
use crate::history::HistoryStep;
use crate::Source;

pub(crate) fn run<R: Rng>(
    ctx: &mut TurnContext,
    behaviors: &[Box<dyn EntryBehavior>],
    input: &TurnInput<'_>,
    rng: &mut R,
) {
    score_candidates(ctx, behaviors, input);

    let order = resolution_order(ctx);
    for source in order {
        let Some(scored) = ctx.scores.get(&source) else { continue };
        let pool: Vec<(f64, crate::EntryId)> = scored.iter().map(|(id, s)| (*s, id.clone())).collect();
        let scored = scored.clone();

        let mut kinds_taken: HashSet<&'static str> = HashSet::new();
        let implicit = source == Source::Implicit;

        for (score, id) in Roulette::new(pool, &mut *rng) {
            let cell = cell_of(&ctx.cells, &id);
            let behavior = &behaviors[cell.kind];

            if implicit {
                if ctx.winners.iter().any(|winner| winner.entry == id) {
                    continue;
                }
                if kinds_taken.contains(behavior.kind()) {
                    continue;
                }
            }

            let probe = PostRuleContext {
                record: &cell.record,
                source: &source,
                score,
                neighbors: &scored,
                winners: &ctx.winners,
            };
            if !behavior.post_rule(&probe) {
                continue;
            }

            if debug_enabled() {
                eprintln!("[select] {} -> {} (score {score:.1})", source, id);
            }
            ctx.winners.push(Winner { entry: id, source: source.clone(), score });
            if implicit {
                kinds_taken.insert(behavior.kind());
            } else {
                break;
            }
        }
    }
}

/// Score every candidate of every source; zero weights are dropped here so
/// the roulette never sees them.
fn score_candidates(ctx: &mut TurnContext, behaviors: &[Box<dyn EntryBehavior>], input: &TurnInput<'_>) {
    let TurnContext { cells, window, candidates, scores, .. } = ctx;

    for (source, ids) in candidates.iter() {
        let mut scored = Vec::with_capacity(ids.len());
        for id in ids {
            let cell = cell_of(cells, id);
            let behavior = &behaviors[cell.kind];
            let scan = match source_text(cells, window, input, source) {
                Some(text) => cell.view.scan(source, text),
                None => KeywordScan::default(),
            };
            let params = ScoreParams {
                source,
                record: &cell.record,
                scan,
                base_scalar: behavior.base_scalar(&cell.record, source),
            };
            let score = behavior.score(&params).clamp(0.0, 1000.0);
            if score > 0.0 {
                scored.push((id.clone(), score));
            } else if debug_enabled() {
                eprintln!("[score] {} <- {} discarded at zero weight", source, id);
            }
        }
        if !scored.is_empty() {
            scores.insert(source.clone(), scored);
        }
    }
}

/// The text a source offers, identical to the association stage's mapping.
fn source_text<'a>(
    cells: &'a [EntryCell],
    window: &'a [HistoryStep],
    input: &TurnInput<'a>,
    source: &Source,
) -> Option<&'a str> {
    match source {
        Source::History(depth) => window.get(*depth).map(|step| step.text.as_str()),
        Source::PlayerMemory => input.player_memory,
        Source::ImplicitRef(id) => Some(cell_of(cells, id).record.text.as_str()),
        Source::Implicit | Source::AuthorsNote | Source::FrontMemory => {
            window.first().map(|step| step.text.as_str())
        }
    }
}

/// History newest to oldest, implicitRef, frontMemory, authorsNote,
/// playerMemory, implicit.
fn resolution_order(ctx: &TurnContext) -> Vec<Source> {
    let mut order: Vec<Source> = (0..ctx.window.len()).map(Source::History).collect();
    order.extend(ctx.scores.keys().filter(|source| matches!(source, Source::ImplicitRef(_))).cloned());
    order.push(Source::FrontMemory);
    order.push(Source::AuthorsNote);
    order.push(Source::PlayerMemory);
    order.push(Source::Implicit);
    order
}
