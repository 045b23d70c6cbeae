//! Association/selection engine.
//!
//! This module is the *public entry point* for the per-turn pipeline. The
//! pipeline is a strictly ordered state machine with no retries; the only
//! way out early is the validation block.
//!
//! ## How the parts work together
//!
//! ```text
//! raw entries ── discover ──┐ parser chain + kind claims   (discover.rs)
//!                           │
//!                 validate ─┼─ issues? ⇒ blocked turn, no cache write
//!                           │
//!              cross-modify ┼─ one self-mutation pass      (order.rs)
//!              order & wrap ┼─ dependency sort + match views
//!                           v
//!                 associate ── entries × sources,          (associate.rs)
//!                           │  history hits feed UsedTopics
//!                 pre-rules ┼─ drop single associations    (rules.rs)
//!                           v
//!            score & select ── roulette per source,        (select.rs,
//!                           │  fixed resolution order       roulette.rs)
//!               materialize ── output groups + snapshot    (materialize.rs)
//! ```
//!
//! Each stage owns one concern; the [`TurnContext`] (context.rs) is the only
//! state they share, created fresh per turn and discarded at the end. The
//! engine is single-threaded and synchronous: one turn runs start to finish
//! before the next begins, and nothing suspends mid-pipeline.
//!
//! ## Responsibilities by module
//!
//! - `context.rs`: the per-turn working state and the loud missing-entry
//!   lookup.
//! - `discover.rs`: parser chain, kind claims, validators.
//! - `order.rs`: modifier pass, dependency sort, match-view wrapping.
//! - `associate.rs`: the entry × source cross-product.
//! - `rules.rs`: pre-rule neighbor probes.
//! - `select.rs`: scoring, roulette draws, post-rule winner resolution.
//! - `materialize.rs`: output groups, topic-family clustering, snapshot.
//! - `roulette.rs`: reusable weighted sampling without replacement.
//!
//! ## Debugging
//!
//! Set `LOREWEAVE_DEBUG_ENGINE=1` to print stage-by-stage traces.

#[path = "engine/associate.rs"]
mod associate;
#[path = "engine/context.rs"]
mod context;
#[path = "engine/discover.rs"]
mod discover;
#[path = "engine/materialize.rs"]
mod materialize;
#[path = "engine/order.rs"]
mod order;
#[path = "engine/roulette.rs"]
mod roulette;
#[path = "engine/rules.rs"]
mod rules;
#[path = "engine/select.rs"]
mod select;

#[cfg(test)]
#[path = "engine/tests.rs"]
mod tests;

pub use roulette::Roulette;

use rand::Rng;

use crate::api::{EngineConfig, TurnInput, TurnOutcome};
use crate::cache::TurnCache;
use crate::entries::{EntryBehavior, builtin_kinds};
use crate::history;
use context::TurnContext;

pub(crate) fn debug_enabled() -> bool {
    std::env::var_os("LOREWEAVE_DEBUG_ENGINE").is_some()
}

/// The engine: a kind registry plus configuration, reusable across turns.
///
/// All per-turn state lives in the turn's own context; the engine itself is
/// immutable while processing, so one instance can serve turn after turn.
pub struct StateEngine {
    config: EngineConfig,
    behaviors: Vec<Box<dyn EntryBehavior>>,
    cache_key: String,
}

impl StateEngine {
    /// An engine with the built-in kinds.
    pub fn new(config: EngineConfig) -> Self {
        Self::with_kinds(config, builtin_kinds())
    }

    /// An engine with a custom kind registry. Claim order follows the
    /// registry order.
    pub fn with_kinds(config: EngineConfig, behaviors: Vec<Box<dyn EntryBehavior>>) -> Self {
        StateEngine { config, behaviors, cache_key: "loreweave/turn".to_string() }
    }

    /// Override the fixed cache key this engine instance writes under.
    pub fn with_cache_key(mut self, key: impl Into<String>) -> Self {
        self.cache_key = key.into();
        self
    }

    pub fn cache_key(&self) -> &str {
        &self.cache_key
    }

    /// Process one turn with ambient randomness.
    pub fn process_turn(&self, input: &TurnInput<'_>, cache: &mut dyn TurnCache) -> TurnOutcome {
        self.process_turn_with(&mut rand::thread_rng(), input, cache)
    }

    /// Process one turn with a caller-supplied random source.
    ///
    /// Selection order is only deterministic where the weights force it
    /// (a single candidate, or zero weights everywhere else); a seeded rng
    /// pins the rest down for tests.
    pub fn process_turn_with<R: Rng>(
        &self,
        rng: &mut R,
        input: &TurnInput<'_>,
        cache: &mut dyn TurnCache,
    ) -> TurnOutcome {
        let mut ctx = TurnContext::new(self.config.entry_count);

        discover::run(&mut ctx, &self.behaviors, input);
        discover::validate(&mut ctx, &self.behaviors);
        if !ctx.report.is_empty() {
            // A blocked turn must not write the cache: the previous turn's
            // snapshot stays the latest valid state.
            if debug_enabled() {
                eprintln!("[engine] turn {} blocked with {} issue(s)", input.turn, ctx.report.issue_count());
            }
            return TurnOutcome::Blocked(ctx.report);
        }

        order::cross_modify(&mut ctx, &self.behaviors);
        ctx.window = history::materialize(input.history, self.config.entry_count);
        order::sort_for_processing(&mut ctx);
        order::wrap(&mut ctx);

        associate::run(&mut ctx, &self.behaviors, input);
        rules::apply_pre_rules(&mut ctx, &self.behaviors);
        select::run(&mut ctx, &self.behaviors, input, rng);

        let (report, snapshot) = materialize::run(&ctx, &self.behaviors, input.turn);
        cache.write(&self.cache_key, snapshot);
        TurnOutcome::Completed(report)
    }
}
