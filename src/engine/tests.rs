use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::api::{EngineConfig, RawEntry, TurnInput, TurnOutcome};
use crate::cache::{MemoryTurnCache, TurnCache};
use crate::engine::StateEngine;
use crate::history::VecHistory;

fn run_turn(entries: &[RawEntry], history: &VecHistory, seed: u64) -> (TurnOutcome, MemoryTurnCache, StateEngine) {
    let engine = StateEngine::new(EngineConfig::default());
    let mut cache = MemoryTurnCache::new();
    let mut rng = StdRng::seed_from_u64(seed);
    let input = TurnInput::new(1, entries, history);
    let outcome = engine.process_turn_with(&mut rng, &input, &mut cache);
    (outcome, cache, engine)
}

#[test]
fn keyword_entry_associates_and_wins_its_history_depth() {
    let entries = vec![RawEntry::new("bob", "$Npc[Bob](bob; +friend)", "Bob runs the tavern.")];
    let history = VecHistory::player(["Bob waved at his friend."]);

    let (outcome, _, _) = run_turn(&entries, &history, 1);
    let report = outcome.report().expect("turn should complete");
    assert_eq!(report.history_items.len(), 1);

    let (depth, item) = &report.history_items[0];
    assert_eq!(*depth, 0);
    assert_eq!(item.entry.as_str(), "bob");
    // Two distinct keywords matched once each: 10 × (2 + 0) × (0 + 1).
    assert_eq!(item.score, 20.0);
}

#[test]
fn unrelated_text_means_no_association_at_all() {
    let entries = vec![RawEntry::new("bob", "$Npc[Bob](bob; +friend)", "Bob runs the tavern.")];
    let history = VecHistory::player(["The desert stretched for miles."]);

    let (outcome, _, _) = run_turn(&entries, &history, 1);
    let report = outcome.report().expect("turn should complete");
    assert!(report.history_items.is_empty());
    assert!(report.context_items.is_empty());
}

#[test]
fn negated_topic_vetoes_every_depth_in_range() {
    // "graveyard" owns the topic "dead" and matches depth 1, so "dead" is a
    // used topic inside every later entry's query window.
    let entries = vec![
        RawEntry::new("graveyard", "$Lore[dead](graveyard)", "The graveyard lies north."),
        RawEntry::new("ghost", "$Lore(ghost; !dead)", "A ghost haunts the road."),
    ];
    // "dead" is recorded at the oldest depth, so it sits inside the query
    // window of every shallower ghost association.
    let history = VecHistory::player(["A ghost drifts past.", "A ghost again.", "They walk through the graveyard."]);

    for seed in 0..8 {
        let (outcome, _, _) = run_turn(&entries, &history, seed);
        let report = outcome.report().expect("turn should complete");
        for (_, item) in &report.history_items {
            assert_ne!(item.entry.as_str(), "ghost", "the negated relation must veto the ghost entry");
        }
    }
}

#[test]
fn later_entries_see_topics_recorded_by_earlier_ones() {
    // "dragon" references the topic "Cave", so it sorts after the cave
    // entry and its at-least-one relation sees the cave's recorded topic.
    let entries = vec![
        RawEntry::new("cave", "$Lore[Cave](cave)", "The cave is deep."),
        RawEntry::new("dragon", "$Npc[Dragon](dragon; ?Cave)", "The dragon hoards gold."),
    ];
    let history = VecHistory::player(["A dragon sleeps in the cave."]);

    let (outcome, _, _) = run_turn(&entries, &history, 3);
    let report = outcome.report().expect("turn should complete");
    let (_, item) = &report.history_items[0];
    // Both candidates scored: cave at 10, dragon at 10 × 1 × (1 + 1) = 20.
    if item.entry.as_str() == "dragon" {
        assert_eq!(item.score, 20.0);
    }

    // Reversing the input order must not change the outcome space: the
    // dependency sort, not input order, decides who records topics first.
    let reversed: Vec<RawEntry> = entries.iter().rev().cloned().collect();
    let (outcome, _, _) = run_turn(&reversed, &history, 3);
    assert!(outcome.report().is_some());
}

#[test]
fn matcherless_entry_inherits_from_a_unique_donor() {
    let entries = vec![
        RawEntry::new("donor", "$Lore[Cave](cavern)", "Stalactites everywhere."),
        RawEntry::new("bare", "$Lore[Cave]", "The cave smells of sulfur."),
    ];
    let history = VecHistory::player(["The cavern opens up ahead."]);

    let (outcome, _, _) = run_turn(&entries, &history, 5);
    let report = outcome.report().expect("turn should complete");
    // Both entries carry the "cavern" keyword after the modifier pass, so
    // both compete for depth 0 and one of them wins it.
    assert_eq!(report.history_items.len(), 1);
}

#[test]
fn two_donors_block_inheritance() {
    let entries = vec![
        RawEntry::new("donor_a", "$Lore[Cave](cavern)", "Stalactites."),
        RawEntry::new("donor_b", "$Lore[Cave](grotto)", "Shallow pools."),
        RawEntry::new("bare", "$Lore[Cave]", "Sulfur."),
    ];
    let history = VecHistory::player(["The sulfur smell is unbearable."]);

    for seed in 0..8 {
        let (outcome, _, _) = run_turn(&entries, &history, seed);
        let report = outcome.report().expect("turn should complete");
        // Nobody matches "sulfur": the bare entry stayed matcher-less and
        // cannot associate, and neither donor's keyword occurs.
        assert!(report.history_items.is_empty(), "bare entry must not inherit with two donors");
    }
}

#[test]
fn implicit_admits_at_most_one_winner_per_kind() {
    let entries = vec![
        RawEntry::new("storm", "$State[Storm](storm)", "A storm rages."),
        RawEntry::new("wind", "$State[Wind](storm)", "The wind howls."),
        RawEntry::new("rain", "$State[Rain](storm)", "Rain hammers the roof."),
    ];
    let history = VecHistory::player(["The storm grows stronger."]);

    for seed in 0..16 {
        let (outcome, _, _) = run_turn(&entries, &history, seed);
        let report = outcome.report().expect("turn should complete");
        // All three are implicit candidates of the same kind; regardless of
        // the draw order only one may occupy the implicit group.
        assert!(report.context_items.len() <= 1, "seed {seed} selected {}", report.context_items.len());
    }
}

#[test]
fn implicit_ref_rides_along_with_an_implicit_winner() {
    let entries = vec![
        RawEntry::new("storm", "$State[Storm](storm)", "Lightning storm rages over the coast."),
        RawEntry::new("lightning", "$Lore(lightning)", "Lightning splits the old oak."),
    ];
    let history = VecHistory::player(["The storm grows stronger."]);

    let (outcome, _, _) = run_turn(&entries, &history, 2);
    let report = outcome.report().expect("turn should complete");
    // The lore entry's keyword hits the storm entry's body text, so it
    // joins the free-form group through its implicitRef association.
    assert!(report.context_items.iter().any(|item| item.entry.as_str() == "lightning"));
}

#[test]
fn scene_directive_takes_front_memory_when_its_topic_is_in_play() {
    let entries = vec![
        RawEntry::new("cave", "$Lore[Cave](cave)", "The cave is deep."),
        RawEntry::new("mood", "$Scene[Cave](cave)", "Write the cave as oppressive and close."),
    ];
    let history = VecHistory::player(["They enter the cave."]);

    let (outcome, _, _) = run_turn(&entries, &history, 4);
    let report = outcome.report().expect("turn should complete");
    let front = report.front_memory.as_ref().expect("scene should win front memory");
    assert_eq!(front.entry.as_str(), "mood");
}

#[test]
fn externally_set_slots_are_not_competed_for() {
    let entries = vec![RawEntry::new("mood", "$Scene[Cave](cave)", "Oppressive.")];
    let history = VecHistory::player(["They enter the cave."]);

    let engine = StateEngine::new(EngineConfig::default());
    let mut cache = MemoryTurnCache::new();
    let mut rng = StdRng::seed_from_u64(1);
    let input = TurnInput::new(1, &entries, &history).with_front_memory("already set by the author");
    let outcome = engine.process_turn_with(&mut rng, &input, &mut cache);

    let report = outcome.report().expect("turn should complete");
    assert!(report.front_memory.is_none());
}

#[test]
fn validation_issues_block_the_turn_and_skip_the_cache_write() {
    let entries = vec![RawEntry::new("alice", "$Player[Alice & Bob](alice)", "Alice.")];
    let history = VecHistory::player(["Alice waves."]);

    let (outcome, cache, engine) = run_turn(&entries, &history, 1);
    let TurnOutcome::Blocked(report) = outcome else { panic!("turn should be blocked") };
    assert_eq!(report.issue_count(), 1);
    assert!(report.items[0].label.contains("alice"));
    assert!(cache.read(engine.cache_key()).is_none(), "a blocked turn must not write the cache");
}

#[test]
fn parse_errors_surface_with_field_and_location() {
    let entries = vec![RawEntry::new("broken", "$Npc[Bob", "Bob.")];
    let history = VecHistory::player(["Anything."]);

    let (outcome, _, _) = run_turn(&entries, &history, 1);
    let TurnOutcome::Blocked(report) = outcome else { panic!("turn should be blocked") };
    let issue = &report.items[0].issues[0];
    assert!(issue.contains("topics"), "issue should name the field: {issue}");
    assert!(issue.contains("line 1"), "issue should carry a location: {issue}");
    assert!(issue.contains("closing `]`"), "issue should list expected tokens: {issue}");
}

#[test]
fn a_completed_turn_writes_one_snapshot() {
    let entries = vec![
        RawEntry::new("bob", "$Npc[Bob](bob)", "Bob."),
        RawEntry::new("plain", "cave, dragon", "A vanilla entry."),
    ];
    let history = VecHistory::player(["Bob enters."]);

    let (outcome, cache, engine) = run_turn(&entries, &history, 1);
    assert!(!outcome.is_blocked());

    let snapshot = cache.read(engine.cache_key()).expect("completed turn must write the cache");
    assert_eq!(snapshot.turn, 1);
    // The whole surviving table is shadowed, winners or not.
    assert_eq!(snapshot.entries.len(), 2);
    assert!(!snapshot.winners.is_empty());
}

#[test]
fn kind_mismatches_are_skipped_silently() {
    let entries = vec![RawEntry::new("odd", "$Gizmo[Whatever](gizmo)", "Not a registered kind.")];
    let history = VecHistory::player(["gizmo gizmo gizmo"]);

    let (outcome, _, _) = run_turn(&entries, &history, 1);
    let report = outcome.report().expect("a kind mismatch must not block the turn");
    assert!(report.history_items.is_empty());
}

#[test]
fn player_memory_needs_an_include_keyword_to_match() {
    let entries = vec![
        RawEntry::new("alice", "$Player[Alice](alice)", "Alice, a wandering scholar."),
        RawEntry::new("mood", "$Lore(-gloom)", "Only an exclude keyword."),
    ];
    let history = VecHistory::player(["A quiet morning."]);

    let engine = StateEngine::new(EngineConfig::default());
    let mut cache = MemoryTurnCache::new();
    let mut rng = StdRng::seed_from_u64(6);
    let input = TurnInput::new(1, &entries, &history).with_player_memory("I am Alice.");
    let outcome = engine.process_turn_with(&mut rng, &input, &mut cache);

    let report = outcome.report().expect("turn should complete");
    let in_context: Vec<&str> = report.context_items.iter().map(|item| item.entry.as_str()).collect();
    assert!(in_context.contains(&"alice"), "player sheet should ride player memory: {in_context:?}");
    assert!(!in_context.contains(&"mood"));
}
