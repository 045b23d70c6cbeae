//! Materialization: winners to output groups, snapshot to cache.
//!
//! Winners bucket into four groups: free-form context items (implicit,
//! implicitRef and playerMemory winners), at most one front-memory item, at
//! most one author's-note item, and one item per won history depth. The
//! free-form group is ordered by priority and score, then rearranged so
//! entries from the same topic family sit next to each other - the
//! downstream generator reads related facts better as a block than
//! scattered.

use std::collections::HashSet;

use super::context::{TurnContext, cell_of};
use crate::api::{ContextItem, TurnReport};
use crate::cache::{EntryShadow, TurnSnapshot, WinnerRecord};
use crate::entries::EntryBehavior;
use crate::Source;

pub(crate) fn run(
    ctx: &TurnContext,
    behaviors: &[Box<dyn EntryBehavior>],
    turn: u64,
) -> (TurnReport, TurnSnapshot) {
    let mut free_form = Vec::new();
    let mut front_memory = None;
    let mut authors_note = None;
    let mut history_items = Vec::new();

    for winner in &ctx.winners {
        let cell = cell_of(&ctx.cells, &winner.entry);
        let item = ContextItem { entry: winner.entry.clone(), text: cell.record.text.clone(), score: winner.score };
        match &winner.source {
            Source::Implicit | Source::ImplicitRef(_) | Source::PlayerMemory => {
                let priority = behaviors[cell.kind].priority();
                free_form.push((priority, cell.record.topic_set(), item));
            }
            Source::FrontMemory => front_memory = Some(item),
            Source::AuthorsNote => authors_note = Some(item),
            Source::History(depth) => history_items.push((*depth, item)),
        }
    }

    history_items.sort_by_key(|(depth, _)| *depth);

    let report = TurnReport {
        turn,
        context_items: cluster_by_topic_family(free_form),
        front_memory,
        authors_note,
        history_items,
    };

    let snapshot = TurnSnapshot {
        turn,
        winners: ctx
            .winners
            .iter()
            .map(|winner| WinnerRecord {
                entry: winner.entry.clone(),
                source: winner.source.clone(),
                score: winner.score,
            })
            .collect(),
        entries: ctx.cells.iter().map(|cell| EntryShadow::of(&cell.record)).collect(),
    };

    (report, snapshot)
}

/// Order by (priority, score) descending, then pull topic-sharing entries up
/// next to the first member of their family.
fn cluster_by_topic_family(
    mut items: Vec<(Option<i32>, HashSet<String>, ContextItem)>,
) -> Vec<ContextItem> {
    items.sort_by(|(pa, _, ia), (pb, _, ib)| {
        pb.cmp(pa).then(ib.score.partial_cmp(&ia.score).unwrap_or(std::cmp::Ordering::Equal))
    });

    let mut arranged = Vec::with_capacity(items.len());
    while !items.is_empty() {
        let (_, mut family, seed) = items.remove(0);
        arranged.push(seed);
        loop {
            let next = items
                .iter()
                .position(|(_, topics, _)| topics.iter().any(|topic| family.contains(topic)));
            match next {
                Some(pos) => {
                    let (_, topics, item) = items.remove(pos);
                    family.extend(topics);
                    arranged.push(item);
                }
                None => break,
            }
        }
    }
    arranged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EntryId;

    fn item(id: &str, priority: Option<i32>, topics: &[&str], score: f64) -> (Option<i32>, HashSet<String>, ContextItem) {
        (
            priority,
            topics.iter().map(|t| t.to_string()).collect(),
            ContextItem { entry: EntryId::new(id), text: String::new(), score },
        )
    }

    #[test]
    fn topic_families_cluster_adjacently() {
        let arranged = cluster_by_topic_family(vec![
            item("cave_a", None, &["Cave"], 50.0),
            item("town", None, &["Town"], 40.0),
            item("cave_b", None, &["Cave", "Dragon"], 10.0),
            item("dragon", None, &["Dragon"], 5.0),
        ]);
        let ids: Vec<&str> = arranged.iter().map(|item| item.entry.as_str()).collect();
        // The Cave/Dragon family pulls together ahead of the unrelated town
        // entry, despite the town's higher individual score.
        assert_eq!(ids, vec!["cave_a", "cave_b", "dragon", "town"]);
    }

    #[test]
    fn priority_outranks_score() {
        let arranged = cluster_by_topic_family(vec![
            item("low", None, &[], 900.0),
            item("high", Some(100), &[], 1.0),
        ]);
        assert_eq!(arranged[0].entry.as_str(), "high");
    }
}
