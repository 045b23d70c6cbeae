//! Cross-modify, ordering and wrapping stages.
//!
//! The modifier pass gives every surviving entry exactly one shot at
//! self-mutation against read-only snapshots of its siblings. The ordering
//! pass then fixes the processing order for association: an entry whose
//! relations reference another entry's topics must be processed *after*
//! that entry, so its relation checks see the topics the earlier entry may
//! have recorded. Finally each entry is wrapped in a fresh match view so
//! matchers gained in the modifier pass are compiled too.

use super::context::TurnContext;
use super::debug_enabled;
use crate::entries::{EntryBehavior, EntryRecord, MatchView};

/// One `modify` pass per entry, with cloned sibling snapshots. Mutation is
/// confined to the entry under modification.
pub(crate) fn cross_modify(ctx: &mut TurnContext, behaviors: &[Box<dyn EntryBehavior>]) {
    let snapshots: Vec<EntryRecord> = ctx.cells.iter().map(|cell| cell.record.clone()).collect();
    for cell in &mut ctx.cells {
        behaviors[cell.kind].modify(&mut cell.record, &snapshots);
    }
}

/// Fix the processing order.
///
/// Edges run from a topic owner to every entry whose relations reference
/// one of its topics; the order is a repeated minimum selection over
/// dependency-free entries, tie-broken by relation-set size, then by how
/// many table entries the candidate references, then by id. A dependency
/// cycle falls back to the same tie-break over whatever remains.
pub(crate) fn sort_for_processing(ctx: &mut TurnContext) {
    let n = ctx.cells.len();

    // depends[i] holds every j whose topics entry i references.
    let mut depends: Vec<Vec<usize>> = vec![Vec::new(); n];
    for (i, cell) in ctx.cells.iter().enumerate() {
        let interests = cell.record.relatable().topics_of_interest();
        if interests.is_empty() {
            continue;
        }
        for (j, other) in ctx.cells.iter().enumerate() {
            if i != j && other.record.topics.iter().any(|topic| interests.contains(topic)) {
                depends[i].push(j);
            }
        }
    }

    let sort_key = |i: usize| {
        let record = &ctx.cells[i].record;
        (record.relations().len(), depends[i].len(), record.id.clone())
    };

    let mut placed = vec![false; n];
    let mut order = Vec::with_capacity(n);
    while order.len() < n {
        let mut ready: Vec<usize> =
            (0..n).filter(|&i| !placed[i] && depends[i].iter().all(|&j| placed[j])).collect();
        if ready.is_empty() {
            // Dependency cycle: break it with the plain tie-break.
            ready = (0..n).filter(|&i| !placed[i]).collect();
        }
        let next = ready.into_iter().min_by_key(|&i| sort_key(i)).expect("at least one entry remains");
        placed[next] = true;
        order.push(next);
    }

    if debug_enabled() {
        let names: Vec<String> = order.iter().map(|&i| ctx.cells[i].record.id.to_string()).collect();
        eprintln!("[order] processing order: {names:?}");
    }
    ctx.order = order;
}

/// Compile each entry's keyword matchers into its match view.
pub(crate) fn wrap(ctx: &mut TurnContext) {
    for cell in &mut ctx.cells {
        cell.view = MatchView::compile(&cell.record.keywords);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::context::EntryCell;
    use crate::model::{ParsedEntryData, RelationDef, RelationMode};
    use crate::EntryId;

    fn cell(id: &str, topics: &[&str], relations: &[(RelationMode, &str)]) -> EntryCell {
        let parsed = ParsedEntryData {
            topics: topics.iter().map(|t| t.to_string()).collect(),
            relations: relations.iter().map(|(mode, topic)| RelationDef::new(*mode, *topic)).collect(),
            ..Default::default()
        };
        EntryCell { kind: 0, record: EntryRecord::new(EntryId::new(id), parsed, "", 20), view: MatchView::default() }
    }

    fn order_of(cells: Vec<EntryCell>) -> Vec<String> {
        let mut ctx = TurnContext::new(20);
        ctx.cells = cells;
        sort_for_processing(&mut ctx);
        ctx.order.iter().map(|&i| ctx.cells[i].record.id.to_string()).collect()
    }

    #[test]
    fn referencing_entries_sort_after_their_topic_owners() {
        let order = order_of(vec![
            cell("follower", &[], &[(RelationMode::AtLeastOne, "Cave")]),
            cell("owner", &["Cave"], &[]),
        ]);
        assert_eq!(order, vec!["owner", "follower"]);
    }

    #[test]
    fn chains_resolve_transitively() {
        let order = order_of(vec![
            cell("c", &["Gamma"], &[(RelationMode::AllOf, "Beta")]),
            cell("b", &["Beta"], &[(RelationMode::AllOf, "Alpha")]),
            cell("a", &["Alpha"], &[]),
        ]);
        assert_eq!(order, vec!["a", "b", "c"]);
    }

    #[test]
    fn ties_break_on_relation_count_then_id() {
        let order = order_of(vec![
            cell("two", &[], &[(RelationMode::AllOf, "X"), (RelationMode::AllOf, "Y")]),
            cell("zero_b", &[], &[]),
            cell("zero_a", &[], &[]),
        ]);
        assert_eq!(order, vec!["zero_a", "zero_b", "two"]);
    }

    #[test]
    fn cycles_still_produce_a_total_order() {
        let order = order_of(vec![
            cell("a", &["Alpha"], &[(RelationMode::AllOf, "Beta")]),
            cell("b", &["Beta"], &[(RelationMode::AllOf, "Alpha")]),
        ]);
        assert_eq!(order.len(), 2);
    }
}
