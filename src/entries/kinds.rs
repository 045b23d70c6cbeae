//! The built-in entry kinds.
//!
//! Each kind is a stateless unit struct implementing [`EntryBehavior`];
//! kinds that only deviate partially from the defaults call back into
//! [`defaults`] for the shared pieces. Registration order matters: the
//! discovery stage hands an entry to the first kind that claims its parsed
//! type.

use super::defaults;
use super::{EntryBehavior, EntryRecord, PostRuleContext, PreRuleContext};
use crate::model::{EntryTypeDef, RelationDef, RelationMode, TypeKind};
use crate::{Source, SourceKinds};

/// Kinds registered out of the box, in claim order.
pub fn builtin_kinds() -> Vec<Box<dyn EntryBehavior>> {
    vec![
        Box::new(PlayerKind),
        Box::new(NpcKind),
        Box::new(SceneKind),
        Box::new(LoreKind),
        Box::new(StateKind),
        Box::new(DirectionKind),
        Box::new(VanillaKind),
    ]
}

/// Plain entries with no entry-language marker: keyword-driven, default
/// behavior throughout.
pub struct VanillaKind;

impl EntryBehavior for VanillaKind {
    fn kind(&self) -> &'static str {
        "Vanilla"
    }

    fn claims(&self, type_def: &EntryTypeDef) -> bool {
        type_def.kind == TypeKind::Vanilla
    }
}

/// `$Player` - the player's character sheet. Lives in player memory first;
/// a single primary topic names the character.
pub struct PlayerKind;

impl EntryBehavior for PlayerKind {
    fn kind(&self) -> &'static str {
        "Player"
    }

    fn target_sources(&self) -> Option<SourceKinds> {
        Some(SourceKinds::PLAYER_MEMORY | SourceKinds::HISTORY | SourceKinds::IMPLICIT)
    }

    fn priority(&self) -> Option<i32> {
        Some(30)
    }

    fn validate(&self, record: &EntryRecord) -> Vec<String> {
        let mut issues = Vec::new();
        if record.topics.len() > 1 {
            issues.push(format!(
                "player entries take a single topic naming the character, this one has {}",
                record.topics.len()
            ));
        }
        issues
    }

    fn base_scalar(&self, _record: &EntryRecord, source: &Source) -> f64 {
        match source {
            Source::PlayerMemory => 1.5,
            _ => 1.0,
        }
    }
}

/// `$Npc` - a non-player character sheet. The first topic is the
/// character's name and is required.
pub struct NpcKind;

impl EntryBehavior for NpcKind {
    fn kind(&self) -> &'static str {
        "Npc"
    }

    fn validate(&self, record: &EntryRecord) -> Vec<String> {
        let mut issues = Vec::new();
        if record.topics.is_empty() {
            issues.push("character entries need a topic naming the character".to_string());
        }
        issues
    }
}

/// `$Scene` - a scene directive. Matcher-less scene entries inherit from a
/// unique topic sibling, and every scene topic implies an all-of relation:
/// the directive applies while its subject is in play.
pub struct SceneKind;

impl EntryBehavior for SceneKind {
    fn kind(&self) -> &'static str {
        "Scene"
    }

    fn target_sources(&self) -> Option<SourceKinds> {
        Some(SourceKinds::FRONT_MEMORY | SourceKinds::HISTORY)
    }

    fn modify(&self, record: &mut EntryRecord, siblings: &[EntryRecord]) {
        defaults::inherit_matchers(record, siblings);
        for topic in record.topics.clone() {
            let implied = record.relations().iter().any(|relation| relation.topic == topic);
            if !implied {
                record.push_relation(RelationDef::new(RelationMode::AllOf, topic));
            }
        }
    }
}

/// `$Lore` - world facts. Default targets (implicitRef, playerMemory,
/// history); the pre-rule keeps only the newest history association per
/// entry so one fact does not occupy several depths.
pub struct LoreKind;

impl EntryBehavior for LoreKind {
    fn kind(&self) -> &'static str {
        "Lore"
    }

    fn pre_rule(&self, ctx: &PreRuleContext<'_>) -> bool {
        if !ctx.source.is_history() {
            return true;
        }
        // A shallower association of the same entry exists: drop this one.
        !ctx.after().iter().any(|(_, id)| **id == ctx.record.id)
    }
}

/// `$State` - transient world state. High priority, boosted when pushed to
/// the front of context; only occupies the implicit slot when something it
/// tracks is actually on screen.
pub struct StateKind;

impl EntryBehavior for StateKind {
    fn kind(&self) -> &'static str {
        "State"
    }

    fn target_sources(&self) -> Option<SourceKinds> {
        Some(SourceKinds::FRONT_MEMORY | SourceKinds::HISTORY | SourceKinds::IMPLICIT)
    }

    fn priority(&self) -> Option<i32> {
        Some(100)
    }

    fn base_scalar(&self, _record: &EntryRecord, source: &Source) -> f64 {
        match source {
            Source::FrontMemory | Source::Implicit => 1.25,
            _ => 1.0,
        }
    }

    fn post_rule(&self, ctx: &PostRuleContext<'_>) -> bool {
        if *ctx.source != Source::Implicit || ctx.record.relatable().is_trivial() {
            return true;
        }
        // Implicit resolves last, so every other winner is visible here: the
        // state either matched its tracked topics somewhere in the window, or
        // it shares a depth with an already-chosen history winner.
        let tracked_in_play =
            ctx.record.relation_counts.iter().any(|(source, count)| source.is_history() && *count > 0);
        let rides_a_winner = ctx.selected().any(|winner| {
            winner.source.is_history()
                && winner.entry != ctx.record.id
                && ctx.record.relation_counts.contains_key(&winner.source)
        });
        tracked_in_play || rides_a_winner
    }
}

/// `$Direction` - author's-note directives steering the generator.
pub struct DirectionKind;

impl EntryBehavior for DirectionKind {
    fn kind(&self) -> &'static str {
        "Direction"
    }

    fn target_sources(&self) -> Option<SourceKinds> {
        Some(SourceKinds::AUTHORS_NOTE | SourceKinds::HISTORY)
    }

    fn priority(&self) -> Option<i32> {
        Some(50)
    }

    fn base_scalar(&self, _record: &EntryRecord, source: &Source) -> f64 {
        match source {
            Source::AuthorsNote => 1.5,
            _ => 1.0,
        }
    }
}
