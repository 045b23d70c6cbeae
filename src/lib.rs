extern crate self as loreweave;

use serde::{Deserialize, Serialize};

#[macro_use]
mod macros;
mod api;
mod cache;
mod engine;
mod entries;
mod history;
mod model;
mod parse;
mod report;

pub use api::{ContextItem, EngineConfig, RawEntry, TurnInput, TurnOutcome, TurnReport, process_turn};
pub use cache::{EntryShadow, MemoryTurnCache, TurnCache, TurnSnapshot, WinnerRecord};
pub use engine::{Roulette, StateEngine};
pub use entries::{
    AssocParams, EntryBehavior, EntryRecord, KeywordScan, MatchView, PostRuleContext, PreRuleContext, RefTarget,
    ScoreParams, Winner, builtin_kinds, defaults,
};
pub use history::{HistoryOrigin, HistoryStep, HistoryView, VecHistory};
pub use model::{
    EntryTypeDef, KeywordDef, KeywordMode, MatcherDef, ParsedEntryData, RelatableEntry, RelationDef, RelationMode,
    TypeKind, UsedTopics,
};
pub use parse::{EntryField, ParseError, ParseSession};
pub use report::{EntryIssues, ValidationReport};

// --- Shared vocabulary -------------------------------------------------------

/// Identifier of an entry, taken verbatim from the raw input item.
///
/// Ids do not survive a turn: at the end of each turn the entry table is
/// serialized to plain records and fresh entries are rebuilt from them (via
/// the parser) on the next turn.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(String);

impl EntryId {
    pub fn new(id: impl Into<String>) -> Self {
        EntryId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntryId {
    fn from(id: &str) -> Self {
        EntryId::new(id)
    }
}

impl From<String> for EntryId {
    fn from(id: String) -> Self {
        EntryId::new(id)
    }
}

/// A context injection point an entry can be associated with for one turn.
///
/// `History(0)` is the most recent turn; larger depths are older. The
/// `ImplicitRef` variant carries the id of the implicitly-included entry the
/// association refers to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Source {
    Implicit,
    PlayerMemory,
    AuthorsNote,
    FrontMemory,
    ImplicitRef(EntryId),
    History(usize),
}

impl Source {
    /// The coarse category of this source, used against `SourceKinds` masks.
    pub fn kind(&self) -> SourceKinds {
        match self {
            Source::Implicit => SourceKinds::IMPLICIT,
            Source::PlayerMemory => SourceKinds::PLAYER_MEMORY,
            Source::AuthorsNote => SourceKinds::AUTHORS_NOTE,
            Source::FrontMemory => SourceKinds::FRONT_MEMORY,
            Source::ImplicitRef(_) => SourceKinds::IMPLICIT_REF,
            Source::History(_) => SourceKinds::HISTORY,
        }
    }

    pub fn is_history(&self) -> bool {
        matches!(self, Source::History(_))
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Source::Implicit => write!(f, "implicit"),
            Source::PlayerMemory => write!(f, "playerMemory"),
            Source::AuthorsNote => write!(f, "authorsNote"),
            Source::FrontMemory => write!(f, "frontMemory"),
            Source::ImplicitRef(id) => write!(f, "implicitRef({id})"),
            Source::History(depth) => write!(f, "history({depth})"),
        }
    }
}

bitflags::bitflags! {
    /// Coarse source categories an entry kind can ever match.
    ///
    /// Entry kinds declare a mask via `EntryBehavior::target_sources`; the
    /// association stage only offers a source to an entry when the source's
    /// category is in the mask.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SourceKinds: u8 {
        const IMPLICIT      = 1 << 0;
        const PLAYER_MEMORY = 1 << 1;
        const AUTHORS_NOTE  = 1 << 2;
        const FRONT_MEMORY  = 1 << 3;
        const IMPLICIT_REF  = 1 << 4;
        const HISTORY       = 1 << 5;
    }
}

impl SourceKinds {
    /// The targets assumed when a kind leaves `target_sources` unspecified.
    pub fn unspecified_default() -> Self {
        SourceKinds::IMPLICIT_REF | SourceKinds::PLAYER_MEMORY | SourceKinds::HISTORY
    }
}
