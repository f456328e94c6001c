//! Rules engine for the galaxy dice duel.
//!
//! Everything here is synchronous and owned by a single room: the static
//! catalog, the [`Die`] value object, the [`Game`] phase machine with its
//! ability hooks and damage pipeline, and the bounded [`EffectJournal`].
//!
//! # Key types
//!
//! - [`Game`]: one duel; every intent is a method returning `Result`
//! - [`CharacterId`] / [`AuroraDieId`]: closed catalog identities
//! - [`EffectJournal`]: presentation-only log of resolved effects
//! - [`GameView`]: the serializable snapshot sent to clients

mod abilities;
mod catalog;
mod dice;
mod error;
mod game;
mod id;
mod journal;
mod resolve;
mod view;

pub use abilities::{
    ASCEND_TRIGGER_COUNT, GROWTH_HIT, LEGACY_HP_THRESHOLD, REPEATER_REQUIRED_FOURS,
    RETALIATION_DAMAGE, RETALIATION_MAX_HIT,
};
pub use catalog::{
    aurora_summaries, character_summaries, AuroraDie, AuroraDieId, AuroraSummary, Character,
    CharacterId, CharacterSummary, Face,
};
pub use dice::{check_distinct, check_selection, roll_pool, sort_dice, upgrade_side, Die, DieOrigin};
pub use error::{EngineError, ErrorCategory};
pub use game::{Combatant, Game, GameConfig, GameStatus, Loadout, Phase, Role, Seat};
pub use id::PlayerId;
pub use journal::{EffectEvent, EffectJournal, JournalEntry, DEFAULT_JOURNAL_CAPACITY};
pub use resolve::{apply_guard, compute_hits};
pub use view::{CombatantView, GameView};
