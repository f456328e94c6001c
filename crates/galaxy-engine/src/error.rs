//! Error types for the rules engine.

use crate::game::{Phase, Role};

/// Broad classes of rejection. Every class leaves state untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Malformed input, acting out of turn or out of phase.
    Validation,
    /// An ability or aurora die condition is not met.
    AbilityPrecondition,
    /// Unknown catalog ids, missing rooms, full rooms, and similar.
    Structural,
}

/// Reasons an intent is rejected by the engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("the match is over")]
    MatchOver,

    #[error("not your turn")]
    NotYourTurn,

    #[error("action not allowed during {0}")]
    WrongPhase(Phase),

    #[error("must select exactly {expected} distinct dice, got {got}")]
    WrongSelectionCount { expected: usize, got: usize },

    #[error("die index {index} is out of range (0..{len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("die index {0} selected more than once")]
    DuplicateIndex(usize),

    #[error("live selection may hold at most {max} dice")]
    PreviewTooLarge { max: usize },

    #[error("no rerolls left this round")]
    NoRerollsLeft,

    #[error("no aurora die equipped")]
    NoAuroraEquipped,

    #[error("no aurora die uses remaining")]
    AuroraUsesExhausted,

    #[error("aurora die already used this round")]
    AuroraAlreadyUsed,

    #[error("{die} cannot be used while on {role}")]
    AuroraWrongRole { die: &'static str, role: Role },

    #[error("{die} requires HP <= {max_hp} (current {hp})")]
    AuroraHpTooHigh {
        die: &'static str,
        max_hp: i32,
        hp: i32,
    },

    #[error("{die} requires {required} selected fours (have {have})")]
    AuroraNeedsFours {
        die: &'static str,
        required: u32,
        have: u32,
    },

    #[error("unknown character: {0}")]
    UnknownCharacter(String),

    #[error("unknown aurora die: {0}")]
    UnknownAuroraDie(String),
}

impl EngineError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::MatchOver
            | Self::NotYourTurn
            | Self::WrongPhase(_)
            | Self::WrongSelectionCount { .. }
            | Self::IndexOutOfRange { .. }
            | Self::DuplicateIndex(_)
            | Self::PreviewTooLarge { .. }
            | Self::NoRerollsLeft => ErrorCategory::Validation,
            Self::NoAuroraEquipped
            | Self::AuroraUsesExhausted
            | Self::AuroraAlreadyUsed
            | Self::AuroraWrongRole { .. }
            | Self::AuroraHpTooHigh { .. }
            | Self::AuroraNeedsFours { .. } => ErrorCategory::AbilityPrecondition,
            Self::UnknownCharacter(_) | Self::UnknownAuroraDie(_) => ErrorCategory::Structural,
        }
    }
}
