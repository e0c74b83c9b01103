//! The authoritative rules engine.
//!
//! Implements the game's canonical state machine:
//! - Token custody and the mint-provenance chain
//! - Experience and leveling
//! - Alliance registry
//! - Challenge and battle resolution
//! - Peer-to-peer trading
//! - Territory control with reputation-gated contestation
//! - Anti-spam messaging with an escalating fee schedule
//!
//! All state lives in one [`Engine`] aggregate behind a single mutation entry
//! point; operations run to completion and either fully commit or fail with
//! no effect.

mod alliance;
mod battle;
mod custody;
mod events;
mod invariants;
mod leveling;
mod messaging;
mod state;
mod territory;
mod trade;

pub use alliance::{Alliance, AllianceId, AllianceRegistry, FIRST_ALLIANCE_ID};
pub use battle::{
    battle_power, Challenge, ChallengeBook, ChallengeId, ChallengeStatus, COMMANDER_POWER_BONUS,
    POWER_PER_LEVEL, VETERAN_POWER_BONUS,
};
pub use custody::{BlockHeight, ChainLink, TokenId, TokenLedger};
pub use events::EngineEvent;
pub use invariants::{assert_invariants, check_invariants, InvariantViolation};
pub use leveling::{
    LevelInfo, LevelLedger, CHALLENGE_LOSS_XP, CHALLENGE_WIN_XP, REPUTATION_XP_SCALE,
    TERRITORY_XP, XP_PER_LEVEL,
};
pub use messaging::{Message, MessageLog, BASE_MSG_FEE, MAX_MSG_LEN, MSG_COOLDOWN_BLOCKS};
pub use state::Engine;
pub use territory::{
    PlayerStats, TerritoryId, TerritoryLedger, TerritorySlot, CONTEST_REPUTATION_MARGIN,
    NUM_TERRITORIES, TERRITORY_COOLDOWN_BLOCKS,
};
pub use trade::TradeBook;
