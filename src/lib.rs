// Allow unwrap and unreadable literals in tests (test code is not production)
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::unreadable_literal))]
//! Outlast: the authoritative rules engine for a survivor-token strategy game.
//!
//! This crate provides a deterministic state machine designed for:
//! - Atomic, run-to-completion operations (commit fully or fail cleanly)
//! - Validation of every precondition before any state write
//! - Bit-exact replayability from snapshots and the event log
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │     Operation surface (Engine)      │
//! ├──────────┬──────────┬───────────────┤
//! │ Custody  │ Leveling │  Alliances    │
//! │ Battles  │ Trading  │  Territories  │
//! │ Messaging│ Events   │  Invariants   │
//! ├──────────┴──────────┴───────────────┤
//! │   Role registry (injected trait)    │
//! └─────────────────────────────────────┘
//! ```
//!
//! All relations are index lookups in one owned aggregate; there is no
//! per-entity object graph. The external identity registry is injected
//! through the [`roles::RoleRegistry`] trait.

pub mod engine;
pub mod error;
pub mod roles;
pub mod snapshot;

pub use error::{EngineError, EngineResult};

// Re-export key engine types at crate root for convenience
pub use engine::{
    Alliance, AllianceId, BlockHeight, Challenge, ChallengeId, ChallengeStatus, ChainLink, Engine,
    EngineEvent, LevelInfo, Message, PlayerStats, TerritoryId, TerritorySlot, TokenId,
};
pub use roles::{MemoryRoles, Principal, RoleId, RoleRegistry};
