//! Full-state snapshots.
//!
//! The engine is deterministic, so a snapshot of its ledgers is a complete
//! checkpoint: restore it, replay the same calls, get the same state. The
//! role registry is an external collaborator and is not part of the
//! snapshot; a registry is re-injected on restore.
//!
//! Snapshots serialize to pretty JSON for operator tooling.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::engine::{
    AllianceRegistry, BlockHeight, ChallengeBook, Engine, EngineEvent, LevelLedger, MessageLog,
    TerritoryLedger, TokenLedger, TradeBook,
};
use crate::roles::{Principal, RoleRegistry};

/// A complete checkpoint of engine state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Block height at capture time.
    pub height: BlockHeight,
    /// Principal holding mint authority.
    pub root: Principal,
    /// Token owners, payloads, and provenance chain.
    pub tokens: TokenLedger,
    /// Per-token level and XP.
    pub levels: LevelLedger,
    /// Alliances and membership index.
    pub alliances: AllianceRegistry,
    /// All challenges ever issued.
    pub challenges: ChallengeBook,
    /// Active trade proposals.
    pub trades: TradeBook,
    /// The fixed territory array.
    pub territories: TerritoryLedger,
    /// Per-token message logs.
    pub messages: MessageLog,
    /// Committed events in submission order.
    pub events: Vec<EngineEvent>,
    /// Idempotency tokens consumed by role issuance.
    pub used_role_uids: BTreeSet<u64>,
}

impl Snapshot {
    /// Capture the current state of an engine.
    #[must_use]
    pub fn capture<R: RoleRegistry>(engine: &Engine<R>) -> Self {
        Self {
            height: engine.height,
            root: engine.root,
            tokens: engine.tokens.clone(),
            levels: engine.levels.clone(),
            alliances: engine.alliances.clone(),
            challenges: engine.challenges.clone(),
            trades: engine.trades.clone(),
            territories: engine.territories.clone(),
            messages: engine.messages.clone(),
            events: engine.events.clone(),
            used_role_uids: engine.used_role_uids.clone(),
        }
    }

    /// Rebuild an engine from this snapshot with a freshly injected registry.
    #[must_use]
    pub fn restore<R: RoleRegistry>(self, roles: R) -> Engine<R> {
        Engine {
            roles,
            root: self.root,
            height: self.height,
            tokens: self.tokens,
            levels: self.levels,
            alliances: self.alliances,
            challenges: self.challenges,
            trades: self.trades,
            territories: self.territories,
            messages: self.messages,
            events: self.events,
            used_role_uids: self.used_role_uids,
        }
    }

    /// Write the snapshot to a file as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if file operations or serialization fail.
    pub fn save(&self, path: &Path) -> io::Result<()> {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)?;
        Ok(())
    }

    /// Load a snapshot from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if file operations fail or the format is invalid.
    pub fn load(path: &Path) -> io::Result<Self> {
        let file = File::open(path)?;
        let snapshot = serde_json::from_reader(BufReader::new(file))?;
        Ok(snapshot)
    }
}
