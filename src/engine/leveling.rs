//! Experience and leveling ledger.
//!
//! Level is a pure step function of accumulated XP: `level = xp / 100`.
//! Only territory claims and challenge resolution grant XP; players never
//! call into this ledger directly.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::engine::TokenId;

/// XP required per level step.
pub const XP_PER_LEVEL: u64 = 100;

/// Flat XP award for claiming a territory.
pub const TERRITORY_XP: u64 = 50;

/// Multiplier applied to the claimant's reputation when computing the
/// territory claim bonus.
pub const REPUTATION_XP_SCALE: u64 = 1;

/// XP awarded to the winning token of a resolved challenge.
pub const CHALLENGE_WIN_XP: u64 = 100;

/// Consolation XP awarded to the losing token of a resolved challenge.
pub const CHALLENGE_LOSS_XP: u64 = 25;

/// Level and accumulated XP for a single token.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelInfo {
    /// Current level, always `xp / XP_PER_LEVEL`.
    pub level: u64,
    /// Accumulated experience points.
    pub xp: u64,
}

/// Per-token level/XP ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelLedger {
    levels: BTreeMap<TokenId, LevelInfo>,
}

impl LevelLedger {
    /// Create an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Level and XP for a token. Tokens start at `{0, 0}`.
    #[must_use]
    pub fn level_of(&self, token: TokenId) -> LevelInfo {
        self.levels.get(&token).copied().unwrap_or_default()
    }

    /// Level implied by an XP total.
    #[must_use]
    pub fn level_for_xp(xp: u64) -> u64 {
        xp / XP_PER_LEVEL
    }

    /// Add XP to a token and recompute its level. Returns the new entry.
    pub(crate) fn grant_xp(&mut self, token: TokenId, amount: u64) -> LevelInfo {
        let entry = self.levels.entry(token).or_default();
        entry.xp = entry.xp.saturating_add(amount);
        entry.level = Self::level_for_xp(entry.xp);
        *entry
    }
}
