//! Challenge issuance and battle resolution.
//!
//! Battle power is fully deterministic: `level * 100` plus fixed bonuses for
//! roles the owning principal holds. The strictly higher power wins; an
//! exact tie goes to the lower token id. The tie-break is a deliberate,
//! documented rule so two identical survivors still resolve deterministically.

use serde::{Deserialize, Serialize};

use crate::engine::TokenId;
use crate::roles::{Principal, RoleRegistry, COMMANDER, VETERAN};

/// Unique identifier for a challenge.
pub type ChallengeId = u64;

/// Battle power granted per level.
pub const POWER_PER_LEVEL: u64 = 100;

/// Battle power bonus for owners holding the commander role.
pub const COMMANDER_POWER_BONUS: u64 = 50;

/// Battle power bonus for owners holding the veteran role.
pub const VETERAN_POWER_BONUS: u64 = 25;

/// Lifecycle state of a challenge. Absence from the book means "none".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChallengeStatus {
    /// Issued but not yet accepted.
    Pending,
    /// Accepted and resolved; `winner` is recorded.
    Resolved,
}

/// A challenge between two survivor tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Challenge {
    /// Token that issued the challenge.
    pub challenger: TokenId,
    /// Token being challenged.
    pub opponent: TokenId,
    /// Current lifecycle state.
    pub status: ChallengeStatus,
    /// Owning principal of the winning token, set on resolution.
    pub winner: Option<Principal>,
}

/// Append-only book of all challenges, keyed by issuance order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeBook {
    challenges: Vec<Challenge>,
}

impl ChallengeBook {
    /// Create an empty book.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a challenge by id.
    #[must_use]
    pub fn get(&self, id: ChallengeId) -> Option<Challenge> {
        usize::try_from(id)
            .ok()
            .and_then(|i| self.challenges.get(i))
            .copied()
    }

    /// Number of challenges ever issued.
    #[must_use]
    pub fn len(&self) -> usize {
        self.challenges.len()
    }

    /// Whether no challenge has been issued yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.challenges.is_empty()
    }

    /// Iterate over all challenges in issuance order.
    pub fn all(&self) -> impl Iterator<Item = Challenge> + '_ {
        self.challenges.iter().copied()
    }

    /// Record a new pending challenge and return its id.
    pub(crate) fn open(&mut self, challenger: TokenId, opponent: TokenId) -> ChallengeId {
        let id = self.challenges.len() as ChallengeId;
        self.challenges.push(Challenge {
            challenger,
            opponent,
            status: ChallengeStatus::Pending,
            winner: None,
        });
        id
    }

    /// Mark a challenge resolved with the given winning principal.
    /// The caller must have verified the challenge exists and is pending.
    pub(crate) fn resolve(&mut self, id: ChallengeId, winner: Principal) {
        if let Some(challenge) = usize::try_from(id)
            .ok()
            .and_then(|i| self.challenges.get_mut(i))
        {
            challenge.status = ChallengeStatus::Resolved;
            challenge.winner = Some(winner);
        }
    }
}

/// Deterministic battle power for a token: `level * POWER_PER_LEVEL` plus
/// the owner's role bonus.
#[must_use]
pub fn battle_power(level: u64, bonus: u64) -> u64 {
    level.saturating_mul(POWER_PER_LEVEL).saturating_add(bonus)
}

/// Sum of fixed power bonuses for roles the principal holds.
pub(crate) fn role_bonus<R: RoleRegistry>(roles: &R, principal: Principal) -> u64 {
    let mut bonus = 0;
    if roles.has_role(principal, COMMANDER) {
        bonus += COMMANDER_POWER_BONUS;
    }
    if roles.has_role(principal, VETERAN) {
        bonus += VETERAN_POWER_BONUS;
    }
    bonus
}

/// Pick the winning token: strictly higher power wins, ties go to the lower
/// token id.
pub(crate) fn winning_token(
    challenger: TokenId,
    challenger_power: u64,
    opponent: TokenId,
    opponent_power: u64,
) -> TokenId {
    if challenger_power > opponent_power {
        challenger
    } else if opponent_power > challenger_power {
        opponent
    } else {
        challenger.min(opponent)
    }
}
