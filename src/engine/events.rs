//! Typed events appended on every committed mutation.
//!
//! The event log is the engine's observability surface: a deterministic,
//! replayable record of what each operation did, in submission order.

use serde::{Deserialize, Serialize};

use crate::engine::{AllianceId, ChallengeId, TerritoryId, TokenId};
use crate::roles::{Principal, RoleId};

/// One committed state transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineEvent {
    /// A token was minted.
    Minted {
        /// The new token id.
        token: TokenId,
        /// Initial owner.
        owner: Principal,
    },
    /// A message was accepted on a token.
    MessageSent {
        /// The token carrying the message.
        token: TokenId,
        /// Fee attached by the sender.
        fee: u64,
    },
    /// An alliance was created.
    AllianceCreated {
        /// The new alliance id.
        alliance: AllianceId,
        /// The creating principal, now alliance leader.
        leader: Principal,
    },
    /// A token joined an existing alliance.
    AllianceJoined {
        /// The alliance joined.
        alliance: AllianceId,
        /// The joining token.
        token: TokenId,
    },
    /// A challenge was issued.
    ChallengeIssued {
        /// The new challenge id.
        challenge: ChallengeId,
        /// The challenging token.
        challenger: TokenId,
        /// The challenged token.
        opponent: TokenId,
    },
    /// A pending challenge was resolved.
    ChallengeResolved {
        /// The resolved challenge id.
        challenge: ChallengeId,
        /// Owner of the winning token.
        winner: Principal,
        /// The winning token.
        winning_token: TokenId,
    },
    /// A trade proposal was recorded.
    TradeProposed {
        /// Source token.
        from: TokenId,
        /// Target token.
        to: TokenId,
    },
    /// A trade proposal was accepted and the owners swapped.
    TradeSettled {
        /// Source token.
        from: TokenId,
        /// Target token.
        to: TokenId,
    },
    /// A territory slot was claimed or contested.
    TerritoryClaimed {
        /// The claimed slot.
        territory: TerritoryId,
        /// The token now holding the slot.
        token: TokenId,
    },
    /// A role was issued through the admin path.
    RoleIssued {
        /// Receiving principal.
        principal: Principal,
        /// The issued role.
        role: RoleId,
    },
}
