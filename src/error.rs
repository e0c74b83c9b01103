//! Error types for the rules engine.
//!
//! Every failure is a precondition violation: operations validate all of
//! their preconditions before touching state, so a returned error always
//! means "nothing happened". There is no fatal engine error variant.

use std::fmt;

use crate::engine::{AllianceId, BlockHeight, ChallengeId, TerritoryId, TokenId};
use crate::roles::{Principal, RoleId};

/// Errors surfaced verbatim to callers of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineError {
    /// Caller does not hold mint authority.
    Unauthorized {
        /// The rejected caller.
        caller: Principal,
    },
    /// Caller is missing a required role.
    RoleRequired {
        /// The role the caller would need.
        role: RoleId,
    },
    /// Caller does not own the token.
    NotOwner {
        /// The token in question.
        token: TokenId,
    },
    /// Caller does not own the survivor token named in the call.
    NotNftOwner {
        /// The token in question.
        token: TokenId,
    },
    /// Caller does not own every token in the supplied set.
    NotOwnerOfAllTokens,
    /// Caller does not own the challenging token.
    NotChallengerOwner {
        /// The challenger token.
        token: TokenId,
    },
    /// Caller does not own the challenged token.
    NotOpponentOwner {
        /// The opponent token.
        token: TokenId,
    },
    /// The token id has not been minted.
    UnknownToken {
        /// The unminted id.
        token: TokenId,
    },
    /// The alliance id has never been allocated.
    AllianceNotFound {
        /// The missing alliance id.
        alliance: AllianceId,
    },
    /// The challenge id has never been allocated.
    UnknownChallenge {
        /// The missing challenge id.
        challenge: ChallengeId,
    },
    /// The challenge exists but has already been resolved.
    ChallengeNotPending {
        /// The resolved challenge id.
        challenge: ChallengeId,
    },
    /// No matching trade proposal exists.
    NoProposal {
        /// Proposal source token.
        from: TokenId,
        /// Proposal target token.
        to: TokenId,
    },
    /// The territory index is outside the fixed territory array.
    InvalidTerritory {
        /// The out-of-range index.
        territory: TerritoryId,
    },
    /// The attached fee is below the required amount.
    InsufficientFee {
        /// Fee the operation requires.
        required: u64,
        /// Fee the caller attached.
        attached: u64,
    },
    /// The message body exceeds the maximum length.
    MessageTooLong {
        /// Length of the rejected body in bytes.
        len: usize,
        /// Maximum allowed length in bytes.
        max: usize,
    },
    /// A rate-limited operation was retried too early.
    Cooldown {
        /// Blocks left until the operation is allowed again.
        remaining: BlockHeight,
    },
    /// Claimant reputation does not clear the contest margin.
    InsufficientReputation {
        /// Reputation the contest requires.
        required: u64,
        /// Reputation the claimant actually has.
        actual: u64,
    },
    /// A token cannot challenge itself.
    SelfChallenge {
        /// The token used on both sides.
        token: TokenId,
    },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::Unauthorized { caller } => {
                write!(f, "principal {caller} does not hold mint authority")
            }
            EngineError::RoleRequired { role } => {
                write!(f, "caller is missing required role {role}")
            }
            EngineError::NotOwner { token } => {
                write!(f, "caller does not own token {token}")
            }
            EngineError::NotNftOwner { token } => {
                write!(f, "caller does not own survivor token {token}")
            }
            EngineError::NotOwnerOfAllTokens => {
                write!(f, "caller does not own every token in the set")
            }
            EngineError::NotChallengerOwner { token } => {
                write!(f, "caller does not own challenger token {token}")
            }
            EngineError::NotOpponentOwner { token } => {
                write!(f, "caller does not own opponent token {token}")
            }
            EngineError::UnknownToken { token } => {
                write!(f, "token {token} has not been minted")
            }
            EngineError::AllianceNotFound { alliance } => {
                write!(f, "alliance {alliance} does not exist")
            }
            EngineError::UnknownChallenge { challenge } => {
                write!(f, "challenge {challenge} does not exist")
            }
            EngineError::ChallengeNotPending { challenge } => {
                write!(f, "challenge {challenge} is not pending")
            }
            EngineError::NoProposal { from, to } => {
                write!(f, "no trade proposal from token {from} to token {to}")
            }
            EngineError::InvalidTerritory { territory } => {
                write!(f, "territory {territory} is out of range")
            }
            EngineError::InsufficientFee { required, attached } => {
                write!(f, "attached fee {attached} is below required fee {required}")
            }
            EngineError::MessageTooLong { len, max } => {
                write!(f, "message of {len} bytes exceeds maximum of {max}")
            }
            EngineError::Cooldown { remaining } => {
                write!(f, "operation on cooldown for {remaining} more blocks")
            }
            EngineError::InsufficientReputation { required, actual } => {
                write!(f, "reputation {actual} is below contest requirement {required}")
            }
            EngineError::SelfChallenge { token } => {
                write!(f, "token {token} cannot challenge itself")
            }
        }
    }
}

impl std::error::Error for EngineError {}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_ids() {
        let err = EngineError::UnknownToken { token: 17 };
        assert!(format!("{err}").contains("17"));

        let err = EngineError::InsufficientFee {
            required: 30,
            attached: 10,
        };
        let text = format!("{err}");
        assert!(text.contains("30"));
        assert!(text.contains("10"));
    }

    #[test]
    fn test_errors_are_comparable() {
        assert_eq!(
            EngineError::NotOwnerOfAllTokens,
            EngineError::NotOwnerOfAllTokens
        );
        assert_ne!(
            EngineError::NotOwner { token: 1 },
            EngineError::NotOwner { token: 2 }
        );
    }
}
