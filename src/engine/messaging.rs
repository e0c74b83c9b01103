//! Anti-spam messaging channel.
//!
//! Each token carries an append-only message log. Only a SHA-256 digest of
//! the body is durable; the plaintext is never stored. Spam is priced out
//! two ways: a per-token cooldown of [`MSG_COOLDOWN_BLOCKS`] and a fee that
//! grows linearly with the token's message count,
//! `BASE_MSG_FEE * (msg_count + 1)`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::engine::{BlockHeight, TokenId};
use crate::roles::Principal;

/// Maximum message body length in bytes.
pub const MAX_MSG_LEN: usize = 64;

/// Fee multiplier base. The n-th message on a token costs `BASE_MSG_FEE * n`.
pub const BASE_MSG_FEE: u64 = 10;

/// Minimum blocks between messages on the same token.
pub const MSG_COOLDOWN_BLOCKS: BlockHeight = 10;

/// One durable message record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Principal that sent the message.
    pub from: Principal,
    /// SHA-256 digest of the message body.
    pub text_hash: [u8; 32],
    /// Block height at which the message was accepted.
    pub timestamp: BlockHeight,
    /// Fee attached to the message.
    pub fee: u64,
}

/// Per-token message logs plus rate-limit bookkeeping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageLog {
    messages: BTreeMap<TokenId, Vec<Message>>,
    last_block: BTreeMap<TokenId, BlockHeight>,
}

impl MessageLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of messages accepted for a token.
    #[must_use]
    pub fn msg_count(&self, token: TokenId) -> u64 {
        self.messages.get(&token).map_or(0, |log| log.len() as u64)
    }

    /// All messages accepted for a token, oldest first.
    #[must_use]
    pub fn messages(&self, token: TokenId) -> &[Message] {
        self.messages.get(&token).map_or(&[], Vec::as_slice)
    }

    /// Block height of the most recent message on a token, if any.
    #[must_use]
    pub fn last_message_block(&self, token: TokenId) -> Option<BlockHeight> {
        self.last_block.get(&token).copied()
    }

    /// Fee required for the next message on a token.
    #[must_use]
    pub fn required_fee(&self, token: TokenId) -> u64 {
        BASE_MSG_FEE.saturating_mul(self.msg_count(token).saturating_add(1))
    }

    /// SHA-256 digest of a message body.
    #[must_use]
    pub fn hash_text(text: &str) -> [u8; 32] {
        Sha256::digest(text.as_bytes()).into()
    }

    /// Append an accepted message and stamp the rate limiter.
    pub(crate) fn push(&mut self, token: TokenId, message: Message) {
        self.last_block.insert(token, message.timestamp);
        self.messages.entry(token).or_default().push(message);
    }
}
