//! Peer-to-peer trade proposals.
//!
//! A proposal is a one-way offer `from -> to` recorded by the owner of
//! `from`. Accepting swaps ownership of the two tokens and clears the
//! proposal in the same operation. No currency changes hands.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::engine::TokenId;

/// Active trade proposals, keyed by source token. Absence means no proposal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeBook {
    proposals: BTreeMap<TokenId, TokenId>,
}

impl TradeBook {
    /// Create an empty book.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Active proposal target for a source token, if any.
    #[must_use]
    pub fn proposal(&self, from: TokenId) -> Option<TokenId> {
        self.proposals.get(&from).copied()
    }

    /// Record a proposal, overwriting any prior proposal for `from`.
    pub(crate) fn propose(&mut self, from: TokenId, to: TokenId) {
        self.proposals.insert(from, to);
    }

    /// Clear the proposal for a source token.
    pub(crate) fn clear(&mut self, from: TokenId) {
        self.proposals.remove(&from);
    }

    /// Iterate over all active proposals in source-token order.
    pub fn all(&self) -> impl Iterator<Item = (TokenId, TokenId)> + '_ {
        self.proposals.iter().map(|(&f, &t)| (f, t))
    }
}
