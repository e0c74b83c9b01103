//! Token custody and the mint-provenance chain.
//!
//! Token ids are dense and strictly increasing from 0. Each mint appends a
//! [`ChainLink`] pointing at the previously minted id, so the chain records
//! **mint order**, not ownership history. Id 0 is the genesis link and
//! points at itself.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::roles::Principal;

/// Unique identifier for a survivor token.
pub type TokenId = u64;

/// Monotonically increasing block-height clock value.
pub type BlockHeight = u64;

/// One link in the mint-provenance chain, keyed by token id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainLink {
    /// Id of the token minted immediately before this one.
    /// The genesis token references itself.
    pub prev_token_id: TokenId,
    /// Block height at which the token was minted.
    pub timestamp: BlockHeight,
}

/// Owner map, mint payloads, and provenance chain for all tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenLedger {
    owners: Vec<Principal>,
    mint_data: Vec<Vec<u8>>,
    chain: Vec<ChainLink>,
}

impl TokenLedger {
    /// Create an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Id the next mint will allocate. Also the number of minted tokens.
    #[must_use]
    pub fn next_token_id(&self) -> TokenId {
        self.owners.len() as TokenId
    }

    /// Whether the token id has been minted.
    #[must_use]
    pub fn contains(&self, token: TokenId) -> bool {
        token < self.next_token_id()
    }

    /// Allocate the next id, record ownership and payload, and append the
    /// chain link. Returns the new id.
    pub(crate) fn mint(&mut self, owner: Principal, data: &[u8], now: BlockHeight) -> TokenId {
        let id = self.next_token_id();
        let prev_token_id = id.saturating_sub(1);

        self.owners.push(owner);
        self.mint_data.push(data.to_vec());
        self.chain.push(ChainLink {
            prev_token_id,
            timestamp: now,
        });

        id
    }

    /// Current owner of a token.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownToken`] if the id has not been minted.
    pub fn owner_of(&self, token: TokenId) -> EngineResult<Principal> {
        index(token)
            .and_then(|i| self.owners.get(i))
            .copied()
            .ok_or(EngineError::UnknownToken { token })
    }

    /// Opaque payload supplied at mint time.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownToken`] if the id has not been minted.
    pub fn mint_data(&self, token: TokenId) -> EngineResult<&[u8]> {
        index(token)
            .and_then(|i| self.mint_data.get(i))
            .map(Vec::as_slice)
            .ok_or(EngineError::UnknownToken { token })
    }

    /// Chain link for a single token.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownToken`] if the id has not been minted.
    pub fn link(&self, token: TokenId) -> EngineResult<ChainLink> {
        index(token)
            .and_then(|i| self.chain.get(i))
            .copied()
            .ok_or(EngineError::UnknownToken { token })
    }

    /// Walk the provenance chain backward from `token`, inclusive.
    ///
    /// Produces exactly `depth` links. Once the walk reaches the genesis
    /// token its self-reference keeps the walk there, so repeated genesis
    /// entries are expected for deep walks.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownToken`] if the starting id has not been
    /// minted.
    pub fn get_chain(&self, token: TokenId, depth: usize) -> EngineResult<Vec<ChainLink>> {
        if !self.contains(token) {
            return Err(EngineError::UnknownToken { token });
        }

        let mut links = Vec::with_capacity(depth);
        let mut current = token;
        for _ in 0..depth {
            let link = self.link(current)?;
            links.push(link);
            current = link.prev_token_id;
        }
        Ok(links)
    }

    /// Swap the owners of two tokens. Both-or-neither: validates both ids
    /// before mutating either entry.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownToken`] if either id has not been minted.
    pub(crate) fn swap_owners(&mut self, a: TokenId, b: TokenId) -> EngineResult<()> {
        let owner_a = self.owner_of(a)?;
        let owner_b = self.owner_of(b)?;

        if let Some(slot) = index(a).and_then(|i| self.owners.get_mut(i)) {
            *slot = owner_b;
        }
        if let Some(slot) = index(b).and_then(|i| self.owners.get_mut(i)) {
            *slot = owner_a;
        }
        Ok(())
    }

    /// Iterate over all chain links in mint order.
    pub fn links(&self) -> impl Iterator<Item = ChainLink> + '_ {
        self.chain.iter().copied()
    }
}

/// Convert a token id into a vector index.
fn index(token: TokenId) -> Option<usize> {
    usize::try_from(token).ok()
}
