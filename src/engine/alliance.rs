//! Alliance registry.
//!
//! Alliance ids start at [`FIRST_ALLIANCE_ID`]; the "no alliance" state is
//! modeled as the absence of a membership entry rather than a sentinel id,
//! so id 0 can never be confused with "unaffiliated". Alliances only grow:
//! there is no leave or disband operation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::engine::TokenId;
use crate::roles::Principal;

/// Unique identifier for an alliance.
pub type AllianceId = u64;

/// Lowest alliance id ever allocated. Id 0 is permanently reserved so a
/// default-valued id can never alias a real alliance.
pub const FIRST_ALLIANCE_ID: AllianceId = 1;

/// A named group of survivor tokens under one leader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alliance {
    /// Allocated id.
    pub id: AllianceId,
    /// Principal that created the alliance.
    pub leader: Principal,
    /// Member tokens in insertion order, without duplicates.
    pub members: Vec<TokenId>,
}

/// All alliances plus the token-to-alliance membership index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllianceRegistry {
    alliances: BTreeMap<AllianceId, Alliance>,
    membership: BTreeMap<TokenId, AllianceId>,
    next_id: AllianceId,
}

impl AllianceRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            alliances: BTreeMap::new(),
            membership: BTreeMap::new(),
            next_id: FIRST_ALLIANCE_ID,
        }
    }

    /// Look up an alliance by id.
    #[must_use]
    pub fn get(&self, id: AllianceId) -> Option<&Alliance> {
        self.alliances.get(&id)
    }

    /// Whether an alliance with this id exists.
    #[must_use]
    pub fn contains(&self, id: AllianceId) -> bool {
        self.alliances.contains_key(&id)
    }

    /// Current alliance of a token, if any.
    #[must_use]
    pub fn alliance_of(&self, token: TokenId) -> Option<AllianceId> {
        self.membership.get(&token).copied()
    }

    /// Number of alliances ever created.
    #[must_use]
    pub fn len(&self) -> usize {
        self.alliances.len()
    }

    /// Whether no alliance has been created yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.alliances.is_empty()
    }

    /// Iterate over all alliances in id order.
    pub fn all(&self) -> impl Iterator<Item = &Alliance> {
        self.alliances.values()
    }

    /// Allocate a new alliance with the given leader and founding tokens.
    /// Duplicate tokens in the input are dropped, first occurrence wins.
    pub(crate) fn create(&mut self, leader: Principal, tokens: &[TokenId]) -> AllianceId {
        let id = self.next_id;
        self.next_id += 1;

        let mut members = Vec::with_capacity(tokens.len());
        for &token in tokens {
            if !members.contains(&token) {
                members.push(token);
                self.membership.insert(token, id);
            }
        }

        self.alliances.insert(
            id,
            Alliance {
                id,
                leader,
                members,
            },
        );
        id
    }

    /// Move a token into an alliance. The caller must have verified the
    /// alliance exists. A token switching alliances keeps its entry in the
    /// old member list; only the membership index is overwritten.
    pub(crate) fn join(&mut self, id: AllianceId, token: TokenId) {
        debug_assert!(self.alliances.contains_key(&id));

        if let Some(alliance) = self.alliances.get_mut(&id) {
            if !alliance.members.contains(&token) {
                alliance.members.push(token);
            }
        }
        self.membership.insert(token, id);
    }

    /// Iterate over the membership index in token order.
    pub fn memberships(&self) -> impl Iterator<Item = (TokenId, AllianceId)> + '_ {
        self.membership.iter().map(|(&t, &a)| (t, a))
    }
}

impl Default for AllianceRegistry {
    fn default() -> Self {
        Self::new()
    }
}
