//! Identity, roles, and reputation.
//!
//! The engine never stores role state itself. It talks to an external
//! identity registry through the [`RoleRegistry`] trait: a read-mostly
//! capability answering "does this principal hold this role" and exposing a
//! per-role numeric weight. A principal's reputation is the sum of weights
//! of all roles it holds.
//!
//! [`MemoryRoles`] is the deterministic in-process registry used by tests
//! and local play.

use std::collections::{BTreeMap, BTreeSet};

/// An authenticated caller identity (wallet-equivalent).
pub type Principal = u64;

/// Opaque role identifier resolved through the registry.
pub type RoleId = u16;

/// Role gating alliance creation.
pub const COMMANDER: RoleId = 1;
/// Seniority role; grants a battle-power bonus.
pub const VETERAN: RoleId = 2;
/// Market participation role.
pub const TRADER: RoleId = 3;
/// Achievement issued on a principal's first challenge win.
pub const FIRST_WIN: RoleId = 4;
/// Granted automatically to alliance creators.
pub const ALLIANCE_LEADER: RoleId = 5;
/// Role gating direct role issuance; held by the root principal.
pub const GAME_ADMIN: RoleId = 6;

/// Every role the engine knows about, used for reputation summing.
pub const ALL_ROLES: [RoleId; 6] = [
    COMMANDER,
    VETERAN,
    TRADER,
    FIRST_WIN,
    ALLIANCE_LEADER,
    GAME_ADMIN,
];

/// External identity registry interface.
///
/// Lookups are synchronous, side-effect-free queries; `grant` is idempotent.
pub trait RoleRegistry {
    /// Whether `principal` currently holds `role`.
    fn has_role(&self, principal: Principal, role: RoleId) -> bool;

    /// Numeric weight of a role. Unknown roles weigh zero.
    fn role_weight(&self, role: RoleId) -> u64;

    /// Grant `role` to `principal`. Granting an already-held role is a no-op.
    fn grant(&mut self, principal: Principal, role: RoleId);

    /// Reputation of a principal: the sum of weights of all held roles.
    fn reputation(&self, principal: Principal) -> u64 {
        ALL_ROLES
            .iter()
            .filter(|&&role| self.has_role(principal, role))
            .map(|&role| self.role_weight(role))
            .sum()
    }
}

/// Deterministic in-memory role registry.
///
/// Default weights: commander 20, veteran 15, trader 10, alliance leader 10,
/// first win 5, game admin 25.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryRoles {
    held: BTreeSet<(Principal, RoleId)>,
    weights: BTreeMap<RoleId, u64>,
}

impl MemoryRoles {
    /// Create a registry with the default weight table and no roles held.
    #[must_use]
    pub fn new() -> Self {
        let mut weights = BTreeMap::new();
        weights.insert(COMMANDER, 20);
        weights.insert(VETERAN, 15);
        weights.insert(TRADER, 10);
        weights.insert(FIRST_WIN, 5);
        weights.insert(ALLIANCE_LEADER, 10);
        weights.insert(GAME_ADMIN, 25);
        Self {
            held: BTreeSet::new(),
            weights,
        }
    }

    /// Override the weight of a role.
    pub fn set_weight(&mut self, role: RoleId, weight: u64) {
        self.weights.insert(role, weight);
    }
}

impl Default for MemoryRoles {
    fn default() -> Self {
        Self::new()
    }
}

impl RoleRegistry for MemoryRoles {
    fn has_role(&self, principal: Principal, role: RoleId) -> bool {
        self.held.contains(&(principal, role))
    }

    fn role_weight(&self, role: RoleId) -> u64 {
        self.weights.get(&role).copied().unwrap_or(0)
    }

    fn grant(&mut self, principal: Principal, role: RoleId) {
        self.held.insert((principal, role));
    }
}
