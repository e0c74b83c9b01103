//! Territory control.
//!
//! A fixed array of [`NUM_TERRITORIES`] slots. Unclaimed slots hold no
//! owner token. Contesting a claimed slot is gated twice: the previous
//! claim must be older than [`TERRITORY_COOLDOWN_BLOCKS`], and the
//! claimant's reputation must clear the current holder's reputation by
//! [`CONTEST_REPUTATION_MARGIN`]. The cooldown is checked first.

use serde::{Deserialize, Serialize};

use crate::engine::{AllianceId, BlockHeight, TokenId};

/// Index into the fixed territory array.
pub type TerritoryId = u8;

/// Number of territory slots. Fixed and small, so linear scans are fine.
pub const NUM_TERRITORIES: usize = 10;

/// Minimum blocks between claims of the same slot.
pub const TERRITORY_COOLDOWN_BLOCKS: BlockHeight = 20;

/// How far the claimant's reputation must exceed the holder's to contest.
pub const CONTEST_REPUTATION_MARGIN: u64 = 10;

/// One territory slot. The default value is the unclaimed state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerritorySlot {
    /// Token currently holding the slot, if any.
    pub owner_token: Option<TokenId>,
    /// Alliance of the holding token at claim time, if any.
    pub alliance: Option<AllianceId>,
    /// Block height of the most recent successful claim.
    pub last_claimed: BlockHeight,
}

/// The fixed territory array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerritoryLedger {
    slots: [TerritorySlot; NUM_TERRITORIES],
}

impl TerritoryLedger {
    /// Create a ledger with every slot unclaimed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Slot state for a territory, or `None` for an out-of-range index.
    #[must_use]
    pub fn get(&self, territory: TerritoryId) -> Option<TerritorySlot> {
        self.slots.get(usize::from(territory)).copied()
    }

    /// All slots in index order.
    #[must_use]
    pub fn slots(&self) -> &[TerritorySlot] {
        &self.slots
    }

    /// Overwrite a slot. The caller must have validated the index.
    pub(crate) fn set(&mut self, territory: TerritoryId, slot: TerritorySlot) {
        if let Some(entry) = self.slots.get_mut(usize::from(territory)) {
            *entry = slot;
        }
    }
}

/// Role flags and territory holdings for one principal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStats {
    /// Whether the principal holds the veteran role.
    pub is_veteran: bool,
    /// Whether the principal holds the commander role.
    pub is_commander: bool,
    /// Whether the principal holds the trader role.
    pub is_trader: bool,
    /// Number of territory slots held through tokens the principal owns.
    pub owned_territories: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_slot_is_unclaimed() {
        let ledger = TerritoryLedger::new();
        let slot = ledger.get(0).unwrap();
        assert_eq!(slot.owner_token, None);
        assert_eq!(slot.alliance, None);
        assert_eq!(slot.last_claimed, 0);
    }

    #[test]
    fn test_out_of_range_index() {
        let ledger = TerritoryLedger::new();
        assert!(ledger.get(10).is_none());
        assert!(ledger.get(255).is_none());
    }

    #[test]
    fn test_set_overwrites_slot() {
        let mut ledger = TerritoryLedger::new();
        let claimed = TerritorySlot {
            owner_token: Some(3),
            alliance: Some(1),
            last_claimed: 12,
        };
        ledger.set(4, claimed);

        assert_eq!(ledger.get(4), Some(claimed));
        assert_eq!(ledger.slots().len(), NUM_TERRITORIES);
    }
}
