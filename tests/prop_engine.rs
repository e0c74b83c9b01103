//! Property-based tests for the rules engine.
//!
//! These verify structural invariants (custody chain shape, fee schedule,
//! trade atomicity) over arbitrary inputs.
//!
//! Run with: cargo test --release prop_engine

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::cast_possible_truncation)]

use proptest::prelude::*;

use outlast::engine::{check_invariants, BASE_MSG_FEE, MSG_COOLDOWN_BLOCKS, NUM_TERRITORIES};
use outlast::{Engine, EngineError, MemoryRoles, Principal};

const ROOT: Principal = 1000;

fn new_engine() -> Engine<MemoryRoles> {
    Engine::new(ROOT, MemoryRoles::new())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Minting any number of tokens yields a dense, backward-linked chain.
    #[test]
    fn prop_custody_chain_shape(count in 1usize..200, owners in prop::collection::vec(1u64..50, 1..200)) {
        let mut engine = new_engine();
        for i in 0..count {
            let owner = owners[i % owners.len()];
            let id = engine.mint(ROOT, owner, &[]).unwrap();
            prop_assert_eq!(id, i as u64);
        }

        prop_assert_eq!(engine.get_chain(0, 1).unwrap()[0].prev_token_id, 0);
        for id in 1..count as u64 {
            let link = engine.get_chain(id, 1).unwrap()[0];
            prop_assert_eq!(link.prev_token_id, id - 1);
        }
        prop_assert!(check_invariants(&engine).is_empty());
    }

    /// Chain walks always return exactly the requested depth.
    #[test]
    fn prop_get_chain_exact_length(count in 1u64..100, depth in 0usize..300) {
        let mut engine = new_engine();
        for _ in 0..count {
            engine.mint(ROOT, 1, &[]).unwrap();
        }

        let links = engine.get_chain(count - 1, depth).unwrap();
        prop_assert_eq!(links.len(), depth);
    }

    /// A short fee always fails and changes nothing; the exact fee always
    /// increments the count by one.
    #[test]
    fn prop_fee_schedule(shortfall in 1u64..BASE_MSG_FEE, rounds in 1u64..20) {
        let mut engine = new_engine();
        engine.mint(ROOT, 1, &[]).unwrap();

        for round in 0..rounds {
            let required = BASE_MSG_FEE * (round + 1);
            prop_assert_eq!(
                engine.send_message(1, 0, "ping", required - shortfall),
                Err(EngineError::InsufficientFee {
                    required,
                    attached: required - shortfall
                })
            );
            prop_assert_eq!(engine.msg_count(0), round);

            engine.send_message(1, 0, "ping", required).unwrap();
            prop_assert_eq!(engine.msg_count(0), round + 1);
            engine.advance_blocks(MSG_COOLDOWN_BLOCKS);
        }
    }

    /// Messages inside the cooldown window always fail, whatever the fee.
    #[test]
    fn prop_cooldown_blocks_resend(gap in 0u64..MSG_COOLDOWN_BLOCKS, fee in 0u64..10_000) {
        let mut engine = new_engine();
        engine.mint(ROOT, 1, &[]).unwrap();
        engine.send_message(1, 0, "first", BASE_MSG_FEE).unwrap();

        engine.advance_blocks(gap);
        let result = engine.send_message(1, 0, "second", fee);
        prop_assert!(
            matches!(result, Err(EngineError::Cooldown { .. })),
            "expected cooldown error, got {:?}",
            result
        );
        prop_assert_eq!(engine.msg_count(0), 1);
    }

    /// Trades are all-or-nothing: a failed accept never moves either token,
    /// a successful accept swaps exactly the two owners.
    #[test]
    fn prop_trade_atomicity(
        alice in 1u64..100,
        bob in 101u64..200,
        propose in prop::bool::ANY,
        wrong_target in prop::bool::ANY,
    ) {
        let mut engine = new_engine();
        engine.mint(ROOT, alice, &[]).unwrap();
        engine.mint(ROOT, bob, &[]).unwrap();
        engine.mint(ROOT, bob, &[]).unwrap();

        if propose {
            engine.propose_trade(alice, 0, 1).unwrap();
        }
        let target = if wrong_target { 2 } else { 1 };
        let result = engine.accept_trade(bob, 0, target);

        if propose && !wrong_target {
            prop_assert!(result.is_ok());
            prop_assert_eq!(engine.owner_of(0).unwrap(), bob);
            prop_assert_eq!(engine.owner_of(1).unwrap(), alice);
            prop_assert_eq!(engine.trade_proposal(0), None);
        } else {
            prop_assert!(result.is_err());
            prop_assert_eq!(engine.owner_of(0).unwrap(), alice);
            prop_assert_eq!(engine.owner_of(1).unwrap(), bob);
        }
        prop_assert!(check_invariants(&engine).is_empty());
    }

    /// Claiming an unclaimed slot always succeeds for the owner and strictly
    /// increases the token's XP.
    #[test]
    fn prop_unclaimed_territory_claim(territory in 0u8..NUM_TERRITORIES as u8, owner in 1u64..100) {
        let mut engine = new_engine();
        engine.mint(ROOT, owner, &[]).unwrap();

        let before = engine.level_of(0).xp;
        engine.claim_territory(owner, territory, 0).unwrap();
        prop_assert!(engine.level_of(0).xp > before);
        prop_assert_eq!(engine.territory(territory).unwrap().owner_token, Some(0));
    }

    /// Battle power never decreases when XP is added via territory claims.
    #[test]
    fn prop_battle_power_monotone_in_claims(claims in 1usize..NUM_TERRITORIES) {
        let mut engine = new_engine();
        engine.mint(ROOT, 1, &[]).unwrap();

        let mut last_power = engine.calculate_battle_power(0).unwrap();
        for territory in 0..claims {
            engine.claim_territory(1, u8::try_from(territory).unwrap(), 0).unwrap();
            let power = engine.calculate_battle_power(0).unwrap();
            prop_assert!(power >= last_power);
            last_power = power;
        }
    }
}
