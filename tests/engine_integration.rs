//! Multi-system integration tests for the rules engine.
//!
//! These walk complete player-facing scenarios across custody, messaging,
//! trading, alliances, challenges, and territories, and check invariants
//! after every committed mutation.
//!
//! Run with: cargo test --release engine_integration

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use outlast::engine::{
    assert_invariants, check_invariants, ChallengeStatus, BASE_MSG_FEE, CHALLENGE_LOSS_XP,
    CHALLENGE_WIN_XP, MSG_COOLDOWN_BLOCKS, NUM_TERRITORIES, TERRITORY_COOLDOWN_BLOCKS,
};
use outlast::roles::{ALLIANCE_LEADER, COMMANDER, VETERAN};
use outlast::{Engine, EngineError, MemoryRoles, Principal, RoleRegistry};

const ROOT: Principal = 1000;
const ALICE: Principal = 1;
const BOB: Principal = 2;

fn new_engine() -> Engine<MemoryRoles> {
    Engine::new(ROOT, MemoryRoles::new())
}

#[test]
fn test_mint_and_messaging_scenario() {
    let mut engine = new_engine();

    // Mint token 0 to Alice; she sends a short message at the base fee.
    let token = engine.mint(ROOT, ALICE, b"survivor-0").unwrap();
    assert_eq!(token, 0);
    engine
        .send_message(ALICE, 0, "twelve chars", BASE_MSG_FEE)
        .unwrap();
    assert_eq!(engine.msg_count(0), 1);

    // An immediate resend is rate-limited regardless of fee.
    let err = engine
        .send_message(ALICE, 0, "again", BASE_MSG_FEE * 10)
        .unwrap_err();
    assert!(matches!(err, EngineError::Cooldown { .. }));

    // After the cooldown the second message costs twice the base fee.
    engine.advance_blocks(MSG_COOLDOWN_BLOCKS);
    assert_eq!(
        engine.send_message(ALICE, 0, "again", BASE_MSG_FEE * 2 - 1),
        Err(EngineError::InsufficientFee {
            required: BASE_MSG_FEE * 2,
            attached: BASE_MSG_FEE * 2 - 1
        })
    );
    engine
        .send_message(ALICE, 0, "again", BASE_MSG_FEE * 2)
        .unwrap();
    assert_eq!(engine.msg_count(0), 2);

    // Only digests are durable.
    for message in engine.messages(0) {
        assert_eq!(message.from, ALICE);
        assert_ne!(message.text_hash, [0u8; 32]);
    }
    assert_invariants(&engine);
}

#[test]
fn test_trade_scenario() {
    let mut engine = new_engine();
    engine.mint(ROOT, ALICE, &[]).unwrap();
    engine.mint(ROOT, BOB, &[]).unwrap();

    engine.propose_trade(ALICE, 0, 1).unwrap();
    engine.accept_trade(BOB, 0, 1).unwrap();

    assert_eq!(engine.owner_of(0), Ok(BOB));
    assert_eq!(engine.owner_of(1), Ok(ALICE));
    assert_eq!(engine.trade_proposal(0), None);
    assert_invariants(&engine);
}

#[test]
fn test_alliance_scenario() {
    let mut engine = new_engine();
    engine.mint(ROOT, ALICE, &[]).unwrap();
    engine.mint(ROOT, BOB, &[]).unwrap();
    engine.mint(ROOT, BOB, &[]).unwrap();
    engine.roles_mut().grant(BOB, COMMANDER);

    let alliance = engine.create_alliance(BOB, &[2]).unwrap();
    assert_eq!(engine.alliance_of(2), Some(alliance));
    assert!(engine.roles().has_role(BOB, ALLIANCE_LEADER));

    let entry = engine.alliance(alliance).unwrap();
    assert_eq!(entry.leader, BOB);
    assert_eq!(entry.members, vec![2]);

    // Alice's token can join afterwards.
    engine.join_alliance(ALICE, alliance, 0).unwrap();
    assert_eq!(engine.alliance_of(0), Some(alliance));
    assert_invariants(&engine);
}

#[test]
fn test_challenge_scenario() {
    let mut engine = new_engine();
    engine.mint(ROOT, ALICE, &[]).unwrap();
    engine.mint(ROOT, BOB, &[]).unwrap();
    engine.roles_mut().grant(BOB, COMMANDER);

    let before_winner = engine.level_of(1).xp;
    let id = engine.issue_challenge(ALICE, 0, 1).unwrap();
    let winner = engine.accept_challenge(BOB, id).unwrap();

    // Bob's commander bonus decides a level-0 against level-0 battle.
    assert_eq!(winner, BOB);
    let resolved = engine.challenge(id).unwrap();
    assert_eq!(resolved.status, ChallengeStatus::Resolved);
    assert_eq!(resolved.winner, Some(BOB));
    assert!(engine.level_of(1).xp > before_winner);
    assert_invariants(&engine);
}

#[test]
fn test_territory_campaign() {
    let mut engine = new_engine();
    engine.mint(ROOT, ALICE, &[]).unwrap();
    engine.mint(ROOT, BOB, &[]).unwrap();
    engine.roles_mut().grant(BOB, COMMANDER);
    engine.roles_mut().grant(BOB, VETERAN);

    // Alice grabs every slot while they are free.
    for territory in 0..NUM_TERRITORIES {
        engine
            .claim_territory(ALICE, u8::try_from(territory).unwrap(), 0)
            .unwrap();
    }
    assert_eq!(
        engine.get_player_stats(ALICE).owned_territories,
        u32::try_from(NUM_TERRITORIES).unwrap()
    );

    // Bob contests slot 0 once the cooldown expires; his commander and
    // veteran weights clear Alice's zero reputation plus the margin.
    engine.advance_blocks(TERRITORY_COOLDOWN_BLOCKS);
    engine.claim_territory(BOB, 0, 1).unwrap();

    assert_eq!(engine.territory(0).unwrap().owner_token, Some(1));
    assert_eq!(engine.get_player_stats(BOB).owned_territories, 1);
    assert_eq!(
        engine.get_player_stats(ALICE).owned_territories,
        u32::try_from(NUM_TERRITORIES - 1).unwrap()
    );
    assert_invariants(&engine);
}

#[test]
fn test_full_session_preserves_invariants() {
    let mut engine = new_engine();

    // A longer mixed session touching every subsystem.
    for i in 0..10 {
        let owner = if i % 2 == 0 { ALICE } else { BOB };
        engine.mint(ROOT, owner, &[i]).unwrap();
        engine.advance_blocks(1);
    }

    engine.roles_mut().grant(ALICE, COMMANDER);
    let alliance = engine.create_alliance(ALICE, &[0, 2, 4]).unwrap();
    engine.join_alliance(BOB, alliance, 1).unwrap();

    let id = engine.issue_challenge(ALICE, 0, 1).unwrap();
    engine.accept_challenge(BOB, id).unwrap();

    engine.propose_trade(ALICE, 2, 3).unwrap();
    engine.accept_trade(BOB, 2, 3).unwrap();

    engine.claim_territory(ALICE, 0, 0).unwrap();
    engine.claim_territory(BOB, 1, 1).unwrap();

    engine.send_message(ALICE, 0, "gg", BASE_MSG_FEE).unwrap();

    let violations = check_invariants(&engine);
    assert!(violations.is_empty(), "{violations:?}");
}

#[test]
fn test_challenge_xp_asymmetry() {
    let mut engine = new_engine();
    engine.mint(ROOT, ALICE, &[]).unwrap();
    engine.mint(ROOT, BOB, &[]).unwrap();
    engine.roles_mut().grant(ALICE, COMMANDER);

    let id = engine.issue_challenge(ALICE, 0, 1).unwrap();
    engine.accept_challenge(BOB, id).unwrap();

    assert_eq!(engine.level_of(0).xp, CHALLENGE_WIN_XP);
    assert_eq!(engine.level_of(1).xp, CHALLENGE_LOSS_XP);
    assert!(engine.level_of(0).xp > engine.level_of(1).xp);
}

#[test]
fn test_provenance_chain_after_many_mints() {
    let mut engine = new_engine();
    for i in 0..50u64 {
        engine.mint(ROOT, ALICE, &[]).unwrap();
        engine.advance_blocks(i % 3);
    }

    // Chain walks report mint order regardless of later trades.
    let links = engine.get_chain(49, 5).unwrap();
    assert_eq!(links.len(), 5);
    assert_eq!(links[0].prev_token_id, 48);
    assert_eq!(links[4].prev_token_id, 44);

    let genesis_walk = engine.get_chain(1, 4).unwrap();
    assert_eq!(genesis_walk[0].prev_token_id, 0);
    assert!(genesis_walk[1..].iter().all(|l| l.prev_token_id == 0));
}
