//! Engine invariants - sanity checks that detect bugs.
//!
//! Every mutating operation validates its preconditions before writing, so
//! these should NEVER trigger. If one does, it indicates a bug in the
//! engine, not bad caller input.

use crate::engine::{ChallengeStatus, Engine};
use crate::roles::RoleRegistry;

/// Invariant violation error.
#[derive(Debug, Clone)]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub message: String,
}

impl std::fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invariant violation: {}", self.message)
    }
}

impl std::error::Error for InvariantViolation {}

/// Check all engine invariants.
///
/// Returns a list of violations found, or empty if all invariants hold.
#[must_use]
pub fn check_invariants<R: RoleRegistry>(engine: &Engine<R>) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();

    check_custody_chain(engine, &mut violations);
    check_alliances(engine, &mut violations);
    check_challenges(engine, &mut violations);
    check_trades(engine, &mut violations);
    check_territories(engine, &mut violations);
    check_messages(engine, &mut violations);

    violations
}

/// The provenance chain must point strictly backward with a genesis
/// self-reference, and timestamps must not run ahead of the clock.
fn check_custody_chain<R: RoleRegistry>(engine: &Engine<R>, violations: &mut Vec<InvariantViolation>) {
    for (id, link) in engine.tokens().links().enumerate() {
        let id = id as u64;
        let expected_prev = id.saturating_sub(1);
        if link.prev_token_id != expected_prev {
            violations.push(InvariantViolation {
                message: format!(
                    "chain link {id} points at {} instead of {expected_prev}",
                    link.prev_token_id
                ),
            });
        }
        if link.timestamp > engine.height() {
            violations.push(InvariantViolation {
                message: format!(
                    "token {id} minted at height {} but clock is at {}",
                    link.timestamp,
                    engine.height()
                ),
            });
        }
    }
}

/// Every membership entry must point at an existing alliance whose member
/// list contains the token, and member tokens must be minted.
fn check_alliances<R: RoleRegistry>(engine: &Engine<R>, violations: &mut Vec<InvariantViolation>) {
    for (token, alliance) in engine.alliances().memberships() {
        match engine.alliances().get(alliance) {
            None => violations.push(InvariantViolation {
                message: format!("token {token} belongs to missing alliance {alliance}"),
            }),
            Some(entry) => {
                if !entry.members.contains(&token) {
                    violations.push(InvariantViolation {
                        message: format!(
                            "token {token} points at alliance {alliance} but is not in its member list"
                        ),
                    });
                }
            }
        }
    }

    for alliance in engine.alliances().all() {
        for &member in &alliance.members {
            if !engine.tokens().contains(member) {
                violations.push(InvariantViolation {
                    message: format!(
                        "alliance {} lists unminted token {member}",
                        alliance.id
                    ),
                });
            }
        }
    }
}

/// Resolved challenges carry a winner; pending ones do not. Both sides must
/// be minted and distinct.
fn check_challenges<R: RoleRegistry>(engine: &Engine<R>, violations: &mut Vec<InvariantViolation>) {
    for (id, challenge) in engine.challenges().all().enumerate() {
        let resolved = challenge.status == ChallengeStatus::Resolved;
        if resolved != challenge.winner.is_some() {
            violations.push(InvariantViolation {
                message: format!("challenge {id} status and winner disagree"),
            });
        }
        if challenge.challenger == challenge.opponent {
            violations.push(InvariantViolation {
                message: format!("challenge {id} pits a token against itself"),
            });
        }
        for token in [challenge.challenger, challenge.opponent] {
            if !engine.tokens().contains(token) {
                violations.push(InvariantViolation {
                    message: format!("challenge {id} references unminted token {token}"),
                });
            }
        }
    }
}

/// Trade proposals must reference minted tokens on both sides.
fn check_trades<R: RoleRegistry>(engine: &Engine<R>, violations: &mut Vec<InvariantViolation>) {
    for (from, to) in engine.trades().all() {
        for token in [from, to] {
            if !engine.tokens().contains(token) {
                violations.push(InvariantViolation {
                    message: format!(
                        "trade proposal {from} -> {to} references unminted token {token}"
                    ),
                });
            }
        }
    }
}

/// Claimed slots must hold minted tokens and claim times within the clock.
fn check_territories<R: RoleRegistry>(engine: &Engine<R>, violations: &mut Vec<InvariantViolation>) {
    for (index, slot) in engine.territories().slots().iter().enumerate() {
        if let Some(token) = slot.owner_token {
            if !engine.tokens().contains(token) {
                violations.push(InvariantViolation {
                    message: format!("territory {index} held by unminted token {token}"),
                });
            }
            if slot.last_claimed > engine.height() {
                violations.push(InvariantViolation {
                    message: format!(
                        "territory {index} claimed at height {} but clock is at {}",
                        slot.last_claimed,
                        engine.height()
                    ),
                });
            }
        }
    }
}

/// Message timestamps must be ordered within each log and agree with the
/// rate-limit stamp.
fn check_messages<R: RoleRegistry>(engine: &Engine<R>, violations: &mut Vec<InvariantViolation>) {
    for token in 0..engine.tokens().next_token_id() {
        let log = engine.messages(token);
        if log.is_empty() {
            continue;
        }

        for pair in log.windows(2) {
            if pair[1].timestamp < pair[0].timestamp {
                violations.push(InvariantViolation {
                    message: format!("message log for token {token} is not time-ordered"),
                });
            }
        }

        if let Some(last) = log.last() {
            if engine.message_log().last_message_block(token) != Some(last.timestamp) {
                violations.push(InvariantViolation {
                    message: format!("rate-limit stamp for token {token} disagrees with its log"),
                });
            }
        }
    }
}

/// Assert all engine invariants hold, panicking if any are violated.
///
/// Only active in debug builds. No-op in release builds.
///
/// # Panics
///
/// Panics with a detailed message if any invariant is violated.
#[cfg(debug_assertions)]
pub fn assert_invariants<R: RoleRegistry>(engine: &Engine<R>) {
    let violations = check_invariants(engine);
    if !violations.is_empty() {
        let messages: Vec<_> = violations.iter().map(|v| v.message.as_str()).collect();
        panic!("Engine invariant violations:\n  - {}", messages.join("\n  - "));
    }
}

/// No-op in release builds.
#[cfg(not(debug_assertions))]
pub fn assert_invariants<R: RoleRegistry>(_engine: &Engine<R>) {}
