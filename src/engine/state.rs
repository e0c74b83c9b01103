//! The engine aggregate: all ledgers behind a single mutation entry point.
//!
//! One operation runs at a time, to completion. Every mutating operation
//! validates all of its preconditions before the first state write, so a
//! failed call leaves the engine exactly as it found it.

use std::collections::BTreeSet;

use crate::engine::battle::{self, battle_power};
use crate::engine::{
    Alliance, AllianceId, AllianceRegistry, BlockHeight, Challenge, ChallengeBook, ChallengeId,
    ChallengeStatus, ChainLink, EngineEvent, LevelInfo, LevelLedger, Message, MessageLog,
    PlayerStats, TerritoryId, TerritoryLedger, TerritorySlot, TokenId, TokenLedger, TradeBook,
    CHALLENGE_LOSS_XP, CHALLENGE_WIN_XP, CONTEST_REPUTATION_MARGIN, MAX_MSG_LEN,
    MSG_COOLDOWN_BLOCKS, REPUTATION_XP_SCALE, TERRITORY_COOLDOWN_BLOCKS, TERRITORY_XP,
};
use crate::error::{EngineError, EngineResult};
use crate::roles::{
    Principal, RoleId, RoleRegistry, ALLIANCE_LEADER, COMMANDER, FIRST_WIN, GAME_ADMIN, TRADER,
    VETERAN,
};

/// The authoritative game state machine.
///
/// Generic over the injected role registry so tests can supply a
/// deterministic in-memory table and hosts can wire a real identity service.
#[derive(Debug, Clone)]
pub struct Engine<R> {
    pub(crate) roles: R,
    pub(crate) root: Principal,
    pub(crate) height: BlockHeight,
    pub(crate) tokens: TokenLedger,
    pub(crate) levels: LevelLedger,
    pub(crate) alliances: AllianceRegistry,
    pub(crate) challenges: ChallengeBook,
    pub(crate) trades: TradeBook,
    pub(crate) territories: TerritoryLedger,
    pub(crate) messages: MessageLog,
    pub(crate) events: Vec<EngineEvent>,
    pub(crate) used_role_uids: BTreeSet<u64>,
}

impl<R: RoleRegistry> Engine<R> {
    /// Create an engine with the given mint authority and role registry.
    ///
    /// The root principal receives the game-admin role on construction.
    #[must_use]
    pub fn new(root: Principal, mut roles: R) -> Self {
        roles.grant(root, GAME_ADMIN);
        Self {
            roles,
            root,
            height: 0,
            tokens: TokenLedger::new(),
            levels: LevelLedger::new(),
            alliances: AllianceRegistry::new(),
            challenges: ChallengeBook::new(),
            trades: TradeBook::new(),
            territories: TerritoryLedger::new(),
            messages: MessageLog::new(),
            events: Vec::new(),
            used_role_uids: BTreeSet::new(),
        }
    }

    // === Clock ===

    /// Current block height.
    #[must_use]
    pub fn height(&self) -> BlockHeight {
        self.height
    }

    /// Advance the block-height clock by `blocks`.
    pub fn advance_blocks(&mut self, blocks: BlockHeight) {
        self.height = self.height.saturating_add(blocks);
    }

    // === Collaborators ===

    /// The injected role registry.
    #[must_use]
    pub fn roles(&self) -> &R {
        &self.roles
    }

    /// Mutable access to the role registry.
    ///
    /// The registry is an external collaborator; the host environment may
    /// change role state between engine calls.
    pub fn roles_mut(&mut self) -> &mut R {
        &mut self.roles
    }

    /// The principal holding mint authority.
    #[must_use]
    pub fn root(&self) -> Principal {
        self.root
    }

    // === Token custody ===

    /// Mint the next token to `owner` with an opaque payload.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Unauthorized`] unless `caller` is the root
    /// principal.
    pub fn mint(&mut self, caller: Principal, owner: Principal, data: &[u8]) -> EngineResult<TokenId> {
        if caller != self.root {
            return Err(EngineError::Unauthorized { caller });
        }

        let token = self.tokens.mint(owner, data, self.height);
        self.events.push(EngineEvent::Minted { token, owner });
        Ok(token)
    }

    /// Current owner of a token.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownToken`] for unminted ids.
    pub fn owner_of(&self, token: TokenId) -> EngineResult<Principal> {
        self.tokens.owner_of(token)
    }

    /// Walk the mint-provenance chain backward from `token`, producing
    /// exactly `depth` links.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownToken`] for unminted ids.
    pub fn get_chain(&self, token: TokenId, depth: usize) -> EngineResult<Vec<ChainLink>> {
        self.tokens.get_chain(token, depth)
    }

    /// The token ledger.
    #[must_use]
    pub fn tokens(&self) -> &TokenLedger {
        &self.tokens
    }

    // === Leveling ===

    /// Level and XP for a token.
    #[must_use]
    pub fn level_of(&self, token: TokenId) -> LevelInfo {
        self.levels.level_of(token)
    }

    // === Alliances ===

    /// Create an alliance from tokens the caller owns.
    ///
    /// Grants the caller the alliance-leader role as a side effect.
    ///
    /// # Errors
    ///
    /// - [`EngineError::UnknownToken`] if any id is unminted.
    /// - [`EngineError::NotOwnerOfAllTokens`] if the caller does not own
    ///   every token in the set.
    /// - [`EngineError::RoleRequired`] without the commander role.
    pub fn create_alliance(
        &mut self,
        caller: Principal,
        tokens: &[TokenId],
    ) -> EngineResult<AllianceId> {
        for &token in tokens {
            if self.tokens.owner_of(token)? != caller {
                return Err(EngineError::NotOwnerOfAllTokens);
            }
        }
        if !self.roles.has_role(caller, COMMANDER) {
            return Err(EngineError::RoleRequired { role: COMMANDER });
        }

        let alliance = self.alliances.create(caller, tokens);
        self.roles.grant(caller, ALLIANCE_LEADER);
        self.events.push(EngineEvent::AllianceCreated {
            alliance,
            leader: caller,
        });
        Ok(alliance)
    }

    /// Move a token the caller owns into an existing alliance.
    ///
    /// # Errors
    ///
    /// - [`EngineError::AllianceNotFound`] if the alliance does not exist.
    /// - [`EngineError::UnknownToken`] if the token is unminted.
    /// - [`EngineError::NotOwner`] if the caller does not own the token.
    pub fn join_alliance(
        &mut self,
        caller: Principal,
        alliance: AllianceId,
        token: TokenId,
    ) -> EngineResult<()> {
        if !self.alliances.contains(alliance) {
            return Err(EngineError::AllianceNotFound { alliance });
        }
        if self.tokens.owner_of(token)? != caller {
            return Err(EngineError::NotOwner { token });
        }

        self.alliances.join(alliance, token);
        self.events
            .push(EngineEvent::AllianceJoined { alliance, token });
        Ok(())
    }

    /// Look up an alliance by id.
    #[must_use]
    pub fn alliance(&self, alliance: AllianceId) -> Option<&Alliance> {
        self.alliances.get(alliance)
    }

    /// Current alliance of a token, if any.
    #[must_use]
    pub fn alliance_of(&self, token: TokenId) -> Option<AllianceId> {
        self.alliances.alliance_of(token)
    }

    /// The alliance registry.
    #[must_use]
    pub fn alliances(&self) -> &AllianceRegistry {
        &self.alliances
    }

    // === Challenges ===

    /// Deterministic battle power of a token.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownToken`] for unminted ids.
    pub fn calculate_battle_power(&self, token: TokenId) -> EngineResult<u64> {
        let owner = self.tokens.owner_of(token)?;
        let level = self.levels.level_of(token).level;
        Ok(battle_power(level, battle::role_bonus(&self.roles, owner)))
    }

    /// Issue a pending challenge from `challenger` against `opponent`.
    ///
    /// # Errors
    ///
    /// - [`EngineError::UnknownToken`] if either token is unminted.
    /// - [`EngineError::NotChallengerOwner`] if the caller does not own the
    ///   challenging token.
    /// - [`EngineError::SelfChallenge`] if both sides are the same token.
    pub fn issue_challenge(
        &mut self,
        caller: Principal,
        challenger: TokenId,
        opponent: TokenId,
    ) -> EngineResult<ChallengeId> {
        let challenger_owner = self.tokens.owner_of(challenger)?;
        self.tokens.owner_of(opponent)?;
        if challenger_owner != caller {
            return Err(EngineError::NotChallengerOwner { token: challenger });
        }
        if challenger == opponent {
            return Err(EngineError::SelfChallenge { token: challenger });
        }

        let challenge = self.challenges.open(challenger, opponent);
        self.events.push(EngineEvent::ChallengeIssued {
            challenge,
            challenger,
            opponent,
        });
        Ok(challenge)
    }

    /// Accept a pending challenge and resolve the battle.
    ///
    /// The strictly higher battle power wins; a tie goes to the lower token
    /// id. Both tokens gain XP, the winner strictly more. The winning
    /// principal receives the first-win achievement on their first victory.
    /// Returns the winning principal.
    ///
    /// # Errors
    ///
    /// - [`EngineError::UnknownChallenge`] for unallocated ids.
    /// - [`EngineError::ChallengeNotPending`] if already resolved.
    /// - [`EngineError::NotOpponentOwner`] if the caller does not own the
    ///   challenged token.
    pub fn accept_challenge(
        &mut self,
        caller: Principal,
        challenge: ChallengeId,
    ) -> EngineResult<Principal> {
        let entry = self
            .challenges
            .get(challenge)
            .ok_or(EngineError::UnknownChallenge { challenge })?;
        if entry.status != ChallengeStatus::Pending {
            return Err(EngineError::ChallengeNotPending { challenge });
        }
        if self.tokens.owner_of(entry.opponent)? != caller {
            return Err(EngineError::NotOpponentOwner {
                token: entry.opponent,
            });
        }

        let challenger_power = self.calculate_battle_power(entry.challenger)?;
        let opponent_power = self.calculate_battle_power(entry.opponent)?;
        let winning_token = battle::winning_token(
            entry.challenger,
            challenger_power,
            entry.opponent,
            opponent_power,
        );
        let losing_token = if winning_token == entry.challenger {
            entry.opponent
        } else {
            entry.challenger
        };
        let winner = self.tokens.owner_of(winning_token)?;

        self.levels.grant_xp(winning_token, CHALLENGE_WIN_XP);
        self.levels.grant_xp(losing_token, CHALLENGE_LOSS_XP);
        self.challenges.resolve(challenge, winner);
        if !self.roles.has_role(winner, FIRST_WIN) {
            self.roles.grant(winner, FIRST_WIN);
        }
        self.events.push(EngineEvent::ChallengeResolved {
            challenge,
            winner,
            winning_token,
        });
        Ok(winner)
    }

    /// Look up a challenge by id.
    #[must_use]
    pub fn challenge(&self, challenge: ChallengeId) -> Option<Challenge> {
        self.challenges.get(challenge)
    }

    /// The challenge book.
    #[must_use]
    pub fn challenges(&self) -> &ChallengeBook {
        &self.challenges
    }

    // === Trading ===

    /// Record a trade proposal `from -> to`, overwriting any prior proposal
    /// for the same source token.
    ///
    /// # Errors
    ///
    /// - [`EngineError::UnknownToken`] if either token is unminted.
    /// - [`EngineError::NotOwner`] if the caller does not own `from`.
    pub fn propose_trade(
        &mut self,
        caller: Principal,
        from: TokenId,
        to: TokenId,
    ) -> EngineResult<()> {
        if self.tokens.owner_of(from)? != caller {
            return Err(EngineError::NotOwner { token: from });
        }
        self.tokens.owner_of(to)?;

        self.trades.propose(from, to);
        self.events.push(EngineEvent::TradeProposed { from, to });
        Ok(())
    }

    /// Accept a trade proposal: atomically swap the two owners and clear
    /// the proposal.
    ///
    /// # Errors
    ///
    /// - [`EngineError::UnknownToken`] if either token is unminted.
    /// - [`EngineError::NotOwner`] if the caller does not own `to`.
    /// - [`EngineError::NoProposal`] unless the active proposal for `from`
    ///   is exactly `to`.
    pub fn accept_trade(
        &mut self,
        caller: Principal,
        from: TokenId,
        to: TokenId,
    ) -> EngineResult<()> {
        if self.tokens.owner_of(to)? != caller {
            return Err(EngineError::NotOwner { token: to });
        }
        if self.trades.proposal(from) != Some(to) {
            return Err(EngineError::NoProposal { from, to });
        }

        self.tokens.swap_owners(from, to)?;
        self.trades.clear(from);
        self.events.push(EngineEvent::TradeSettled { from, to });
        Ok(())
    }

    /// Active trade proposal for a source token, if any.
    #[must_use]
    pub fn trade_proposal(&self, from: TokenId) -> Option<TokenId> {
        self.trades.proposal(from)
    }

    /// The trade book.
    #[must_use]
    pub fn trades(&self) -> &TradeBook {
        &self.trades
    }

    // === Territories ===

    /// Claim a territory slot with a token the caller owns.
    ///
    /// Unclaimed slots are taken outright. Claimed slots are contested: the
    /// previous claim must be off cooldown, and the claimant's reputation
    /// must exceed the current holder's by the contest margin. A token
    /// contesting its own slot fails the margin by construction, which
    /// blocks XP farming via re-claims.
    ///
    /// A successful claim grants the token the flat territory XP award plus
    /// a reputation-scaled bonus.
    ///
    /// # Errors
    ///
    /// - [`EngineError::InvalidTerritory`] for out-of-range indices.
    /// - [`EngineError::UnknownToken`] if the token is unminted.
    /// - [`EngineError::NotNftOwner`] if the caller does not own the token.
    /// - [`EngineError::Cooldown`] if the previous claim is too recent.
    /// - [`EngineError::InsufficientReputation`] if the contest margin is
    ///   not met.
    pub fn claim_territory(
        &mut self,
        caller: Principal,
        territory: TerritoryId,
        token: TokenId,
    ) -> EngineResult<()> {
        let slot = self
            .territories
            .get(territory)
            .ok_or(EngineError::InvalidTerritory { territory })?;
        if self.tokens.owner_of(token)? != caller {
            return Err(EngineError::NotNftOwner { token });
        }

        if let Some(holder_token) = slot.owner_token {
            let elapsed = self.height.saturating_sub(slot.last_claimed);
            if elapsed < TERRITORY_COOLDOWN_BLOCKS {
                return Err(EngineError::Cooldown {
                    remaining: TERRITORY_COOLDOWN_BLOCKS - elapsed,
                });
            }

            let holder = self.tokens.owner_of(holder_token)?;
            let required = self
                .roles
                .reputation(holder)
                .saturating_add(CONTEST_REPUTATION_MARGIN);
            let actual = self.roles.reputation(caller);
            if actual < required {
                return Err(EngineError::InsufficientReputation { required, actual });
            }
        }

        let reputation = self.roles.reputation(caller);
        self.territories.set(
            territory,
            TerritorySlot {
                owner_token: Some(token),
                alliance: self.alliances.alliance_of(token),
                last_claimed: self.height,
            },
        );
        let award = TERRITORY_XP.saturating_add(REPUTATION_XP_SCALE.saturating_mul(reputation));
        self.levels.grant_xp(token, award);
        self.events
            .push(EngineEvent::TerritoryClaimed { territory, token });
        Ok(())
    }

    /// Slot state for a territory, or `None` for an out-of-range index.
    #[must_use]
    pub fn territory(&self, territory: TerritoryId) -> Option<TerritorySlot> {
        self.territories.get(territory)
    }

    /// The territory ledger.
    #[must_use]
    pub fn territories(&self) -> &TerritoryLedger {
        &self.territories
    }

    /// Role flags and territory holdings for a principal.
    ///
    /// Territory holdings are counted with a linear scan of the fixed slot
    /// array, which stays cheap because the array is small.
    #[must_use]
    pub fn get_player_stats(&self, principal: Principal) -> PlayerStats {
        let mut owned_territories = 0;
        for slot in self.territories.slots() {
            if let Some(token) = slot.owner_token {
                if self.tokens.owner_of(token) == Ok(principal) {
                    owned_territories += 1;
                }
            }
        }

        PlayerStats {
            is_veteran: self.roles.has_role(principal, VETERAN),
            is_commander: self.roles.has_role(principal, COMMANDER),
            is_trader: self.roles.has_role(principal, TRADER),
            owned_territories,
        }
    }

    // === Messaging ===

    /// Send a message on a token the caller owns.
    ///
    /// Only the SHA-256 digest of `text` is stored. The required fee is
    /// `BASE_MSG_FEE * (msg_count + 1)`; overpaying is accepted.
    ///
    /// # Errors
    ///
    /// - [`EngineError::UnknownToken`] if the token is unminted.
    /// - [`EngineError::NotNftOwner`] if the caller does not own the token.
    /// - [`EngineError::MessageTooLong`] beyond [`MAX_MSG_LEN`] bytes.
    /// - [`EngineError::Cooldown`] within [`MSG_COOLDOWN_BLOCKS`] of the
    ///   token's previous message.
    /// - [`EngineError::InsufficientFee`] if the attached fee is short.
    pub fn send_message(
        &mut self,
        caller: Principal,
        token: TokenId,
        text: &str,
        fee: u64,
    ) -> EngineResult<()> {
        if self.tokens.owner_of(token)? != caller {
            return Err(EngineError::NotNftOwner { token });
        }
        if text.len() > MAX_MSG_LEN {
            return Err(EngineError::MessageTooLong {
                len: text.len(),
                max: MAX_MSG_LEN,
            });
        }
        if let Some(last) = self.messages.last_message_block(token) {
            let elapsed = self.height.saturating_sub(last);
            if elapsed < MSG_COOLDOWN_BLOCKS {
                return Err(EngineError::Cooldown {
                    remaining: MSG_COOLDOWN_BLOCKS - elapsed,
                });
            }
        }
        let required = self.messages.required_fee(token);
        if fee < required {
            return Err(EngineError::InsufficientFee {
                required,
                attached: fee,
            });
        }

        self.messages.push(
            token,
            Message {
                from: caller,
                text_hash: MessageLog::hash_text(text),
                timestamp: self.height,
                fee,
            },
        );
        self.events.push(EngineEvent::MessageSent { token, fee });
        Ok(())
    }

    /// Number of messages accepted for a token.
    #[must_use]
    pub fn msg_count(&self, token: TokenId) -> u64 {
        self.messages.msg_count(token)
    }

    /// All messages accepted for a token, oldest first.
    #[must_use]
    pub fn messages(&self, token: TokenId) -> &[Message] {
        self.messages.messages(token)
    }

    /// The message log.
    #[must_use]
    pub fn message_log(&self) -> &MessageLog {
        &self.messages
    }

    // === Access control ===

    /// Issue a role through the external registry.
    ///
    /// `uid` is a caller-supplied idempotency token: a reused uid turns the
    /// call into a successful no-op, so duplicate submissions can never
    /// double-issue.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::RoleRequired`] unless the caller holds the
    /// game-admin role.
    pub fn issue_game_role(
        &mut self,
        caller: Principal,
        principal: Principal,
        role: RoleId,
        uid: u64,
    ) -> EngineResult<()> {
        if !self.roles.has_role(caller, GAME_ADMIN) {
            return Err(EngineError::RoleRequired { role: GAME_ADMIN });
        }
        if !self.used_role_uids.insert(uid) {
            return Ok(());
        }

        self.roles.grant(principal, role);
        self.events.push(EngineEvent::RoleIssued { principal, role });
        Ok(())
    }

    // === Events ===

    /// All events committed so far, in submission order.
    #[must_use]
    pub fn events(&self) -> &[EngineEvent] {
        &self.events
    }
}
