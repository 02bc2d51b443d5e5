//! Players seated in a session.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use serde::{Deserialize, Serialize};

use crate::hand::{Hand, HandStatus};

/// Opaque player id handed over by the identity collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An authenticated identity. The engine never checks credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Account id.
    pub id: PlayerId,
    /// Name shown at the table.
    pub display_name: String,
}

impl Identity {
    /// Creates an identity.
    pub fn new(id: u64, display_name: impl Into<String>) -> Self {
        Self {
            id: PlayerId(id),
            display_name: display_name.into(),
        }
    }
}

/// A participant's game-scoped state.
#[derive(Debug, Clone)]
pub struct Player {
    id: PlayerId,
    display_name: String,
    /// Stake for the next round.
    bet: u64,
    /// One hand, or several after a split. Empty between rounds.
    hands: Vec<Hand>,
    /// Index of the hand currently being played.
    active_hand: usize,
    /// Insurance side bet for this round.
    insurance: u64,
    /// Whether the player made a decision this round.
    acted: bool,
    /// Whether the player passed on insurance this round.
    declined_insurance: bool,
}

impl Player {
    /// Creates a player from an identity with no stake.
    #[must_use]
    pub fn new(identity: Identity) -> Self {
        Self {
            id: identity.id,
            display_name: identity.display_name,
            bet: 0,
            hands: Vec::new(),
            active_hand: 0,
            insurance: 0,
            acted: false,
            declined_insurance: false,
        }
    }

    /// Sets the stake the player joins with.
    #[must_use]
    pub const fn with_bet(mut self, bet: u64) -> Self {
        self.bet = bet;
        self
    }

    /// Player id.
    #[must_use]
    pub const fn id(&self) -> PlayerId {
        self.id
    }

    /// Name shown at the table.
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Stake for the round.
    #[must_use]
    pub const fn bet(&self) -> u64 {
        self.bet
    }

    pub(crate) const fn set_bet(&mut self, bet: u64) {
        self.bet = bet;
    }

    /// Sum of the bets riding on every hand, doubles and splits included.
    #[must_use]
    pub fn total_bet(&self) -> u64 {
        self.hands
            .iter()
            .fold(0, |total: u64, hand| total.saturating_add(hand.bet()))
    }

    /// All hands of the round.
    #[must_use]
    pub fn hands(&self) -> &[Hand] {
        &self.hands
    }

    /// Index of the hand being played.
    #[must_use]
    pub const fn active_hand_index(&self) -> usize {
        self.active_hand
    }

    /// The hand being played, if it is still active.
    #[must_use]
    pub fn active_hand(&self) -> Option<&Hand> {
        self.hands.get(self.active_hand).filter(|h| h.is_active())
    }

    pub(crate) fn active_hand_mut(&mut self) -> Option<&mut Hand> {
        self.hands.get_mut(self.active_hand).filter(|h| h.is_active())
    }

    pub(crate) fn hands_mut(&mut self) -> &mut Vec<Hand> {
        &mut self.hands
    }

    /// Insurance placed this round.
    #[must_use]
    pub const fn insurance(&self) -> u64 {
        self.insurance
    }

    pub(crate) const fn set_insurance(&mut self, amount: u64) {
        self.insurance = amount;
    }

    /// Whether the player passed on insurance this round.
    #[must_use]
    pub const fn has_declined_insurance(&self) -> bool {
        self.declined_insurance
    }

    pub(crate) const fn decline_insurance(&mut self) {
        self.declined_insurance = true;
    }

    /// Whether the player already made a decision this round.
    #[must_use]
    pub const fn has_acted(&self) -> bool {
        self.acted
    }

    pub(crate) const fn mark_acted(&mut self) {
        self.acted = true;
    }

    /// Clears round state and seats one empty hand carrying the stake.
    pub(crate) fn reset_round(&mut self) {
        self.hands.clear();
        self.hands.push(Hand::new(self.bet));
        self.active_hand = 0;
        self.insurance = 0;
        self.acted = false;
        self.declined_insurance = false;
    }

    /// Clears round state without seating a hand.
    pub(crate) fn clear_round(&mut self) {
        self.hands.clear();
        self.active_hand = 0;
        self.insurance = 0;
        self.acted = false;
        self.declined_insurance = false;
    }

    /// Moves to the next hand that can still act, if the current one is done.
    pub(crate) fn advance_hand(&mut self) {
        while self.active_hand < self.hands.len() && !self.hands[self.active_hand].is_active() {
            self.active_hand += 1;
        }
    }

    /// Whether the player has hands and none of them can act.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        !self.hands.is_empty() && self.hands.iter().all(|h| !h.is_active())
    }

    /// Whether the player holds a natural blackjack.
    #[must_use]
    pub fn has_blackjack(&self) -> bool {
        self.hands
            .iter()
            .any(|h| h.status() == HandStatus::Blackjack)
    }
}
