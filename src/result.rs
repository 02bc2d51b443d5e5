//! What settlement hands back once the dealer has played.

use alloc::vec::Vec;

use serde::Serialize;

use crate::player::PlayerId;

/// How a single hand was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HandOutcome {
    /// Player has a natural blackjack.
    Blackjack,
    /// Player went over 21.
    Bust,
    /// Dealer went over 21.
    DealerBust,
    /// Player total beat the dealer.
    Win,
    /// Dealer total beat the player.
    Lose,
    /// Equal totals; the bet is returned.
    Push,
    /// Player surrendered.
    Surrender,
}

impl HandOutcome {
    /// Label written to the history log.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Blackjack => "blackjack",
            Self::Bust => "bust",
            Self::DealerBust => "dealer_bust",
            Self::Win => "win",
            Self::Lose => "lose",
            Self::Push => "push",
            Self::Surrender => "surrender",
        }
    }
}

/// Settlement of one hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HandResult {
    /// Position among the player's hands, split hands counted left to right.
    pub hand_index: usize,
    /// How the hand was resolved.
    pub outcome: HandOutcome,
    /// Stake settled, doubles included.
    pub bet: u64,
    /// Amount paid back, stake included.
    pub payout: u64,
    /// Final total of the hand.
    pub player_value: u8,
    /// Dealer total the hand was compared against.
    pub dealer_value: u8,
}

/// Everything one dealt-in player receives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerResult {
    /// Seat being settled.
    pub player_id: PlayerId,
    /// One entry per hand held at settlement.
    pub hands: Vec<HandResult>,
    /// Side bet placed against a dealer natural.
    pub insurance_bet: u64,
    /// Insurance payout (0 unless the dealer had blackjack).
    pub insurance_payout: u64,
    /// Total payout for all hands plus insurance.
    pub total_payout: u64,
    /// Total payout less every stake put up, insurance included.
    pub net: i64,
}

/// Settlement of a whole round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoundResult {
    /// Dealt-in players in seat order.
    pub players: Vec<PlayerResult>,
    /// Dealer's final total.
    pub dealer_value: u8,
    /// Dealer went over 21.
    pub dealer_bust: bool,
    /// Dealer held a natural.
    pub dealer_blackjack: bool,
}

impl RoundResult {
    /// Result for one player.
    #[must_use]
    pub fn player(&self, player_id: PlayerId) -> Option<&PlayerResult> {
        self.players.iter().find(|p| p.player_id == player_id)
    }
}
