//! Hands held at the table: player hands with their stakes and the dealer's
//! hand with its hole card.

use alloc::vec::Vec;

use serde::Serialize;

use crate::card::Card;
use crate::error::HandShape;

/// Value of a set of cards under blackjack rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct HandValue {
    /// Hand total.
    pub total: u8,
    /// Whether an ace is being counted as 11.
    pub soft: bool,
}

impl HandValue {
    /// Returns whether the total is over 21.
    #[must_use]
    pub const fn is_bust(self) -> bool {
        self.total > 21
    }
}

/// Evaluates cards the way the table does: non-aces at face value, then each
/// ace as 11 if that keeps the running total at 21 or less, otherwise as 1.
#[must_use]
pub fn evaluate(cards: &[Card]) -> HandValue {
    let mut total: u8 = 0;
    let mut aces: u8 = 0;

    for card in cards {
        if card.is_ace() {
            aces += 1;
        } else {
            total = total.saturating_add(card.numeric_value());
        }
    }

    let mut soft = false;
    for _ in 0..aces {
        if total <= 10 {
            total += 11;
            soft = true;
        } else {
            total = total.saturating_add(1);
        }
    }

    HandValue { total, soft }
}

/// Where a player hand stands in the round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HandStatus {
    /// Still taking decisions.
    Active,
    /// Stood.
    Stand,
    /// Went over 21.
    Bust,
    /// Two-card 21 from the initial deal.
    Blackjack,
    /// Given up for half the stake.
    Surrendered,
}

/// A player's hand.
#[derive(Debug, Clone, Serialize)]
pub struct Hand {
    /// Cards in the hand.
    cards: Vec<Card>,
    /// Derived from the cards except for stand and surrender.
    status: HandStatus,
    /// Stake riding on this hand.
    bet: u64,
    /// Whether this hand came out of a split.
    from_split: bool,
    /// Whether the bet on this hand was doubled.
    doubled: bool,
}

impl Hand {
    /// Empty hand staked with `bet`.
    #[must_use]
    pub const fn new(bet: u64) -> Self {
        Self {
            cards: Vec::new(),
            status: HandStatus::Active,
            bet,
            from_split: false,
            doubled: false,
        }
    }

    /// One half of a split pair, waiting for its second card.
    #[must_use]
    pub fn from_split(card: Card, bet: u64) -> Self {
        Self {
            cards: alloc::vec![card],
            status: HandStatus::Active,
            bet,
            from_split: true,
            doubled: false,
        }
    }

    /// Adds a card to the hand and updates the status.
    pub fn add_card(&mut self, card: Card) {
        self.cards.push(card);

        let value = self.value();

        if value.is_bust() {
            self.status = HandStatus::Bust;
        }
        // Naturals only count on the initial deal, never on split hands
        else if self.cards.len() == 2 && value.total == 21 && !self.from_split {
            self.status = HandStatus::Blackjack;
        }
    }

    /// Cards held, in the order received.
    #[must_use]
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Current status.
    #[must_use]
    pub const fn status(&self) -> HandStatus {
        self.status
    }

    /// Sets the hand status.
    pub const fn set_status(&mut self, status: HandStatus) {
        self.status = status;
    }

    /// Returns whether the hand can still take actions.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == HandStatus::Active
    }

    /// Stake on this hand, doubled included.
    #[must_use]
    pub const fn bet(&self) -> u64 {
        self.bet
    }

    /// Doubles the stake and marks the hand as doubled.
    pub const fn double_bet(&mut self) {
        self.bet = self.bet.saturating_mul(2);
        self.doubled = true;
    }

    /// Returns whether the bet was doubled.
    #[must_use]
    pub const fn is_doubled(&self) -> bool {
        self.doubled
    }

    /// Whether the hand came out of a split, which rules out a natural.
    #[must_use]
    pub const fn is_from_split(&self) -> bool {
        self.from_split
    }

    /// Value of the hand.
    #[must_use]
    pub fn value(&self) -> HandValue {
        evaluate(&self.cards)
    }

    /// Returns whether the hand is soft.
    #[must_use]
    pub fn is_soft(&self) -> bool {
        self.value().soft
    }

    /// Returns whether the hand is a pair that can be split.
    #[must_use]
    pub fn is_pair(&self) -> bool {
        self.cards.len() == 2 && self.cards[0].rank == self.cards[1].rank
    }

    /// Card count.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Whether no card has been dealt yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Removes the second card of a pair and marks this hand as split.
    pub fn take_split_card(&mut self) -> Option<Card> {
        if self.cards.len() == 2 {
            self.from_split = true;
            self.cards.pop()
        } else {
            None
        }
    }

    /// Describes the hand for error reporting.
    #[must_use]
    pub fn shape(&self, hand_index: usize) -> HandShape {
        let value = self.value();
        HandShape {
            hand_index,
            cards: self.cards.len(),
            value: value.total,
            soft: value.soft,
        }
    }
}

/// The dealer's hand.
#[derive(Debug, Clone, Default)]
pub struct DealerHand {
    /// Cards in the hand.
    cards: Vec<Card>,
}

impl DealerHand {
    /// Dealer hand before the deal.
    #[must_use]
    pub const fn new() -> Self {
        Self { cards: Vec::new() }
    }

    /// Adds a card face up.
    pub fn add_card(&mut self, card: Card) {
        self.cards.push(card);
    }

    /// Adds the hole card face down.
    pub fn add_hole_card(&mut self, mut card: Card) {
        card.set_visible(false);
        self.cards.push(card);
    }

    /// Returns all cards in the hand, hidden ones included.
    #[must_use]
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Cards currently face up.
    pub fn visible_cards(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter().filter(|c| c.is_visible())
    }

    /// The first card, dealt face up.
    #[must_use]
    pub fn up_card(&self) -> Option<&Card> {
        self.cards.first()
    }

    /// Returns whether every card is face up.
    #[must_use]
    pub fn is_hole_revealed(&self) -> bool {
        self.cards.iter().all(Card::is_visible)
    }

    /// Turns every card face up.
    pub fn reveal_hole(&mut self) {
        for card in &mut self.cards {
            card.set_visible(true);
        }
    }

    /// Value of the face-up cards only.
    #[must_use]
    pub fn visible_value(&self) -> HandValue {
        let visible: Vec<Card> = self.visible_cards().copied().collect();
        evaluate(&visible)
    }

    /// Full value of the hand, hidden cards included.
    #[must_use]
    pub fn value(&self) -> HandValue {
        evaluate(&self.cards)
    }

    /// Two cards totalling 21, hole card included.
    #[must_use]
    pub fn is_blackjack(&self) -> bool {
        self.cards.len() == 2 && self.value().total == 21
    }

    /// Whether the full value is over 21.
    #[must_use]
    pub fn is_bust(&self) -> bool {
        self.value().is_bust()
    }

    /// Returns whether the hand is soft.
    #[must_use]
    pub fn is_soft(&self) -> bool {
        self.value().soft
    }

    /// Returns whether the dealer has to draw another card.
    ///
    /// The dealer draws below 17, and on a soft 17 when the table makes the
    /// dealer hit soft 17.
    #[must_use]
    pub fn must_hit(&self, hits_soft_17: bool) -> bool {
        let value = self.value();
        value.total < 17 || (value.total == 17 && value.soft && hits_soft_17)
    }

    /// Cards dealt to the dealer.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Whether the dealer holds no cards.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Drops every card.
    pub fn clear(&mut self) {
        self.cards.clear();
    }
}
