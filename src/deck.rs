//! Decks and multi-deck shoes.

use alloc::vec::Vec;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::card::{Card, DECK_SIZE, Rank, Suit};
use crate::error::DeckError;

/// Composition of a single deck.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeckConfig {
    /// Suits included in the deck.
    pub suits: Vec<Suit>,
    /// Ranks included for every suit.
    pub ranks: Vec<Rank>,
    /// Number of jokers added on top of the suit/rank cross product.
    pub jokers: u8,
}

impl Default for DeckConfig {
    fn default() -> Self {
        Self {
            suits: Suit::STANDARD.to_vec(),
            ranks: Rank::STANDARD.to_vec(),
            jokers: 0,
        }
    }
}

impl DeckConfig {
    /// Sets the number of jokers.
    #[must_use]
    pub const fn with_jokers(mut self, jokers: u8) -> Self {
        self.jokers = jokers;
        self
    }

    /// Number of cards one deck of this composition holds.
    #[must_use]
    pub fn deck_size(&self) -> usize {
        self.suits.len() * self.ranks.len() + self.jokers as usize
    }

    fn build(&self, copies: u8) -> Vec<Card> {
        let mut cards = Vec::with_capacity(self.deck_size() * copies as usize);
        for _ in 0..copies {
            for &suit in &self.suits {
                for &rank in &self.ranks {
                    cards.push(Card::new(suit, rank));
                }
            }
            for _ in 0..self.jokers {
                cards.push(Card::joker());
            }
        }
        cards
    }
}

/// An ordered stack of cards. The top of the deck is the end of the vector.
#[derive(Debug, Clone)]
pub struct Deck {
    cards: Vec<Card>,
    config: DeckConfig,
    copies: u8,
}

impl Deck {
    /// Builds one deck from the configuration, unshuffled.
    ///
    /// # Errors
    ///
    /// Returns [`DeckError::Configuration`] if the configuration has no suits
    /// or no ranks.
    pub fn new(config: DeckConfig) -> Result<Self, DeckError> {
        Self::with_decks(config, 1)
    }

    /// Builds `copies` decks of the configuration stacked into one shoe.
    ///
    /// # Errors
    ///
    /// Returns [`DeckError::Configuration`] if the configuration has no suits
    /// or no ranks, or if `copies` is zero.
    pub fn with_decks(config: DeckConfig, copies: u8) -> Result<Self, DeckError> {
        if config.suits.is_empty() || config.ranks.is_empty() || copies == 0 {
            return Err(DeckError::Configuration);
        }

        let cards = config.build(copies);
        Ok(Self {
            cards,
            config,
            copies,
        })
    }

    /// A standard 52-card deck.
    #[must_use]
    pub fn standard() -> Self {
        let config = DeckConfig::default();
        let cards = config.build(1);
        debug_assert_eq!(cards.len(), DECK_SIZE);
        Self {
            cards,
            config,
            copies: 1,
        }
    }

    /// Builds a deck holding exactly `cards`, last element on top.
    ///
    /// `reset` on such a deck rebuilds a standard 52-card deck.
    #[must_use]
    pub fn from_cards(cards: Vec<Card>) -> Self {
        Self {
            cards,
            config: DeckConfig::default(),
            copies: 1,
        }
    }

    /// Builds a deck that deals `draws` in order (first element dealt first).
    #[must_use]
    pub fn stacked(draws: &[Card]) -> Self {
        let mut cards = draws.to_vec();
        cards.reverse();
        Self::from_cards(cards)
    }

    /// Shuffles in place (Fisher–Yates).
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) -> &mut Self {
        for i in (1..self.cards.len()).rev() {
            let j = rng.random_range(0..=i);
            self.cards.swap(i, j);
        }
        self
    }

    /// Cuts the deck at a uniformly random point, moving the bottom part on
    /// top of the rest.
    pub fn cut<R: Rng + ?Sized>(&mut self, rng: &mut R) -> &mut Self {
        if !self.cards.is_empty() {
            let point = rng.random_range(0..self.cards.len());
            self.cards.rotate_left(point);
        }
        self
    }

    /// Removes and returns the top card.
    ///
    /// # Errors
    ///
    /// Returns [`DeckError::Empty`] if no cards remain.
    pub fn deal_card(&mut self) -> Result<Card, DeckError> {
        self.cards.pop().ok_or(DeckError::Empty)
    }

    /// Removes and returns `count` cards from the top, in dealing order.
    ///
    /// # Errors
    ///
    /// Returns [`DeckError::InsufficientCards`] without removing anything if
    /// fewer than `count` cards remain.
    pub fn deal_multiple(&mut self, count: usize) -> Result<Vec<Card>, DeckError> {
        self.ensure_remaining(count)?;
        let split = self.cards.len() - count;
        let mut dealt = self.cards.split_off(split);
        dealt.reverse();
        Ok(dealt)
    }

    /// Deals `cards_per_player` cards to each of `player_count` hands,
    /// one card at a time in round-robin order.
    ///
    /// # Errors
    ///
    /// Returns [`DeckError::InsufficientCards`] without removing anything if
    /// the deck cannot cover every hand.
    pub fn deal_to_players(
        &mut self,
        cards_per_player: usize,
        player_count: usize,
    ) -> Result<Vec<Vec<Card>>, DeckError> {
        self.ensure_remaining(cards_per_player.saturating_mul(player_count))?;

        let mut hands: Vec<Vec<Card>> = (0..player_count)
            .map(|_| Vec::with_capacity(cards_per_player))
            .collect();
        for _ in 0..cards_per_player {
            for hand in &mut hands {
                let card = self.deal_card()?;
                hand.push(card);
            }
        }
        Ok(hands)
    }

    fn ensure_remaining(&self, requested: usize) -> Result<(), DeckError> {
        if requested > self.cards.len() {
            return Err(DeckError::InsufficientCards {
                requested,
                remaining: self.cards.len(),
            });
        }
        Ok(())
    }

    /// Number of cards left.
    #[must_use]
    pub fn size(&self) -> usize {
        self.cards.len()
    }

    /// Returns whether no cards are left.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Remaining cards, bottom first.
    #[must_use]
    pub fn remaining(&self) -> &[Card] {
        &self.cards
    }

    /// Rebuilds the original composition, discarding all dealt state.
    pub fn reset(&mut self) -> &mut Self {
        self.cards = self.config.build(self.copies);
        self
    }

    /// Number of deck copies in the composition.
    #[must_use]
    pub const fn copies(&self) -> u8 {
        self.copies
    }

    /// Composition of one deck copy.
    #[must_use]
    pub const fn config(&self) -> &DeckConfig {
        &self.config
    }
}
