//! The blackjack rule set.
//!
//! A [`Blackjack`] owns the shoe and the dealer and plugs into a
//! [`Game`](crate::Game) through the [`Rules`] trait. One session plays one
//! round: dealing, player decisions, the automated dealer turn and
//! settlement, after which the session ends.
//!
//! When the dealer shows an ace and insurance is offered, every dealt player
//! first takes or declines insurance. Nothing else is accepted until then.
//! Once the last player has answered, the dealer checks for a natural and
//! settles on the spot if there is one.

use alloc::boxed::Box;
use alloc::format;
use alloc::string::ToString;
use alloc::vec;
use alloc::vec::Vec;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::action::{Action, ActionKind};
use crate::card::Card;
use crate::deck::{Deck, DeckConfig};
use crate::error::{ConfigError, DeckError, GameError, IllegalAction};
use crate::game::{Phase, Progress, Rules, RulesSummary, RulesView, Table};
use crate::hand::DealerHand;
use crate::history::Event;
use crate::options::{GameConfig, RuleSettings};
use crate::player::{Player, PlayerId};
use crate::result::RoundResult;

mod actions;
mod deal;
mod dealer;
mod insurance;

/// Where the round stands inside the `playing` phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundPhase {
    /// No cards out.
    Idle,
    /// Waiting for player decisions.
    PlayerTurns,
    /// The dealer is drawing.
    DealerTurn,
    /// Every hand has been paid.
    Settled,
}

/// The dealer as seen by players.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DealerView {
    /// Cards held, the hidden one included.
    pub hand_size: usize,
    /// Face-up cards only.
    pub visible_cards: Vec<Card>,
    /// Value of the face-up cards.
    pub visible_value: u8,
    /// Whether the hole card has been turned.
    pub hole_revealed: bool,
}

/// Blackjack part of a public state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlackjackView {
    /// Round progress.
    pub round: RoundPhase,
    /// The dealer.
    pub dealer: DealerView,
    /// Cards left in the shoe.
    pub shoe_size: usize,
    /// Rule settings in effect.
    pub settings: RuleSettings,
    /// Whether players may still buy insurance.
    pub insurance_open: bool,
    /// Settlement, once the round is over.
    pub results: Option<RoundResult>,
}

/// Blackjack rules, shoe and dealer for one session.
#[derive(Debug)]
pub struct Blackjack {
    settings: RuleSettings,
    shoe: Deck,
    /// Cards to deal in order instead of a shuffled shoe.
    preset: Option<Vec<Card>>,
    dealer: DealerHand,
    round: RoundPhase,
    /// Dealer natural check deferred until the insurance window closes.
    insurance_pending: bool,
    results: Option<RoundResult>,
    rng: ChaCha8Rng,
}

impl Blackjack {
    /// Creates a rule set dealing from shuffled shoes seeded by `seed`.
    #[must_use]
    pub fn new(settings: RuleSettings, seed: u64) -> Self {
        Self {
            settings,
            shoe: Deck::from_cards(Vec::new()),
            preset: None,
            dealer: DealerHand::new(),
            round: RoundPhase::Idle,
            insurance_pending: false,
            results: None,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Creates a rule set that deals `draws` in order, first card first.
    ///
    /// The deal goes one card to each player, one to the dealer, then again,
    /// so with one player the dealer's up card is `draws[1]` and the hole card
    /// `draws[3]`. If the stacked cards run out, a shuffled shoe takes over.
    #[must_use]
    pub fn stacked(settings: RuleSettings, draws: &[Card]) -> Self {
        let mut rules = Self::new(settings, 0);
        rules.preset = Some(draws.to_vec());
        rules
    }

    /// Registry constructor.
    ///
    /// # Errors
    ///
    /// Returns an error if the rule settings are out of range.
    pub fn from_config(config: &GameConfig, seed: u64) -> Result<Box<dyn Rules>, ConfigError> {
        config.settings.validate()?;
        Ok(Box::new(Self::new(config.settings.clone(), seed)))
    }

    /// Rule settings in effect.
    #[must_use]
    pub const fn settings(&self) -> &RuleSettings {
        &self.settings
    }

    /// Round progress.
    #[must_use]
    pub const fn round(&self) -> RoundPhase {
        self.round
    }

    /// The dealer's hand.
    #[must_use]
    pub const fn dealer(&self) -> &DealerHand {
        &self.dealer
    }

    /// Settlement, once the round is over.
    #[must_use]
    pub const fn results(&self) -> Option<&RoundResult> {
        self.results.as_ref()
    }

    fn fresh_shoe(&mut self) -> Result<Deck, GameError> {
        let mut shoe = Deck::with_decks(DeckConfig::default(), self.settings.decks)?;
        shoe.shuffle(&mut self.rng).cut(&mut self.rng);
        Ok(shoe)
    }

    /// Takes the top card, shuffling in a new shoe if this one is empty.
    fn draw(&mut self, table: &mut Table) -> Card {
        loop {
            if let Ok(card) = self.shoe.deal_card() {
                return card;
            }
            self.refresh_shoe(table);
        }
    }

    fn refresh_shoe(&mut self, table: &mut Table) {
        // Settings are validated on construction; the single deck is a last resort.
        self.shoe = self.fresh_shoe().unwrap_or_else(|_| Deck::standard());
        let cards = self.shoe.size();
        table.record(None, Event::ShoeRefreshed { cards });
        tracing::warn!(session_id = %table.id(), cards, "shoe ran out mid-round, refreshed");
    }

    fn dealt_in(player: &Player) -> bool {
        !player.hands().is_empty()
    }

    fn all_finished(table: &Table) -> bool {
        table
            .players()
            .iter()
            .filter(|p| Self::dealt_in(p))
            .all(Player::is_finished)
    }

    fn first_unfinished(table: &Table) -> Option<usize> {
        table
            .players()
            .iter()
            .position(|p| Self::dealt_in(p) && !p.is_finished())
    }

    /// Moves the round forward after any change to the players' hands.
    fn after_decision(&mut self, table: &mut Table) -> Progress {
        if self.insurance_pending && self.insurance_window_closed(table) {
            self.insurance_pending = false;
            if self.dealer.is_blackjack() {
                return self.settle_dealer_blackjack(table);
            }
        }

        if Self::all_finished(table) {
            self.play_dealer(table);
            self.settle(table);
            return Progress::RoundOver;
        }

        if let Some(seat) = Self::first_unfinished(table) {
            table.set_turn(seat);
        }
        Progress::Continue
    }

    fn abandon_round(&mut self, table: &mut Table) {
        for player in table.players_mut() {
            player.clear_round();
        }
        self.dealer.clear();
        self.round = RoundPhase::Idle;
        self.insurance_pending = false;
        table.record(None, Event::RoundAbandoned);
        tracing::info!(session_id = %table.id(), "round abandoned, not enough players");
    }
}

impl Rules for Blackjack {
    fn summary(&self) -> RulesSummary {
        let s = &self.settings;
        RulesSummary {
            name: "Blackjack".to_string(),
            description: "Beat the dealer by getting closer to 21 without going over".to_string(),
            notes: vec![
                "2-10 count face value, J/Q/K count 10, A counts 1 or 11".to_string(),
                format!("Blackjack pays {} times the bet", s.blackjack_pays),
                format!("Dealer hits soft 17: {}", s.dealer_hits_soft_17),
                format!("Decks in the shoe: {}", s.decks),
                format!("Double after split: {}", s.double_after_split),
                format!("Surrender: {}", s.surrender),
                format!("Insurance: {}", s.insurance),
            ],
        }
    }

    fn prepare_round(&mut self, table: &Table) -> Result<(), GameError> {
        let shoe = match &self.preset {
            Some(draws) => Deck::stacked(draws),
            None => self.fresh_shoe()?,
        };

        let requested = (table.players().len() + 1) * 2;
        if shoe.size() < requested {
            return Err(DeckError::InsufficientCards {
                requested,
                remaining: shoe.size(),
            }
            .into());
        }

        self.shoe = shoe;
        Ok(())
    }

    fn on_start(&mut self, table: &mut Table) -> Progress {
        self.deal_round(table)
    }

    fn on_end(&mut self, _table: &mut Table) {
        self.dealer.reveal_hole();
        self.insurance_pending = false;
    }

    fn on_player_left(&mut self, table: &mut Table, player: &Player) -> Progress {
        if self.round != RoundPhase::PlayerTurns {
            return Progress::Continue;
        }
        if table.phase() == Phase::Waiting {
            self.abandon_round(table);
            return Progress::Continue;
        }
        tracing::debug!(
            session_id = %table.id(),
            player_id = %player.id(),
            "player left mid-round"
        );
        self.after_decision(table)
    }

    fn validate_action(
        &self,
        table: &Table,
        player_id: PlayerId,
        action: &Action,
    ) -> Result<(), IllegalAction> {
        self.check_action(table, player_id, action)
    }

    fn apply_action(
        &mut self,
        table: &mut Table,
        player_id: PlayerId,
        action: Action,
    ) -> Result<Progress, GameError> {
        self.check_action(table, player_id, &action)?;
        let seat = table
            .seat_of(player_id)
            .ok_or(GameError::UnknownActor(player_id))?;

        match action {
            Action::Hit => self.hit(table, seat)?,
            Action::Stand => Self::stand(table, seat)?,
            Action::Double => self.double(table, seat)?,
            Action::Split => self.split(table, seat)?,
            Action::Surrender => self.surrender(table, seat)?,
            Action::Insurance { amount } => Self::insure(table, seat, amount),
            Action::DeclineInsurance => Self::decline(table, seat),
        }

        if !matches!(
            action.kind(),
            ActionKind::Insurance | ActionKind::DeclineInsurance
        ) {
            let player = &mut table.players_mut()[seat];
            player.mark_acted();
            player.advance_hand();
        }

        Ok(self.after_decision(table))
    }

    fn available_actions(&self, table: &Table, player_id: PlayerId) -> Vec<ActionKind> {
        let Some(player) = table.player(player_id) else {
            return Vec::new();
        };
        ActionKind::ALL
            .iter()
            .copied()
            .filter(|&kind| {
                let action = actions::candidate(kind, player);
                self.check_action(table, player_id, &action).is_ok()
            })
            .collect()
    }

    fn view(&self, _table: &Table, _viewer: Option<PlayerId>) -> RulesView {
        RulesView::Blackjack(BlackjackView {
            round: self.round,
            dealer: DealerView {
                hand_size: self.dealer.len(),
                visible_cards: self.dealer.visible_cards().copied().collect(),
                visible_value: self.dealer.visible_value().total,
                hole_revealed: !self.dealer.is_empty() && self.dealer.is_hole_revealed(),
            },
            shoe_size: self.shoe.size(),
            settings: self.settings.clone(),
            insurance_open: self.is_insurance_open(),
            results: self.results.clone(),
        })
    }
}
