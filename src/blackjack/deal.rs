use alloc::vec::Vec;

use crate::card::Card;
use crate::game::{Progress, Table};
use crate::history::Event;
use crate::player::Player;

use super::{Blackjack, RoundPhase};

impl Blackjack {
    /// Deals the opening cards and resolves naturals.
    ///
    /// Two passes, each one card to every seated player in join order and
    /// then one to the dealer. The dealer's second card is dealt face down.
    pub(super) fn deal_round(&mut self, table: &mut Table) -> Progress {
        self.dealer.clear();
        self.results = None;
        self.insurance_pending = false;
        for player in table.players_mut() {
            player.reset_round();
        }

        let cards = self.shoe.size();
        table.record(None, Event::ShoePrepared { cards });

        let seats = table.players().len();
        for pass in 0..2 {
            for seat in 0..seats {
                let card = self.draw(table);
                if let Some(hand) = table.players_mut()[seat].hands_mut().first_mut() {
                    hand.add_card(card);
                }
            }

            let card = self.draw(table);
            if pass == 0 {
                self.dealer.add_card(card);
            } else {
                self.dealer.add_hole_card(card);
            }
        }

        self.round = RoundPhase::PlayerTurns;
        table.record(None, Event::InitialDeal { players: seats });
        tracing::debug!(
            session_id = %table.id(),
            players = seats,
            shoe = self.shoe.size(),
            "initial deal"
        );

        let naturals: Vec<_> = table
            .players()
            .iter()
            .filter(|p| p.has_blackjack())
            .map(Player::id)
            .collect();
        for id in naturals {
            table.record(Some(id), Event::NaturalBlackjack);
        }

        let up_ace = self.dealer.up_card().is_some_and(Card::is_ace);
        self.insurance_pending = up_ace && self.settings.insurance;

        if self.dealer.is_blackjack() && !self.insurance_pending {
            return self.settle_dealer_blackjack(table);
        }

        self.after_decision(table)
    }
}
