use alloc::vec::Vec;

use crate::game::{Progress, Table};
use crate::hand::{Hand, HandStatus};
use crate::history::Event;
use crate::options::RoundingMode;
use crate::result::{HandOutcome, HandResult, PlayerResult, RoundResult};

use super::{Blackjack, RoundPhase};

#[cfg(feature = "std")]
fn round_amount(amount: f64, mode: RoundingMode) -> u64 {
    match mode {
        RoundingMode::Up => amount.ceil() as u64,
        RoundingMode::Down => amount.floor() as u64,
        RoundingMode::Nearest => amount.round() as u64,
    }
}

#[cfg(all(not(feature = "std"), feature = "alloc"))]
fn round_amount(amount: f64, mode: RoundingMode) -> u64 {
    match mode {
        RoundingMode::Up => libm::ceil(amount) as u64,
        RoundingMode::Down => libm::floor(amount) as u64,
        RoundingMode::Nearest => libm::round(amount) as u64,
    }
}

#[expect(
    clippy::cast_precision_loss,
    reason = "f64 has sufficient precision for table stakes"
)]
fn as_amount(bet: u64) -> f64 {
    bet as f64
}

fn signed(amount: u64) -> i64 {
    i64::try_from(amount).unwrap_or(i64::MAX)
}

impl Blackjack {
    /// Payout for a natural: the bet times the blackjack ratio, rounded.
    pub(super) fn blackjack_payout(&self, bet: u64) -> u64 {
        round_amount(
            as_amount(bet) * self.settings.blackjack_pays,
            self.settings.rounding_blackjack,
        )
    }

    /// Half the bet, rounded, handed back on surrender.
    pub(super) fn surrender_refund(&self, bet: u64) -> u64 {
        round_amount(as_amount(bet) * 0.5, self.settings.rounding_surrender)
    }

    /// Turns the hole card, logging it once.
    fn reveal(&mut self, table: &mut Table) {
        if self.dealer.is_hole_revealed() {
            return;
        }
        self.dealer.reveal_hole();
        if let Some(&card) = self.dealer.cards().get(1) {
            let value = self.dealer.value().total;
            table.record(None, Event::DealerReveal { card, value });
        }
    }

    /// Dealer plays their hand: reveal, then draw while the rules say so.
    ///
    /// The dealer draws below 17 and, when `dealer_hits_soft_17` is set, on
    /// a soft 17.
    pub(super) fn play_dealer(&mut self, table: &mut Table) {
        self.round = RoundPhase::DealerTurn;
        self.reveal(table);

        while self.dealer.must_hit(self.settings.dealer_hits_soft_17) {
            let card = self.draw(table);
            self.dealer.add_card(card);
            let value = self.dealer.value().total;
            table.record(None, Event::DealerHit { card, value });
        }

        let value = self.dealer.value().total;
        table.record(None, Event::DealerStand { value });
        tracing::debug!(session_id = %table.id(), value, "dealer stands");
    }

    /// Dealer natural: reveal and settle without a dealer turn.
    pub(super) fn settle_dealer_blackjack(&mut self, table: &mut Table) -> Progress {
        self.reveal(table);
        table.record(None, Event::DealerBlackjack);
        self.settle(table);
        Progress::RoundOver
    }

    /// Resolves one hand against the dealer.
    ///
    /// Priority: natural, player bust, dealer bust, higher total, lower
    /// total, push. Surrendered hands get their refund.
    fn resolve(&self, hand: &Hand, dealer_value: u8, dealer_bust: bool) -> (HandOutcome, u64) {
        let bet = hand.bet();
        let player_value = hand.value().total;

        match hand.status() {
            HandStatus::Surrendered => (HandOutcome::Surrender, self.surrender_refund(bet)),
            HandStatus::Blackjack => (HandOutcome::Blackjack, self.blackjack_payout(bet)),
            HandStatus::Bust => (HandOutcome::Bust, 0),
            HandStatus::Stand | HandStatus::Active => {
                if dealer_bust {
                    (HandOutcome::DealerBust, bet.saturating_mul(2))
                } else if player_value > dealer_value {
                    (HandOutcome::Win, bet.saturating_mul(2))
                } else if player_value < dealer_value {
                    (HandOutcome::Lose, 0)
                } else {
                    (HandOutcome::Push, bet)
                }
            }
        }
    }

    /// Pays every dealt hand and insurance bet, logging each resolution.
    pub(super) fn settle(&mut self, table: &mut Table) {
        let dealer_value = self.dealer.value().total;
        let dealer_bust = self.dealer.is_bust();
        let dealer_blackjack = self.dealer.is_blackjack();

        let mut players = Vec::new();
        let mut events = Vec::new();

        for player in table.players().iter().filter(|p| Self::dealt_in(p)) {
            let id = player.id();
            let mut hands = Vec::new();
            let mut total_payout: u64 = 0;

            for (hand_index, hand) in player.hands().iter().enumerate() {
                let (outcome, payout) = self.resolve(hand, dealer_value, dealer_bust);
                total_payout = total_payout.saturating_add(payout);
                hands.push(HandResult {
                    hand_index,
                    outcome,
                    bet: hand.bet(),
                    payout,
                    player_value: hand.value().total,
                    dealer_value,
                });
                events.push((
                    id,
                    Event::RoundResult {
                        hand_index,
                        result: outcome,
                        bet: hand.bet(),
                        payout,
                    },
                ));
                tracing::debug!(
                    session_id = %table.id(),
                    player_id = %id,
                    hand_index,
                    outcome = outcome.label(),
                    payout,
                    "hand settled"
                );
            }

            let insurance_bet = player.insurance();
            let insurance_payout = if dealer_blackjack {
                insurance_bet.saturating_mul(2)
            } else {
                0
            };
            if insurance_bet > 0 {
                events.push((
                    id,
                    Event::InsuranceResult {
                        amount: insurance_bet,
                        payout: insurance_payout,
                    },
                ));
            }
            total_payout = total_payout.saturating_add(insurance_payout);

            let staked = player.total_bet().saturating_add(insurance_bet);
            let net = signed(total_payout).saturating_sub(signed(staked));

            tracing::info!(
                session_id = %table.id(),
                player_id = %id,
                total_payout,
                net,
                "player settled"
            );

            players.push(PlayerResult {
                player_id: id,
                hands,
                insurance_bet,
                insurance_payout,
                total_payout,
                net,
            });
        }

        for (id, event) in events {
            table.record(Some(id), event);
        }

        self.results = Some(RoundResult {
            players,
            dealer_value,
            dealer_bust,
            dealer_blackjack,
        });
        self.round = RoundPhase::Settled;
    }
}
