use crate::card::Card;
use crate::error::IllegalReason;
use crate::game::Table;
use crate::history::Event;
use crate::player::Player;

use super::Blackjack;

impl Blackjack {
    /// Returns whether players may still buy insurance this round.
    #[must_use]
    pub const fn is_insurance_open(&self) -> bool {
        self.insurance_pending
    }

    /// Largest insurance a player may buy.
    pub(super) const fn max_insurance(player: &Player) -> u64 {
        player.bet() / 2
    }

    /// Why `player` may not take or decline insurance right now, if anything.
    pub(super) fn insurance_decision_refusal(&self, player: &Player) -> Option<IllegalReason> {
        if !self.settings.insurance {
            return Some(IllegalReason::InsuranceNotOffered);
        }
        if !self.dealer.up_card().is_some_and(Card::is_ace) {
            return Some(IllegalReason::DealerNotShowingAce);
        }
        if player.insurance() > 0 {
            return Some(IllegalReason::InsuranceAlreadyPlaced);
        }
        if player.has_declined_insurance() {
            return Some(IllegalReason::InsuranceDeclined);
        }
        if player.is_finished() {
            return Some(IllegalReason::HandFinished);
        }
        if !self.insurance_pending || player.has_acted() {
            return Some(IllegalReason::NotFirstDecision);
        }
        None
    }

    /// Why `player` may not insure `amount` right now, if anything.
    pub(super) fn insurance_refusal(&self, player: &Player, amount: u64) -> Option<IllegalReason> {
        self.insurance_decision_refusal(player).or_else(|| {
            let max = Self::max_insurance(player);
            (amount == 0 || amount > max).then_some(IllegalReason::InsuranceAmount { max })
        })
    }

    /// Every dealt player has insured, declined, or has nothing left to decide.
    pub(super) fn insurance_window_closed(&self, table: &Table) -> bool {
        table
            .players()
            .iter()
            .filter(|p| Self::dealt_in(p))
            .all(|p| p.is_finished() || p.insurance() > 0 || p.has_declined_insurance())
    }

    /// Places a validated insurance bet. Does not count as a decision.
    pub(super) fn insure(table: &mut Table, seat: usize, amount: u64) {
        let player = &mut table.players_mut()[seat];
        player.set_insurance(amount);
        let id = player.id();

        table.record(Some(id), Event::Insurance { amount });
        tracing::debug!(session_id = %table.id(), player_id = %id, amount, "insurance placed");
    }

    /// Records that a player passed on insurance.
    pub(super) fn decline(table: &mut Table, seat: usize) {
        let player = &mut table.players_mut()[seat];
        player.decline_insurance();
        let id = player.id();

        table.record(Some(id), Event::InsuranceDeclined);
        tracing::debug!(session_id = %table.id(), player_id = %id, "insurance declined");
    }
}
