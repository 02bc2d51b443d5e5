use crate::action::{Action, ActionKind};
use crate::error::{GameError, HandShape, IllegalAction, IllegalReason};
use crate::game::Table;
use crate::hand::{Hand, HandStatus};
use crate::history::Event;
use crate::player::{Player, PlayerId};

use super::{Blackjack, RoundPhase};

/// The hand an action would land on, for error reporting.
fn shape_of(player: &Player) -> HandShape {
    let hands = player.hands();
    let index = player.active_hand_index().min(hands.len().saturating_sub(1));
    hands
        .get(index)
        .map_or_else(HandShape::default, |hand| hand.shape(index))
}

/// A concrete action of the given kind, used to test legality.
pub(super) const fn candidate(kind: ActionKind, player: &Player) -> Action {
    match kind {
        ActionKind::Hit => Action::Hit,
        ActionKind::Stand => Action::Stand,
        ActionKind::Double => Action::Double,
        ActionKind::Split => Action::Split,
        ActionKind::Surrender => Action::Surrender,
        ActionKind::Insurance => Action::Insurance {
            amount: Blackjack::max_insurance(player),
        },
        ActionKind::DeclineInsurance => Action::DeclineInsurance,
    }
}

impl Blackjack {
    fn double_refusal(&self, hand: &Hand) -> Option<IllegalReason> {
        if hand.len() != 2 {
            return Some(IllegalReason::NotTwoCards);
        }
        if hand.is_from_split() && !self.settings.double_after_split {
            return Some(IllegalReason::DoubleRestricted);
        }
        if !self.settings.double.allows(hand.value().total) {
            return Some(IllegalReason::DoubleRestricted);
        }
        None
    }

    fn split_refusal(&self, player: &Player, hand: &Hand) -> Option<IllegalReason> {
        if hand.len() != 2 {
            return Some(IllegalReason::NotTwoCards);
        }
        if !hand.is_pair() {
            return Some(IllegalReason::NotAPair);
        }
        if player.hands().len() > usize::from(self.settings.max_splits) {
            return Some(IllegalReason::MaxSplitsReached);
        }
        None
    }

    fn surrender_refusal(&self, player: &Player, hand: &Hand) -> Option<IllegalReason> {
        if !self.settings.surrender {
            return Some(IllegalReason::SurrenderNotOffered);
        }
        if player.has_acted() || player.hands().len() > 1 {
            return Some(IllegalReason::NotFirstDecision);
        }
        if hand.len() != 2 {
            return Some(IllegalReason::NotTwoCards);
        }
        None
    }

    /// Checks an action against the round without touching anything.
    pub(super) fn check_action(
        &self,
        table: &Table,
        player_id: PlayerId,
        action: &Action,
    ) -> Result<(), IllegalAction> {
        let kind = action.kind();
        let Some(player) = table.player(player_id) else {
            return Err(IllegalAction {
                action: kind,
                reason: IllegalReason::NotDealtIn,
                hand: HandShape::default(),
            });
        };
        let deny = |reason| IllegalAction {
            action: kind,
            reason,
            hand: shape_of(player),
        };

        if self.round != RoundPhase::PlayerTurns {
            return Err(deny(IllegalReason::NotPlayerTurns));
        }
        if !Self::dealt_in(player) {
            return Err(deny(IllegalReason::NotDealtIn));
        }

        let refusal = match *action {
            Action::Insurance { amount } => self.insurance_refusal(player, amount),
            Action::DeclineInsurance => self.insurance_decision_refusal(player),
            // No card moves until the dealer has checked for a natural.
            _ if self.insurance_pending => Some(IllegalReason::InsuranceDecisionPending),
            _ => self.hand_refusal(player, action),
        };
        refusal.map_or(Ok(()), |r| Err(deny(r)))
    }

    fn hand_refusal(&self, player: &Player, action: &Action) -> Option<IllegalReason> {
        let Some(hand) = player.active_hand() else {
            return Some(IllegalReason::HandFinished);
        };
        match action {
            Action::Double => self.double_refusal(hand),
            Action::Split => self.split_refusal(player, hand),
            Action::Surrender => self.surrender_refusal(player, hand),
            Action::Hit | Action::Stand | Action::Insurance { .. } | Action::DeclineInsurance => None,
        }
    }

    /// Player action: Hit (draw a card).
    pub(super) fn hit(&mut self, table: &mut Table, seat: usize) -> Result<(), GameError> {
        let card = self.draw(table);

        let player = &mut table.players_mut()[seat];
        let id = player.id();
        let hand = player
            .active_hand_mut()
            .ok_or(GameError::Corrupted("no active hand to hit"))?;
        hand.add_card(card);
        let value = hand.value().total;
        let bust = hand.status() == HandStatus::Bust;

        table.record(
            Some(id),
            Event::Hit {
                card: Some(card),
                value: Some(value),
            },
        );
        if bust {
            table.record(Some(id), Event::Bust { value: Some(value) });
        }
        Ok(())
    }

    /// Player action: Stand (keep the current hand).
    pub(super) fn stand(table: &mut Table, seat: usize) -> Result<(), GameError> {
        let player = &mut table.players_mut()[seat];
        let id = player.id();
        let hand = player
            .active_hand_mut()
            .ok_or(GameError::Corrupted("no active hand to stand on"))?;
        hand.set_status(HandStatus::Stand);
        let value = hand.value().total;

        table.record(Some(id), Event::Stand { value: Some(value) });
        Ok(())
    }

    /// Player action: Double down (double the bet, take one card, stand).
    pub(super) fn double(&mut self, table: &mut Table, seat: usize) -> Result<(), GameError> {
        let card = self.draw(table);

        let player = &mut table.players_mut()[seat];
        let id = player.id();
        let hand = player
            .active_hand_mut()
            .ok_or(GameError::Corrupted("no active hand to double"))?;
        hand.double_bet();
        hand.add_card(card);
        if hand.status() == HandStatus::Active {
            hand.set_status(HandStatus::Stand);
        }
        let bet = hand.bet();
        let value = hand.value().total;
        let bust = hand.status() == HandStatus::Bust;

        table.record(
            Some(id),
            Event::Double {
                bet,
                card: Some(card),
            },
        );
        if bust {
            table.record(Some(id), Event::Bust { value: Some(value) });
        }
        Ok(())
    }

    /// Player action: Split a pair into two hands, each dealt one more card.
    ///
    /// The new hand goes right after the split one and carries the same bet;
    /// play continues on the left hand.
    pub(super) fn split(&mut self, table: &mut Table, seat: usize) -> Result<(), GameError> {
        let left_card = self.draw(table);
        let right_card = self.draw(table);

        let player = &mut table.players_mut()[seat];
        let id = player.id();
        let index = player.active_hand_index();
        let hand = player
            .active_hand_mut()
            .ok_or(GameError::Corrupted("no active hand to split"))?;
        let moved = hand
            .take_split_card()
            .ok_or(GameError::Corrupted("split hand lost its pair"))?;
        let mut right = Hand::from_split(moved, hand.bet());
        hand.add_card(left_card);
        right.add_card(right_card);
        player.hands_mut().insert(index + 1, right);
        let hands = player.hands().len();

        table.record(Some(id), Event::Split { hands });
        Ok(())
    }

    /// Player action: Surrender (take back half the bet and stop).
    pub(super) fn surrender(&mut self, table: &mut Table, seat: usize) -> Result<(), GameError> {
        let player = &mut table.players_mut()[seat];
        let id = player.id();
        let hand = player
            .active_hand_mut()
            .ok_or(GameError::Corrupted("no active hand to surrender"))?;
        hand.set_status(HandStatus::Surrendered);
        let refund = self.surrender_refund(hand.bet());

        table.record(Some(id), Event::Surrender { refund });
        Ok(())
    }
}
