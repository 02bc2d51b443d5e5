//! Serialisable projections of a session for broadcast and lobby listing.

use alloc::string::String;
use alloc::vec::Vec;

use serde::Serialize;

use crate::action::ActionKind;
use crate::blackjack::BlackjackView;
use crate::card::Card;
use crate::hand::{Hand, HandStatus};
use crate::history::HistoryEntry;
use crate::player::{Player, PlayerId};
use crate::registry::SessionId;

use super::Phase;

/// Describes a game type to players.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RulesSummary {
    /// Display name.
    pub name: String,
    /// One-line objective.
    pub description: String,
    /// Rule notes, one per line.
    pub notes: Vec<String>,
}

/// Game-specific part of a [`PublicState`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "game", rename_all = "snake_case")]
pub enum RulesView {
    /// Blackjack table state.
    Blackjack(BlackjackView),
    /// The rule set exposes nothing beyond the base state.
    None,
}

/// One hand as seen by a viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HandView {
    /// Cards, only for the owner.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cards: Option<Vec<Card>>,
    /// Number of cards held.
    pub card_count: usize,
    /// Value, only for the owner.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<u8>,
    /// Hand status.
    pub status: HandStatus,
    /// Bet riding on the hand.
    pub bet: u64,
    /// Whether the bet was doubled.
    pub doubled: bool,
}

impl HandView {
    fn new(hand: &Hand, own: bool) -> Self {
        Self {
            cards: own.then(|| hand.cards().to_vec()),
            card_count: hand.len(),
            value: own.then(|| hand.value().total),
            status: hand.status(),
            bet: hand.bet(),
            doubled: hand.is_doubled(),
        }
    }
}

/// One seat as seen by a viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerView {
    /// Player id.
    pub id: PlayerId,
    /// Name shown at the table.
    pub display_name: String,
    /// Stake for the round.
    pub bet: u64,
    /// Insurance placed this round.
    pub insurance: u64,
    /// Total cards held across all hands.
    pub hand_size: usize,
    /// Hands of the round.
    pub hands: Vec<HandView>,
    /// Whether the turn pointer is on this seat.
    pub is_current_turn: bool,
    /// Whether every hand of the player is done.
    pub finished: bool,
    /// Legal actions, only for the viewer's own seat.
    pub available_actions: Vec<ActionKind>,
}

impl PlayerView {
    pub(crate) fn new(
        player: &Player,
        own: bool,
        is_current_turn: bool,
        available_actions: Vec<ActionKind>,
    ) -> Self {
        Self {
            id: player.id(),
            display_name: player.display_name().into(),
            bet: player.bet(),
            insurance: player.insurance(),
            hand_size: player.hands().iter().map(Hand::len).sum(),
            hands: player
                .hands()
                .iter()
                .map(|hand| HandView::new(hand, own))
                .collect(),
            is_current_turn,
            finished: player.is_finished(),
            available_actions,
        }
    }
}

/// Everything a seated player (or an anonymous viewer) may see.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublicState {
    /// Session id.
    pub session_id: SessionId,
    /// Registered game type.
    pub game_type: String,
    /// Table name, if configured.
    pub name: Option<String>,
    /// Lifecycle phase.
    pub phase: Phase,
    /// Seat whose turn it is.
    pub turn_index: usize,
    /// Roster in join order.
    pub players: Vec<PlayerView>,
    /// Game-specific state.
    pub rules: RulesView,
    /// Most recent history entries, oldest first.
    pub history: Vec<HistoryEntry>,
    /// Creation time.
    pub created_at: u64,
    /// Start time.
    pub started_at: Option<u64>,
    /// End time.
    pub ended_at: Option<u64>,
}

impl PublicState {
    /// Seat view of one player.
    #[must_use]
    pub fn player(&self, id: PlayerId) -> Option<&PlayerView> {
        self.players.iter().find(|p| p.id == id)
    }

    /// Blackjack part of the state, if this is a blackjack table.
    #[must_use]
    pub const fn blackjack(&self) -> Option<&BlackjackView> {
        match &self.rules {
            RulesView::Blackjack(view) => Some(view),
            RulesView::None => None,
        }
    }
}

/// A row of the lobby listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LobbyEntry {
    /// Session id.
    pub session_id: SessionId,
    /// Table name.
    pub name: String,
    /// Registered game type.
    pub game_type: String,
    /// Lifecycle phase.
    pub phase: Phase,
    /// Seated players.
    pub current_players: usize,
    /// Seats at the table.
    pub max_players: usize,
    /// Whether joining needs a password.
    pub has_password: bool,
}
