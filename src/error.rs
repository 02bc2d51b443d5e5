//! Error types for deck, session and registry operations.

use alloc::string::String;

use thiserror::Error;

use crate::action::ActionKind;
use crate::game::Phase;
use crate::player::PlayerId;
use crate::registry::SessionId;

/// Errors raised by deck construction and dealing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DeckError {
    /// The deck configuration has no suits or no ranks.
    #[error("deck configuration needs at least one suit and one rank")]
    Configuration,
    /// No cards remain.
    #[error("no cards left in the deck")]
    Empty,
    /// More cards were requested than remain.
    #[error("not enough cards: need {requested}, have {remaining}")]
    InsufficientCards {
        /// Number of cards requested.
        requested: usize,
        /// Number of cards left.
        remaining: usize,
    },
}

/// Errors raised while validating a session configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Player bounds are inconsistent.
    #[error("invalid player bounds: min {min}, max {max}")]
    PlayerBounds {
        /// Configured minimum.
        min: usize,
        /// Configured maximum.
        max: usize,
    },
    /// An override tried to widen the game type's player bounds.
    #[error("player bounds must stay within {min}..={max} for this game type")]
    OutsideTypeBounds {
        /// The type's minimum.
        min: usize,
        /// The type's maximum.
        max: usize,
    },
    /// A requested rule variant is not offered by the game type.
    #[error("unknown variant: {0}")]
    UnknownVariant(String),
    /// A rule setting is out of range.
    #[error("invalid setting `{key}`: {reason}")]
    InvalidSetting {
        /// Setting name.
        key: &'static str,
        /// What is wrong with it.
        reason: &'static str,
    },
    /// The deck composition is unusable.
    #[error(transparent)]
    Deck(#[from] DeckError),
}

/// Why an action is not legal right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum IllegalReason {
    /// The round is not waiting for player decisions.
    #[error("the round is not in the player-decision phase")]
    NotPlayerTurns,
    /// The player joined after the cards were dealt.
    #[error("the player was not dealt into this round")]
    NotDealtIn,
    /// The player has no unfinished hand.
    #[error("the hand is already finished")]
    HandFinished,
    /// The action needs exactly two cards.
    #[error("the hand must hold exactly two cards")]
    NotTwoCards,
    /// Split needs a pair.
    #[error("the two cards are not of equal rank")]
    NotAPair,
    /// The split limit has been reached.
    #[error("maximum number of splits reached")]
    MaxSplitsReached,
    /// Doubling is restricted by the table rules for this hand.
    #[error("the table rules do not allow doubling this hand")]
    DoubleRestricted,
    /// Surrender is disabled at this table.
    #[error("surrender is not offered at this table")]
    SurrenderNotOffered,
    /// Insurance is disabled at this table.
    #[error("insurance is not offered at this table")]
    InsuranceNotOffered,
    /// The action is only available as the first decision of the round.
    #[error("only allowed as the first decision of the round")]
    NotFirstDecision,
    /// The dealer's up card is not an ace.
    #[error("the dealer is not showing an ace")]
    DealerNotShowingAce,
    /// Insurance was already placed.
    #[error("insurance was already placed this round")]
    InsuranceAlreadyPlaced,
    /// The player already passed on insurance.
    #[error("insurance was already declined this round")]
    InsuranceDeclined,
    /// Play waits until every player has taken or declined insurance.
    #[error("waiting for every player to take or decline insurance")]
    InsuranceDecisionPending,
    /// Insurance amount outside `1..=bet / 2`.
    #[error("insurance must be between 1 and {max}")]
    InsuranceAmount {
        /// Largest allowed insurance.
        max: u64,
    },
    /// The game type has no handler for this action.
    #[error("this game does not support the action")]
    Unsupported,
}

/// Snapshot of the hand an action was attempted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
pub struct HandShape {
    /// Index of the hand (non-zero after a split).
    pub hand_index: usize,
    /// Number of cards held.
    pub cards: usize,
    /// Current value.
    pub value: u8,
    /// Whether the value counts an ace as 11.
    pub soft: bool,
}

/// A rejected action, with enough detail to explain it to the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("illegal action `{action}`: {reason} (hand {} with {} cards, value {})", .hand.hand_index, .hand.cards, .hand.value)]
pub struct IllegalAction {
    /// The attempted action.
    pub action: ActionKind,
    /// Why it was rejected.
    pub reason: IllegalReason,
    /// The hand it was attempted on.
    pub hand: HandShape,
}

/// Errors raised by session operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    /// The roster is full.
    #[error("session is full ({max} players)")]
    SessionFull {
        /// Configured maximum.
        max: usize,
    },
    /// The player is already seated.
    #[error("player {0} is already in the session")]
    DuplicatePlayer(PlayerId),
    /// The player is not seated.
    #[error("player {0} is not in the session")]
    UnknownActor(PlayerId),
    /// Wrong phase for this operation.
    #[error("invalid phase: expected {expected}, session is {actual}")]
    InvalidPhase {
        /// Phase the operation needs.
        expected: Phase,
        /// Phase the session is in.
        actual: Phase,
    },
    /// The session has ended.
    #[error("the game has finished")]
    GameFinished,
    /// Not enough players to start.
    #[error("need at least {required} players, have {present}")]
    NotEnoughPlayers {
        /// Configured minimum.
        required: usize,
        /// Current roster size.
        present: usize,
    },
    /// The roster is empty.
    #[error("no players in the session")]
    NoPlayers,
    /// Bet amount is zero or above the table limit.
    #[error("bet must be between 1 and {max}")]
    InvalidBet {
        /// Table stake limit.
        max: u64,
    },
    /// The action is not legal for the player's hand right now.
    #[error(transparent)]
    IllegalAction(#[from] IllegalAction),
    /// Deck exhaustion or misconfiguration.
    #[error(transparent)]
    Deck(#[from] DeckError),
    /// Internal state no longer adds up; the session must be discarded.
    #[error("session state is corrupted: {0}")]
    Corrupted(&'static str),
}

impl GameError {
    /// Returns whether the session should be force-ended after this error.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Corrupted(_))
    }
}

/// Errors raised by the registry and the lobby.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// No constructor is registered under this name.
    #[error("unknown game type: {0}")]
    UnknownGameType(String),
    /// A session with this id is already live.
    #[error("session {0} already exists")]
    DuplicateSession(SessionId),
    /// No live session with this id.
    #[error("session {0} not found")]
    UnknownSession(SessionId),
    /// The merged configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The session rejected the operation.
    #[error(transparent)]
    Game(#[from] GameError),
}
