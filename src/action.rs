//! Player actions delivered by the transport.

use core::fmt;

use serde::{Deserialize, Serialize};

/// An action a seated player asks the session to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    /// Draw one card.
    Hit,
    /// Keep the current hand.
    Stand,
    /// Double the bet, take exactly one card, then stand.
    Double,
    /// Split a pair into two hands.
    Split,
    /// Give up the hand for half the bet back.
    Surrender,
    /// Side bet against a dealer blackjack.
    Insurance {
        /// Insurance stake, at most half the original bet.
        amount: u64,
    },
    /// Pass on insurance while the dealer shows an ace.
    DeclineInsurance,
}

impl Action {
    /// The payload-free kind of this action.
    #[must_use]
    pub const fn kind(&self) -> ActionKind {
        match self {
            Self::Hit => ActionKind::Hit,
            Self::Stand => ActionKind::Stand,
            Self::Double => ActionKind::Double,
            Self::Split => ActionKind::Split,
            Self::Surrender => ActionKind::Surrender,
            Self::Insurance { .. } => ActionKind::Insurance,
            Self::DeclineInsurance => ActionKind::DeclineInsurance,
        }
    }
}

/// Kind of a player action, without payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// See [`Action::Hit`].
    Hit,
    /// See [`Action::Stand`].
    Stand,
    /// See [`Action::Double`].
    Double,
    /// See [`Action::Split`].
    Split,
    /// See [`Action::Surrender`].
    Surrender,
    /// See [`Action::Insurance`].
    Insurance,
    /// See [`Action::DeclineInsurance`].
    DeclineInsurance,
}

impl ActionKind {
    /// Every action kind, in the order clients list them.
    pub const ALL: [Self; 7] = [
        Self::Hit,
        Self::Stand,
        Self::Double,
        Self::Split,
        Self::Surrender,
        Self::Insurance,
        Self::DeclineInsurance,
    ];

    /// Wire name of the action.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hit => "hit",
            Self::Stand => "stand",
            Self::Double => "double",
            Self::Split => "split",
            Self::Surrender => "surrender",
            Self::Insurance => "insurance",
            Self::DeclineInsurance => "decline_insurance",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
