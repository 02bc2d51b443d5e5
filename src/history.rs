//! Append-only session history.

use alloc::string::String;
use alloc::vec::Vec;

use serde::Serialize;

use crate::card::Card;
use crate::clock::now_millis;
use crate::player::PlayerId;
use crate::result::HandOutcome;

/// Something that happened in a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Event {
    /// A player took a seat.
    PlayerJoined {
        /// Name shown at the table.
        display_name: String,
    },
    /// A player left.
    PlayerLeft {
        /// Name shown at the table.
        display_name: String,
    },
    /// A player set the stake for the next round.
    BetPlaced {
        /// Stake.
        amount: u64,
    },
    /// The session moved to playing.
    GameStarted,
    /// The session finished.
    GameEnded,
    /// The turn pointer moved.
    TurnChanged {
        /// New turn index.
        turn_index: usize,
    },
    /// A fresh shoe was shuffled and cut for the round.
    ShoePrepared {
        /// Cards in the shoe.
        cards: usize,
    },
    /// The shoe ran dry and a fresh one was shuffled in.
    ShoeRefreshed {
        /// Cards in the new shoe.
        cards: usize,
    },
    /// Two cards went to every player and the dealer.
    InitialDeal {
        /// Number of player hands dealt.
        players: usize,
    },
    /// A player was dealt a natural.
    NaturalBlackjack,
    /// The dealer holds a natural; the round goes straight to settlement.
    DealerBlackjack,
    /// A player drew a card.
    Hit {
        /// Card drawn, for the player who drew it.
        #[serde(skip_serializing_if = "Option::is_none")]
        card: Option<Card>,
        /// Hand value after the draw, for the player who drew.
        #[serde(skip_serializing_if = "Option::is_none")]
        value: Option<u8>,
    },
    /// A hand went over 21.
    Bust {
        /// Final value, for the hand's owner.
        #[serde(skip_serializing_if = "Option::is_none")]
        value: Option<u8>,
    },
    /// A player stood.
    Stand {
        /// Value stood on, for the hand's owner.
        #[serde(skip_serializing_if = "Option::is_none")]
        value: Option<u8>,
    },
    /// A player doubled down.
    Double {
        /// New bet on the hand.
        bet: u64,
        /// The one card drawn, for the player who drew it.
        #[serde(skip_serializing_if = "Option::is_none")]
        card: Option<Card>,
    },
    /// A player split a pair.
    Split {
        /// Number of hands after the split.
        hands: usize,
    },
    /// A player surrendered.
    Surrender {
        /// Amount handed back.
        refund: u64,
    },
    /// A player bought insurance.
    Insurance {
        /// Insurance stake.
        amount: u64,
    },
    /// A player passed on insurance.
    InsuranceDeclined,
    /// The dealer turned the hole card.
    DealerReveal {
        /// The hole card.
        card: Card,
        /// Dealer value after the reveal.
        value: u8,
    },
    /// The dealer drew a card.
    DealerHit {
        /// Card drawn.
        card: Card,
        /// Dealer value after the draw.
        value: u8,
    },
    /// The dealer stopped drawing.
    DealerStand {
        /// Final dealer value.
        value: u8,
    },
    /// One hand was settled.
    RoundResult {
        /// Hand index (non-zero for split hands).
        hand_index: usize,
        /// Result label.
        result: HandOutcome,
        /// Bet on the hand.
        bet: u64,
        /// Amount paid out, stake included.
        payout: u64,
    },
    /// An insurance bet was settled.
    InsuranceResult {
        /// Insurance stake.
        amount: u64,
        /// Amount paid out.
        payout: u64,
    },
    /// The round in progress was dropped.
    RoundAbandoned,
    /// The session was shut down after an internal error.
    ForceEnded {
        /// What went wrong.
        reason: String,
    },
}

impl Event {
    /// Snake-case action kind recorded in the log.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::PlayerJoined { .. } => "player_joined",
            Self::PlayerLeft { .. } => "player_left",
            Self::BetPlaced { .. } => "bet_placed",
            Self::GameStarted => "game_started",
            Self::GameEnded => "game_ended",
            Self::TurnChanged { .. } => "turn_changed",
            Self::ShoePrepared { .. } => "shoe_prepared",
            Self::ShoeRefreshed { .. } => "shoe_refreshed",
            Self::InitialDeal { .. } => "initial_deal",
            Self::NaturalBlackjack => "natural_blackjack",
            Self::DealerBlackjack => "dealer_blackjack",
            Self::Hit { .. } => "hit",
            Self::Bust { .. } => "bust",
            Self::Stand { .. } => "stand",
            Self::Double { .. } => "double",
            Self::Split { .. } => "split",
            Self::Surrender { .. } => "surrender",
            Self::Insurance { .. } => "insurance",
            Self::InsuranceDeclined => "insurance_declined",
            Self::DealerReveal { .. } => "dealer_reveal",
            Self::DealerHit { .. } => "dealer_hit",
            Self::DealerStand { .. } => "dealer_stand",
            Self::RoundResult { .. } => "round_result",
            Self::InsuranceResult { .. } => "insurance_result",
            Self::RoundAbandoned => "round_abandoned",
            Self::ForceEnded { .. } => "force_ended",
        }
    }

    /// The event without the cards and hand values only its actor may see.
    #[must_use]
    pub fn redacted(self) -> Self {
        match self {
            Self::Hit { .. } => Self::Hit {
                card: None,
                value: None,
            },
            Self::Bust { .. } => Self::Bust { value: None },
            Self::Stand { .. } => Self::Stand { value: None },
            Self::Double { bet, .. } => Self::Double { bet, card: None },
            other => other,
        }
    }
}

/// One history record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    /// Position in the log, starting at 0.
    pub seq: u64,
    /// When the entry was recorded.
    pub timestamp: u64,
    /// Player the entry is about, if any.
    pub actor: Option<PlayerId>,
    /// What happened.
    #[serde(flatten)]
    pub event: Event,
}

impl HistoryEntry {
    /// The entry as `viewer` may see it. Other players' drawn cards and hand
    /// values are stripped.
    #[must_use]
    pub fn seen_by(&self, viewer: Option<PlayerId>) -> Self {
        let event = if self.actor.is_some() && self.actor != viewer {
            self.event.clone().redacted()
        } else {
            self.event.clone()
        };
        Self {
            seq: self.seq,
            timestamp: self.timestamp,
            actor: self.actor,
            event,
        }
    }
}

/// Append-only log of a session.
#[derive(Debug, Clone, Default)]
pub struct History {
    entries: Vec<HistoryEntry>,
}

impl History {
    /// Creates an empty log.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Appends an entry.
    pub fn record(&mut self, actor: Option<PlayerId>, event: Event) {
        let entry = HistoryEntry {
            seq: self.entries.len() as u64,
            timestamp: now_millis(),
            actor,
            event,
        };
        tracing::trace!(seq = entry.seq, kind = entry.event.kind(), "history entry");
        self.entries.push(entry);
    }

    /// Every entry, oldest first.
    #[must_use]
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// The newest `count` entries, oldest first.
    #[must_use]
    pub fn tail(&self, count: usize) -> &[HistoryEntry] {
        let start = self.entries.len().saturating_sub(count);
        &self.entries[start..]
    }

    /// Entries of the given kind.
    pub fn of_kind<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a HistoryEntry> + 'a {
        self.entries.iter().filter(move |e| e.event.kind() == kind)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether the log is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
