//! A server-authoritative card table session engine with optional `no_std`
//! support.
//!
//! A [`GameRegistry`] creates sessions from registered game types. Each
//! session is a [`Game`]: roster, turn pointer, phase state machine and
//! history, with a [`Rules`] implementation supplying the card play. The
//! crate ships the [`Blackjack`] rule set. The [`Lobby`] is the entry point
//! for a transport layer, and with `std` a [`SessionWorker`] can drive a
//! session from its own thread.
//!
//! # Example
//!
//! ```
//! use cardtable::{Action, ConfigOverrides, GameRegistry, Identity, Lobby};
//!
//! let lobby = Lobby::new(GameRegistry::with_builtin_types(42));
//! let alice = Identity::new(1, "alice");
//!
//! let id = lobby
//!     .create_session("blackjack", &ConfigOverrides::default(), alice.clone())
//!     .unwrap();
//! lobby.place_bet(id, &alice, 100).unwrap();
//! let state = lobby.start_session(id, &alice).unwrap();
//! assert_eq!(state.players.len(), 1);
//!
//! // Whatever was dealt, standing is legal unless the round already ended.
//! let _ = lobby.perform_action(id, &alice, Action::Stand);
//! ```
#![cfg_attr(not(feature = "std"), no_std)]
#![cfg_attr(docsrs, feature(doc_cfg))]

#[cfg(all(not(feature = "std"), not(feature = "alloc")))]
compile_error!(
    "`std` is disabled but `alloc` feature is not enabled. Enable `alloc` or keep `std` enabled."
);

extern crate alloc;

pub mod action;
pub mod blackjack;
pub mod card;
mod clock;
pub mod deck;
pub mod error;
pub mod game;
pub mod hand;
pub mod history;
pub mod lobby;
pub mod options;
pub mod player;
pub mod registry;
pub mod result;
mod sync;
#[cfg(feature = "std")]
#[cfg_attr(docsrs, doc(cfg(feature = "std")))]
pub mod worker;

// Re-export main types
pub use action::{Action, ActionKind};
pub use blackjack::{Blackjack, BlackjackView, DealerView, RoundPhase};
pub use card::{Card, DECK_SIZE, Rank, Suit};
pub use deck::{Deck, DeckConfig};
pub use error::{
    ConfigError, DeckError, GameError, HandShape, IllegalAction, IllegalReason, RegistryError,
};
pub use game::{
    Game, HandView, LobbyEntry, Phase, PlayerView, Progress, PublicState, Rules, RulesSummary,
    RulesView, Table,
};
pub use hand::{DealerHand, Hand, HandStatus, HandValue, evaluate};
pub use history::{Event, History, HistoryEntry};
pub use lobby::{Lobby, StateSink};
pub use options::{
    ConfigOverrides, DoubleOption, GameConfig, MAX_BET_LIMIT, RoundingMode, RuleSettings,
    SettingsOverrides,
};
pub use player::{Identity, Player, PlayerId};
pub use registry::{BLACKJACK, Constructor, GameRegistry, SessionId, blackjack_defaults};
pub use result::{HandOutcome, HandResult, PlayerResult, RoundResult};
pub use sync::{Mutex, Shared};
#[cfg(feature = "std")]
pub use worker::{Command, SessionWorker, WorkerError};
