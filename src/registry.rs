//! Game type registry and live session table.

use alloc::boxed::Box;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;

#[cfg(all(not(feature = "std"), feature = "alloc"))]
use hashbrown::HashMap;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
#[cfg(feature = "std")]
use std::collections::HashMap;

use crate::blackjack::Blackjack;
use crate::error::{ConfigError, RegistryError};
use crate::game::{Game, LobbyEntry, Rules};
use crate::options::{ConfigOverrides, GameConfig};
use crate::sync::{Mutex, Shared, shared};

/// Id of a live session, chosen by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Builds the rule set of a new session from its merged configuration and a
/// per-session seed.
pub type Constructor = fn(&GameConfig, u64) -> Result<Box<dyn Rules>, ConfigError>;

/// Name of the built-in blackjack game type.
pub const BLACKJACK: &str = "blackjack";

/// Default configuration of the built-in blackjack type.
#[must_use]
pub fn blackjack_defaults() -> GameConfig {
    GameConfig::default()
        .with_players(1, 7)
        .with_variants(["standard", "double-deck", "european", "spanish21"])
}

struct GameType {
    constructor: Constructor,
    defaults: GameConfig,
}

/// Maps game type names to constructors and tracks live sessions.
///
/// The type table is set up once, before sharing the registry; the session
/// table sits behind its own lock so lookups from many threads stay short.
pub struct GameRegistry {
    types: HashMap<String, GameType>,
    sessions: Mutex<HashMap<SessionId, Shared<Game>>>,
    seeds: Mutex<ChaCha8Rng>,
}

impl fmt::Debug for GameRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameRegistry")
            .field("types", &self.game_types())
            .field("sessions", &self.len())
            .finish_non_exhaustive()
    }
}

impl GameRegistry {
    /// Creates a registry with no game types.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            types: HashMap::new(),
            sessions: Mutex::new(HashMap::new()),
            seeds: Mutex::new(ChaCha8Rng::seed_from_u64(seed)),
        }
    }

    /// Creates a registry with `blackjack` registered.
    #[must_use]
    pub fn with_builtin_types(seed: u64) -> Self {
        let mut registry = Self::new(seed);
        registry.types.insert(
            BLACKJACK.to_string(),
            GameType {
                constructor: Blackjack::from_config,
                defaults: blackjack_defaults(),
            },
        );
        registry
    }

    /// Registers (or replaces) a game type.
    ///
    /// # Errors
    ///
    /// Returns an error if `defaults` is not a valid configuration.
    pub fn register_type(
        &mut self,
        name: impl Into<String>,
        constructor: Constructor,
        defaults: GameConfig,
    ) -> Result<(), ConfigError> {
        defaults.validate()?;
        let name = name.into();
        tracing::debug!(game_type = %name, "game type registered");
        self.types.insert(
            name,
            GameType {
                constructor,
                defaults,
            },
        );
        Ok(())
    }

    /// Registered game type names, sorted.
    #[must_use]
    pub fn game_types(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.types.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Default configuration of a game type.
    #[must_use]
    pub fn default_config(&self, name: &str) -> Option<&GameConfig> {
        self.types.get(name).map(|t| &t.defaults)
    }

    /// Creates a session of type `name` under `id`.
    ///
    /// `overrides` are merged onto the type's defaults: `settings` key by key,
    /// everything else replaced outright.
    ///
    /// # Errors
    ///
    /// Returns an error if the type is unknown, the id is taken, or the
    /// merged configuration is invalid.
    pub fn create(
        &self,
        name: &str,
        id: SessionId,
        overrides: &ConfigOverrides,
    ) -> Result<Shared<Game>, RegistryError> {
        let game_type = self
            .types
            .get(name)
            .ok_or_else(|| RegistryError::UnknownGameType(name.to_string()))?;
        let config = overrides.apply(&game_type.defaults)?;

        let mut sessions = self.sessions.lock();
        if sessions.contains_key(&id) {
            return Err(RegistryError::DuplicateSession(id));
        }

        let seed = self.seeds.lock().random::<u64>();
        let rules = (game_type.constructor)(&config, seed)?;
        let game = shared(Game::new(id, name, config, rules));
        sessions.insert(id, game.clone());
        drop(sessions);

        tracing::info!(session_id = %id, game_type = name, "session created");
        Ok(game)
    }

    /// Looks up a live session.
    #[must_use]
    pub fn get(&self, id: SessionId) -> Option<Shared<Game>> {
        self.sessions.lock().get(&id).cloned()
    }

    /// Drops a session from the table, returning it if it was live.
    pub fn remove(&self, id: SessionId) -> Option<Shared<Game>> {
        let removed = self.sessions.lock().remove(&id);
        if removed.is_some() {
            tracing::info!(session_id = %id, "session removed");
        }
        removed
    }

    /// Lobby rows of every live session, ordered by id.
    #[must_use]
    pub fn list_active(&self) -> Vec<LobbyEntry> {
        let mut games: Vec<(SessionId, Shared<Game>)> = self
            .sessions
            .lock()
            .iter()
            .map(|(id, game)| (*id, game.clone()))
            .collect();
        games.sort_unstable_by_key(|(id, _)| *id);

        games
            .into_iter()
            .map(|(_, game)| game.lock().lobby_entry())
            .collect()
    }

    /// Number of live sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    /// Returns whether no session is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.lock().is_empty()
    }
}
