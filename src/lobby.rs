//! Inbound boundary for the transport layer.
//!
//! The [`Lobby`] takes authenticated identities and routes their requests to
//! sessions in a [`GameRegistry`]. After every successful change it pushes
//! each seated player's view of the session to an optional [`StateSink`].

use alloc::boxed::Box;
use alloc::collections::{BTreeMap, BTreeSet};
use alloc::string::ToString;
use alloc::vec::Vec;
use core::fmt;
use core::sync::atomic::{AtomicU64, Ordering};

use crate::action::Action;
use crate::error::{GameError, RegistryError};
use crate::game::{Game, LobbyEntry, Phase, PublicState};
use crate::options::ConfigOverrides;
use crate::player::{Identity, Player, PlayerId};
use crate::registry::{GameRegistry, SessionId};
use crate::sync::{Mutex, Shared};

/// Receives state updates for broadcast. Calls must not block.
pub trait StateSink: Send + Sync {
    /// Delivers `state`, as seen by `recipient`, of session `session_id`.
    fn push(&self, session_id: SessionId, recipient: PlayerId, state: &PublicState);
}

/// Routes player requests to live sessions.
pub struct Lobby {
    registry: GameRegistry,
    sink: Option<Box<dyn StateSink>>,
    next_id: AtomicU64,
    /// Players who walked away from a finished session, which keeps its roster.
    departed: Mutex<BTreeMap<SessionId, BTreeSet<PlayerId>>>,
}

impl fmt::Debug for Lobby {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lobby")
            .field("registry", &self.registry)
            .field("sink", &self.sink.is_some())
            .finish_non_exhaustive()
    }
}

impl Lobby {
    /// Creates a lobby over `registry` with no state sink.
    #[must_use]
    pub const fn new(registry: GameRegistry) -> Self {
        Self {
            registry,
            sink: None,
            next_id: AtomicU64::new(1),
            departed: Mutex::new(BTreeMap::new()),
        }
    }

    /// Sets the sink that receives state after every change.
    #[must_use]
    pub fn with_sink(mut self, sink: impl StateSink + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    /// The underlying registry.
    #[must_use]
    pub const fn registry(&self) -> &GameRegistry {
        &self.registry
    }

    fn broadcast(&self, game: &Game) {
        let Some(sink) = &self.sink else {
            return;
        };
        for player in game.players() {
            let state = game.public_state(Some(player.id()));
            sink.push(game.id(), player.id(), &state);
        }
    }

    /// Runs `op` on a session under its lock, then broadcasts.
    ///
    /// A corrupted session is force-ended and dropped from the registry.
    fn with_session<T>(
        &self,
        id: SessionId,
        op: impl FnOnce(&mut Game) -> Result<T, GameError>,
    ) -> Result<T, RegistryError> {
        let handle = self
            .registry
            .get(id)
            .ok_or(RegistryError::UnknownSession(id))?;
        let mut game = handle.lock();

        match op(&mut *game) {
            Ok(value) => {
                self.broadcast(&game);
                Ok(value)
            }
            Err(err) if err.is_fatal() => {
                tracing::error!(session_id = %id, error = %err, "session corrupted");
                game.force_end(&err.to_string());
                self.broadcast(&game);
                drop(game);
                self.drop_session(id);
                Err(err.into())
            }
            Err(err) => Err(err.into()),
        }
    }

    fn drop_session(&self, id: SessionId) -> Option<Shared<Game>> {
        self.departed.lock().remove(&id);
        self.registry.remove(id)
    }

    /// Notes that `player` left finished session `id`, dropping the session
    /// once all `seated` players have gone.
    fn depart_finished(&self, id: SessionId, player: PlayerId, seated: usize) {
        let mut departed = self.departed.lock();
        let gone = departed.entry(id).or_default();
        gone.insert(player);
        if gone.len() < seated {
            return;
        }
        departed.remove(&id);
        drop(departed);

        self.registry.remove(id);
        tracing::info!(session_id = %id, "finished session emptied, removed");
    }

    fn ensure_seated(game: &Game, id: PlayerId) -> Result<(), GameError> {
        if game.player(id).is_none() {
            return Err(GameError::UnknownActor(id));
        }
        Ok(())
    }

    /// Creates a session and seats its creator.
    ///
    /// # Errors
    ///
    /// Returns an error if the game type is unknown or the configuration is
    /// invalid.
    pub fn create_session(
        &self,
        game_type: &str,
        overrides: &ConfigOverrides,
        creator: Identity,
    ) -> Result<SessionId, RegistryError> {
        let mut id = SessionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        while self.registry.get(id).is_some() {
            id = SessionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        }

        self.registry.create(game_type, id, overrides)?;
        if let Err(err) = self.with_session(id, |game| game.add_player(Player::new(creator))) {
            self.registry.remove(id);
            return Err(err);
        }
        Ok(id)
    }

    /// Seats a player.
    ///
    /// # Errors
    ///
    /// Returns an error if the session does not exist or refuses the player.
    pub fn join_session(
        &self,
        id: SessionId,
        identity: Identity,
    ) -> Result<PublicState, RegistryError> {
        let viewer = identity.id;
        self.with_session(id, |game| {
            game.add_player(Player::new(identity))?;
            Ok(game.public_state(Some(viewer)))
        })
    }

    /// Removes a player. A session nobody sits at any more is dropped.
    ///
    /// A finished session keeps its roster; it is dropped once every seated
    /// player has left it.
    ///
    /// # Errors
    ///
    /// Returns an error if the session does not exist, or if it has finished
    /// and the player is not seated in it.
    pub fn leave_session(&self, id: SessionId, identity: &Identity) -> Result<(), RegistryError> {
        let handle = self
            .registry
            .get(id)
            .ok_or(RegistryError::UnknownSession(id))?;
        let game = handle.lock();
        if game.phase() == Phase::Finished {
            Self::ensure_seated(&game, identity.id)?;
            let seated = game.players().len();
            drop(game);
            self.depart_finished(id, identity.id, seated);
            return Ok(());
        }
        drop(game);

        let remaining = self.with_session(id, |game| {
            game.remove_player(identity.id)?;
            Ok(game.players().len())
        })?;

        if remaining == 0 {
            self.drop_session(id);
        }
        Ok(())
    }

    /// Starts the round. The starter must be seated.
    ///
    /// # Errors
    ///
    /// Returns an error if the starter is not seated or the session cannot
    /// start.
    pub fn start_session(
        &self,
        id: SessionId,
        identity: &Identity,
    ) -> Result<PublicState, RegistryError> {
        self.with_session(id, |game| {
            Self::ensure_seated(game, identity.id)?;
            game.start()?;
            Ok(game.public_state(Some(identity.id)))
        })
    }

    /// Sets a player's stake for the coming round.
    ///
    /// # Errors
    ///
    /// Returns an error if the session does not exist or rejects the bet.
    pub fn place_bet(
        &self,
        id: SessionId,
        identity: &Identity,
        amount: u64,
    ) -> Result<(), RegistryError> {
        self.with_session(id, |game| game.place_bet(identity.id, amount))
    }

    /// Applies a player action and returns the player's new view.
    ///
    /// # Errors
    ///
    /// Returns an error if the session does not exist or rejects the action;
    /// the session is unchanged in that case.
    pub fn perform_action(
        &self,
        id: SessionId,
        identity: &Identity,
        action: Action,
    ) -> Result<PublicState, RegistryError> {
        self.with_session(id, |game| {
            game.apply_action(identity.id, action)?;
            Ok(game.public_state(Some(identity.id)))
        })
    }

    /// Current state of a session as seen by `viewer`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownSession`] if the session is not live.
    pub fn public_state(
        &self,
        id: SessionId,
        viewer: Option<PlayerId>,
    ) -> Result<PublicState, RegistryError> {
        let handle = self
            .registry
            .get(id)
            .ok_or(RegistryError::UnknownSession(id))?;
        let state = handle.lock().public_state(viewer);
        Ok(state)
    }

    /// Ends a session and drops it from the registry.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownSession`] if the session is not live.
    pub fn close_session(&self, id: SessionId) -> Result<(), RegistryError> {
        let handle = self
            .drop_session(id)
            .ok_or(RegistryError::UnknownSession(id))?;
        let mut game = handle.lock();
        if game.end().is_ok() {
            self.broadcast(&game);
        }
        Ok(())
    }

    /// Lobby listing of every live session.
    #[must_use]
    pub fn list_sessions(&self) -> Vec<LobbyEntry> {
        self.registry.list_active()
    }
}
