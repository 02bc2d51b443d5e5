//! Session engine and phase state machine.
//!
//! A [`Game`] is one table: a [`Table`] holding the roster, turn pointer,
//! phase and history, plus a boxed [`Rules`] implementation supplying the
//! game-specific behaviour. The base enforces roster and phase rules; the
//! rule set owns the cards.

use alloc::boxed::Box;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;

use crate::action::{Action, ActionKind};
use crate::clock::now_millis;
use crate::error::{GameError, IllegalAction};
use crate::history::{Event, History};
use crate::options::GameConfig;
use crate::player::{Player, PlayerId};
use crate::registry::SessionId;

pub mod state;
pub mod view;

pub use state::{Phase, Progress};
pub use view::{HandView, LobbyEntry, PlayerView, PublicState, RulesSummary, RulesView};

/// Number of history entries included in a public state.
pub const HISTORY_TAIL: usize = 20;

/// Game-specific behaviour plugged into a [`Game`].
///
/// Hooks receive the shared [`Table`] and return whether the round is over.
/// `validate_action` must not mutate anything, and `apply_action` must either
/// succeed or leave the table untouched.
pub trait Rules: Send + fmt::Debug {
    /// Name, description and rule notes.
    fn summary(&self) -> RulesSummary;

    /// Fallible round preparation, run before the session enters `playing`.
    ///
    /// # Errors
    ///
    /// An error aborts the start and leaves the session in `ready`.
    fn prepare_round(&mut self, table: &Table) -> Result<(), GameError>;

    /// Runs once the session has entered `playing`.
    fn on_start(&mut self, table: &mut Table) -> Progress;

    /// Runs when the session finishes.
    fn on_end(&mut self, _table: &mut Table) {}

    /// Runs after a player was removed from the roster.
    fn on_player_left(&mut self, _table: &mut Table, _player: &Player) -> Progress {
        Progress::Continue
    }

    /// Checks an action against the current state without changing it.
    ///
    /// # Errors
    ///
    /// Returns the structured reason the action is rejected.
    fn validate_action(
        &self,
        table: &Table,
        player_id: PlayerId,
        action: &Action,
    ) -> Result<(), IllegalAction>;

    /// Applies an action.
    ///
    /// # Errors
    ///
    /// Returns an error without mutating anything if the action is illegal.
    fn apply_action(
        &mut self,
        table: &mut Table,
        player_id: PlayerId,
        action: Action,
    ) -> Result<Progress, GameError>;

    /// Actions the player could legally take right now.
    fn available_actions(&self, table: &Table, player_id: PlayerId) -> Vec<ActionKind>;

    /// Game-specific public state for `viewer`.
    fn view(&self, table: &Table, viewer: Option<PlayerId>) -> RulesView;
}

/// Shared state of a session: roster, turn pointer, phase, history.
#[derive(Debug)]
pub struct Table {
    id: SessionId,
    game_type: String,
    config: GameConfig,
    players: Vec<Player>,
    turn_index: usize,
    phase: Phase,
    history: History,
    created_at: u64,
    started_at: Option<u64>,
    ended_at: Option<u64>,
}

impl Table {
    fn new(id: SessionId, game_type: String, config: GameConfig) -> Self {
        Self {
            id,
            game_type,
            config,
            players: Vec::new(),
            turn_index: 0,
            phase: Phase::Waiting,
            history: History::new(),
            created_at: now_millis(),
            started_at: None,
            ended_at: None,
        }
    }

    /// Session id.
    #[must_use]
    pub const fn id(&self) -> SessionId {
        self.id
    }

    /// Registered game type name.
    #[must_use]
    pub fn game_type(&self) -> &str {
        &self.game_type
    }

    /// Effective configuration.
    #[must_use]
    pub const fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Roster in join order.
    #[must_use]
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Mutable roster. The order must not be changed.
    pub fn players_mut(&mut self) -> &mut [Player] {
        &mut self.players
    }

    /// Looks up a seated player.
    #[must_use]
    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id() == id)
    }

    /// Looks up a seated player mutably.
    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id() == id)
    }

    /// Seat index of a player.
    #[must_use]
    pub fn seat_of(&self, id: PlayerId) -> Option<usize> {
        self.players.iter().position(|p| p.id() == id)
    }

    /// Current turn index.
    #[must_use]
    pub const fn turn_index(&self) -> usize {
        self.turn_index
    }

    /// Player whose turn it is.
    #[must_use]
    pub fn current_player(&self) -> Option<&Player> {
        self.players.get(self.turn_index)
    }

    /// Moves the turn pointer, logging `turn_changed` if it moved.
    pub fn set_turn(&mut self, index: usize) {
        if index == self.turn_index || index >= self.players.len() {
            return;
        }
        self.turn_index = index;
        let actor = self.players.get(index).map(Player::id);
        self.history
            .record(actor, Event::TurnChanged { turn_index: index });
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// The session log.
    #[must_use]
    pub const fn history(&self) -> &History {
        &self.history
    }

    /// Appends to the session log.
    pub fn record(&mut self, actor: Option<PlayerId>, event: Event) {
        self.history.record(actor, event);
    }

    /// Creation time.
    #[must_use]
    pub const fn created_at(&self) -> u64 {
        self.created_at
    }

    /// Start time, once started.
    #[must_use]
    pub const fn started_at(&self) -> Option<u64> {
        self.started_at
    }

    /// End time, once finished.
    #[must_use]
    pub const fn ended_at(&self) -> Option<u64> {
        self.ended_at
    }

    fn has_quorum(&self) -> bool {
        self.players.len() >= self.config.min_players
    }
}

/// A live session.
pub struct Game {
    table: Table,
    rules: Box<dyn Rules>,
}

impl fmt::Debug for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Game")
            .field("id", &self.table.id)
            .field("game_type", &self.table.game_type)
            .field("phase", &self.table.phase)
            .field("players", &self.table.players.len())
            .finish_non_exhaustive()
    }
}

impl Game {
    /// Creates a session in the `waiting` phase.
    pub fn new(
        id: SessionId,
        game_type: impl Into<String>,
        config: GameConfig,
        rules: Box<dyn Rules>,
    ) -> Self {
        Self {
            table: Table::new(id, game_type.into(), config),
            rules,
        }
    }

    /// Shared session state.
    #[must_use]
    pub const fn table(&self) -> &Table {
        &self.table
    }

    /// Session id.
    #[must_use]
    pub const fn id(&self) -> SessionId {
        self.table.id
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.table.phase
    }

    /// Roster in join order.
    #[must_use]
    pub fn players(&self) -> &[Player] {
        &self.table.players
    }

    /// Looks up a seated player.
    #[must_use]
    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.table.player(id)
    }

    /// The session log.
    #[must_use]
    pub const fn history(&self) -> &History {
        &self.table.history
    }

    /// Name, description and rule notes of the game type.
    #[must_use]
    pub fn rules_summary(&self) -> RulesSummary {
        self.rules.summary()
    }

    const fn ensure_open(&self) -> Result<(), GameError> {
        if matches!(self.table.phase, Phase::Finished) {
            return Err(GameError::GameFinished);
        }
        Ok(())
    }

    /// Seats a player.
    ///
    /// # Errors
    ///
    /// Returns an error if the session has finished or is full, if it already
    /// seats a player with this id, or if the player's stake is above the
    /// table limit.
    pub fn add_player(&mut self, player: Player) -> Result<(), GameError> {
        self.ensure_open()?;

        if self.table.players.len() >= self.table.config.max_players {
            return Err(GameError::SessionFull {
                max: self.table.config.max_players,
            });
        }
        if self.table.player(player.id()).is_some() {
            return Err(GameError::DuplicatePlayer(player.id()));
        }
        let max = self.table.config.settings.max_bet;
        if player.bet() > max {
            return Err(GameError::InvalidBet { max });
        }

        let id = player.id();
        let display_name = player.display_name().to_string();
        self.table.players.push(player);

        if self.table.phase == Phase::Waiting && self.table.has_quorum() {
            self.table.phase = Phase::Ready;
        }

        self.table
            .record(Some(id), Event::PlayerJoined { display_name });
        tracing::info!(
            session_id = %self.table.id,
            player_id = %id,
            players = self.table.players.len(),
            phase = %self.table.phase,
            "player joined"
        );

        Ok(())
    }

    /// Removes a player. Does nothing if the player is not seated.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::GameFinished`] once the session has finished.
    pub fn remove_player(&mut self, id: PlayerId) -> Result<(), GameError> {
        self.ensure_open()?;

        let Some(seat) = self.table.seat_of(id) else {
            return Ok(());
        };

        let player = self.table.players.remove(seat);
        if seat < self.table.turn_index {
            self.table.turn_index -= 1;
        }
        if self.table.turn_index >= self.table.players.len() {
            self.table.turn_index = 0;
        }

        if matches!(self.table.phase, Phase::Ready | Phase::Playing) && !self.table.has_quorum()
        {
            self.table.phase = Phase::Waiting;
        }

        self.table.record(
            Some(id),
            Event::PlayerLeft {
                display_name: player.display_name().to_string(),
            },
        );
        tracing::info!(
            session_id = %self.table.id,
            player_id = %id,
            players = self.table.players.len(),
            phase = %self.table.phase,
            "player left"
        );

        if self.rules.on_player_left(&mut self.table, &player) == Progress::RoundOver {
            self.finish();
        }

        Ok(())
    }

    /// Sets a player's stake for the coming round.
    ///
    /// # Errors
    ///
    /// Returns an error if the amount is zero or above the table limit, the
    /// player is not seated, or the round has already started.
    pub fn place_bet(&mut self, id: PlayerId, amount: u64) -> Result<(), GameError> {
        self.ensure_open()?;

        let max = self.table.config.settings.max_bet;
        if amount == 0 || amount > max {
            return Err(GameError::InvalidBet { max });
        }
        if self.table.phase == Phase::Playing {
            return Err(GameError::InvalidPhase {
                expected: Phase::Ready,
                actual: Phase::Playing,
            });
        }
        let player = self
            .table
            .player_mut(id)
            .ok_or(GameError::UnknownActor(id))?;
        player.set_bet(amount);

        self.table.record(Some(id), Event::BetPlaced { amount });
        tracing::debug!(session_id = %self.table.id, player_id = %id, amount, "bet placed");
        Ok(())
    }

    /// Starts the round.
    ///
    /// # Errors
    ///
    /// Returns an error if the session has finished, has too few players, is
    /// not `ready`, or the rule set cannot prepare the round.
    pub fn start(&mut self) -> Result<(), GameError> {
        self.ensure_open()?;

        let present = self.table.players.len();
        if !self.table.has_quorum() {
            return Err(GameError::NotEnoughPlayers {
                required: self.table.config.min_players,
                present,
            });
        }
        if self.table.phase != Phase::Ready {
            return Err(GameError::InvalidPhase {
                expected: Phase::Ready,
                actual: self.table.phase,
            });
        }

        self.rules.prepare_round(&self.table)?;

        self.table.phase = Phase::Playing;
        self.table.started_at = Some(now_millis());
        self.table.turn_index = 0;
        self.table.record(None, Event::GameStarted);
        tracing::info!(
            session_id = %self.table.id,
            game_type = %self.table.game_type,
            players = present,
            "game started"
        );

        if self.rules.on_start(&mut self.table) == Progress::RoundOver {
            self.finish();
        }

        Ok(())
    }

    /// Ends the session. Terminal.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::GameFinished`] if the session already finished.
    pub fn end(&mut self) -> Result<(), GameError> {
        self.ensure_open()?;
        self.finish();
        Ok(())
    }

    fn finish(&mut self) {
        self.table.phase = Phase::Finished;
        self.table.ended_at = Some(now_millis());
        self.rules.on_end(&mut self.table);
        self.table.record(None, Event::GameEnded);
        tracing::info!(session_id = %self.table.id, "game ended");
    }

    /// Ends the session after an internal error, recording why.
    pub fn force_end(&mut self, reason: &str) {
        if self.table.phase == Phase::Finished {
            return;
        }
        tracing::warn!(session_id = %self.table.id, reason, "force-ending session");
        self.table.record(
            None,
            Event::ForceEnded {
                reason: reason.to_string(),
            },
        );
        self.finish();
    }

    /// Moves the turn to the next seat.
    ///
    /// # Errors
    ///
    /// Returns an error if the session has finished or nobody is seated.
    pub fn advance_turn(&mut self) -> Result<(), GameError> {
        self.ensure_open()?;

        if self.table.players.is_empty() {
            return Err(GameError::NoPlayers);
        }

        self.table.turn_index = (self.table.turn_index + 1) % self.table.players.len();
        let turn_index = self.table.turn_index;
        let actor = self.table.players.get(turn_index).map(Player::id);
        self.table.record(actor, Event::TurnChanged { turn_index });
        Ok(())
    }

    fn ensure_actor_in_play(&self, player_id: PlayerId) -> Result<(), GameError> {
        self.ensure_open()?;

        if self.table.player(player_id).is_none() {
            return Err(GameError::UnknownActor(player_id));
        }
        if self.table.phase != Phase::Playing {
            return Err(GameError::InvalidPhase {
                expected: Phase::Playing,
                actual: self.table.phase,
            });
        }
        Ok(())
    }

    /// Checks whether an action would be accepted, without applying it.
    ///
    /// # Errors
    ///
    /// Returns the same error [`Game::apply_action`] would return.
    pub fn validate_action(&self, player_id: PlayerId, action: &Action) -> Result<(), GameError> {
        self.ensure_actor_in_play(player_id)?;
        self.rules
            .validate_action(&self.table, player_id, action)
            .map_err(GameError::from)
    }

    /// Applies a player action.
    ///
    /// # Errors
    ///
    /// Returns an error if the session has finished, the player is not
    /// seated, the session is not `playing`, or the rule set rejects the
    /// action. The session is unchanged on error.
    pub fn apply_action(&mut self, player_id: PlayerId, action: Action) -> Result<(), GameError> {
        if let Err(err) = self.validate_action(player_id, &action) {
            tracing::debug!(
                session_id = %self.table.id,
                player_id = %player_id,
                action = %action.kind(),
                error = %err,
                "action rejected"
            );
            return Err(err);
        }

        let progress = self.rules.apply_action(&mut self.table, player_id, action)?;
        tracing::debug!(
            session_id = %self.table.id,
            player_id = %player_id,
            action = %action.kind(),
            "action applied"
        );

        if progress == Progress::RoundOver {
            self.finish();
        }
        Ok(())
    }

    /// Actions the player could take right now. Empty outside `playing`.
    #[must_use]
    pub fn available_actions(&self, player_id: PlayerId) -> Vec<ActionKind> {
        if self.ensure_actor_in_play(player_id).is_err() {
            return Vec::new();
        }
        self.rules.available_actions(&self.table, player_id)
    }

    /// Public state as seen by `viewer`; `None` sees no private cards.
    #[must_use]
    pub fn public_state(&self, viewer: Option<PlayerId>) -> PublicState {
        let table = &self.table;
        let players = table
            .players
            .iter()
            .enumerate()
            .map(|(seat, player)| {
                let own = viewer == Some(player.id());
                let actions = if own {
                    self.available_actions(player.id())
                } else {
                    Vec::new()
                };
                PlayerView::new(player, own, seat == table.turn_index, actions)
            })
            .collect();

        PublicState {
            session_id: table.id,
            game_type: table.game_type.clone(),
            name: table.config.name.clone(),
            phase: table.phase,
            turn_index: table.turn_index,
            players,
            rules: self.rules.view(table, viewer),
            history: table
                .history
                .tail(HISTORY_TAIL)
                .iter()
                .map(|entry| entry.seen_by(viewer))
                .collect(),
            created_at: table.created_at,
            started_at: table.started_at,
            ended_at: table.ended_at,
        }
    }

    /// Lobby listing row for this session.
    #[must_use]
    pub fn lobby_entry(&self) -> LobbyEntry {
        let table = &self.table;
        LobbyEntry {
            session_id: table.id,
            name: table
                .config
                .name
                .clone()
                .unwrap_or_else(|| alloc::format!("{} #{}", table.game_type, table.id)),
            game_type: table.game_type.clone(),
            phase: table.phase,
            current_players: table.players.len(),
            max_players: table.config.max_players,
            has_password: table.config.password_protected,
        }
    }
}
