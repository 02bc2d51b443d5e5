//! One thread per session, fed by an ordered command queue.
//!
//! Commands sent to a [`SessionWorker`] are applied to the session strictly
//! in the order they were submitted. Each command gets its own reply channel,
//! so callers can fire several commands and collect the replies later.

use alloc::format;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use thiserror::Error;

use crate::action::Action;
use crate::error::GameError;
use crate::game::Game;
use crate::player::{Identity, Player, PlayerId};
use crate::registry::SessionId;
use crate::sync::Shared;

/// A request for a session worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Seat a player.
    Join(Identity),
    /// Remove a player.
    Leave(PlayerId),
    /// Set a player's stake.
    Bet {
        /// Who bets.
        player: PlayerId,
        /// Stake.
        amount: u64,
    },
    /// Start the round.
    Start,
    /// Apply a player action.
    Act {
        /// Acting player.
        player: PlayerId,
        /// The action.
        action: Action,
    },
    /// End the session.
    End,
}

/// Errors returned through a worker.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkerError {
    /// The worker thread has stopped.
    #[error("session worker has stopped")]
    Disconnected,
    /// The session rejected the command.
    #[error(transparent)]
    Game(#[from] GameError),
}

/// Pending reply of a submitted command.
pub type Reply = Receiver<Result<(), GameError>>;

struct Envelope {
    command: Command,
    reply: Sender<Result<(), GameError>>,
}

fn apply(game: &mut Game, command: Command) -> Result<(), GameError> {
    match command {
        Command::Join(identity) => game.add_player(Player::new(identity)),
        Command::Leave(player) => game.remove_player(player),
        Command::Bet { player, amount } => game.place_bet(player, amount),
        Command::Start => game.start(),
        Command::Act { player, action } => game.apply_action(player, action),
        Command::End => game.end(),
    }
}

/// Serialises all commands for one session on a dedicated thread.
#[derive(Debug)]
pub struct SessionWorker {
    session_id: SessionId,
    sender: Option<Sender<Envelope>>,
    thread: Option<JoinHandle<()>>,
}

impl SessionWorker {
    /// Starts a worker thread for `game`.
    ///
    /// # Errors
    ///
    /// Returns an error if the thread cannot be spawned.
    pub fn spawn(game: Shared<Game>) -> std::io::Result<Self> {
        let session_id = game.lock().id();
        let (sender, receiver) = mpsc::channel::<Envelope>();

        let thread = thread::Builder::new()
            .name(format!("session-{session_id}"))
            .spawn(move || {
                tracing::debug!(session_id = %session_id, "session worker started");
                for envelope in receiver {
                    let result = apply(&mut game.lock(), envelope.command);
                    if envelope.reply.send(result).is_err() {
                        tracing::trace!(session_id = %session_id, "reply dropped by caller");
                    }
                }
                tracing::debug!(session_id = %session_id, "session worker stopped");
            })?;

        Ok(Self {
            session_id,
            sender: Some(sender),
            thread: Some(thread),
        })
    }

    /// Session this worker drives.
    #[must_use]
    pub const fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// Queues a command and returns the channel its result arrives on.
    ///
    /// # Errors
    ///
    /// Returns [`WorkerError::Disconnected`] if the worker has stopped.
    pub fn submit(&self, command: Command) -> Result<Reply, WorkerError> {
        let sender = self.sender.as_ref().ok_or(WorkerError::Disconnected)?;
        let (reply, receiver) = mpsc::channel();
        sender
            .send(Envelope { command, reply })
            .map_err(|_| WorkerError::Disconnected)?;
        Ok(receiver)
    }

    /// Queues a command and waits for its result.
    ///
    /// # Errors
    ///
    /// Returns the session's error, or [`WorkerError::Disconnected`] if the
    /// worker has stopped.
    pub fn call(&self, command: Command) -> Result<(), WorkerError> {
        let reply = self.submit(command)?;
        reply.recv().map_err(|_| WorkerError::Disconnected)??;
        Ok(())
    }

    /// Stops accepting commands, drains the queue and joins the thread.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        self.sender.take();
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                tracing::warn!(session_id = %self.session_id, "session worker panicked");
            }
        }
    }
}

impl Drop for SessionWorker {
    fn drop(&mut self) {
        self.stop();
    }
}
