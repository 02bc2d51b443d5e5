//! Session phase types.

use core::fmt;

use serde::Serialize;

/// Coarse lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Fewer players than the configured minimum.
    Waiting,
    /// Enough players; waiting for an explicit start.
    Ready,
    /// A round is in progress.
    Playing,
    /// Terminal.
    Finished,
}

impl Phase {
    /// Wire name of the phase.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Waiting => "waiting",
            Self::Ready => "ready",
            Self::Playing => "playing",
            Self::Finished => "finished",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a rule-set hook wants the session to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum Progress {
    /// Keep playing.
    Continue,
    /// The round is settled; end the session.
    RoundOver,
}
