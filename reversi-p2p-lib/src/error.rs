use thiserror::Error;

use crate::game::board::Color;
use crate::protocol::OutcomeToken;

/// Errors that can occur across discovery, transport and gameplay
#[derive(Error, Debug)]
pub enum GameError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Illegal move for {color} at ({row},{col})")]
    IllegalMove { color: Color, row: usize, col: usize },

    #[error("Outcome mismatch: peer sent {received}, local result is {expected}")]
    OutcomeMismatch {
        received: OutcomeToken,
        expected: OutcomeToken,
    },

    #[error("Peer reported a protocol error")]
    PeerError,

    #[error("User aborted during their turn")]
    UserAbort,
}

pub type Result<T> = std::result::Result<T, GameError>;
