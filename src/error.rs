use thiserror::Error;

use crate::moves::Action;
use crate::piece::Square;

pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong inside the engine or at its edges.
#[derive(Debug, Error)]
pub enum Error {
    /// A coordinate was outside 1..=8 or could not be parsed.
    #[error("invalid coordinate: {0}")]
    InvalidCoordinate(String),

    /// A source square holds no piece, or the claimed source squares do not
    /// belong to a single piece identity.
    #[error("no piece at {0}")]
    NoSuchPiece(Square),

    /// The action is not among the legal actions of the current position.
    #[error("illegal action {0}")]
    IllegalAction(Action),

    /// An agent was asked to move in a position with no legal actions.
    #[error("no legal actions available")]
    NoMoves,

    /// No game is in progress.
    #[error("no game in progress")]
    NoGame,

    /// A configuration value could not be read or was not understood.
    #[error("configuration: {0}")]
    Config(String),

    /// The endgame store failed to save or load.
    #[error("endgame store: {0}")]
    Persistence(String),
}
