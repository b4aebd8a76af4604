//! Error types shared by the engine, the drivers and the persistence layer.

use crate::board::{Player, Square};
use thiserror::Error;

/// Errors raised by the draughts engine.
#[derive(Debug, Error)]
pub enum DraughtsError {
    /// Board size must be even and at least 4.
    #[error("board size must be an even number >= 4, got {0}")]
    InvalidBoardSize(usize),

    /// A move was applied from a square that does not hold the mover's piece.
    #[error("square {square} does not hold a {player} piece")]
    InvalidOrigin { square: Square, player: Player },

    /// A placement named a square outside the board.
    #[error("square {square} is off a {size}x{size} board")]
    OffBoard { square: Square, size: usize },

    /// A move was requested that is not in the legal move index.
    #[error("illegal move from {from} to {to}")]
    IllegalMove { from: Square, to: Square },

    /// An actor was asked to move in a position with no legal moves.
    #[error("{0} has no legal moves")]
    NoLegalMoves(Player),

    /// A root move was never simulated and has no value estimate.
    #[error("no statistics recorded for position {0:#018x}")]
    MissingStatistics(u64),

    /// Loaded statistics were keyed by a different hash table.
    #[error("statistics were recorded with zobrist seed {found}, engine uses {expected}")]
    SeedMismatch { expected: u64, found: u64 },

    /// A human selection could not be turned into a legal move.
    #[error("invalid selection: {0}")]
    InvalidSelection(String),

    /// Configuration values that cannot be used.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Config(#[from] toml::de::Error),

    #[error(transparent)]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

pub type Result<T> = std::result::Result<T, DraughtsError>;
