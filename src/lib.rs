//! # Draughts Arena
//!
//! A self-play learning engine for English draughts (checkers). Two Monte
//! Carlo Tree Search agents play each other while sharing one statistics
//! store, so every game teaches both sides.
//!
//! ## Architecture
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//! │   Trainer    │──►│GameController│──►│    Actors    │
//! │ (self-play)  │   │ (validation) │   │ MCTS/Random/ │
//! └──────┬───────┘   └──────┬───────┘   │    Human     │
//!        │                  │           └──────┬───────┘
//!        ▼                  ▼                  ▼
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//! │ Persistence  │   │    Board     │◄──│  MctsEngine  │
//! │ (JSON dumps) │   │   MoveGen    │   │  StatsStore  │
//! └──────────────┘   └──────────────┘   │   Zobrist    │
//!                                       └──────────────┘
//! ```
//!
//! The core (board, move generation, hashing, search, statistics) is pure and
//! single-threaded. Rendering, human input and persistence sit behind small
//! traits so drivers can swap them out.

pub mod agents;
pub mod board;
pub mod config;
pub mod error;
pub mod game_controller;
pub mod mcts;
pub mod movegen;
pub mod persistence;
pub mod render;
pub mod stats;
pub mod training;
pub mod zobrist;

pub use board::{Board, Player, Square};
pub use config::{ArenaConfig, MctsConfig};
pub use error::{DraughtsError, Result};
pub use mcts::MctsEngine;
pub use movegen::{generate_moves, legal_moves, Candidate, Move, MoveIndex};
pub use stats::{NodeStats, SharedStats, StatsStore};
pub use zobrist::Zobrist;

/// Something that picks moves for one side.
///
/// Implemented by the random, MCTS and human actors. Drivers hand every actor
/// the legal move index (forced capture already applied) for its side.
pub trait Actor {
    /// The side this actor plays.
    fn player(&self) -> Player;

    /// Chooses one move from `moves` for the position on `board`.
    ///
    /// # Errors
    /// `NoLegalMoves` when `moves` is empty; actor-specific errors otherwise.
    fn select_action(&mut self, board: &Board, moves: &MoveIndex) -> Result<Move>;
}
