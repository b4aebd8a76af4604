//! # Game Controller
//!
//! The `GameController` owns the authoritative position of one real game.
//! Actors only ever see copies; every move they return is checked against
//! the legal move index before it is applied.
//!
//! ## Turn Structure
//! ```text
//! round 1: White moves, Black moves
//! round 2: White moves, Black moves
//! ...
//! ```
//! A side left without legal moves loses. A game that completes `max_rounds`
//! rounds without a winner is a stalemate (0 disables the cap).

use crate::board::{Board, Player};
use crate::error::{DraughtsError, Result};
use crate::movegen::{legal_moves, Move, MoveIndex};
use crate::render::{DisplayMode, Renderer};
use crate::Actor;
use log::debug;
use std::time::SystemTime;

/// Result of attempting to apply a move
#[derive(Debug, Clone)]
pub enum MoveResult {
    /// Move was applied
    Success {
        move_made: Move,
        player: Player,
        /// Status after the move
        status: GameStatus,
    },
    /// Move was rejected
    Invalid { reason: MoveValidationError },
    /// Game is already over, no more moves allowed
    GameOver,
}

/// Reasons a move can be rejected
#[derive(Debug, Clone, PartialEq)]
pub enum MoveValidationError {
    /// Move is not in the side to move's legal move index
    IllegalMove,
    /// The game is already in a terminal state
    GameAlreadyOver,
}

impl std::fmt::Display for MoveValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MoveValidationError::IllegalMove => write!(f, "Illegal move"),
            MoveValidationError::GameAlreadyOver => write!(f, "Game is already over"),
        }
    }
}

/// A single entry in the move history
#[derive(Debug, Clone)]
pub struct MoveHistoryEntry {
    /// When the move was made
    pub timestamp: SystemTime,
    /// Side that made the move
    pub player: Player,
    /// The move that was made, captures included
    pub move_made: Move,
    /// Move number (1-indexed)
    pub move_number: usize,
}

impl MoveHistoryEntry {
    /// Stamps a new entry with the current time.
    pub fn new(player: Player, move_made: Move, move_number: usize) -> Self {
        Self {
            timestamp: SystemTime::now(),
            player,
            move_made,
            move_number,
        }
    }
}

/// Current game status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    /// Side to move still has a legal move
    InProgress,
    /// The other side was left without a legal move
    Win(Player),
    /// The round cap was reached without a winner.
    Stalemate,
}

impl GameStatus {
    /// Whether a winner or stalemate has been reached
    pub fn is_game_over(&self) -> bool {
        !matches!(self, GameStatus::InProgress)
    }

    /// White-positive score: 1 for a White win, -1 for a Black win, 0 otherwise.
    pub fn score(&self) -> f64 {
        match self {
            GameStatus::Win(Player::White) => 1.0,
            GameStatus::Win(Player::Black) => -1.0,
            _ => 0.0,
        }
    }
}

/// Owns the position, side to move, history and status of one game.
#[derive(Debug, Clone)]
pub struct GameController {
    board: Board,
    to_move: Player,
    /// Legal moves for `to_move`, cached between turns.
    legal: MoveIndex,
    move_history: Vec<MoveHistoryEntry>,
    status: GameStatus,
    max_rounds: u32,
}

impl GameController {
    /// Starts a game from `board` with White to move.
    ///
    /// # Arguments
    /// * `board` - Starting position
    /// * `max_rounds` - Full rounds before the game is a stalemate; 0 for no cap
    pub fn new(board: Board, max_rounds: u32) -> Self {
        let legal = legal_moves(Player::White, &board);
        let status = if legal.is_empty() {
            GameStatus::Win(Player::Black)
        } else {
            GameStatus::InProgress
        };
        Self {
            board,
            to_move: Player::White,
            legal,
            move_history: Vec::new(),
            status,
            max_rounds,
        }
    }

    /// Validate a move without applying it
    pub fn validate_move(&self, mv: &Move) -> std::result::Result<(), MoveValidationError> {
        if self.status.is_game_over() {
            return Err(MoveValidationError::GameAlreadyOver);
        }
        if !self.legal.contains(mv) {
            return Err(MoveValidationError::IllegalMove);
        }
        Ok(())
    }

    /// Validates `mv` for the side to move and applies it.
    pub fn try_make_move(&mut self, mv: Move) -> MoveResult {
        if self.status.is_game_over() {
            return MoveResult::GameOver;
        }
        if let Err(reason) = self.validate_move(&mv) {
            return MoveResult::Invalid { reason };
        }

        let player = self.to_move;
        // Legal moves always start on one of the mover's pieces.
        let next = match self.board.apply(player, &mv) {
            Ok(board) => board,
            Err(_) => {
                return MoveResult::Invalid {
                    reason: MoveValidationError::IllegalMove,
                }
            }
        };
        self.board = next;
        let move_number = self.move_history.len() + 1;
        self.move_history.push(MoveHistoryEntry::new(player, mv.clone(), move_number));

        self.to_move = player.opponent();
        self.legal = legal_moves(self.to_move, &self.board);
        if self.legal.is_empty() {
            self.status = GameStatus::Win(player);
        } else if self.max_rounds > 0 && self.completed_rounds() >= self.max_rounds {
            self.status = GameStatus::Stalemate;
        }

        MoveResult::Success {
            move_made: mv,
            player,
            status: self.status,
        }
    }

    /// Rounds in which both sides have moved.
    pub fn completed_rounds(&self) -> u32 {
        (self.move_history.len() / 2) as u32
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn current_player(&self) -> Player {
        self.to_move
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn is_game_over(&self) -> bool {
        self.status.is_game_over()
    }

    pub fn winner(&self) -> Option<Player> {
        match self.status {
            GameStatus::Win(p) => Some(p),
            _ => None,
        }
    }

    pub fn move_history(&self) -> &[MoveHistoryEntry] {
        &self.move_history
    }

    pub fn move_count(&self) -> usize {
        self.move_history.len()
    }

    pub fn last_move(&self) -> Option<&MoveHistoryEntry> {
        self.move_history.last()
    }

    /// Legal moves for the side to move.
    pub fn legal_moves(&self) -> &MoveIndex {
        &self.legal
    }

    /// Restarts from `board` with White to move.
    pub fn reset(&mut self, board: Board) {
        let max_rounds = self.max_rounds;
        *self = GameController::new(board, max_rounds);
    }

    /// Plays the game to the end with the given actors.
    ///
    /// The board is drawn before every move and once more at the end; each
    /// move and the result are announced through `renderer`.
    ///
    /// # Errors
    /// Whatever an actor's `select_action` returns, `IllegalMove` if an actor
    /// returns a move outside its legal index, and `InvalidConfig` if an actor
    /// is seated on the wrong side.
    pub fn play_game(
        &mut self,
        white: &mut dyn Actor,
        black: &mut dyn Actor,
        renderer: &mut dyn Renderer,
        mode: DisplayMode,
    ) -> Result<GameStatus> {
        if white.player() != Player::White || black.player() != Player::Black {
            return Err(DraughtsError::InvalidConfig(
                "actors must be seated as white then black".to_string(),
            ));
        }

        while !self.is_game_over() {
            renderer.render(&self.board, mode);
            let mv = match self.to_move {
                Player::White => white.select_action(&self.board, &self.legal)?,
                Player::Black => black.select_action(&self.board, &self.legal)?,
            };
            match self.try_make_move(mv.clone()) {
                MoveResult::Success { player, .. } => {
                    debug!("move {}: {player} {mv}", self.move_count());
                    renderer.announce(&format!("{player} moves {mv}"));
                }
                MoveResult::Invalid { .. } => {
                    return Err(DraughtsError::IllegalMove {
                        from: mv.from,
                        to: mv.to,
                    })
                }
                MoveResult::GameOver => break,
            }
        }

        renderer.render(&self.board, mode);
        renderer.announce(&self.result_line());
        Ok(self.status)
    }

    fn result_line(&self) -> String {
        match self.status {
            GameStatus::Win(p) => format!("{p} wins after {} moves", self.move_count()),
            GameStatus::Stalemate => format!("stalemate after {} rounds", self.completed_rounds()),
            GameStatus::InProgress => format!("{} to move", self.to_move),
        }
    }

    /// Move list and result as plain text.
    pub fn format_history(&self) -> String {
        if self.move_history.is_empty() {
            return String::from("No moves made yet.\n");
        }
        let mut output = String::from("=== Draughts Game History ===\n\n");
        for entry in &self.move_history {
            output.push_str(&format!(
                "{}. {} - {}\n",
                entry.move_number, entry.player, entry.move_made
            ));
        }
        output.push_str(&format!("\nResult: {}\n", self.result_line()));
        output
    }
}
