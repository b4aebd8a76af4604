//! # Draughts Board
//!
//! Board state for English draughts on an even `N`x`N` grid, together with the
//! board mutator that applies a single move.
//!
//! ## Layout
//! Squares hold signed piece codes: White men and kings are `-1`/`-2`, Black
//! men and kings are `+1`/`+2`, and `0` is empty. White starts on the low rows
//! and advances toward row `N-1`; Black starts on the high rows and advances
//! toward row `0`. Each side fills `(N-2)/2` rows with `N/2` pieces placed on
//! alternating squares.
//!
//! Boards are plain values. Every search branch clones instead of sharing.

use crate::error::{DraughtsError, Result};
use crate::movegen::Move;
use draughts_shared::{BLACK_KING, BLACK_MAN, EMPTY, WHITE_KING, WHITE_MAN};
use std::fmt;
use std::str::FromStr;

/// One of the two sides.
///
/// White is the maximising side of the value signal, Black the minimising one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Player {
    White,
    Black,
}

impl Player {
    /// The other side.
    pub fn opponent(self) -> Player {
        match self {
            Player::White => Player::Black,
            Player::Black => Player::White,
        }
    }

    pub fn man_code(self) -> i8 {
        match self {
            Player::White => WHITE_MAN,
            Player::Black => BLACK_MAN,
        }
    }

    pub fn king_code(self) -> i8 {
        match self {
            Player::White => WHITE_KING,
            Player::Black => BLACK_KING,
        }
    }

    /// Row direction a man of this side moves in.
    pub fn forward(self) -> i32 {
        match self {
            Player::White => 1,
            Player::Black => -1,
        }
    }

    /// Row on which a man of this side is crowned.
    pub fn promotion_row(self, size: usize) -> usize {
        match self {
            Player::White => size - 1,
            Player::Black => 0,
        }
    }

    /// Returns true if `code` is a man or king of this side.
    pub fn owns(self, code: i8) -> bool {
        code == self.man_code() || code == self.king_code()
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Player::White => write!(f, "white"),
            Player::Black => write!(f, "black"),
        }
    }
}

/// A board coordinate. Ordered row-major so move indexes iterate deterministically.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square {
    pub row: usize,
    pub col: usize,
}

impl Square {
    pub fn new(row: usize, col: usize) -> Self {
        Square { row, col }
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

impl FromStr for Square {
    type Err = String;

    /// Parses `"r,c"` or `"r, c"` (0-based), optionally wrapped in parentheses.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let trimmed = s.trim().trim_start_matches('(').trim_end_matches(')');
        let parts: Vec<&str> = trimmed.split(',').map(|s| s.trim()).collect();
        if parts.len() != 2 {
            return Err("Expected format: r,c".to_string());
        }
        let row = parts[0].parse::<usize>().map_err(|e| e.to_string())?;
        let col = parts[1].parse::<usize>().map_err(|e| e.to_string())?;
        Ok(Square { row, col })
    }
}

/// The draughts board: a flat row-major grid of piece codes.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Board {
    size: usize,
    cells: Vec<i8>,
}

impl Board {
    /// Creates a board with the standard starting layout.
    ///
    /// # Arguments
    /// * `size` - Side length, must be even and at least 4 (8 for English draughts)
    ///
    /// # Returns
    /// The initial position, or `InvalidBoardSize` for unusable sizes
    pub fn new(size: usize) -> Result<Self> {
        let mut board = Board::empty(size)?;
        let rows_per_side = (size - 2) / 2;
        let pieces_per_row = size / 2;

        for i in 0..rows_per_side {
            for j in 0..pieces_per_row {
                let (white_col, black_col) = if i % 2 == 0 {
                    (2 * j, 2 * j + 1)
                } else {
                    (2 * j + 1, 2 * j)
                };
                board.set(Square::new(i, white_col), WHITE_MAN);
                board.set(Square::new(size - 1 - i, black_col), BLACK_MAN);
            }
        }
        Ok(board)
    }

    /// Creates a board with no pieces on it.
    pub fn empty(size: usize) -> Result<Self> {
        if size < 4 || size % 2 != 0 {
            return Err(DraughtsError::InvalidBoardSize(size));
        }
        Ok(Board {
            size,
            cells: vec![EMPTY; size * size],
        })
    }

    /// Builds a board from explicit `(square, code)` placements on an empty grid.
    ///
    /// # Errors
    /// `InvalidBoardSize` for a bad `size`, `OffBoard` for a placement outside it.
    pub fn with_pieces(size: usize, pieces: &[(Square, i8)]) -> Result<Self> {
        let mut board = Board::empty(size)?;
        for &(square, code) in pieces {
            if square.row >= size || square.col >= size {
                return Err(DraughtsError::OffBoard { square, size });
            }
            board.set(square, code);
        }
        Ok(board)
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// The raw row-major cell codes.
    pub fn cells(&self) -> &[i8] {
        &self.cells
    }

    pub fn get(&self, square: Square) -> i8 {
        self.cells[square.row * self.size + square.col]
    }

    pub fn set(&mut self, square: Square, code: i8) {
        self.cells[square.row * self.size + square.col] = code;
    }

    pub fn is_empty(&self, square: Square) -> bool {
        self.get(square) == EMPTY
    }

    /// Total number of pieces of both sides on the board.
    pub fn piece_count(&self) -> usize {
        draughts_shared::count_pieces(&self.cells)
    }

    /// Squares holding a piece of `player`, in row-major order.
    pub fn squares_of(&self, player: Player) -> impl Iterator<Item = Square> + '_ {
        let size = self.size;
        self.cells
            .iter()
            .enumerate()
            .filter(move |(_, &code)| player.owns(code))
            .map(move |(idx, _)| Square::new(idx / size, idx % size))
    }

    /// Iterates the board one row at a time.
    pub fn rows(&self) -> impl Iterator<Item = &[i8]> {
        self.cells.chunks(self.size)
    }

    /// Applies a move for `player` and returns the resulting board.
    ///
    /// The origin is cleared, the moving piece is placed on the destination
    /// (crowned if it lands on the player's promotion row) and every captured
    /// square is cleared. The receiver is left untouched.
    ///
    /// # Errors
    /// `InvalidOrigin` if the origin square does not hold one of `player`'s pieces.
    pub fn apply(&self, player: Player, mv: &Move) -> Result<Board> {
        let mut code = self.get(mv.from);
        if !player.owns(code) {
            return Err(DraughtsError::InvalidOrigin {
                square: mv.from,
                player,
            });
        }
        if mv.to.row == player.promotion_row(self.size) {
            code = player.king_code();
        }

        let mut next = self.clone();
        next.set(mv.from, EMPTY);
        next.set(mv.to, code);
        for &taken in &mv.captures {
            next.set(taken, EMPTY);
        }
        Ok(next)
    }
}
