//! Zobrist hashing of board positions.
//!
//! One random `u64` is drawn per (square, piece code) pair. A position's hash
//! is the XOR of the entries for its occupied squares, so identical placements
//! always hash identically under the same table. Collisions are accepted.

use crate::board::{Board, Player, Square};
use crate::error::{DraughtsError, Result};
use crate::movegen::Move;
use draughts_shared::{code_index, CODE_COUNT, EMPTY};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

/// Random table for one board size.
#[derive(Clone, Debug)]
pub struct Zobrist {
    size: usize,
    seed: u64,
    table: Vec<[u64; CODE_COUNT]>,
}

impl Zobrist {
    /// Builds the table for a `size`x`size` board from `seed`.
    ///
    /// The same seed always yields the same table, which keeps persisted
    /// statistics meaningful across runs.
    pub fn new(size: usize, seed: u64) -> Self {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
        let mut table = vec![[0u64; CODE_COUNT]; size * size];
        for entry in table.iter_mut() {
            for value in entry.iter_mut() {
                *value = rng.random::<u64>();
            }
        }
        Zobrist { size, seed, table }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn size(&self) -> usize {
        self.size
    }

    fn key(&self, cell: usize, code: i8) -> u64 {
        self.table[cell][code_index(code)]
    }

    /// Hashes a whole board. The board must match the table's size; see
    /// [`Zobrist::check_board`].
    pub fn hash(&self, board: &Board) -> u64 {
        board
            .cells()
            .iter()
            .enumerate()
            .filter(|(_, &code)| code != EMPTY)
            .fold(0u64, |h, (cell, &code)| h ^ self.key(cell, code))
    }

    /// Fails with `InvalidConfig` unless this table was built for `board`'s size.
    pub fn check_board(&self, board: &Board) -> Result<()> {
        if board.size() != self.size {
            return Err(DraughtsError::InvalidConfig(format!(
                "zobrist table is for a {0}x{0} board, got {1}x{1}",
                self.size,
                board.size()
            )));
        }
        Ok(())
    }

    /// Toggles one (square, code) contribution in and out of `hash`.
    fn toggle(&self, hash: u64, board: &Board, square: Square, code: i8) -> u64 {
        if code == EMPTY {
            hash
        } else {
            hash ^ self.key(square.row * board.size() + square.col, code)
        }
    }

    /// Updates `hash` of `board` for `player` playing `mv`, without rehashing
    /// the whole board. Equal to `hash(&board.apply(player, mv)?)`.
    pub fn hash_after(&self, hash: u64, board: &Board, player: Player, mv: &Move) -> Result<u64> {
        let after = board.apply(player, mv)?;
        Ok(self.hash_transition(hash, board, &after, mv))
    }

    /// Same as [`Zobrist::hash_after`] when the resulting board is already known.
    pub fn hash_transition(&self, hash: u64, before: &Board, after: &Board, mv: &Move) -> u64 {
        let mut h = self.toggle(hash, before, mv.from, before.get(mv.from));
        for taken in &mv.captures {
            h = self.toggle(h, before, *taken, before.get(*taken));
        }
        if mv.to != mv.from {
            h = self.toggle(h, before, mv.to, before.get(mv.to));
        }
        self.toggle(h, before, mv.to, after.get(mv.to))
    }
}
