//! # Monte Carlo Tree Search
//!
//! Transposition-keyed MCTS. There is no explicit tree: every position is
//! identified by its Zobrist hash and its statistics live in the shared
//! [`StatsStore`]. One decision runs a fixed number of simulations, each made
//! of four phases:
//!
//! 1. **Selection** - while every successor of the current position already
//!    has statistics, step to the successor with the best UCB1 score
//!    (White maximises, Black minimises).
//! 2. **Expansion** - pick one successor without statistics at random and
//!    give it a zeroed entry.
//! 3. **Playout** - play uniformly random legal moves until one side cannot
//!    move or the position is declared a stalemate. Playouts never touch the
//!    store.
//! 4. **Backpropagation** - the last position recorded in the simulation takes
//!    the outcome as its value; every earlier one moves toward it by a running
//!    mean.
//!
//! Values are White-positive: +1 when Black is left without moves, -1 when
//! White is, 0 for a stalemate. A position is a stalemate once fewer than
//! `min_pieces` pieces remain or after `max_moves` plies.

use crate::board::{Board, Player, Square};
use crate::config::MctsConfig;
use crate::error::{DraughtsError, Result};
use crate::movegen::{legal_moves, Move, MoveIndex};
use crate::stats::{NodeStats, SharedStats, StatsStore};
use crate::zobrist::Zobrist;
use log::debug;
use rand::Rng;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Counters describing the most recent decision.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SearchSummary {
    pub simulations: u32,
    /// Extra simulations run to give every root move a value estimate.
    pub forced_expansions: u32,
    pub white_wins: u32,
    pub black_wins: u32,
    pub stalemates: u32,
    /// Positions known to the store after the search.
    pub store_size: usize,
}

impl SearchSummary {
    fn record(&mut self, outcome: f64) {
        self.simulations += 1;
        if outcome > 0.0 {
            self.white_wins += 1;
        } else if outcome < 0.0 {
            self.black_wins += 1;
        } else {
            self.stalemates += 1;
        }
    }
}

/// Game state carried through one simulation.
struct Rollout {
    board: Board,
    player: Player,
    moves: MoveIndex,
    hash: u64,
    move_count: u32,
    stalemate: bool,
}

impl Rollout {
    fn new(board: Board, player: Player, moves: MoveIndex, hash: u64) -> Self {
        Rollout {
            board,
            player,
            moves,
            hash,
            move_count: 0,
            stalemate: false,
        }
    }

    fn can_continue(&self) -> bool {
        !self.moves.is_empty() && !self.stalemate
    }

    /// Plays `mv` for the side to move and hands the turn over.
    fn advance(&mut self, mv: &Move, zobrist: &Zobrist, config: &MctsConfig) -> Result<()> {
        let next = self.board.apply(self.player, mv)?;
        self.hash = zobrist.hash_transition(self.hash, &self.board, &next, mv);
        self.board = next;
        self.player = self.player.opponent();
        self.moves = legal_moves(self.player, &self.board);
        self.stalemate = self.board.piece_count() < config.min_pieces;
        self.move_count += 1;
        if self.move_count > config.max_moves {
            self.stalemate = true;
        }
        Ok(())
    }

    /// White-positive result of a finished simulation.
    fn outcome(&self) -> f64 {
        if self.stalemate {
            0.0
        } else {
            match self.player {
                Player::Black => 1.0,
                Player::White => -1.0,
            }
        }
    }
}

/// The MCTS engine for one side.
///
/// Several engines may share one statistics store and one hash table; the
/// random source is owned so seeded engines replay identically.
pub struct MctsEngine<R: Rng> {
    player: Player,
    config: MctsConfig,
    zobrist: Arc<Zobrist>,
    stats: SharedStats,
    rng: R,
    history: Vec<u64>,
    summary: SearchSummary,
}

impl<R: Rng> MctsEngine<R> {
    /// Creates an engine.
    ///
    /// # Arguments
    /// * `player` - The side this engine decides for
    /// * `config` - Simulation budget, exploration constant and stalemate limits
    /// * `zobrist` - Hash table; must be the one the store was keyed with
    /// * `stats` - Store handle, usually shared with the opposing engine
    /// * `rng` - Source for expansion, playout and tie-break randomness
    pub fn new(player: Player, config: MctsConfig, zobrist: Arc<Zobrist>, stats: SharedStats, rng: R) -> Self {
        MctsEngine {
            player,
            config,
            zobrist,
            stats,
            rng,
            history: Vec::new(),
            summary: SearchSummary::default(),
        }
    }

    pub fn player(&self) -> Player {
        self.player
    }

    pub fn config(&self) -> &MctsConfig {
        &self.config
    }

    pub fn stats(&self) -> &SharedStats {
        &self.stats
    }

    /// Counters from the last call to [`MctsEngine::search`].
    pub fn last_summary(&self) -> &SearchSummary {
        &self.summary
    }

    /// Runs the simulation budget from `board` and returns the move to play.
    ///
    /// Root moves the budget never reached are expanded with one extra
    /// simulation each before the final choice, so every candidate has a
    /// value estimate.
    ///
    /// # Errors
    /// `InvalidConfig` if the Zobrist table was built for another board size.
    /// `NoLegalMoves` if this engine's side cannot move on `board`.
    pub fn search(&mut self, board: &Board) -> Result<Move> {
        self.zobrist.check_board(board)?;
        let root_moves = legal_moves(self.player, board);
        if root_moves.is_empty() {
            return Err(DraughtsError::NoLegalMoves(self.player));
        }

        let stats = Arc::clone(&self.stats);
        let mut store = stats.lock();
        self.summary = SearchSummary::default();

        let root_hash = self.zobrist.hash(board);
        store.ensure(root_hash);

        for _ in 0..self.config.simulations {
            let outcome = self.simulate(board, root_hash, &root_moves, None, &mut store)?;
            self.summary.record(outcome);
        }

        for mv in root_moves.moves() {
            let child = self.zobrist.hash_after(root_hash, board, self.player, &mv)?;
            if !store.contains(child) {
                let outcome = self.simulate(board, root_hash, &root_moves, Some(&mv), &mut store)?;
                self.summary.record(outcome);
                self.summary.forced_expansions += 1;
            }
        }

        let chosen = self.best_root_move(board, root_hash, &root_moves, &store)?;
        self.summary.store_size = store.len();
        debug!(
            "{} search: {} simulations ({} forced), W/B/D {}/{}/{}, {} positions known, chose {}",
            self.player,
            self.summary.simulations,
            self.summary.forced_expansions,
            self.summary.white_wins,
            self.summary.black_wins,
            self.summary.stalemates,
            self.summary.store_size,
            chosen
        );
        Ok(chosen)
    }

    /// Runs one simulation from the root and returns its outcome.
    ///
    /// With `forced` set, selection is skipped and that root move is the one
    /// expanded.
    fn simulate(
        &mut self,
        root: &Board,
        root_hash: u64,
        root_moves: &MoveIndex,
        forced: Option<&Move>,
        store: &mut StatsStore,
    ) -> Result<f64> {
        self.history.clear();
        self.history.push(root_hash);
        let mut state = Rollout::new(root.clone(), self.player, root_moves.clone(), root_hash);

        // Selection
        let mut unseen = self.unseen_successors(&state, store)?;
        if forced.is_none() {
            while unseen.is_empty() && state.can_continue() {
                let mv = self.select_ucb(&state, store)?;
                state.advance(&mv, &self.zobrist, &self.config)?;
                self.history.push(state.hash);
                unseen = self.unseen_successors(&state, store)?;
            }
        }

        // Expansion
        if state.can_continue() {
            let mv = match forced {
                Some(mv) => mv.clone(),
                None => self
                    .pick_unseen(&unseen)
                    .ok_or(DraughtsError::NoLegalMoves(state.player))?,
            };
            state.advance(&mv, &self.zobrist, &self.config)?;
            self.history.push(state.hash);
            store.insert_unvisited(state.hash);
        }

        // Playout
        while state.can_continue() {
            let Some(mv) = state.moves.choose_random(&mut self.rng) else {
                break;
            };
            state.advance(&mv, &self.zobrist, &self.config)?;
        }

        let outcome = state.outcome();
        self.backpropagate(outcome, store);
        Ok(outcome)
    }

    /// Successors of the current position that have no statistics yet,
    /// grouped by origin.
    fn unseen_successors(&self, state: &Rollout, store: &StatsStore) -> Result<BTreeMap<Square, Vec<Move>>> {
        let mut unseen: BTreeMap<Square, Vec<Move>> = BTreeMap::new();
        for mv in state.moves.moves() {
            let child = self.zobrist.hash_after(state.hash, &state.board, state.player, &mv)?;
            if !store.contains(child) {
                unseen.entry(mv.from).or_default().push(mv);
            }
        }
        Ok(unseen)
    }

    /// Uniformly random origin, then uniformly random move from it.
    fn pick_unseen(&mut self, unseen: &BTreeMap<Square, Vec<Move>>) -> Option<Move> {
        if unseen.is_empty() {
            return None;
        }
        let origin = self.rng.random_range(0..unseen.len());
        let moves = unseen.values().nth(origin)?;
        moves.get(self.rng.random_range(0..moves.len())).cloned()
    }

    /// Picks the successor with the best UCB1 score for the side to move.
    ///
    /// A parent without visits would make `ln(visits)` undefined; it is
    /// treated as `ln(1) = 0` and the parent entry is reset to one visit.
    fn select_ucb(&mut self, state: &Rollout, store: &mut StatsStore) -> Result<Move> {
        let parent_visits = store.get(state.hash).map(|s| s.visits).unwrap_or(0);
        let log_parent = if parent_visits == 0 {
            store.reset_to(state.hash, NodeStats { visits: 1, value: 0.0 });
            0.0
        } else {
            (parent_visits as f64).ln()
        };

        let maximise = state.player == Player::White;
        let mut best: Option<(f64, Move)> = None;
        for mv in state.moves.moves() {
            let child_hash = self.zobrist.hash_after(state.hash, &state.board, state.player, &mv)?;
            let child = store
                .get(child_hash)
                .ok_or(DraughtsError::MissingStatistics(child_hash))?;
            let score = if child.visits == 0 {
                if maximise {
                    f64::INFINITY
                } else {
                    f64::NEG_INFINITY
                }
            } else {
                child.value + self.config.exploration * (log_parent / child.visits as f64).sqrt()
            };

            let better = match &best {
                None => true,
                Some((current, _)) if maximise => score > *current,
                Some((current, _)) => score < *current,
            };
            if better {
                best = Some((score, mv));
            }
        }
        best.map(|(_, mv)| mv)
            .ok_or(DraughtsError::NoLegalMoves(state.player))
    }

    /// Most recent position: hard overwrite. Everything before it: running mean.
    fn backpropagate(&mut self, outcome: f64, store: &mut StatsStore) {
        if let Some(last) = self.history.pop() {
            store.record_terminal(last, outcome);
        }
        for &hash in &self.history {
            store.record_visit(hash, outcome);
        }
    }

    /// Chooses the root move with the best stored value for this side,
    /// breaking ties uniformly at random.
    fn best_root_move(&mut self, board: &Board, root_hash: u64, root_moves: &MoveIndex, store: &StatsStore) -> Result<Move> {
        let mut scored = Vec::with_capacity(root_moves.move_count());
        for mv in root_moves.moves() {
            let child = self.zobrist.hash_after(root_hash, board, self.player, &mv)?;
            let stats = store.get(child).ok_or(DraughtsError::MissingStatistics(child))?;
            scored.push((stats.value, mv));
        }

        let target = match self.player {
            Player::White => scored.iter().map(|(v, _)| *v).fold(f64::NEG_INFINITY, f64::max),
            Player::Black => scored.iter().map(|(v, _)| *v).fold(f64::INFINITY, f64::min),
        };
        let mut ties: Vec<Move> = scored
            .into_iter()
            .filter(|(v, _)| *v == target)
            .map(|(_, mv)| mv)
            .collect();
        if ties.is_empty() {
            return Err(DraughtsError::NoLegalMoves(self.player));
        }
        let pick = self.rng.random_range(0..ties.len());
        Ok(ties.swap_remove(pick))
    }
}
