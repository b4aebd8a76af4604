//! # Actors
//!
//! The three kinds of player a game can be driven by:
//! - [`RandomActor`] picks a uniformly random origin, then a random candidate
//!   from that origin.
//! - [`MctsActor`] runs a search with its [`MctsEngine`].
//! - [`HumanActor`] asks an [`InputProvider`] for an origin square and a
//!   candidate index, re-prompting until the selection is legal.

use crate::board::{Board, Player, Square};
use crate::error::{DraughtsError, Result};
use crate::mcts::MctsEngine;
use crate::movegen::{Move, MoveIndex};
use crate::Actor;
use log::{debug, warn};
use rand::Rng;
use rand_xoshiro::Xoshiro256PlusPlus;
use std::io::{self, BufRead, Write};

/// Plays uniformly random legal moves.
pub struct RandomActor<R: Rng = Xoshiro256PlusPlus> {
    player: Player,
    rng: R,
}

impl<R: Rng> RandomActor<R> {
    pub fn new(player: Player, rng: R) -> Self {
        RandomActor { player, rng }
    }
}

impl<R: Rng> Actor for RandomActor<R> {
    fn player(&self) -> Player {
        self.player
    }

    fn select_action(&mut self, _board: &Board, moves: &MoveIndex) -> Result<Move> {
        moves
            .choose_random(&mut self.rng)
            .ok_or(DraughtsError::NoLegalMoves(self.player))
    }
}

/// Plays the move its search engine picks.
pub struct MctsActor<R: Rng = Xoshiro256PlusPlus> {
    engine: MctsEngine<R>,
}

impl<R: Rng> MctsActor<R> {
    pub fn new(engine: MctsEngine<R>) -> Self {
        MctsActor { engine }
    }

    pub fn engine(&self) -> &MctsEngine<R> {
        &self.engine
    }
}

impl<R: Rng> Actor for MctsActor<R> {
    fn player(&self) -> Player {
        self.engine.player()
    }

    fn select_action(&mut self, board: &Board, moves: &MoveIndex) -> Result<Move> {
        if moves.is_empty() {
            return Err(DraughtsError::NoLegalMoves(self.engine.player()));
        }
        let mv = self.engine.search(board)?;
        let summary = self.engine.last_summary();
        debug!(
            "{} searched {} simulations ({} forced), store holds {} positions",
            self.engine.player(),
            summary.simulations,
            summary.forced_expansions,
            summary.store_size
        );
        Ok(mv)
    }
}

/// Source of human selections.
pub trait InputProvider {
    /// Returns an origin square and an index into that origin's candidates.
    ///
    /// # Arguments
    /// * `player` - Side being asked to move
    /// * `moves` - The legal moves to choose from
    fn select(&mut self, player: Player, moves: &MoveIndex) -> Result<(Square, usize)>;

    /// Tells the human why the last selection was rejected.
    fn reject(&mut self, _reason: &str) {}
}

/// Plays whatever its input provider selects.
pub struct HumanActor<I: InputProvider> {
    player: Player,
    input: I,
    max_attempts: u32,
}

impl<I: InputProvider> HumanActor<I> {
    pub fn new(player: Player, input: I) -> Self {
        HumanActor {
            player,
            input,
            max_attempts: u32::MAX,
        }
    }

    /// Gives up after `attempts` rejected selections instead of asking forever.
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }
}

impl<I: InputProvider> Actor for HumanActor<I> {
    fn player(&self) -> Player {
        self.player
    }

    fn select_action(&mut self, _board: &Board, moves: &MoveIndex) -> Result<Move> {
        if moves.is_empty() {
            return Err(DraughtsError::NoLegalMoves(self.player));
        }
        let mut attempts = 0;
        loop {
            let (origin, index) = self.input.select(self.player, moves)?;
            if let Some(mv) = moves.candidate(origin, index) {
                return Ok(mv);
            }
            attempts += 1;
            let reason = match moves.get(origin) {
                None => format!("{origin} has no legal moves"),
                Some(candidates) => format!(
                    "{origin} has {} candidates, {index} is out of range",
                    candidates.len()
                ),
            };
            warn!("{} selection rejected: {reason}", self.player);
            if attempts >= self.max_attempts {
                return Err(DraughtsError::InvalidSelection(reason));
            }
            self.input.reject(&reason);
        }
    }
}

/// Line-based input: an origin such as `2, 3`, then a candidate index.
///
/// Generic over reader and writer so it can be driven from tests; use
/// [`LineInput::stdio`] for an interactive terminal.
pub struct LineInput<In: BufRead, Out: Write> {
    reader: In,
    writer: Out,
}

impl LineInput<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        LineInput::new(io::stdin().lock(), io::stdout())
    }
}

impl<In: BufRead, Out: Write> LineInput<In, Out> {
    pub fn new(reader: In, writer: Out) -> Self {
        LineInput { reader, writer }
    }

    fn prompt(&mut self, text: &str) -> Result<String> {
        write!(self.writer, "{text}")?;
        self.writer.flush()?;
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Err(DraughtsError::InvalidSelection("input closed".to_string()));
        }
        Ok(line.trim().to_string())
    }
}

impl<In: BufRead, Out: Write> InputProvider for LineInput<In, Out> {
    fn select(&mut self, player: Player, moves: &MoveIndex) -> Result<(Square, usize)> {
        writeln!(self.writer, "{player} to move. Movable pieces:")?;
        for (origin, candidates) in moves.iter() {
            let targets: Vec<String> = candidates
                .iter()
                .enumerate()
                .map(|(i, c)| format!("[{i}] {}", c.to))
                .collect();
            writeln!(self.writer, "  {origin}: {}", targets.join("  "))?;
        }

        let origin = loop {
            let text = self.prompt("Piece (row, col): ")?;
            match text.parse::<Square>() {
                Ok(square) => break square,
                Err(e) => writeln!(self.writer, "{e}")?,
            }
        };
        let index = loop {
            let text = self.prompt("Move index: ")?;
            match text.parse::<usize>() {
                Ok(index) => break index,
                Err(_) => writeln!(self.writer, "'{text}' is not an index")?,
            }
        };
        Ok((origin, index))
    }

    fn reject(&mut self, reason: &str) {
        if let Err(e) = writeln!(self.writer, "Invalid selection: {reason}") {
            warn!("could not write to terminal: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::movegen::legal_moves;
    use crate::stats::StatsStore;
    use crate::zobrist::Zobrist;
    use crate::config::MctsConfig;
    use draughts_shared::{BLACK_MAN, WHITE_MAN};
    use rand::SeedableRng;
    use std::collections::VecDeque;
    use std::io::Cursor;
    use std::sync::Arc;

    struct Scripted {
        picks: VecDeque<(Square, usize)>,
        rejections: usize,
    }

    impl InputProvider for Scripted {
        fn select(&mut self, _player: Player, _moves: &MoveIndex) -> Result<(Square, usize)> {
            self.picks
                .pop_front()
                .ok_or_else(|| DraughtsError::InvalidSelection("script exhausted".to_string()))
        }

        fn reject(&mut self, _reason: &str) {
            self.rejections += 1;
        }
    }

    #[test]
    fn test_random_actor_plays_legal_moves() {
        let board = Board::new(8).unwrap();
        let moves = legal_moves(Player::White, &board);
        let mut actor = RandomActor::new(Player::White, Xoshiro256PlusPlus::seed_from_u64(5));
        for _ in 0..20 {
            let mv = actor.select_action(&board, &moves).unwrap();
            assert!(moves.contains(&mv));
        }
    }

    #[test]
    fn test_random_actor_without_moves() {
        let board = Board::empty(4).unwrap();
        let moves = legal_moves(Player::Black, &board);
        let mut actor = RandomActor::new(Player::Black, Xoshiro256PlusPlus::seed_from_u64(5));
        assert!(matches!(
            actor.select_action(&board, &moves),
            Err(DraughtsError::NoLegalMoves(Player::Black))
        ));
    }

    #[test]
    fn test_mcts_actor_returns_legal_move() {
        let board = Board::new(6).unwrap();
        let config = MctsConfig {
            simulations: 10,
            ..MctsConfig::default()
        };
        let engine = MctsEngine::new(
            Player::White,
            config,
            Arc::new(Zobrist::new(6, 1)),
            StatsStore::new().into_shared(),
            Xoshiro256PlusPlus::seed_from_u64(2),
        );
        let mut actor = MctsActor::new(engine);
        let moves = legal_moves(Player::White, &board);
        let mv = actor.select_action(&board, &moves).unwrap();
        assert!(moves.contains(&mv));
        assert_eq!(actor.player(), Player::White);
    }

    #[test]
    fn test_human_actor_retries_until_legal() {
        let board = Board::new(8).unwrap();
        let moves = legal_moves(Player::White, &board);
        let script = Scripted {
            picks: VecDeque::from(vec![
                (Square::new(0, 0), 0),
                (Square::new(2, 0), 5),
                (Square::new(2, 2), 1),
            ]),
            rejections: 0,
        };
        let mut actor = HumanActor::new(Player::White, script);
        let mv = actor.select_action(&board, &moves).unwrap();
        assert_eq!(mv, Move::simple(Square::new(2, 2), Square::new(3, 3)));
        assert_eq!(actor.input.rejections, 2);
    }

    #[test]
    fn test_human_actor_gives_up_after_max_attempts() {
        let board = Board::new(8).unwrap();
        let moves = legal_moves(Player::White, &board);
        let script = Scripted {
            picks: VecDeque::from(vec![(Square::new(0, 0), 0), (Square::new(0, 2), 0)]),
            rejections: 0,
        };
        let mut actor = HumanActor::new(Player::White, script).with_max_attempts(2);
        assert!(matches!(
            actor.select_action(&board, &moves),
            Err(DraughtsError::InvalidSelection(_))
        ));
    }

    #[test]
    fn test_line_input_parses_origin_and_index() {
        let board = Board::with_pieces(
            8,
            &[(Square::new(2, 2), WHITE_MAN), (Square::new(6, 6), BLACK_MAN)],
        )
        .unwrap();
        let moves = legal_moves(Player::White, &board);
        let input = Cursor::new("oops\n2, 2\nx\n1\n");
        let mut output = Vec::new();
        let selection = LineInput::new(input, &mut output)
            .select(Player::White, &moves)
            .unwrap();
        assert_eq!(selection, (Square::new(2, 2), 1));

        let transcript = String::from_utf8(output).unwrap();
        assert!(transcript.contains("white to move"));
        assert!(transcript.contains("'x' is not an index"));
    }

    #[test]
    fn test_line_input_reports_closed_input() {
        let board = Board::new(8).unwrap();
        let moves = legal_moves(Player::White, &board);
        let mut output = Vec::new();
        let result = LineInput::new(Cursor::new(""), &mut output).select(Player::White, &moves);
        assert!(matches!(result, Err(DraughtsError::InvalidSelection(_))));
    }
}
