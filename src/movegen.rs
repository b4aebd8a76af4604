//! # Move Generation
//!
//! Pure legal-move generation for English draughts.
//!
//! ## Rules
//! - A man steps one square diagonally forward; a king steps one square in any
//!   diagonal direction. The destination must be empty.
//! - A capture jumps an adjacent enemy piece onto the empty square beyond it.
//!   Men jump forward only, kings in all four directions.
//! - Jumps chain: from every landing square the piece keeps jumping while it
//!   can. Only complete chains (ones that cannot be extended) are moves; the
//!   squares passed through on the way are not kept.
//! - A king may not jump a piece it already captured earlier in the same chain,
//!   but may land back on its own starting square mid-chain.
//! - Captured pieces stay on the board until the move is applied, so they
//!   block landing squares while a chain is explored.
//! - If a piece can capture, its simple moves are not listed. If any piece of
//!   the side to move can capture, only capturing moves are legal
//!   ([`legal_moves`]).
//!
//! Chains are enumerated breadth-first over an arena of chain nodes. Each node
//! records its parent, its landing square and the piece it jumped; leaves of
//! the arena are the complete chains.

use crate::board::{Board, Player, Square};
use draughts_shared::{is_enemy, is_king, offset, DIAGONALS};
use rand::Rng;
use std::collections::BTreeMap;
use std::fmt;

/// A fully resolved move: where the piece starts, where it ends, and which
/// enemy squares it clears on the way.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub captures: Vec<Square>,
}

impl Move {
    /// A non-capturing move.
    pub fn simple(from: Square, to: Square) -> Self {
        Move {
            from,
            to,
            captures: Vec::new(),
        }
    }

    pub fn is_capture(&self) -> bool {
        !self.captures.is_empty()
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)?;
        if self.is_capture() {
            let taken: Vec<String> = self.captures.iter().map(|s| s.to_string()).collect();
            write!(f, " x {}", taken.join(" "))?;
        }
        Ok(())
    }
}

/// One reachable destination for a given origin.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Candidate {
    pub to: Square,
    pub captures: Vec<Square>,
}

/// Moves available to one side, grouped by origin square.
///
/// Only origins with at least one move are present. Origins and their
/// candidates keep a stable order so seeded searches replay identically.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MoveIndex {
    entries: BTreeMap<Square, Vec<Candidate>>,
}

impl MoveIndex {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of origins with at least one move.
    pub fn origin_count(&self) -> usize {
        self.entries.len()
    }

    /// Total number of moves across all origins.
    pub fn move_count(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn origins(&self) -> impl Iterator<Item = Square> + '_ {
        self.entries.keys().copied()
    }

    pub fn get(&self, origin: Square) -> Option<&[Candidate]> {
        self.entries.get(&origin).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Square, &[Candidate])> {
        self.entries.iter().map(|(sq, c)| (*sq, c.as_slice()))
    }

    /// The move at position `index` in `origin`'s candidate list.
    pub fn candidate(&self, origin: Square, index: usize) -> Option<Move> {
        self.get(origin)?.get(index).map(|c| Move {
            from: origin,
            to: c.to,
            captures: c.captures.clone(),
        })
    }

    /// All moves, origin by origin.
    pub fn moves(&self) -> impl Iterator<Item = Move> + '_ {
        self.entries.iter().flat_map(|(from, candidates)| {
            candidates.iter().map(move |c| Move {
                from: *from,
                to: c.to,
                captures: c.captures.clone(),
            })
        })
    }

    pub fn contains(&self, mv: &Move) -> bool {
        self.get(mv.from)
            .map(|cands| cands.iter().any(|c| c.to == mv.to && c.captures == mv.captures))
            .unwrap_or(false)
    }

    /// Returns true if any listed move captures.
    pub fn has_captures(&self) -> bool {
        self.entries
            .values()
            .any(|cands| cands.iter().any(|c| !c.captures.is_empty()))
    }

    /// Picks a uniformly random origin, then a uniformly random destination
    /// for it. `None` when there are no moves.
    pub fn choose_random<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Move> {
        if self.entries.is_empty() {
            return None;
        }
        let (from, candidates) = self.entries.iter().nth(rng.random_range(0..self.entries.len()))?;
        let pick = &candidates[rng.random_range(0..candidates.len())];
        Some(Move {
            from: *from,
            to: pick.to,
            captures: pick.captures.clone(),
        })
    }

    /// Applies the forced-capture rule: when any capture exists, every
    /// non-capturing move is dropped. Otherwise the index is returned as is.
    pub fn forced(self) -> MoveIndex {
        if !self.has_captures() {
            return self;
        }
        let entries = self
            .entries
            .into_iter()
            .filter_map(|(from, cands)| {
                let captures: Vec<Candidate> =
                    cands.into_iter().filter(|c| !c.captures.is_empty()).collect();
                (!captures.is_empty()).then_some((from, captures))
            })
            .collect();
        MoveIndex { entries }
    }

    fn insert(&mut self, origin: Square, candidates: Vec<Candidate>) {
        if !candidates.is_empty() {
            self.entries.insert(origin, candidates);
        }
    }
}

/// Generates the raw move index for `player`: captures for pieces that can
/// capture, simple moves for the rest. The forced-capture rule is not applied.
pub fn generate_moves(player: Player, board: &Board) -> MoveIndex {
    let mut index = MoveIndex::default();
    for origin in board.squares_of(player) {
        let king = is_king(board.get(origin));
        let chains = jump_chains(player, board, origin, king);
        if chains.is_empty() {
            index.insert(origin, simple_moves(player, board, origin, king));
        } else {
            index.insert(origin, chains);
        }
    }
    index
}

/// Generates the legal moves for `player`, with forced capture applied.
pub fn legal_moves(player: Player, board: &Board) -> MoveIndex {
    generate_moves(player, board).forced()
}

/// Directions a piece may move or jump in.
fn directions(player: Player, king: bool) -> Vec<(i32, i32)> {
    if king {
        DIAGONALS.to_vec()
    } else {
        let fwd = player.forward();
        vec![(fwd, -1), (fwd, 1)]
    }
}

fn simple_moves(player: Player, board: &Board, origin: Square, king: bool) -> Vec<Candidate> {
    directions(player, king)
        .into_iter()
        .filter_map(|(dr, dc)| offset(origin.row, origin.col, dr, dc, 1, board.size()))
        .map(|(r, c)| Square::new(r, c))
        .filter(|&to| board.is_empty(to))
        .map(|to| Candidate {
            to,
            captures: Vec::new(),
        })
        .collect()
}

/// A node in the jump-chain arena.
struct ChainNode {
    parent: Option<usize>,
    at: Square,
    /// Piece jumped to reach this node; `None` only for the root.
    jumped: Option<Square>,
    has_children: bool,
}

/// Captured squares along the chain ending at `idx`, in jump order.
fn chain_captures(nodes: &[ChainNode], idx: usize) -> Vec<Square> {
    let mut captures = Vec::new();
    let mut cursor = Some(idx);
    while let Some(i) = cursor {
        if let Some(sq) = nodes[i].jumped {
            captures.push(sq);
        }
        cursor = nodes[i].parent;
    }
    captures.reverse();
    captures
}

/// Enumerates every complete jump chain starting at `origin`.
fn jump_chains(player: Player, board: &Board, origin: Square, king: bool) -> Vec<Candidate> {
    let size = board.size();
    let mover = board.get(origin);
    let dirs = directions(player, king);

    let mut nodes = vec![ChainNode {
        parent: None,
        at: origin,
        jumped: None,
        has_children: false,
    }];
    let mut frontier = vec![0usize];

    while !frontier.is_empty() {
        let mut next = Vec::new();
        for idx in frontier {
            let at = nodes[idx].at;
            let taken = chain_captures(&nodes, idx);
            for &(dr, dc) in &dirs {
                let (Some((mr, mc)), Some((lr, lc))) = (
                    offset(at.row, at.col, dr, dc, 1, size),
                    offset(at.row, at.col, dr, dc, 2, size),
                ) else {
                    continue;
                };
                let over = Square::new(mr, mc);
                let landing = Square::new(lr, lc);

                if !is_enemy(mover, board.get(over)) || taken.contains(&over) {
                    continue;
                }
                let can_land = board.is_empty(landing) || (king && landing == origin);
                if !can_land {
                    continue;
                }

                nodes[idx].has_children = true;
                nodes.push(ChainNode {
                    parent: Some(idx),
                    at: landing,
                    jumped: Some(over),
                    has_children: false,
                });
                next.push(nodes.len() - 1);
            }
        }
        frontier = next;
    }

    (1..nodes.len())
        .filter(|&i| !nodes[i].has_children)
        .map(|i| Candidate {
            to: nodes[i].at,
            captures: chain_captures(&nodes, i),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use draughts_shared::{BLACK_KING, BLACK_MAN, WHITE_KING, WHITE_MAN};

    fn sq(r: usize, c: usize) -> Square {
        Square::new(r, c)
    }

    fn destinations(index: &MoveIndex, origin: Square) -> Vec<Square> {
        index.get(origin).unwrap().iter().map(|c| c.to).collect()
    }

    #[test]
    fn test_opening_moves_white() {
        let board = Board::new(8).unwrap();
        let index = legal_moves(Player::White, &board);
        assert_eq!(index.origin_count(), 4);
        assert_eq!(index.move_count(), 7);
        assert_eq!(destinations(&index, sq(2, 0)), vec![sq(3, 1)]);
        assert_eq!(destinations(&index, sq(2, 2)), vec![sq(3, 1), sq(3, 3)]);
        assert!(!index.has_captures());
    }

    #[test]
    fn test_opening_moves_black() {
        let board = Board::new(8).unwrap();
        let index = legal_moves(Player::Black, &board);
        assert_eq!(index.move_count(), 7);
        assert_eq!(destinations(&index, sq(5, 7)), vec![sq(4, 6)]);
        assert_eq!(destinations(&index, sq(5, 1)), vec![sq(4, 0), sq(4, 2)]);
    }

    #[test]
    fn test_king_moves_all_directions() {
        let board = Board::with_pieces(8, &[(sq(4, 4), WHITE_KING)]).unwrap();
        let index = legal_moves(Player::White, &board);
        let mut dests = destinations(&index, sq(4, 4));
        dests.sort();
        assert_eq!(dests, vec![sq(3, 3), sq(3, 5), sq(5, 3), sq(5, 5)]);
    }

    #[test]
    fn test_men_do_not_move_backwards() {
        let board = Board::with_pieces(8, &[(sq(4, 4), BLACK_MAN), (sq(5, 5), WHITE_MAN)]).unwrap();
        let index = legal_moves(Player::Black, &board);
        assert_eq!(destinations(&index, sq(4, 4)), vec![sq(3, 3), sq(3, 5)]);
        // white man cannot capture the black man behind it
        let white = legal_moves(Player::White, &board);
        assert!(!white.has_captures());
    }

    #[test]
    fn test_single_capture() {
        let board = Board::with_pieces(8, &[(sq(2, 2), WHITE_MAN), (sq(3, 3), BLACK_MAN)]).unwrap();
        let index = legal_moves(Player::White, &board);
        assert_eq!(index.move_count(), 1);
        let mv = index.moves().next().unwrap();
        assert_eq!(mv.to, sq(4, 4));
        assert_eq!(mv.captures, vec![sq(3, 3)]);
    }

    #[test]
    fn test_blocked_capture() {
        let board = Board::with_pieces(
            8,
            &[(sq(2, 2), WHITE_MAN), (sq(3, 3), BLACK_MAN), (sq(4, 4), BLACK_MAN)],
        )
        .unwrap();
        let index = generate_moves(Player::White, &board);
        assert!(!index.has_captures());
        assert_eq!(destinations(&index, sq(2, 2)), vec![sq(3, 1)]);
    }

    #[test]
    fn test_multi_jump_keeps_only_complete_chain() {
        let board = Board::with_pieces(
            8,
            &[(sq(0, 0), WHITE_MAN), (sq(1, 1), BLACK_MAN), (sq(3, 3), BLACK_MAN)],
        )
        .unwrap();
        let index = legal_moves(Player::White, &board);
        let cands = index.get(sq(0, 0)).unwrap();
        assert_eq!(cands.len(), 1);
        assert_eq!(cands[0].to, sq(4, 4));
        assert_eq!(cands[0].captures, vec![sq(1, 1), sq(3, 3)]);
    }

    #[test]
    fn test_branching_chains_keep_each_leaf() {
        let board = Board::with_pieces(
            8,
            &[
                (sq(2, 2), WHITE_MAN),
                (sq(3, 1), BLACK_MAN),
                (sq(3, 3), BLACK_MAN),
                (sq(5, 5), BLACK_MAN),
            ],
        )
        .unwrap();
        let index = legal_moves(Player::White, &board);
        let cands = index.get(sq(2, 2)).unwrap();
        assert_eq!(cands.len(), 2);
        assert!(cands.contains(&Candidate {
            to: sq(4, 0),
            captures: vec![sq(3, 1)],
        }));
        assert!(cands.contains(&Candidate {
            to: sq(6, 6),
            captures: vec![sq(3, 3), sq(5, 5)],
        }));
    }

    #[test]
    fn test_forced_capture_filters_other_pieces() {
        let board = Board::with_pieces(
            8,
            &[(sq(2, 2), WHITE_MAN), (sq(3, 3), BLACK_MAN), (sq(0, 6), WHITE_MAN)],
        )
        .unwrap();
        let raw = generate_moves(Player::White, &board);
        assert_eq!(raw.origin_count(), 2);
        let legal = raw.forced();
        assert_eq!(legal.origin_count(), 1);
        assert!(legal.moves().all(|m| m.is_capture()));
    }

    #[test]
    fn test_king_cannot_rejump_captured_piece() {
        let board = Board::with_pieces(8, &[(sq(4, 4), WHITE_KING), (sq(3, 3), BLACK_MAN)]).unwrap();
        let index = legal_moves(Player::White, &board);
        let cands = index.get(sq(4, 4)).unwrap();
        assert_eq!(cands.len(), 1);
        assert_eq!(cands[0].to, sq(2, 2));
        assert_eq!(cands[0].captures, vec![sq(3, 3)]);
    }

    #[test]
    fn test_king_may_return_to_origin() {
        let board = Board::with_pieces(
            8,
            &[
                (sq(2, 2), BLACK_KING),
                (sq(3, 3), WHITE_MAN),
                (sq(3, 5), WHITE_MAN),
                (sq(1, 5), WHITE_MAN),
                (sq(1, 3), WHITE_MAN),
            ],
        )
        .unwrap();
        let index = legal_moves(Player::Black, &board);
        let cands = index.get(sq(2, 2)).unwrap();
        assert_eq!(cands.len(), 2);
        for cand in cands {
            assert_eq!(cand.to, sq(2, 2));
            assert_eq!(cand.captures.len(), 4);
        }
        let mv = index.moves().next().unwrap();
        let after = board.apply(Player::Black, &mv).unwrap();
        assert_eq!(after.get(sq(2, 2)), BLACK_KING);
        assert_eq!(after.piece_count(), 1);
    }

    #[test]
    fn test_candidate_lookup_and_contains() {
        let board = Board::new(8).unwrap();
        let index = legal_moves(Player::White, &board);
        let mv = index.candidate(sq(2, 2), 1).unwrap();
        assert_eq!(mv.to, sq(3, 3));
        assert!(index.contains(&mv));
        assert!(index.candidate(sq(2, 2), 2).is_none());
        assert!(!index.contains(&Move::simple(sq(2, 2), sq(4, 4))));
    }

    #[test]
    fn test_choose_random_is_legal_and_seeded() {
        use rand::SeedableRng;
        use rand_xoshiro::Xoshiro256PlusPlus;

        let board = Board::new(8).unwrap();
        let index = legal_moves(Player::White, &board);
        let mut a = Xoshiro256PlusPlus::seed_from_u64(11);
        let mut b = Xoshiro256PlusPlus::seed_from_u64(11);
        for _ in 0..20 {
            let mv = index.choose_random(&mut a).unwrap();
            assert!(index.contains(&mv));
            assert_eq!(Some(mv), index.choose_random(&mut b));
        }
        assert!(MoveIndex::default().choose_random(&mut a).is_none());
    }
}
