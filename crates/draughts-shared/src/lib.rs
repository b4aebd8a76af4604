#![no_std]

/// Code of an empty square.
pub const EMPTY: i8 = 0;
/// Code of a white man.
pub const WHITE_MAN: i8 = -1;
/// Code of a white king.
pub const WHITE_KING: i8 = -2;
/// Code of a black man.
pub const BLACK_MAN: i8 = 1;
/// Code of a black king.
pub const BLACK_KING: i8 = 2;

/// Number of distinct square codes (-2..=2), used to size hash tables.
pub const CODE_COUNT: usize = 5;

/// The four diagonal directions as (row delta, col delta).
pub const DIAGONALS: [(i32, i32); 4] = [(1, -1), (1, 1), (-1, -1), (-1, 1)];

/// Maps a square code to a dense index in `0..CODE_COUNT`.
pub fn code_index(code: i8) -> usize {
    (code as i32 + 2) as usize
}

/// Returns true if `code` is a king of either colour.
pub fn is_king(code: i8) -> bool {
    code == WHITE_KING || code == BLACK_KING
}

/// Returns true if the two codes belong to opposing sides.
///
/// Empty squares are never enemies of anything.
pub fn is_enemy(a: i8, b: i8) -> bool {
    (a < 0 && b > 0) || (a > 0 && b < 0)
}

/// Offsets `(row, col)` by `(dr, dc)` scaled by `steps`, returning the target
/// square only if it lies on a `size`x`size` board.
pub fn offset(row: usize, col: usize, dr: i32, dc: i32, steps: i32, size: usize) -> Option<(usize, usize)> {
    let r = row as i32 + dr * steps;
    let c = col as i32 + dc * steps;
    if r < 0 || c < 0 || r >= size as i32 || c >= size as i32 {
        None
    } else {
        Some((r as usize, c as usize))
    }
}

/// Counts occupied squares in a flat board slice.
///
/// # Arguments
/// * `board` - The board data as a flat slice of square codes
pub fn count_pieces(board: &[i8]) -> usize {
    board.iter().filter(|&&code| code != EMPTY).count()
}
