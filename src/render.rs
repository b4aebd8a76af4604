//! Board rendering.
//!
//! Pieces are drawn as `w`/`W` (White man/king) and `b`/`B` (Black man/king),
//! with row and column indices around the grid so human players can read off
//! coordinates.

use crate::board::Board;
use colored::Colorize;
use draughts_shared::{BLACK_KING, BLACK_MAN, WHITE_KING, WHITE_MAN};
use log::warn;
use std::io::{self, Write};

/// How a renderer should draw.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DisplayMode {
    /// Nothing is drawn.
    Off,
    /// Plain ASCII.
    #[default]
    Plain,
    /// ASCII with ANSI colors for the two sides.
    Colored,
}

/// Draws boards somewhere.
pub trait Renderer {
    fn render(&mut self, board: &Board, mode: DisplayMode);

    /// Reports a move or result line alongside the board.
    fn announce(&mut self, _message: &str) {}
}

/// Renderer that discards everything. Used for headless self-play.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn render(&mut self, _board: &Board, _mode: DisplayMode) {}
}

/// Writes boards to a terminal or any other writer.
pub struct TerminalRenderer<W: Write> {
    out: W,
}

impl TerminalRenderer<io::Stdout> {
    pub fn stdout() -> Self {
        TerminalRenderer { out: io::stdout() }
    }
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W) -> Self {
        TerminalRenderer { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Renderer for TerminalRenderer<W> {
    fn render(&mut self, board: &Board, mode: DisplayMode) {
        if mode == DisplayMode::Off {
            return;
        }
        if let Err(e) = write!(self.out, "{}", format_board(board, mode)).and_then(|_| self.out.flush()) {
            warn!("failed to draw board: {e}");
        }
    }

    fn announce(&mut self, message: &str) {
        if let Err(e) = writeln!(self.out, "{message}") {
            warn!("failed to write message: {e}");
        }
    }
}

fn symbol(code: i8, mode: DisplayMode) -> String {
    let plain = match code {
        WHITE_MAN => "w",
        WHITE_KING => "W",
        BLACK_MAN => "b",
        BLACK_KING => "B",
        _ => " ",
    };
    match (mode, code) {
        (DisplayMode::Colored, WHITE_MAN | WHITE_KING) => plain.white().bold().to_string(),
        (DisplayMode::Colored, BLACK_MAN | BLACK_KING) => plain.red().bold().to_string(),
        _ => plain.to_string(),
    }
}

/// Formats `board` as a grid with row and column labels.
///
/// Returns an empty string in [`DisplayMode::Off`].
pub fn format_board(board: &Board, mode: DisplayMode) -> String {
    if mode == DisplayMode::Off {
        return String::new();
    }
    let size = board.size();
    let separator = format!("   {}+\n", "+---".repeat(size));

    let mut text = String::from("   ");
    for col in 0..size {
        text.push_str(&format!("  {col} "));
    }
    text.push('\n');
    text.push_str(&separator);
    for (row, cells) in board.rows().enumerate() {
        text.push_str(&format!("{row:>2} "));
        for &code in cells {
            text.push_str(&format!("| {} ", symbol(code, mode)));
        }
        text.push_str("|\n");
        text.push_str(&separator);
    }
    text
}
