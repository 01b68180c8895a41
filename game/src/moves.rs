use serde::{Deserialize, Serialize};

use crate::board::{BOARD_DIM, Board, EMPTY_TILE, MAX_TILE, Tile};

/// Score ceiling; matches the signed 32-bit save format.
pub const MAX_SCORE: u32 = i32::MAX as u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Left,
        Direction::Right,
        Direction::Up,
        Direction::Down,
    ];

    /// Parses `l`/`r`/`u`/`d` (case-insensitive).
    pub fn from_key(key: char) -> Option<Self> {
        match key.to_ascii_lowercase() {
            'l' => Some(Direction::Left),
            'r' => Some(Direction::Right),
            'u' => Some(Direction::Up),
            'd' => Some(Direction::Down),
            _ => None,
        }
    }

    pub fn key(self) -> char {
        match self {
            Direction::Left => 'L',
            Direction::Right => 'R',
            Direction::Up => 'U',
            Direction::Down => 'D',
        }
    }

    /// Board coordinates of the `step`-th cell of `line`, counted from the
    /// edge tiles travel towards.
    fn cell(self, line: usize, step: usize) -> (usize, usize) {
        let back = BOARD_DIM - 1 - step;
        match self {
            Direction::Left => (line, step),
            Direction::Right => (line, back),
            Direction::Up => (step, line),
            Direction::Down => (back, line),
        }
    }
}

/// Parses a move string such as `"LLurD"`; whitespace is ignored.
pub fn parse_moves(text: &str) -> Result<Vec<Direction>, char> {
    text.chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| Direction::from_key(c).ok_or(c))
        .collect()
}

/// Slides every line of `board` towards `dir`, merging equal neighbours once.
///
/// Merged values are added to `score`, which stops at [`MAX_SCORE`]. Tiles
/// at [`MAX_TILE`] no longer merge. Returns true iff any tile moved or
/// merged, i.e. a new tile should be spawned.
pub fn slide(board: &mut Board, score: &mut u32, dir: Direction) -> bool {
    let mut changed = false;
    for line in 0..BOARD_DIM {
        changed |= compact_line(board, score, |step| dir.cell(line, step));
    }
    changed
}

pub fn move_left(board: &mut Board, score: &mut u32) -> bool {
    slide(board, score, Direction::Left)
}

pub fn move_right(board: &mut Board, score: &mut u32) -> bool {
    slide(board, score, Direction::Right)
}

pub fn move_up(board: &mut Board, score: &mut u32) -> bool {
    slide(board, score, Direction::Up)
}

pub fn move_down(board: &mut Board, score: &mut u32) -> bool {
    slide(board, score, Direction::Down)
}

/// Single-pass compact+merge of one line, in place.
///
/// `at(step)` maps a position along the line (0 = leading edge) to board
/// coordinates. Writes only ever land on positions already scanned, so the
/// line can be rewritten while it is read.
fn compact_line<F>(board: &mut Board, score: &mut u32, at: F) -> bool
where
    F: Fn(usize) -> (usize, usize),
{
    let mut changed = false;
    let mut skipped = 0usize;
    let mut unmerged: Tile = EMPTY_TILE;

    let write = |board: &mut Board, step: usize, value: Tile| {
        let (row, col) = at(step);
        *board.cell_mut(row, col) = value;
    };

    for step in 0..BOARD_DIM {
        let (row, col) = at(step);
        let value = board.cell(row, col);

        if value == EMPTY_TILE {
            skipped += 1;
        } else if value == unmerged && unmerged < MAX_TILE {
            let merged = unmerged * 2;
            write(board, step - skipped - 1, merged);
            *score = score.saturating_add(merged).min(MAX_SCORE);
            changed = true;
            // The consumed partner frees one more slot.
            skipped += 1;
            unmerged = EMPTY_TILE;
        } else if unmerged != EMPTY_TILE {
            if skipped > 0 {
                changed = true;
            }
            write(board, step - skipped - 1, unmerged);
            unmerged = value;
        } else {
            unmerged = value;
        }
    }

    if unmerged != EMPTY_TILE {
        let slot = BOARD_DIM - skipped - 1;
        let (row, col) = at(slot);
        if board.cell(row, col) != unmerged {
            changed = true;
            write(board, slot, unmerged);
        }
    }

    for step in BOARD_DIM - skipped..BOARD_DIM {
        write(board, step, EMPTY_TILE);
    }

    changed
}
