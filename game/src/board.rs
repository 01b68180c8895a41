use std::fmt;

use serde::{Deserialize, Serialize};

pub const BOARD_DIM: usize = 4;
pub const BOARD_CELLS: usize = BOARD_DIM * BOARD_DIM;

/// A cell value: 0 for empty, otherwise a power of two in `2..=MAX_TILE`.
pub type Tile = u32;

pub const EMPTY_TILE: Tile = 0;

/// Largest tile that fits the signed 32-bit save format.
pub const MAX_TILE: Tile = 1 << 30;

pub fn is_valid_tile(value: Tile) -> bool {
    value == EMPTY_TILE || (value >= 2 && value <= MAX_TILE && value.is_power_of_two())
}

/// Fixed square grid of tiles, row-major.
///
/// `set` rejects invalid tiles. `from_rows` and serde take values as given;
/// merge invariants are kept by the move engine and the spawner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Board {
    cells: [[Tile; BOARD_DIM]; BOARD_DIM],
}

impl Board {
    pub const EMPTY: Board = Board {
        cells: [[EMPTY_TILE; BOARD_DIM]; BOARD_DIM],
    };

    pub fn new() -> Self {
        Self::EMPTY
    }

    pub fn from_rows(cells: [[Tile; BOARD_DIM]; BOARD_DIM]) -> Self {
        Self { cells }
    }

    pub fn rows(&self) -> &[[Tile; BOARD_DIM]; BOARD_DIM] {
        &self.cells
    }

    pub fn get(&self, row: usize, col: usize) -> Option<Tile> {
        self.cells.get(row)?.get(col).copied()
    }

    /// Writes a tile; returns false (and changes nothing) when out of bounds
    /// or when `value` is not a valid tile.
    pub fn set(&mut self, row: usize, col: usize, value: Tile) -> bool {
        if !is_valid_tile(value) {
            return false;
        }
        match self.cells.get_mut(row).and_then(|r| r.get_mut(col)) {
            Some(cell) => {
                *cell = value;
                true
            }
            None => false,
        }
    }

    /// Row-major iterator over `(row, col, tile)`.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, Tile)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .flat_map(|(row, r)| r.iter().enumerate().map(move |(col, &v)| (row, col, v)))
    }

    /// Empty cells in row-major scan order.
    pub fn empty_cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.iter()
            .filter(|&(_, _, v)| v == EMPTY_TILE)
            .map(|(row, col, _)| (row, col))
    }

    pub fn count_empty(&self) -> usize {
        self.empty_cells().count()
    }

    pub fn is_full(&self) -> bool {
        self.count_empty() == 0
    }

    pub fn highest_tile(&self) -> Tile {
        self.iter().map(|(_, _, v)| v).max().unwrap_or(EMPTY_TILE)
    }

    pub fn tile_sum(&self) -> u64 {
        self.iter().map(|(_, _, v)| u64::from(v)).sum()
    }

    /// True if any cell is empty or two orthogonal neighbours can merge.
    /// A board for which this is false is game over.
    pub fn has_available_move(&self) -> bool {
        for row in 0..BOARD_DIM {
            for col in 0..BOARD_DIM {
                let v = self.cells[row][col];
                if v == EMPTY_TILE {
                    return true;
                }
                if v >= MAX_TILE {
                    continue;
                }
                if row + 1 < BOARD_DIM && self.cells[row + 1][col] == v {
                    return true;
                }
                if col + 1 < BOARD_DIM && self.cells[row][col + 1] == v {
                    return true;
                }
            }
        }
        false
    }

    pub(crate) fn cell(&self, row: usize, col: usize) -> Tile {
        self.cells[row][col]
    }

    pub(crate) fn cell_mut(&mut self, row: usize, col: usize) -> &mut Tile {
        &mut self.cells[row][col]
    }
}

pub fn has_available_move(board: &Board) -> bool {
    board.has_available_move()
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "+------".repeat(BOARD_DIM) + "+";
        writeln!(f, "{rule}")?;
        for row in &self.cells {
            for &v in row {
                if v == EMPTY_TILE {
                    write!(f, "|{:^6}", ".")?;
                } else {
                    write!(f, "|{v:^6}")?;
                }
            }
            writeln!(f, "|")?;
            writeln!(f, "{rule}")?;
        }
        Ok(())
    }
}
