use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::board::{Board, Tile};

pub const SPAWN_LOW_TILE: Tile = 2;
pub const SPAWN_HIGH_TILE: Tile = 4;
pub const SPAWN_LOW_PROBABILITY: f64 = 0.9;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpawnMode {
    /// Always a 2, always in the first empty cell in row-major order.
    Deterministic,
    /// Uniform empty cell; 2 with p=0.9, otherwise 4.
    #[default]
    Random,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpawnedTile {
    pub row: usize,
    pub col: usize,
    pub value: Tile,
}

/// Places one new tile. Returns `None` and leaves the board untouched when it
/// is full. `rng` is only consulted in [`SpawnMode::Random`].
pub fn spawn_tile<R: Rng + ?Sized>(
    board: &mut Board,
    mode: SpawnMode,
    rng: &mut R,
) -> Option<SpawnedTile> {
    let empty = board.count_empty();
    if empty == 0 {
        return None;
    }

    let (index, value) = match mode {
        SpawnMode::Deterministic => (0, SPAWN_LOW_TILE),
        SpawnMode::Random => {
            let index = rng.gen_range(0..empty);
            let value = if rng.gen_bool(SPAWN_LOW_PROBABILITY) {
                SPAWN_LOW_TILE
            } else {
                SPAWN_HIGH_TILE
            };
            (index, value)
        }
    };

    let (row, col) = board.empty_cells().nth(index)?;
    board.set(row, col, value);
    Some(SpawnedTile { row, col, value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn deterministic_spawn_fills_first_empty_cell() {
        let mut board = Board::from_rows([[2, 4, 0, 8], [0; 4], [0; 4], [0; 4]]);
        let mut rng = StdRng::seed_from_u64(1);
        let spawned = spawn_tile(&mut board, SpawnMode::Deterministic, &mut rng);
        assert_eq!(
            spawned,
            Some(SpawnedTile {
                row: 0,
                col: 2,
                value: 2
            })
        );
        assert_eq!(board.rows()[0], [2, 4, 2, 8]);
    }

    #[test]
    fn full_board_is_left_untouched() {
        let rows = [[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 2]];
        let mut board = Board::from_rows(rows);
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(spawn_tile(&mut board, SpawnMode::Random, &mut rng), None);
        assert_eq!(board, Board::from_rows(rows));
    }

    #[test]
    fn random_spawn_only_places_twos_and_fours_on_empty_cells() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut fours = 0;
        let trials = 4_000;
        for _ in 0..trials {
            let mut board = Board::from_rows([[2, 0, 0, 0], [0; 4], [0; 4], [0, 0, 0, 8]]);
            let spawned = spawn_tile(&mut board, SpawnMode::Random, &mut rng)
                .expect("board has empty cells");
            assert!(spawned.value == 2 || spawned.value == 4);
            assert_ne!((spawned.row, spawned.col), (0, 0));
            assert_ne!((spawned.row, spawned.col), (3, 3));
            if spawned.value == 4 {
                fours += 1;
            }
        }
        // Expect ~10% fours; allow a wide band.
        assert!((200..=600).contains(&fours), "fours = {fours}");
    }

    #[test]
    fn random_spawn_reaches_every_empty_cell() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut seen = [[false; 4]; 4];
        for _ in 0..2_000 {
            let mut board = Board::new();
            let spawned = spawn_tile(&mut board, SpawnMode::Random, &mut rng)
                .expect("empty board");
            seen[spawned.row][spawned.col] = true;
        }
        assert!(seen.iter().flatten().all(|&hit| hit));
    }
}
