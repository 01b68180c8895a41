use std::path::Path;

use log::{debug, info, warn};
use rand::{SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};

use crate::board::{Board, Tile};
use crate::moves::{Direction, slide};
use crate::persist::{self, PersistError, PersistedState};
use crate::spawn::{SpawnMode, SpawnedTile, spawn_tile};
use crate::undo::UndoHistory;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Nothing moved; no tile spawned, no snapshot taken.
    Unchanged,
    Moved,
    /// The move changed the board and left no further moves.
    GameOver,
}

/// Read-only view for tooling and JSON output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub board: Board,
    pub score: u32,
    pub highest_tile: Tile,
    pub game_over: bool,
    pub undo_available: usize,
    pub spawn_mode: SpawnMode,
}

/// One live game: board, score, undo history and the spawn RNG.
///
/// Every public method leaves the session fully consistent before returning.
#[derive(Debug, Clone)]
pub struct GameSession {
    board: Board,
    score: u32,
    history: UndoHistory,
    spawn_mode: SpawnMode,
    game_over: bool,
    rng: StdRng,
}

impl GameSession {
    /// Session seeded from OS entropy. Call [`GameSession::start_new_game`]
    /// before playing.
    pub fn new(spawn_mode: SpawnMode) -> Self {
        Self::with_rng(spawn_mode, StdRng::from_entropy())
    }

    pub fn with_seed(spawn_mode: SpawnMode, seed: u64) -> Self {
        Self::with_rng(spawn_mode, StdRng::seed_from_u64(seed))
    }

    fn with_rng(spawn_mode: SpawnMode, rng: StdRng) -> Self {
        Self {
            board: Board::new(),
            score: 0,
            history: UndoHistory::new(),
            spawn_mode,
            game_over: false,
            rng,
        }
    }

    /// Clears board, score and history, spawns the first tile and records it
    /// as the initial snapshot.
    pub fn start_new_game(&mut self, mode: SpawnMode) {
        self.spawn_mode = mode;
        self.board = Board::new();
        self.score = 0;
        self.history.clear();
        self.spawn_tile(mode);
        self.history.push(&self.board, self.score);
        self.refresh_game_over();
        info!("new game started (spawn mode {mode:?})");
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn current_score(&self) -> u32 {
        self.score
    }

    pub fn history(&self) -> &UndoHistory {
        &self.history
    }

    pub fn spawn_mode(&self) -> SpawnMode {
        self.spawn_mode
    }

    pub fn set_spawn_mode(&mut self, mode: SpawnMode) {
        self.spawn_mode = mode;
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn has_available_move(&self) -> bool {
        self.board.has_available_move()
    }

    /// Slides the board only; no spawn, no snapshot.
    pub fn apply_move(&mut self, dir: Direction) -> bool {
        slide(&mut self.board, &mut self.score, dir)
    }

    pub fn spawn_tile(&mut self, mode: SpawnMode) -> Option<SpawnedTile> {
        let spawned = spawn_tile(&mut self.board, mode, &mut self.rng);
        if let Some(tile) = spawned {
            debug!("spawned {} at ({}, {})", tile.value, tile.row, tile.col);
        }
        spawned
    }

    /// One full turn: move, and if anything changed spawn a tile with the
    /// session's spawn mode and snapshot the result.
    pub fn play_turn(&mut self, dir: Direction) -> TurnOutcome {
        if !self.apply_move(dir) {
            return TurnOutcome::Unchanged;
        }
        self.spawn_tile(self.spawn_mode);
        self.history.push(&self.board, self.score);
        self.refresh_game_over();
        debug!("moved {dir:?}, score {}", self.score);

        if self.game_over {
            info!("game over with score {}", self.score);
            TurnOutcome::GameOver
        } else {
            TurnOutcome::Moved
        }
    }

    /// Restores the snapshot before the latest non-trivial move.
    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.history.pop() else {
            return false;
        };
        self.board = snapshot.board;
        self.score = snapshot.score;
        self.refresh_game_over();
        true
    }

    pub fn persisted_state(&self) -> PersistedState {
        PersistedState {
            board: self.board,
            score: self.score,
            history: self.history.clone(),
        }
    }

    /// Replaces board, score and history in one step.
    pub fn restore(&mut self, state: PersistedState) {
        self.board = state.board;
        self.score = state.score;
        self.history = state.history;
        self.refresh_game_over();
    }

    pub fn try_save(&self, path: &Path) -> Result<(), PersistError> {
        persist::write_save_file(path, &self.persisted_state())?;
        info!("game saved to {}", path.display());
        Ok(())
    }

    /// Loads into a scratch state first; the live session is only replaced
    /// when the whole file decoded.
    pub fn try_load(&mut self, path: &Path) -> Result<(), PersistError> {
        let state = persist::read_save_file(path)?;
        self.restore(state);
        info!("game loaded from {}", path.display());
        Ok(())
    }

    pub fn save_to_file(&self, path: &Path) -> bool {
        match self.try_save(path) {
            Ok(()) => true,
            Err(err) => {
                warn!("saving to {} failed: {err}", path.display());
                false
            }
        }
    }

    pub fn load_from_file(&mut self, path: &Path) -> bool {
        match self.try_load(path) {
            Ok(()) => true,
            Err(err) => {
                warn!("loading from {} failed: {err}", path.display());
                false
            }
        }
    }

    /// SHA-256 of the current save image.
    pub fn state_digest(&self) -> Result<String, PersistError> {
        let image = self.persisted_state().encode()?;
        Ok(engine::digest::sha256_hex(&image))
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            board: self.board,
            score: self.score,
            highest_tile: self.board.highest_tile(),
            game_over: self.game_over,
            undo_available: self.history.undo_depth(),
            spawn_mode: self.spawn_mode,
        }
    }

    fn refresh_game_over(&mut self) {
        self.game_over = !self.board.has_available_move();
    }
}
