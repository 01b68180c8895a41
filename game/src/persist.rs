//! Fixed-layout binary save image.
//!
//! Layout, all fields little-endian `i32`:
//!
//! | field               | count                         |
//! |---------------------|-------------------------------|
//! | board tiles         | `BOARD_CELLS`, row-major      |
//! | score               | 1                             |
//! | history tiles       | `UNDO_CAPACITY * BOARD_CELLS` |
//! | history scores      | `UNDO_CAPACITY`               |
//! | history write index | 1                             |
//! | history count       | 1                             |
//!
//! Any other length is rejected on load.

use std::{
    fs, io, mem,
    path::{Path, PathBuf},
};

use bytemuck::{Pod, Zeroable};
use log::warn;

use crate::board::{BOARD_CELLS, BOARD_DIM, Board, Tile, is_valid_tile};
use crate::undo::{Snapshot, UNDO_CAPACITY, UndoHistory};

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct SaveImage {
    tiles: [i32; BOARD_CELLS],
    score: i32,
    history_tiles: [[i32; BOARD_CELLS]; UNDO_CAPACITY],
    history_scores: [i32; UNDO_CAPACITY],
    write_index: i32,
    count: i32,
}

pub const SAVE_IMAGE_LEN: usize = mem::size_of::<SaveImage>();

#[derive(thiserror::Error, Debug)]
pub enum PersistError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("save image is {actual} bytes, expected {expected}")]
    Length { expected: usize, actual: usize },
    #[error("invalid tile value {value} at cell {index}")]
    InvalidTile { index: usize, value: i32 },
    #[error("invalid score {0}")]
    InvalidScore(i32),
    #[error("invalid undo history (write index {write_index}, count {count})")]
    InvalidHistory { write_index: i32, count: i32 },
    #[error("{field} value {value} does not fit the save format")]
    Unencodable { field: &'static str, value: u64 },
}

/// Everything needed to resume a session exactly, undo slots included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedState {
    pub board: Board,
    pub score: u32,
    pub history: UndoHistory,
}

impl PersistedState {
    /// Fails instead of writing any value that `decode` would reject.
    pub fn encode(&self) -> Result<Vec<u8>, PersistError> {
        let slots = self.history.slots();
        let mut image = SaveImage {
            tiles: encode_board(&self.board)?,
            score: encode_score(self.score)?,
            history_tiles: [[0; BOARD_CELLS]; UNDO_CAPACITY],
            history_scores: [0; UNDO_CAPACITY],
            write_index: encode_index("write index", self.history.write_index())?,
            count: encode_index("history count", self.history.count())?,
        };
        for (slot, snapshot) in slots.iter().enumerate() {
            image.history_tiles[slot] = encode_board(&snapshot.board)?;
            image.history_scores[slot] = encode_score(snapshot.score)?;
        }
        Ok(bytemuck::bytes_of(&image).to_vec())
    }

    /// Decodes a full image. Nothing is produced unless every field is valid.
    pub fn decode(bytes: &[u8]) -> Result<Self, PersistError> {
        if bytes.len() != SAVE_IMAGE_LEN {
            return Err(PersistError::Length {
                expected: SAVE_IMAGE_LEN,
                actual: bytes.len(),
            });
        }
        let image: SaveImage =
            bytemuck::try_pod_read_unaligned(bytes).map_err(|_| PersistError::Length {
                expected: SAVE_IMAGE_LEN,
                actual: bytes.len(),
            })?;

        let board = decode_board(&image.tiles)?;
        let score = decode_score(image.score)?;

        let mut slots = [Snapshot::default(); UNDO_CAPACITY];
        for (slot, snapshot) in slots.iter_mut().enumerate() {
            snapshot.board = decode_board(&image.history_tiles[slot])?;
            snapshot.score = decode_score(image.history_scores[slot])?;
        }

        let write_index = i32::from_le(image.write_index);
        let count = i32::from_le(image.count);
        let invalid_history = PersistError::InvalidHistory { write_index, count };
        let (Ok(index), Ok(len)) = (usize::try_from(write_index), usize::try_from(count)) else {
            return Err(invalid_history);
        };
        let history = UndoHistory::from_parts(slots, index, len).ok_or(invalid_history)?;

        Ok(Self {
            board,
            score,
            history,
        })
    }
}

pub fn serialize(state: &PersistedState) -> Result<Vec<u8>, PersistError> {
    state.encode()
}

pub fn deserialize(bytes: &[u8]) -> Result<PersistedState, PersistError> {
    PersistedState::decode(bytes)
}

pub fn write_save_file(path: &Path, state: &PersistedState) -> Result<(), PersistError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    atomic_write(path, &state.encode()?)?;
    Ok(())
}

pub fn read_save_file(path: &Path) -> Result<PersistedState, PersistError> {
    let bytes = fs::read(path)?;
    PersistedState::decode(&bytes)
}

fn encode_score(value: u32) -> Result<i32, PersistError> {
    i32::try_from(value)
        .map(i32::to_le)
        .map_err(|_| PersistError::Unencodable {
            field: "score",
            value: u64::from(value),
        })
}

fn encode_index(field: &'static str, value: usize) -> Result<i32, PersistError> {
    i32::try_from(value)
        .map(i32::to_le)
        .map_err(|_| PersistError::Unencodable {
            field,
            value: value as u64,
        })
}

fn encode_board(board: &Board) -> Result<[i32; BOARD_CELLS], PersistError> {
    let mut cells = [0i32; BOARD_CELLS];
    for (row, col, value) in board.iter() {
        let raw = i32::try_from(value)
            .ok()
            .filter(|_| is_valid_tile(value))
            .ok_or(PersistError::Unencodable {
                field: "tile",
                value: u64::from(value),
            })?;
        cells[row * BOARD_DIM + col] = raw.to_le();
    }
    Ok(cells)
}

fn decode_board(cells: &[i32; BOARD_CELLS]) -> Result<Board, PersistError> {
    let mut board = Board::new();
    for (index, &raw) in cells.iter().enumerate() {
        let value = i32::from_le(raw);
        let tile = Tile::try_from(value)
            .ok()
            .filter(|&tile| is_valid_tile(tile))
            .ok_or(PersistError::InvalidTile { index, value })?;
        board.set(index / BOARD_DIM, index % BOARD_DIM, tile);
    }
    Ok(board)
}

fn decode_score(raw: i32) -> Result<u32, PersistError> {
    let value = i32::from_le(raw);
    u32::try_from(value).map_err(|_| PersistError::InvalidScore(value))
}

/// `game.dat` -> `game.dat.tmp`, next to the target.
fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

/// Writes to a sibling temp file, then renames it over `path`.
fn atomic_write(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let tmp = temp_path(path);
    if let Err(err) = fs::write(&tmp, bytes) {
        let _ = fs::remove_file(&tmp);
        return Err(err);
    }
    match fs::rename(&tmp, path) {
        Ok(()) => Ok(()),
        Err(err) => {
            warn!(
                "rename {} -> {} failed ({err}); copying in place",
                tmp.display(),
                path.display()
            );
            let copied = fs::copy(&tmp, path);
            let _ = fs::remove_file(&tmp);
            copied.map(|_| ())
        }
    }
}
