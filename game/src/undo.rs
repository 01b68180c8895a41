use engine::UndoRing;
use serde::{Deserialize, Serialize};

use crate::board::Board;

/// Slots in the history ring. One slot always holds the current state, so at
/// most `UNDO_CAPACITY - 1` moves can be undone in a row.
pub const UNDO_CAPACITY: usize = 4;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub board: Board,
    pub score: u32,
}

/// Board/score snapshots taken after every non-trivial move and after the
/// first spawn of a new game.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UndoHistory {
    ring: UndoRing<Snapshot, UNDO_CAPACITY>,
}

impl UndoHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_parts(
        slots: [Snapshot; UNDO_CAPACITY],
        write_index: usize,
        count: usize,
    ) -> Option<Self> {
        UndoRing::from_parts(slots, write_index, count).map(|ring| Self { ring })
    }

    pub fn push(&mut self, board: &Board, score: u32) {
        self.ring.push(Snapshot {
            board: *board,
            score,
        });
    }

    /// Steps back one snapshot and returns it, or `None` when only the
    /// current state is retained.
    pub fn pop(&mut self) -> Option<Snapshot> {
        self.ring.pop()
    }

    pub fn clear(&mut self) {
        self.ring.clear();
    }

    pub fn can_undo(&self) -> bool {
        self.ring.can_pop()
    }

    pub fn undo_depth(&self) -> usize {
        self.ring.depth()
    }

    pub fn count(&self) -> usize {
        self.ring.len()
    }

    pub fn write_index(&self) -> usize {
        self.ring.write_index()
    }

    pub fn latest(&self) -> Option<&Snapshot> {
        self.ring.current()
    }

    pub fn slots(&self) -> &[Snapshot; UNDO_CAPACITY] {
        self.ring.slots()
    }
}
