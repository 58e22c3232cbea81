use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::moves::Move;
use crate::piece::{Color, Piece};

/// A committed position as the undo/redo stacks store it.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct Snapshot {
    pub board: Board,
    pub turn: Color,
    pub last_move: Option<Move>,
    pub captured: Vec<Piece>,
}

/// Undo and redo stacks, most recent entry last.
#[derive(Clone, Serialize, Deserialize, Debug, Default)]
pub struct History {
    undo_stack: VecDeque<Snapshot>,
    redo_stack: Vec<Snapshot>,
    limit: Option<usize>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// History that keeps at most `limit` undo steps, dropping the oldest.
    pub fn with_limit(limit: Option<usize>) -> Self {
        History {
            limit,
            ..Self::default()
        }
    }

    /// Record the position about to be replaced by a fresh move. Any redo
    /// future is discarded.
    pub fn record(&mut self, snapshot: Snapshot) {
        self.redo_stack.clear();
        self.push_undo(snapshot);
    }

    /// Step back: `current` moves onto the redo stack and the previous
    /// snapshot is returned.
    pub fn undo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let previous = self.undo_stack.pop_back()?;
        self.redo_stack.push(current);
        Some(previous)
    }

    /// Step forward: `current` moves onto the undo stack and the next
    /// snapshot is returned.
    pub fn redo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let next = self.redo_stack.pop()?;
        self.push_undo(current);
        Some(next)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    fn push_undo(&mut self, snapshot: Snapshot) {
        if self.limit == Some(0) {
            return;
        }
        self.undo_stack.push_back(snapshot);
        if let Some(limit) = self.limit {
            while self.undo_stack.len() > limit {
                self.undo_stack.pop_front();
            }
        }
    }
}
