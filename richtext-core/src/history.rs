//! Snapshot-based undo/redo history

use crate::model::Document;
use std::collections::VecDeque;

/// Default number of snapshots kept on each stack
pub const DEFAULT_CAPACITY: usize = 100;

/// Two bounded stacks of whole-document snapshots.
///
/// Every state handed in is cloned, so the history never aliases the live
/// document. History is linear: recording a new state discards the redo line.
#[derive(Debug, Clone)]
pub struct History {
    undo: VecDeque<Document>,
    redo: VecDeque<Document>,
    capacity: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

impl History {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a history keeping at most `capacity` snapshots per stack (minimum 1)
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Record a pre-mutation state
    pub fn push_state(&mut self, state: &Document) {
        self.redo.clear();
        push_bounded(&mut self.undo, state.clone(), self.capacity);
    }

    /// Step back: stash `current` for redo and return the previous state
    pub fn undo(&mut self, current: &Document) -> Option<Document> {
        let previous = self.undo.pop_back()?;
        push_bounded(&mut self.redo, current.clone(), self.capacity);
        Some(previous)
    }

    /// Step forward: stash `current` for undo and return the next state
    pub fn redo(&mut self, current: &Document) -> Option<Document> {
        let next = self.redo.pop_back()?;
        push_bounded(&mut self.undo, current.clone(), self.capacity);
        Some(next)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    /// Drop both stacks
    pub fn reset(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}

/// Push onto the top, evicting from the bottom beyond `capacity`
fn push_bounded(stack: &mut VecDeque<Document>, state: Document, capacity: usize) {
    stack.push_back(state);
    while stack.len() > capacity {
        stack.pop_front();
    }
}
