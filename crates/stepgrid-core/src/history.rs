//! Bounded undo/redo stacks

use std::collections::VecDeque;

pub const DEFAULT_MAX_HISTORY: usize = 100;

/// An undo stack with its redo counterpart. Both are bounded; the oldest
/// entries are evicted first. Recording a new entry clears the redo side.
#[derive(Debug, Clone)]
pub struct UndoStack<T> {
    undo: VecDeque<T>,
    redo: VecDeque<T>,
    limit: usize,
}

impl<T> UndoStack<T> {
    pub fn new(limit: usize) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: VecDeque::new(),
            limit: limit.max(1),
        }
    }

    fn push_bounded(stack: &mut VecDeque<T>, entry: T, limit: usize) {
        stack.push_back(entry);
        while stack.len() > limit {
            stack.pop_front();
        }
    }

    /// Record the state as it was before a change
    pub fn record(&mut self, before: T) {
        Self::push_bounded(&mut self.undo, before, self.limit);
        self.redo.clear();
    }

    /// Pop the previous state, stashing `current` for redo
    pub fn undo(&mut self, current: T) -> Option<T> {
        let previous = self.undo.pop_back()?;
        Self::push_bounded(&mut self.redo, current, self.limit);
        Some(previous)
    }

    /// Pop the next state, stashing `current` for undo
    pub fn redo(&mut self, current: T) -> Option<T> {
        let next = self.redo.pop_back()?;
        Self::push_bounded(&mut self.undo, current, self.limit);
        Some(next)
    }

    /// Like [`Self::undo`], but the state stashed for redo is derived from
    /// the popped entry. If `current` returns `None` the entry is discarded.
    pub fn undo_with(&mut self, current: impl FnOnce(&T) -> Option<T>) -> Option<T> {
        let previous = self.undo.pop_back()?;
        let current = current(&previous)?;
        Self::push_bounded(&mut self.redo, current, self.limit);
        Some(previous)
    }

    /// Counterpart of [`Self::undo_with`]
    pub fn redo_with(&mut self, current: impl FnOnce(&T) -> Option<T>) -> Option<T> {
        let next = self.redo.pop_back()?;
        let current = current(&next)?;
        Self::push_bounded(&mut self.undo, current, self.limit);
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

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}

impl<T> Default for UndoStack<T> {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HISTORY)
    }
}
