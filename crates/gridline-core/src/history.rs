//! Bounded two-stack undo/redo history of local actions.

use crate::actions::LocalAction;

/// Maximum number of undo entries kept per session.
pub const MAX_UNDO_HISTORY: usize = 50;

/// Linear undo/redo stacks. Pushing a new commit clears the redo stack;
/// undoing moves the action across so it can be redone, and vice versa.
#[derive(Debug, Default)]
pub struct UndoStack {
    undo: Vec<LocalAction>,
    redo: Vec<LocalAction>,
}

impl UndoStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a freshly committed action. Drops the oldest entry past
    /// capacity and invalidates the redo stack.
    pub fn push(&mut self, action: LocalAction) {
        self.undo.push(action);
        self.redo.clear();
        if self.undo.len() > MAX_UNDO_HISTORY {
            self.undo.remove(0);
        }
    }

    /// Pop the most recent undoable action.
    pub fn take_undo(&mut self) -> Option<LocalAction> {
        self.undo.pop()
    }

    /// Pop the most recent redoable action.
    pub fn take_redo(&mut self) -> Option<LocalAction> {
        self.redo.pop()
    }

    /// An undone action becomes redoable.
    pub fn accept_undone(&mut self, action: LocalAction) {
        self.redo.push(action);
    }

    /// A redone action becomes undoable again, without touching the rest of
    /// the redo stack.
    pub fn accept_redone(&mut self, action: LocalAction) {
        self.undo.push(action);
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

    /// Forget everything, e.g. when the chain is broken apart and recorded
    /// indices no longer describe it.
    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}
