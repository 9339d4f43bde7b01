// Chunk: docs/chunks/edit_transactions - One undo unit per transaction

//! Undo/redo stacks.
//!
//! Every committed transaction becomes exactly one [`Transaction`] entry,
//! however many edits it carried, so a formatter merge undoes in a single
//! step.

use crate::types::{Position, TextEdit};

/// An edit as it landed in the buffer.
///
/// `start` is in the coordinates of the buffer *after* the whole transaction
/// was applied, which is what the inverse edit needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct AppliedEdit {
    pub start: usize,
    pub removed: String,
    pub inserted: String,
}

impl AppliedEdit {
    fn inverse(&self) -> TextEdit {
        let end = self.start + self.inserted.chars().count();
        TextEdit::new(self.start..end, self.removed.clone())
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Transaction {
    edits: Vec<AppliedEdit>,
    /// Cursor to restore when this transaction is undone.
    pub cursor_before: Position,
}

impl Transaction {
    pub fn new(edits: Vec<AppliedEdit>, cursor_before: Position) -> Self {
        Self {
            edits,
            cursor_before,
        }
    }

    /// Edits that revert this transaction, ascending and non-overlapping in
    /// the current buffer coordinates.
    pub fn inverse_edits(&self) -> Vec<TextEdit> {
        self.edits.iter().map(AppliedEdit::inverse).collect()
    }

    #[cfg(test)]
    pub fn edits(&self) -> &[AppliedEdit] {
        &self.edits
    }
}

#[derive(Debug, Default)]
pub(crate) struct History {
    undo: Vec<Transaction>,
    redo: Vec<Transaction>,
}

impl History {
    /// Records a fresh user-visible transaction; invalidates redo.
    pub fn record(&mut self, tx: Transaction) {
        self.undo.push(tx);
        self.redo.clear();
    }

    pub fn take_undo(&mut self) -> Option<Transaction> {
        self.undo.pop()
    }

    pub fn take_redo(&mut self) -> Option<Transaction> {
        self.redo.pop()
    }

    pub fn push_redo(&mut self, tx: Transaction) {
        self.redo.push(tx);
    }

    /// Pushes a redone transaction back without touching the redo stack.
    pub fn push_undo(&mut self, tx: Transaction) {
        self.undo.push(tx);
    }

    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo.len()
    }
}
