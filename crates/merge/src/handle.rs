// Chunk: docs/chunks/format_merge - Formatter output merge engine

//! The narrow host capability the merge core depends on.

use fmtmerge_buffer::{EditError, TextBuffer, TextEdit};

/// A mutable text buffer owned by the host editor.
///
/// Lengths and edit ranges are in chars. `apply_edits` must be atomic: the
/// edits arrive ascending and non-overlapping, in pre-edit coordinates, and
/// either all of them land (ideally as one undo unit) or none do.
pub trait BufferHandle {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn content(&self) -> String;

    fn apply_edits(&mut self, edits: &[TextEdit]) -> Result<(), EditError>;
}

impl BufferHandle for TextBuffer {
    fn len(&self) -> usize {
        TextBuffer::len(self)
    }

    fn is_empty(&self) -> bool {
        TextBuffer::is_empty(self)
    }

    fn content(&self) -> String {
        TextBuffer::content(self)
    }

    fn apply_edits(&mut self, edits: &[TextEdit]) -> Result<(), EditError> {
        TextBuffer::apply_edits(self, edits).map(|_| ())
    }
}
