// Chunk: docs/chunks/text_buffer - Text buffer data structure with gap buffer backing
// Chunk: docs/chunks/edit_transactions - Atomic multi-edit transactions

//! TextBuffer is the host-side document that formatter merges are applied to.
//!
//! It combines a gap buffer (char storage) with a line index and tracks the
//! non-text state a full-buffer replace would destroy: cursor, selection
//! anchor, undo history and the modified flag.
//!
//! Every mutation goes through [`TextBuffer::apply_edits`]: the edit list is
//! validated in full first, then applied in ascending order with offsets
//! re-based by a running delta. A rejected transaction leaves the buffer
//! untouched; an accepted one is a single undo unit.

use std::ops::Range;

use crate::error::EditError;
use crate::gap_buffer::GapBuffer;
use crate::history::{AppliedEdit, History, Transaction};
use crate::line_index::LineIndex;
use crate::types::{DirtyLines, Position, TextEdit};

/// A text buffer with cursor tracking, transactional edits and undo.
#[derive(Debug)]
pub struct TextBuffer {
    buffer: GapBuffer,
    line_index: LineIndex,
    cursor: Position,
    /// When `Some`, the selection spans from anchor to cursor (either order).
    selection_anchor: Option<Position>,
    history: History,
    modified: bool,
    /// Bumped on every committed transaction, including undo/redo.
    revision: u64,
}

impl TextBuffer {
    pub fn new() -> Self {
        Self {
            buffer: GapBuffer::new(),
            line_index: LineIndex::new(),
            cursor: Position::default(),
            selection_anchor: None,
            history: History::default(),
            modified: false,
            revision: 0,
        }
    }

    /// Creates an unmodified buffer holding `content`, cursor at the start.
    ///
    /// Not `FromStr`: loading text cannot fail.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Self {
        let mut line_index = LineIndex::new();
        line_index.rebuild(content.chars());

        Self {
            buffer: GapBuffer::from_str(content),
            line_index,
            ..Self::new()
        }
    }

    // ==================== Accessors ====================

    pub fn cursor_position(&self) -> Position {
        self.cursor
    }

    /// Cursor as a flat char offset.
    pub fn cursor_offset(&self) -> usize {
        self.offset_of(self.cursor)
    }

    /// Always at least 1.
    pub fn line_count(&self) -> usize {
        self.line_index.line_count()
    }

    /// Content of `line` without its newline; empty if out of bounds.
    pub fn line_content(&self, line: usize) -> String {
        let total_len = self.buffer.len();
        match (
            self.line_index.line_start(line),
            self.line_index.line_end(line, total_len),
        ) {
            (Some(start), Some(end)) => self.buffer.slice(start, end),
            _ => String::new(),
        }
    }

    pub fn line_len(&self, line: usize) -> usize {
        self.line_index
            .line_len(line, self.buffer.len())
            .unwrap_or(0)
    }

    /// Total char count.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn content(&self) -> String {
        self.buffer.to_string()
    }

    /// Text of the char range `range` (clamped to the buffer).
    pub fn slice(&self, range: Range<usize>) -> String {
        self.buffer.slice(range.start, range.end)
    }

    /// True once any edit has been committed since load or the last
    /// [`mark_clean`](Self::mark_clean).
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Clears the modified flag (e.g. after saving).
    pub fn mark_clean(&mut self) {
        self.modified = false;
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn can_undo(&self) -> bool {
        self.history.undo_depth() > 0
    }

    pub fn can_redo(&self) -> bool {
        self.history.redo_depth() > 0
    }

    fn offset_of(&self, pos: Position) -> usize {
        self.line_index.offset_of(pos, self.buffer.len())
    }

    // ==================== Cursor & Selection ====================

    /// Moves the cursor (clamped) and clears the selection.
    pub fn set_cursor(&mut self, pos: Position) {
        self.clear_selection();
        self.cursor = self.clamp(pos);
    }

    /// Sets the selection anchor (clamped). The selection runs to the cursor.
    pub fn set_selection_anchor(&mut self, pos: Position) {
        self.selection_anchor = Some(self.clamp(pos));
    }

    pub fn clear_selection(&mut self) {
        self.selection_anchor = None;
    }

    pub fn selection_anchor(&self) -> Option<Position> {
        self.selection_anchor
    }

    pub fn has_selection(&self) -> bool {
        self.selection_anchor.is_some_and(|a| a != self.cursor)
    }

    /// Selection as `(start, end)` in document order.
    pub fn selection_range(&self) -> Option<(Position, Position)> {
        let anchor = self.selection_anchor?;
        if anchor == self.cursor {
            return None;
        }
        Some((anchor.min(self.cursor), anchor.max(self.cursor)))
    }

    pub fn selected_text(&self) -> Option<String> {
        let (start, end) = self.selection_range()?;
        Some(self.slice(self.offset_of(start)..self.offset_of(end)))
    }

    fn clamp(&self, pos: Position) -> Position {
        self.line_index.position_of(self.offset_of(pos))
    }

    // ==================== Transactions ====================

    /// Applies `edits` as one atomic, undoable transaction.
    ///
    /// Ranges refer to the buffer as it is *before* the call and must be
    /// in bounds, ascending and non-overlapping (touching is fine). If any
    /// edit is invalid nothing is applied. A transaction made only of no-op
    /// edits leaves the buffer, its history and its modified flag alone.
    ///
    /// The cursor and selection anchor are carried through the edits: text
    /// before them shifts them, text after them does not move them.
    pub fn apply_edits(&mut self, edits: &[TextEdit]) -> Result<DirtyLines, EditError> {
        self.validate(edits)?;
        if edits.iter().all(TextEdit::is_noop) {
            return Ok(DirtyLines::None);
        }

        let cursor_before = self.cursor;
        let (applied, dirty) = self.commit(edits);
        self.history.record(Transaction::new(applied, cursor_before));
        Ok(dirty)
    }

    fn validate(&self, edits: &[TextEdit]) -> Result<(), EditError> {
        let len = self.len();
        let mut previous_end = 0;

        for (index, edit) in edits.iter().enumerate() {
            let Range { start, end } = edit.range;
            if start > end || end > len {
                return Err(EditError::OutOfBounds {
                    index,
                    range: edit.range.clone(),
                    len,
                });
            }
            if start < previous_end {
                return Err(EditError::Unordered {
                    index,
                    start,
                    previous_end,
                });
            }
            previous_end = end;
        }
        Ok(())
    }

    /// Applies pre-validated edits. Does not touch the history.
    fn commit(&mut self, edits: &[TextEdit]) -> (Vec<AppliedEdit>, DirtyLines) {
        let cursor = self.offset_of(self.cursor);
        let anchor = self.selection_anchor.map(|a| self.offset_of(a));

        let mut applied = Vec::with_capacity(edits.len());
        let mut dirty = DirtyLines::None;
        let mut added = 0;
        let mut removed = 0;

        for edit in edits.iter().filter(|e| !e.is_noop()) {
            // Everything removed so far lies before this edit, so this
            // cannot underflow.
            let start = edit.range.start + added - removed;
            let removed_len = edit.range.len();

            let removed_text =
                self.buffer
                    .replace_range(start, start + removed_len, &edit.text);
            self.line_index.splice(start, removed_len, &edit.text);

            let line = self.line_index.line_at_offset(start);
            dirty.merge(if removed_text.contains('\n') || edit.text.contains('\n') {
                DirtyLines::FromLineToEnd(line)
            } else {
                DirtyLines::Single(line)
            });

            added += edit.text.chars().count();
            removed += removed_len;
            applied.push(AppliedEdit {
                start,
                removed: removed_text,
                inserted: edit.text.clone(),
            });
        }

        self.cursor = self.line_index.position_of(remap_offset(cursor, edits));
        self.selection_anchor = anchor.map(|a| self.line_index.position_of(remap_offset(a, edits)));
        self.modified = true;
        self.revision += 1;

        self.assert_line_index_consistent();
        (applied, dirty)
    }

    /// Undoes the most recent transaction as a single step.
    pub fn undo(&mut self) -> Option<DirtyLines> {
        let tx = self.history.take_undo()?;
        let cursor = self.cursor;
        let (applied, dirty) = self.commit(&tx.inverse_edits());
        self.history.push_redo(Transaction::new(applied, cursor));
        self.selection_anchor = None;
        self.cursor = self.clamp(tx.cursor_before);
        Some(dirty)
    }

    /// Re-applies the most recently undone transaction.
    pub fn redo(&mut self) -> Option<DirtyLines> {
        let tx = self.history.take_redo()?;
        let cursor = self.cursor;
        let (applied, dirty) = self.commit(&tx.inverse_edits());
        self.history.push_undo(Transaction::new(applied, cursor));
        self.selection_anchor = None;
        self.cursor = self.clamp(tx.cursor_before);
        Some(dirty)
    }

    // ==================== Typing ====================

    /// Inserts `s` at the cursor, replacing the selection if there is one.
    /// The cursor ends up after the inserted text.
    pub fn insert_str(&mut self, s: &str) -> DirtyLines {
        let range = match self.selection_range() {
            Some((start, end)) => self.offset_of(start)..self.offset_of(end),
            None => {
                let at = self.cursor_offset();
                at..at
            }
        };
        let start = range.start;
        let dirty = self.apply_unchecked(TextEdit::new(range, s));
        self.selection_anchor = None;
        self.cursor = self
            .line_index
            .position_of(start + s.chars().count());
        dirty
    }

    pub fn insert_char(&mut self, ch: char) -> DirtyLines {
        let mut utf8 = [0u8; 4];
        self.insert_str(ch.encode_utf8(&mut utf8))
    }

    /// Deletes the selection, or the char before the cursor (Backspace).
    pub fn delete_backward(&mut self) -> DirtyLines {
        if let Some((start, end)) = self.selection_range() {
            let range = self.offset_of(start)..self.offset_of(end);
            let dirty = self.apply_unchecked(TextEdit::delete(range));
            self.selection_anchor = None;
            return dirty;
        }

        let at = self.cursor_offset();
        if at == 0 {
            return DirtyLines::None;
        }
        self.apply_unchecked(TextEdit::delete(at - 1..at))
    }

    /// Deletes `range` (clamped to the buffer) as its own transaction.
    pub fn delete_range(&mut self, range: Range<usize>) -> DirtyLines {
        let end = range.end.min(self.len());
        let start = range.start.min(end);
        self.apply_unchecked(TextEdit::delete(start..end))
    }

    /// Single-edit transaction for callers that built an in-bounds range.
    fn apply_unchecked(&mut self, edit: TextEdit) -> DirtyLines {
        let result = self.apply_edits(std::slice::from_ref(&edit));
        debug_assert!(result.is_ok(), "internally built edit rejected: {result:?}");
        result.unwrap_or(DirtyLines::None)
    }

    // ==================== Validation ====================

    /// Debug assertion: the incrementally spliced line index must match a
    /// fresh rebuild. Compiled out in release builds.
    #[cfg(debug_assertions)]
    fn assert_line_index_consistent(&self) {
        let mut expected = LineIndex::new();
        expected.rebuild(self.buffer.chars());
        assert_eq!(
            self.line_index.line_starts(),
            expected.line_starts(),
            "line_index drift at revision {} (buffer len {})",
            self.revision,
            self.buffer.len(),
        );
    }

    #[cfg(not(debug_assertions))]
    fn assert_line_index_consistent(&self) {}
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Maps an offset in the pre-transaction buffer to the post-transaction one.
///
/// Offsets at or before an edit's start stay put; offsets at or after its end
/// shift by its length delta; offsets strictly inside a replaced span clamp
/// into the replacement.
fn remap_offset(offset: usize, edits: &[TextEdit]) -> usize {
    let mut added = 0;
    let mut removed = 0;

    for edit in edits {
        let Range { start, end } = edit.range;
        if offset <= start {
            break;
        }
        let inserted = edit.text.chars().count();
        if offset < end {
            return start + added - removed + (offset - start).min(inserted);
        }
        added += inserted;
        removed += end - start;
    }
    offset + added - removed
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Transactions ====================

    #[test]
    fn test_apply_single_replace() {
        let mut buf = TextBuffer::from_str("int x=1;");
        let dirty = buf.apply_edits(&[TextEdit::new(5..6, " = ")]).unwrap();
        assert_eq!(buf.content(), "int x = 1;");
        assert_eq!(dirty, DirtyLines::Single(0));
        assert!(buf.is_modified());
    }

    #[test]
    fn test_apply_rebases_later_edits() {
        let mut buf = TextBuffer::from_str("a=1;b=2;");
        buf.apply_edits(&[
            TextEdit::new(1..2, " = "),
            TextEdit::new(5..6, " = "),
        ])
        .unwrap();
        assert_eq!(buf.content(), "a = 1;b = 2;");
    }

    #[test]
    fn test_apply_touching_edits() {
        let mut buf = TextBuffer::from_str("abc");
        buf.apply_edits(&[
            TextEdit::delete(0..1),
            TextEdit::insert(1, "X"),
            TextEdit::new(1..3, "YZ"),
        ])
        .unwrap();
        assert_eq!(buf.content(), "XYZ");
    }

    #[test]
    fn test_out_of_bounds_rejects_whole_transaction() {
        let mut buf = TextBuffer::from_str("hello");
        let err = buf
            .apply_edits(&[TextEdit::insert(0, ">> "), TextEdit::delete(3..9)])
            .unwrap_err();
        assert_eq!(
            err,
            EditError::OutOfBounds {
                index: 1,
                range: 3..9,
                len: 5
            }
        );
        assert_eq!(buf.content(), "hello");
        assert!(!buf.is_modified());
        assert!(!buf.can_undo());
    }

    #[test]
    fn test_overlapping_edits_rejected() {
        let mut buf = TextBuffer::from_str("hello world");
        let err = buf
            .apply_edits(&[TextEdit::delete(0..5), TextEdit::delete(3..7)])
            .unwrap_err();
        assert!(matches!(err, EditError::Unordered { index: 1, .. }));
        assert_eq!(buf.content(), "hello world");
        assert_eq!(buf.revision(), 0);
    }

    #[test]
    fn test_noop_transaction_keeps_buffer_clean() {
        let mut buf = TextBuffer::from_str("x");
        let dirty = buf.apply_edits(&[TextEdit::insert(1, "")]).unwrap();
        assert!(dirty.is_none());
        assert!(!buf.is_modified());
        assert_eq!(buf.revision(), 0);

        let dirty = buf.apply_edits(&[]).unwrap();
        assert!(dirty.is_none());
        assert!(!buf.can_undo());
    }

    #[test]
    fn test_multiline_edit_dirties_to_end() {
        let mut buf = TextBuffer::from_str("a\nb\nc");
        let dirty = buf.apply_edits(&[TextEdit::insert(2, "x\n")]).unwrap();
        assert_eq!(dirty, DirtyLines::FromLineToEnd(1));
        assert_eq!(buf.line_count(), 4);
        assert_eq!(buf.line_content(1), "x");
    }

    // ==================== Cursor & selection tracking ====================

    #[test]
    fn test_cursor_after_edit_shifts() {
        let mut buf = TextBuffer::from_str("int x=1;\nreturn x;");
        buf.set_cursor(Position::new(1, 3));
        buf.apply_edits(&[TextEdit::new(5..6, " = ")]).unwrap();
        assert_eq!(buf.cursor_position(), Position::new(1, 3));

        buf.set_cursor(Position::new(0, 9));
        buf.apply_edits(&[TextEdit::insert(0, "  ")]).unwrap();
        assert_eq!(buf.cursor_position(), Position::new(0, 11));
    }

    #[test]
    fn test_cursor_before_edit_stays() {
        let mut buf = TextBuffer::from_str("abc def");
        buf.set_cursor(Position::new(0, 2));
        buf.apply_edits(&[TextEdit::new(4..7, "DEF!")]).unwrap();
        assert_eq!(buf.cursor_position(), Position::new(0, 2));
    }

    #[test]
    fn test_cursor_inside_replaced_span_clamps() {
        let mut buf = TextBuffer::from_str("0123456789");
        buf.set_cursor(Position::new(0, 8));
        buf.apply_edits(&[TextEdit::new(2..9, "ab")]).unwrap();
        assert_eq!(buf.content(), "01ab9");
        assert_eq!(buf.cursor_position(), Position::new(0, 4));
    }

    #[test]
    fn test_selection_anchor_is_remapped() {
        let mut buf = TextBuffer::from_str("foo(a,b)");
        buf.set_cursor(Position::new(0, 8));
        buf.set_selection_anchor(Position::new(0, 4));
        buf.apply_edits(&[TextEdit::insert(6, " ")]).unwrap();
        assert_eq!(buf.selected_text().as_deref(), Some("a, b)"));
    }

    // ==================== Undo / redo ====================

    #[test]
    fn test_transaction_undoes_in_one_step() {
        let mut buf = TextBuffer::from_str("a=1;\nb=2;\n");
        buf.apply_edits(&[
            TextEdit::new(1..2, " = "),
            TextEdit::new(6..7, " = "),
        ])
        .unwrap();
        assert_eq!(buf.content(), "a = 1;\nb = 2;\n");

        buf.undo().unwrap();
        assert_eq!(buf.content(), "a=1;\nb=2;\n");
        assert!(!buf.can_undo());

        buf.redo().unwrap();
        assert_eq!(buf.content(), "a = 1;\nb = 2;\n");
        assert!(buf.undo().is_some());
        assert_eq!(buf.content(), "a=1;\nb=2;\n");
    }

    #[test]
    fn test_undo_restores_cursor() {
        let mut buf = TextBuffer::from_str("hello");
        buf.set_cursor(Position::new(0, 5));
        buf.insert_str(" world");
        assert_eq!(buf.cursor_position(), Position::new(0, 11));

        buf.undo();
        assert_eq!(buf.content(), "hello");
        assert_eq!(buf.cursor_position(), Position::new(0, 5));
    }

    #[test]
    fn test_new_edit_clears_redo() {
        let mut buf = TextBuffer::from_str("x");
        buf.insert_str("y");
        buf.undo();
        assert!(buf.can_redo());
        buf.insert_str("z");
        assert!(!buf.can_redo());
    }

    #[test]
    fn test_undo_with_empty_history() {
        let mut buf = TextBuffer::from_str("x");
        assert!(buf.undo().is_none());
        assert!(buf.redo().is_none());
    }

    // ==================== Typing ====================

    #[test]
    fn test_insert_replaces_selection() {
        let mut buf = TextBuffer::from_str("hello world");
        buf.set_cursor(Position::new(0, 11));
        buf.set_selection_anchor(Position::new(0, 6));
        buf.insert_str("there");
        assert_eq!(buf.content(), "hello there");
        assert!(!buf.has_selection());
        assert_eq!(buf.cursor_position(), Position::new(0, 11));
    }

    #[test]
    fn test_delete_backward_joins_lines() {
        let mut buf = TextBuffer::from_str("ab\ncd");
        buf.set_cursor(Position::new(1, 0));
        buf.delete_backward();
        assert_eq!(buf.content(), "abcd");
        assert_eq!(buf.cursor_position(), Position::new(0, 2));
    }

    #[test]
    fn test_delete_backward_at_start_is_noop() {
        let mut buf = TextBuffer::from_str("ab");
        assert!(buf.delete_backward().is_none());
        assert!(!buf.is_modified());
    }

    #[test]
    fn test_delete_range_clamps() {
        let mut buf = TextBuffer::from_str("abcdef");
        buf.delete_range(4..100);
        assert_eq!(buf.content(), "abcd");
    }

    #[test]
    fn test_typing_helpers_build_valid_edits() {
        // A rejected internal edit trips the debug assertion in
        // `apply_unchecked`; these are the edge cases for each helper.
        let mut buf = TextBuffer::from_str("ab\ncd");
        buf.set_cursor(Position::new(0, 1));
        buf.set_selection_anchor(Position::new(9, 9));
        buf.insert_str("X");
        assert_eq!(buf.content(), "aX");

        buf.delete_range(7..3);
        assert_eq!(buf.content(), "aX");
        buf.delete_range(1..100);
        assert_eq!(buf.content(), "a");

        buf.set_cursor(Position::new(0, 1));
        buf.set_selection_anchor(Position::new(0, 0));
        buf.delete_backward();
        assert!(buf.is_empty());
        assert!(buf.delete_backward().is_none());
    }

    #[test]
    fn test_mark_clean() {
        let mut buf = TextBuffer::new();
        buf.insert_char('é');
        assert!(buf.is_modified());
        assert_eq!(buf.len(), 1);
        buf.mark_clean();
        assert!(!buf.is_modified());
    }

    // ==================== remap_offset ====================

    #[test]
    fn test_remap_offset() {
        let edits = [TextEdit::new(2..4, "xyz"), TextEdit::insert(6, "!!")];
        assert_eq!(remap_offset(0, &edits), 0);
        assert_eq!(remap_offset(2, &edits), 2);
        assert_eq!(remap_offset(3, &edits), 3);
        assert_eq!(remap_offset(4, &edits), 5);
        assert_eq!(remap_offset(6, &edits), 7);
        assert_eq!(remap_offset(7, &edits), 10);
    }
}
