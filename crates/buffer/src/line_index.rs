// Chunk: docs/chunks/text_buffer - Text buffer data structure with gap buffer backing

//! Line start offsets for the text buffer.
//!
//! Keeps a sorted array of char offsets where each line begins, so that
//! `(line, col)` positions and flat offsets convert in O(log n). Range edits
//! update the array with a single splice instead of a full rebuild.

use crate::types::Position;

/// Tracks line boundaries of a text buffer.
#[derive(Debug, Clone)]
pub struct LineIndex {
    /// `line_starts[0] == 0` always; every other entry is the offset right
    /// after a `'\n'`.
    line_starts: Vec<usize>,
}

impl LineIndex {
    /// Creates an index for an empty buffer (one empty line).
    pub fn new() -> Self {
        Self {
            line_starts: vec![0],
        }
    }

    /// Rebuilds the index from scratch. O(n) in the content length.
    pub fn rebuild<I>(&mut self, content: I)
    where
        I: IntoIterator<Item = char>,
    {
        self.line_starts.clear();
        self.line_starts.push(0);

        for (offset, ch) in content.into_iter().enumerate() {
            if ch == '\n' {
                self.line_starts.push(offset + 1);
            }
        }
    }

    /// Always at least 1.
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    pub fn line_start(&self, line: usize) -> Option<usize> {
        self.line_starts.get(line).copied()
    }

    /// Offset of the end of `line`, excluding its newline.
    ///
    /// For the last line this is `total_len`.
    pub fn line_end(&self, line: usize, total_len: usize) -> Option<usize> {
        if line >= self.line_count() {
            return None;
        }

        if line + 1 < self.line_count() {
            Some(self.line_starts[line + 1] - 1)
        } else {
            Some(total_len)
        }
    }

    /// Length of `line` excluding its newline.
    pub fn line_len(&self, line: usize, total_len: usize) -> Option<usize> {
        let start = self.line_start(line)?;
        let end = self.line_end(line, total_len)?;
        Some(end - start)
    }

    /// Line containing `offset`. An offset pointing at a newline belongs to
    /// the line that newline terminates.
    pub fn line_at_offset(&self, offset: usize) -> usize {
        match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(line) => line.saturating_sub(1),
        }
    }

    /// Converts a flat offset to a `(line, col)` position.
    pub fn position_of(&self, offset: usize) -> Position {
        let line = self.line_at_offset(offset);
        Position::new(line, offset - self.line_starts[line])
    }

    /// Converts a position to a flat offset, clamping the column to the line.
    pub fn offset_of(&self, pos: Position, total_len: usize) -> usize {
        let line = pos.line.min(self.line_count() - 1);
        let start = self.line_starts[line];
        let len = self.line_len(line, total_len).unwrap_or(0);
        start + pos.col.min(len)
    }

    /// Updates the index after `start..start + removed` was replaced with
    /// `inserted`.
    ///
    /// Line starts inside the removed span disappear, starts after it shift
    /// by the length delta, and one start is added per newline in `inserted`.
    pub fn splice(&mut self, start: usize, removed: usize, inserted: &str) {
        let end = start + removed;
        let first = self.line_starts.partition_point(|&s| s <= start);
        let last = self.line_starts.partition_point(|&s| s <= end);

        let mut inserted_len = 0;
        let mut new_starts = Vec::new();
        for ch in inserted.chars() {
            inserted_len += 1;
            if ch == '\n' {
                new_starts.push(start + inserted_len);
            }
        }

        // Every start in `last..` is > end >= removed, so this cannot underflow.
        for s in &mut self.line_starts[last..] {
            *s = *s - removed + inserted_len;
        }
        self.line_starts.splice(first..last, new_starts);
    }

    /// Raw line starts, for debug validation.
    #[cfg(any(debug_assertions, test))]
    pub fn line_starts(&self) -> &[usize] {
        &self.line_starts
    }
}

impl Default for LineIndex {
    fn default() -> Self {
        Self::new()
    }
}
