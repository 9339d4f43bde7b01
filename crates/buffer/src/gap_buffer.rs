// Chunk: docs/chunks/text_buffer - Text buffer data structure with gap buffer backing

//! Gap buffer storage for the host text buffer.
//!
//! Characters live in a single `Vec<char>` with a movable gap. A transaction
//! moves the gap to each edit's start in ascending order, so consecutive
//! formatter edits only pay for the distance between them rather than for
//! the whole document.

use std::fmt::{self, Write as _};

const INITIAL_GAP: usize = 64;

/// Character storage with a movable gap.
///
/// Layout is `[front | gap | back]`. Positions taken and returned by the
/// public methods are logical; the gap is invisible to callers.
#[derive(Debug)]
pub struct GapBuffer {
    slots: Vec<char>,
    /// Index of the first gap slot (== length of the front part).
    gap_start: usize,
    /// Index of the first back slot.
    gap_end: usize,
}

impl GapBuffer {
    pub fn new() -> Self {
        Self::with_content(Vec::new())
    }

    /// Buffer holding `text`, gap at the end.
    pub fn from_str(text: &str) -> Self {
        Self::with_content(text.chars().collect())
    }

    fn with_content(mut slots: Vec<char>) -> Self {
        let gap_start = slots.len();
        slots.resize(gap_start + INITIAL_GAP, '\0');
        Self {
            gap_end: slots.len(),
            slots,
            gap_start,
        }
    }

    fn front(&self) -> &[char] {
        &self.slots[..self.gap_start]
    }

    fn back(&self) -> &[char] {
        &self.slots[self.gap_end..]
    }

    /// Length in chars.
    pub fn len(&self) -> usize {
        self.front().len() + self.back().len()
    }

    pub fn is_empty(&self) -> bool {
        self.gap_start == 0 && self.gap_end == self.slots.len()
    }

    #[cfg(test)]
    pub fn gap_position(&self) -> usize {
        self.gap_start
    }

    /// Moves the gap so that it starts at `pos` (clamped to the length).
    /// Costs the distance moved.
    pub fn move_gap_to(&mut self, pos: usize) {
        let pos = pos.min(self.len());
        match pos.cmp(&self.gap_start) {
            std::cmp::Ordering::Less => {
                let moved = self.gap_start - pos;
                let dest = self.gap_end - moved;
                self.slots.copy_within(pos..self.gap_start, dest);
                self.gap_start = pos;
                self.gap_end = dest;
            }
            std::cmp::Ordering::Greater => {
                let moved = pos - self.gap_start;
                let src = self.gap_end..self.gap_end + moved;
                self.slots.copy_within(src, self.gap_start);
                self.gap_start = pos;
                self.gap_end += moved;
            }
            std::cmp::Ordering::Equal => {}
        }
    }

    /// Makes room for at least `needed` chars at the gap, at least doubling
    /// the storage when it has to grow.
    fn reserve_gap(&mut self, needed: usize) {
        let gap = self.gap_end - self.gap_start;
        if gap >= needed {
            return;
        }

        let back_len = self.slots.len() - self.gap_end;
        let old_size = self.slots.len();
        let new_size = old_size + (needed - gap).max(old_size);
        self.slots.resize(new_size, '\0');
        self.slots
            .copy_within(self.gap_end..old_size, new_size - back_len);
        self.gap_end = new_size - back_len;
    }

    /// Writes `text` into the gap, leaving the gap after it. Returns the
    /// number of chars written.
    pub fn insert_str(&mut self, text: &str) -> usize {
        let count = text.chars().count();
        self.reserve_gap(count);
        for (slot, ch) in self.slots[self.gap_start..].iter_mut().zip(text.chars()) {
            *slot = ch;
        }
        self.gap_start += count;
        count
    }

    /// Swallows up to `count` chars after the gap into it and returns them.
    pub fn remove_forward(&mut self, count: usize) -> String {
        let taken: String = self.back().iter().take(count).collect();
        self.gap_end += taken.chars().count();
        taken
    }

    /// Replaces `start..end` with `text` and returns the replaced text.
    ///
    /// Callers validate the range; an `end` past the buffer is clamped.
    pub fn replace_range(&mut self, start: usize, end: usize, text: &str) -> String {
        self.move_gap_to(start);
        let removed = self.remove_forward(end.saturating_sub(start));
        self.insert_str(text);
        removed
    }

    pub fn chars(&self) -> impl Iterator<Item = char> + '_ {
        self.front().iter().chain(self.back()).copied()
    }

    /// Text of `start..end`, clamped to the buffer.
    pub fn slice(&self, start: usize, end: usize) -> String {
        let end = end.min(self.len());
        self.chars()
            .skip(start)
            .take(end.saturating_sub(start))
            .collect()
    }
}

impl Default for GapBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for GapBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.chars().try_for_each(|ch| f.write_char(ch))
    }
}
