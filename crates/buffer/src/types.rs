// Chunk: docs/chunks/text_buffer - Text buffer data structure with gap buffer backing

use std::cmp::Ordering;
use std::ops::Range;

/// Position in the buffer as (line, column), both 0-indexed, columns in chars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Position {
    pub line: usize,
    pub col: usize,
}

impl Position {
    pub fn new(line: usize, col: usize) -> Self {
        Self { line, col }
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> Ordering {
        self.line
            .cmp(&other.line)
            .then_with(|| self.col.cmp(&other.col))
    }
}

/// One replacement inside a transaction: the char range `range` of the
/// buffer as it was when the transaction started is replaced by `text`.
///
/// Pure insertions use an empty range; pure deletions use empty text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TextEdit {
    pub range: Range<usize>,
    pub text: String,
}

impl TextEdit {
    pub fn new(range: Range<usize>, text: impl Into<String>) -> Self {
        Self {
            range,
            text: text.into(),
        }
    }

    pub fn insert(at: usize, text: impl Into<String>) -> Self {
        Self::new(at..at, text)
    }

    pub fn delete(range: Range<usize>) -> Self {
        Self::new(range, String::new())
    }

    /// True if applying this edit cannot change the buffer.
    pub fn is_noop(&self) -> bool {
        self.range.is_empty() && self.text.is_empty()
    }

    /// Net change in buffer length caused by this edit.
    pub fn len_delta(&self) -> isize {
        self.text.chars().count() as isize - self.range.len() as isize
    }
}

/// Which lines were dirtied by a mutation, for render invalidation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirtyLines {
    /// Nothing changed.
    None,
    /// A single line changed in place.
    Single(usize),
    /// Lines `[from, to)` changed in place.
    Range { from: usize, to: usize },
    /// Everything from a line to the end of the buffer changed (line count
    /// changed, so later lines moved).
    FromLineToEnd(usize),
}

impl DirtyLines {
    pub fn is_none(&self) -> bool {
        matches!(self, DirtyLines::None)
    }

    /// First dirty line, if any.
    pub fn start_line(&self) -> Option<usize> {
        match *self {
            DirtyLines::None => None,
            DirtyLines::Single(line) | DirtyLines::FromLineToEnd(line) => Some(line),
            DirtyLines::Range { from, .. } => Some(from),
        }
    }

    /// Exclusive end of the dirty region; `None` means open-ended.
    fn end_line(&self) -> Option<usize> {
        match *self {
            DirtyLines::None | DirtyLines::FromLineToEnd(_) => None,
            DirtyLines::Single(line) => Some(line + 1),
            DirtyLines::Range { to, .. } => Some(to),
        }
    }

    /// Widens `self` to the smallest region covering both.
    pub fn merge(&mut self, other: DirtyLines) {
        let (Some(a), Some(b)) = (self.start_line(), other.start_line()) else {
            if self.is_none() {
                *self = other;
            }
            return;
        };
        let from = a.min(b);

        *self = match (self.end_line(), other.end_line()) {
            (Some(x), Some(y)) if x.max(y) == from + 1 => DirtyLines::Single(from),
            (Some(x), Some(y)) => DirtyLines::Range {
                from,
                to: x.max(y),
            },
            _ => DirtyLines::FromLineToEnd(from),
        };
    }
}
