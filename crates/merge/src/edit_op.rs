// Chunk: docs/chunks/format_merge - Formatter output merge engine

//! Edit operations produced by the diff engine.
//!
//! A merge plan is an ordered `Vec<EditOp>` whose source ranges tile the
//! snapshot exactly: contiguous, non-overlapping, covering `0..len` once,
//! left to right. `Insert` consumes the empty range at its position.

use std::ops::Range;

use fmtmerge_buffer::TextEdit;
use thiserror::Error;

/// One contiguous transformation of the snapshot. Ranges are char offsets.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EditOp {
    /// Snapshot text that survives unchanged.
    Keep(Range<usize>),
    /// Snapshot text replaced by `text`.
    Replace { range: Range<usize>, text: String },
    /// `text` inserted at `at`; consumes no snapshot text.
    Insert { at: usize, text: String },
    /// Snapshot text removed.
    Delete(Range<usize>),
}

impl EditOp {
    /// The snapshot range this op consumes.
    pub fn source_range(&self) -> Range<usize> {
        match self {
            EditOp::Keep(range) | EditOp::Delete(range) => range.clone(),
            EditOp::Replace { range, .. } => range.clone(),
            EditOp::Insert { at, .. } => *at..*at,
        }
    }

    pub fn is_keep(&self) -> bool {
        matches!(self, EditOp::Keep(_))
    }

    /// Text this op contributes to the result, if it is not a `Keep`.
    pub fn new_text(&self) -> Option<&str> {
        match self {
            EditOp::Replace { text, .. } | EditOp::Insert { text, .. } => Some(text),
            EditOp::Delete(_) => Some(""),
            EditOp::Keep(_) => None,
        }
    }

    /// Buffer edit for a non-`Keep` op.
    pub fn to_text_edit(&self) -> Option<TextEdit> {
        let text = self.new_text()?;
        Some(TextEdit::new(self.source_range(), text))
    }
}

/// A broken tiling. Always a bug in whatever produced the ops.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TilingError {
    #[error("op {index} starts at {found}, expected {expected}")]
    Gap {
        index: usize,
        expected: usize,
        found: usize,
    },
    #[error("op {index} has a reversed range {}..{}", range.start, range.end)]
    Reversed { index: usize, range: Range<usize> },
    #[error("ops cover 0..{covered}, snapshot length is {len}")]
    Incomplete { covered: usize, len: usize },
}

/// Checks that `ops` tile `0..len` exactly once, left to right.
pub fn validate_tiling(ops: &[EditOp], len: usize) -> Result<(), TilingError> {
    let mut cursor = 0;
    for (index, op) in ops.iter().enumerate() {
        let range = op.source_range();
        if range.start > range.end {
            return Err(TilingError::Reversed { index, range });
        }
        if range.start != cursor {
            return Err(TilingError::Gap {
                index,
                expected: cursor,
                found: range.start,
            });
        }
        cursor = range.end;
    }
    if cursor != len {
        return Err(TilingError::Incomplete {
            covered: cursor,
            len,
        });
    }
    Ok(())
}

/// Applies `ops` to `original` and returns the resulting text.
///
/// `ops` must tile `original`; ranges outside it are clamped.
pub fn apply_to_text(original: &str, ops: &[EditOp]) -> String {
    let chars: Vec<char> = original.chars().collect();
    let clamp = |r: Range<usize>| r.start.min(chars.len())..r.end.min(chars.len());

    let mut out = String::with_capacity(original.len());
    for op in ops {
        match op {
            EditOp::Keep(range) => out.extend(&chars[clamp(range.clone())]),
            EditOp::Replace { text, .. } | EditOp::Insert { text, .. } => out.push_str(text),
            EditOp::Delete(_) => {}
        }
    }
    out
}

/// Buffer edits for every non-`Keep` op, in source order.
pub fn to_text_edits(ops: &[EditOp]) -> Vec<TextEdit> {
    ops.iter().filter_map(EditOp::to_text_edit).collect()
}
