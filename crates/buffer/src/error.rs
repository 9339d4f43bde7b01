// Chunk: docs/chunks/edit_transactions - Atomic multi-edit transactions

//! Errors for rejected edit transactions.
//!
//! A transaction is validated in full before the first character moves, so
//! every variant here implies the buffer is exactly as it was before the call.

use std::ops::Range;

use thiserror::Error;

/// Why a transaction was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    /// An edit addresses chars past the end of the buffer, or its range is
    /// reversed.
    #[error("edit {index} addresses {}..{} but the buffer holds {len} chars", range.start, range.end)]
    OutOfBounds {
        /// Position of the offending edit in the transaction.
        index: usize,
        range: Range<usize>,
        len: usize,
    },

    /// An edit starts before the previous edit ends.
    #[error("edit {index} starts at {start}, before the previous edit ends at {previous_end}")]
    Unordered {
        index: usize,
        start: usize,
        previous_end: usize,
    },

    /// The host refused the transaction for its own reasons (read-only view,
    /// lock poisoned, ...).
    #[error("buffer rejected the edit: {0}")]
    Rejected(String),
}
