// Chunk: docs/chunks/format_merge - Formatter output merge engine

//! Detects edits that landed between snapshot and merge.
//!
//! The default [`RaceCheck::Length`] only compares char counts, so an edit
//! that keeps the length (one char overtyped by another) slips through and
//! is overwritten by the merge. [`RaceCheck::ContentHash`] closes that gap
//! at the cost of hashing the live buffer.

use serde::{Deserialize, Serialize};

use crate::error::MergeError;
use crate::handle::BufferHandle;
use crate::snapshot::TextSnapshot;

/// How the live buffer is compared against the snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RaceCheck {
    /// Lengths must match exactly.
    #[default]
    Length,
    /// Lengths must match, then the SHA-256 of the live content must equal
    /// the snapshot digest.
    ContentHash,
}

pub fn check_lengths(snapshot_len: usize, current_len: usize) -> Result<(), MergeError> {
    if snapshot_len == current_len {
        Ok(())
    } else {
        Err(MergeError::StaleBuffer {
            snapshot_len,
            current_len,
        })
    }
}

/// Returns `StaleBuffer` if `buffer` no longer matches `snapshot` under
/// `policy`.
pub fn detect_race<B: BufferHandle + ?Sized>(
    snapshot: &TextSnapshot,
    buffer: &B,
    policy: RaceCheck,
) -> Result<(), MergeError> {
    let current_len = buffer.len();
    check_lengths(snapshot.len(), current_len)?;

    if policy == RaceCheck::ContentHash && !snapshot.matches_digest(&buffer.content()) {
        tracing::trace!("length matches but content digest differs");
        return Err(MergeError::StaleBuffer {
            snapshot_len: snapshot.len(),
            current_len,
        });
    }
    Ok(())
}
