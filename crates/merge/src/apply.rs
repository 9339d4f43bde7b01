// Chunk: docs/chunks/format_merge - Formatter output merge engine

//! Hands a merge plan to the host as one transaction.

use fmtmerge_buffer::EditError;

use crate::edit_op::{to_text_edits, EditOp};
use crate::handle::BufferHandle;

/// Applies the non-`Keep` ops of `ops` to `buffer` in a single
/// [`BufferHandle::apply_edits`] call and returns how many edits were sent.
///
/// `ops` must tile the buffer's current text. An all-`Keep` plan returns
/// `Ok(0)` without calling the host, so the modified flag stays as it was.
pub fn apply_ops<B: BufferHandle + ?Sized>(buffer: &mut B, ops: &[EditOp]) -> Result<usize, EditError> {
    let edits = to_text_edits(ops);
    if edits.is_empty() {
        return Ok(0);
    }
    buffer.apply_edits(&edits)?;
    Ok(edits.len())
}
