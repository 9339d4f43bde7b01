// Chunk: docs/chunks/format_merge - Formatter output merge engine

use fmtmerge_buffer::EditError;
use thiserror::Error;

/// Why a merge did not apply.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MergeError {
    /// The buffer changed between snapshot and merge. Nothing was applied.
    #[error("buffer changed during formatting (snapshot {snapshot_len} chars, now {current_len})")]
    StaleBuffer {
        snapshot_len: usize,
        current_len: usize,
    },

    /// The host rejected the edit transaction. Nothing was applied.
    #[error("failed to apply formatter edits: {0}")]
    ApplyFailure(#[source] EditError),
}

impl From<EditError> for MergeError {
    fn from(err: EditError) -> Self {
        MergeError::ApplyFailure(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_failure_message_includes_host_reason() {
        let err = MergeError::from(EditError::Rejected("read-only".into()));
        assert_eq!(
            err.to_string(),
            "failed to apply formatter edits: buffer rejected the edit: read-only"
        );
    }

    #[test]
    fn stale_buffer_message() {
        let err = MergeError::StaleBuffer {
            snapshot_len: 120,
            current_len: 121,
        };
        assert_eq!(
            err.to_string(),
            "buffer changed during formatting (snapshot 120 chars, now 121)"
        );
    }
}
