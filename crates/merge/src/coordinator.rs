// Chunk: docs/chunks/format_merge - Formatter output merge engine

//! Drives one merge: diff, race check, apply.
//!
//! ```text
//! Idle -> Diffing -> RaceCheck -> Applying -> Done
//!                        |            |
//!                        +-> Aborted <+
//! ```
//!
//! The diff runs before the race check so the intended change is known (and
//! logged) even when the merge is aborted. The race check always runs, even
//! for an all-`Keep` plan, so a stale buffer is reported as stale rather
//! than as a no-op. Nothing is ever retried.

use std::fmt;
use std::sync::Mutex;

use fmtmerge_buffer::EditError;

use crate::apply::apply_ops;
use crate::config::MergeConfig;
use crate::diff::{diff, DiffOptions, DiffStats};
use crate::edit_op::{validate_tiling, EditOp};
use crate::error::MergeError;
use crate::handle::BufferHandle;
use crate::race::{check_lengths, detect_race};
use crate::snapshot::TextSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeState {
    Idle,
    Diffing,
    RaceCheck,
    Applying,
    Done,
    Aborted,
}

impl fmt::Display for MergeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MergeState::Idle => "idle",
            MergeState::Diffing => "diffing",
            MergeState::RaceCheck => "race-check",
            MergeState::Applying => "applying",
            MergeState::Done => "done",
            MergeState::Aborted => "aborted",
        };
        f.write_str(name)
    }
}

/// What a merge did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Whether any edit reached the buffer.
    pub applied: bool,
    /// Why nothing was applied, if the merge was aborted.
    pub reason: Option<MergeError>,
    /// The computed plan, also on abort.
    pub edits: Vec<EditOp>,
    /// `Done` or `Aborted`.
    pub state: MergeState,
}

impl MergeOutcome {
    fn done(edits: Vec<EditOp>, applied: bool) -> Self {
        Self {
            applied,
            reason: None,
            edits,
            state: MergeState::Done,
        }
    }

    fn aborted(edits: Vec<EditOp>, reason: MergeError) -> Self {
        Self {
            applied: false,
            reason: Some(reason),
            edits,
            state: MergeState::Aborted,
        }
    }

    /// The buffer changed while the formatter ran.
    pub fn is_stale(&self) -> bool {
        matches!(self.reason, Some(MergeError::StaleBuffer { .. }))
    }

    /// The formatter output matched the snapshot; nothing needed applying.
    pub fn is_noop(&self) -> bool {
        self.state == MergeState::Done && !self.applied
    }

    pub fn stats(&self) -> DiffStats {
        DiffStats::of(&self.edits)
    }
}

/// A configured merge coordinator.
#[derive(Debug, Clone, Default)]
pub struct Merger {
    config: MergeConfig,
}

impl Merger {
    pub fn new(config: MergeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MergeConfig {
        &self.config
    }

    /// Diffs `snapshot` against `reformatted` without touching any buffer.
    pub fn plan(&self, snapshot: &TextSnapshot, reformatted: &str) -> Vec<EditOp> {
        plan(snapshot.content(), reformatted, &self.config.diff)
    }

    /// Merges `reformatted` into `buffer`, which `snapshot` was taken from.
    pub fn merge<B: BufferHandle + ?Sized>(
        &self,
        snapshot: &TextSnapshot,
        reformatted: &str,
        buffer: &mut B,
    ) -> MergeOutcome {
        let ops = self.plan(snapshot, reformatted);
        self.race_check_and_apply(snapshot, ops, buffer)
    }

    /// Like [`Merger::merge`] for a buffer shared behind a mutex.
    ///
    /// The diff runs before the lock is taken; the race check and the apply
    /// run under one lock so no other writer can slip in between them.
    pub fn merge_shared<B: BufferHandle>(
        &self,
        snapshot: &TextSnapshot,
        reformatted: &str,
        buffer: &Mutex<B>,
    ) -> MergeOutcome {
        let ops = self.plan(snapshot, reformatted);
        let mut guard = match buffer.lock() {
            Ok(guard) => guard,
            Err(_) => {
                tracing::warn!("buffer lock poisoned, merge aborted");
                let err = EditError::Rejected("buffer lock poisoned".to_string());
                return MergeOutcome::aborted(ops, MergeError::ApplyFailure(err));
            }
        };
        self.race_check_and_apply(snapshot, ops, &mut *guard)
    }

    fn race_check_and_apply<B: BufferHandle + ?Sized>(
        &self,
        snapshot: &TextSnapshot,
        ops: Vec<EditOp>,
        buffer: &mut B,
    ) -> MergeOutcome {
        transition(MergeState::Diffing, MergeState::RaceCheck);
        if let Err(err) = detect_race(snapshot, buffer, self.config.race_check) {
            return abort(MergeState::RaceCheck, ops, err);
        }
        apply(ops, buffer)
    }
}

/// Merges with the length race check and default diff options.
///
/// `original_len` is the buffer length recorded with `original_text` before
/// the formatter ran; `current_len` is the buffer length now.
pub fn merge<B: BufferHandle + ?Sized>(
    original_len: usize,
    current_len: usize,
    original_text: &str,
    reformatted: &str,
    buffer: &mut B,
) -> MergeOutcome {
    let ops = plan(original_text, reformatted, &DiffOptions::default());

    transition(MergeState::Diffing, MergeState::RaceCheck);
    if let Err(err) = check_lengths(original_len, current_len) {
        return abort(MergeState::RaceCheck, ops, err);
    }
    apply(ops, buffer)
}

fn plan(original: &str, reformatted: &str, options: &DiffOptions) -> Vec<EditOp> {
    transition(MergeState::Idle, MergeState::Diffing);
    let ops = diff(original, reformatted, options);
    debug_assert_eq!(validate_tiling(&ops, original.chars().count()), Ok(()));
    tracing::trace!(ops = ops.len(), "diff computed");
    ops
}

fn apply<B: BufferHandle + ?Sized>(ops: Vec<EditOp>, buffer: &mut B) -> MergeOutcome {
    if ops.iter().all(EditOp::is_keep) {
        transition(MergeState::RaceCheck, MergeState::Done);
        tracing::debug!("formatter output matches buffer, nothing to apply");
        return MergeOutcome::done(ops, false);
    }

    transition(MergeState::RaceCheck, MergeState::Applying);
    match apply_ops(buffer, &ops) {
        Ok(sent) => {
            transition(MergeState::Applying, MergeState::Done);
            let stats = DiffStats::of(&ops);
            tracing::info!(
                edits = sent,
                inserted = stats.chars_inserted,
                removed = stats.chars_removed,
                "formatter edits applied"
            );
            MergeOutcome::done(ops, true)
        }
        Err(err) => abort(MergeState::Applying, ops, MergeError::ApplyFailure(err)),
    }
}

fn abort(from: MergeState, ops: Vec<EditOp>, err: MergeError) -> MergeOutcome {
    transition(from, MergeState::Aborted);
    tracing::warn!(error = %err, "merge aborted, buffer left untouched");
    MergeOutcome::aborted(ops, err)
}

fn transition(from: MergeState, to: MergeState) {
    tracing::debug!(%from, %to, "merge state");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::race::RaceCheck;
    use fmtmerge_buffer::{TextBuffer, TextEdit};

    #[test]
    fn applies_formatter_output() {
        let mut buffer = TextBuffer::from_str("int x=1;");
        let snapshot = TextSnapshot::capture(&buffer);
        let outcome = Merger::default().merge(&snapshot, "int x = 1;", &mut buffer);

        assert!(outcome.applied);
        assert_eq!(outcome.reason, None);
        assert_eq!(outcome.state, MergeState::Done);
        assert_eq!(buffer.content(), "int x = 1;");
        assert!(buffer.is_modified());
    }

    #[test]
    fn identical_output_is_noop() {
        let mut buffer = TextBuffer::from_str("ok\n");
        let snapshot = TextSnapshot::capture(&buffer);
        let outcome = Merger::default().merge(&snapshot, "ok\n", &mut buffer);

        assert!(outcome.is_noop());
        assert_eq!(outcome.edits, vec![EditOp::Keep(0..3)]);
        assert!(!buffer.is_modified());
    }

    #[test]
    fn typing_during_format_aborts() {
        let mut buffer = TextBuffer::from_str("int x=1;");
        let snapshot = TextSnapshot::capture(&buffer);
        buffer.apply_edits(&[TextEdit::insert(8, "\n")]).unwrap();

        let outcome = Merger::default().merge(&snapshot, "int x = 1;", &mut buffer);
        assert!(outcome.is_stale());
        assert!(!outcome.applied);
        assert_eq!(outcome.state, MergeState::Aborted);
        // The plan is still reported.
        assert_eq!(outcome.stats().replaces, 1);
        assert_eq!(buffer.content(), "int x=1;\n");
    }

    #[test]
    fn stale_noop_is_still_stale() {
        let mut buffer = TextBuffer::from_str("same");
        let snapshot = TextSnapshot::capture(&buffer);
        buffer.insert_str("!");

        let outcome = Merger::default().merge(&snapshot, "same", &mut buffer);
        assert!(outcome.is_stale());
        assert!(!outcome.is_noop());
    }

    #[test]
    fn content_hash_catches_overtype() {
        let mut buffer = TextBuffer::from_str("let a=1;");
        let snapshot = TextSnapshot::capture(&buffer);
        buffer.apply_edits(&[TextEdit::new(4..5, "b")]).unwrap();

        let merger = Merger::new(MergeConfig {
            race_check: RaceCheck::ContentHash,
            ..MergeConfig::default()
        });
        let outcome = merger.merge(&snapshot, "let a = 1;", &mut buffer);
        assert!(outcome.is_stale());
        assert_eq!(buffer.content(), "let b=1;");
    }

    #[test]
    fn function_style_merge_checks_given_lengths() {
        let mut buffer = TextBuffer::from_str("x");
        let outcome = merge(1, 2, "x", "y", &mut buffer);
        assert_eq!(
            outcome.reason,
            Some(MergeError::StaleBuffer {
                snapshot_len: 1,
                current_len: 2
            })
        );
        assert_eq!(buffer.content(), "x");

        let outcome = merge(1, 1, "x", "y", &mut buffer);
        assert!(outcome.applied);
        assert_eq!(buffer.content(), "y");
    }

    #[test]
    fn shared_buffer_merge() {
        let buffer = Mutex::new(TextBuffer::from_str("a=1\n"));
        let snapshot = TextSnapshot::capture(&*buffer.lock().unwrap());

        let outcome = Merger::default().merge_shared(&snapshot, "a = 1\n", &buffer);
        assert!(outcome.applied);
        assert_eq!(buffer.lock().unwrap().content(), "a = 1\n");
    }

    #[test]
    fn poisoned_lock_is_apply_failure() {
        let buffer = Mutex::new(TextBuffer::from_str("a=1\n"));
        let snapshot = TextSnapshot::capture(&*buffer.lock().unwrap());
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = buffer.lock().unwrap();
            panic!("writer crashed");
        }));

        let outcome = Merger::default().merge_shared(&snapshot, "a = 1\n", &buffer);
        assert!(matches!(
            outcome.reason,
            Some(MergeError::ApplyFailure(EditError::Rejected(_)))
        ));
        assert_eq!(outcome.state, MergeState::Aborted);
    }

    #[test]
    fn state_names() {
        assert_eq!(MergeState::RaceCheck.to_string(), "race-check");
    }
}
