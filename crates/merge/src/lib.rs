// Chunk: docs/chunks/format_merge - Formatter output merge engine

//! fmtmerge: merge external formatter output into a live text buffer.
//!
//! An editor snapshots a document, hands the text to a formatter, and gets
//! the reformatted text back some time later. Replacing the whole buffer
//! with it would throw away the cursor, the selection and undo granularity,
//! and would clobber anything typed while the formatter ran. Instead:
//!
//! 1. [`diff`] turns snapshot + output into a minimal list of [`EditOp`]s
//!    that tile the snapshot.
//! 2. The race check ([`detect_race`]) compares the live buffer against the
//!    [`TextSnapshot`]. If it changed, the merge aborts and the buffer is
//!    left alone.
//! 3. The non-`Keep` ops go to the host as one atomic transaction
//!    ([`BufferHandle::apply_edits`]).
//!
//! # Example
//!
//! ```
//! use fmtmerge::{EditOp, Merger, TextSnapshot};
//! use fmtmerge_buffer::TextBuffer;
//!
//! let mut buffer = TextBuffer::from_str("int x=1;");
//! let snapshot = TextSnapshot::capture(&buffer);
//!
//! // ... the formatter runs ...
//! let outcome = Merger::default().merge(&snapshot, "int x = 1;", &mut buffer);
//!
//! assert!(outcome.applied);
//! assert_eq!(outcome.edits[1], EditOp::Replace { range: 5..6, text: " = ".into() });
//! assert_eq!(buffer.content(), "int x = 1;");
//! ```

pub mod apply;
pub mod config;
pub mod coordinator;
pub mod diff;
pub mod edit_op;
pub mod error;
pub mod handle;
pub mod race;
pub mod snapshot;

pub use apply::apply_ops;
pub use config::{ConfigError, MergeConfig};
pub use coordinator::{merge, MergeOutcome, MergeState, Merger};
pub use diff::{diff, DiffAlgorithm, DiffOptions, DiffStats};
pub use edit_op::{apply_to_text, to_text_edits, validate_tiling, EditOp, TilingError};
pub use error::MergeError;
pub use handle::BufferHandle;
pub use race::{check_lengths, detect_race, RaceCheck};
pub use snapshot::TextSnapshot;
