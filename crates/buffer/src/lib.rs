// Chunk: docs/chunks/text_buffer - Text buffer data structure with gap buffer backing
// Chunk: docs/chunks/edit_transactions - Atomic multi-edit transactions

//! fmtmerge-buffer: the host text buffer formatter merges are applied to.
//!
//! # Overview
//!
//! The main type is [`TextBuffer`], which provides:
//! - Gap buffer storage with a line index for line/offset conversion
//! - Cursor and selection tracking
//! - Atomic multi-edit transactions ([`TextBuffer::apply_edits`]) that are
//!   either applied completely as one undo unit or rejected without a trace
//! - A modified flag that only flips when text actually changed
//!
//! # Example
//!
//! ```
//! use fmtmerge_buffer::{Position, TextBuffer, TextEdit};
//!
//! let mut buffer = TextBuffer::from_str("int x=1;\nreturn x;\n");
//! buffer.set_cursor(Position::new(1, 7));
//!
//! buffer
//!     .apply_edits(&[TextEdit::new(5..6, " = ")])
//!     .expect("edits are in bounds");
//!
//! assert_eq!(buffer.content(), "int x = 1;\nreturn x;\n");
//! // The cursor sits on a line the edit never touched, so it did not move.
//! assert_eq!(buffer.cursor_position(), Position::new(1, 7));
//! assert!(buffer.is_modified());
//!
//! buffer.undo();
//! assert_eq!(buffer.content(), "int x=1;\nreturn x;\n");
//! ```
//!
//! # Dirty Line Tracking
//!
//! Mutations return a [`DirtyLines`] value describing which lines changed so
//! a renderer can limit redraws. Edits that add or remove newlines dirty
//! everything from their line to the end of the buffer.

mod error;
mod gap_buffer;
mod history;
mod line_index;
mod text_buffer;
mod types;

pub use error::EditError;
pub use text_buffer::TextBuffer;
pub use types::{DirtyLines, Position, TextEdit};
