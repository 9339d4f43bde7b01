// Chunk: docs/chunks/format_merge - Formatter output merge engine

//! Diff engine: snapshot text + formatter output -> tiling `EditOp`s.
//!
//! # Algorithm
//!
//! 1. Split both texts into lines, keeping line terminators.
//! 2. Strip the common leading and trailing lines. Doing this before the
//!    line diff pins the unchanged head and tail of the document, so among
//!    equally short scripts the one with the longest outer `Keep`s wins.
//! 3. Line-diff the remaining middle with `similar` (Myers by default).
//! 4. Coalesce each run of deleted/inserted lines into one hunk and emit it
//!    as `Insert`, `Delete` or `Replace` over char offsets.
//! 5. Optionally refine `Replace` hunks by peeling off their common char
//!    prefix and suffix, so a formatter that only adds spaces inside a line
//!    does not rewrite the whole line.
//!
//! Output is deterministic for identical inputs unless a diff deadline is
//! configured.

use std::ops::Range;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use similar::{Algorithm, DiffOp};

use crate::edit_op::EditOp;

/// Line diff algorithm, see [`similar::Algorithm`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffAlgorithm {
    #[default]
    Myers,
    Patience,
    Lcs,
}

impl From<DiffAlgorithm> for Algorithm {
    fn from(algorithm: DiffAlgorithm) -> Self {
        match algorithm {
            DiffAlgorithm::Myers => Algorithm::Myers,
            DiffAlgorithm::Patience => Algorithm::Patience,
            DiffAlgorithm::Lcs => Algorithm::Lcs,
        }
    }
}

/// Knobs for [`diff`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffOptions {
    pub algorithm: DiffAlgorithm,
    /// Peel common char prefix/suffix off replaced line runs.
    pub refine_hunks: bool,
    /// Give up on an optimal line diff after this long. Off by default: a
    /// deadline makes the op sequence depend on timing. The result is still
    /// a correct (possibly larger) edit script.
    pub timeout_ms: Option<u64>,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            algorithm: DiffAlgorithm::Myers,
            refine_hunks: true,
            timeout_ms: None,
        }
    }
}

/// Computes ops that turn `original` into `reformatted`.
///
/// The result tiles `original` (see [`crate::validate_tiling`]) and
/// [`crate::apply_to_text`] on it yields `reformatted` exactly. Identical
/// non-empty inputs give a single `Keep`; two empty inputs give no ops.
pub fn diff(original: &str, reformatted: &str, options: &DiffOptions) -> Vec<EditOp> {
    if original == reformatted {
        let len = original.chars().count();
        return if len == 0 {
            Vec::new()
        } else {
            vec![EditOp::Keep(0..len)]
        };
    }

    let old_lines: Vec<&str> = original.split_inclusive('\n').collect();
    let new_lines: Vec<&str> = reformatted.split_inclusive('\n').collect();

    let prefix = old_lines
        .iter()
        .zip(&new_lines)
        .take_while(|(a, b)| a == b)
        .count();
    let suffix = old_lines[prefix..]
        .iter()
        .rev()
        .zip(new_lines[prefix..].iter().rev())
        .take_while(|(a, b)| a == b)
        .count();

    let old_mid = &old_lines[prefix..old_lines.len() - suffix];
    let new_mid = &new_lines[prefix..new_lines.len() - suffix];

    let deadline = options
        .timeout_ms
        .map(|ms| Instant::now() + Duration::from_millis(ms));
    let line_ops =
        similar::capture_diff_slices_deadline(options.algorithm.into(), old_mid, new_mid, deadline);

    let mut planner = Planner::new(original, &old_lines, options);
    planner.keep_lines(0..prefix);

    // Line cursors into the middle slices. An `Insert`'s `old_index` can lag
    // behind a preceding `Equal`, so hunks are placed by these instead.
    let mut old_pos = 0;
    let mut new_pos = 0;
    // Pending run of changed lines: (old line range, new line range).
    let mut hunk: Option<(Range<usize>, Range<usize>)> = None;
    for op in &line_ops {
        if let DiffOp::Equal { len, .. } = *op {
            if let Some((old, new)) = hunk.take() {
                planner.hunk(prefix + old.start..prefix + old.end, &new_mid[new]);
            }
            planner.keep_lines(prefix + old_pos..prefix + old_pos + len);
            old_pos += len;
            new_pos += len;
            continue;
        }

        let (old_len, new_len) = (op.old_range().len(), op.new_range().len());
        let (old, new) = hunk.get_or_insert((old_pos..old_pos, new_pos..new_pos));
        old.end += old_len;
        new.end += new_len;
        old_pos += old_len;
        new_pos += new_len;
    }
    if let Some((old, new)) = hunk {
        planner.hunk(prefix + old.start..prefix + old.end, &new_mid[new]);
    }

    planner.keep_lines(old_lines.len() - suffix..old_lines.len());
    planner.finish()
}

/// Turns line-level results into char-offset ops over the original text.
struct Planner<'a> {
    options: &'a DiffOptions,
    old_chars: Vec<char>,
    /// Char offset where each original line starts, plus the total length.
    line_starts: Vec<usize>,
    ops: Vec<EditOp>,
}

impl<'a> Planner<'a> {
    fn new(original: &str, old_lines: &[&str], options: &'a DiffOptions) -> Self {
        let mut line_starts = Vec::with_capacity(old_lines.len() + 1);
        let mut offset = 0;
        line_starts.push(0);
        for line in old_lines {
            offset += line.chars().count();
            line_starts.push(offset);
        }

        Self {
            options,
            old_chars: original.chars().collect(),
            line_starts,
            ops: Vec::new(),
        }
    }

    fn char_range(&self, lines: Range<usize>) -> Range<usize> {
        self.line_starts[lines.start]..self.line_starts[lines.end]
    }

    fn keep_lines(&mut self, lines: Range<usize>) {
        let range = self.char_range(lines);
        self.keep(range);
    }

    /// Emits the ops for original `lines` becoming `new_lines`.
    fn hunk(&mut self, lines: Range<usize>, new_lines: &[&str]) {
        let range = self.char_range(lines);
        let text = new_lines.concat();

        if range.is_empty() {
            self.push(EditOp::Insert {
                at: range.start,
                text,
            });
        } else if text.is_empty() {
            self.push(EditOp::Delete(range));
        } else if self.options.refine_hunks {
            self.refined_replace(range, &text);
        } else {
            self.push(EditOp::Replace { range, text });
        }
    }

    /// Replaces `range` with `text`, keeping their common char prefix and
    /// suffix in place. The prefix is peeled first, so ties favor a longer
    /// leading `Keep`.
    fn refined_replace(&mut self, range: Range<usize>, text: &str) {
        let old = &self.old_chars[range.clone()];
        let new: Vec<char> = text.chars().collect();

        let head = old.iter().zip(&new).take_while(|(a, b)| a == b).count();
        let tail = old[head..]
            .iter()
            .rev()
            .zip(new[head..].iter().rev())
            .take_while(|(a, b)| a == b)
            .count();

        let core = range.start + head..range.end - tail;
        let core_text: String = new[head..new.len() - tail].iter().collect();

        self.keep(range.start..core.start);
        if core.is_empty() {
            if !core_text.is_empty() {
                self.push(EditOp::Insert {
                    at: core.start,
                    text: core_text,
                });
            }
        } else if core_text.is_empty() {
            self.push(EditOp::Delete(core.clone()));
        } else {
            self.push(EditOp::Replace {
                range: core.clone(),
                text: core_text,
            });
        }
        self.keep(core.end..range.end);
    }

    /// Appends a `Keep`, merging with a preceding `Keep` and skipping empty
    /// ranges.
    fn keep(&mut self, range: Range<usize>) {
        if range.is_empty() {
            return;
        }
        if let Some(EditOp::Keep(last)) = self.ops.last_mut() {
            if last.end == range.start {
                last.end = range.end;
                return;
            }
        }
        self.ops.push(EditOp::Keep(range));
    }

    fn push(&mut self, op: EditOp) {
        self.ops.push(op);
    }

    fn finish(self) -> Vec<EditOp> {
        self.ops
    }
}

/// Op counts and char totals for a merge plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DiffStats {
    pub keeps: usize,
    pub inserts: usize,
    pub deletes: usize,
    pub replaces: usize,
    pub chars_inserted: usize,
    pub chars_removed: usize,
}

impl DiffStats {
    pub fn of(ops: &[EditOp]) -> Self {
        let mut stats = Self::default();
        for op in ops {
            match op {
                EditOp::Keep(_) => stats.keeps += 1,
                EditOp::Insert { text, .. } => {
                    stats.inserts += 1;
                    stats.chars_inserted += text.chars().count();
                }
                EditOp::Delete(range) => {
                    stats.deletes += 1;
                    stats.chars_removed += range.len();
                }
                EditOp::Replace { range, text } => {
                    stats.replaces += 1;
                    stats.chars_inserted += text.chars().count();
                    stats.chars_removed += range.len();
                }
            }
        }
        stats
    }

    /// Number of ops that change text.
    pub fn changes(&self) -> usize {
        self.inserts + self.deletes + self.replaces
    }
}
