// Chunk: docs/chunks/edit_transactions - Atomic multi-edit transactions

//! Property tests for `TextBuffer::apply_edits`.
//!
//! Random, valid edit batches are checked against a plain `Vec<char>` model;
//! undo must restore the original text exactly and invalid batches must leave
//! the buffer untouched.

use fmtmerge_buffer::{TextBuffer, TextEdit};
use proptest::prelude::*;
use proptest::test_runner::Config as ProptestConfig;

fn text_strategy() -> impl Strategy<Value = String> {
    proptest::collection::vec(prop_oneof![Just('\n'), Just(' '), Just('é'), any::<char>()], 0..64)
        .prop_map(|chars| chars.into_iter().collect())
}

/// Raw cut points + replacement texts, turned into a valid ascending batch
/// once the buffer length is known.
fn batch_strategy() -> impl Strategy<Value = Vec<(u8, u8, String)>> {
    proptest::collection::vec(
        (any::<u8>(), any::<u8>(), proptest::collection::vec(any::<char>(), 0..4)),
        0..8,
    )
    .prop_map(|raw| {
        raw.into_iter()
            .map(|(a, b, chars)| (a, b, chars.into_iter().collect()))
            .collect()
    })
}

fn build_edits(len: usize, raw: &[(u8, u8, String)]) -> Vec<TextEdit> {
    let mut cuts: Vec<(usize, usize, &str)> = raw
        .iter()
        .map(|(a, b, text)| {
            let x = (*a as usize) % (len + 1);
            let y = (*b as usize) % (len + 1);
            (x.min(y), x.max(y), text.as_str())
        })
        .collect();
    cuts.sort_by_key(|(start, end, _)| (*start, *end));

    let mut edits = Vec::new();
    let mut previous_end = 0;
    for (start, end, text) in cuts {
        if start < previous_end {
            continue;
        }
        edits.push(TextEdit::new(start..end, text));
        previous_end = end;
    }
    edits
}

fn apply_to_model(model: &[char], edits: &[TextEdit]) -> String {
    let mut out = String::new();
    let mut pos = 0;
    for edit in edits {
        out.extend(&model[pos..edit.range.start]);
        out.push_str(&edit.text);
        pos = edit.range.end;
    }
    out.extend(&model[pos..]);
    out
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]

    #[test]
    fn transaction_matches_model_and_undoes_exactly(
        initial in text_strategy(),
        raw in batch_strategy(),
    ) {
        let mut buffer = TextBuffer::from_str(&initial);
        let model: Vec<char> = initial.chars().collect();
        let edits = build_edits(model.len(), &raw);

        buffer.apply_edits(&edits).unwrap();
        let expected = apply_to_model(&model, &edits);
        prop_assert_eq!(buffer.content(), expected.clone());
        prop_assert_eq!(buffer.len(), expected.chars().count());
        prop_assert_eq!(buffer.line_count(), expected.matches('\n').count() + 1);

        let changed = edits.iter().any(|e| !e.is_noop());
        prop_assert_eq!(buffer.is_modified(), changed);

        if changed {
            buffer.undo();
        }
        prop_assert_eq!(buffer.content(), initial);
    }

    #[test]
    fn out_of_bounds_batch_changes_nothing(
        initial in text_strategy(),
        raw in batch_strategy(),
        overshoot in 1usize..10,
    ) {
        let mut buffer = TextBuffer::from_str(&initial);
        let len = buffer.len();
        let mut edits = build_edits(len, &raw);
        edits.push(TextEdit::delete(len..len + overshoot));

        prop_assert!(buffer.apply_edits(&edits).is_err());
        prop_assert_eq!(buffer.content(), initial);
        prop_assert!(!buffer.is_modified());
        prop_assert_eq!(buffer.revision(), 0);
    }
}
