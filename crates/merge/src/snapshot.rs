// Chunk: docs/chunks/format_merge - Formatter output merge engine

//! Immutable copy of a buffer taken right before the formatter runs.

use sha2::{Digest, Sha256};

use crate::handle::BufferHandle;

/// Buffer content and length at one instant.
///
/// Taken once per reformat request; the diff is computed against it and the
/// race check compares the live buffer to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSnapshot {
    content: String,
    /// Char count at capture time.
    len: usize,
    digest: [u8; 32],
}

impl TextSnapshot {
    /// Snapshots the current content of `buffer`.
    pub fn capture<B: BufferHandle + ?Sized>(buffer: &B) -> Self {
        let content = buffer.content();
        let len = buffer.len();
        Self::from_parts(content, len)
    }

    pub fn from_text(text: &str) -> Self {
        Self::from_parts(text.to_string(), text.chars().count())
    }

    /// Builds a snapshot from text and a separately recorded length.
    ///
    /// The length is trusted as given: it is what the length race check
    /// compares against.
    pub fn from_parts(content: String, len: usize) -> Self {
        let digest = sha256(&content);
        Self {
            content,
            len,
            digest,
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// SHA-256 of the UTF-8 content.
    pub fn digest(&self) -> &[u8; 32] {
        &self.digest
    }

    /// Whether `text` hashes to this snapshot's digest.
    pub fn matches_digest(&self, text: &str) -> bool {
        sha256(text) == self.digest
    }
}

pub(crate) fn sha256(text: &str) -> [u8; 32] {
    Sha256::digest(text.as_bytes()).into()
}
