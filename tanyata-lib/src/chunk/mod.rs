//! Document chunking
//!
//! The thesis text is split with a [`RecursiveChunker`]: it prefers the
//! highest-priority separator (section rules, then paragraphs, lines, words)
//! and only falls back to lower ones for pieces that are still too long.
//!
//! # Usage
//!
//! ```ignore
//! use tanyata_lib::chunk::{Chunker, ChunkMetadata, RecursiveChunker};
//!
//! let chunker = RecursiveChunker::new(1000, 200, vec!["\n\n".into(), " ".into(), "".into()])?;
//! let chunks = chunker.chunk(&text, ChunkMetadata::default());
//! ```

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A chunk of text with its metadata
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct Chunk {
    /// Stable identifier derived from source, position and content
    pub id: String,
    /// The text content of this chunk, including the overlap prefix
    pub content: String,
    /// Metadata about the source and position
    pub metadata: ChunkMetadata,
}

impl Chunk {
    /// The part of the chunk that is not repeated from its predecessor.
    #[must_use]
    pub fn body(&self) -> &str {
        let cut = self
            .content
            .char_indices()
            .nth(self.metadata.overlap)
            .map_or(self.content.len(), |(i, _)| i);
        &self.content[cut..]
    }
}

/// Metadata associated with a chunk
#[derive(Debug, Clone, Default, Serialize, Deserialize, Eq, PartialEq)]
pub struct ChunkMetadata {
    /// Source document identifier
    pub source_id: Option<String>,
    /// Ordinal of this chunk within the source (0-indexed)
    pub position: usize,
    /// Character offset of the first character of `content` in the source
    #[serde(default)]
    pub start: usize,
    /// Number of leading characters shared with the previous chunk
    #[serde(default)]
    pub overlap: usize,
    /// Total number of chunks from this source
    pub total_chunks: Option<usize>,
}

/// Trait for document chunking strategies
pub trait Chunker: Send + Sync {
    /// Split content into chunks
    ///
    /// # Arguments
    /// * `content` - The text content to chunk
    /// * `metadata` - Base metadata to attach to each chunk
    ///
    /// # Returns
    /// A vector of chunks, each with unique IDs and position metadata
    fn chunk(&self, content: &str, metadata: ChunkMetadata) -> Vec<Chunk>;

    /// Returns the name of this chunking strategy
    fn name(&self) -> &str;
}

/// Hex digest identifying a chunk. Identical text at different positions
/// gets distinct ids so the store does not collapse them.
pub(crate) fn generate_id(source_id: Option<&str>, position: usize, content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(source_id.unwrap_or_default().as_bytes());
    hasher.update([0]);
    hasher.update(position.to_le_bytes());
    hasher.update(content.as_bytes());
    hasher
        .finalize()
        .iter()
        .take(8)
        .fold(String::with_capacity(16), |mut acc, b| {
            use std::fmt::Write;
            let _ = write!(acc, "{b:02x}");
            acc
        })
}

mod recursive;

pub use recursive::*;
