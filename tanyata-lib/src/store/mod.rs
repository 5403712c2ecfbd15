//! Vector storage backends
//!
//! # Storage Model
//!
//! Each stored item consists of:
//! - Chunk: the original text and metadata
//! - Embedding: the vector representation
//!
//! [`MemoryStore`] does the searching; [`DiskStore`] wraps it and persists
//! the entries under an index directory so the chat process can reload what
//! the indexer wrote.
//!
//! # Usage
//!
//! ```ignore
//! use tanyata_lib::store::{DiskStore, IndexManifest, VectorStore};
//!
//! let mut store = DiskStore::create("db_thesis", IndexManifest::for_embedder(&embedder))?;
//! store.insert(&chunks, &embeddings)?;
//! store.persist()?;
//!
//! let store = DiskStore::open("db_thesis")?;
//! let results = store.search(&query_embedding, 15)?;
//! ```

use serde::{Deserialize, Serialize};

use crate::chunk::Chunk;
use crate::embed::Embedding;
use crate::Result;

/// A search result with similarity score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// The matched chunk
    pub chunk: Chunk,
    /// Similarity score (higher is more similar)
    /// For cosine similarity: -1.0 to 1.0
    pub score: f32,
}

/// Trait for vector storage backends
pub trait VectorStore: Send + Sync {
    /// Insert chunks with their embeddings
    ///
    /// An entry whose chunk id is already stored is replaced in place.
    ///
    /// # Arguments
    /// * `chunks` - The text chunks to store
    /// * `embeddings` - Corresponding embeddings (must be same length)
    fn insert(&mut self, chunks: &[Chunk], embeddings: &[Embedding]) -> Result<()>;

    /// Search for similar chunks
    ///
    /// # Arguments
    /// * `query_embedding` - The query vector
    /// * `k` - Number of results to return
    ///
    /// # Returns
    /// Top-k results sorted by similarity (highest first)
    fn search(&self, query_embedding: &Embedding, k: usize) -> Result<Vec<SearchResult>>;

    /// Drop every entry that came from `source_id`, returning how many
    fn remove_source(&mut self, source_id: &str) -> usize;

    /// Get total number of stored chunks
    fn len(&self) -> usize;

    /// Check if store is empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clear all stored data
    fn clear(&mut self);
}

mod disk;
mod memory;

pub use disk::*;
pub use memory::*;
