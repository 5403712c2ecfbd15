//! High-level retrieval interface
//!
//! Combines embedder and store into one API used by both the indexer and
//! the chat assistant.
//!
//! # Usage
//!
//! ```ignore
//! use tanyata_lib::search::Retriever;
//!
//! let mut retriever = Retriever::new(embedder, store);
//! retriever.index(&chunks)?;
//! let results = retriever.retrieve("Apa yang dibahas dalam penelitian ini?", 15)?;
//! ```

use crate::chunk::Chunk;
use crate::embed::Embedder;
use crate::store::{SearchResult, VectorStore};
use crate::Result;

/// Embeds queries and looks them up in a vector store.
pub struct Retriever<E: Embedder, S: VectorStore> {
    embedder: E,
    store: S,
}

impl<E: Embedder, S: VectorStore> Retriever<E, S> {
    #[must_use]
    pub fn new(embedder: E, store: S) -> Self {
        Self { embedder, store }
    }

    /// Index chunks by computing embeddings and storing them.
    pub fn index(&mut self, chunks: &[Chunk]) -> Result<()> {
        if chunks.is_empty() {
            return Ok(());
        }

        let texts: Vec<&str> = chunks.iter().map(|c| c.content.as_str()).collect();
        let embeddings = self.embedder.embed_documents(&texts)?;
        self.store.insert(chunks, &embeddings)?;

        tracing::debug!(chunks = chunks.len(), total = self.store.len(), "indexed chunks");
        Ok(())
    }

    /// The `k` stored chunks most similar to `query`, best first.
    pub fn retrieve(&mut self, query: &str, k: usize) -> Result<Vec<SearchResult>> {
        if k == 0 {
            return Ok(Vec::new());
        }

        let query_embedding = self.embedder.embed_query(query)?;
        let results = self.store.search(&query_embedding, k)?;

        tracing::debug!(
            k,
            returned = results.len(),
            best = results.first().map(|r| r.score),
            "retrieved chunks"
        );
        Ok(results)
    }

    /// Returns the number of indexed chunks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Returns `true` if no chunks are indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Returns a reference to the embedder.
    #[must_use]
    pub fn embedder(&self) -> &E {
        &self.embedder
    }

    /// Returns a reference to the store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns a mutable reference to the store.
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Take the embedder and store back.
    pub fn into_parts(self) -> (E, S) {
        (self.embedder, self.store)
    }
}
