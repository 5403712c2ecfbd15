use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::chunk::Chunk;
use crate::embed::Embedding;
use crate::store::{SearchResult, VectorStore};
use crate::{Error, Result};

/// A stored chunk together with its vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredEntry {
    pub chunk: Chunk,
    pub embedding: Embedding,
}

/// In-memory vector store.
///
/// Uses brute-force cosine similarity search, which is plenty for a single
/// thesis (a few hundred chunks). Entries keep insertion order so equal
/// scores always rank the same way.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Vec<StoredEntry>,
    by_id: HashMap<String, usize>,
    dimension: Option<usize>,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from previously persisted entries.
    pub fn from_entries(entries: Vec<StoredEntry>) -> Result<Self> {
        let mut store = Self::new();
        for entry in entries {
            store.upsert(entry)?;
        }
        Ok(store)
    }

    /// Stored entries in insertion order.
    #[must_use]
    pub fn entries(&self) -> &[StoredEntry] {
        &self.entries
    }

    /// Vector dimension of the stored entries, if any were inserted.
    #[must_use]
    pub fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    fn upsert(&mut self, entry: StoredEntry) -> Result<()> {
        let dim = entry.embedding.len();
        match self.dimension {
            Some(expected) if expected != dim => {
                return Err(Error::InvalidInput(format!(
                    "embedding for chunk {} has dimension {dim}, store holds {expected}",
                    entry.chunk.id
                )));
            }
            _ => self.dimension = Some(dim),
        }

        if let Some(&i) = self.by_id.get(&entry.chunk.id) {
            self.entries[i] = entry;
        } else {
            self.by_id.insert(entry.chunk.id.clone(), self.entries.len());
            self.entries.push(entry);
        }
        Ok(())
    }

    fn reindex(&mut self) {
        self.by_id = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.chunk.id.clone(), i))
            .collect();
        if self.entries.is_empty() {
            self.dimension = None;
        }
    }
}

impl VectorStore for MemoryStore {
    fn insert(&mut self, chunks: &[Chunk], embeddings: &[Embedding]) -> Result<()> {
        if chunks.len() != embeddings.len() {
            return Err(Error::InvalidInput(format!(
                "{} chunks but {} embeddings",
                chunks.len(),
                embeddings.len()
            )));
        }

        for (chunk, embedding) in chunks.iter().zip(embeddings) {
            self.upsert(StoredEntry {
                chunk: chunk.clone(),
                embedding: embedding.clone(),
            })?;
        }
        Ok(())
    }

    fn search(&self, query: &Embedding, k: usize) -> Result<Vec<SearchResult>> {
        if let Some(dim) = self.dimension {
            if dim != query.len() {
                return Err(Error::InvalidInput(format!(
                    "query has dimension {}, store holds {dim}",
                    query.len()
                )));
            }
        }

        let mut results: Vec<SearchResult> = self
            .entries
            .iter()
            .map(|e| SearchResult {
                chunk: e.chunk.clone(),
                score: cosine_similarity(query, &e.embedding),
            })
            .collect();

        // stable: ties keep insertion order
        results.sort_by(|a, b| b.score.total_cmp(&a.score));
        results.truncate(k);
        Ok(results)
    }

    fn remove_source(&mut self, source_id: &str) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|e| e.chunk.metadata.source_id.as_deref() != Some(source_id));
        self.reindex();
        before - self.entries.len()
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.reindex();
    }
}

/// Compute cosine similarity between two vectors.
///
/// Returns a value in [-1, 1] where 1 means identical direction.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len(), "vectors must have same length");

    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}
