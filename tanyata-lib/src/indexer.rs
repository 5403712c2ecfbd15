//! Offline indexing: load → chunk → embed → store
//!
//! Re-indexing a source replaces that source's previous entries, so running
//! the indexer twice on the same document leaves the index unchanged.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::chunk::Chunk;
use crate::config::{ChunkingConfig, CorpusConfig};
use crate::document::Document;
use crate::embed::Embedder;
use crate::search::Retriever;
use crate::store::{DiskStore, IndexManifest, VectorStore};
use crate::Result;

/// Summary of one indexing run.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexReport {
    pub dir: PathBuf,
    /// Chunks written for the source in this run
    pub chunks: usize,
    /// Entries from an earlier run of the same source that were dropped
    pub replaced: usize,
    /// Entries in the index after the run
    pub total: usize,
    pub elapsed: Duration,
}

/// Load the corpus document and split it with the configured chunker.
pub fn load_and_chunk(
    corpus: &CorpusConfig,
    chunking: &ChunkingConfig,
) -> Result<(Document, Vec<Chunk>)> {
    let document = Document::load(&corpus.path, corpus.encoding)?;
    let chunker = chunking.chunker()?;
    let chunks = document.chunk_with(&chunker);

    tracing::info!(
        source = %document.source().display(),
        chunks = chunks.len(),
        chunk_size = chunker.chunk_size(),
        overlap = chunker.overlap(),
        "document chunked"
    );
    Ok((document, chunks))
}

/// Embed `chunks` and write them to the index in `dir`.
///
/// With `fresh` the directory is wiped first; otherwise an existing index
/// must have been built by the same embedder.
pub fn write_index<E: Embedder>(
    chunks: &[Chunk],
    source_id: &str,
    embedder: E,
    dir: &Path,
    fresh: bool,
) -> Result<IndexReport> {
    let started = Instant::now();
    let manifest = IndexManifest::for_embedder(&embedder);
    let store = if fresh {
        DiskStore::create(dir, manifest)?
    } else {
        DiskStore::open_or_create(dir, manifest)?
    };

    let mut retriever = Retriever::new(embedder, store);
    let replaced = retriever.store_mut().remove_source(source_id);
    if replaced > 0 {
        tracing::info!(replaced, source = source_id, "dropping entries from previous run");
    }

    retriever.index(chunks)?;
    let (_, mut store) = retriever.into_parts();
    store.persist()?;

    let report = IndexReport {
        dir: store.dir().to_path_buf(),
        chunks: chunks.len(),
        replaced,
        total: store.len(),
        elapsed: started.elapsed(),
    };
    tracing::info!(
        dir = %dir.display(),
        chunks = report.chunks,
        total = report.total,
        elapsed_ms = report.elapsed.as_millis() as u64,
        "index written"
    );
    Ok(report)
}
