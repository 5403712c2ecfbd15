use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::chunk::Chunk;
use crate::embed::{Embedder, Embedding};
use crate::store::{MemoryStore, SearchResult, StoredEntry, VectorStore};
use crate::{Error, Result};

/// On-disk layout version written into every manifest.
pub const FORMAT_VERSION: u32 = 1;

const MANIFEST_FILE: &str = "manifest.json";
const ENTRIES_FILE: &str = "entries.jsonl";

/// Describes how the vectors in an index directory were produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexManifest {
    pub format_version: u32,
    pub model: String,
    pub dimension: usize,
    pub normalized: bool,
    /// Entry count at the last persist
    #[serde(default)]
    pub entries: usize,
}

impl IndexManifest {
    pub fn for_embedder<E: Embedder + ?Sized>(embedder: &E) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            model: embedder.model_name().to_string(),
            dimension: embedder.dimension(),
            normalized: embedder.normalized(),
            entries: 0,
        }
    }

    /// Fail unless `embedder` produces vectors comparable with this index.
    pub fn ensure_matches<E: Embedder + ?Sized>(&self, embedder: &E) -> Result<()> {
        self.ensure_compatible(&Self::for_embedder(embedder))
    }

    fn ensure_compatible(&self, other: &Self) -> Result<()> {
        if self.model != other.model {
            return Err(Error::IndexMismatch(format!(
                "index was built with model '{}', not '{}'",
                self.model, other.model
            )));
        }
        if self.dimension != other.dimension {
            return Err(Error::IndexMismatch(format!(
                "index holds {}-dimensional vectors, embedder produces {}",
                self.dimension, other.dimension
            )));
        }
        if self.normalized != other.normalized {
            return Err(Error::IndexMismatch(format!(
                "index was built with normalize = {}, embedder uses {}",
                self.normalized, other.normalized
            )));
        }
        Ok(())
    }
}

/// Vector store persisted under a directory.
///
/// Holds a [`MemoryStore`] in memory; [`persist`](Self::persist) writes
/// `manifest.json` and one JSON entry per line to `entries.jsonl`. Stored
/// vectors are read back as-is, only queries are embedded at search time.
#[derive(Debug)]
pub struct DiskStore {
    dir: PathBuf,
    manifest: IndexManifest,
    inner: MemoryStore,
}

impl DiskStore {
    /// Start an empty index in `dir`, replacing any index already there.
    pub fn create(dir: impl AsRef<Path>, manifest: IndexManifest) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;

        for name in [MANIFEST_FILE, ENTRIES_FILE] {
            let path = dir.join(name);
            if path.exists() {
                fs::remove_file(&path).map_err(|e| Error::io(&path, e))?;
            }
        }

        let mut store = Self {
            dir: dir.to_path_buf(),
            manifest,
            inner: MemoryStore::new(),
        };
        store.persist()?;
        tracing::info!(dir = %dir.display(), model = %store.manifest.model, "created vector index");
        Ok(store)
    }

    /// Load the index persisted in `dir`.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let manifest_path = dir.join(MANIFEST_FILE);
        if !manifest_path.exists() {
            return Err(Error::NotFound(format!(
                "no vector index in {}; run the indexer first",
                dir.display()
            )));
        }

        let file = File::open(&manifest_path).map_err(|e| Error::io(&manifest_path, e))?;
        let manifest: IndexManifest = serde_json::from_reader(BufReader::new(file))?;
        if manifest.format_version != FORMAT_VERSION {
            return Err(Error::Store(format!(
                "index format version {} is not supported (expected {FORMAT_VERSION})",
                manifest.format_version
            )));
        }

        let entries = read_entries(&dir.join(ENTRIES_FILE))?;
        if let Some(bad) = entries
            .iter()
            .find(|e| e.embedding.len() != manifest.dimension)
        {
            return Err(Error::Store(format!(
                "entry {} has dimension {}, manifest says {}",
                bad.chunk.id,
                bad.embedding.len(),
                manifest.dimension
            )));
        }
        if entries.len() != manifest.entries {
            tracing::warn!(
                expected = manifest.entries,
                found = entries.len(),
                "entry count differs from manifest"
            );
        }

        let inner = MemoryStore::from_entries(entries)?;
        tracing::info!(dir = %dir.display(), entries = inner.len(), model = %manifest.model, "opened vector index");

        Ok(Self {
            dir: dir.to_path_buf(),
            manifest,
            inner,
        })
    }

    /// Open the index in `dir` if there is one, otherwise create it.
    ///
    /// An existing index built by a different embedder is an error rather
    /// than a silent mix of incomparable vectors.
    pub fn open_or_create(dir: impl AsRef<Path>, manifest: IndexManifest) -> Result<Self> {
        let dir = dir.as_ref();
        if dir.join(MANIFEST_FILE).exists() {
            let store = Self::open(dir)?;
            store.manifest.ensure_compatible(&manifest)?;
            Ok(store)
        } else {
            Self::create(dir, manifest)
        }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub fn manifest(&self) -> &IndexManifest {
        &self.manifest
    }

    /// Write all entries and the manifest. Each file is written to a
    /// temporary sibling first and renamed into place.
    pub fn persist(&mut self) -> Result<()> {
        let entries_path = self.dir.join(ENTRIES_FILE);
        write_atomic(&entries_path, |w| {
            for entry in self.inner.entries() {
                serde_json::to_writer(&mut *w, entry)?;
                w.write_all(b"\n").map_err(|e| Error::io(&entries_path, e))?;
            }
            Ok(())
        })?;

        self.manifest.entries = self.inner.len();
        let manifest_path = self.dir.join(MANIFEST_FILE);
        write_atomic(&manifest_path, |w| {
            serde_json::to_writer_pretty(&mut *w, &self.manifest)?;
            Ok(())
        })?;

        tracing::debug!(entries = self.manifest.entries, dir = %self.dir.display(), "persisted vector index");
        Ok(())
    }
}

impl VectorStore for DiskStore {
    fn insert(&mut self, chunks: &[Chunk], embeddings: &[Embedding]) -> Result<()> {
        if let Some(bad) = embeddings
            .iter()
            .find(|e| e.len() != self.manifest.dimension)
        {
            return Err(Error::InvalidInput(format!(
                "embedding has dimension {}, index expects {}",
                bad.len(),
                self.manifest.dimension
            )));
        }
        self.inner.insert(chunks, embeddings)
    }

    fn search(&self, query_embedding: &Embedding, k: usize) -> Result<Vec<SearchResult>> {
        self.inner.search(query_embedding, k)
    }

    fn remove_source(&mut self, source_id: &str) -> usize {
        self.inner.remove_source(source_id)
    }

    fn len(&self) -> usize {
        self.inner.len()
    }

    fn clear(&mut self) {
        self.inner.clear();
    }
}

fn read_entries(path: &Path) -> Result<Vec<StoredEntry>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    let mut entries = Vec::new();
    for (n, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(|e| Error::io(path, e))?;
        if line.trim().is_empty() {
            continue;
        }
        let entry = serde_json::from_str(&line).map_err(|e| {
            Error::Store(format!("{} line {}: {e}", path.display(), n + 1))
        })?;
        entries.push(entry);
    }
    Ok(entries)
}

fn write_atomic<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<()>,
{
    let tmp = path.with_extension("tmp");
    let file = File::create(&tmp).map_err(|e| Error::io(&tmp, e))?;
    let mut writer = BufWriter::new(file);
    write(&mut writer)?;
    writer.flush().map_err(|e| Error::io(&tmp, e))?;
    drop(writer);
    fs::rename(&tmp, path).map_err(|e| Error::io(path, e))
}
