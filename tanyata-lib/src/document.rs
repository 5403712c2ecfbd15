//! Source document loading

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::chunk::{Chunk, ChunkMetadata, Chunker};
use crate::{Error, Result};

/// Text encodings accepted by [`Document::load`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Encoding {
    #[default]
    #[serde(rename = "utf-8", alias = "utf8", alias = "UTF-8")]
    Utf8,
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Utf8 => f.write_str("utf-8"),
        }
    }
}

/// A loaded source document. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    source: PathBuf,
    text: String,
}

impl Document {
    /// Read the whole file at `path`, decoding it with `encoding`.
    pub fn load(path: impl AsRef<Path>, encoding: Encoding) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| Error::io(path, e))?;

        let text = match encoding {
            Encoding::Utf8 => String::from_utf8(bytes).map_err(|e| Error::Decode {
                path: path.to_path_buf(),
                encoding: encoding.to_string(),
                reason: e.utf8_error().to_string(),
            })?,
        };

        tracing::debug!(path = %path.display(), chars = text.chars().count(), "loaded document");
        Ok(Self {
            source: path.to_path_buf(),
            text,
        })
    }

    /// Build a document from text already in memory.
    pub fn from_text(source: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            text: text.into(),
        }
    }

    #[must_use]
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// The source path as stored in chunk metadata.
    #[must_use]
    pub fn source_id(&self) -> String {
        self.source.to_string_lossy().into_owned()
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Split this document with `chunker`, tagging every chunk with its source.
    pub fn chunk_with(&self, chunker: &dyn Chunker) -> Vec<Chunk> {
        let metadata = ChunkMetadata {
            source_id: Some(self.source_id()),
            ..ChunkMetadata::default()
        };
        chunker.chunk(&self.text, metadata)
    }
}
