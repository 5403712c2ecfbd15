//! Error types for tanyata

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for tanyata operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in tanyata operations
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to load or run the embedding model
    #[error("embedding error: {0}")]
    Embedding(String),

    /// Failed to chunk a document
    #[error("chunking error: {0}")]
    Chunking(String),

    /// Failed to store or retrieve from vector store
    #[error("store error: {0}")]
    Store(String),

    /// Document, index or chunk not found
    #[error("not found: {0}")]
    NotFound(String),

    /// Invalid input provided
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A file could not be read or written
    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File content is not valid under the declared encoding
    #[error("cannot decode {} as {encoding}: {reason}", path.display())]
    Decode {
        path: PathBuf,
        encoding: String,
        reason: String,
    },

    /// Configuration could not be loaded or failed validation
    #[error("configuration error: {0}")]
    Config(String),

    /// The API key for the inference service is absent
    #[error("{var} is not set; add it to the environment or to a .env file")]
    MissingCredential { var: String },

    /// The persisted index was built with a different embedder
    #[error("index mismatch: {0}")]
    IndexMismatch(String),

    /// The inference service rejected the request or answered unexpectedly
    #[error("generation failed{}: {message}", status.map(|s| format!(" (HTTP {s})")).unwrap_or_default())]
    Generation {
        status: Option<u16>,
        message: String,
    },

    /// Transport failure talking to the inference service
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Failed to encode or decode persisted data
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
