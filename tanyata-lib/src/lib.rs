//! tanyata - question answering over a single thesis document
//!
//! # Architecture
//!
//! ```text
//! Document -> Chunker -> Embedder -> DiskStore
//!                                      |
//! Question -> Embedder -> Retriever <--+
//!                            |
//!                     PromptTemplate -> Generator -> Answer
//! ```
//!
//! # Example
//!
//! ```ignore
//! use tanyata_lib::{app, config::Config, indexer};
//!
//! let config = Config::load(None)?;
//!
//! // Index the document (offline)
//! let (doc, chunks) = indexer::load_and_chunk(&config.corpus, &config.chunking)?;
//! let embedder = FastEmbedder::new(&config.embedding)?;
//! indexer::write_index(&chunks, &doc.source_id(), embedder, &config.index.dir, false)?;
//!
//! // Ask (online)
//! let mut assistant = app::open_assistant(&config)?;
//! let answer = assistant.ask("Apa yang dibahas dalam penelitian ini?").await?;
//! ```

pub mod app;
pub mod chat;
pub mod chunk;
pub mod config;
pub mod document;
pub mod embed;
pub mod error;
pub mod generate;
pub mod indexer;
pub mod prompt;
pub mod search;
pub mod store;

pub use error::{Error, Result};
