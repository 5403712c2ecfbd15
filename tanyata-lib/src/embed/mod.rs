//! Text embedding using local models
//!
//! Uses a multilingual sentence-transformer via the fastembed crate (ONNX
//! runtime), so Indonesian thesis text and questions land in one space.
//!
//! # Model Details
//!
//! - Default: paraphrase-multilingual-MiniLM-L12-v2
//! - Dimensions: 384
//! - Runs on CPU
//!
//! The same model and normalisation setting must be used when indexing and
//! when querying; the persisted index records both and refuses to open with
//! a different embedder.
//!
//! # Usage
//!
//! ```ignore
//! use tanyata_lib::embed::{Embedder, FastEmbedder};
//!
//! let mut embedder = FastEmbedder::new(&config.embedding)?;
//! let doc_embeddings = embedder.embed_documents(&["Bab 1 ...", "Bab 2 ..."])?;
//! let query_embedding = embedder.embed_query("Apa yang dibahas?")?;
//! ```

use crate::Result;

/// A vector embedding - fixed size array of floats
pub type Embedding = Vec<f32>;

/// Trait for text embedding models
pub trait Embedder: Send + Sync {
    /// Embed multiple documents for indexing
    ///
    /// Documents may be batched for efficiency.
    fn embed_documents(&mut self, texts: &[&str]) -> Result<Vec<Embedding>>;

    /// Embed a single query for searching
    fn embed_query(&mut self, text: &str) -> Result<Embedding>;

    /// Returns the embedding dimension
    fn dimension(&self) -> usize;

    /// Returns the model name/identifier
    fn model_name(&self) -> &str;

    /// Whether output vectors are L2-normalised
    fn normalized(&self) -> bool;
}

/// Scale `v` to unit length. Zero vectors are left untouched.
pub fn normalize(v: &mut [f32]) {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}

mod onnx;
pub use onnx::*;
