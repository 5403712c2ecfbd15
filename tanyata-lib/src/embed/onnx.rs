use fastembed::{InitOptions, TextEmbedding};

use crate::config::EmbeddingConfig;
use crate::embed::{normalize, Embedder, Embedding};
use crate::{Error, Result};

/// Sentence embedder backed by a fastembed ONNX model.
///
/// The model is looked up by name in fastembed's registry; both the full
/// code (`Xenova/paraphrase-multilingual-MiniLM-L12-v2`) and the bare name
/// match. Downloads the model on first use.
pub struct FastEmbedder {
    model: TextEmbedding,
    model_name: String,
    dimension: usize,
    normalize: bool,
    batch_size: Option<usize>,
}

impl FastEmbedder {
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let info = TextEmbedding::list_supported_models()
            .into_iter()
            .filter(|info| model_matches(&info.model_code, &config.model))
            .min_by_key(|info| !info.model_code.eq_ignore_ascii_case(&config.model))
            .ok_or_else(|| {
                Error::Embedding(format!("unknown embedding model '{}'", config.model))
            })?;

        tracing::info!(model = %info.model_code, dim = info.dim, device = %config.device, "loading embedding model");

        let mut opts = InitOptions::new(info.model.clone()).with_show_download_progress(true);
        if let Some(dir) = &config.cache_dir {
            opts = opts.with_cache_dir(dir.clone());
        }

        let model = TextEmbedding::try_new(opts).map_err(|e| Error::Embedding(e.to_string()))?;

        Ok(Self {
            model,
            model_name: info.model_code,
            dimension: info.dim,
            normalize: config.normalize,
            batch_size: config.batch_size,
        })
    }
}

impl Embedder for FastEmbedder {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn normalized(&self) -> bool {
        self.normalize
    }

    fn embed_documents(&mut self, texts: &[&str]) -> Result<Vec<Embedding>> {
        let mut embeddings = self
            .model
            .embed(texts, self.batch_size)
            .map_err(|e| Error::Embedding(e.to_string()))?;

        if self.normalize {
            embeddings.iter_mut().for_each(|v| normalize(v));
        }
        Ok(embeddings)
    }

    fn embed_query(&mut self, text: &str) -> Result<Embedding> {
        self.embed_documents(&[text])?
            .into_iter()
            .next()
            .ok_or_else(|| Error::Embedding("model returned no embeddings".to_string()))
    }
}

/// `org/name` codes match either in full or by their final segment.
fn model_matches(code: &str, wanted: &str) -> bool {
    let tail = |s: &str| s.rsplit('/').next().unwrap_or(s).to_ascii_lowercase();
    code.eq_ignore_ascii_case(wanted) || tail(code) == tail(wanted)
}
