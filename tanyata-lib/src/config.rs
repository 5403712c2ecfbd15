//! Runtime configuration
//!
//! Precedence (lowest to highest):
//! 1. Programmatic defaults, matching the thesis bot as first deployed
//! 2. `tanyata.yaml` in the working directory (or an explicit file)
//! 3. Environment variables, `TANYATA_` prefix, `__` between sections
//!    (e.g. `TANYATA_RETRIEVAL__TOP_K=5`)

use std::fmt;
use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::chunk::{RecursiveChunker, DEFAULT_SEPARATORS};
use crate::document::Encoding;
use crate::prompt::{PromptTemplate, DEFAULT_FALLBACK, DEFAULT_LANGUAGE};
use crate::{Error, Result};

pub const DEFAULT_CONFIG_FILE: &str = "tanyata.yaml";
pub const ENV_PREFIX: &str = "TANYATA_";

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub corpus: CorpusConfig,
    pub index: IndexConfig,
    pub embedding: EmbeddingConfig,
    pub chunking: ChunkingConfig,
    pub retrieval: RetrievalConfig,
    pub llm: LlmConfig,
    pub prompt: PromptConfig,
    pub logging: LoggingConfig,
}

/// The document to index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorpusConfig {
    pub path: PathBuf,
    pub encoding: Encoding,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("ta_teks_V1.1.txt"),
            encoding: Encoding::Utf8,
        }
    }
}

/// Where the vector index lives on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    pub dir: PathBuf,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("db_thesis"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    #[default]
    Cpu,
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cpu => f.write_str("cpu"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub model: String,
    pub device: Device,
    /// L2-normalise vectors before storing or searching
    pub normalize: bool,
    /// Model download cache; fastembed's default when unset
    pub cache_dir: Option<PathBuf>,
    pub batch_size: Option<usize>,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: "paraphrase-multilingual-MiniLM-L12-v2".to_string(),
            device: Device::Cpu,
            normalize: false,
            cache_dir: None,
            batch_size: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    /// Highest priority first; `""` splits between characters
    pub separators: Vec<String>,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
            separators: DEFAULT_SEPARATORS.iter().map(|s| (*s).to_string()).collect(),
        }
    }
}

impl ChunkingConfig {
    pub fn chunker(&self) -> Result<RecursiveChunker> {
        RecursiveChunker::new(self.chunk_size, self.chunk_overlap, self.separators.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self { top_k: 15 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// OpenAI-compatible API root
    pub base_url: String,
    pub model: String,
    /// Name of the environment variable holding the API key
    pub api_key_env: String,
    /// No timeout when unset
    pub timeout_secs: Option<u64>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.groq.com/openai/v1".to_string(),
            model: "groq/compound".to_string(),
            api_key_env: "GROQ_API_KEY".to_string(),
            timeout_secs: None,
        }
    }
}

impl LlmConfig {
    /// Read the API key from the environment. Blank values count as absent.
    pub fn api_key(&self) -> Result<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| Error::MissingCredential {
                var: self.api_key_env.clone(),
            })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptConfig {
    /// Language the answer must be written in
    pub language: String,
    /// Sentence returned when the context has no answer
    pub fallback: String,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            language: DEFAULT_LANGUAGE.to_string(),
            fallback: DEFAULT_FALLBACK.to_string(),
        }
    }
}

impl PromptConfig {
    #[must_use]
    pub fn template(&self) -> PromptTemplate {
        PromptTemplate::new(&self.language, &self.fallback)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

impl Config {
    /// Load configuration with hierarchical merging.
    ///
    /// An explicit `path` must exist; the default file is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(p) if !p.exists() => {
                return Err(Error::NotFound(format!("config file {}", p.display())));
            }
            Some(p) => p.to_path_buf(),
            None => PathBuf::from(DEFAULT_CONFIG_FILE),
        };

        let config: Self = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Yaml::file(&file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(|e| Error::Config(e.to_string()))?;

        config.validate()?;
        tracing::debug!(file = %file.display(), "configuration loaded");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.retrieval.top_k == 0 {
            return Err(Error::Config("retrieval.top_k must be at least 1".to_string()));
        }

        let c = &self.chunking;
        if c.chunk_size == 0 {
            return Err(Error::Config("chunking.chunk_size must be positive".to_string()));
        }
        if c.chunk_overlap >= c.chunk_size {
            return Err(Error::Config(format!(
                "chunking.chunk_overlap ({}) must be smaller than chunking.chunk_size ({})",
                c.chunk_overlap, c.chunk_size
            )));
        }
        if c.separators.is_empty() {
            return Err(Error::Config("chunking.separators cannot be empty".to_string()));
        }

        if self.index.dir.as_os_str().is_empty() {
            return Err(Error::Config("index.dir cannot be empty".to_string()));
        }
        if self.llm.model.is_empty() || self.llm.api_key_env.is_empty() {
            return Err(Error::Config(
                "llm.model and llm.api_key_env cannot be empty".to_string(),
            ));
        }

        if !LOG_LEVELS.contains(&self.logging.level.as_str()) {
            return Err(Error::Config(format!(
                "invalid log level '{}'; expected one of: {}",
                self.logging.level,
                LOG_LEVELS.join(", ")
            )));
        }

        Ok(())
    }
}
