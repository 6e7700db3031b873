// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration file support for brochure-rag
//!
//! Loads configuration from .brochure-rag.toml in current directory or
//! ~/.config/brochure-rag/config.toml

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::answer::{AnswerOptions, DEFAULT_MAX_CHUNK_CHARS, DEFAULT_MAX_SENTENCES};
use crate::embedding::{
    ChunkConfig, Embedder, EmbeddingProvider, EmbeddingProviderConfig, FastEmbedder,
    HashingProvider, DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE, DEFAULT_EMBEDDING_DIM,
};
use crate::errors::Result;
use crate::index::storage::DEFAULT_INDEX_DIR;
use crate::ingest::DEFAULT_DOCUMENTS_DIR;
use crate::retrieval::DEFAULT_TOP_K;

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = ".brochure-rag.toml";

/// Embedding provider type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProviderType {
    /// Local all-MiniLM-L6-v2 via fastembed
    #[default]
    Builtin,
    /// Deterministic feature hashing, no model files
    Hashing,
}

/// Location of the document folder and index artifacts
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub documents_dir: Option<PathBuf>,
    pub index_dir: Option<PathBuf>,
}

impl PathsConfig {
    /// Get documents folder (defaults to data/brochures)
    pub fn documents_dir(&self) -> PathBuf {
        self.documents_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DOCUMENTS_DIR))
    }

    /// Get index folder (defaults to vector_store)
    pub fn index_dir(&self) -> PathBuf {
        self.index_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_INDEX_DIR))
    }
}

/// Chunking configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Number of characters per chunk
    pub chunk_size: Option<usize>,
    /// Number of overlapping characters between chunks
    pub chunk_overlap: Option<usize>,
}

impl ChunkingConfig {
    /// Get chunk size (defaults to 800)
    pub fn chunk_size(&self) -> usize {
        self.chunk_size.unwrap_or(DEFAULT_CHUNK_SIZE)
    }

    /// Get chunk overlap (defaults to 200)
    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap.unwrap_or(DEFAULT_CHUNK_OVERLAP)
    }

    /// Validated chunker settings
    pub fn chunk_config(&self) -> Result<ChunkConfig> {
        ChunkConfig::new(self.chunk_size(), self.chunk_overlap())
    }
}

/// Retrieval and answer configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Number of chunks per answer
    pub top_k: Option<usize>,
    /// Character cap per chunk before sentence trimming
    pub max_chunk_chars: Option<usize>,
    /// Sentences kept per snippet
    pub max_sentences: Option<usize>,
}

impl RetrievalConfig {
    /// Get top k (defaults to 3)
    pub fn top_k(&self) -> usize {
        self.top_k.unwrap_or(DEFAULT_TOP_K)
    }

    /// Get max chunk chars (defaults to 600)
    pub fn max_chunk_chars(&self) -> usize {
        self.max_chunk_chars.unwrap_or(DEFAULT_MAX_CHUNK_CHARS)
    }

    /// Get max sentences (defaults to 3)
    pub fn max_sentences(&self) -> usize {
        self.max_sentences.unwrap_or(DEFAULT_MAX_SENTENCES)
    }

    pub fn answer_options(&self) -> AnswerOptions {
        AnswerOptions {
            top_k: self.top_k(),
            max_chunk_chars: self.max_chunk_chars(),
            max_sentences: self.max_sentences(),
        }
    }
}

/// Embedding configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Provider type (builtin, hashing)
    pub provider: Option<EmbeddingProviderType>,
    /// Model name for the builtin provider
    pub model: Option<String>,
    /// Batch size for the builtin provider
    pub batch_size: Option<usize>,
    /// Per-text character cap for the builtin provider
    pub max_chars: Option<usize>,
    /// Vector size for the hashing provider
    pub dimension: Option<usize>,
    /// Where model files are cached
    pub cache_dir: Option<PathBuf>,
}

impl EmbeddingConfig {
    /// Get provider type (defaults to Builtin)
    pub fn provider(&self) -> EmbeddingProviderType {
        self.provider.unwrap_or_default()
    }

    /// Get hashing dimension (defaults to 384)
    pub fn dimension(&self) -> usize {
        self.dimension.unwrap_or(DEFAULT_EMBEDDING_DIM)
    }

    /// Creates the embedder handle. The builtin model is loaded on first use.
    pub fn embedder(&self) -> Result<Embedder> {
        match self.provider() {
            EmbeddingProviderType::Hashing => Ok(Embedder::new(HashingProvider::new(self.dimension()))),
            EmbeddingProviderType::Builtin => {
                let config = EmbeddingProviderConfig::resolve(
                    self.model.as_deref(),
                    self.batch_size,
                    self.max_chars,
                    self.cache_dir.clone(),
                )?;
                let model_id = crate::embedding::provider::model_id_for(&config.model);
                Ok(Embedder::lazy(model_id, move || {
                    Ok(Box::new(FastEmbedder::new(config.clone())?) as Box<dyn EmbeddingProvider>)
                }))
            }
        }
    }
}

/// Configuration loaded from .brochure-rag.toml or ~/.config/brochure-rag/config.toml
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default output format (text or json)
    pub default_format: Option<String>,

    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default)]
    pub chunking: ChunkingConfig,

    #[serde(default)]
    pub retrieval: RetrievalConfig,

    #[serde(default)]
    pub embeddings: EmbeddingConfig,
}

impl Config {
    /// Load configuration from files
    ///
    /// Precedence (highest to lowest):
    /// 1. .brochure-rag.toml in current directory
    /// 2. ~/.config/brochure-rag/config.toml
    pub fn load() -> Self {
        if let Some(config) = Self::load_from_path(Path::new(LOCAL_CONFIG_FILE)) {
            return config;
        }

        if let Some(home) = dirs::home_dir() {
            let config_path = home.join(".config").join("brochure-rag").join("config.toml");
            if let Some(config) = Self::load_from_path(&config_path) {
                return config;
            }
        }

        Self::default()
    }

    fn load_from_path(path: &Path) -> Option<Self> {
        let content = std::fs::read_to_string(path).ok()?;
        match toml::from_str(&content) {
            Ok(config) => {
                tracing::debug!(path = %path.display(), "loaded config");
                Some(config)
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to parse config; ignoring");
                None
            }
        }
    }

    /// Whether JSON output is the configured default
    pub fn prefers_json(&self) -> bool {
        self.default_format
            .as_deref()
            .is_some_and(|s| s.eq_ignore_ascii_case("json"))
    }

    pub fn paths(&self) -> &PathsConfig {
        &self.paths
    }

    pub fn chunking(&self) -> &ChunkingConfig {
        &self.chunking
    }

    pub fn retrieval(&self) -> &RetrievalConfig {
        &self.retrieval
    }

    pub fn embeddings(&self) -> &EmbeddingConfig {
        &self.embeddings
    }
}
