// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedding provider interface and implementations.
//!
//! [`FastEmbedder`] runs sentence-transformers/all-MiniLM-L6-v2 locally through
//! fastembed. [`HashingProvider`] is a deterministic offline stand-in used by
//! tests and air-gapped setups.

use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use std::borrow::Cow;
use std::env;
use std::path::PathBuf;

use crate::errors::{RagError, Result};

const DEFAULT_FASTEMBED_MODEL: &str = "minilm";
const DEFAULT_FASTEMBED_BATCH_SIZE: usize = 256;
const MAX_FASTEMBED_BATCH_SIZE: usize = 1024;
const DEFAULT_FASTEMBED_MAX_CHARS: usize = 2000;

/// Output dimension of all-MiniLM-L6-v2.
pub const DEFAULT_EMBEDDING_DIM: usize = 384;

/// Configuration for the fastembed provider.
#[derive(Debug, Clone)]
pub struct EmbeddingProviderConfig {
    pub model: EmbeddingModel,
    pub batch_size: usize,
    pub max_chars: usize,
    pub cache_dir: Option<PathBuf>,
}

impl Default for EmbeddingProviderConfig {
    fn default() -> Self {
        Self {
            model: EmbeddingModel::AllMiniLML6V2,
            batch_size: DEFAULT_FASTEMBED_BATCH_SIZE,
            max_chars: DEFAULT_FASTEMBED_MAX_CHARS,
            cache_dir: None,
        }
    }
}

impl EmbeddingProviderConfig {
    /// Builds a config from explicit settings, then applies `FASTEMBED_*` overrides.
    pub fn resolve(
        model: Option<&str>,
        batch_size: Option<usize>,
        max_chars: Option<usize>,
        cache_dir: Option<PathBuf>,
    ) -> Result<Self> {
        let mut config = Self {
            cache_dir,
            ..Default::default()
        };
        if let Some(name) = model {
            config.model = parse_model_name(name)?;
        }
        if let Some(size) = batch_size {
            config.batch_size = size;
        }
        if let Some(chars) = max_chars {
            config.max_chars = chars;
        }
        config.apply_env()
    }

    fn apply_env(mut self) -> Result<Self> {
        if let Ok(raw) = env::var("FASTEMBED_MODEL") {
            self.model = parse_model_name(&raw)?;
        }

        self.batch_size = parse_usize_env("FASTEMBED_BATCH_SIZE", self.batch_size)?;
        if self.batch_size == 0 {
            self.batch_size = DEFAULT_FASTEMBED_BATCH_SIZE;
        }
        if self.batch_size > MAX_FASTEMBED_BATCH_SIZE {
            tracing::warn!(
                batch_size = self.batch_size,
                max = MAX_FASTEMBED_BATCH_SIZE,
                "FASTEMBED_BATCH_SIZE exceeds maximum; clamping"
            );
            self.batch_size = MAX_FASTEMBED_BATCH_SIZE;
        }

        self.max_chars = parse_usize_env("FASTEMBED_MAX_CHARS", self.max_chars)?;
        if self.max_chars == 0 {
            self.max_chars = DEFAULT_FASTEMBED_MAX_CHARS;
        }

        Ok(self)
    }
}

/// Trait for embedding providers.
///
/// Providers return raw vectors; normalization is applied by
/// [`crate::embedding::Embedder`] so every provider lands in the same space.
pub trait EmbeddingProvider: Send {
    /// Returns the model identifier.
    fn model_id(&self) -> &str;

    /// Generates one embedding per input text, in order.
    fn embed_texts(&mut self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

/// FastEmbed provider using sentence-transformers/all-MiniLM-L6-v2.
pub struct FastEmbedder {
    embedder: TextEmbedding,
    config: EmbeddingProviderConfig,
    model_id: String,
}

impl FastEmbedder {
    pub fn new(config: EmbeddingProviderConfig) -> Result<Self> {
        let model_id = model_id_for(&config.model);
        let mut init = InitOptions::new(config.model.clone());
        if let Some(dir) = &config.cache_dir {
            init = init.with_cache_dir(dir.clone());
        }

        tracing::info!(model = %model_id, "loading embedding model");
        let embedder = TextEmbedding::try_new(init).map_err(|e| RagError::ModelUnavailable {
            model: model_id.clone(),
            message: e.to_string(),
        })?;

        Ok(Self {
            embedder,
            config,
            model_id,
        })
    }
}

impl EmbeddingProvider for FastEmbedder {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn embed_texts(&mut self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let prepared = truncate_texts(texts, self.config.max_chars);
        self.embedder
            .embed(&prepared, Some(self.config.batch_size))
            .map_err(|e| RagError::Embedding(e.to_string()))
    }
}

/// Deterministic feature-hashing embedder.
///
/// Each lowercase alphanumeric token is hashed with blake3 into one of
/// `dimension` buckets with a sign taken from the hash, so texts sharing words
/// point in similar directions. No model files are needed.
pub struct HashingProvider {
    model: String,
    dimension: usize,
}

impl HashingProvider {
    pub fn new(dimension: usize) -> Self {
        let dimension = dimension.max(1);
        Self {
            model: format!("hashing-{}", dimension),
            dimension,
        }
    }

    fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0_f32; self.dimension];
        let lowered = text.to_lowercase();
        let mut tokens = lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .peekable();

        if tokens.peek().is_none() {
            // No words: the whole trimmed text picks a single bucket so the
            // vector is never zero.
            self.add_feature(&mut vector, text.trim());
            return vector;
        }
        for token in tokens {
            self.add_feature(&mut vector, token);
        }
        vector
    }

    fn add_feature(&self, vector: &mut [f32], feature: &str) {
        let hash = blake3::hash(feature.as_bytes());
        let bytes = hash.as_bytes();
        let mut bucket = [0_u8; 8];
        bucket.copy_from_slice(&bytes[..8]);
        let idx = (u64::from_le_bytes(bucket) % self.dimension as u64) as usize;
        let sign = if bytes[8] & 1 == 0 { 1.0 } else { -1.0 };
        vector[idx] += sign;
    }
}

impl EmbeddingProvider for HashingProvider {
    fn model_id(&self) -> &str {
        &self.model
    }

    fn embed_texts(&mut self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|text| self.embed_text(text)).collect())
    }
}

/// Stable identifier recorded in persisted indexes.
pub fn model_id_for(model: &EmbeddingModel) -> String {
    model.to_string()
}

pub(crate) fn l2_normalize(vector: &mut [f32]) {
    let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm == 0.0 {
        return;
    }
    for value in vector.iter_mut() {
        *value /= norm;
    }
}

fn truncate_texts(texts: &[String], max_chars: usize) -> Vec<Cow<'_, str>> {
    texts
        .iter()
        .map(|text| truncate_to_chars(text.as_str(), max_chars))
        .collect()
}

/// Cuts `input` to at most `max_chars` characters.
pub(crate) fn truncate_to_chars(input: &str, max_chars: usize) -> Cow<'_, str> {
    match input.char_indices().nth(max_chars) {
        Some((idx, _)) => Cow::Borrowed(&input[..idx]),
        None => Cow::Borrowed(input),
    }
}

fn parse_model_name(raw: &str) -> Result<EmbeddingModel> {
    let value = raw.trim();
    if value.is_empty() {
        return Ok(EmbeddingModel::AllMiniLML6V2);
    }

    match value.to_lowercase().as_str() {
        "minilm"
        | "all-minilm-l6-v2"
        | "allminilm-l6-v2"
        | "sentence-transformers/all-minilm-l6-v2" => Ok(EmbeddingModel::AllMiniLML6V2),
        other => Err(RagError::config(format!(
            "Unsupported embedding model '{}'. Supported value: {}",
            other, DEFAULT_FASTEMBED_MODEL
        ))),
    }
}

fn parse_usize_env(name: &str, default: usize) -> Result<usize> {
    match env::var(name) {
        Ok(raw) => {
            let value = raw.trim();
            if value.is_empty() {
                Ok(default)
            } else {
                value
                    .parse::<usize>()
                    .map_err(|_| RagError::config(format!("Invalid {} value: {}", name, value)))
            }
        }
        Err(env::VarError::NotPresent) => Ok(default),
        Err(err) => Err(RagError::config(format!("Failed to read {}: {}", name, err))),
    }
}
