// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared handle around one embedding model.
//!
//! The model is created on first use and reused for the lifetime of the
//! handle. Clones share the same instance, and inference is serialized through
//! a mutex because providers are not assumed to be reentrant.

use once_cell::sync::OnceCell;
use std::sync::{Arc, Mutex};

use super::matrix::EmbeddingMatrix;
use super::provider::{l2_normalize, EmbeddingProvider};
use crate::errors::{RagError, Result};

type ProviderFactory = Box<dyn Fn() -> Result<Box<dyn EmbeddingProvider>> + Send + Sync>;

struct Inner {
    model_id: String,
    provider: OnceCell<Mutex<Box<dyn EmbeddingProvider>>>,
    factory: Option<ProviderFactory>,
}

/// Cloneable handle to the process's embedding model.
#[derive(Clone)]
pub struct Embedder {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for Embedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Embedder")
            .field("model_id", &self.inner.model_id)
            .field("loaded", &self.is_loaded())
            .finish()
    }
}

impl Embedder {
    /// Wraps an already constructed provider.
    pub fn new(provider: impl EmbeddingProvider + 'static) -> Self {
        let model_id = provider.model_id().to_string();
        let cell = OnceCell::new();
        let _ = cell.set(Mutex::new(Box::new(provider) as Box<dyn EmbeddingProvider>));
        Self {
            inner: Arc::new(Inner {
                model_id,
                provider: cell,
                factory: None,
            }),
        }
    }

    /// Defers provider construction until the first embedding call.
    ///
    /// `model_id` must match the id the factory's provider reports; it is what
    /// gets recorded in a built index.
    pub fn lazy<F>(model_id: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Result<Box<dyn EmbeddingProvider>> + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(Inner {
                model_id: model_id.into(),
                provider: OnceCell::new(),
                factory: Some(Box::new(factory)),
            }),
        }
    }

    pub fn model_id(&self) -> &str {
        &self.inner.model_id
    }

    pub fn is_loaded(&self) -> bool {
        self.inner.provider.get().is_some()
    }

    /// Forces model creation, surfacing `ModelUnavailable` early.
    pub fn warm_up(&self) -> Result<()> {
        self.provider().map(|_| ())
    }

    fn provider(&self) -> Result<&Mutex<Box<dyn EmbeddingProvider>>> {
        self.inner.provider.get_or_try_init(|| {
            let factory = self.inner.factory.as_ref().ok_or_else(|| {
                RagError::ModelUnavailable {
                    model: self.inner.model_id.clone(),
                    message: "no provider configured".to_string(),
                }
            })?;
            let provider = factory()?;
            if provider.model_id() != self.inner.model_id {
                return Err(RagError::ModelUnavailable {
                    model: self.inner.model_id.clone(),
                    message: format!("provider reported model '{}'", provider.model_id()),
                });
            }
            Ok(Mutex::new(provider))
        })
    }

    /// Embeds a batch of texts into an L2-normalized `len(texts) x D` matrix.
    ///
    /// An empty batch yields the (0, 0) matrix without touching the model.
    pub fn embed(&self, texts: &[String]) -> Result<EmbeddingMatrix> {
        if texts.is_empty() {
            return Ok(EmbeddingMatrix::empty());
        }

        let mut vectors = {
            let mut provider = self
                .provider()?
                .lock()
                .map_err(|_| RagError::Embedding("embedding model lock poisoned".to_string()))?;
            provider.embed_texts(texts)?
        };

        if vectors.len() != texts.len() {
            return Err(RagError::Embedding(format!(
                "model returned {} embeddings for {} texts",
                vectors.len(),
                texts.len()
            )));
        }
        for vector in vectors.iter_mut() {
            l2_normalize(vector);
        }
        tracing::debug!(count = texts.len(), model = %self.model_id(), "embedded texts");

        EmbeddingMatrix::from_rows(vectors)
    }

    /// Embeds a single text, typically a query.
    pub fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        let matrix = self.embed(&[text.to_string()])?;
        matrix
            .row(0)
            .map(<[f32]>::to_vec)
            .ok_or_else(|| RagError::Embedding("No embedding returned".to_string()))
    }
}
