// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types shared by the retrieval pipeline.

use thiserror::Error;

/// Errors raised by the brochure-rag library.
///
/// An empty index is a valid state and has no variant here
/// (see [`crate::index::Index::is_empty`]); retrieval absorbs it.
#[derive(Debug, Error)]
pub enum RagError {
    /// Invalid chunking parameters, or a missing/mismatched index artifact pair.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The embedding model could not be created.
    #[error("Embedding model '{model}' is unavailable: {message}")]
    ModelUnavailable { model: String, message: String },

    /// Inference ran but failed or returned malformed output.
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// A single document could not be parsed.
    #[error("Failed to extract text from '{filename}': {message}")]
    Extraction { filename: String, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl RagError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }
}

/// Convenience result alias for library operations.
pub type Result<T> = std::result::Result<T, RagError>;
