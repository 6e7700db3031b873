// SPDX-License-Identifier: MIT OR Apache-2.0

//! Retrieval index: an embedding matrix paired with per-row chunk metadata.

pub mod builder;
pub mod storage;

pub use builder::build_index;
pub use storage::{IndexStore, EMBEDDINGS_FILE, METADATA_FILE};

use serde::{Deserialize, Serialize};

use crate::embedding::EmbeddingMatrix;
use crate::errors::{RagError, Result};

/// Metadata for one indexed chunk. Row `i` of the matrix belongs to entry `i`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub filename: String,
    pub chunk_index: usize,
    pub text: String,
}

/// Embedding matrix plus parallel metadata.
///
/// Both halves are only ever replaced together; the row counts always agree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Index {
    model_id: Option<String>,
    embeddings: EmbeddingMatrix,
    metadata: Vec<ChunkMetadata>,
}

impl Index {
    pub fn new(
        model_id: Option<String>,
        embeddings: EmbeddingMatrix,
        metadata: Vec<ChunkMetadata>,
    ) -> Result<Self> {
        if embeddings.rows() != metadata.len() {
            return Err(RagError::config(format!(
                "index has {} embedding rows but {} metadata entries",
                embeddings.rows(),
                metadata.len()
            )));
        }
        Ok(Self {
            model_id,
            embeddings,
            metadata,
        })
    }

    /// An index with zero coverage.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Identity of the model that produced the embeddings, if known.
    pub fn model_id(&self) -> Option<&str> {
        self.model_id.as_deref()
    }

    pub fn embeddings(&self) -> &EmbeddingMatrix {
        &self.embeddings
    }

    pub fn metadata(&self) -> &[ChunkMetadata] {
        &self.metadata
    }

    pub fn len(&self) -> usize {
        self.metadata.len()
    }

    /// True when there is nothing to search.
    pub fn is_empty(&self) -> bool {
        self.embeddings.is_empty() || self.metadata.is_empty()
    }

    /// Number of distinct source files covered.
    pub fn file_count(&self) -> usize {
        let mut names: Vec<&str> = self.metadata.iter().map(|m| m.filename.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        names.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(name: &str, idx: usize) -> ChunkMetadata {
        ChunkMetadata {
            filename: name.to_string(),
            chunk_index: idx,
            text: format!("{} {}", name, idx),
        }
    }

    #[test]
    fn test_row_mismatch_rejected() {
        let matrix = EmbeddingMatrix::from_rows(vec![vec![1.0, 0.0]]).unwrap();
        let err = Index::new(None, matrix, vec![meta("a", 0), meta("a", 1)]).unwrap_err();
        assert!(matches!(err, RagError::Configuration(_)));
    }

    #[test]
    fn test_empty_index() {
        let index = Index::empty();
        assert!(index.is_empty());
        assert_eq!(index.len(), 0);
        assert_eq!(index.embeddings().shape(), (0, 0));
        assert_eq!(index.model_id(), None);
    }

    #[test]
    fn test_file_count() {
        let matrix = EmbeddingMatrix::from_rows(vec![vec![1.0]; 3]).unwrap();
        let index = Index::new(
            Some("m".to_string()),
            matrix,
            vec![meta("a", 0), meta("b", 0), meta("a", 1)],
        )
        .unwrap();
        assert_eq!(index.file_count(), 2);
        assert_eq!(index.model_id(), Some("m"));
    }
}
