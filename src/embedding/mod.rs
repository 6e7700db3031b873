// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedding module - chunking and vector embeddings for retrieval
//!
//! Documents are cut into overlapping character windows and every window is
//! mapped to a unit-length vector so cosine similarity reduces to a dot
//! product.

pub mod chunker;
pub mod embedder;
pub mod matrix;
pub mod provider;

pub use chunker::{
    chunk_documents, chunk_text, ChunkConfig, Document, DocumentChunks, DEFAULT_CHUNK_OVERLAP,
    DEFAULT_CHUNK_SIZE,
};
pub use embedder::Embedder;
pub use matrix::EmbeddingMatrix;
pub use provider::{
    EmbeddingProvider, EmbeddingProviderConfig, FastEmbedder, HashingProvider,
    DEFAULT_EMBEDDING_DIM,
};
