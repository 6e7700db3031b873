// SPDX-License-Identifier: MIT OR Apache-2.0

//! brochure-rag - Offline extractive question answering
//!
//! Documents are chunked into overlapping windows, embedded with a local
//! sentence-embedding model, and searched by cosine similarity. Answers are
//! stitched together from the best matching passages with source citations.

pub mod answer;
pub mod config;
pub mod embedding;
pub mod errors;
pub mod index;
pub mod ingest;
pub mod output;
pub mod retrieval;
pub mod shell;

pub use answer::{compose_answer, Answer, AnswerOptions, Source};
pub use embedding::{chunk_documents, chunk_text, Document, DocumentChunks, Embedder};
pub use errors::{RagError, Result};
pub use index::{build_index, ChunkMetadata, Index, IndexStore};
pub use retrieval::{retrieve_top_k, RetrievedChunk};
