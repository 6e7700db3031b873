// SPDX-License-Identifier: MIT OR Apache-2.0

//! Text chunker for embedding generation.
//!
//! Documents are split into fixed-size character windows that overlap by a
//! configurable amount. Window offsets count characters, not bytes, so
//! multi-byte text never splits inside a code point.

use crate::errors::{RagError, Result};

/// Default number of characters per chunk.
pub const DEFAULT_CHUNK_SIZE: usize = 800;

/// Default overlap between consecutive chunks.
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;

/// Configuration for the text chunker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkConfig {
    /// Number of characters per chunk.
    pub chunk_size: usize,
    /// Number of characters shared by consecutive chunks.
    pub chunk_overlap: usize,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
        }
    }
}

impl ChunkConfig {
    /// Creates a validated ChunkConfig.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(RagError::config("chunk_size must be greater than 0"));
        }
        if chunk_overlap >= chunk_size {
            return Err(RagError::config(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                chunk_overlap, chunk_size
            )));
        }
        Ok(Self {
            chunk_size,
            chunk_overlap,
        })
    }

    /// Distance between the starts of consecutive windows.
    pub fn step(&self) -> usize {
        self.chunk_size - self.chunk_overlap
    }
}

/// A document's raw text, keyed by filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub filename: String,
    pub text: String,
}

impl Document {
    pub fn new(filename: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            text: text.into(),
        }
    }
}

/// Ordered chunks produced from one document.
///
/// The position of a chunk in `chunks` is its chunk index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentChunks {
    pub filename: String,
    pub chunks: Vec<String>,
}

/// Splits text into overlapping chunks.
///
/// Algorithm:
/// ```text
/// start = 0
/// step = chunk_size - chunk_overlap
/// while start < total_chars:
///   chunk = chars[start..start + chunk_size].trim()
///   store chunk (even if empty)
///   start += step
/// ```
///
/// Empty chunks are kept here so chunk indices stay positional; the index
/// builder drops them.
pub fn chunk_text(text: &str, chunk_size: usize, chunk_overlap: usize) -> Result<Vec<String>> {
    let config = ChunkConfig::new(chunk_size, chunk_overlap)?;
    Ok(chunk_with(text, &config))
}

/// Splits text with an already validated configuration.
pub fn chunk_with(text: &str, config: &ChunkConfig) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }

    // Byte offset of every character, so windows can be sliced without copying.
    let offsets: Vec<usize> = text.char_indices().map(|(idx, _)| idx).collect();
    let total_chars = offsets.len();
    let byte_at = |char_pos: usize| offsets.get(char_pos).copied().unwrap_or(text.len());

    let step = config.step();
    let mut chunks = Vec::with_capacity(total_chars / step + 1);
    let mut start = 0_usize;

    while start < total_chars {
        let end = (start + config.chunk_size).min(total_chars);
        chunks.push(text[byte_at(start)..byte_at(end)].trim().to_string());
        start += step;
    }

    chunks
}

/// Chunks every document independently, preserving document order.
pub fn chunk_documents(
    documents: &[Document],
    chunk_size: usize,
    chunk_overlap: usize,
) -> Result<Vec<DocumentChunks>> {
    let config = ChunkConfig::new(chunk_size, chunk_overlap)?;
    Ok(documents
        .iter()
        .map(|doc| DocumentChunks {
            filename: doc.filename.clone(),
            chunks: chunk_with(&doc.text, &config),
        })
        .collect())
}
