// SPDX-License-Identifier: MIT OR Apache-2.0

//! Builds an [`Index`] from chunked documents.

use super::{ChunkMetadata, Index};
use crate::embedding::{DocumentChunks, Embedder};
use crate::errors::{RagError, Result};

/// Flattens per-document chunks and embeds them in a single batch.
///
/// Chunks whose trimmed text is empty are skipped, but the remaining chunks
/// keep their original positional index. With nothing left to embed the
/// result is the empty index and the model is never invoked.
pub fn build_index(chunks_by_file: &[DocumentChunks], embedder: &Embedder) -> Result<Index> {
    let mut texts = Vec::new();
    let mut metadata = Vec::new();

    for doc in chunks_by_file {
        for (chunk_index, chunk) in doc.chunks.iter().enumerate() {
            if chunk.trim().is_empty() {
                continue;
            }
            texts.push(chunk.clone());
            metadata.push(ChunkMetadata {
                filename: doc.filename.clone(),
                chunk_index,
                text: chunk.clone(),
            });
        }
    }

    if texts.is_empty() {
        tracing::info!("no chunks to index; index is empty");
        return Ok(Index::empty());
    }

    let embeddings = embedder.embed(&texts)?;
    if embeddings.rows() != metadata.len() {
        return Err(RagError::Embedding(format!(
            "expected {} embeddings, got {}",
            metadata.len(),
            embeddings.rows()
        )));
    }

    tracing::info!(
        chunks = metadata.len(),
        files = chunks_by_file.len(),
        dim = embeddings.dim(),
        "built index"
    );
    Index::new(Some(embedder.model_id().to_string()), embeddings, metadata)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::{EmbeddingProvider, HashingProvider};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn doc(name: &str, chunks: &[&str]) -> DocumentChunks {
        DocumentChunks {
            filename: name.to_string(),
            chunks: chunks.iter().map(|c| c.to_string()).collect(),
        }
    }

    #[test]
    fn test_flattens_in_order_and_skips_blank_chunks() {
        let embedder = Embedder::new(HashingProvider::new(16));
        let index = build_index(
            &[doc("a.txt", &["first", "", "third"]), doc("b.txt", &["  ", "other"])],
            &embedder,
        )
        .unwrap();

        let keys: Vec<(&str, usize)> = index
            .metadata()
            .iter()
            .map(|m| (m.filename.as_str(), m.chunk_index))
            .collect();
        assert_eq!(keys, vec![("a.txt", 0), ("a.txt", 2), ("b.txt", 1)]);
        assert_eq!(index.embeddings().shape(), (3, 16));
        assert_eq!(index.model_id(), Some("hashing-16"));
    }

    #[test]
    fn test_symbol_only_chunk_gets_unit_row() {
        let embedder = Embedder::new(HashingProvider::new(32));
        let index = build_index(&[doc("bullets.txt", &["• • • • •"])], &embedder).unwrap();

        assert_eq!(index.len(), 1);
        let row = index.embeddings().row(0).unwrap();
        let norm = row.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_empty_input_never_calls_model() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let embedder = Embedder::lazy("hashing-16", move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(HashingProvider::new(16)) as Box<dyn EmbeddingProvider>)
        });

        let index = build_index(&[doc("empty.txt", &[]), doc("blank.txt", &[" ", "\n"])], &embedder)
            .unwrap();
        assert!(index.is_empty());
        assert_eq!(index.embeddings().shape(), (0, 0));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    struct CountingProvider {
        calls: Arc<AtomicUsize>,
        inner: HashingProvider,
    }

    impl EmbeddingProvider for CountingProvider {
        fn model_id(&self) -> &str {
            self.inner.model_id()
        }

        fn embed_texts(&mut self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.embed_texts(texts)
        }
    }

    #[test]
    fn test_single_batched_model_call() {
        let calls = Arc::new(AtomicUsize::new(0));
        let embedder = Embedder::new(CountingProvider {
            calls: Arc::clone(&calls),
            inner: HashingProvider::new(8),
        });
        build_index(
            &[doc("a.txt", &["one", "two"]), doc("b.txt", &["three"])],
            &embedder,
        )
        .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
