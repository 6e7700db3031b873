// SPDX-License-Identifier: MIT OR Apache-2.0

//! Top-k retrieval over an [`Index`].

use serde::Serialize;
use std::cmp::Ordering;

use crate::embedding::{Embedder, EmbeddingMatrix};
use crate::errors::{RagError, Result};
use crate::index::Index;

/// Default number of chunks to retrieve.
pub const DEFAULT_TOP_K: usize = 3;

/// One retrieved chunk with its similarity score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetrievedChunk {
    /// Dot product of the query and chunk vectors (cosine similarity).
    pub score: f32,
    pub filename: String,
    pub chunk_index: usize,
    pub text: String,
}

/// Nearest-neighbor search over stored vectors.
pub trait NearestNeighbors {
    /// Returns up to `k` `(row, score)` pairs, best first. Equal scores keep
    /// ascending row order.
    fn nearest(&self, query: &[f32], k: usize) -> Vec<(usize, f32)>;
}

/// Exhaustive search; every row is scored.
impl NearestNeighbors for EmbeddingMatrix {
    fn nearest(&self, query: &[f32], k: usize) -> Vec<(usize, f32)> {
        let scores = self.dot_all(query);
        rank_scores(&scores, k)
    }
}

/// Orders scores descending (stable on ties) and keeps the first `k`.
pub fn rank_scores(scores: &[f32], k: usize) -> Vec<(usize, f32)> {
    let mut ranked: Vec<(usize, f32)> = scores.iter().copied().enumerate().collect();
    // sort_by is stable, so equal scores stay in row order
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    ranked.truncate(k.min(scores.len()));
    ranked
}

/// Retrieves the `k` chunks most similar to `query`.
///
/// An empty index yields an empty result without embedding the query. The
/// query is embedded with `embedder`, which must be the model the index was
/// built with.
pub fn retrieve_top_k(
    query: &str,
    index: &Index,
    k: usize,
    embedder: &Embedder,
) -> Result<Vec<RetrievedChunk>> {
    if index.is_empty() {
        tracing::debug!("retrieval against empty index");
        return Ok(Vec::new());
    }

    if let Some(model) = index.model_id() {
        if model != embedder.model_id() {
            return Err(RagError::config(format!(
                "index was built with model '{}' but queries use '{}'; rebuild the index",
                model,
                embedder.model_id()
            )));
        }
    }

    let query_vec = embedder.embed_one(query)?;
    if query_vec.len() != index.embeddings().dim() {
        return Err(RagError::config(format!(
            "query embedding has dimension {} but index has {}",
            query_vec.len(),
            index.embeddings().dim()
        )));
    }

    Ok(search(index, index.embeddings(), &query_vec, k))
}

/// Runs `searcher` and joins the hits with the index metadata.
pub fn search<S: NearestNeighbors + ?Sized>(
    index: &Index,
    searcher: &S,
    query_vec: &[f32],
    k: usize,
) -> Vec<RetrievedChunk> {
    searcher
        .nearest(query_vec, k)
        .into_iter()
        .filter_map(|(row, score)| {
            index.metadata().get(row).map(|meta| RetrievedChunk {
                score,
                filename: meta.filename.clone(),
                chunk_index: meta.chunk_index,
                text: meta.text.clone(),
            })
        })
        .collect()
}
