// SPDX-License-Identifier: MIT OR Apache-2.0

//! `brochure-rag index`: extract, chunk, embed and save

use anyhow::{Context, Result};
use brochure_rag::config::Config;
use brochure_rag::embedding::{chunk_documents, ChunkConfig};
use brochure_rag::index::{build_index, IndexStore};
use brochure_rag::ingest::load_directory;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::path::Path;
use std::time::Duration;

use crate::cli::OutputFormat;

#[derive(Debug, Serialize)]
struct IndexSummary {
    documents: usize,
    indexed_files: usize,
    chunks: usize,
    model: Option<String>,
    index_dir: String,
}

pub fn run(
    config: &Config,
    docs: Option<&Path>,
    out: Option<&Path>,
    chunk_size: Option<usize>,
    chunk_overlap: Option<usize>,
    format: OutputFormat,
) -> Result<()> {
    let docs_dir = docs
        .map(Path::to_path_buf)
        .unwrap_or_else(|| config.paths().documents_dir());
    let index_dir = super::index_dir(config, out);

    let chunking = ChunkConfig::new(
        chunk_size.unwrap_or_else(|| config.chunking().chunk_size()),
        chunk_overlap.unwrap_or_else(|| config.chunking().chunk_overlap()),
    )?;

    let documents = load_directory(&docs_dir)
        .with_context(|| format!("Failed to read documents from {}", docs_dir.display()))?;
    if documents.is_empty() {
        tracing::warn!(dir = %docs_dir.display(), "no documents found; writing an empty index");
    }

    let chunked = chunk_documents(&documents, chunking.chunk_size, chunking.chunk_overlap)?;
    let total_chunks: usize = chunked.iter().map(|d| d.chunks.len()).sum();
    tracing::info!(documents = documents.len(), chunks = total_chunks, "chunked documents");

    let embedder = config.embeddings().embedder()?;

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .expect("valid progress bar template"),
    );
    pb.enable_steady_tick(Duration::from_millis(120));
    pb.set_message(format!("Embedding {} chunks with {}", total_chunks, embedder.model_id()));

    let built = build_index(&chunked, &embedder);
    pb.finish_and_clear();
    let index = built.context("Failed to build index")?;

    let store = IndexStore::open(&index_dir);
    if store.exists() {
        tracing::info!(dir = %store.dir().display(), "replacing existing index");
    }
    store
        .save(&index)
        .with_context(|| format!("Failed to save index to {}", store.dir().display()))?;

    let summary = IndexSummary {
        documents: documents.len(),
        indexed_files: index.file_count(),
        chunks: index.len(),
        model: index.model_id().map(str::to_string),
        index_dir: store.dir().display().to_string(),
    };

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        OutputFormat::Text => {
            println!(
                "{} Indexed {} chunks from {} of {} documents into {}",
                "✓".green(),
                summary.chunks,
                summary.indexed_files,
                summary.documents,
                summary.index_dir
            );
        }
    }

    Ok(())
}
