// SPDX-License-Identifier: MIT OR Apache-2.0

//! `brochure-rag ask`: answer one question

use anyhow::{Context, Result};
use brochure_rag::answer::compose_answer;
use brochure_rag::config::Config;
use brochure_rag::output::{render_answer, use_colors};
use std::path::Path;

use crate::cli::OutputFormat;

pub fn run(
    config: &Config,
    question: &str,
    index: Option<&Path>,
    top_k: Option<usize>,
    max_chunk_chars: Option<usize>,
    format: OutputFormat,
) -> Result<()> {
    let index_dir = super::index_dir(config, index);
    let index = super::load_index(&index_dir)?;
    let embedder = config.embeddings().embedder()?;

    let mut options = config.retrieval().answer_options();
    if let Some(k) = top_k {
        options.top_k = k;
    }
    if let Some(chars) = max_chunk_chars {
        options.max_chunk_chars = chars;
    }

    let answer = compose_answer(question, &index, &embedder, &options)
        .context("Failed to answer question")?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&answer)?);
        }
        OutputFormat::Text => {
            print!("{}", render_answer(&answer, use_colors()));
        }
    }

    Ok(())
}
