// SPDX-License-Identifier: MIT OR Apache-2.0

//! `brochure-rag docs`: list brochures available for indexing

use anyhow::{Context, Result};
use brochure_rag::config::Config;
use brochure_rag::ingest::list_documents;
use brochure_rag::output::{colorize_path, use_colors};
use std::path::Path;

use crate::cli::OutputFormat;

pub fn run(config: &Config, docs: Option<&Path>, format: OutputFormat) -> Result<()> {
    let docs_dir = docs
        .map(Path::to_path_buf)
        .unwrap_or_else(|| config.paths().documents_dir());

    let files = list_documents(&docs_dir)
        .with_context(|| format!("Failed to list documents in {}", docs_dir.display()))?;
    let names: Vec<String> = files
        .iter()
        .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        .collect();

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&names)?);
        }
        OutputFormat::Text => {
            if names.is_empty() {
                println!("No documents found in {}", docs_dir.display());
            } else {
                let use_color = use_colors();
                for name in &names {
                    println!("{}", colorize_path(name, use_color));
                }
                println!("\n{} documents", names.len());
            }
        }
    }

    Ok(())
}
