// SPDX-License-Identifier: MIT OR Apache-2.0

//! brochure-rag - Offline question answering over health brochures
//!
//! Retrieves the most relevant brochure passages for a question and stitches
//! them into a cited, extractive answer.

mod cli;
mod commands;

use anyhow::Result;
use brochure_rag::config::Config;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Commands, OutputFormat};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Initialize tracing with BROCHURE_RAG_LOG env var (e.g., BROCHURE_RAG_LOG=debug brochure-rag ask "...")
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("BROCHURE_RAG_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load();
    let format = cli.format.unwrap_or(if config.prefers_json() {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    });

    match cli.command {
        Commands::Index {
            docs,
            out,
            chunk_size,
            chunk_overlap,
        } => {
            commands::index::run(
                &config,
                docs.as_deref(),
                out.as_deref(),
                chunk_size,
                chunk_overlap,
                format,
            )?;
        }
        Commands::Ask {
            question,
            index,
            top_k,
            max_chunk_chars,
        } => {
            commands::ask::run(
                &config,
                &question,
                index.as_deref(),
                top_k,
                max_chunk_chars,
                format,
            )?;
        }
        Commands::Chat { index, top_k } => {
            commands::chat::run(&config, index.as_deref(), top_k)?;
        }
        Commands::Docs { docs } => {
            commands::docs::run(&config, docs.as_deref(), format)?;
        }
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "brochure-rag", &mut std::io::stdout());
        }
    }

    Ok(())
}
