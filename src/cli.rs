// SPDX-License-Identifier: MIT OR Apache-2.0

//! CLI argument parsing using clap

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// brochure-rag - Offline question answering over health brochures
///
/// Builds a local embedding index over a folder of PDF/TXT brochures and
/// answers questions with cited excerpts. No network access at query time.
#[derive(Parser, Debug)]
#[command(name = "brochure-rag")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true)]
    pub format: Option<OutputFormat>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for results
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract, chunk and embed every brochure, then save the index
    Index {
        /// Folder with .pdf/.txt brochures (defaults to data/brochures)
        #[arg(short, long)]
        docs: Option<PathBuf>,

        /// Folder to write the index into (defaults to vector_store)
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Characters per chunk
        #[arg(long)]
        chunk_size: Option<usize>,

        /// Characters shared by consecutive chunks
        #[arg(long)]
        chunk_overlap: Option<usize>,
    },

    /// Answer a single question
    #[command(alias = "a")]
    Ask {
        /// The question to answer
        question: String,

        /// Folder containing the index (defaults to vector_store)
        #[arg(short, long)]
        index: Option<PathBuf>,

        /// Number of passages to cite
        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        /// Character cap per passage before sentence trimming
        #[arg(long)]
        max_chunk_chars: Option<usize>,
    },

    /// Interactive question-and-answer session
    Chat {
        /// Folder containing the index (defaults to vector_store)
        #[arg(short, long)]
        index: Option<PathBuf>,

        /// Number of passages to cite
        #[arg(short = 'k', long)]
        top_k: Option<usize>,
    },

    /// List the brochures available for indexing
    Docs {
        /// Folder with .pdf/.txt brochures (defaults to data/brochures)
        #[arg(short, long)]
        docs: Option<PathBuf>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
