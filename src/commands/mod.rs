// SPDX-License-Identifier: MIT OR Apache-2.0

//! Subcommand implementations for the brochure-rag binary

pub mod ask;
pub mod chat;
pub mod docs;
pub mod index;

use anyhow::{bail, Context, Result};
use brochure_rag::config::Config;
use brochure_rag::index::{Index, IndexStore};
use std::path::{Path, PathBuf};

/// Index folder from the flag, falling back to config.
pub(crate) fn index_dir(config: &Config, flag: Option<&Path>) -> PathBuf {
    flag.map(Path::to_path_buf)
        .unwrap_or_else(|| config.paths().index_dir())
}

/// Loads the saved index, naming the folder in the error.
pub(crate) fn load_index(dir: &Path) -> Result<Index> {
    if !dir.is_dir() {
        bail!(
            "The document index is not ready: {} does not exist; run `brochure-rag index` first",
            dir.display()
        );
    }
    IndexStore::open(dir)
        .load()
        .with_context(|| format!("The document index is not ready ({})", dir.display()))
}
