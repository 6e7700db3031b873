// SPDX-License-Identifier: MIT OR Apache-2.0

//! `brochure-rag chat`: interactive session on stdin/stdout

use anyhow::{Context, Result};
use brochure_rag::config::Config;
use brochure_rag::output::use_colors;
use brochure_rag::shell::{Shell, PROMPT};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::io::{IsTerminal, Write};
use std::path::Path;

pub fn run(config: &Config, index: Option<&Path>, top_k: Option<usize>) -> Result<()> {
    let index_dir = super::index_dir(config, index);
    let index = match super::load_index(&index_dir) {
        Ok(index) => Some(index),
        Err(e) => {
            tracing::warn!(error = %format!("{:#}", e), "index unavailable");
            None
        }
    };
    let embedder = config.embeddings().embedder()?;

    let mut options = config.retrieval().answer_options();
    if let Some(k) = top_k {
        options.top_k = k;
    }

    let mut stdout = std::io::stdout();
    let mut shell = Shell::new(index.as_ref(), &embedder, options, use_colors());

    // Piped input is read line by line; a terminal gets line editing and history.
    if !std::io::stdin().is_terminal() {
        shell.run(std::io::stdin().lock(), &mut stdout)?;
        return Ok(());
    }

    if !shell.start(&mut stdout)? {
        return Ok(());
    }
    let mut editor = DefaultEditor::new().context("Failed to initialize line editor")?;
    loop {
        match editor.readline(PROMPT) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = editor.add_history_entry(line.as_str());
                }
                if !shell.handle_line(&line, &mut stdout)? {
                    break;
                }
                stdout.flush()?;
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e).context("Failed to read input"),
        }
    }
    shell.finish(&mut stdout)?;
    Ok(())
}
