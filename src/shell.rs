// SPDX-License-Identifier: MIT OR Apache-2.0

//! Line-oriented chat shell.
//!
//! Each submitted line is answered with [`compose_answer`] and recorded in an
//! append-only [`ChatHistory`]. The history belongs to the shell session; the
//! retrieval core never sees it.

use std::io::{BufRead, Write};

use crate::answer::{compose_answer, Answer, AnswerOptions, Source};
use crate::embedding::Embedder;
use crate::errors::Result;
use crate::index::Index;
use crate::output::{colorize_heading, render_answer};

pub const PROMPT: &str = "> ";

pub const INDEX_NOT_READY: &str = "The document index is not ready. \
The vector store is missing or could not be loaded; run `brochure-rag index` first.";

pub const DISCLAIMER_FOOTER: &str = "This chatbot provides general educational information only \
and does not replace medical advice. For any concerns about your health, \
please consult a qualified healthcare professional.";

/// One question/answer exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct Turn {
    pub question: String,
    pub answer: String,
    pub sources: Vec<Source>,
}

impl From<Answer> for Turn {
    fn from(answer: Answer) -> Self {
        Self {
            question: answer.question,
            answer: answer.answer,
            sources: answer.sources,
        }
    }
}

/// Ordered record of a session's turns. Entries are never edited or removed.
#[derive(Debug, Default, Clone)]
pub struct ChatHistory {
    turns: Vec<Turn>,
}

impl ChatHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

enum Command<'a> {
    Quit,
    Reset,
    History,
    Help,
    Ask(&'a str),
    Skip,
}

fn parse_line(line: &str) -> Command<'_> {
    match line.trim() {
        "" => Command::Skip,
        ":quit" | ":q" | ":exit" => Command::Quit,
        ":reset" => Command::Reset,
        ":history" => Command::History,
        ":help" => Command::Help,
        question => Command::Ask(question),
    }
}

/// Interactive session over an index. `index` is `None` when it could not be
/// loaded, in which case the shell reports that and exits.
pub struct Shell<'a> {
    index: Option<&'a Index>,
    embedder: &'a Embedder,
    options: AnswerOptions,
    use_color: bool,
    history: ChatHistory,
}

impl<'a> Shell<'a> {
    pub fn new(
        index: Option<&'a Index>,
        embedder: &'a Embedder,
        options: AnswerOptions,
        use_color: bool,
    ) -> Self {
        Self {
            index,
            embedder,
            options,
            use_color,
            history: ChatHistory::new(),
        }
    }

    pub fn history(&self) -> &ChatHistory {
        &self.history
    }

    /// Prints the greeting. Returns `false`, after printing the not-ready
    /// notice, when there is no index to answer from.
    pub fn start<W: Write>(&self, out: &mut W) -> Result<bool> {
        if self.index.is_none() {
            writeln!(out, "{}", INDEX_NOT_READY)?;
            return Ok(false);
        }
        writeln!(
            out,
            "{}",
            colorize_heading("Ask a health question (:help for commands)", self.use_color)
        )?;
        Ok(true)
    }

    /// Handles one input line. Returns `false` once the user asks to quit.
    ///
    /// A failing question is reported and the session continues.
    pub fn handle_line<W: Write>(&mut self, line: &str, out: &mut W) -> Result<bool> {
        let Some(index) = self.index else {
            writeln!(out, "{}", INDEX_NOT_READY)?;
            return Ok(false);
        };

        match parse_line(line) {
            Command::Quit => return Ok(false),
            Command::Skip => {}
            Command::Help => {
                writeln!(out, ":history  show this session's questions and answers")?;
                writeln!(out, ":reset    start a new session")?;
                writeln!(out, ":quit     leave")?;
            }
            Command::Reset => {
                self.history = ChatHistory::new();
                writeln!(out, "Session cleared.")?;
            }
            Command::History => self.print_history(out)?,
            Command::Ask(question) => {
                match compose_answer(question, index, self.embedder, &self.options) {
                    Ok(answer) => {
                        write!(out, "{}", render_answer(&answer, self.use_color))?;
                        self.history.push(answer.into());
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "failed to answer question");
                        writeln!(out, "Error: {}", e)?;
                    }
                }
            }
        }
        Ok(true)
    }

    /// Prints the closing disclaimer.
    pub fn finish<W: Write>(&self, out: &mut W) -> Result<()> {
        writeln!(out)?;
        writeln!(out, "{}", DISCLAIMER_FOOTER)?;
        Ok(())
    }

    /// Reads questions from `input` until `:quit` or end of input.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, out: &mut W) -> Result<()> {
        if !self.start(out)? {
            return Ok(());
        }
        write!(out, "{}", PROMPT)?;
        out.flush()?;

        for line in input.lines() {
            if !self.handle_line(&line?, out)? {
                break;
            }
            write!(out, "{}", PROMPT)?;
            out.flush()?;
        }

        self.finish(out)
    }

    fn print_history<W: Write>(&self, out: &mut W) -> Result<()> {
        if self.history.is_empty() {
            writeln!(out, "No questions asked yet.")?;
            return Ok(());
        }
        for (i, turn) in self.history.turns().iter().enumerate() {
            writeln!(
                out,
                "{}",
                colorize_heading(&format!("[{}] {}", i + 1, turn.question), self.use_color)
            )?;
            let answer = Answer {
                question: turn.question.clone(),
                answer: turn.answer.clone(),
                sources: turn.sources.clone(),
            };
            write!(out, "{}", render_answer(&answer, self.use_color))?;
        }
        Ok(())
    }
}
