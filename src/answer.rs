// SPDX-License-Identifier: MIT OR Apache-2.0

//! Extractive answer composition.
//!
//! Retrieved chunks are trimmed into short snippets and stitched into a fixed
//! answer template. No wording is generated beyond the template itself.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::embedding::Embedder;
use crate::errors::Result;
use crate::index::Index;
use crate::retrieval::{retrieve_top_k, RetrievedChunk, DEFAULT_TOP_K};

/// Default character cap applied to a chunk before sentence trimming.
pub const DEFAULT_MAX_CHUNK_CHARS: usize = 600;

/// Default number of sentences kept per snippet.
pub const DEFAULT_MAX_SENTENCES: usize = 3;

pub const ANSWER_INTRO: &str = "Here is what the documents say about your question:";

pub const ANSWER_DISCLAIMER: &str = "This summary is built directly from the brochures. \
It is general information and does **not** replace the opinion of a healthcare professional.";

pub const NO_RESULTS_ANSWER: &str = "I could not find any relevant information about this in the loaded documents. \
Please check that the PDFs contain information about this topic.";

const UNKNOWN_DOCUMENT: &str = "unknown document";

static MULTI_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r" {2,}").expect("valid regex"));

/// Knobs for [`compose_answer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerOptions {
    pub top_k: usize,
    pub max_chunk_chars: usize,
    pub max_sentences: usize,
}

impl Default for AnswerOptions {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            max_chunk_chars: DEFAULT_MAX_CHUNK_CHARS,
            max_sentences: DEFAULT_MAX_SENTENCES,
        }
    }
}

/// A cited passage backing one bullet of the answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub filename: String,
    pub score: f32,
    pub chunk_index: usize,
    pub snippet: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub question: String,
    pub answer: String,
    pub sources: Vec<Source>,
}

/// Answers `query` from the passages most similar to it.
///
/// An empty index, or a retrieval that finds nothing, produces the fixed
/// [`NO_RESULTS_ANSWER`] with no sources.
pub fn compose_answer(
    query: &str,
    index: &Index,
    embedder: &Embedder,
    options: &AnswerOptions,
) -> Result<Answer> {
    let results = retrieve_top_k(query, index, options.top_k, embedder)?;
    Ok(answer_from_results(query, &results, options))
}

/// Builds the answer for already retrieved chunks, keeping their order.
pub fn answer_from_results(query: &str, results: &[RetrievedChunk], options: &AnswerOptions) -> Answer {
    if results.is_empty() {
        return Answer {
            question: query.to_string(),
            answer: NO_RESULTS_ANSWER.to_string(),
            sources: Vec::new(),
        };
    }

    let sources: Vec<Source> = results
        .iter()
        .map(|result| {
            let raw: String = result.text.chars().take(options.max_chunk_chars).collect();
            Source {
                filename: display_name(&result.filename),
                score: result.score,
                chunk_index: result.chunk_index,
                snippet: keep_first_sentences(&raw, options.max_sentences),
            }
        })
        .collect();

    let mut lines = vec![ANSWER_INTRO.to_string(), String::new()];
    lines.extend(
        sources
            .iter()
            .map(|s| format!("- From **{}**: {}", s.filename, s.snippet)),
    );
    lines.push(String::new());
    lines.push(ANSWER_DISCLAIMER.to_string());

    Answer {
        question: query.to_string(),
        answer: lines.join("\n"),
        sources,
    }
}

/// Turns line breaks into spaces, collapses repeated spaces and trims.
pub fn clean_text(text: &str) -> String {
    let single_line = text.replace(['\r', '\n'], " ");
    MULTI_SPACE.replace_all(&single_line, " ").trim().to_string()
}

/// Keeps the first `max_sentences` sentences of the cleaned text.
///
/// A sentence ends at the literal ". ". Abbreviations such as "Dr. Smith"
/// therefore count as a boundary while "3.14" does not. When the text has no
/// more than `max_sentences` pieces it is returned cleaned but otherwise
/// unchanged.
pub fn keep_first_sentences(text: &str, max_sentences: usize) -> String {
    let cleaned = clean_text(text);
    let parts: Vec<&str> = cleaned.split(". ").collect();
    if parts.len() <= max_sentences {
        return cleaned;
    }

    let mut kept = parts[..max_sentences].join(". ").trim().to_string();
    if !kept.ends_with('.') {
        kept.push('.');
    }
    kept
}

/// Base name of a stored filename, for display.
pub fn display_name(filename: &str) -> String {
    Path::new(filename)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| UNKNOWN_DOCUMENT.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::{chunk_documents, Document, EmbeddingProvider, HashingProvider};
    use crate::errors::RagError;
    use crate::index::build_index;

    fn hit(filename: &str, chunk_index: usize, score: f32, text: &str) -> RetrievedChunk {
        RetrievedChunk {
            score,
            filename: filename.to_string(),
            chunk_index,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_sentence_trimming() {
        assert_eq!(keep_first_sentences("A. B. C. D. E.", 3), "A. B. C.");
    }

    #[test]
    fn test_short_text_kept_unchanged() {
        assert_eq!(keep_first_sentences("A. B. C", 3), "A. B. C");
        assert_eq!(keep_first_sentences("No period here", 3), "No period here");
    }

    #[test]
    fn test_naive_boundaries_preserved() {
        // "Dr. Smith" splits, "3.14" does not
        assert_eq!(
            keep_first_sentences("See Dr. Smith. Take 3.14 mg. Rest. Drink water.", 2),
            "See Dr. Smith."
        );
    }

    #[test]
    fn test_clean_text() {
        assert_eq!(clean_text("  line one\r\nline   two\n\nend  "), "line one line two end");
        assert_eq!(clean_text("tabs\tstay"), "tabs\tstay");
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name("data/brochures/asthma.pdf"), "asthma.pdf");
        assert_eq!(display_name("flu.txt"), "flu.txt");
        assert_eq!(display_name(""), "unknown document");
    }

    #[test]
    fn test_truncation_before_sentence_trim() {
        let long = "x".repeat(2000);
        let options = AnswerOptions::default();
        let answer = answer_from_results("q", &[hit("a.txt", 0, 0.5, &long)], &options);
        let snippet = &answer.sources[0].snippet;
        // no ". " boundary, so the truncated text is kept as is
        assert_eq!(snippet.chars().count(), 600);
    }

    #[test]
    fn test_answer_structure() {
        let results = vec![
            hit("docs/diabetes.txt", 4, 0.9, "Diabetes affects blood sugar.\nEat well."),
            hit("flu.pdf", 0, 0.4, "Get vaccinated every year."),
        ];
        let answer = answer_from_results("What is diabetes?", &results, &AnswerOptions::default());

        let lines: Vec<&str> = answer.answer.lines().collect();
        assert_eq!(lines[0], ANSWER_INTRO);
        assert_eq!(lines[1], "");
        assert_eq!(
            lines[2],
            "- From **diabetes.txt**: Diabetes affects blood sugar. Eat well."
        );
        assert_eq!(lines[3], "- From **flu.pdf**: Get vaccinated every year.");
        assert_eq!(lines[4], "");
        assert_eq!(lines[5], ANSWER_DISCLAIMER);
        assert_eq!(lines.len(), 6);

        assert_eq!(answer.question, "What is diabetes?");
        assert_eq!(answer.sources.len(), 2);
        assert_eq!(answer.sources[0].filename, "diabetes.txt");
        assert_eq!(answer.sources[0].chunk_index, 4);
        assert!((answer.sources[0].score - 0.9).abs() < 1e-6);
        assert_eq!(answer.sources[1].snippet, "Get vaccinated every year.");
    }

    #[test]
    fn test_empty_index_answer() {
        let embedder = Embedder::new(HashingProvider::new(32));
        let answer = compose_answer("anything", &Index::empty(), &embedder, &AnswerOptions::default())
            .unwrap();
        assert!(answer.sources.is_empty());
        assert!(answer.answer.contains("could not find"));
    }

    #[test]
    fn test_compose_answer_end_to_end() {
        let docs = vec![
            Document::new("asthma.txt", "Asthma inflames the airways. Inhalers help breathing."),
            Document::new("diabetes.txt", "Diabetes raises blood sugar. Insulin lowers blood sugar."),
        ];
        let chunks = chunk_documents(&docs, 800, 200).unwrap();
        let embedder = Embedder::new(HashingProvider::new(256));
        let index = build_index(&chunks, &embedder).unwrap();

        let options = AnswerOptions {
            top_k: 1,
            ..Default::default()
        };
        let answer = compose_answer("blood sugar insulin", &index, &embedder, &options).unwrap();
        assert_eq!(answer.sources.len(), 1);
        assert_eq!(answer.sources[0].filename, "diabetes.txt");
        assert!(answer.answer.contains("- From **diabetes.txt**:"));
    }

    struct BrokenProvider;

    impl EmbeddingProvider for BrokenProvider {
        fn model_id(&self) -> &str {
            "broken"
        }

        fn embed_texts(&mut self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Err(RagError::Embedding("inference failed".to_string()))
        }
    }

    #[test]
    fn test_embedding_failure_propagates() {
        let matrix = crate::embedding::EmbeddingMatrix::from_rows(vec![vec![1.0]]).unwrap();
        let metadata = vec![crate::index::ChunkMetadata {
            filename: "a.txt".to_string(),
            chunk_index: 0,
            text: "text".to_string(),
        }];
        let index = Index::new(Some("broken".to_string()), matrix, metadata).unwrap();
        let embedder = Embedder::new(BrokenProvider);
        assert!(compose_answer("q", &index, &embedder, &AnswerOptions::default()).is_err());
    }
}
