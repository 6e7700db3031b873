//! Output and color utilities for consistent terminal formatting
//!
//! Provides shared color functions respecting NO_COLOR environment variable.

use colored::Colorize;
use std::fmt::Write as _;

use crate::answer::{Answer, Source};

/// Check if colors should be used (respects NO_COLOR env var)
pub fn use_colors() -> bool {
    std::env::var("NO_COLOR").is_err()
}

/// Colorize file name (cyan)
pub fn colorize_path(text: &str, use_color: bool) -> String {
    if use_color {
        text.cyan().to_string()
    } else {
        text.to_string()
    }
}

/// Colorize similarity score (yellow), always 3 decimals
pub fn colorize_score(score: f32, use_color: bool) -> String {
    let text = format!("{:.3}", score);
    if use_color {
        text.yellow().to_string()
    } else {
        text
    }
}

/// Colorize headings (bold)
pub fn colorize_heading(text: &str, use_color: bool) -> String {
    if use_color {
        text.bold().to_string()
    } else {
        text.to_string()
    }
}

/// Colorize secondary text (dimmed)
pub fn colorize_dim(text: &str, use_color: bool) -> String {
    if use_color {
        text.dimmed().to_string()
    } else {
        text.to_string()
    }
}

/// Renders one source entry.
pub fn render_source(position: usize, source: &Source, use_color: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} {}",
        colorize_heading(&format!("Source {}:", position), use_color),
        colorize_path(&source.filename, use_color)
    );
    let _ = writeln!(out, "  Score: {}", colorize_score(source.score, use_color));
    let _ = writeln!(out, "  Chunk index: {}", source.chunk_index);
    let _ = writeln!(out, "  {}", colorize_dim(&source.snippet, use_color));
    out
}

/// Renders the answer text followed by its sources panel.
pub fn render_answer(answer: &Answer, use_color: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", answer.answer);
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", colorize_heading("Sources", use_color));
    if answer.sources.is_empty() {
        let _ = writeln!(out, "No sources found.");
    } else {
        for (i, source) in answer.sources.iter().enumerate() {
            out.push_str(&render_source(i + 1, source, use_color));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answer(sources: Vec<Source>) -> Answer {
        Answer {
            question: "q".to_string(),
            answer: "body".to_string(),
            sources,
        }
    }

    #[test]
    fn test_score_three_decimals() {
        assert_eq!(colorize_score(0.123456, false), "0.123");
        assert_eq!(colorize_score(1.0, false), "1.000");
    }

    #[test]
    fn test_render_sources() {
        let rendered = render_answer(
            &answer(vec![Source {
                filename: "flu.txt".to_string(),
                score: 0.87654,
                chunk_index: 2,
                snippet: "Rest and drink fluids.".to_string(),
            }]),
            false,
        );
        assert!(rendered.starts_with("body\n"));
        assert!(rendered.contains("Source 1: flu.txt"));
        assert!(rendered.contains("Score: 0.877"));
        assert!(rendered.contains("Chunk index: 2"));
        assert!(rendered.contains("Rest and drink fluids."));
    }

    #[test]
    fn test_render_without_sources() {
        let rendered = render_answer(&answer(Vec::new()), false);
        assert!(rendered.contains("No sources found."));
    }
}
