// SPDX-License-Identifier: MIT OR Apache-2.0

//! Document discovery and text extraction.
//!
//! PDF pages are extracted in page order with lopdf; text files are decoded as
//! UTF-8 with invalid bytes replaced. Files with other extensions produce no
//! text. A document that fails to parse is logged and skipped so the rest of
//! the batch still gets indexed.

use rayon::prelude::*;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::embedding::Document;
use crate::errors::{RagError, Result};

/// Default folder holding the brochures, relative to the working directory.
pub const DEFAULT_DOCUMENTS_DIR: &str = "data/brochures";

/// Extensions picked up from the documents folder.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["pdf", "txt"];

/// Raw bytes of a file, tagged with its name.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl SourceFile {
    pub fn new(filename: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            bytes: bytes.into(),
        }
    }
}

/// Lower-cased extension of `filename`, if any.
fn extension(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
}

/// Extracts plain text from a single file, dispatching on its extension.
pub fn extract_text(filename: &str, bytes: &[u8]) -> Result<String> {
    match extension(filename).as_deref() {
        Some("pdf") => extract_pdf_text(filename, bytes),
        Some("txt") => Ok(String::from_utf8_lossy(bytes).into_owned()),
        _ => {
            tracing::debug!(file = filename, "unsupported extension; no text extracted");
            Ok(String::new())
        }
    }
}

/// Joins the text of every page, in page order, with newlines.
///
/// A page whose text cannot be extracted contributes an empty string.
pub fn extract_pdf_text(filename: &str, bytes: &[u8]) -> Result<String> {
    let doc = lopdf::Document::load_mem(bytes).map_err(|e| RagError::Extraction {
        filename: filename.to_string(),
        message: e.to_string(),
    })?;

    let pages: Vec<String> = doc
        .get_pages()
        .keys()
        .map(|&page| match doc.extract_text(&[page]) {
            Ok(text) => text,
            Err(e) => {
                tracing::debug!(file = filename, page, error = %e, "page has no extractable text");
                String::new()
            }
        })
        .collect();

    Ok(pages.join("\n"))
}

/// Extracts every file, returning documents in input order.
///
/// Files that fail to parse are logged and left out.
pub fn extract_documents(files: &[SourceFile]) -> Vec<Document> {
    files
        .par_iter()
        .map(|file| (file, extract_text(&file.filename, &file.bytes)))
        .collect::<Vec<_>>()
        .into_iter()
        .filter_map(|(file, result)| match result {
            Ok(text) => Some(Document::new(file.filename.clone(), text)),
            Err(e) => {
                tracing::warn!(file = %file.filename, error = %e, "skipping document");
                None
            }
        })
        .collect()
}

/// Lists `.pdf` and `.txt` files directly inside `dir`, sorted by name.
pub fn list_documents<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(RagError::config(format!(
            "document folder {} does not exist",
            dir.display()
        )));
    }

    let files: Vec<PathBuf> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .and_then(extension)
                .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str()))
        })
        .collect();
    Ok(files)
}

/// Reads and extracts every supported document in `dir`.
///
/// Documents are keyed by file name. Unreadable files are skipped like
/// unparsable ones.
pub fn load_directory<P: AsRef<Path>>(dir: P) -> Result<Vec<Document>> {
    let paths = list_documents(dir)?;
    let files: Vec<SourceFile> = paths
        .iter()
        .filter_map(|path| {
            let name = path.file_name()?.to_string_lossy().into_owned();
            match std::fs::read(path) {
                Ok(bytes) => Some(SourceFile::new(name, bytes)),
                Err(e) => {
                    tracing::warn!(file = %path.display(), error = %e, "skipping unreadable document");
                    None
                }
            }
        })
        .collect();

    let documents = extract_documents(&files);
    tracing::info!(found = paths.len(), extracted = documents.len(), "loaded documents");
    Ok(documents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_txt_extraction_is_verbatim() {
        let text = extract_text("notes.TXT", "Line one\nLine two  \n".as_bytes()).unwrap();
        assert_eq!(text, "Line one\nLine two  \n");
    }

    #[test]
    fn test_txt_tolerates_invalid_utf8() {
        let text = extract_text("bad.txt", &[b'o', b'k', 0xff, b'!']).unwrap();
        assert!(text.starts_with("ok"));
        assert!(text.ends_with('!'));
    }

    #[test]
    fn test_unknown_extension_is_empty() {
        assert_eq!(extract_text("slides.docx", b"content").unwrap(), "");
        assert_eq!(extract_text("README", b"content").unwrap(), "");
    }

    #[test]
    fn test_broken_pdf_is_extraction_error() {
        let err = extract_text("broken.pdf", b"not a pdf").unwrap_err();
        assert!(matches!(err, RagError::Extraction { .. }));
    }

    #[test]
    fn test_failed_document_does_not_abort_batch() {
        let files = vec![
            SourceFile::new("a.txt", "alpha"),
            SourceFile::new("broken.pdf", "garbage"),
            SourceFile::new("c.txt", "gamma"),
        ];
        let docs = extract_documents(&files);
        let names: Vec<&str> = docs.iter().map(|d| d.filename.as_str()).collect();
        assert_eq!(names, vec!["a.txt", "c.txt"]);
        assert_eq!(docs[1].text, "gamma");
    }

    #[test]
    fn test_list_documents_filters_extensions() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("b.txt"), "b").unwrap();
        fs::write(dir.path().join("A.PDF"), "a").unwrap();
        fs::write(dir.path().join("image.png"), "x").unwrap();
        fs::create_dir(dir.path().join("nested.txt")).unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub").join("deep.txt"), "d").unwrap();

        let names: Vec<String> = list_documents(dir.path())
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["A.PDF", "b.txt"]);
    }

    #[test]
    fn test_missing_directory_is_error() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            list_documents(dir.path().join("missing")),
            Err(RagError::Configuration(_))
        ));
    }

    #[test]
    fn test_load_directory_skips_bad_files() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("flu.txt"), "Flu spreads in winter.").unwrap();
        fs::write(dir.path().join("scan.pdf"), "%PDF-broken").unwrap();

        let docs = load_directory(dir.path()).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].filename, "flu.txt");
        assert_eq!(docs[0].text, "Flu spreads in winter.");
    }
}
