// SPDX-License-Identifier: MIT OR Apache-2.0

use brochure_rag::answer::{compose_answer, AnswerOptions, NO_RESULTS_ANSWER};
use brochure_rag::embedding::{chunk_documents, Document, Embedder, HashingProvider};
use brochure_rag::index::{build_index, IndexStore};
use brochure_rag::ingest::load_directory;
use brochure_rag::retrieval::retrieve_top_k;
use std::fs;
use tempfile::TempDir;

fn diabetes_text() -> String {
    let paragraph = "Diabetes is a condition where blood sugar levels stay too high. \
Regular exercise and a balanced diet help keep glucose under control. \
Check your feet daily and see your doctor for regular eye exams. ";
    paragraph.repeat(20)
}

fn embedder() -> Embedder {
    Embedder::new(HashingProvider::new(256))
}

#[test]
fn diabetes_brochure_chunks_in_order() {
    let docs = vec![Document::new("diabetes.txt", diabetes_text())];
    let chunked = chunk_documents(&docs, 800, 200).expect("valid chunking");
    let index = build_index(&chunked, &embedder()).expect("build index");

    assert!(index.len() > 1);
    assert_eq!(index.embeddings().rows(), index.metadata().len());
    let mut previous = None;
    for meta in index.metadata() {
        assert_eq!(meta.filename, "diabetes.txt");
        assert!(meta.text.chars().count() <= 800);
        if let Some(prev) = previous {
            assert!(meta.chunk_index > prev);
        }
        previous = Some(meta.chunk_index);
    }
    assert_eq!(index.metadata()[0].chunk_index, 0);
}

#[test]
fn saved_index_answers_like_the_original() {
    let dir = TempDir::new().expect("tempdir");
    let embedder = embedder();
    let docs = vec![
        Document::new("diabetes.txt", diabetes_text()),
        Document::new(
            "flu.txt",
            "Influenza spreads through coughs and sneezes. Get a flu shot every autumn. \
Stay home when you have a fever.",
        ),
    ];
    let index = build_index(&chunk_documents(&docs, 800, 200).unwrap(), &embedder).unwrap();

    let store = IndexStore::open(dir.path().join("vector_store"));
    store.save(&index).expect("save");
    let loaded = store.load().expect("load");

    assert_eq!(loaded.metadata(), index.metadata());
    assert_eq!(loaded.embeddings().as_slice(), index.embeddings().as_slice());
    assert_eq!(loaded.model_id(), Some(embedder.model_id()));

    let before = retrieve_top_k("flu shot fever", &index, 3, &embedder).unwrap();
    let after = retrieve_top_k("flu shot fever", &loaded, 3, &embedder).unwrap();
    assert_eq!(before, after);
    assert!(before.len() <= 3);
    for pair in before.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
}

#[test]
fn empty_corpus_builds_empty_index() {
    let dir = TempDir::new().expect("tempdir");
    let docs_dir = dir.path().join("brochures");
    fs::create_dir_all(&docs_dir).unwrap();

    let documents = load_directory(&docs_dir).expect("load empty folder");
    assert!(documents.is_empty());

    let embedder = embedder();
    let index = build_index(&chunk_documents(&documents, 800, 200).unwrap(), &embedder).unwrap();
    assert!(index.is_empty());

    let answer = compose_answer("diabetes", &index, &embedder, &AnswerOptions::default()).unwrap();
    assert_eq!(answer.answer, NO_RESULTS_ANSWER);
    assert!(answer.sources.is_empty());
}

#[test]
fn directory_documents_are_keyed_by_file_name() {
    let dir = TempDir::new().expect("tempdir");
    fs::write(dir.path().join("b.txt"), "Wash your hands often.").unwrap();
    fs::write(dir.path().join("a.TXT"), "Sleep at least seven hours.").unwrap();
    fs::write(dir.path().join("notes.md"), "ignored").unwrap();

    let documents = load_directory(dir.path()).unwrap();
    let names: Vec<&str> = documents.iter().map(|d| d.filename.as_str()).collect();
    assert_eq!(names, vec!["a.TXT", "b.txt"]);
}

#[test]
fn loading_missing_index_fails() {
    let dir = TempDir::new().expect("tempdir");
    let err = IndexStore::open(dir.path().join("nope")).load().unwrap_err();
    assert!(err.to_string().contains("not found"));
}
