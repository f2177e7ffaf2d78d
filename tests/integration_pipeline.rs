#![expect(
    clippy::tests_outside_test_module,
    reason = "integration tests are only compiled in test mode"
)]

// End-to-end runs over the offline hashing embedder

use mando::MandoError;
use mando::answer::{AnswerSelection, AnswerStrategy, LexicalScorer, select_best_answer};
use mando::chunking::ChunkingConfig;
use mando::commands::{Sources, answer_question, build_indexer, ingest_sources};
use mando::config::{Config, EmbedderKind, RetrievalConfig};
use mando::embeddings::{HashingEmbedder, embedder_from_config};
use std::io::{Cursor, Write};
use tempfile::TempDir;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

fn offline_config() -> Config {
    Config {
        embedder: EmbedderKind::Hashing,
        chunking: ChunkingConfig::new(12, 3).expect("valid chunking"),
        ..Config::default()
    }
}

fn docx_with_paragraphs(paragraphs: &[&str]) -> Vec<u8> {
    let body = paragraphs
        .iter()
        .map(|p| format!("<w:p><w:r><w:t>{}</w:t></w:r></w:p>", p))
        .collect::<String>();
    let xml = format!(
        r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}</w:body></w:document>"#,
        body
    );

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    writer
        .start_file("word/document.xml", SimpleFileOptions::default())
        .expect("start entry");
    writer.write_all(xml.as_bytes()).expect("write entry");
    writer.finish().expect("finish zip").into_inner()
}

#[test]
fn files_to_answer() {
    let temp_dir = TempDir::new().expect("should create TempDir successfully");
    let notes = temp_dir.path().join("geography.txt");
    let report = temp_dir.path().join("cooking.docx");
    let table = temp_dir.path().join("rivers.csv");

    std::fs::write(
        &notes,
        "Paris is the capital of France. Berlin is the capital of Germany. \
         Madrid is the capital of Spain.",
    )
    .expect("write notes");
    std::fs::write(
        &report,
        docx_with_paragraphs(&[
            "Sourdough bread needs a lively starter.",
            "Proof the dough overnight in a cool kitchen.",
        ]),
    )
    .expect("write docx");
    std::fs::write(&table, "river,country\nSeine,France\nDanube,Austria\n").expect("write csv");

    let config = offline_config();
    let sources = Sources {
        files: vec![notes, report, table],
        url: None,
    };

    let corpus = ingest_sources(&sources, &config).expect("ingest succeeds");
    assert_eq!(corpus.document_count(), 3);
    assert!(corpus.text().contains("Proof the dough overnight"));
    assert!(corpus.text().contains("Seine,France"));

    let embedder = embedder_from_config(&config).expect("hashing embedder");
    let indexer = build_indexer(embedder, &config, &corpus).expect("index builds");
    assert_eq!(indexer.dimension(), Some(384));

    for strategy in [AnswerStrategy::Concatenate, AnswerStrategy::PerChunk] {
        let retrieval = RetrievalConfig {
            top_k: 3,
            strategy,
            generate: false,
        };
        let answer = answer_question(
            &indexer,
            &LexicalScorer::new(),
            None,
            "Which starter does sourdough bread need?",
            &retrieval,
        )
        .expect("question answered");

        let candidate = answer.extractive.candidate().expect("answer found");
        assert_eq!(
            candidate.answer, "Sourdough bread needs a lively starter.",
            "strategy {strategy}"
        );
    }
}

#[test]
fn retrieval_orders_by_distance() {
    let config = offline_config();
    let mut corpus = mando::ingest::Corpus::new();
    corpus.add_document(
        "Rust programs are compiled ahead of time. The borrow checker rejects data races. \
         Cargo builds crates and runs tests. Tea is brewed from dried leaves. \
         Green tea is steeped at lower temperatures than black tea.",
    );

    let indexer =
        build_indexer(HashingEmbedder::default(), &config, &corpus).expect("index builds");
    let total = indexer.chunk_count();

    let hits = indexer.query("green tea temperatures", total).expect("query");
    assert_eq!(hits.len(), total);
    assert!(hits[0].text.contains("tea"));
    for pair in hits.windows(2) {
        assert!(pair[0].distance <= pair[1].distance);
    }

    // Every chunk is its own nearest neighbour
    for chunk in indexer.chunks() {
        let nearest = indexer.query(&chunk.text, 1).expect("query");
        assert_eq!(nearest[0].position, chunk.position);
        assert!(nearest[0].distance < 1e-6);
    }
}

#[test]
fn error_markers_are_indexed_as_text() {
    let config = offline_config();
    let temp_dir = TempDir::new().expect("should create TempDir successfully");
    let broken = temp_dir.path().join("broken.docx");
    std::fs::write(&broken, b"this is not a zip archive").expect("write file");

    let corpus = ingest_sources(
        &Sources {
            files: vec![broken],
            url: None,
        },
        &config,
    )
    .expect("a bad file does not abort ingestion");
    assert!(corpus.text().contains("[DOCX Error]"));

    let indexer =
        build_indexer(HashingEmbedder::default(), &config, &corpus).expect("index builds");
    assert!(indexer.chunk_count() >= 1);
}

#[test]
fn invalid_chunking_is_a_configuration_error() {
    let mut config = offline_config();
    config.chunking = ChunkingConfig {
        chunk_size: 4,
        overlap: 4,
    };
    let mut corpus = mando::ingest::Corpus::new();
    corpus.add_document("some text");

    let result = build_indexer(HashingEmbedder::default(), &config, &corpus);
    assert!(matches!(result, Err(MandoError::Configuration(_))));
}

#[test]
fn capital_of_france_selection() {
    let chunks = ["Paris is the capital of France.", "Unrelated text."];
    let selection = select_best_answer(
        &LexicalScorer::new(),
        "What is the capital of France?",
        &chunks,
    );
    assert!(matches!(
        selection,
        AnswerSelection::Answer(ref c) if c.answer == "Paris is the capital of France."
    ));
}
