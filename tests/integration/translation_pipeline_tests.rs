/*!
 * Integration tests for the full translation pipeline.
 *
 * Exercises walk, dispatch and rebuild together against mock backends.
 */

use std::sync::Arc;

use doctranslate::providers::mock::{MockBackend, MockBehavior};
use doctranslate::translation::document::{
    Alignment, Block, Cell, Document, Formatting, Paragraph, Row, Run, Table,
};
use doctranslate::translation::walker::walk;
use doctranslate::translation::{
    Glossary, GlossaryEntry, NoProgress, PipelineConfig, TranslationPipeline,
};

use crate::common::{RecordingProgress, init_test_logging, instant_retry, paragraph, sample_report};

fn pipeline(backend: &MockBackend) -> TranslationPipeline {
    TranslationPipeline::new(PipelineConfig::new("en", "hi"), Arc::new(backend.clone()))
        .with_retry(instant_retry(2))
}

fn run_texts(document: &Document) -> Vec<String> {
    document
        .paragraphs()
        .flat_map(|paragraph| paragraph.runs.iter().map(|run| run.text.clone()))
        .collect()
}

fn cell_texts(document: &Document) -> Vec<String> {
    document
        .tables()
        .flat_map(|table| table.rows.iter())
        .flat_map(|row| row.cells.iter().map(|cell| cell.text.clone()))
        .collect()
}

fn formattings(document: &Document) -> Vec<Formatting> {
    document
        .paragraphs()
        .flat_map(|paragraph| paragraph.runs.iter().map(|run| run.formatting.clone()))
        .collect()
}

fn table_shape(document: &Document) -> Vec<Vec<usize>> {
    document
        .tables()
        .map(|table| table.rows.iter().map(|row| row.cells.len()).collect())
        .collect()
}

#[tokio::test]
async fn test_echo_backend_should_reproduce_document() {
    let backend = MockBackend::echo();
    let document = sample_report();

    let report = pipeline(&backend)
        .translate_document(&document, &NoProgress)
        .await
        .unwrap();

    assert_eq!(report.document, document);
    assert!(!report.is_degraded());
}

#[tokio::test]
async fn test_translation_should_preserve_structure_and_formatting() {
    let backend = MockBackend::working();
    let document = sample_report();

    let report = pipeline(&backend)
        .translate_document(&document, &NoProgress)
        .await
        .unwrap();
    let output = &report.document;

    assert_eq!(output.block_count(), document.block_count());
    assert_eq!(table_shape(output), table_shape(&document));
    assert_eq!(formattings(output), formattings(&document));
    assert_eq!(
        output.paragraphs().map(|p| p.alignment).collect::<Vec<_>>(),
        document.paragraphs().map(|p| p.alignment).collect::<Vec<_>>()
    );
    assert_eq!(walk(output).count(), walk(&document).count());
    assert_eq!(output.blocks[3], document.blocks[3]);
}

#[tokio::test]
async fn test_blank_spans_should_never_reach_backend() {
    let backend = MockBackend::working();
    let document = Document::new(vec![
        Block::Paragraph(Paragraph::new(vec![Run::new("Hello"), Run::new("  "), Run::new("")])),
        Block::Table(Table::from_texts(vec![vec!["", "\t", "Total"]])),
    ]);

    let report = pipeline(&backend)
        .translate_document(&document, &NoProgress)
        .await
        .unwrap();

    let received = backend.received_texts();
    assert_eq!(received, vec!["Hello", "Total"]);
    assert!(received.iter().all(|text| !text.trim().is_empty()));
    assert_eq!(run_texts(&report.document), vec!["HELLO", "  ", ""]);
    assert_eq!(cell_texts(&report.document), vec!["", "\t", "TOTAL"]);
}

#[tokio::test]
async fn test_failing_backend_should_keep_source_text() {
    init_test_logging();
    let backend = MockBackend::failing();
    let document = sample_report();

    let report = pipeline(&backend)
        .translate_document(&document, &NoProgress)
        .await
        .unwrap();

    assert_eq!(report.document, document);
    assert_eq!(report.succeeded, 0);
    assert_eq!(report.fell_back, report.total_units);
    assert!(report.is_degraded());
}

#[tokio::test]
async fn test_failing_span_should_not_affect_its_neighbours() {
    let backend = MockBackend::new(MockBehavior::FailWhenContains("poison".to_string()));
    let document = Document::new(vec![
        paragraph("first"),
        paragraph("poison pill"),
        paragraph("last"),
    ]);

    let report = pipeline(&backend)
        .translate_document(&document, &NoProgress)
        .await
        .unwrap();

    assert_eq!(run_texts(&report.document), vec!["FIRST", "poison pill", "LAST"]);
    assert_eq!(report.fell_back, 1);
}

#[tokio::test]
async fn test_glossary_term_should_survive_translation() {
    let backend = MockBackend::working();
    let document = Document::new(vec![paragraph("The NPV is high")]);

    let report = pipeline(&backend)
        .with_glossary(Glossary::new(vec![GlossaryEntry::exact("NPV")]).unwrap())
        .translate_document(&document, &NoProgress)
        .await
        .unwrap();

    assert_eq!(run_texts(&report.document), vec!["THE NPV IS HIGH"]);
    assert!(backend.received_texts().iter().all(|text| !text.contains("NPV")));
}

#[tokio::test]
async fn test_glossary_only_span_should_not_reach_backend() {
    let backend = MockBackend::working();
    let document = Document::new(vec![paragraph("NPV"), paragraph("growth")]);

    let report = pipeline(&backend)
        .with_glossary(Glossary::new(vec![GlossaryEntry::exact("NPV")]).unwrap())
        .translate_document(&document, &NoProgress)
        .await
        .unwrap();

    assert_eq!(run_texts(&report.document), vec!["NPV", "GROWTH"]);
    assert_eq!(backend.received_texts(), vec!["growth"]);
}

#[tokio::test]
async fn test_single_formatted_run_should_keep_its_formatting() {
    let backend = MockBackend::working();
    let formatting = Formatting::bold().with_font("Arial", 12.0);
    let document = Document::new(vec![Block::Paragraph(
        Paragraph::new(vec![Run::formatted("Hello World", formatting.clone())])
            .with_alignment(Alignment::Right),
    )]);

    let report = pipeline(&backend)
        .translate_document(&document, &NoProgress)
        .await
        .unwrap();

    let Block::Paragraph(output) = &report.document.blocks[0] else {
        panic!("expected paragraph");
    };
    assert_eq!(output.runs.len(), 1);
    assert_eq!(output.runs[0].text, "HELLO WORLD");
    assert_eq!(output.runs[0].formatting, formatting);
    assert_eq!(output.alignment, Some(Alignment::Right));
}

#[tokio::test]
async fn test_empty_cell_should_stay_empty() {
    let backend = MockBackend::working();
    let document = Document::new(vec![Block::Table(Table {
        rows: vec![Row {
            cells: vec![Cell::new(""), Cell::new("Total")],
        }],
    })]);

    let report = pipeline(&backend)
        .translate_document(&document, &NoProgress)
        .await
        .unwrap();

    assert_eq!(cell_texts(&report.document), vec!["", "TOTAL"]);
}

#[tokio::test]
async fn test_output_should_not_depend_on_concurrency() {
    let texts: Vec<String> = (0..40).map(|i| format!("Line number {}", i)).collect();
    let document = Document::new(texts.iter().map(|text| paragraph(text)).collect());

    let mut outputs = Vec::new();
    for concurrency in [1, 8] {
        let backend = MockBackend::new(MockBehavior::Slow { delay_ms: 2 })
            .with_transform(doctranslate::providers::mock::MockTransform::Suffix("[hi]".to_string()));
        let config = PipelineConfig::new("en", "hi")
            .with_batch_size(3)
            .with_concurrency(concurrency);
        let report = TranslationPipeline::new(config, Arc::new(backend))
            .translate_document(&document, &NoProgress)
            .await
            .unwrap();
        outputs.push(report.document);
    }

    assert_eq!(outputs[0], outputs[1]);
    assert_eq!(run_texts(&outputs[0])[7], "Line number 7[hi]");
}

#[tokio::test]
async fn test_progress_should_be_monotonic_and_complete() {
    let backend = MockBackend::new(MockBehavior::Slow { delay_ms: 1 });
    let texts: Vec<String> = (0..25).map(|i| format!("Entry {}", i)).collect();
    let document = Document::new(texts.iter().map(|text| paragraph(text)).collect());
    let progress = RecordingProgress::default();

    let config = PipelineConfig::new("en", "hi")
        .with_batch_size(4)
        .with_concurrency(4);
    TranslationPipeline::new(config, Arc::new(backend))
        .translate_document(&document, &progress)
        .await
        .unwrap();

    let counts = progress.counts.lock().clone();
    assert_eq!(*progress.total.lock(), Some(25));
    assert!(counts.windows(2).all(|pair| pair[0] <= pair[1]));
    assert_eq!(counts.last().copied(), Some(25));
    assert!(*progress.finished.lock());
}

#[tokio::test]
async fn test_transient_failures_should_be_retried() {
    let backend = MockBackend::new(MockBehavior::FailFirst {
        failures: 2,
        retryable: true,
    });
    let document = Document::new(vec![paragraph("retry me")]);

    let report = pipeline(&backend)
        .translate_document(&document, &NoProgress)
        .await
        .unwrap();

    assert_eq!(run_texts(&report.document), vec!["RETRY ME"]);
    assert_eq!(backend.call_count(), 3);
}

#[tokio::test]
async fn test_short_batch_reply_should_fall_back_per_unit() {
    let backend = MockBackend::new(MockBehavior::DropLast);
    let document = Document::new(vec![paragraph("one"), paragraph("two")]);

    let report = pipeline(&backend)
        .translate_document(&document, &NoProgress)
        .await
        .unwrap();

    // Individual retries cannot help either: a one-span call returns nothing
    assert_eq!(run_texts(&report.document), vec!["one", "two"]);
    assert_eq!(report.fell_back, 2);
}
