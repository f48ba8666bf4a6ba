/*!
 * Common test utilities for the doctranslate test suite
 */

use anyhow::Result;
use parking_lot::Mutex;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;

use doctranslate::app_config::Config;
use doctranslate::translation::document::{
    Alignment, Block, Document, Formatting, JsonCodec, OpaqueBlock, Paragraph, Run, Table,
};
use doctranslate::translation::{BackoffStrategy, DocumentCodec, ProgressReporter, RetryController, RetryPolicy};

/// Routes library logs through env_logger; safe to call from every test
pub fn init_test_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Writes `document` as JSON into `dir`
pub fn write_document(dir: &Path, filename: &str, document: &Document) -> Result<PathBuf> {
    let path = dir.join(filename);
    let bytes = JsonCodec::pretty().encode(document)?;
    fs::write(&path, bytes)?;
    Ok(path)
}

/// Reads a JSON document back from disk
pub fn read_document(path: &Path) -> Result<Document> {
    let bytes = fs::read(path)?;
    JsonCodec::default().decode(&bytes)
}

/// A single-run paragraph
pub fn paragraph(text: &str) -> Block {
    Block::Paragraph(Paragraph::new(vec![Run::new(text)]))
}

/// A small report: a heading, a mixed-format paragraph, a table and an image
pub fn sample_report() -> Document {
    Document::new(vec![
        Block::Paragraph(
            Paragraph::new(vec![Run::formatted(
                "Quarterly Report",
                Formatting::bold().with_font("Arial", 18.0),
            )])
            .with_alignment(Alignment::Center),
        ),
        Block::Paragraph(Paragraph::new(vec![
            Run::new("Revenue grew "),
            Run::formatted("strongly", Formatting::italic().with_underline(true)),
            Run::new(" this quarter."),
        ])),
        Block::Table(Table::from_texts(vec![
            vec!["Region", "Revenue"],
            vec!["North", "Up"],
            vec!["", "Total"],
        ])),
        Block::Opaque(OpaqueBlock::new(
            "drawing",
            serde_json::json!({"src": "chart.png", "width": 400}),
        )),
        paragraph("   "),
    ])
}

/// A retry controller that never sleeps
pub fn instant_retry(max_retries: u32) -> RetryController {
    RetryController::new(RetryPolicy::new(
        max_retries,
        Duration::ZERO,
        BackoffStrategy::None,
    ))
}

/// Default configuration tuned for fast tests
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.source_language = "en".to_string();
    config.target_language = "hi".to_string();
    config.translation.common.retry_delay_ms = 0;
    config.translation.common.backoff = BackoffStrategy::None;
    config
}

/// Progress reporter that records every call
#[derive(Default)]
pub struct RecordingProgress {
    pub total: Mutex<Option<usize>>,
    pub counts: Mutex<Vec<usize>>,
    pub finished: Mutex<bool>,
}

impl ProgressReporter for RecordingProgress {
    fn start(&self, total: usize) {
        *self.total.lock() = Some(total);
    }

    fn advance(&self, completed: usize) {
        self.counts.lock().push(completed);
    }

    fn finish(&self) {
        *self.finished.lock() = true;
    }
}
