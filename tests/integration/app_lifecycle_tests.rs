/*!
 * Integration tests for the application controller.
 *
 * Runs the controller against temporary directories and mock backends.
 */

use std::fs;
use std::sync::Arc;

use doctranslate::app_controller::{Controller, RunOutcome};
use doctranslate::errors::AppError;
use doctranslate::providers::mock::MockBackend;
use doctranslate::translation::GlossaryEntry;
use doctranslate::translation::document::{Block, JsonCodec};

use crate::common::{create_temp_dir, paragraph, read_document, sample_report, test_config, write_document};

fn controller(backend: &MockBackend) -> Controller {
    Controller::with_backend(test_config(), Arc::new(backend.clone()))
        .unwrap()
        .without_progress()
}

fn first_run_text(document: &doctranslate::translation::Document) -> String {
    match &document.blocks[0] {
        Block::Paragraph(paragraph) => paragraph.runs[0].text.clone(),
        _ => panic!("expected paragraph"),
    }
}

#[tokio::test]
async fn test_run_should_write_translated_document() {
    let temp_dir = create_temp_dir().unwrap();
    let input = write_document(temp_dir.path(), "report.json", &sample_report()).unwrap();
    let output_dir = temp_dir.path().join("out");
    let backend = MockBackend::working();

    let outcome = controller(&backend)
        .with_codec(Arc::new(JsonCodec::default()))
        .run(input, output_dir.clone(), false)
        .await
        .unwrap();

    let RunOutcome::Translated { output_path, report } = outcome else {
        panic!("expected a translation");
    };
    assert_eq!(output_path, output_dir.join("report.hi.json"));
    assert_eq!(report.fell_back, 0);

    let written = read_document(&output_path).unwrap();
    assert_eq!(written, report.document);
    assert_eq!(first_run_text(&written), "QUARTERLY REPORT");
}

#[tokio::test]
async fn test_run_with_existing_output_should_skip_unless_forced() {
    let temp_dir = create_temp_dir().unwrap();
    let input = write_document(
        temp_dir.path(),
        "memo.json",
        &doctranslate::translation::Document::new(vec![paragraph("hello")]),
    )
    .unwrap();
    let existing = temp_dir.path().join("memo.hi.json");
    fs::write(&existing, "previous").unwrap();
    let backend = MockBackend::working();
    let controller = controller(&backend);

    let outcome = controller
        .run(input.clone(), temp_dir.path().to_path_buf(), false)
        .await
        .unwrap();
    assert!(matches!(outcome, RunOutcome::Skipped { .. }));
    assert_eq!(fs::read_to_string(&existing).unwrap(), "previous");
    assert_eq!(backend.call_count(), 0);

    let outcome = controller
        .run(input, temp_dir.path().to_path_buf(), true)
        .await
        .unwrap();
    assert!(matches!(outcome, RunOutcome::Translated { .. }));
    assert_eq!(first_run_text(&read_document(&existing).unwrap()), "HELLO");
}

#[tokio::test]
async fn test_run_with_undecodable_input_should_fail_before_backend_call() {
    let temp_dir = create_temp_dir().unwrap();
    let input = temp_dir.path().join("broken.json");
    fs::write(&input, "{ not json").unwrap();
    let backend = MockBackend::working();

    let error = controller(&backend)
        .run(input, temp_dir.path().to_path_buf(), false)
        .await
        .unwrap_err();

    assert_eq!(AppError::from(error).exit_code(), 3);
    assert_eq!(backend.call_count(), 0);
    assert!(!temp_dir.path().join("broken.hi.json").exists());
}

#[tokio::test]
async fn test_run_with_failing_backend_should_still_write_output() {
    let temp_dir = create_temp_dir().unwrap();
    let document = sample_report();
    let input = write_document(temp_dir.path(), "report.json", &document).unwrap();
    let backend = MockBackend::failing();

    let outcome = controller(&backend)
        .run(input, temp_dir.path().to_path_buf(), false)
        .await
        .unwrap();

    let RunOutcome::Translated { output_path, report } = outcome else {
        panic!("expected a translation");
    };
    assert!(report.is_degraded());
    assert_eq!(read_document(&output_path).unwrap(), document);
}

#[tokio::test]
async fn test_run_should_apply_configured_glossary() {
    let temp_dir = create_temp_dir().unwrap();
    let input = write_document(
        temp_dir.path(),
        "npv.json",
        &doctranslate::translation::Document::new(vec![paragraph("The NPV is high")]),
    )
    .unwrap();
    let mut config = test_config();
    config.glossary = vec![GlossaryEntry::exact("NPV")];
    let backend = MockBackend::working();

    let outcome = Controller::with_backend(config, Arc::new(backend.clone()))
        .unwrap()
        .without_progress()
        .run(input, temp_dir.path().to_path_buf(), false)
        .await
        .unwrap();

    let RunOutcome::Translated { report, .. } = outcome else {
        panic!("expected a translation");
    };
    assert_eq!(first_run_text(&report.document), "THE NPV IS HIGH");
}

#[tokio::test]
async fn test_run_with_unwritable_output_should_fail_with_save_error() {
    let temp_dir = create_temp_dir().unwrap();
    let input = write_document(
        temp_dir.path(),
        "memo.json",
        &doctranslate::translation::Document::new(vec![paragraph("hello")]),
    )
    .unwrap();
    // A directory where the output file should go
    let blocked = temp_dir.path().join("memo.hi.json");
    fs::create_dir(&blocked).unwrap();
    let backend = MockBackend::working();

    let error = controller(&backend)
        .run(input, temp_dir.path().to_path_buf(), true)
        .await
        .unwrap_err();

    assert_eq!(AppError::from(error).exit_code(), 4);
    assert!(blocked.is_dir());
    let mut names: Vec<String> = fs::read_dir(temp_dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    assert_eq!(names, vec!["memo.hi.json", "memo.json"]);
}

#[test]
fn test_uncompilable_glossary_should_fail_controller_creation() {
    let mut config = test_config();
    config.glossary = vec![GlossaryEntry::case_insensitive("k".repeat(200_000))];

    let result = Controller::with_backend(config, Arc::new(MockBackend::working()));

    let Err(error) = result else {
        panic!("expected the glossary to be rejected");
    };
    assert!(format!("{:#}", error).contains("Invalid glossary term"));
}

#[tokio::test]
async fn test_run_folder_should_translate_each_document_once() {
    let temp_dir = create_temp_dir().unwrap();
    let nested = temp_dir.path().join("nested");
    fs::create_dir_all(&nested).unwrap();
    write_document(temp_dir.path(), "a.json", &sample_report()).unwrap();
    write_document(&nested, "b.json", &sample_report()).unwrap();
    fs::write(temp_dir.path().join("broken.json"), "oops").unwrap();
    let backend = MockBackend::working();
    let controller = controller(&backend);

    let summary = controller
        .run_folder(temp_dir.path().to_path_buf(), false)
        .await
        .unwrap();
    assert_eq!(summary.processed, 2);
    assert_eq!(summary.errors, 1);
    assert_eq!(summary.skipped, 0);
    assert!(temp_dir.path().join("a.hi.json").exists());
    assert!(nested.join("b.hi.json").exists());
    assert!(temp_dir.path().join("doctranslate.log").exists());

    // Second pass: outputs exist and are not picked up as inputs
    let summary = controller
        .run_folder(temp_dir.path().to_path_buf(), false)
        .await
        .unwrap();
    assert_eq!(summary.processed, 0);
    assert_eq!(summary.skipped, 2);
    assert_eq!(summary.errors, 1);
}

#[tokio::test]
async fn test_run_folder_should_share_cache_between_documents() {
    let temp_dir = create_temp_dir().unwrap();
    write_document(temp_dir.path(), "a.json", &sample_report()).unwrap();
    write_document(temp_dir.path(), "b.json", &sample_report()).unwrap();
    let backend = MockBackend::working();

    controller(&backend)
        .run_folder(temp_dir.path().to_path_buf(), false)
        .await
        .unwrap();

    // The second document is served entirely from the cache
    assert_eq!(backend.call_count(), 1);
}
