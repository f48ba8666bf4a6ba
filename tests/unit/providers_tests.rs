/*!
 * Tests for backend construction and the dictionary backend
 */

use std::collections::HashMap;
use std::fs;

use doctranslate::app_config::{BackendKind, Config};
use doctranslate::providers::create_backend;
use doctranslate::providers::dictionary::DictionaryBackend;
use doctranslate::providers::mock::{MockBackend, MockBehavior};
use doctranslate::providers::TranslationBackend;

use crate::common::{create_temp_dir, init_test_logging};

fn texts(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_dictionary_backend_should_translate_in_order() {
    init_test_logging();
    let map = HashMap::from([
        ("hello".to_string(), "bonjour".to_string()),
        ("world".to_string(), "monde".to_string()),
        ("total".to_string(), "somme".to_string()),
    ]);
    let backend = DictionaryBackend::from_map(map).unwrap();

    let result = tokio_test::block_on(backend.translate(
        &texts(&["Total", "Hello World", "unknown words"]),
        "en",
        "fr",
    ))
    .unwrap();

    assert_eq!(result, vec!["somme", "bonjour monde", "unknown words"]);
}

#[test]
fn test_create_backend_should_load_dictionary_file() {
    let temp_dir = create_temp_dir().unwrap();
    let path = temp_dir.path().join("dictionary.json");
    fs::write(&path, r#"{"revenue": "revenu"}"#).unwrap();

    let mut config = Config::default();
    config.translation.backend = BackendKind::Dictionary;
    config.translation.active_backend_config_mut().dictionary_path =
        path.to_string_lossy().to_string();

    let backend = create_backend(&config.translation).unwrap();
    assert_eq!(backend.name(), "dictionary");

    let result = tokio_test::block_on(backend.translate(&texts(&["Revenue"]), "en", "fr")).unwrap();
    assert_eq!(result, vec!["revenu"]);
}

#[test]
fn test_create_backend_with_missing_dictionary_should_fail() {
    let mut config = Config::default();
    config.translation.backend = BackendKind::Dictionary;
    config.translation.active_backend_config_mut().dictionary_path =
        "/nonexistent/dictionary.json".to_string();

    assert!(create_backend(&config.translation).is_err());
}

#[test]
fn test_unauthorized_mock_should_report_non_retryable_error() {
    let backend = MockBackend::new(MockBehavior::Unauthorized);

    let error = tokio_test::block_on(backend.translate(&texts(&["Hello"]), "en", "fr")).unwrap_err();

    assert!(!error.is_retryable());
    assert_eq!(backend.call_count(), 1);
}
