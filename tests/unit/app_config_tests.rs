/*!
 * Tests for app configuration functionality
 */

use doctranslate::app_config::{BackendKind, Config};
use doctranslate::translation::{BackoffStrategy, GlossaryEntry};
use std::time::Duration;

use crate::common::create_temp_dir;

#[test]
fn test_default_config_should_validate() {
    let config = Config::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.translation.backend, BackendKind::Local);
}

#[test]
fn test_config_should_round_trip_through_file() {
    let temp_dir = create_temp_dir().unwrap();
    let path = temp_dir.path().join("conf.json");

    let mut config = Config::default();
    config.target_language = "fr".to_string();
    config.glossary = vec![GlossaryEntry::exact("NPV")];
    config.translation.common.backoff = BackoffStrategy::Exponential;
    config.save_to_file(&path).unwrap();

    let loaded = Config::from_file(&path).unwrap();
    assert_eq!(loaded.target_language, "fr");
    assert_eq!(loaded.glossary, vec![GlossaryEntry::exact("NPV")]);
    assert_eq!(loaded.translation.common.backoff, BackoffStrategy::Exponential);
}

#[test]
fn test_validate_with_remote_backend_without_key_should_fail() {
    let mut config = Config::default();
    config.translation.backend = BackendKind::Remote;
    config.translation.active_backend_config_mut().api_key.clear();

    assert!(config.validate().is_err());
}

#[test]
fn test_validate_with_zero_batch_size_should_fail() {
    let mut config = Config::default();
    config.translation.common.batch_size = 0;

    assert!(config.validate().is_err());
}

#[test]
fn test_validate_with_unknown_language_should_fail() {
    let mut config = Config::default();
    config.target_language = "zz".to_string();

    assert!(config.validate().is_err());
}

#[test]
fn test_retry_policy_should_follow_common_settings() {
    let mut config = Config::default();
    config.translation.common.max_retries = 4;
    config.translation.common.retry_delay_ms = 100;
    config.translation.common.backoff = BackoffStrategy::Exponential;

    let policy = config.translation.common.retry_policy();
    assert_eq!(policy.total_attempts(), 5);
    assert_eq!(policy.delay_for(1), Duration::from_millis(100));
    assert_eq!(policy.delay_for(3), Duration::from_millis(400));
}
