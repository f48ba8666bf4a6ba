/*!
 * Tests for language code utilities
 */

use doctranslate::language_utils::{display_name, get_language_name, language_codes_match, normalize_to_part2t};

#[test]
fn test_language_codes_match_should_accept_both_iso_forms() {
    assert!(language_codes_match("fr", "fra"));
    assert!(language_codes_match("de", "deu"));
    assert!(!language_codes_match("en", "fr"));
}

#[test]
fn test_normalize_to_part2t_should_convert_two_letter_codes() {
    assert_eq!(normalize_to_part2t("hi").unwrap(), "hin");
    assert!(normalize_to_part2t("zz").is_err());
}

#[test]
fn test_get_language_name_should_return_english_name() {
    assert_eq!(get_language_name("hi").unwrap(), "Hindi");
    assert_eq!(get_language_name("fra").unwrap(), "French");
}

#[test]
fn test_display_name_with_unknown_code_should_fall_back_to_code() {
    assert_eq!(display_name("en"), "English");
    assert_eq!(display_name("xx-custom"), "xx-custom");
}
