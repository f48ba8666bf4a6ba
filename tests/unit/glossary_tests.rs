/*!
 * Tests for glossary protection
 */

use doctranslate::translation::{Glossary, GlossaryEntry};

#[test]
fn test_protect_then_restore_should_keep_terms_verbatim() {
    let glossary =
        Glossary::new(vec![GlossaryEntry::exact("NPV"), GlossaryEntry::exact("EBITDA")]).unwrap();

    let (masked, map) = glossary.protect("NPV and EBITDA both rose");
    assert!(!masked.contains("NPV"));
    assert!(!masked.contains("EBITDA"));

    let restored = Glossary::restore(&masked.to_uppercase(), &map);
    assert!(restored.is_complete());
    assert_eq!(restored.text, "NPV AND EBITDA BOTH ROSE");
}

#[test]
fn test_protect_should_prefer_longest_term() {
    let glossary = Glossary::new(vec![
        GlossaryEntry::exact("Net"),
        GlossaryEntry::exact("Net Present Value"),
    ])
    .unwrap();

    let (masked, map) = glossary.protect("Net Present Value matters");

    let restored = Glossary::restore(&masked, &map);
    assert_eq!(restored.text, "Net Present Value matters");
    assert_eq!(masked.matches("__").count(), 2);
}

#[test]
fn test_case_insensitive_entry_should_keep_original_casing() {
    let glossary = Glossary::new(vec![GlossaryEntry::case_insensitive("acme")]).unwrap();

    let (masked, map) = glossary.protect("Acme and ACME");
    let restored = Glossary::restore(&masked.to_lowercase(), &map);

    assert!(restored.is_complete());
    assert_eq!(restored.text, "Acme and ACME");
}

#[test]
fn test_restore_should_report_dropped_placeholder() {
    let glossary = Glossary::new(vec![GlossaryEntry::exact("NPV")]).unwrap();
    let (_, map) = glossary.protect("The NPV is high");

    let restored = Glossary::restore("La valeur est haute", &map);

    assert!(!restored.is_complete());
    assert_eq!(restored.missing.len(), 1);
}

#[test]
fn test_empty_glossary_should_leave_text_unchanged() {
    let (masked, map) = Glossary::empty().protect("Nothing to protect");

    assert_eq!(masked, "Nothing to protect");
    assert!(map.is_empty());
}
