/*!
 * Tests for walking and rebuilding documents
 */

use doctranslate::translation::document::Block;
use doctranslate::translation::rebuild::rebuild;
use doctranslate::translation::unit::TranslationResults;
use doctranslate::translation::walker::{count_units, walk};
use doctranslate::translation::{StructuralAddress, TranslationResult};

use crate::common::sample_report;

#[test]
fn test_walk_sample_report_should_skip_blank_spans_and_opaque_blocks() {
    let document = sample_report();

    let addresses: Vec<_> = walk(&document).map(|unit| unit.address).collect();

    assert_eq!(
        addresses,
        vec![
            StructuralAddress::Run { block: 0, run: 0 },
            StructuralAddress::Run { block: 1, run: 0 },
            StructuralAddress::Run { block: 1, run: 1 },
            StructuralAddress::Run { block: 1, run: 2 },
            StructuralAddress::Cell { block: 2, row: 0, column: 0 },
            StructuralAddress::Cell { block: 2, row: 0, column: 1 },
            StructuralAddress::Cell { block: 2, row: 1, column: 0 },
            StructuralAddress::Cell { block: 2, row: 1, column: 1 },
            StructuralAddress::Cell { block: 2, row: 2, column: 1 },
        ]
    );
    assert_eq!(count_units(&document), 9);
}

#[test]
fn test_walk_should_not_modify_document() {
    let document = sample_report();
    let before = document.clone();

    let _ = walk(&document).count();

    assert_eq!(document, before);
}

#[test]
fn test_rebuild_with_source_texts_should_reproduce_document() {
    let document = sample_report();
    let results: TranslationResults = walk(&document)
        .map(|unit| {
            let result = TranslationResult::succeeded(unit.address, unit.source_text.clone());
            (unit.address, result)
        })
        .collect();

    let rebuilt = rebuild(&document, &results).unwrap();

    assert_eq!(rebuilt, document);
}

#[test]
fn test_rebuild_should_keep_opaque_payload() {
    let document = sample_report();
    let results: TranslationResults = walk(&document)
        .map(|unit| {
            let result = TranslationResult::succeeded(unit.address, "x");
            (unit.address, result)
        })
        .collect();

    let rebuilt = rebuild(&document, &results).unwrap();

    match (&document.blocks[3], &rebuilt.blocks[3]) {
        (Block::Opaque(original), Block::Opaque(copy)) => assert_eq!(original, copy),
        _ => panic!("expected opaque blocks"),
    }
}
