/*!
 * Document rebuilder.
 *
 * Produces a new document with translated text placed at the recorded
 * addresses. The input document is never mutated. Every non-blank run and
 * cell must have a result, and every result must land on one of them;
 * anything else is an internal defect reported as `RebuildInvariant`.
 */

use crate::errors::DocumentError;
use crate::translation::document::{Block, Cell, Document, Paragraph, Row, Run, Table};
use crate::translation::unit::{StructuralAddress, TranslationResults};
use crate::translation::walker::is_blank;

/// Build the translated copy of `document`.
pub fn rebuild(document: &Document, results: &TranslationResults) -> Result<Document, DocumentError> {
    let mut applied = 0;
    let mut blocks = Vec::with_capacity(document.blocks.len());

    for (block_index, block) in document.blocks.iter().enumerate() {
        let rebuilt = match block {
            Block::Paragraph(paragraph) => {
                Block::Paragraph(rebuild_paragraph(block_index, paragraph, results, &mut applied)?)
            }
            Block::Table(table) => Block::Table(rebuild_table(block_index, table, results, &mut applied)?),
            Block::Opaque(opaque) => Block::Opaque(opaque.clone()),
        };
        blocks.push(rebuilt);
    }

    if applied != results.len() {
        // Some result did not land on a translatable span
        if let Some(address) = results.keys().find(|address| !resolves(document, address)) {
            return Err(DocumentError::RebuildInvariant(format!(
                "result for {} does not resolve to a translatable span",
                address
            )));
        }
    }

    Ok(Document::new(blocks))
}

fn rebuild_paragraph(
    block_index: usize,
    paragraph: &Paragraph,
    results: &TranslationResults,
    applied: &mut usize,
) -> Result<Paragraph, DocumentError> {
    let mut runs = Vec::with_capacity(paragraph.runs.len());

    for (run_index, run) in paragraph.runs.iter().enumerate() {
        let address = StructuralAddress::Run {
            block: block_index,
            run: run_index,
        };
        let text = translated_text(&address, &run.text, results, applied)?;
        // Formatting is applied after the text so it never depends on the translation
        let mut rebuilt = Run::new(text);
        rebuilt.formatting = run.formatting.clone();
        runs.push(rebuilt);
    }

    Ok(Paragraph {
        alignment: paragraph.alignment,
        style: paragraph.style.clone(),
        runs,
    })
}

fn rebuild_table(
    block_index: usize,
    table: &Table,
    results: &TranslationResults,
    applied: &mut usize,
) -> Result<Table, DocumentError> {
    let mut rows = Vec::with_capacity(table.rows.len());

    for (row_index, row) in table.rows.iter().enumerate() {
        let mut cells = Vec::with_capacity(row.cells.len());
        for (column_index, cell) in row.cells.iter().enumerate() {
            let address = StructuralAddress::Cell {
                block: block_index,
                row: row_index,
                column: column_index,
            };
            cells.push(Cell::new(translated_text(&address, &cell.text, results, applied)?));
        }
        rows.push(Row { cells });
    }

    Ok(Table { rows })
}

fn translated_text(
    address: &StructuralAddress,
    source: &str,
    results: &TranslationResults,
    applied: &mut usize,
) -> Result<String, DocumentError> {
    if is_blank(source) {
        return Ok(source.to_string());
    }

    match results.get(address) {
        Some(result) => {
            *applied += 1;
            Ok(result.translated_text.clone())
        }
        None => Err(DocumentError::RebuildInvariant(format!(
            "missing translation result for {}",
            address
        ))),
    }
}

fn resolves(document: &Document, address: &StructuralAddress) -> bool {
    let text = match (document.blocks.get(address.block()), address) {
        (Some(Block::Paragraph(paragraph)), StructuralAddress::Run { run, .. }) => {
            paragraph.runs.get(*run).map(|run| run.text.as_str())
        }
        (Some(Block::Table(table)), StructuralAddress::Cell { row, column, .. }) => table
            .rows
            .get(*row)
            .and_then(|row| row.cells.get(*column))
            .map(|cell| cell.text.as_str()),
        _ => None,
    };

    text.is_some_and(|text| !is_blank(text))
}
