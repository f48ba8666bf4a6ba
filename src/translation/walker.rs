/*!
 * Structural walker.
 *
 * Yields one translation unit per non-blank run and per non-blank table cell,
 * in block order. Opaque blocks yield nothing. The walk borrows the document
 * and never modifies it.
 */

use crate::translation::document::{Block, Document};
use crate::translation::unit::{StructuralAddress, TranslationUnit};

/// Lazily walk `document` in reading order.
pub fn walk(document: &Document) -> impl Iterator<Item = TranslationUnit> + '_ {
    document
        .blocks
        .iter()
        .enumerate()
        .flat_map(|(block_index, block)| block_units(block_index, block))
}

/// Number of units `walk` yields for `document`.
pub fn count_units(document: &Document) -> usize {
    walk(document).count()
}

/// Whether a span needs no translation.
pub fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

fn block_units(block_index: usize, block: &Block) -> Box<dyn Iterator<Item = TranslationUnit> + '_> {
    match block {
        Block::Paragraph(paragraph) => Box::new(
            paragraph
                .runs
                .iter()
                .enumerate()
                .filter(|(_, run)| !is_blank(&run.text))
                .map(move |(run_index, run)| TranslationUnit {
                    address: StructuralAddress::Run {
                        block: block_index,
                        run: run_index,
                    },
                    source_text: run.text.clone(),
                    formatting: Some(run.formatting.clone()),
                }),
        ),
        Block::Table(table) => Box::new(table.rows.iter().enumerate().flat_map(move |(row_index, row)| {
            row.cells
                .iter()
                .enumerate()
                .filter(|(_, cell)| !is_blank(&cell.text))
                .map(move |(column_index, cell)| TranslationUnit {
                    address: StructuralAddress::Cell {
                        block: block_index,
                        row: row_index,
                        column: column_index,
                    },
                    source_text: cell.text.clone(),
                    formatting: None,
                })
        })),
        Block::Opaque(_) => Box::new(std::iter::empty()),
    }
}
