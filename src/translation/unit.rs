/*!
 * Translation units and their results.
 *
 * A unit is one translatable span (a paragraph run or a table cell) bound to
 * the address it came from. Units only live for the duration of a run.
 */

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use crate::translation::document::Formatting;

/// Locates exactly one run or one cell inside a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StructuralAddress {
    /// Run `run` of the paragraph at block `block`
    Run { block: usize, run: usize },
    /// Cell at (`row`, `column`) of the table at block `block`
    Cell { block: usize, row: usize, column: usize },
}

impl StructuralAddress {
    /// Index of the top-level block this address points into.
    pub fn block(&self) -> usize {
        match *self {
            Self::Run { block, .. } | Self::Cell { block, .. } => block,
        }
    }

    // Document-order key: block first, then position within the block.
    fn order_key(&self) -> (usize, usize, usize) {
        match *self {
            Self::Run { block, run } => (block, 0, run),
            Self::Cell { block, row, column } => (block, row, column),
        }
    }
}

impl Ord for StructuralAddress {
    fn cmp(&self, other: &Self) -> Ordering {
        self.order_key().cmp(&other.order_key())
    }
}

impl PartialOrd for StructuralAddress {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for StructuralAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Run { block, run } => write!(f, "block {} run {}", block, run),
            Self::Cell { block, row, column } => {
                write!(f, "block {} cell ({}, {})", block, row, column)
            }
        }
    }
}

/// One span to translate.
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationUnit {
    pub address: StructuralAddress,
    pub source_text: String,
    /// Formatting captured from the run; `None` for table cells
    pub formatting: Option<Formatting>,
}

/// How a unit ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitStatus {
    /// The backend produced a translation
    Succeeded,
    /// The source text was kept
    FellBack,
}

/// Outcome for one unit.
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationResult {
    pub address: StructuralAddress,
    pub translated_text: String,
    pub status: UnitStatus,
}

impl TranslationResult {
    pub fn succeeded(address: StructuralAddress, translated_text: impl Into<String>) -> Self {
        Self {
            address,
            translated_text: translated_text.into(),
            status: UnitStatus::Succeeded,
        }
    }

    /// Keep the unit's source text.
    pub fn fell_back(unit: &TranslationUnit) -> Self {
        Self {
            address: unit.address,
            translated_text: unit.source_text.clone(),
            status: UnitStatus::FellBack,
        }
    }
}

/// Results keyed by address; iterates in document order.
pub type TranslationResults = BTreeMap<StructuralAddress, TranslationResult>;
