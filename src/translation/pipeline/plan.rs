/*!
 * Dispatch planning.
 *
 * Turns walked units into the work the backend actually has to do: strip
 * surrounding whitespace, mask glossary terms, answer what can be answered
 * without the backend, and collapse identical masked spans so each is sent
 * once.
 */

use std::collections::HashMap;

use log::warn;

use crate::translation::cache::TranslationCache;
use crate::translation::formatting::WhitespaceFrame;
use crate::translation::glossary::{Glossary, RestoreMap};
use crate::translation::unit::{TranslationResult, TranslationUnit};

/// A walked unit with its whitespace split off and glossary terms masked
#[derive(Debug, Clone)]
pub struct PreparedUnit {
    pub unit: TranslationUnit,
    leading: String,
    trailing: String,
    pub masked: String,
    restore_map: RestoreMap,
}

impl PreparedUnit {
    pub fn prepare(unit: TranslationUnit, glossary: &Glossary) -> Self {
        let frame = WhitespaceFrame::split(&unit.source_text);
        let leading = frame.leading.to_string();
        let trailing = frame.trailing.to_string();
        let (masked, restore_map) = glossary.protect(frame.core);

        Self {
            unit,
            leading,
            trailing,
            masked,
            restore_map,
        }
    }

    /// Whether the masked span has nothing left to translate
    pub fn is_fully_protected(&self) -> bool {
        Glossary::only_placeholders(&self.masked, &self.restore_map)
    }

    /// Turn a translation of `masked` into this unit's result.
    ///
    /// Falls back to the source text when a placeholder did not survive.
    pub fn finish(&self, translated: &str) -> TranslationResult {
        let restored = Glossary::restore(translated, &self.restore_map);
        if !restored.is_complete() {
            warn!(
                "Protected term(s) lost in translation of {}, keeping source text",
                self.unit.address
            );
            return TranslationResult::fell_back(&self.unit);
        }

        let frame = WhitespaceFrame {
            leading: &self.leading,
            core: &self.masked,
            trailing: &self.trailing,
        };
        TranslationResult::succeeded(self.unit.address, frame.wrap(&restored.text))
    }
}

/// One distinct masked span and the units waiting for it
#[derive(Debug, Clone)]
pub struct PendingSpan {
    pub masked: String,
    /// Indices into `DispatchPlan::prepared`
    pub waiting: Vec<usize>,
}

/// A group of pending spans sent in one backend call
#[derive(Debug, Clone)]
pub struct Batch {
    /// Indices into `DispatchPlan::pending`, parallel to `units`
    pub spans: Vec<usize>,
    pub units: Vec<TranslationUnit>,
}

/// Everything known about a run before the first backend call
#[derive(Debug, Default)]
pub struct DispatchPlan {
    pub prepared: Vec<PreparedUnit>,
    /// Results that need no backend call
    pub resolved: Vec<TranslationResult>,
    pub pending: Vec<PendingSpan>,
    pub cache_hits: usize,
}

impl DispatchPlan {
    pub fn build(
        units: Vec<TranslationUnit>,
        glossary: &Glossary,
        cache: &TranslationCache,
        source_language: &str,
        target_language: &str,
    ) -> Self {
        let mut plan = Self::default();
        let mut span_index: HashMap<String, usize> = HashMap::new();

        for unit in units {
            let prepared = PreparedUnit::prepare(unit, glossary);

            if prepared.is_fully_protected() {
                plan.resolved
                    .push(TranslationResult::succeeded(prepared.unit.address, prepared.unit.source_text.clone()));
                plan.prepared.push(prepared);
                continue;
            }

            if let Some(cached) = cache.get(&prepared.masked, source_language, target_language) {
                plan.cache_hits += 1;
                plan.resolved.push(prepared.finish(&cached));
                plan.prepared.push(prepared);
                continue;
            }

            let unit_index = plan.prepared.len();
            match span_index.get(&prepared.masked) {
                Some(&index) => plan.pending[index].waiting.push(unit_index),
                None => {
                    span_index.insert(prepared.masked.clone(), plan.pending.len());
                    plan.pending.push(PendingSpan {
                        masked: prepared.masked.clone(),
                        waiting: vec![unit_index],
                    });
                }
            }
            plan.prepared.push(prepared);
        }

        plan
    }

    /// Group pending spans into batches of at most `batch_size`, in document order
    pub fn batches(&self, batch_size: usize) -> Vec<Batch> {
        let indices: Vec<usize> = (0..self.pending.len()).collect();
        indices
            .chunks(batch_size.max(1))
            .map(|chunk| Batch {
                spans: chunk.to_vec(),
                units: chunk
                    .iter()
                    .map(|&index| {
                        let span = &self.pending[index];
                        let first = &self.prepared[span.waiting[0]];
                        TranslationUnit {
                            address: first.unit.address,
                            source_text: span.masked.clone(),
                            formatting: first.unit.formatting.clone(),
                        }
                    })
                    .collect(),
            })
            .collect()
    }
}
