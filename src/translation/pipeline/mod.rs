/*!
 * Structural translation pipeline.
 *
 * A document goes through three stages:
 * 1. **Plan**: walk the document, mask glossary terms, answer cached and
 *    fully-protected spans, collapse duplicates into batches
 * 2. **Dispatch**: send batches to the backend under the retry policy, with
 *    at most `concurrency` calls in flight
 * 3. **Rebuild**: place every result at its address in a fresh document
 */

pub mod orchestrator;
pub mod plan;

pub use orchestrator::{PipelineConfig, TranslationPipeline, TranslationReport};
