/*!
 * Prompt construction for LLM-backed translation.
 *
 * - System prompt templates with language placeholders
 * - Marker framing so one request can carry a whole batch
 */

pub mod templates;

pub use templates::{PromptTemplate, frame_batch, parse_batch};
