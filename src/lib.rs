/*!
 * # doctranslate - structure-preserving document translation
 *
 * A Rust library for translating structured documents (paragraphs, formatted
 * runs, tables, embedded objects) without disturbing their layout.
 *
 * ## Features
 *
 * - Walk a document and extract every translatable run and table cell
 * - Translate through interchangeable backends:
 *   - Remote OpenAI-compatible chat-completions API
 *   - Local model served by Ollama
 *   - Static dictionary lookup
 * - Protect glossary terms from translation
 * - Bounded retries with fallback to the original text
 * - Bounded parallel dispatch with deterministic output
 * - Rebuild a fresh document with formatting reapplied
 * - ISO 639-1 and ISO 639-2 language code support
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `translation`: The structural translation pipeline:
 *   - `translation::document`: Document model and codecs
 *   - `translation::walker`: Extraction of translation units
 *   - `translation::glossary`: Term protection
 *   - `translation::retry`: Retry policy and fallback
 *   - `translation::rebuild`: Output document reconstruction
 *   - `translation::pipeline`: Orchestration
 * - `providers`: Translation backend implementations
 * - `file_utils`: File system operations
 * - `app_controller`: Main application controller
 * - `language_utils`: ISO language code utilities
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod errors;
pub mod file_utils;
pub mod language_utils;
pub mod providers;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use errors::{AppError, BackendError, DocumentError};
pub use language_utils::{get_language_name, language_codes_match, normalize_to_part2t};
pub use providers::{TranslationBackend, create_backend};
pub use translation::{Document, TranslationPipeline, TranslationReport};
