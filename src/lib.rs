/*!
 * # docorrect - Word document grammar and spelling correction
 *
 * A Rust library for correcting the grammar and spelling of Word documents
 * while keeping quotes and bibliographic citations untouched.
 *
 * ## Features
 *
 * - Read and write .docx documents, preserving paragraph styles,
 *   alignment, indentation and the first run's character formatting
 * - Mask quotes and citations behind opaque placeholders so the
 *   correction backend cannot rewrite them
 * - Correct text using various backends:
 *   - Ollama (local LLM)
 *   - OpenAI API
 *   - Anthropic API
 *   - LanguageTool (local grammar-checking server)
 * - Soft degradation: a paragraph whose correction fails keeps its
 *   original text, and only an invalid credential aborts a run
 * - Configurable retry, pacing and caching behavior
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `document_processor`: Word document reading, rebuilding and writing
 * - `correction`: Correction services:
 *   - `correction::citations`: Citation masking and restoration
 *   - `correction::core`: Core correction service with retry handling
 *   - `correction::cache`: Caching mechanisms for corrections
 *   - `correction::pipeline`: Document-level sequential pipeline
 * - `file_utils`: File system operations
 * - `app_controller`: Main application controller
 * - `providers`: Client implementations for the correction backends:
 *   - `providers::ollama`: Ollama API client
 *   - `providers::openai`: OpenAI API client
 *   - `providers::anthropic`: Anthropic API client
 *   - `providers::languagetool`: LanguageTool HTTP client
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
pub mod file_utils;
pub mod document_processor;
pub mod correction;
pub mod app_controller;
pub mod providers;
pub mod errors;

// Re-export main types for easier usage
pub use app_config::Config;
pub use document_processor::{DocumentProcessor, DocumentText, ParagraphContent};
pub use correction::{CitationGuard, CorrectionService, DocumentPipeline};
pub use errors::{AppError, CorrectionError, DocumentError, ProviderError};
