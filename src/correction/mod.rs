/*!
 * Correction functionality.
 *
 * This module contains the citation masking codec, the correction service
 * with its cache, and the document-level pipeline.
 */

pub mod cache;
pub mod citations;
pub mod core;
pub mod pipeline;

pub use cache::CorrectionCache;
pub use citations::{CitationGuard, CitationMap};
pub use core::{CorrectionOutcome, CorrectionService, LogEntry, UnchangedReason};
pub use pipeline::DocumentPipeline;
