/*!
 * Document correction pipeline.
 *
 * Drives a whole parsed document through the correction service, one
 * paragraph at a time in document order. Each non-empty paragraph is
 * masked, corrected, restored and rebuilt; empty paragraphs are copied
 * through untouched. A fatal backend error aborts the run and the partial
 * output is discarded; per-paragraph failures degrade to the original
 * text and the run continues.
 */

use log::{info, Level};
use tokio::time::Duration;

use crate::app_config::CorrectionCommonConfig;
use crate::correction::citations::CitationGuard;
use crate::correction::core::{CorrectionOutcome, CorrectionService, LogEntry};
use crate::document_processor::{DocumentProcessor, DocumentText};
use crate::errors::{CorrectionError, DocumentError};

/// Progress callback reporting (completed paragraphs, total paragraphs)
pub type ProgressFn<'a> = &'a (dyn Fn(usize, usize) + Send + Sync);

/// Sequential pipeline correcting a document paragraph by paragraph
pub struct DocumentPipeline {
    /// The correction service doing the per-paragraph work
    service: CorrectionService,

    /// Ceiling on total characters across all paragraphs
    max_total_chars: usize,

    /// Pause between consecutive backend calls
    pacing_delay: Duration,
}

impl DocumentPipeline {
    /// Create a pipeline around a correction service.
    ///
    /// When the active provider declares a rate limit that implies a longer
    /// interval between requests than the configured pacing delay, the
    /// longer one wins.
    pub fn new(service: CorrectionService, common: &CorrectionCommonConfig) -> Self {
        let pacing_delay = service
            .min_request_interval()
            .unwrap_or(Duration::ZERO)
            .max(Duration::from_millis(common.pacing_delay_ms));
        Self {
            service,
            max_total_chars: common.max_total_chars,
            pacing_delay,
        }
    }

    /// Correct every paragraph of a document, returning the new document.
    ///
    /// The size ceiling is checked before any backend call is made. The
    /// progress callback fires once per paragraph, empty ones included,
    /// and is monotonically non-decreasing up to the paragraph count.
    pub async fn correct_document(
        &self,
        document: &DocumentText,
        progress: Option<ProgressFn<'_>>,
    ) -> Result<DocumentText, CorrectionError> {
        let chars = document.total_characters();
        if chars > self.max_total_chars {
            return Err(DocumentError::TooLarge {
                chars,
                limit: self.max_total_chars,
            }
            .into());
        }

        let total = document.paragraphs.len();
        info!(
            "Correcting document: {} paragraphs, {} characters, backend {}",
            total,
            chars,
            self.service.backend_name()
        );

        let mut corrected_paragraphs = Vec::with_capacity(total);

        for (index, paragraph) in document.paragraphs.iter().enumerate() {
            if paragraph.is_blank() {
                corrected_paragraphs.push(paragraph.clone());
            } else {
                let text = paragraph.text();
                let (masked, citations) = CitationGuard::mask(&text);

                // A fatal error aborts here; the partial output is dropped
                let outcome = self.service.correct_text(&masked).await?;

                let corrected_masked = match outcome {
                    CorrectionOutcome::Corrected(text) => text,
                    CorrectionOutcome::Unchanged(_) => masked.clone(),
                };

                for placeholder in
                    CitationGuard::missing_placeholders(&corrected_masked, &citations)
                {
                    if let Some(original) = citations.original_for(placeholder) {
                        self.service.capture(
                            Level::Warn,
                            format!(
                                "Paragraph {}: citation {:?} was dropped by the backend",
                                index + 1,
                                original
                            ),
                        );
                    }
                }

                let restored = CitationGuard::restore(&corrected_masked, &citations);
                corrected_paragraphs.push(DocumentProcessor::rebuild_paragraph(paragraph, &restored));

                // Pacing so rate-limited backends are not hammered
                if index + 1 < total && !self.pacing_delay.is_zero() {
                    tokio::time::sleep(self.pacing_delay).await;
                }
            }

            if let Some(report) = progress {
                report(index + 1, total);
            }
        }

        Ok(DocumentText {
            paragraphs: corrected_paragraphs,
            styles: document.styles.clone(),
        })
    }

    /// Drain the warnings captured while correcting
    pub fn take_captured_logs(&self) -> Vec<LogEntry> {
        self.service.take_captured_logs()
    }

    /// Cache statistics of the underlying service
    pub fn cache_stats(&self) -> (usize, usize, f64) {
        self.service.cache_stats()
    }
}
