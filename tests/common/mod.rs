/*!
 * Common test utilities for the docorrect test suite
 */

use std::fs;
use std::path::PathBuf;
use anyhow::Result;
use tempfile::TempDir;

use docorrect::document_processor::{DocumentProcessor, DocumentText, ParagraphContent};

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &PathBuf, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Builds an in-memory document with one paragraph per text
pub fn document_from_texts(texts: &[&str]) -> DocumentText {
    DocumentText {
        paragraphs: texts
            .iter()
            .map(|t| DocumentProcessor::rebuild_paragraph(&ParagraphContent::default(), t))
            .collect(),
        styles: Vec::new(),
    }
}

/// Creates a sample .docx file on disk with one paragraph per text
pub fn create_test_document(dir: &PathBuf, filename: &str, texts: &[&str]) -> Result<PathBuf> {
    let document = document_from_texts(texts);
    let bytes = DocumentProcessor::write(&document)?;
    let file_path = dir.join(filename);
    fs::write(&file_path, bytes)?;
    Ok(file_path)
}
