/*!
 * End-to-end document correction tests: read a .docx from disk, run it
 * through the pipeline against a mock backend, write the corrected copy
 * and verify the result.
 */

use docorrect::app_config::CorrectionConfig;
use docorrect::app_controller::Controller;
use docorrect::correction::core::{CorrectionService, LogEntry};
use docorrect::correction::pipeline::DocumentPipeline;
use docorrect::document_processor::DocumentProcessor;
use docorrect::file_utils::FileManager;
use docorrect::providers::mock::MockBackend;

use crate::common::{create_temp_dir, create_test_document};

fn pipeline_with(backend: MockBackend) -> DocumentPipeline {
    let mut config = CorrectionConfig::default();
    config.common.retry_count = 2;
    config.common.retry_backoff_ms = 1;
    config.common.pacing_delay_ms = 0;
    let common = config.common.clone();
    let service = CorrectionService::with_backend(Box::new(backend), config, "es");
    DocumentPipeline::new(service, &common)
}

#[tokio::test]
async fn test_workflow_withSpanishDocument_shouldCorrectTextAndKeepCitations() {
    let temp_dir = create_temp_dir().unwrap();
    let dir_path = temp_dir.path().to_path_buf();

    let input_path = create_test_document(
        &dir_path,
        "tesis.docx",
        &[
            r#"He dijo que "la crisis es inevitable" (Pérez, 2020) y los resultadosson claros."#,
            "",
            "Un segundo párrafo sin citas ni errores.",
        ],
    )
    .unwrap();

    // Backend fixes the typo; citation placeholders pass through untouched
    let backend = MockBackend::working()
        .with_custom_response(|req| req.text.replace("resultadosson", "resultados son"));
    let pipeline = pipeline_with(backend);

    // Read, correct, write
    let input_bytes = FileManager::read_bytes(&input_path).unwrap();
    let document = DocumentProcessor::read(&input_bytes).unwrap();
    let corrected = pipeline.correct_document(&document, None).await.unwrap();

    let output_path = FileManager::generate_output_path(&input_path, &dir_path);
    let output_bytes = DocumentProcessor::write(&corrected).unwrap();
    FileManager::write_bytes(&output_path, &output_bytes).unwrap();

    // The corrected copy sits next to the input, prefixed
    assert!(output_path.ends_with("corrected_tesis.docx"));
    assert!(FileManager::file_exists(&output_path));

    // Re-read the output and verify the content
    let reread = DocumentProcessor::read(&FileManager::read_bytes(&output_path).unwrap()).unwrap();
    assert_eq!(reread.paragraphs.len(), 3);

    let first = reread.paragraphs[0].text();
    assert_eq!(
        first,
        r#"He dijo que "la crisis es inevitable" (Pérez, 2020) y los resultados son claros."#
    );
    assert!(reread.paragraphs[1].is_blank());
    assert_eq!(reread.paragraphs[2].text(), "Un segundo párrafo sin citas ni errores.");
}

#[tokio::test]
async fn test_workflow_withMeddlingBackend_shouldStillRestoreCitationsVerbatim() {
    let temp_dir = create_temp_dir().unwrap();
    let dir_path = temp_dir.path().to_path_buf();

    let input_path = create_test_document(
        &dir_path,
        "citas.docx",
        &[r#"Según 'el informe' de [Consejo 2015], nada cambia."#],
    )
    .unwrap();

    // Backend uppercases everything outside the placeholder tokens, the
    // kind of overreach the masking exists to contain
    let backend = MockBackend::working().with_custom_response(|req| {
        // Placeholder tokens have a fixed length: "__CITATION_" + 32 hex + "__"
        const TOKEN_LEN: usize = 45;
        let mut out = String::new();
        let mut rest = req.text.as_str();
        while let Some(start) = rest.find("__CITATION_") {
            let end = (start + TOKEN_LEN).min(rest.len());
            out.push_str(&rest[..start].to_uppercase());
            out.push_str(&rest[start..end]);
            rest = &rest[end..];
        }
        out.push_str(&rest.to_uppercase());
        out
    });
    let pipeline = pipeline_with(backend);

    let document = DocumentProcessor::read(&FileManager::read_bytes(&input_path).unwrap()).unwrap();
    let corrected = pipeline.correct_document(&document, None).await.unwrap();

    let text = corrected.paragraphs[0].text();
    // Prose was rewritten, citations were not
    assert!(text.contains("'el informe'"));
    assert!(text.contains("[Consejo 2015]"));
    assert!(text.contains("NADA CAMBIA"));
}

#[tokio::test]
async fn test_workflow_withFatalBackendError_shouldProduceNoOutputFile() {
    let temp_dir = create_temp_dir().unwrap();
    let dir_path = temp_dir.path().to_path_buf();

    let input_path = create_test_document(&dir_path, "doc.docx", &["uno", "dos"]).unwrap();
    let pipeline = pipeline_with(MockBackend::auth_failure());

    let document = DocumentProcessor::read(&FileManager::read_bytes(&input_path).unwrap()).unwrap();
    let result = pipeline.correct_document(&document, None).await;
    assert!(result.is_err());

    // Nothing was written
    let output_path = FileManager::generate_output_path(&input_path, &dir_path);
    assert!(!FileManager::file_exists(&output_path));
}

#[test]
fn test_controller_writeCorrectionLogs_shouldProduceReadableLogFile() {
    let temp_dir = create_temp_dir().unwrap();
    let log_path = temp_dir.path().join("docorrect.issues.log");

    let controller = Controller::new_for_test().unwrap();
    let logs = vec![
        LogEntry { level: log::Level::Warn, message: "Paragraph 3: citation dropped".to_string() },
        LogEntry { level: log::Level::Error, message: "Backend unavailable".to_string() },
    ];

    controller
        .write_correction_logs(&logs, &log_path.to_string_lossy(), "Ollama - llama3.2:3b")
        .unwrap();

    let content = FileManager::read_to_string(&log_path).unwrap();
    assert!(content.contains("Correction Log"));
    assert!(content.contains("Context: Ollama - llama3.2:3b"));
    assert!(content.contains("[WARN] Paragraph 3: citation dropped"));
    assert!(content.contains("[ERROR] Backend unavailable"));
}
