/*!
 * Tests for Word document reading, rebuilding and writing
 */

use docorrect::document_processor::{
    DocumentProcessor, DocumentText, ParagraphContent, ParagraphFormat, RunContent,
    StyleDefinition,
};
use docorrect::errors::DocumentError;

fn styled_paragraph(text: &str) -> ParagraphContent {
    ParagraphContent {
        style: Some("Quote".to_string()),
        format: ParagraphFormat {
            alignment: Some("both".to_string()),
            indent_left: Some(720),
            space_before: Some(120),
            space_after: Some(120),
            line_spacing: Some(360),
            ..ParagraphFormat::default()
        },
        runs: vec![RunContent {
            text: text.to_string(),
            italic: true,
            size: Some(22),
            ..RunContent::default()
        }],
    }
}

#[test]
fn test_writeThenRead_withStyledParagraphs_shouldPreserveStructure() {
    let document = DocumentText {
        paragraphs: vec![
            styled_paragraph("Un párrafo con estilo."),
            ParagraphContent::default(),
            DocumentProcessor::rebuild_paragraph(&ParagraphContent::default(), "Texto plano."),
        ],
        styles: vec![StyleDefinition {
            id: "Quote".to_string(),
            name: "Quote".to_string(),
        }],
    };

    let bytes = DocumentProcessor::write(&document).unwrap();
    let reread = DocumentProcessor::read(&bytes).unwrap();

    assert_eq!(reread.paragraphs.len(), 3);
    assert_eq!(reread.paragraphs[0].text(), "Un párrafo con estilo.");
    assert_eq!(reread.paragraphs[0].style.as_deref(), Some("Quote"));
    assert_eq!(reread.paragraphs[0].format.alignment.as_deref(), Some("both"));
    assert_eq!(reread.paragraphs[0].format.indent_left, Some(720));
    assert!(reread.paragraphs[0].runs[0].italic);
    assert_eq!(reread.paragraphs[0].runs[0].size, Some(22));

    assert!(reread.paragraphs[1].is_blank());
    assert_eq!(reread.paragraphs[2].text(), "Texto plano.");

    // The style table survives the round trip
    assert!(reread.styles.iter().any(|s| s.id == "Quote"));
}

#[test]
fn test_write_withUnknownStyleReference_shouldSeedStubStyle() {
    let mut paragraph = DocumentProcessor::rebuild_paragraph(&ParagraphContent::default(), "Texto");
    paragraph.style = Some("Inexistente".to_string());

    let document = DocumentText {
        paragraphs: vec![paragraph],
        styles: Vec::new(), // referenced style missing from the table
    };

    let bytes = DocumentProcessor::write(&document).unwrap();
    let reread = DocumentProcessor::read(&bytes).unwrap();

    // A stub entry named after the id was inserted
    assert!(reread.styles.iter().any(|s| s.id == "Inexistente"));
    assert_eq!(reread.paragraphs[0].style.as_deref(), Some("Inexistente"));
}

#[test]
fn test_write_withDuplicateStyleIds_shouldSeedOnlyOnce() {
    let document = DocumentText {
        paragraphs: Vec::new(),
        styles: vec![
            StyleDefinition { id: "Dup".to_string(), name: "First".to_string() },
            StyleDefinition { id: "Dup".to_string(), name: "Second".to_string() },
        ],
    };

    let bytes = DocumentProcessor::write(&document).unwrap();
    let reread = DocumentProcessor::read(&bytes).unwrap();
    assert_eq!(reread.styles.iter().filter(|s| s.id == "Dup").count(), 1);
}

#[test]
fn test_rebuildParagraph_shouldCollapseRunsToFirstRunFormatting() {
    let original = ParagraphContent {
        style: None,
        format: ParagraphFormat::default(),
        runs: vec![
            RunContent { text: "negrita ".to_string(), bold: true, ..RunContent::default() },
            RunContent { text: "cursiva".to_string(), italic: true, ..RunContent::default() },
        ],
    };

    let rebuilt = DocumentProcessor::rebuild_paragraph(&original, "todo junto");
    assert_eq!(rebuilt.runs.len(), 1);
    assert_eq!(rebuilt.runs[0].text, "todo junto");
    assert!(rebuilt.runs[0].bold);
    // Second-run formatting is not carried over
    assert!(!rebuilt.runs[0].italic);
}

#[test]
fn test_read_withInvalidBytes_shouldReturnContainerError() {
    let result = DocumentProcessor::read(&[0u8; 16]);
    assert!(matches!(result, Err(DocumentError::Container(_))));
}

#[test]
fn test_totalCharacters_shouldCountCharsNotBytes() {
    let document = DocumentText {
        paragraphs: vec![DocumentProcessor::rebuild_paragraph(
            &ParagraphContent::default(),
            "añejo", // 5 chars, 6 bytes
        )],
        styles: Vec::new(),
    };
    assert_eq!(document.total_characters(), 5);
}
