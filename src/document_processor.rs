/*!
 * Word document reading, paragraph reconstruction and writing.
 *
 * Reading goes through the raw .docx container (a zip archive) with a
 * streaming XML parser, because the writer library does not read. Writing
 * assembles a fresh document with docx-rs, re-seeding the style table and
 * reapplying the formatting captured at read time. Corrected text always
 * lands in a single run carrying the first original run's formatting; run
 * boundaries inside a paragraph cannot survive a whole-paragraph rewrite.
 */

use std::collections::HashSet;
use std::io::{Cursor, Read};

use docx_rs::{
    AlignmentType, Docx, LineSpacing, Paragraph, Run, RunFonts, SpecialIndentType, Style,
    StyleType,
};
use log::{debug, warn};
use quick_xml::events::Event;
use quick_xml::Reader;
use zip::ZipArchive;

use crate::errors::DocumentError;

/// Character formatting of one run of text
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunContent {
    /// Text of the run
    pub text: String,
    /// Bold flag
    pub bold: bool,
    /// Italic flag
    pub italic: bool,
    /// Underline flag
    pub underline: bool,
    /// ASCII font name, if set explicitly
    pub font: Option<String>,
    /// Font size in half-points, if set explicitly
    pub size: Option<usize>,
    /// Text color as a hex string, if set explicitly
    pub color: Option<String>,
}

/// Paragraph-level formatting captured at read time.
///
/// Indentation and spacing values are in twentieths of a point, as stored
/// in the document XML.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParagraphFormat {
    /// Justification value ("left", "center", "right", "both", ...)
    pub alignment: Option<String>,
    /// Left indentation
    pub indent_left: Option<i32>,
    /// Right indentation
    pub indent_right: Option<i32>,
    /// First-line indentation
    pub indent_first_line: Option<i32>,
    /// Spacing before the paragraph
    pub space_before: Option<u32>,
    /// Spacing after the paragraph
    pub space_after: Option<u32>,
    /// Line spacing
    pub line_spacing: Option<i32>,
}

/// One paragraph with its style reference, formatting and runs
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParagraphContent {
    /// Referenced paragraph style id, if any
    pub style: Option<String>,
    /// Direct paragraph formatting
    pub format: ParagraphFormat,
    /// Text runs in document order
    pub runs: Vec<RunContent>,
}

impl ParagraphContent {
    /// Concatenated text of all runs
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    /// Whether the paragraph carries no text at all
    pub fn is_blank(&self) -> bool {
        self.runs.iter().all(|r| r.text.trim().is_empty())
    }
}

/// A paragraph style from the document's style table
#[derive(Debug, Clone, PartialEq)]
pub struct StyleDefinition {
    /// Style id referenced by paragraphs
    pub id: String,
    /// Human-readable style name
    pub name: String,
}

/// A parsed document: its paragraphs plus the paragraph style table
#[derive(Debug, Clone, Default)]
pub struct DocumentText {
    /// Paragraphs in document order, empty ones included
    pub paragraphs: Vec<ParagraphContent>,
    /// Paragraph styles defined in the document
    pub styles: Vec<StyleDefinition>,
}

impl DocumentText {
    /// Total characters across all paragraph texts
    pub fn total_characters(&self) -> usize {
        self.paragraphs.iter().map(|p| p.text().chars().count()).sum()
    }
}

/// Reads, rebuilds and writes Word documents
pub struct DocumentProcessor;

impl DocumentProcessor {
    /// Parse a .docx file from its raw bytes
    pub fn read(bytes: &[u8]) -> Result<DocumentText, DocumentError> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| DocumentError::Container(format!("Failed to open .docx container: {}", e)))?;

        let document_xml = read_archive_entry(&mut archive, "word/document.xml")?;
        let paragraphs = parse_document_xml(&document_xml)?;

        // The style table is optional; a document without one still reads
        let styles = match read_archive_entry(&mut archive, "word/styles.xml") {
            Ok(styles_xml) => parse_styles_xml(&styles_xml)?,
            Err(_) => Vec::new(),
        };

        debug!(
            "Parsed document: {} paragraphs, {} styles",
            paragraphs.len(),
            styles.len()
        );

        Ok(DocumentText { paragraphs, styles })
    }

    /// Build a paragraph carrying the corrected text.
    ///
    /// Style and paragraph formatting are copied from the original. The
    /// corrected text becomes a single run formatted like the original's
    /// first run; a paragraph that had no runs gets a plain one.
    pub fn rebuild_paragraph(original: &ParagraphContent, corrected: &str) -> ParagraphContent {
        let mut run = original.runs.first().cloned().unwrap_or_default();
        run.text = corrected.to_string();

        ParagraphContent {
            style: original.style.clone(),
            format: original.format.clone(),
            runs: vec![run],
        }
    }

    /// Assemble a new .docx file from a document, returning its bytes
    pub fn write(document: &DocumentText) -> Result<Vec<u8>, DocumentError> {
        let mut docx = Docx::new();

        // Seed the style table once per id; paragraphs referencing a style
        // missing from the table get a stub entry named after the id
        let mut seeded: HashSet<&str> = HashSet::new();
        for style in &document.styles {
            if seeded.insert(style.id.as_str()) {
                docx = docx.add_style(Style::new(&style.id, StyleType::Paragraph).name(&style.name));
            }
        }
        for paragraph in &document.paragraphs {
            if let Some(style_id) = &paragraph.style {
                if seeded.insert(style_id.as_str()) {
                    docx = docx.add_style(Style::new(style_id, StyleType::Paragraph).name(style_id));
                }
            }
        }

        for paragraph in &document.paragraphs {
            docx = docx.add_paragraph(build_paragraph(paragraph));
        }

        let mut buffer = Cursor::new(Vec::new());
        docx.build()
            .pack(&mut buffer)
            .map_err(|e| DocumentError::Write(e.to_string()))?;
        Ok(buffer.into_inner())
    }
}

/// Read one named entry of the archive as a UTF-8 string
fn read_archive_entry(
    archive: &mut ZipArchive<Cursor<&[u8]>>,
    name: &str,
) -> Result<String, DocumentError> {
    let mut entry = archive
        .by_name(name)
        .map_err(|e| DocumentError::Container(format!("Missing {}: {}", name, e)))?;
    let mut content = String::new();
    entry
        .read_to_string(&mut content)
        .map_err(|e| DocumentError::Container(format!("Failed to read {}: {}", name, e)))?;
    Ok(content)
}

/// Streaming parser state for word/document.xml
#[derive(Default)]
struct BodyParser {
    paragraphs: Vec<ParagraphContent>,
    paragraph: Option<ParagraphContent>,
    run: Option<RunContent>,
    in_paragraph_props: bool,
    in_run_props: bool,
    in_text: bool,
}

impl BodyParser {
    fn handle_start(&mut self, e: &quick_xml::events::BytesStart) {
        match e.name().as_ref() {
            b"w:p" => self.paragraph = Some(ParagraphContent::default()),
            b"w:pPr" => self.in_paragraph_props = true,
            b"w:rPr" => self.in_run_props = true,
            // Runs inside paragraph properties describe the paragraph
            // mark, not text; skip them
            b"w:r" if self.paragraph.is_some() && !self.in_paragraph_props => {
                self.run = Some(RunContent::default());
            }
            b"w:t" => self.in_text = self.run.is_some(),
            _ => self.handle_property(e),
        }
    }

    fn handle_end(&mut self, name: &[u8]) {
        match name {
            b"w:p" => {
                if let Some(paragraph) = self.paragraph.take() {
                    self.paragraphs.push(paragraph);
                }
            }
            b"w:pPr" => self.in_paragraph_props = false,
            b"w:rPr" => self.in_run_props = false,
            b"w:r" => {
                if let (Some(paragraph), Some(run)) = (self.paragraph.as_mut(), self.run.take()) {
                    paragraph.runs.push(run);
                }
            }
            b"w:t" => self.in_text = false,
            _ => {}
        }
    }

    fn handle_text(&mut self, text: &str) {
        if self.in_text {
            if let Some(run) = self.run.as_mut() {
                run.text.push_str(text);
            }
        }
    }

    /// Property elements, almost always self-closing
    fn handle_property(&mut self, e: &quick_xml::events::BytesStart) {
        match e.name().as_ref() {
            b"w:pStyle" if self.in_paragraph_props => {
                if let Some(paragraph) = self.paragraph.as_mut() {
                    paragraph.style = get_attr(e, b"w:val");
                }
            }
            b"w:jc" if self.in_paragraph_props => {
                if let Some(paragraph) = self.paragraph.as_mut() {
                    paragraph.format.alignment = get_attr(e, b"w:val");
                }
            }
            b"w:ind" if self.in_paragraph_props => {
                if let Some(paragraph) = self.paragraph.as_mut() {
                    let format = &mut paragraph.format;
                    format.indent_left = get_attr_i32(e, b"w:left")
                        .or_else(|| get_attr_i32(e, b"w:start"));
                    format.indent_right = get_attr_i32(e, b"w:right")
                        .or_else(|| get_attr_i32(e, b"w:end"));
                    format.indent_first_line = get_attr_i32(e, b"w:firstLine");
                }
            }
            b"w:spacing" if self.in_paragraph_props && !self.in_run_props => {
                if let Some(paragraph) = self.paragraph.as_mut() {
                    let format = &mut paragraph.format;
                    format.space_before = get_attr_u32(e, b"w:before");
                    format.space_after = get_attr_u32(e, b"w:after");
                    format.line_spacing = get_attr_i32(e, b"w:line");
                }
            }
            b"w:b" if self.in_run_props => {
                if let Some(run) = self.run.as_mut() {
                    run.bold = !check_val_off(e);
                }
            }
            b"w:i" if self.in_run_props => {
                if let Some(run) = self.run.as_mut() {
                    run.italic = !check_val_off(e);
                }
            }
            b"w:u" if self.in_run_props => {
                if let Some(run) = self.run.as_mut() {
                    run.underline = get_attr(e, b"w:val").as_deref() != Some("none");
                }
            }
            b"w:rFonts" if self.in_run_props => {
                if let Some(run) = self.run.as_mut() {
                    run.font = get_attr(e, b"w:ascii");
                }
            }
            b"w:sz" if self.in_run_props => {
                if let Some(run) = self.run.as_mut() {
                    run.size = get_attr(e, b"w:val").and_then(|v| v.parse().ok());
                }
            }
            b"w:color" if self.in_run_props => {
                if let Some(run) = self.run.as_mut() {
                    run.color = get_attr(e, b"w:val");
                }
            }
            _ => {}
        }
    }
}

/// Parse word/document.xml into paragraphs
fn parse_document_xml(xml: &str) -> Result<Vec<ParagraphContent>, DocumentError> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();
    let mut parser = BodyParser::default();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => parser.handle_start(&e),
            Ok(Event::Empty(e)) => match e.name().as_ref() {
                // A self-closing <w:p/> is an empty paragraph
                b"w:p" => parser.paragraphs.push(ParagraphContent::default()),
                _ => parser.handle_property(&e),
            },
            Ok(Event::Text(t)) => {
                let text = t
                    .unescape()
                    .map_err(|e| DocumentError::Xml(e.to_string()))?;
                parser.handle_text(&text);
            }
            Ok(Event::End(e)) => parser.handle_end(e.name().as_ref()),
            Ok(Event::Eof) => break,
            Err(e) => return Err(DocumentError::Xml(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    Ok(parser.paragraphs)
}

/// Parse word/styles.xml into the paragraph style table
fn parse_styles_xml(xml: &str) -> Result<Vec<StyleDefinition>, DocumentError> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();
    let mut styles = Vec::new();

    // (id, name) of the w:style element currently open, paragraph type only
    let mut current: Option<(String, String)> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"w:style" => {
                    if get_attr(&e, b"w:type").as_deref() == Some("paragraph") {
                        if let Some(id) = get_attr(&e, b"w:styleId") {
                            current = Some((id, String::new()));
                        }
                    }
                }
                b"w:name" => {
                    if let (Some((_, name)), Some(val)) = (current.as_mut(), get_attr(&e, b"w:val")) {
                        *name = val;
                    }
                }
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.name().as_ref() {
                // A self-closing style has no children, so its name falls
                // back to the id right away
                b"w:style" => {
                    if get_attr(&e, b"w:type").as_deref() == Some("paragraph") {
                        if let Some(id) = get_attr(&e, b"w:styleId") {
                            styles.push(StyleDefinition { name: id.clone(), id });
                        }
                    }
                }
                b"w:name" => {
                    if let (Some((_, name)), Some(val)) = (current.as_mut(), get_attr(&e, b"w:val")) {
                        *name = val;
                    }
                }
                _ => {}
            },
            Ok(Event::End(e)) if e.name().as_ref() == b"w:style" => {
                if let Some((id, name)) = current.take() {
                    let name = if name.is_empty() { id.clone() } else { name };
                    styles.push(StyleDefinition { id, name });
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(DocumentError::Xml(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    Ok(styles)
}

/// Extract an attribute value by key from an element
fn get_attr(e: &quick_xml::events::BytesStart, key: &[u8]) -> Option<String> {
    e.attributes()
        .find(|a| a.as_ref().ok().map(|x| x.key.as_ref()) == Some(key))
        .and_then(Result::ok)
        .map(|attr| String::from_utf8_lossy(&attr.value).to_string())
}

/// Extract an attribute value by key and parse as i32
fn get_attr_i32(e: &quick_xml::events::BytesStart, key: &[u8]) -> Option<i32> {
    get_attr(e, key).and_then(|s| s.parse().ok())
}

/// Extract an attribute value by key and parse as u32
fn get_attr_u32(e: &quick_xml::events::BytesStart, key: &[u8]) -> Option<u32> {
    get_attr(e, key).and_then(|s| s.parse().ok())
}

/// Check if w:val attribute is explicitly "0" or "false" (formatting off)
fn check_val_off(e: &quick_xml::events::BytesStart) -> bool {
    e.attributes().any(|a| {
        if let Ok(attr) = a {
            if attr.key.as_ref() == b"w:val" {
                let v = std::str::from_utf8(&attr.value).unwrap_or_default();
                return v == "0" || v == "false";
            }
        }
        false
    })
}

/// Map a w:jc value onto the writer's alignment type
fn alignment_from_str(value: &str) -> Option<AlignmentType> {
    match value {
        "left" | "start" => Some(AlignmentType::Left),
        "center" => Some(AlignmentType::Center),
        "right" | "end" => Some(AlignmentType::Right),
        "both" | "justify" => Some(AlignmentType::Both),
        "distribute" => Some(AlignmentType::Distribute),
        other => {
            warn!("Unknown paragraph alignment '{}'; leaving default", other);
            None
        }
    }
}

/// Assemble one output paragraph from its captured content
fn build_paragraph(content: &ParagraphContent) -> Paragraph {
    let mut paragraph = Paragraph::new();

    for run_content in &content.runs {
        paragraph = paragraph.add_run(build_run(run_content));
    }

    if let Some(style_id) = &content.style {
        paragraph = paragraph.style(style_id);
    }

    let format = &content.format;
    if let Some(alignment) = format.alignment.as_deref().and_then(alignment_from_str) {
        paragraph = paragraph.align(alignment);
    }

    if format.indent_left.is_some()
        || format.indent_right.is_some()
        || format.indent_first_line.is_some()
    {
        paragraph = paragraph.indent(
            format.indent_left,
            format.indent_first_line.map(SpecialIndentType::FirstLine),
            format.indent_right,
            None,
        );
    }

    if format.space_before.is_some()
        || format.space_after.is_some()
        || format.line_spacing.is_some()
    {
        let mut spacing = LineSpacing::new();
        if let Some(before) = format.space_before {
            spacing = spacing.before(before);
        }
        if let Some(after) = format.space_after {
            spacing = spacing.after(after);
        }
        if let Some(line) = format.line_spacing {
            spacing = spacing.line(line);
        }
        paragraph = paragraph.line_spacing(spacing);
    }

    paragraph
}

/// Assemble one output run from its captured content
fn build_run(content: &RunContent) -> Run {
    let mut run = Run::new().add_text(&content.text);

    if content.bold {
        run = run.bold();
    }
    if content.italic {
        run = run.italic();
    }
    if content.underline {
        run = run.underline("single");
    }
    if let Some(font) = &content.font {
        run = run.fonts(RunFonts::new().ascii(font));
    }
    if let Some(size) = content.size {
        run = run.size(size);
    }
    if let Some(color) = &content.color {
        run = run.color(color);
    }

    run
}
