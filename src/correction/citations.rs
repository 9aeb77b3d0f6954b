/*!
 * Citation masking and restoration.
 *
 * Citation-like spans (quoted text, parenthesized or bracketed references
 * containing a 4-digit year) are replaced with opaque placeholder tokens
 * before a paragraph is sent to a correction backend, and restored after
 * the corrected text comes back. Backends are instructed not to touch the
 * tokens, but the restore path tolerates the whitespace they sometimes
 * introduce around them.
 */

use once_cell::sync::Lazy;
use regex::Regex;
use uuid::Uuid;

// @const: Citation span regex; alternatives are tried in priority order,
// scanning left-to-right, first match wins
static CITATION_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#""[^"\n]*?"|'[^'\n]*?'|\([^)]*?\d{4}[^)]*?\)|\[[^\]]*?\d{4}[^\]]*?\]"#).unwrap()
});

// @const: Placeholder token regex (32 lowercase hex chars from a UUIDv4)
static PLACEHOLDER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"__CITATION_[0-9a-f]{32}__").unwrap()
});

/// Ordered mapping from placeholder tokens to the original citation text.
///
/// Iteration order equals mint order, i.e. left-to-right occurrence order
/// of the citations in the source text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CitationMap {
    entries: Vec<(String, String)>,
}

impl CitationMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    fn insert(&mut self, placeholder: String, original: String) {
        self.entries.push((placeholder, original));
    }

    /// Iterate over (placeholder, original) pairs in mint order
    pub fn iter(&self) -> impl Iterator<Item = &(String, String)> {
        self.entries.iter()
    }

    /// Number of masked citations
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no citations were masked
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The original text for a placeholder, if present
    pub fn original_for(&self, placeholder: &str) -> Option<&str> {
        self.entries.iter()
            .find(|(p, _)| p == placeholder)
            .map(|(_, o)| o.as_str())
    }
}

/// Masks citation spans behind opaque placeholders and restores them
pub struct CitationGuard;

impl CitationGuard {
    /// Replace every citation span in `text` with a freshly minted
    /// placeholder token, returning the masked text and the mapping.
    ///
    /// Placeholders are globally unique per invocation and contain only
    /// hex characters, so a placeholder can never itself match the
    /// citation pattern.
    pub fn mask(text: &str) -> (String, CitationMap) {
        let mut citations = CitationMap::new();
        let masked = CITATION_REGEX.replace_all(text, |caps: &regex::Captures| {
            let placeholder = format!("__CITATION_{}__", Uuid::new_v4().simple());
            citations.insert(placeholder.clone(), caps[0].to_string());
            placeholder
        });
        (masked.into_owned(), citations)
    }

    /// Substitute the original citation text back for each placeholder.
    ///
    /// For every pair in map order, only the FIRST remaining occurrence of
    /// the placeholder is replaced. Placeholders are unique so replace-all
    /// would coincide in practice, but first-occurrence replacement avoids
    /// double substitution if a backend ever duplicates a token.
    ///
    /// A placeholder the backend dropped entirely stays absent from the
    /// output; that citation is lost and the caller surfaces the warning.
    pub fn restore(masked: &str, citations: &CitationMap) -> String {
        let mut text = masked.to_string();
        for (placeholder, original) in citations.iter() {
            text = text.replacen(placeholder.as_str(), original, 1);
        }
        text
    }

    /// Strip the single space a backend may have introduced next to a
    /// placeholder token, using the text that was sent as the reference
    /// for which spaces are legitimate.
    pub fn normalize_spacing(sent: &str, received: &str) -> String {
        let mut out = received.to_string();
        for m in PLACEHOLDER_REGEX.find_iter(sent) {
            let token = m.as_str();
            let had_leading_space = sent[..m.start()].ends_with(' ');
            let had_trailing_space = sent[m.end()..].starts_with(' ');

            let padded_leading = format!(" {}", token);
            let padded_trailing = format!("{} ", token);

            if had_leading_space {
                // A legitimate space exists; collapse any doubled one
                out = out.replacen(&format!(" {}", padded_leading), &padded_leading, 1);
            } else {
                out = out.replacen(&padded_leading, token, 1);
            }

            if had_trailing_space {
                out = out.replacen(&format!("{} ", padded_trailing), &padded_trailing, 1);
            } else {
                out = out.replacen(&padded_trailing, token, 1);
            }
        }
        out
    }

    /// List all placeholder tokens present in a text
    pub fn placeholders_in(text: &str) -> Vec<&str> {
        PLACEHOLDER_REGEX.find_iter(text).map(|m| m.as_str()).collect()
    }

    /// Byte ranges of all placeholder tokens present in a text
    pub fn placeholder_byte_ranges(text: &str) -> Vec<(usize, usize)> {
        PLACEHOLDER_REGEX.find_iter(text).map(|m| (m.start(), m.end())).collect()
    }

    /// Placeholders from the map that are missing from the corrected text,
    /// i.e. citations a backend dropped
    pub fn missing_placeholders<'a>(text: &str, citations: &'a CitationMap) -> Vec<&'a str> {
        citations.iter()
            .filter(|(placeholder, _)| !text.contains(placeholder.as_str()))
            .map(|(placeholder, _)| placeholder.as_str())
            .collect()
    }
}
