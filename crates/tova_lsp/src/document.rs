//! Per-document state: the tolerant front-end products plus LSP-shaped
//! diagnostics.

use tower_lsp::lsp_types::{Diagnostic, DiagnosticSeverity, Position, Range};

use tova_base::Severity;
use tova_language::session::{analyze_text, FileEntry};

pub struct DocumentState {
    pub entry: FileEntry,
    pub version: i32,
    pub diagnostics: Vec<Diagnostic>,
}

impl DocumentState {
    pub fn new(uri: &str, source: String, version: i32) -> Self {
        let entry = analyze_text(uri, &source);
        let diagnostics = entry
            .diagnostics
            .iter()
            .map(|diag| Diagnostic {
                range: span_range(&diag.span),
                severity: Some(match diag.severity {
                    Severity::Error => DiagnosticSeverity::ERROR,
                    Severity::Warning => DiagnosticSeverity::WARNING,
                }),
                source: Some("tova".to_string()),
                message: diag.message.clone(),
                ..Default::default()
            })
            .collect();
        DocumentState {
            entry,
            version,
            diagnostics,
        }
    }
}

/// Our spans are 1-based; LSP positions are 0-based.
pub fn span_range(span: &tova_base::Span) -> Range {
    let line = span.line.saturating_sub(1);
    let character = span.column.saturating_sub(1);
    Range {
        start: Position { line, character },
        end: Position {
            line,
            character: character + span.len().max(1) as u32,
        },
    }
}

/// The identifier under a 0-based LSP position, if any.
pub fn word_at(text: &str, line: u32, character: u32) -> Option<String> {
    let line_text = text.lines().nth(line as usize)?;
    let chars: Vec<char> = line_text.chars().collect();
    let mut idx = (character as usize).min(chars.len());
    let is_word = |c: char| c.is_ascii_alphanumeric() || c == '_';

    if idx >= chars.len() || !is_word(chars[idx]) {
        if idx == 0 {
            return None;
        }
        idx -= 1;
    }
    if !is_word(*chars.get(idx)?) {
        return None;
    }
    let mut start = idx;
    while start > 0 && is_word(chars[start - 1]) {
        start -= 1;
    }
    let mut end = idx;
    while end + 1 < chars.len() && is_word(chars[end + 1]) {
        end += 1;
    }
    Some(chars[start..=end].iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_at_finds_identifier() {
        assert_eq!(word_at("count += 1", 0, 2), Some("count".to_string()));
        assert_eq!(word_at("count += 1", 0, 0), Some("count".to_string()));
        assert_eq!(word_at("a b", 0, 1), Some("a".to_string()));
        assert_eq!(word_at("", 0, 0), None);
    }

    #[test]
    fn diagnostics_are_zero_based() {
        let doc = DocumentState::new("test.tova", "x = missing_name\n".to_string(), 1);
        assert!(!doc.diagnostics.is_empty());
        assert_eq!(doc.diagnostics[0].range.start.line, 0);
        assert!(doc.diagnostics[0].message.contains("not defined"));
    }
}
