//! Diagnostics with source location tracking.
//!
//! Every error and warning produced by the compiler carries a [`Span`] and the
//! name of the file it came from. The display format is the one editors and
//! test suites pattern-match on:
//!
//! ```text
//! app.tova:3:14 'count' is not defined (hint: did you mean 'counts'?)
//! ```

use crate::span::Span;
use std::fmt;

/// How serious a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// A single compiler message anchored to a source location.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub span: Span,
    pub file: String,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>, span: Span, file: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
            span,
            file: file.into(),
        }
    }

    pub fn warning(message: impl Into<String>, span: Span, file: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
            span,
            file: file.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{} {}",
            self.file, self.span.line, self.span.column, self.message
        )
    }
}

impl std::error::Error for Diagnostic {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostic_display_has_file_line_column_prefix() {
        let d = Diagnostic::error("'x' is not defined", Span::new(10, 11, 3, 14), "app.tova");
        assert_eq!(d.to_string(), "app.tova:3:14 'x' is not defined");
    }

    #[test]
    fn warning_is_not_error() {
        let d = Diagnostic::warning("Unused variable 'y'", Span::default(), "app.tova");
        assert!(!d.is_error());
        assert_eq!(d.severity, Severity::Warning);
    }
}
