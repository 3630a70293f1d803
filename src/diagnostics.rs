//! Diagnostic reporting infrastructure.
//!
//! Errors carry a kind from the taxonomy below, a message naming the
//! construct being parsed, and the location it happened at. Lexical errors,
//! unexpected tokens and unbalanced delimiters are fatal; `Unsupported`
//! constructs are skipped and recorded as diagnostics.

use ariadne::{Color, Label, Report, ReportKind, Source};
use thiserror::Error;

use crate::span::Location;

/// The error taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Unterminated string/char/comment, invalid character, malformed
    /// number.
    LexicalError,
    /// Expected one of {...}, found something else.
    UnexpectedToken,
    /// Mismatched brackets, parens or braces.
    UnbalancedDelimiter,
    /// The declaration-vs-expression resolver reached no conclusion.
    AmbiguousDeclaration,
    /// Valid C++ that this parser intentionally does not model.
    Unsupported,
    /// A bug guard.
    InternalInvariantBroken,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::LexicalError => "lexical error",
            ErrorCode::UnexpectedToken => "unexpected token",
            ErrorCode::UnbalancedDelimiter => "unbalanced delimiter",
            ErrorCode::AmbiguousDeclaration => "ambiguous declaration",
            ErrorCode::Unsupported => "unsupported construct",
            ErrorCode::InternalInvariantBroken => "internal invariant broken",
        }
    }

    /// Whether the parser can skip past this error and continue.
    pub fn is_recoverable(self) -> bool {
        matches!(self, ErrorCode::Unsupported)
    }
}

/// A structured parse error.
#[derive(Debug, Clone, Error)]
#[error("{location}: {message}")]
pub struct ParseError {
    pub code: ErrorCode,
    pub message: String,
    pub location: Location,
}

impl ParseError {
    pub fn new(code: ErrorCode, message: impl Into<String>, location: Location) -> Self {
        Self {
            code,
            message: message.into(),
            location,
        }
    }

    /// Add "while parsing X" context to the message.
    pub fn with_context(mut self, context: &str) -> Self {
        self.message = format!("{} (while parsing {})", self.message, context);
        self
    }
}

/// Severity of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// A diagnostic surfaced alongside a successful parse (recoverable errors),
/// or attached to a failure.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: ErrorCode,
    pub message: String,
    pub location: Location,
}

impl Diagnostic {
    pub fn error(code: ErrorCode, message: impl Into<String>, location: Location) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
            location,
        }
    }

    pub fn warning(code: ErrorCode, message: impl Into<String>, location: Location) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
            location,
        }
    }
}

impl From<&ParseError> for Diagnostic {
    fn from(err: &ParseError) -> Self {
        Diagnostic::error(err.code, err.message.clone(), err.location.clone())
    }
}

/// Pretty-printer for diagnostics, used by the CLI.
pub struct DiagnosticEmitter<'a> {
    filename: &'a str,
    source: &'a str,
}

impl<'a> DiagnosticEmitter<'a> {
    pub fn new(filename: &'a str, source: &'a str) -> Self {
        Self { filename, source }
    }

    /// Byte offset of a location in the source, for span rendering.
    fn offset_of(&self, location: &Location) -> usize {
        let mut line = 1u32;
        let mut offset = 0usize;
        for (i, b) in self.source.bytes().enumerate() {
            if line == location.line {
                offset = i + location.column.saturating_sub(1) as usize;
                break;
            }
            if b == b'\n' {
                line += 1;
                offset = i + 1;
            }
        }
        offset.min(self.source.len())
    }

    /// Emit a parse error to stderr.
    pub fn emit(&self, error: &ParseError) {
        let offset = self.offset_of(&error.location);
        let end = (offset + 1).min(self.source.len());
        let report = Report::build(ReportKind::Error, self.filename, offset)
            .with_message(format!("{}: {}", error.code.as_str(), error.message))
            .with_label(
                Label::new((self.filename, offset..end))
                    .with_color(Color::Red)
                    .with_message(&error.message),
            )
            .finish();

        let _ = report.eprint((self.filename, Source::from(self.source)));
    }

    /// Emit a diagnostic to stderr.
    pub fn emit_diagnostic(&self, diagnostic: &Diagnostic) {
        let offset = self.offset_of(&diagnostic.location);
        let end = (offset + 1).min(self.source.len());
        let kind = match diagnostic.severity {
            Severity::Error => ReportKind::Error,
            Severity::Warning => ReportKind::Warning,
        };
        let color = match diagnostic.severity {
            Severity::Error => Color::Red,
            Severity::Warning => Color::Yellow,
        };
        let report = Report::build(kind, self.filename, offset)
            .with_message(format!(
                "{}: {}",
                diagnostic.code.as_str(),
                diagnostic.message
            ))
            .with_label(
                Label::new((self.filename, offset..end))
                    .with_color(color)
                    .with_message(&diagnostic.message),
            )
            .finish();

        let _ = report.eprint((self.filename, Source::from(self.source)));
    }
}
