//! Source reader.
//!
//! Wraps the raw header text and prepares it for the lexer: line endings are
//! normalized to `\n` and line continuations (`\` at end of line) are
//! removed. The reader records where lines were joined so that line numbers
//! reported for later tokens still match the physical input.

use std::sync::Arc;

use crate::span::LineIndex;

/// Cleaned source text plus the bookkeeping needed to map byte offsets in
/// the cleaned text back to physical line/column coordinates.
#[derive(Debug, Clone)]
pub struct SourceText {
    filename: Arc<str>,
    text: String,
    index: LineIndex,
    /// Offsets into the cleaned text at which a line continuation was
    /// removed. Each entry pushes subsequent lines down by one.
    joins: Vec<usize>,
}

impl SourceText {
    /// Clean the input and build the line index.
    pub fn new(filename: &str, raw: &str) -> Self {
        let mut text = String::with_capacity(raw.len());
        let mut joins = Vec::new();

        let normalized;
        let raw = if raw.contains('\r') {
            normalized = raw.replace("\r\n", "\n").replace('\r', "\n");
            normalized.as_str()
        } else {
            raw
        };

        let mut rest = raw;
        while let Some(pos) = rest.find("\\\n") {
            text.push_str(&rest[..pos]);
            joins.push(text.len());
            rest = &rest[pos + 2..];
        }
        text.push_str(rest);

        let index = LineIndex::new(&text);
        Self {
            filename: Arc::from(filename),
            text,
            index,
            joins,
        }
    }

    pub fn filename(&self) -> &Arc<str> {
        &self.filename
    }

    /// The cleaned text the lexer runs over.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Physical 1-indexed line and column for a cleaned-text byte offset.
    ///
    /// Columns on a line that was joined from several physical lines are
    /// reported relative to the joined line.
    pub fn line_col(&self, offset: usize) -> (u32, u32) {
        let (line, col) = self.index.line_col(offset);
        let removed = self.joins.partition_point(|&j| j <= offset) as u32;
        (line + removed, col)
    }
}
