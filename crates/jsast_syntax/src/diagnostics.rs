//! Parse diagnostics.
//!
//! A [`ParseError`] is what both the lexer and the parser report. Errors are classified by *where*
//! the scanner was when they were raised: a failure with the scanner sitting at the end of input is
//! an [`ParseErrorKind::EndOfInput`] (the user is most likely still typing), anything else is
//! [`ParseErrorKind::Unexpected`].

use serde::Serialize;
use thiserror::Error;

use crate::ast::Span;
use crate::lines::LineIndex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ParseErrorKind {
    EndOfInput,
    Unexpected,
}

impl std::fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseErrorKind::EndOfInput => write!(f, "end of input"),
            ParseErrorKind::Unexpected => write!(f, "unexpected"),
        }
    }
}

/// A syntax error with location information.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(rename_all = "camelCase")]
#[error("{message} ({line_number}:{column})")]
pub struct ParseError {
    pub message: String,
    /// Byte offset the error points at.
    pub index: usize,
    /// Extent of the offending source, at least one byte wide when possible.
    #[serde(skip)]
    pub span: Span,
    /// 1-based line.
    pub line_number: u32,
    /// 0-based column.
    pub column: u32,
    #[serde(rename = "type")]
    pub kind: ParseErrorKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_file: Option<String>,
}

impl ParseError {
    pub fn new(message: impl Into<String>, span: Span, kind: ParseErrorKind) -> Self {
        Self {
            message: message.into(),
            index: span.start,
            span,
            line_number: 0,
            column: 0,
            kind,
            source_file: None,
        }
    }

    /// Fill in line/column from a line index.
    pub fn locate(mut self, lines: &LineIndex) -> Self {
        let lc = lines.line_column(self.index);
        self.line_number = lc.line;
        self.column = lc.column;
        self
    }

    pub fn with_source_file(mut self, file: impl Into<String>) -> Self {
        self.source_file = Some(file.into());
        self
    }

    pub fn is_end_of_input(&self) -> bool {
        self.kind == ParseErrorKind::EndOfInput
    }
}
