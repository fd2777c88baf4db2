// Dotlanth
// Copyright (C) 2025 Synerthink

// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.

// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! Parser error types and handling
//!
//! Every error here is fatal to the file being translated. Non-fatal findings
//! are [`Diagnostic`](super::Diagnostic)s instead.

use super::Position;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type for parsing operations
pub type ParseResult<T> = Result<T, ParseError>;

/// Main error type for parsing operations
#[derive(Error, Debug, Clone, PartialEq)]
pub struct ParseError {
    /// The kind of error
    pub kind: ParseErrorKind,
    /// Position where the error occurred
    pub position: Position,
    /// Human-readable error message
    pub message: String,
    /// Additional context (usually the offending source line)
    pub context: Option<String>,
    /// File the error belongs to, attached once the pipeline knows it
    pub file: Option<PathBuf>,
}

impl ParseError {
    /// Create a new parse error
    pub fn new(kind: ParseErrorKind, position: Position, message: String) -> Self {
        Self {
            kind,
            position,
            message,
            context: None,
            file: None,
        }
    }

    /// Create an error with context
    pub fn with_context(mut self, context: String) -> Self {
        self.context = Some(context);
        self
    }

    /// Attach the file path the error was raised for
    pub fn in_file(mut self, path: impl AsRef<Path>) -> Self {
        self.file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Category of this error in the failure taxonomy
    pub fn category(&self) -> ErrorCategory {
        self.kind.category()
    }

    /// `path:line:column: message`, the diagnostic line printed on failure
    pub fn location_line(&self) -> String {
        let path = self.file.as_ref().map(|p| p.display().to_string()).unwrap_or_else(|| "<input>".to_string());
        format!("{}:{}:{}: {}", path, self.position.line, self.position.column, self.message)
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        format!("{} at line {}, column {}: {}", self.kind.description(), self.position.line, self.position.column, self.message)
    }

    /// Get detailed error information for debugging
    pub fn debug_message(&self) -> String {
        let mut msg = format!(
            "[{}] {} at {}:{}: {}",
            self.kind.code(),
            self.kind.description(),
            self.position.line,
            self.position.column,
            self.message
        );

        if let Some(context) = &self.context {
            msg.push_str(&format!("\nContext: {}", context));
        }

        msg
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.location_line())
    }
}

/// The failure taxonomy a [`ParseErrorKind`] belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Unterminated literal or comment
    LexError,
    /// Unexpected token or unbalanced block
    SyntaxError,
    /// A recognized construct the filter does not handle
    UnsupportedConstructError,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorCategory::LexError => "LexError",
            ErrorCategory::SyntaxError => "SyntaxError",
            ErrorCategory::UnsupportedConstructError => "UnsupportedConstructError",
        };
        write!(f, "{}", name)
    }
}

/// Concrete parse failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    #[error("Unterminated string")]
    UnterminatedString,

    #[error("Unterminated comment")]
    UnterminatedComment,

    #[error("Unbalanced bracket")]
    UnbalancedBracket,

    #[error("Unexpected token")]
    UnexpectedToken,

    #[error("Unexpected end of file")]
    UnexpectedEof,

    #[error("Unrecognized block keyword")]
    UnrecognizedBlock,

    #[error("Unsupported construct")]
    UnsupportedConstruct,

    #[error("Invalid accessor signature")]
    InvalidAccessor,

    #[error("Accessor for undeclared property")]
    UnknownAccessorTarget,
}

impl ParseErrorKind {
    /// Get a short error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ParseErrorKind::UnterminatedString => "E001",
            ParseErrorKind::UnterminatedComment => "E002",
            ParseErrorKind::UnbalancedBracket => "E003",
            ParseErrorKind::UnexpectedToken => "E004",
            ParseErrorKind::UnexpectedEof => "E005",
            ParseErrorKind::UnrecognizedBlock => "E006",
            ParseErrorKind::UnsupportedConstruct => "E007",
            ParseErrorKind::InvalidAccessor => "E008",
            ParseErrorKind::UnknownAccessorTarget => "E009",
        }
    }

    /// Get a human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            ParseErrorKind::UnterminatedString => "Unterminated string literal",
            ParseErrorKind::UnterminatedComment => "Unterminated block comment",
            ParseErrorKind::UnbalancedBracket => "Unbalanced bracket",
            ParseErrorKind::UnexpectedToken => "Unexpected token",
            ParseErrorKind::UnexpectedEof => "Unexpected end of file",
            ParseErrorKind::UnrecognizedBlock => "Unrecognized block keyword",
            ParseErrorKind::UnsupportedConstruct => "Unsupported construct",
            ParseErrorKind::InvalidAccessor => "Invalid accessor signature",
            ParseErrorKind::UnknownAccessorTarget => "Accessor for undeclared property",
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            ParseErrorKind::UnterminatedString | ParseErrorKind::UnterminatedComment => ErrorCategory::LexError,
            ParseErrorKind::UnbalancedBracket
            | ParseErrorKind::UnexpectedToken
            | ParseErrorKind::UnexpectedEof
            | ParseErrorKind::UnrecognizedBlock
            | ParseErrorKind::InvalidAccessor
            | ParseErrorKind::UnknownAccessorTarget => ErrorCategory::SyntaxError,
            ParseErrorKind::UnsupportedConstruct => ErrorCategory::UnsupportedConstructError,
        }
    }
}

/// Helper functions for creating common errors
impl ParseError {
    /// Create an unexpected token error
    pub fn unexpected_token(position: Position, found: String, expected: Option<String>) -> Self {
        let message = if let Some(exp) = expected {
            format!("found '{}', expected {}", found, exp)
        } else {
            format!("unexpected token '{}'", found)
        };
        Self::new(ParseErrorKind::UnexpectedToken, position, message)
    }

    /// Create an unexpected EOF error
    pub fn unexpected_eof(position: Position, expected: &str) -> Self {
        Self::new(ParseErrorKind::UnexpectedEof, position, format!("unexpected end of file, expected {}", expected))
    }

    /// Create an unsupported construct error
    pub fn unsupported(position: Position, construct: &str) -> Self {
        Self::new(ParseErrorKind::UnsupportedConstruct, position, format!("{} is not supported", construct))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_creation() {
        let pos = Position::new(10, 5);
        let error = ParseError::new(ParseErrorKind::UnexpectedToken, pos, "Test error".to_string());

        assert_eq!(error.kind, ParseErrorKind::UnexpectedToken);
        assert_eq!(error.position, pos);
        assert_eq!(error.message, "Test error");
        assert!(error.context.is_none());
        assert!(error.file.is_none());
    }

    #[test]
    fn test_location_line_format() {
        let error = ParseError::new(ParseErrorKind::UnterminatedString, Position::new(3, 7), "unterminated literal".to_string()).in_file("pkg/A.m");
        assert_eq!(error.to_string(), "pkg/A.m:3:7: unterminated literal");

        let anonymous = ParseError::unexpected_eof(Position::new(1, 1), "'end'");
        assert!(anonymous.to_string().starts_with("<input>:1:1: "));
    }

    #[test]
    fn test_categories() {
        assert_eq!(ParseErrorKind::UnterminatedComment.category(), ErrorCategory::LexError);
        assert_eq!(ParseErrorKind::UnbalancedBracket.category(), ErrorCategory::SyntaxError);
        assert_eq!(ParseErrorKind::UnrecognizedBlock.category(), ErrorCategory::SyntaxError);
        assert_eq!(ParseErrorKind::UnsupportedConstruct.category(), ErrorCategory::UnsupportedConstructError);
        assert_eq!(ErrorCategory::LexError.to_string(), "LexError");
    }

    #[test]
    fn test_error_codes_and_messages() {
        assert_eq!(ParseErrorKind::UnexpectedToken.code(), "E004");
        let error = ParseError::unexpected_token(Position::new(2, 4), "=".to_string(), Some("identifier".to_string())).with_context("  = 3".to_string());
        assert!(error.user_message().contains("line 2, column 4"));
        assert!(error.message.contains("found '=', expected identifier"));
        let debug = error.debug_message();
        assert!(debug.contains("E004"));
        assert!(debug.contains("Context:   = 3"));
    }
}
