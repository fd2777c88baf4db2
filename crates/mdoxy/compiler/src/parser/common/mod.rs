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

//! Common parsing utilities and types

pub mod diagnostic;
pub mod error;
pub mod position;
pub mod token;

pub use diagnostic::{Diagnostic, DiagnosticKind, Severity};
pub use error::{ErrorCategory, ParseError, ParseErrorKind, ParseResult};
pub use position::{Position, Span};
pub use token::{Delimiter, Keyword, Operator, Token, TokenType};

use std::path::{Path, PathBuf};

/// Configuration for the class parser
#[derive(Debug, Clone)]
pub struct ParserConfig {
    /// Maximum nesting depth of body constructs (`if`, `for`, nested `function`, ...)
    pub max_nesting_depth: usize,
    /// Whether local functions after the class `end` are accepted
    pub allow_local_functions: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_nesting_depth: 256,
            allow_local_functions: true,
        }
    }
}

impl ParserConfig {
    /// Create a new parser configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set maximum nesting depth
    pub fn with_max_nesting_depth(mut self, depth: usize) -> Self {
        self.max_nesting_depth = depth;
        self
    }

    /// Accept or reject local functions after the class definition
    pub fn with_local_functions(mut self, allow: bool) -> Self {
        self.allow_local_functions = allow;
        self
    }
}

/// Context information for parsing one file
#[derive(Debug, Clone)]
pub struct ParseContext<'src> {
    /// File being parsed
    pub file_name: PathBuf,
    /// Parser configuration
    pub config: ParserConfig,
    /// Source code being parsed
    pub source: &'src str,
}

impl<'src> ParseContext<'src> {
    /// Create a new parse context
    pub fn new(file_name: impl AsRef<Path>, source: &'src str) -> Self {
        Self {
            file_name: file_name.as_ref().to_path_buf(),
            config: ParserConfig::default(),
            source,
        }
    }

    /// Create context with custom configuration
    pub fn with_config(file_name: impl AsRef<Path>, source: &'src str, config: ParserConfig) -> Self {
        Self {
            file_name: file_name.as_ref().to_path_buf(),
            config,
            source,
        }
    }

    /// Get a line from the source code
    pub fn get_line(&self, line_number: usize) -> Option<&'src str> {
        self.source.lines().nth(line_number.saturating_sub(1))
    }

    /// Attach the file path and offending source line to an error
    pub fn locate(&self, error: ParseError) -> ParseError {
        let line = self.get_line(error.position.line).map(|l| l.trim_end().to_string());
        let error = error.in_file(&self.file_name);
        match line {
            Some(line) if error.context.is_none() => error.with_context(line),
            _ => error,
        }
    }
}

/// Utility functions for parsing
pub mod utils {
    /// Check if a character is a valid identifier start
    pub fn is_identifier_start(c: char) -> bool {
        c.is_ascii_alphabetic()
    }

    /// Check if a character is a valid identifier continuation
    pub fn is_identifier_continue(c: char) -> bool {
        c.is_ascii_alphanumeric() || c == '_'
    }

    /// Check if a string is a valid identifier
    pub fn is_valid_identifier(s: &str) -> bool {
        let mut chars = s.chars();
        match chars.next() {
            Some(first) if is_identifier_start(first) => chars.all(is_identifier_continue),
            _ => false,
        }
    }

    /// Qualify a dotted source name with the output scope-resolution syntax
    ///
    /// `pkg.sub.Type` becomes `::pkg::sub::Type`.
    pub fn qualify(dotted: &str) -> String {
        dotted.split('.').filter(|part| !part.is_empty()).fold(String::new(), |mut acc, part| {
            acc.push_str("::");
            acc.push_str(part);
            acc
        })
    }

    /// Break up comment terminators so text can be embedded in a `/* */` comment
    pub fn escape_comment_text(text: &str) -> String {
        text.replace("*/", "* /")
    }
}
