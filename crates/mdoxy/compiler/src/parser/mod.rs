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

//! Parser module for class definition files
//!
//! The parser is organized into several layers:
//! - **Common**: Shared types, positions, errors and diagnostics
//! - **Traits**: Interfaces for the scanner and syntax parser
//! - **Classdef**: The scanner state machine and the recursive-descent class parser
//!
//! # Example Usage
//!
//! ```rust
//! use mdoxy_compiler::parser::{ClassdefParser, ParseContext};
//!
//! let source = "classdef A < handle\nend\n";
//! let mut parser = ClassdefParser::new(ParseContext::new("A.m", source));
//! let class = parser.parse_class().unwrap();
//! assert_eq!(class.name, "A");
//! ```

pub mod classdef;
pub mod common;
pub mod traits;

// Re-export commonly used types
pub use classdef::{ClassdefParser, ClassdefScanner, ClassdefSyntaxParser};
pub use common::{
    Delimiter, Diagnostic, DiagnosticKind, ErrorCategory, Keyword, Operator, ParseContext, ParseError, ParseErrorKind, ParseResult, ParserConfig, Position, Severity, Span,
    Token, TokenType,
};
pub use traits::{Lexer, Parser, SyntaxParser};

/// Quick parse function for simple use cases
pub fn parse_class(file_name: &str, source: &str) -> ParseResult<crate::ast::ClassDeclaration> {
    ClassdefParser::new(ParseContext::new(file_name, source)).parse_class()
}
