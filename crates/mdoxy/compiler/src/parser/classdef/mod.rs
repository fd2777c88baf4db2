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

//! Classdef-specific parsing implementation

pub mod scanner;
pub mod syntax_parser;

pub use scanner::ClassdefScanner;
pub use syntax_parser::ClassdefSyntaxParser;

use super::common::{ParseContext, ParseResult};
use super::traits::{Lexer, Parser, SyntaxParser};
use crate::ast::ClassDeclaration;
use tracing::debug;

/// Main classdef parser that coordinates scanning and syntax analysis
pub struct ClassdefParser<'src> {
    scanner: ClassdefScanner,
    context: ParseContext<'src>,
}

impl<'src> ClassdefParser<'src> {
    /// Create a new parser for one file
    pub fn new(context: ParseContext<'src>) -> Self {
        Self {
            scanner: ClassdefScanner::new(),
            context,
        }
    }

    /// Parse the context's source into a class declaration
    ///
    /// Errors carry the file path and offending source line.
    pub fn parse_class(&mut self) -> ParseResult<ClassDeclaration> {
        let source = self.context.source;
        self.parse_source(source).map_err(|error| self.context.locate(error))
    }

    fn parse_source(&mut self, source: &str) -> ParseResult<ClassDeclaration> {
        // Step 1: Lexical analysis
        let tokens = self.scanner.tokenize(source)?;
        debug!(file = %self.context.file_name.display(), tokens = tokens.len(), "scanned");

        // Step 2: Syntax analysis
        let mut syntax_parser = ClassdefSyntaxParser::new(source, self.context.config.clone());
        let class = syntax_parser.parse_tokens(&tokens)?;
        debug!(file = %self.context.file_name.display(), class = %class.name, blocks = class.blocks.len(), "parsed");

        Ok(class)
    }

    /// Get the current parsing context
    pub fn context(&self) -> &ParseContext<'src> {
        &self.context
    }
}

impl Parser<ClassDeclaration> for ClassdefParser<'_> {
    fn parse(&mut self, input: &str) -> ParseResult<ClassDeclaration> {
        self.parse_source(input).map_err(|error| error.in_file(&self.context.file_name))
    }

    fn reset(&mut self) {
        self.scanner.reset();
    }

    fn name(&self) -> &'static str {
        "ClassdefParser"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::common::{ParseErrorKind, Position};
    use std::path::Path;

    #[test]
    fn test_classdef_parser_creation() {
        let parser = ClassdefParser::new(ParseContext::new("A.m", ""));
        assert_eq!(parser.name(), "ClassdefParser");
        assert_eq!(parser.context().file_name, Path::new("A.m"));
    }

    #[test]
    fn test_parse_class_from_context() {
        let source = "classdef A < handle\n  properties\n    x\n  end\nend\n";
        let mut parser = ClassdefParser::new(ParseContext::new("A.m", source));
        let class = parser.parse_class().unwrap();
        assert_eq!(class.name, "A");
        assert_eq!(class.superclasses[0].qualified(), "::handle");
    }

    #[test]
    fn test_errors_are_located() {
        let source = "classdef A\n  properties\n    x = [1 2\n  end\n";
        let mut parser = ClassdefParser::new(ParseContext::new("pkg/A.m", source));
        let error = parser.parse_class().unwrap_err();
        assert_eq!(error.kind, ParseErrorKind::UnbalancedBracket);
        assert_eq!(error.position, Position::new(3, 9));
        assert_eq!(error.to_string(), "pkg/A.m:3:9: unclosed '[' at end of file");
        assert_eq!(error.context.as_deref(), Some("    x = [1 2"));
    }
}
