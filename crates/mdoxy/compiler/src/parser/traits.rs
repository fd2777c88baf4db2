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

//! Parser traits and interfaces

use super::common::{ParseResult, Token};

/// Trait for lexical analyzers (tokenizers)
pub trait Lexer {
    /// Tokenize a whole source text; the last token is always `Eof`
    fn tokenize(&mut self, input: &str) -> ParseResult<Vec<Token>>;

    /// Reset to the initial state
    fn reset(&mut self);

    /// Get the lexer name for debugging
    fn name(&self) -> &'static str;
}

/// Trait for syntax parsers that work with tokens
pub trait SyntaxParser<T> {
    /// Parse tokens into a tree
    fn parse_tokens(&mut self, tokens: &[Token]) -> ParseResult<T>;

    /// Get the parser name for debugging
    fn name(&self) -> &'static str;
}

/// Main parser trait coordinating the lexer and syntax parser
pub trait Parser<T> {
    /// Parse a complete source text
    fn parse(&mut self, input: &str) -> ParseResult<T>;

    /// Reset parser state
    fn reset(&mut self);

    /// Get parser name
    fn name(&self) -> &'static str;
}
