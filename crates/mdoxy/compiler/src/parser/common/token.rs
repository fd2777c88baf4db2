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

//! Token definitions for classdef sources

use super::position::Span;
use std::fmt;

/// A token in the source code
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// The type of token
    pub token_type: TokenType,
    /// The source text that produced this token
    pub lexeme: String,
    /// The position range of this token
    pub span: Span,
    /// Byte offset of the first character of `lexeme` in the source
    pub offset: usize,
    /// Whether whitespace separates this token from the previous one on the same line
    pub spaced: bool,
}

impl Token {
    /// Create a new token
    pub fn new(token_type: TokenType, lexeme: String, span: Span, offset: usize) -> Self {
        Self {
            token_type,
            lexeme,
            span,
            offset,
            spaced: false,
        }
    }

    /// Byte offset one past the last character of this token
    pub fn end_offset(&self) -> usize {
        self.offset + self.lexeme.len()
    }

    /// First line covered by the token
    pub fn line(&self) -> usize {
        self.span.start.line
    }

    /// Check if this token is a keyword
    pub fn is_keyword(&self) -> bool {
        matches!(self.token_type, TokenType::Keyword(_))
    }

    /// Get the delimiter if this token is a delimiter
    pub fn as_delimiter(&self) -> Option<Delimiter> {
        match &self.token_type {
            TokenType::Delimiter(delim) => Some(*delim),
            _ => None,
        }
    }

    /// Check for a specific delimiter
    pub fn is_delimiter(&self, delimiter: Delimiter) -> bool {
        self.as_delimiter() == Some(delimiter)
    }

    /// Check for a specific operator
    pub fn is_operator(&self, operator: &Operator) -> bool {
        matches!(&self.token_type, TokenType::Operator(op) if op == operator)
    }

    /// Check whether this token ends a statement at bracket depth zero
    pub fn is_statement_end(&self) -> bool {
        matches!(
            self.token_type,
            TokenType::Newline | TokenType::Eof | TokenType::Delimiter(Delimiter::Semicolon) | TokenType::Delimiter(Delimiter::Comma)
        )
    }

    /// Tokens after which a `'` is a transpose rather than a literal
    pub fn is_operand_end(&self) -> bool {
        match &self.token_type {
            TokenType::Identifier(_) | TokenType::Number(_) | TokenType::CharLiteral(_) | TokenType::StringLiteral(_) => true,
            TokenType::Keyword(Keyword::End) => true,
            TokenType::Delimiter(d) => d.is_closing(),
            TokenType::Operator(Operator::Transpose) | TokenType::Operator(Operator::Dot) => true,
            _ => false,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}'", self.token_type, self.lexeme.escape_debug())
    }
}

/// Types of tokens in classdef sources
#[derive(Debug, Clone, PartialEq)]
pub enum TokenType {
    /// Numeric literal, kept as written
    Number(String),
    /// Single-quoted char array, decoded (`''` → `'`)
    CharLiteral(String),
    /// Double-quoted string, decoded (`""` → `"`)
    StringLiteral(String),

    Identifier(String),

    /// Structural keyword, only produced at the start of a statement
    Keyword(Keyword),

    Operator(Operator),

    Delimiter(Delimiter),

    /// `%` line comment; carries the text after the `%` run
    Comment(String),
    /// `%{ ... %}` block comment; carries the inner lines
    BlockComment(Vec<String>),
    /// `...` continuation; carries the rest of the line
    Continuation(String),

    Newline,

    Eof,
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenType::Number(_) => write!(f, "number"),
            TokenType::CharLiteral(_) => write!(f, "char literal"),
            TokenType::StringLiteral(_) => write!(f, "string literal"),
            TokenType::Identifier(_) => write!(f, "identifier"),
            TokenType::Keyword(kw) => write!(f, "keyword {}", kw),
            TokenType::Operator(_) => write!(f, "operator"),
            TokenType::Delimiter(_) => write!(f, "delimiter"),
            TokenType::Comment(_) | TokenType::BlockComment(_) => write!(f, "comment"),
            TokenType::Continuation(_) => write!(f, "continuation"),
            TokenType::Newline => write!(f, "newline"),
            TokenType::Eof => write!(f, "end of file"),
        }
    }
}

/// Keywords recognized at the start of a statement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    Classdef,
    Properties,
    Methods,
    Events,
    Enumeration,
    Function,
    End,
    If,
    For,
    Parfor,
    While,
    Switch,
    Try,
    Spmd,
    Arguments,
}

impl Keyword {
    /// Map a statement-start word onto a keyword
    pub fn from_statement_start(word: &str) -> Option<Self> {
        let keyword = match word {
            "classdef" => Keyword::Classdef,
            "properties" => Keyword::Properties,
            "methods" => Keyword::Methods,
            "events" => Keyword::Events,
            "enumeration" => Keyword::Enumeration,
            "function" => Keyword::Function,
            "end" => Keyword::End,
            "if" => Keyword::If,
            "for" => Keyword::For,
            "parfor" => Keyword::Parfor,
            "while" => Keyword::While,
            "switch" => Keyword::Switch,
            "try" => Keyword::Try,
            "spmd" => Keyword::Spmd,
            "arguments" => Keyword::Arguments,
            _ => return None,
        };
        Some(keyword)
    }

    /// Keywords that open a construct closed by `end` inside function bodies
    pub fn opens_body_construct(&self) -> bool {
        matches!(
            self,
            Keyword::Function | Keyword::If | Keyword::For | Keyword::Parfor | Keyword::While | Keyword::Switch | Keyword::Try | Keyword::Spmd | Keyword::Arguments
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Keyword::Classdef => "classdef",
            Keyword::Properties => "properties",
            Keyword::Methods => "methods",
            Keyword::Events => "events",
            Keyword::Enumeration => "enumeration",
            Keyword::Function => "function",
            Keyword::End => "end",
            Keyword::If => "if",
            Keyword::For => "for",
            Keyword::Parfor => "parfor",
            Keyword::While => "while",
            Keyword::Switch => "switch",
            Keyword::Try => "try",
            Keyword::Spmd => "spmd",
            Keyword::Arguments => "arguments",
        }
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Operators the parser cares about; everything else is kept as `Other`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operator {
    Assign,
    Dot,
    At,
    Less,
    Ampersand,
    Tilde,
    Question,
    Transpose,
    Other(String),
}

/// Bracketing and separator characters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Delimiter {
    LeftParen,
    RightParen,
    LeftBracket,
    RightBracket,
    LeftBrace,
    RightBrace,
    Comma,
    Semicolon,
}

impl Delimiter {
    pub fn is_opening(&self) -> bool {
        matches!(self, Delimiter::LeftParen | Delimiter::LeftBracket | Delimiter::LeftBrace)
    }

    pub fn is_closing(&self) -> bool {
        matches!(self, Delimiter::RightParen | Delimiter::RightBracket | Delimiter::RightBrace)
    }

    /// The closing delimiter matching an opening one
    pub fn closing(&self) -> Option<Delimiter> {
        match self {
            Delimiter::LeftParen => Some(Delimiter::RightParen),
            Delimiter::LeftBracket => Some(Delimiter::RightBracket),
            Delimiter::LeftBrace => Some(Delimiter::RightBrace),
            _ => None,
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            Delimiter::LeftParen => '(',
            Delimiter::RightParen => ')',
            Delimiter::LeftBracket => '[',
            Delimiter::RightBracket => ']',
            Delimiter::LeftBrace => '{',
            Delimiter::RightBrace => '}',
            Delimiter::Comma => ',',
            Delimiter::Semicolon => ';',
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::common::Position;

    fn token(token_type: TokenType, lexeme: &str) -> Token {
        Token::new(token_type, lexeme.to_string(), Span::single(Position::start()), 4)
    }

    #[test]
    fn test_keyword_vocabulary() {
        assert_eq!(Keyword::from_statement_start("classdef"), Some(Keyword::Classdef));
        assert_eq!(Keyword::from_statement_start("end"), Some(Keyword::End));
        assert_eq!(Keyword::from_statement_start("Properties"), None);
        assert_eq!(Keyword::from_statement_start("x"), None);
        assert!(Keyword::If.opens_body_construct());
        assert!(!Keyword::Properties.opens_body_construct());
    }

    #[test]
    fn test_token_offsets() {
        let tok = token(TokenType::Identifier("abc".into()), "abc");
        assert_eq!(tok.end_offset(), 7);
        assert!(tok.is_operand_end());
    }

    #[test]
    fn test_statement_end() {
        assert!(token(TokenType::Newline, "\n").is_statement_end());
        assert!(token(TokenType::Delimiter(Delimiter::Comma), ",").is_statement_end());
        assert!(!token(TokenType::Delimiter(Delimiter::LeftParen), "(").is_statement_end());
    }

    #[test]
    fn test_delimiter_pairs() {
        assert_eq!(Delimiter::LeftBrace.closing(), Some(Delimiter::RightBrace));
        assert_eq!(Delimiter::Comma.closing(), None);
        assert!(Delimiter::RightBracket.is_closing());
        assert_eq!(Delimiter::LeftBracket.as_char(), '[');
    }
}
