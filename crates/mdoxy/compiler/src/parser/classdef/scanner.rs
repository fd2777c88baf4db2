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

//! Classdef lexical analyzer (tokenizer)
//!
//! The scanner is an explicit state machine with one state per lexical
//! context: ordinary code, the inside of a quoted literal, a line comment and
//! a block comment. Bracket nesting is tracked only in the code state, so
//! brackets inside literals never count and quotes inside brackets are judged
//! by the token that precedes them.

use crate::parser::common::{
    Delimiter, Keyword, Operator, ParseError, ParseErrorKind, ParseResult, Position, Token, TokenType,
    position::{PositionTracker, Span},
    utils,
};
use crate::parser::traits::Lexer;
use tracing::trace;

/// Classdef lexical analyzer
#[derive(Debug, Default)]
pub struct ClassdefScanner;

impl ClassdefScanner {
    /// Create a new scanner
    pub fn new() -> Self {
        Self
    }
}

impl Lexer for ClassdefScanner {
    fn tokenize(&mut self, input: &str) -> ParseResult<Vec<Token>> {
        let tokens = StateMachine::new(input).run()?;
        trace!(count = tokens.len(), "scanned tokens");
        Ok(tokens)
    }

    /// Scanning keeps no state between inputs
    fn reset(&mut self) {}

    fn name(&self) -> &'static str {
        "classdef"
    }
}

/// Lexical context of the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Code,
    Literal { quote: char, start: Position, offset: usize },
    LineComment { start: Position, offset: usize },
    BlockComment { start: Position, offset: usize },
    Done,
}

struct StateMachine<'src> {
    tracker: PositionTracker<'src>,
    state: State,
    brackets: Vec<(Delimiter, Position)>,
    statement_start: bool,
    spaced: bool,
    tokens: Vec<Token>,
}

impl<'src> StateMachine<'src> {
    fn new(source: &'src str) -> Self {
        Self {
            tracker: PositionTracker::new(source),
            state: State::Code,
            brackets: Vec::new(),
            statement_start: true,
            spaced: false,
            tokens: Vec::new(),
        }
    }

    fn run(mut self) -> ParseResult<Vec<Token>> {
        loop {
            self.state = match self.state {
                State::Code => self.scan_code()?,
                State::Literal { quote, start, offset } => self.scan_literal(quote, start, offset)?,
                State::LineComment { start, offset } => self.scan_line_comment(start, offset),
                State::BlockComment { start, offset } => self.scan_block_comment(start, offset)?,
                State::Done => break,
            };
        }
        Ok(self.tokens)
    }

    fn scan_code(&mut self) -> ParseResult<State> {
        self.spaced = self.tracker.skip_blanks() > 0;
        let start = self.tracker.position();
        let offset = self.tracker.byte_offset();

        let Some(ch) = self.tracker.peek_char() else {
            return self.finish(start, offset);
        };

        match ch {
            '\n' => {
                self.tracker.next_char();
                self.push(TokenType::Newline, start, offset);
            }
            '%' if self.opens_block_comment() => return Ok(State::BlockComment { start, offset }),
            '%' => return Ok(State::LineComment { start, offset }),
            '.' if self.tracker.starts_with("...") => self.scan_continuation(start, offset),
            '\'' if self.quote_is_transpose() => {
                self.tracker.next_char();
                self.push(TokenType::Operator(Operator::Transpose), start, offset);
            }
            '\'' | '"' => {
                self.tracker.next_char();
                return Ok(State::Literal { quote: ch, start, offset });
            }
            c if c.is_ascii_digit() || (c == '.' && self.tracker.peek_second().is_some_and(|n| n.is_ascii_digit())) => {
                self.scan_number(start, offset);
            }
            c if utils::is_identifier_start(c) => self.scan_word(start, offset),
            '(' | '[' | '{' => {
                self.tracker.next_char();
                let delimiter = match ch {
                    '(' => Delimiter::LeftParen,
                    '[' => Delimiter::LeftBracket,
                    _ => Delimiter::LeftBrace,
                };
                self.brackets.push((delimiter, start));
                self.push(TokenType::Delimiter(delimiter), start, offset);
            }
            ')' | ']' | '}' => {
                self.tracker.next_char();
                let delimiter = match ch {
                    ')' => Delimiter::RightParen,
                    ']' => Delimiter::RightBracket,
                    _ => Delimiter::RightBrace,
                };
                self.close_bracket(delimiter, start)?;
                self.push(TokenType::Delimiter(delimiter), start, offset);
            }
            ',' | ';' => {
                self.tracker.next_char();
                let delimiter = if ch == ',' { Delimiter::Comma } else { Delimiter::Semicolon };
                self.push(TokenType::Delimiter(delimiter), start, offset);
            }
            _ => self.scan_operator(ch, start, offset),
        }

        Ok(State::Code)
    }

    fn finish(&mut self, start: Position, offset: usize) -> ParseResult<State> {
        if let Some((delimiter, opened_at)) = self.brackets.last() {
            return Err(ParseError::new(
                ParseErrorKind::UnbalancedBracket,
                *opened_at,
                format!("unclosed '{}' at end of file", delimiter.as_char()),
            ));
        }
        self.push(TokenType::Eof, start, offset);
        Ok(State::Done)
    }

    /// A `%{` alone on its line opens a block comment
    fn opens_block_comment(&self) -> bool {
        self.tracker.line_prefix().trim().is_empty() && self.tracker.rest_of_line().trim() == "%{"
    }

    /// Decide whether a `'` continues an expression or opens a literal
    fn quote_is_transpose(&self) -> bool {
        if self.statement_start {
            return false;
        }
        let Some(previous) = self.tokens.last() else {
            return false;
        };
        if !previous.is_operand_end() {
            return false;
        }
        if !self.spaced {
            return true;
        }
        !matches!(self.brackets.last(), Some((Delimiter::LeftBracket | Delimiter::LeftBrace, _)))
    }

    fn close_bracket(&mut self, closing: Delimiter, position: Position) -> ParseResult<()> {
        match self.brackets.pop() {
            Some((opening, _)) if opening.closing() == Some(closing) => Ok(()),
            Some((opening, opened_at)) => Err(ParseError::new(
                ParseErrorKind::UnbalancedBracket,
                position,
                format!("'{}' does not close '{}' opened at {}", closing.as_char(), opening.as_char(), opened_at),
            )),
            None => Err(ParseError::new(ParseErrorKind::UnbalancedBracket, position, format!("unmatched '{}'", closing.as_char()))),
        }
    }

    fn scan_literal(&mut self, quote: char, start: Position, offset: usize) -> ParseResult<State> {
        let mut value = String::new();
        loop {
            match self.tracker.peek_char() {
                None | Some('\n') => {
                    let what = if quote == '"' { "string" } else { "character" };
                    return Err(ParseError::new(ParseErrorKind::UnterminatedString, start, format!("unterminated {} literal", what)));
                }
                Some(c) if c == quote => {
                    self.tracker.next_char();
                    if self.tracker.peek_char() == Some(quote) {
                        self.tracker.next_char();
                        value.push(quote);
                    } else {
                        break;
                    }
                }
                Some(c) => {
                    self.tracker.next_char();
                    value.push(c);
                }
            }
        }

        let token_type = if quote == '"' { TokenType::StringLiteral(value) } else { TokenType::CharLiteral(value) };
        self.push(token_type, start, offset);
        Ok(State::Code)
    }

    fn scan_line_comment(&mut self, start: Position, offset: usize) -> State {
        while self.tracker.peek_char() == Some('%') {
            self.tracker.next_char();
        }
        let text = self.tracker.rest_of_line().to_string();
        self.consume_line();
        self.push(TokenType::Comment(text), start, offset);
        State::Code
    }

    fn scan_block_comment(&mut self, start: Position, offset: usize) -> ParseResult<State> {
        let mut depth = 0usize;
        let mut lines = Vec::new();

        loop {
            if self.tracker.is_at_end() {
                return Err(ParseError::new(ParseErrorKind::UnterminatedComment, start, "unterminated block comment".to_string()));
            }

            let line = self.tracker.rest_of_line();
            match line.trim() {
                "%{" => {
                    depth += 1;
                    if depth > 1 {
                        lines.push(line.to_string());
                    }
                }
                "%}" => {
                    depth -= 1;
                    if depth == 0 {
                        self.consume_line();
                        self.push(TokenType::BlockComment(lines), start, offset);
                        return Ok(State::Code);
                    }
                    lines.push(line.to_string());
                }
                _ => lines.push(line.to_string()),
            }

            self.consume_line();
            self.tracker.next_char();
        }
    }

    /// `...` hides the following newline; the rest of the line is commentary
    fn scan_continuation(&mut self, start: Position, offset: usize) {
        for _ in 0..3 {
            self.tracker.next_char();
        }
        let text = self.tracker.rest_of_line().to_string();
        self.consume_line();
        self.push(TokenType::Continuation(text), start, offset);
        if self.tracker.peek_char() == Some('\n') {
            self.tracker.next_char();
        }
    }

    fn scan_number(&mut self, start: Position, offset: usize) {
        let mut previous = '\0';
        while let Some(c) = self.tracker.peek_char() {
            let take = match c {
                c if c.is_ascii_alphanumeric() || c == '_' => true,
                '.' => !self.tracker.starts_with("...") && !matches!(self.tracker.peek_second(), Some('*' | '/' | '\\' | '^' | '\'')),
                '+' | '-' => matches!(previous, 'e' | 'E'),
                _ => false,
            };
            if !take {
                break;
            }
            previous = c;
            self.tracker.next_char();
        }

        let text = self.tracker.slice(offset, self.tracker.byte_offset()).to_string();
        self.push(TokenType::Number(text), start, offset);
    }

    fn scan_word(&mut self, start: Position, offset: usize) {
        while self.tracker.peek_char().is_some_and(utils::is_identifier_continue) {
            self.tracker.next_char();
        }

        let word = self.tracker.slice(offset, self.tracker.byte_offset());
        let keyword = if self.statement_start && self.brackets.is_empty() { Keyword::from_statement_start(word) } else { None };
        let token_type = match keyword {
            Some(keyword) => TokenType::Keyword(keyword),
            None => TokenType::Identifier(word.to_string()),
        };
        self.push(token_type, start, offset);
    }

    fn scan_operator(&mut self, first: char, start: Position, offset: usize) {
        self.tracker.next_char();
        let next = self.tracker.peek_char();

        let operator = match (first, next) {
            ('=', Some('=')) | ('<', Some('=')) | ('>', Some('=')) | ('~', Some('=')) | ('!', Some('=')) | ('&', Some('&')) | ('|', Some('|')) => {
                self.tracker.next_char();
                None
            }
            ('.', Some('\'')) => {
                self.tracker.next_char();
                Some(Operator::Transpose)
            }
            ('.', Some('*' | '/' | '\\' | '^')) => {
                self.tracker.next_char();
                None
            }
            ('=', _) => Some(Operator::Assign),
            ('.', _) => Some(Operator::Dot),
            ('@', _) => Some(Operator::At),
            ('<', _) => Some(Operator::Less),
            ('&', _) => Some(Operator::Ampersand),
            ('~', _) => Some(Operator::Tilde),
            ('?', _) => Some(Operator::Question),
            _ => None,
        };

        let lexeme = self.tracker.slice(offset, self.tracker.byte_offset()).to_string();
        let operator = operator.unwrap_or(Operator::Other(lexeme));
        self.push(TokenType::Operator(operator), start, offset);
    }

    fn consume_line(&mut self) {
        while self.tracker.peek_char().is_some_and(|c| c != '\n') {
            self.tracker.next_char();
        }
    }

    fn push(&mut self, token_type: TokenType, start: Position, offset: usize) {
        match &token_type {
            TokenType::Newline => {
                if self.brackets.is_empty() {
                    self.statement_start = true;
                }
            }
            TokenType::Delimiter(Delimiter::Comma | Delimiter::Semicolon) if self.brackets.is_empty() => self.statement_start = true,
            TokenType::Keyword(Keyword::End) => self.statement_start = true,
            TokenType::Comment(_) | TokenType::BlockComment(_) | TokenType::Continuation(_) | TokenType::Eof => {}
            _ => self.statement_start = false,
        }

        let lexeme = self.tracker.slice(offset, self.tracker.byte_offset()).to_string();
        let span: Span = self.tracker.span_from(start);
        let mut token = Token::new(token_type, lexeme, span, offset);
        token.spaced = self.spaced;
        self.tokens.push(token);
    }
}
