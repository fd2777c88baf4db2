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

//! Source position tracking for scanning and parsing

use std::fmt;

/// Represents a position in source code
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    /// Line number (1-based)
    pub line: usize,
    /// Column number (1-based, counted in characters)
    pub column: usize,
}

impl Position {
    /// Create a new position
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// Create a position at the beginning of a file
    pub fn start() -> Self {
        Self::new(1, 1)
    }

    /// Create an invalid/unknown position
    pub fn unknown() -> Self {
        Self::new(0, 0)
    }

    /// Check if this is a valid position
    pub fn is_valid(&self) -> bool {
        self.line > 0 && self.column > 0
    }

    /// Advance to the next column
    pub fn next_column(&mut self) {
        self.column += 1;
    }

    /// Advance to the next line
    pub fn next_line(&mut self) {
        self.line += 1;
        self.column = 1;
    }

    /// Advance by a character (handles newlines)
    pub fn advance(&mut self, ch: char) {
        if ch == '\n' {
            self.next_line();
        } else {
            self.next_column();
        }
    }

    /// Create a span from this position to another
    pub fn span_to(&self, end: Position) -> Span {
        Span::new(*self, end)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::start()
    }
}

/// Represents a span of source code between two positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    /// Start position (inclusive)
    pub start: Position,
    /// End position (exclusive)
    pub end: Position,
}

impl Span {
    /// Create a new span
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Create a span covering a single position
    pub fn single(position: Position) -> Self {
        let mut end = position;
        end.next_column();
        Self::new(position, end)
    }

    /// Merge this span with another span
    pub fn merge(&self, other: Span) -> Span {
        let start = if self.start <= other.start { self.start } else { other.start };
        let end = if self.end >= other.end { self.end } else { other.end };
        Span::new(start, end)
    }

    /// Check if this span is on a single line
    pub fn is_single_line(&self) -> bool {
        self.start.line == self.end.line
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_single_line() {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

/// Utility for tracking position while scanning
///
/// The tracker owns a borrowed view of the source and keeps the byte offset and
/// the line/column position in lock step, so tokens can later be sliced out of
/// the original text byte for byte.
#[derive(Debug, Clone)]
pub struct PositionTracker<'src> {
    position: Position,
    source: &'src str,
    byte_offset: usize,
}

impl<'src> PositionTracker<'src> {
    /// Create a new position tracker
    pub fn new(source: &'src str) -> Self {
        Self {
            position: Position::start(),
            source,
            byte_offset: 0,
        }
    }

    /// Get the current position
    pub fn position(&self) -> Position {
        self.position
    }

    /// Get the current byte offset
    pub fn byte_offset(&self) -> usize {
        self.byte_offset
    }

    /// Check if we're at the end of the source
    pub fn is_at_end(&self) -> bool {
        self.byte_offset >= self.source.len()
    }

    /// Peek at the current character without advancing
    pub fn peek_char(&self) -> Option<char> {
        self.source[self.byte_offset..].chars().next()
    }

    /// Peek at the character after the current one
    pub fn peek_second(&self) -> Option<char> {
        let mut chars = self.source[self.byte_offset..].chars();
        chars.next();
        chars.next()
    }

    /// Check whether the remaining input starts with `prefix`
    pub fn starts_with(&self, prefix: &str) -> bool {
        self.source[self.byte_offset..].starts_with(prefix)
    }

    /// Advance by one character and return it
    pub fn next_char(&mut self) -> Option<char> {
        let ch = self.peek_char()?;
        self.position.advance(ch);
        self.byte_offset += ch.len_utf8();
        Some(ch)
    }

    /// Skip spaces and tabs (never newlines) and return the number skipped
    pub fn skip_blanks(&mut self) -> usize {
        let mut count = 0;
        while let Some(ch) = self.peek_char() {
            if ch == ' ' || ch == '\t' || ch == '\r' {
                self.next_char();
                count += 1;
            } else {
                break;
            }
        }
        count
    }

    /// Text of the current line from the current offset up to (not including) the newline
    pub fn rest_of_line(&self) -> &'src str {
        let rest = &self.source[self.byte_offset..];
        match rest.find('\n') {
            Some(idx) => &rest[..idx],
            None => rest,
        }
    }

    /// Text of the current line before the current offset
    pub fn line_prefix(&self) -> &'src str {
        let before = &self.source[..self.byte_offset];
        match before.rfind('\n') {
            Some(idx) => &before[idx + 1..],
            None => before,
        }
    }

    /// Get a slice of the source text
    pub fn slice(&self, start_offset: usize, end_offset: usize) -> &'src str {
        &self.source[start_offset..end_offset]
    }

    /// Create a span from a start position to the current position
    pub fn span_from(&self, start: Position) -> Span {
        start.span_to(self.position)
    }
}
