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

//! Line-oriented text writer for pseudo-code output

/// Accumulates output lines, each terminated by `\n`
#[derive(Debug, Clone, Default)]
pub struct CodeWriter {
    buffer: String,
    lines: usize,
}

impl CodeWriter {
    /// Create a new writer
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a writer with room for `capacity` bytes
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: String::with_capacity(capacity),
            lines: 0,
        }
    }

    /// Number of complete lines written
    pub fn lines(&self) -> usize {
        self.lines
    }

    /// Take ownership of the output
    pub fn into_string(self) -> String {
        self.buffer
    }

    /// Write one line; embedded newlines are counted
    pub fn line(&mut self, text: &str) {
        self.buffer.push_str(text);
        self.buffer.push('\n');
        self.lines += 1 + text.matches('\n').count();
    }

    pub fn blank(&mut self) {
        self.line("");
    }

    /// Write text that may span several lines and may end mid-line
    pub fn raw(&mut self, text: &str) {
        self.lines += text.matches('\n').count();
        self.buffer.push_str(text);
    }

    /// Terminate a line left open by [`raw`](Self::raw)
    pub fn finish_line(&mut self) {
        if !self.buffer.is_empty() && !self.buffer.ends_with('\n') {
            self.buffer.push('\n');
            self.lines += 1;
        }
    }
}

/// Whether every bracket in the output is closed, ignoring comments and string literals
pub fn is_balanced(output: &str) -> bool {
    let mut stack = Vec::new();
    let mut chars = output.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut previous = '\0';
                let mut closed = false;
                for c in chars.by_ref() {
                    if previous == '*' && c == '/' {
                        closed = true;
                        break;
                    }
                    previous = c;
                }
                if !closed {
                    return false;
                }
            }
            '/' if chars.peek() == Some(&'/') => {
                for c in chars.by_ref() {
                    if c == '\n' {
                        break;
                    }
                }
            }
            '"' => {
                let mut closed = false;
                while let Some(c) = chars.next() {
                    match c {
                        '\\' => {
                            chars.next();
                        }
                        '"' => {
                            closed = true;
                            break;
                        }
                        _ => {}
                    }
                }
                if !closed {
                    return false;
                }
            }
            '(' | '[' | '{' => stack.push(c),
            ')' | ']' | '}' => {
                let expected = match c {
                    ')' => '(',
                    ']' => '[',
                    _ => '{',
                };
                if stack.pop() != Some(expected) {
                    return false;
                }
            }
            _ => {}
        }
    }
    stack.is_empty()
}
