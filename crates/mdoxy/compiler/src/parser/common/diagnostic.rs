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

//! Non-fatal diagnostics collected while translating one file

use super::Position;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DiagnosticKind {
    /// A comment block qualified for more than one binding
    AssociationAmbiguity,
    /// An attribute key repeated with different values in one list
    ConflictingAttribute,
    UnknownAttribute,
    /// Documented parameters disagree with the signature
    DocParamMismatch,
    /// A tagged documentation block names no known member
    UnresolvedDocTarget,
    UnknownMacro,
    /// A Constant property declared without a value
    MissingConstantDefault,
    /// A package directory whose name is not an identifier
    InvalidNamespace,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: DiagnosticKind,
    pub line: usize,
    pub column: usize,
    pub message: String,
    pub file: Option<PathBuf>,
}

impl Diagnostic {
    pub fn new(severity: Severity, kind: DiagnosticKind, position: Position, message: impl Into<String>) -> Self {
        Self {
            severity,
            kind,
            line: position.line,
            column: position.column,
            message: message.into(),
            file: None,
        }
    }

    pub fn info(kind: DiagnosticKind, position: Position, message: impl Into<String>) -> Self {
        Self::new(Severity::Info, kind, position, message)
    }

    pub fn warning(kind: DiagnosticKind, position: Position, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, kind, position, message)
    }

    pub fn in_file(mut self, path: impl AsRef<Path>) -> Self {
        self.file = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = self.file.as_ref().map(|p| p.display().to_string()).unwrap_or_else(|| "<input>".to_string());
        write!(f, "{}:{}:{}: {}: {}", path, self.line, self.column, self.severity, self.message)
    }
}
