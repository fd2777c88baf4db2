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

//! Macro substitution table for documentation text
//!
//! ```toml
//! [macros]
//! model = "@ref grid::Model"
//! ```

use crate::parser::common::utils::is_valid_identifier;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MacroError {
    #[error("Failed to read macro table {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid macro table {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid macro name '{0}'")]
    InvalidName(String),
}

/// Named replacements for `${name}` references
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacroTable {
    #[serde(default)]
    macros: BTreeMap<String, String>,
}

impl MacroTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a macro, replacing an existing definition
    pub fn with(mut self, name: impl Into<String>, replacement: impl Into<String>) -> Self {
        self.macros.insert(name.into(), replacement.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.macros.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.macros.len()
    }

    pub fn is_empty(&self) -> bool {
        self.macros.is_empty()
    }

    /// Parse a table from TOML text; `path` is only used in errors
    pub fn from_toml_str(content: &str, path: impl AsRef<Path>) -> Result<Self, MacroError> {
        let table: Self = toml::from_str(content).map_err(|source| MacroError::Parse {
            path: path.as_ref().to_path_buf(),
            source,
        })?;
        if let Some(name) = table.macros.keys().find(|name| !is_valid_identifier(name)) {
            return Err(MacroError::InvalidName(name.clone()));
        }
        Ok(table)
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, MacroError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| MacroError::Io { path: path.to_path_buf(), source })?;
        Self::from_toml_str(&content, path)
    }
}
