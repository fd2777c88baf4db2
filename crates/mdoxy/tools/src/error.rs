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


//! Errors of the command-line tools

use mdoxy_compiler::{FilterError, MacroError, ParseError};
use std::path::PathBuf;
use thiserror::Error;

/// Result type for tool operations
pub type ToolResult<T> = Result<T, ToolError>;

#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("{input}: output {output} is already produced by {first}")]
    OutputCollision { input: PathBuf, output: PathBuf, first: PathBuf },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Macros(#[from] MacroError),

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error("Failed to start worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),

    #[error("Failed to write report: {0}")]
    Report(#[from] serde_json::Error),
}

impl From<ParseError> for ToolError {
    fn from(error: ParseError) -> Self {
        ToolError::Filter(FilterError::Parse(error))
    }
}
