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


//! mdoxy tools library
//!
//! Command-line front end of the classdef documentation filter: single-file
//! filtering, parallel batch translation and the tool configuration file.

pub mod cli;
pub mod config;
pub mod error;

pub use cli::batch::{BatchArgs, BatchDriver, BatchReport, CancelToken, FileOutcome, FileReport, run_batch, write_atomic};
pub use cli::filter::{FilterArgs, filter_file, run_filter};
pub use cli::{Cli, Commands};
pub use config::ToolConfig;
pub use error::{ToolError, ToolResult};
