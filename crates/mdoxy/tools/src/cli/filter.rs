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


//! Single-file filter, as invoked by a documentation generator
//!
//! The translation goes to stdout unless an output file is named, so the
//! generator can use the binary as its input filter.

use crate::cli::batch::write_atomic;
use crate::config::ToolConfig;
use crate::error::{ToolError, ToolResult};
use clap::Args;
use mdoxy_compiler::{Filter, MacroTable, Translation};
use std::io::Write;
use std::path::PathBuf;
use tracing::debug;

/// CLI arguments for filtering one file
#[derive(Args, Debug, Clone)]
pub struct FilterArgs {
    /// Class definition file
    pub input: PathBuf,

    /// Macro table, overriding the one named in the configuration
    pub macros: Option<PathBuf>,

    /// Output file; stdout when omitted
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Documentation group of the class
    #[arg(long)]
    pub group: Option<String>,
}

/// Translate one file with the configuration and flags combined
pub fn filter_file(args: &FilterArgs, config: &ToolConfig) -> ToolResult<Translation> {
    let mut filter_config = config.filter_config()?;
    if let Some(path) = &args.macros {
        filter_config = filter_config.with_macros(MacroTable::load_from_file(path)?);
    }
    if let Some(group) = &args.group {
        filter_config = filter_config.with_group(group.clone());
    }

    let source = std::fs::read_to_string(&args.input).map_err(|source| ToolError::Read { path: args.input.clone(), source })?;
    let filter = Filter::new(filter_config)?;
    debug!(file = %args.input.display(), bytes = source.len(), "filtering file");
    Ok(filter.translate(&source, &args.input)?)
}

/// Run the `filter` subcommand
pub fn run_filter(args: FilterArgs, config: &ToolConfig) -> ToolResult<()> {
    let translation = filter_file(&args, config)?;
    for diagnostic in &translation.diagnostics {
        eprintln!("{}", diagnostic);
    }

    match &args.output {
        Some(path) => write_atomic(path, &translation.output),
        None => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            handle
                .write_all(translation.output.as_bytes())
                .and_then(|()| handle.flush())
                .map_err(|source| ToolError::Write { path: PathBuf::from("<stdout>"), source })
        }
    }
}
