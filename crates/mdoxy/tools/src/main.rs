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


//! mdoxy CLI Tool
//!
//! Main entry point for the mdoxy command-line interface.

use anyhow::Result;
use clap::Parser;
use mdoxy_tools::{Cli, Commands, ToolConfig, run_batch, run_filter};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // stdout carries the translation, so logs go to stderr
    tracing_subscriber::fmt().with_max_level(cli.log_level()).with_writer(std::io::stderr).with_target(false).init();

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(error) => {
            eprintln!("{}", error);
            ExitCode::FAILURE
        }
    }
}

/// Run the selected subcommand; `Ok(false)` when some file failed
fn run(cli: Cli) -> Result<bool> {
    let config = ToolConfig::resolve_config(cli.config)?;
    match cli.command {
        Commands::Filter(args) => {
            run_filter(args, &config)?;
            Ok(true)
        }
        Commands::Batch(args) => {
            let report = run_batch(args, &config)?;
            Ok(!report.has_failures())
        }
    }
}
