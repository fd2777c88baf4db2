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


//! Subcommands of the `mdoxy` binary

pub mod batch;
pub mod filter;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "mdoxy")]
#[command(about = "Translate MATLAB class definitions into documentation-ready pseudo-C++")]
#[command(version)]
pub struct Cli {
    /// Configuration file; defaults to $MDOXY_CONFIG
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// More log output (repeatable)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Translate one file to stdout or an output file
    Filter(filter::FilterArgs),
    /// Translate many files in parallel into an output directory
    Batch(batch::BatchArgs),
}

impl Cli {
    /// Log level selected by `-v` and `-q`
    pub fn log_level(&self) -> tracing::Level {
        match (self.quiet, self.verbose) {
            (true, _) => tracing::Level::ERROR,
            (false, 0) => tracing::Level::WARN,
            (false, 1) => tracing::Level::INFO,
            (false, 2) => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(&["mdoxy", "filter", "A.m"], tracing::Level::WARN ; "default")]
    #[test_case(&["mdoxy", "-v", "filter", "A.m"], tracing::Level::INFO ; "verbose")]
    #[test_case(&["mdoxy", "filter", "A.m", "-vv"], tracing::Level::DEBUG ; "global flag after subcommand")]
    #[test_case(&["mdoxy", "-q", "batch", "A.m", "-d", "out"], tracing::Level::ERROR ; "quiet")]
    fn test_log_level(args: &[&str], level: tracing::Level) {
        assert_eq!(Cli::try_parse_from(args).unwrap().log_level(), level);
    }

    #[test]
    fn test_filter_arguments() {
        let cli = Cli::try_parse_from(["mdoxy", "filter", "+grid/Rect.m", "macros.toml", "-o", "Rect.cc", "--group", "grid"]).unwrap();
        match cli.command {
            Commands::Filter(args) => {
                assert_eq!(args.input, PathBuf::from("+grid/Rect.m"));
                assert_eq!(args.macros, Some(PathBuf::from("macros.toml")));
                assert_eq!(args.output, Some(PathBuf::from("Rect.cc")));
                assert_eq!(args.group.as_deref(), Some("grid"));
            }
            other => panic!("expected filter, got {:?}", other),
        }
    }

    #[test]
    fn test_batch_requires_output_dir() {
        assert!(Cli::try_parse_from(["mdoxy", "batch", "A.m"]).is_err());
        let cli = Cli::try_parse_from(["mdoxy", "batch", "A.m", "B.m", "-d", "out", "-j", "2", "--report", "r.json"]).unwrap();
        match cli.command {
            Commands::Batch(args) => {
                assert_eq!(args.inputs.len(), 2);
                assert_eq!(args.jobs, Some(2));
                assert_eq!(args.report, Some(PathBuf::from("r.json")));
            }
            other => panic!("expected batch, got {:?}", other),
        }
    }
}
