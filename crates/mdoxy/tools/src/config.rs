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


//! Tool configuration file
//!
//! Resolved from `--config`, else `$MDOXY_CONFIG`, else the defaults. Command
//! line flags are applied on top by the subcommands.

use crate::error::{ToolError, ToolResult};
use mdoxy_compiler::codegen::Placeholders;
use mdoxy_compiler::{FilterConfig, MacroTable};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable naming the configuration file
pub const CONFIG_ENV: &str = "MDOXY_CONFIG";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    /// Worker threads for batch runs; 0 uses every core
    pub jobs: usize,
    /// Documentation group of every translated class
    pub group: Option<String>,
    pub banner: bool,
    /// Macro table file
    pub macros: Option<PathBuf>,
    /// Extension of files written by batch runs
    pub output_extension: String,
    pub placeholders: Placeholders,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            jobs: 0,
            group: None,
            banner: true,
            macros: None,
            output_extension: "cc".to_string(),
            placeholders: Placeholders::default(),
        }
    }
}

impl ToolConfig {
    pub fn load_from_file(path: impl AsRef<Path>) -> ToolResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ToolError::Read { path: path.to_path_buf(), source })?;
        let config: Self = toml::from_str(&content).map_err(|source| ToolError::ConfigParse { path: path.to_path_buf(), source })?;
        config.validate()?;
        Ok(config)
    }

    /// Configuration from the command line path, the environment or the defaults
    pub fn resolve_config(cli_config: Option<PathBuf>) -> ToolResult<Self> {
        if let Some(path) = cli_config {
            debug!(path = %path.display(), "loading configuration from command line");
            Self::load_from_file(path)
        } else if let Ok(path) = std::env::var(CONFIG_ENV) {
            debug!(%path, "loading configuration from environment");
            Self::load_from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> ToolResult<()> {
        if self.output_extension.is_empty() || self.output_extension.contains(['/', '\\', '.']) {
            return Err(ToolError::InvalidConfig(format!("output_extension must be a bare extension, found '{}'", self.output_extension)));
        }
        self.placeholders.validate().map_err(ToolError::InvalidConfig)
    }

    /// Worker count bounded by the available cores, at least one
    pub fn worker_count(&self) -> usize {
        let cores = std::thread::available_parallelism().map_or(1, |n| n.get());
        match self.jobs {
            0 => cores,
            jobs => jobs.min(cores),
        }
    }

    /// Build the translation configuration, loading the macro table if one is named
    pub fn filter_config(&self) -> ToolResult<FilterConfig> {
        let macros = match &self.macros {
            Some(path) => MacroTable::load_from_file(path)?,
            None => MacroTable::new(),
        };

        let mut config = FilterConfig::new().with_banner(self.banner).with_macros(macros);
        if let Some(group) = &self.group {
            config = config.with_group(group.clone());
        }
        config.emitter.placeholders = self.placeholders.clone();
        config.validate().map_err(ToolError::InvalidConfig)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: ToolConfig = toml::from_str("jobs = 2\ngroup = \"grid\"\n\n[placeholders]\nevent_type = \"SIGNAL\"\n").unwrap();
        assert_eq!(config.jobs, 2);
        assert_eq!(config.group.as_deref(), Some("grid"));
        assert!(config.banner);
        assert_eq!(config.output_extension, "cc");
        assert_eq!(config.placeholders.event_type, "SIGNAL");
        assert_eq!(config.placeholders.type_token, "matlabtypesubstitute");
    }

    #[test]
    fn test_cli_path_wins() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cli.toml");
        std::fs::write(&path, "output_extension = \"cpp\"\n").unwrap();
        let config = ToolConfig::resolve_config(Some(path)).unwrap();
        assert_eq!(config.output_extension, "cpp");
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "output_extension = \"a.b\"\n").unwrap();
        assert!(matches!(ToolConfig::load_from_file(&path), Err(ToolError::InvalidConfig(_))));

        std::fs::write(&path, "jobs = \"many\"\n").unwrap();
        assert!(matches!(ToolConfig::load_from_file(&path), Err(ToolError::ConfigParse { .. })));
    }

    #[test]
    fn test_filter_config_loads_macros() {
        let dir = TempDir::new().unwrap();
        let macros = dir.path().join("macros.toml");
        std::fs::write(&macros, "[macros]\nmanual = \"@ref manual\"\n").unwrap();
        let config = ToolConfig {
            group: Some("grid".to_string()),
            macros: Some(macros),
            ..Default::default()
        };
        let filter_config = config.filter_config().unwrap();
        assert_eq!(filter_config.macros.get("manual"), Some("@ref manual"));
        assert_eq!(filter_config.emitter.group.as_deref(), Some("grid"));
    }

    #[test]
    fn test_worker_count_is_bounded() {
        let config = ToolConfig { jobs: 10_000, ..Default::default() };
        let cores = std::thread::available_parallelism().map_or(1, |n| n.get());
        assert_eq!(config.worker_count(), cores);
        assert!(ToolConfig { jobs: 1, ..Default::default() }.worker_count() == 1);
    }
}
