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

//! Translation pipeline: scan, parse, associate, resolve, emit
//!
//! Every call receives its configuration explicitly. A [`Filter`] compiles the
//! documentation patterns once and can be shared between threads.

use crate::analysis::DocPatterns;
use crate::codegen::{Emitter, EmitterConfig};
use crate::macros::MacroTable;
use crate::parser::common::utils::{is_identifier_continue, is_identifier_start};
use crate::parser::common::{Diagnostic, DiagnosticKind, ParseContext, ParseError, ParserConfig, Position, Severity};
use crate::parser::ClassdefParser;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum FilterError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("Invalid documentation pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Invalid filter configuration: {0}")]
    Config(String),
}

/// Configuration of one translation
#[derive(Debug, Clone)]
pub struct FilterConfig {
    pub emitter: EmitterConfig,
    pub parser: ParserConfig,
    pub macros: MacroTable,
    /// Derive namespaces from `+pkg` segments of the input path
    pub namespaces_from_path: bool,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            emitter: EmitterConfig::default(),
            parser: ParserConfig::default(),
            macros: MacroTable::new(),
            namespaces_from_path: true,
        }
    }
}

impl FilterConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.emitter.group = Some(group.into());
        self
    }

    pub fn with_macros(mut self, macros: MacroTable) -> Self {
        self.macros = macros;
        self
    }

    pub fn with_banner(mut self, banner: bool) -> Self {
        self.emitter.banner = banner;
        self
    }

    /// Use fixed namespaces instead of deriving them from each path
    pub fn with_namespaces(mut self, namespaces: Vec<String>) -> Self {
        self.emitter.namespaces = namespaces;
        self.namespaces_from_path = false;
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        self.emitter.validate()
    }
}

/// Package namespaces named by `+pkg` directories, outermost first
pub fn namespaces_for(path: &Path) -> Vec<String> {
    let Some(parent) = path.parent() else {
        return Vec::new();
    };
    parent
        .components()
        .filter_map(|component| component.as_os_str().to_str())
        .filter_map(|name| name.strip_prefix('+'))
        .map(str::to_string)
        .collect()
}

/// Namespace for a package name; characters outside identifiers become `_`
fn namespace_identifier(package: &str) -> String {
    let name: String = package.chars().map(|c| if is_identifier_continue(c) { c } else { '_' }).collect();
    if name.starts_with(is_identifier_start) { name } else { format!("pkg_{}", name) }
}

/// Output of a successful translation
#[derive(Debug, Clone, PartialEq)]
pub struct Translation {
    pub output: String,
    /// Non-fatal findings in source order of the passes that produced them
    pub diagnostics: Vec<Diagnostic>,
}

impl Translation {
    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.severity == Severity::Warning)
    }
}

/// Reusable translator
#[derive(Debug, Clone)]
pub struct Filter {
    config: FilterConfig,
    patterns: DocPatterns,
}

impl Filter {
    pub fn new(config: FilterConfig) -> Result<Self, FilterError> {
        config.validate().map_err(FilterError::Config)?;
        let patterns = DocPatterns::new()?;
        Ok(Self { config, patterns })
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// Translate one class definition file
    ///
    /// Errors carry the file path, line, column and the offending source line.
    pub fn translate(&self, source: &str, path: impl AsRef<Path>) -> Result<Translation, ParseError> {
        let path = path.as_ref();
        let mut parser = ClassdefParser::new(ParseContext::with_config(path, source, self.config.parser.clone()));
        let class = parser.parse_class()?;

        let mut diagnostics = Vec::new();
        let derived;
        let emitter_config = if self.config.namespaces_from_path {
            let namespaces: Vec<String> = namespaces_for(path)
                .into_iter()
                .map(|package| {
                    let namespace = namespace_identifier(&package);
                    if namespace != package {
                        diagnostics.push(Diagnostic::warning(
                            DiagnosticKind::InvalidNamespace,
                            Position::start(),
                            format!("package '+{}' is not an identifier; namespace '{}' is used", package, namespace),
                        ));
                    }
                    namespace
                })
                .collect();
            derived = self.config.emitter.clone().with_namespaces(namespaces);
            &derived
        } else {
            &self.config.emitter
        };

        let emission = Emitter::new(emitter_config, &self.patterns, &self.config.macros)
            .emit(&class)
            .map_err(|error| parser.context().locate(error))?;

        diagnostics.extend(emission.diagnostics);
        let diagnostics: Vec<Diagnostic> = diagnostics.into_iter().map(|diagnostic| diagnostic.in_file(path)).collect();
        for diagnostic in &diagnostics {
            debug!(%diagnostic, "diagnostic");
        }
        info!(file = %path.display(), class = %class.name, diagnostics = diagnostics.len(), "translated class");

        Ok(Translation {
            output: emission.output,
            diagnostics,
        })
    }
}

/// Translate one file with an explicit configuration
pub fn translate(source: &str, path: impl AsRef<Path>, config: &FilterConfig) -> Result<Translation, FilterError> {
    let filter = Filter::new(config.clone())?;
    Ok(filter.translate(source, path)?)
}
