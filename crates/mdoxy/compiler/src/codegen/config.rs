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

//! Configuration for pseudo-code emission

use crate::parser::common::utils::is_valid_identifier;
use serde::{Deserialize, Serialize};

/// Tokens substituted where the source carries no type information
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Placeholders {
    /// Type of untyped properties and parameters
    pub type_token: String,
    /// Return construct of methods without outputs
    pub no_return: String,
    /// Template wrapping a single return value
    pub single_return: String,
    /// Template wrapping several return values
    pub multi_return: String,
    /// Type token of events
    pub event_type: String,
}

impl Default for Placeholders {
    fn default() -> Self {
        Self {
            type_token: "matlabtypesubstitute".to_string(),
            no_return: "noret::substitute".to_string(),
            single_return: "mlhsInnerSubst".to_string(),
            multi_return: "mlhsSubst".to_string(),
            event_type: "EVENT".to_string(),
        }
    }
}

impl Placeholders {
    /// Validate the placeholder tokens
    pub fn validate(&self) -> Result<(), String> {
        for (field, value) in [("single_return", &self.single_return), ("multi_return", &self.multi_return), ("event_type", &self.event_type)] {
            if !is_valid_identifier(value) {
                return Err(format!("Placeholder {} must be an identifier, found '{}'", field, value));
            }
        }
        for (field, value) in [("type_token", &self.type_token), ("no_return", &self.no_return)] {
            if value.trim().is_empty() || value.chars().any(char::is_whitespace) {
                return Err(format!("Placeholder {} must be a single token, found '{}'", field, value));
            }
        }
        Ok(())
    }
}

/// Configuration for emitting one class
#[derive(Debug, Clone, PartialEq)]
pub struct EmitterConfig {
    /// Documentation group of the class (`@ingroup`)
    pub group: Option<String>,

    /// Enclosing namespaces, outermost first
    pub namespaces: Vec<String>,

    /// Whether to start the output with the autoinsert banner
    pub banner: bool,

    /// Label written after `#if 0 //` on accessor guards
    pub guard_label: String,

    pub placeholders: Placeholders,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            group: None,
            namespaces: Vec::new(),
            banner: true,
            guard_label: "mdoxy".to_string(),
            placeholders: Placeholders::default(),
        }
    }
}

impl EmitterConfig {
    /// Create a configuration for a class in the given group
    pub fn for_group(group: impl Into<String>) -> Self {
        Self {
            group: Some(group.into()),
            ..Default::default()
        }
    }

    /// Create a configuration producing only the class rendering, without banner
    pub fn bare() -> Self {
        Self {
            banner: false,
            ..Default::default()
        }
    }

    pub fn with_namespaces(mut self, namespaces: Vec<String>) -> Self {
        self.namespaces = namespaces;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if let Some(group) = &self.group {
            if group.is_empty() || group.chars().any(char::is_whitespace) {
                return Err(format!("Group must be a single word, found '{}'", group));
            }
        }

        if let Some(namespace) = self.namespaces.iter().find(|n| !is_valid_identifier(n)) {
            return Err(format!("Namespace '{}' is not a valid identifier", namespace));
        }

        if self.guard_label.contains('\n') {
            return Err("Accessor guard label must fit on one line".to_string());
        }

        self.placeholders.validate()
    }
}
