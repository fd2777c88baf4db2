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

//! Names, access levels and modifiers shared by the tree and the resolver

use crate::parser::common::utils;
use std::fmt;

/// A dotted (namespaced) name such as `pkg.sub.Type`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QualifiedName {
    pub segments: Vec<String>,
}

impl QualifiedName {
    pub fn new(segments: Vec<String>) -> Self {
        Self { segments }
    }

    pub fn from_dotted(dotted: &str) -> Self {
        Self::new(dotted.split('.').filter(|s| !s.is_empty()).map(str::to_string).collect())
    }

    /// The name as written in the source, `a.b.C`
    pub fn dotted(&self) -> String {
        self.segments.join(".")
    }

    /// The name in output scope syntax, `::a::b::C`
    pub fn qualified(&self) -> String {
        utils::qualify(&self.dotted())
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.dotted())
    }
}

/// Access level; ordered from least to most restrictive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Access {
    #[default]
    Public,
    Protected,
    Private,
}

impl Access {
    /// Parse an access value; `immutable` is write-once and counts as private
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "public" => Some(Access::Public),
            "protected" => Some(Access::Protected),
            "private" | "immutable" => Some(Access::Private),
            _ => None,
        }
    }

    pub fn most_restrictive(self, other: Access) -> Access {
        self.max(other)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Access::Public => "public",
            Access::Protected => "protected",
            Access::Private => "private",
        }
    }
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Boolean member attributes, declared in output vocabulary order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Modifier {
    Abstract,
    Constant,
    Dependent,
    Hidden,
    Sealed,
    Static,
    Transient,
    AbortSet,
    GetObservable,
    NonCopyable,
    SetObservable,
}

impl Modifier {
    pub fn parse(name: &str) -> Option<Self> {
        let modifier = match name.to_ascii_lowercase().as_str() {
            "abstract" => Modifier::Abstract,
            "constant" => Modifier::Constant,
            "dependent" => Modifier::Dependent,
            "hidden" => Modifier::Hidden,
            "sealed" => Modifier::Sealed,
            "static" => Modifier::Static,
            "transient" => Modifier::Transient,
            "abortset" => Modifier::AbortSet,
            "getobservable" => Modifier::GetObservable,
            "noncopyable" => Modifier::NonCopyable,
            "setobservable" => Modifier::SetObservable,
            _ => return None,
        };
        Some(modifier)
    }

    /// Modifiers that split output regions and appear in region markers
    pub fn is_region_modifier(&self) -> bool {
        matches!(
            self,
            Modifier::Abstract | Modifier::Constant | Modifier::Dependent | Modifier::Hidden | Modifier::Sealed | Modifier::Static | Modifier::Transient
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Modifier::Abstract => "Abstract",
            Modifier::Constant => "Constant",
            Modifier::Dependent => "Dependent",
            Modifier::Hidden => "Hidden",
            Modifier::Sealed => "Sealed",
            Modifier::Static => "Static",
            Modifier::Transient => "Transient",
            Modifier::AbortSet => "AbortSet",
            Modifier::GetObservable => "GetObservable",
            Modifier::NonCopyable => "NonCopyable",
            Modifier::SetObservable => "SetObservable",
        }
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
