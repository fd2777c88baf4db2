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

//! Semantic passes between parsing and emission
//!
//! Attribute resolution, documentation association and text processing, and
//! type substitution. None of these passes fail on documentation problems;
//! findings are pushed as [`Diagnostic`](crate::parser::common::Diagnostic)s.

pub mod attributes;
pub mod docs;
pub mod doctext;
pub mod types;

pub use attributes::{AttributeResolver, RegionKey, ResolvedAttributes};
pub use docs::{Association, Documentation, DocumentationAssociator};
pub use doctext::{DocPatterns, DocProcessor, DocText, check_params};
pub use types::TypeSubstitution;
