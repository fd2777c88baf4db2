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

//! mdoxy compiler library
//!
//! Translates MATLAB `classdef` files into a C++-like pseudo-code annotated
//! with documentation comments, for documentation generators that only
//! understand C-family languages.
//!
//! ```rust
//! use mdoxy_compiler::{FilterConfig, translate};
//!
//! let source = "classdef Rect < grid.Base\n  properties\n    width = 1; % Width in cells\n  end\nend\n";
//! let translation = translate(source, "Rect.m", &FilterConfig::new().with_banner(false)).unwrap();
//! assert!(translation.output.contains("matlabtypesubstitute width = 1;"));
//! ```

pub mod analysis;
pub mod ast;
pub mod codegen;
pub mod filter;
pub mod macros;
pub mod parser;

// Re-export the translation entry points
pub use filter::{Filter, FilterConfig, FilterError, Translation, namespaces_for, translate};
pub use macros::{MacroError, MacroTable};
pub use parser::{Diagnostic, ParseError};
