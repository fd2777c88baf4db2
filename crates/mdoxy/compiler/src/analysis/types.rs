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

//! Type and return substitution

use crate::ast::QualifiedName;
use crate::codegen::config::Placeholders;
use crate::parser::common::utils::qualify;
use std::collections::BTreeMap;

/// Renders types and return constructs with the configured placeholders
pub struct TypeSubstitution<'a> {
    placeholders: &'a Placeholders,
}

impl<'a> TypeSubstitution<'a> {
    pub fn new(placeholders: &'a Placeholders) -> Self {
        Self { placeholders }
    }

    /// Declared type, else documented type, else the placeholder
    pub fn declared(&self, type_ref: Option<&QualifiedName>, documented: Option<&str>) -> String {
        match (type_ref, documented) {
            (Some(name), _) if !name.is_empty() => name.qualified(),
            (_, Some(documented)) => qualify(documented),
            _ => self.placeholders.type_token.clone(),
        }
    }

    /// Return construct for the given output names, parameterized in order
    pub fn returns(&self, names: &[String], types: &BTreeMap<String, String>) -> String {
        let inner = |name: &String| types.get(name).map_or_else(|| "void".to_string(), |t| qualify(t));
        match names {
            [] => self.placeholders.no_return.clone(),
            [single] => format!("{}<{}>", self.placeholders.single_return, inner(single)),
            many => {
                let parts: Vec<String> = many.iter().map(|name| format!("{}<{},{}>", self.placeholders.single_return, inner(name), name)).collect();
                format!("{}<{} >", self.placeholders.multi_return, parts.join(" ,"))
            }
        }
    }

    /// Comma-separated typed parameter list; ignored inputs stay unnamed
    pub fn params(&self, names: &[String], types: &BTreeMap<String, String>) -> String {
        names
            .iter()
            .map(|name| {
                let type_name = types.get(name).map_or_else(|| self.placeholders.type_token.clone(), |t| qualify(t));
                if name == "~" { type_name } else { format!("{} {}", type_name, name) }
            })
            .collect::<Vec<_>>()
            .join(",")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_declared_types() {
        let placeholders = Placeholders::default();
        let types = TypeSubstitution::new(&placeholders);
        assert_eq!(types.declared(None, None), "matlabtypesubstitute");
        assert_eq!(types.declared(Some(&QualifiedName::from_dotted("grid.Rect")), Some("double")), "::grid::Rect");
        assert_eq!(types.declared(None, Some("classA.mixed_access")), "::classA::mixed_access");
    }

    #[test]
    fn test_return_constructs() {
        let placeholders = Placeholders::default();
        let types = TypeSubstitution::new(&placeholders);
        let none = BTreeMap::new();
        assert_eq!(types.returns(&[], &none), "noret::substitute");
        assert_eq!(types.returns(&names(&["a"]), &none), "mlhsInnerSubst<void>");
        assert_eq!(types.returns(&names(&["a", "b"]), &none), "mlhsSubst<mlhsInnerSubst<void,a> ,mlhsInnerSubst<void,b> >");

        let mut documented = BTreeMap::new();
        documented.insert("a".to_string(), "classA.mixed_access".to_string());
        assert_eq!(types.returns(&names(&["a"]), &documented), "mlhsInnerSubst<::classA::mixed_access>");
    }

    #[test]
    fn test_parameter_list() {
        let placeholders = Placeholders::default();
        let types = TypeSubstitution::new(&placeholders);
        assert_eq!(types.params(&names(&["d", "~"]), &BTreeMap::new()), "matlabtypesubstitute d,matlabtypesubstitute");
        assert_eq!(types.params(&[], &BTreeMap::new()), "");
    }
}
