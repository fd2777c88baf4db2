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

//! Documentation text processing
//!
//! Rewrites bound comment text into doc-block lines: macro expansion,
//! `Parameters:` / `Return values:` sections, `@type` extraction and the
//! `@brief` marker on the first primary line.

use super::docs::Documentation;
use crate::macros::MacroTable;
use crate::parser::common::{Diagnostic, DiagnosticKind, Position};
use regex::{Captures, Regex};
use std::collections::BTreeMap;

/// Compiled patterns used by documentation processing
#[derive(Debug, Clone)]
pub struct DocPatterns {
    macro_ref: Regex,
    section: Regex,
    entry: Regex,
    type_tag: Regex,
    param_tag: Regex,
}

impl DocPatterns {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            macro_ref: Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}")?,
            section: Regex::new(r"(?i)^\s*(parameters|return values)\s*:\s*$")?,
            entry: Regex::new(r"^\s*([A-Za-z_][A-Za-z0-9_]*)\s*:(.*)$")?,
            type_tag: Regex::new(r"@type\s+([A-Za-z_][A-Za-z0-9_.]*)\s*")?,
            param_tag: Regex::new(r"^\s*@param\s+([A-Za-z_][A-Za-z0-9_]*)")?,
        })
    }
}

/// Processed documentation of one declaration
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DocText {
    pub lines: Vec<String>,
    /// Parameter names documented, in order
    pub params: Vec<String>,
    /// Types given with `@type` on parameter or return entries
    pub types: BTreeMap<String, String>,
    /// `@type` outside any section
    pub declared_type: Option<String>,
}

impl DocText {
    pub fn has_text(&self) -> bool {
        self.lines.iter().any(|line| !line.trim().is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SectionKind {
    Parameters,
    Returns,
}

impl SectionKind {
    fn tag(&self) -> &'static str {
        match self {
            SectionKind::Parameters => "@param",
            SectionKind::Returns => "@retval",
        }
    }
}

struct Section {
    kind: SectionKind,
    indent: Option<usize>,
    current: Option<String>,
}

pub struct DocProcessor<'a> {
    patterns: &'a DocPatterns,
    macros: &'a MacroTable,
    diagnostics: &'a mut Vec<Diagnostic>,
}

impl<'a> DocProcessor<'a> {
    pub fn new(patterns: &'a DocPatterns, macros: &'a MacroTable, diagnostics: &'a mut Vec<Diagnostic>) -> Self {
        Self { patterns, macros, diagnostics }
    }

    /// Process primary then supplementary text
    pub fn process(&mut self, docs: &Documentation, position: Position) -> DocText {
        let mut text = DocText::default();
        if let Some(primary) = &docs.primary {
            let lines = self.rewrite(primary, position, &mut text);
            text.lines.extend(with_brief(lines));
        }
        for block in &docs.supplementary {
            let lines = self.rewrite(block, position, &mut text);
            text.lines.extend(lines);
        }
        text
    }

    fn rewrite(&mut self, lines: &[String], position: Position, text: &mut DocText) -> Vec<String> {
        let mut output = Vec::with_capacity(lines.len());
        let mut section: Option<Section> = None;

        for raw in lines {
            let line = self.expand_macros(raw, position);
            if line.trim().is_empty() {
                section = None;
                output.push(String::new());
                continue;
            }

            if let Some(captures) = self.patterns.section.captures(&line) {
                let kind = if captures[1].eq_ignore_ascii_case("parameters") { SectionKind::Parameters } else { SectionKind::Returns };
                section = Some(Section { kind, indent: None, current: None });
                continue;
            }

            if let Some(section) = section.as_mut() {
                let indent = line.len() - line.trim_start().len();
                let entry = self.patterns.entry.captures(&line).filter(|_| section.indent.is_none_or(|first| indent <= first));
                if let Some(captures) = entry {
                    section.indent.get_or_insert(indent);
                    let name = captures[1].to_string();
                    let (rest, type_name) = self.take_type(&captures[2]);
                    if let Some(type_name) = type_name {
                        text.types.insert(name.clone(), type_name);
                    }
                    if section.kind == SectionKind::Parameters {
                        text.params.push(name.clone());
                    }
                    output.push(format!("{} {}{}", section.kind.tag(), name, rest));
                    section.current = Some(name);
                } else {
                    let (line, type_name) = self.take_type(&line);
                    if let (Some(type_name), Some(current)) = (type_name, &section.current) {
                        text.types.insert(current.clone(), type_name);
                    }
                    output.push(line);
                }
                continue;
            }

            if let Some(captures) = self.patterns.param_tag.captures(&line) {
                text.params.push(captures[1].to_string());
            }
            let (line, type_name) = self.take_type(&line);
            if let Some(type_name) = type_name {
                text.declared_type.get_or_insert(type_name);
            }
            output.push(line);
        }
        output
    }

    /// Replace `${name}` references; unknown names stay and are reported
    fn expand_macros(&mut self, line: &str, position: Position) -> String {
        let macros = self.macros;
        let mut unknown = Vec::new();
        let expanded = self
            .patterns
            .macro_ref
            .replace_all(line, |captures: &Captures| match macros.get(&captures[1]) {
                Some(replacement) => replacement.to_string(),
                None => {
                    unknown.push(captures[1].to_string());
                    captures[0].to_string()
                }
            })
            .into_owned();

        for name in unknown {
            self.diagnostics.push(Diagnostic::warning(DiagnosticKind::UnknownMacro, position, format!("unknown macro '${{{}}}' left unexpanded", name)));
        }
        expanded
    }

    fn take_type(&self, line: &str) -> (String, Option<String>) {
        match self.patterns.type_tag.captures(line) {
            Some(captures) => {
                let type_name = captures[1].to_string();
                let stripped = self.patterns.type_tag.replace(line, "").trim_end().to_string();
                (stripped, Some(type_name))
            }
            None => (line.to_string(), None),
        }
    }
}

/// Mark the first non-blank line as the brief description
fn with_brief(lines: Vec<String>) -> Vec<String> {
    let mut lines: Vec<String> = lines.into_iter().skip_while(|line| line.trim().is_empty()).collect();
    if let Some(first) = lines.first_mut() {
        if !first.trim_start().starts_with('@') {
            let separator = if first.starts_with(char::is_whitespace) { "" } else { " " };
            *first = format!("@brief{}{}", separator, first);
        }
    }
    lines
}

/// Warn when documented parameters and the signature disagree
pub fn check_params(text: &DocText, signature: &[String], member: &str, position: Position, diagnostics: &mut Vec<Diagnostic>) {
    if text.params.is_empty() {
        return;
    }
    for documented in &text.params {
        if !signature.contains(documented) {
            diagnostics.push(Diagnostic::warning(
                DiagnosticKind::DocParamMismatch,
                position,
                format!("documented parameter '{}' is not a parameter of '{}'", documented, member),
            ));
        }
    }
    for param in signature.iter().filter(|p| *p != "~") {
        if !text.params.contains(param) {
            diagnostics.push(Diagnostic::warning(DiagnosticKind::DocParamMismatch, position, format!("parameter '{}' of '{}' is not documented", param, member)));
        }
    }
}
