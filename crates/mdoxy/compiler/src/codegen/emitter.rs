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

//! Pseudo-code emitter
//!
//! Renders a parsed class with its resolved attributes and documentation.
//! Members keep file order; a region marker is written only when the
//! access/modifier classification changes, so adjacent members of the same
//! kind share one region.

use super::config::EmitterConfig;
use super::writer::CodeWriter;
use crate::analysis::{AttributeResolver, DocPatterns, DocProcessor, DocText, DocumentationAssociator, RegionKey, ResolvedAttributes, TypeSubstitution, check_params};
use crate::ast::{AccessorKind, Body, BodyPiece, ClassDeclaration, CommentBlock, Declaration, DeclarationKind, Modifier};
use crate::macros::MacroTable;
use crate::parser::common::utils::{escape_comment_text, is_valid_identifier};
use crate::parser::common::{Diagnostic, DiagnosticKind, ParseResult};
use std::collections::BTreeMap;
use std::iter::Peekable;
use std::slice::Iter;
use tracing::debug;

const BANNER: &[&str] = &[
    "/* (Autoinserted by mdoxy)",
    " * This file was generated from a class definition file for the documentation generator.",
    " * It can neither be run nor compiled. Method bodies are kept for the source browser,",
    " * with comments and literals rewritten.",
    " */",
];

/// Value given to a Constant property declared without one
const EMPTY_CONSTANT: &str = "[]";

/// Rendered output and the diagnostics found while producing it
#[derive(Debug, Clone, PartialEq)]
pub struct Emission {
    pub output: String,
    pub diagnostics: Vec<Diagnostic>,
}

/// Emits one class; owns its writer and diagnostics
pub struct Emitter<'a> {
    config: &'a EmitterConfig,
    patterns: &'a DocPatterns,
    macros: &'a MacroTable,
    writer: CodeWriter,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Emitter<'a> {
    pub fn new(config: &'a EmitterConfig, patterns: &'a DocPatterns, macros: &'a MacroTable) -> Self {
        Self {
            config,
            patterns,
            macros,
            writer: CodeWriter::with_capacity(4096),
            diagnostics: Vec::new(),
        }
    }

    /// Resolve, associate and render the class
    pub fn emit(mut self, class: &ClassDeclaration) -> ParseResult<Emission> {
        let mut resolver = AttributeResolver::new(&mut self.diagnostics);
        let class_notes = resolver.resolve_class(&class.attributes)?;
        let resolved = class.blocks.iter().map(|block| resolver.resolve_block(block)).collect::<ParseResult<Vec<ResolvedAttributes>>>()?;

        let association = DocumentationAssociator::new(&mut self.diagnostics).associate(class);

        let mut processor = DocProcessor::new(self.patterns, self.macros, &mut self.diagnostics);
        let class_text = processor.process(&association.class, class.position);
        let texts: Vec<DocText> = class.members().zip(&association.members).map(|(member, docs)| processor.process(docs, member.position)).collect();

        let members: Vec<(&Declaration, &ResolvedAttributes)> =
            class.blocks.iter().zip(&resolved).flat_map(|(block, attributes)| block.members.iter().map(move |member| (member, attributes))).collect();
        let accessor_notes = accessor_notes(class);
        let mut free = association.free.iter().peekable();

        if self.config.banner {
            for line in BANNER {
                self.writer.line(line);
            }
            self.writer.blank();
        }
        self.free_comments_before(&mut free, class.header.first);
        for namespace in &self.config.namespaces {
            self.writer.line(&format!("namespace {} {{", namespace));
        }
        self.class_header(class);
        self.class_doc(class, &class_text, &class_notes);

        let mut region: Option<&RegionKey> = None;
        for ((member, attributes), text) in members.iter().zip(&texts) {
            self.free_comments_before(&mut free, member.header.first);
            if region != Some(&attributes.region) {
                self.writer.blank();
                self.writer.line(&format!("  {}", attributes.region));
                self.writer.blank();
                region = Some(&attributes.region);
            }

            match member.kind {
                DeclarationKind::Property => self.property(member, attributes, text, accessor_notes.get(member.name.as_str()).copied()),
                DeclarationKind::Method => self.method(class, member, attributes, text),
                DeclarationKind::Event => self.event(member, attributes, text),
            }
            self.writer.blank();
        }

        self.free_comments_before(&mut free, usize::MAX);
        self.writer.line("};");
        for _ in &self.config.namespaces {
            self.writer.line("}");
        }

        debug!(class = %class.name, lines = self.writer.lines(), diagnostics = self.diagnostics.len(), "emitted class");
        Ok(Emission {
            output: self.writer.into_string(),
            diagnostics: self.diagnostics,
        })
    }

    fn class_header(&mut self, class: &ClassDeclaration) {
        match class.superclasses.split_first() {
            None => self.writer.line(&format!("class {} {{", class.name)),
            Some((first, rest)) => {
                self.writer.line(&format!("class {}", class.name));
                let mut bases = vec![format!("  :public {}", first.qualified())];
                bases.extend(rest.iter().map(|base| format!("   public {}", base.qualified())));
                self.writer.line(&format!("{} {{", bases.join(",\n")));
            }
        }
    }

    fn class_doc(&mut self, class: &ClassDeclaration, text: &DocText, notes: &[String]) {
        self.writer.line(&format!("/** @class \"{}\"", class.name));
        if let Some(group) = &self.config.group {
            self.doc_line(&format!("@ingroup {}", group));
        }
        self.doc_body(text, notes);
        self.writer.line("  */");
    }

    fn property(&mut self, member: &Declaration, attributes: &ResolvedAttributes, text: &DocText, accessor_note: Option<&'static str>) {
        let types = TypeSubstitution::new(&self.config.placeholders);
        let type_name = types.declared(member.type_ref.as_ref(), text.declared_type.as_deref());
        let constant = attributes.has(Modifier::Constant);
        let prefix = if constant { "static const " } else { "" };
        let default = match member.default_value.as_deref() {
            None if constant => {
                self.diagnostics.push(Diagnostic::warning(
                    DiagnosticKind::MissingConstantDefault,
                    member.position,
                    format!("constant property '{}' has no value; using {}", member.name, EMPTY_CONSTANT),
                ));
                Some(render_default(EMPTY_CONSTANT))
            }
            raw => raw.map(render_default),
        };

        match &default {
            Some(default) => self.writer.line(&format!("    {}{} {} = {};", prefix, type_name, member.name, default)),
            None => self.writer.line(&format!("    {}{} {};", prefix, type_name, member.name)),
        }

        let mut notes = attributes.notes.clone();
        notes.extend(accessor_note.map(str::to_string));
        let trailer: Vec<String> = default.iter().map(|default| format!("<br/>@b Default: {}", default)).collect();
        self.doc_block(&format!("@var {}", member.name), text, &notes, &trailer);
    }

    fn method(&mut self, class: &ClassDeclaration, member: &Declaration, attributes: &ResolvedAttributes, text: &DocText) {
        let types = TypeSubstitution::new(&self.config.placeholders);
        let is_static = attributes.has(Modifier::Static);
        let constructor = class.is_constructor(member);

        // The object argument is implicit for ordinary methods and accessors
        let params: &[String] = if is_static || constructor { &member.params } else { member.params.get(1..).unwrap_or(&[]) };
        let param_list = types.params(params, &text.types);
        let signature = if constructor {
            format!("{}({})", member.name, param_list)
        } else {
            format!("{} {}({})", types.returns(&member.returns, &text.types), member.name, param_list)
        };

        if member.accessor.is_none() && text.has_text() {
            check_params(text, params, &member.name, member.position, &mut self.diagnostics);
        }

        let prefix = match (is_static, member.is_abstract) {
            (true, _) => "static ",
            (false, true) => "virtual ",
            (false, false) => "",
        };

        match (&member.accessor, &member.body) {
            (Some(_), body) => {
                self.writer.line(&format!("#if 0 // {}: '{}'", self.config.guard_label, member.source_name()));
                match body {
                    Some(body) => self.body(&signature, body),
                    None => self.writer.line(&format!("{};", signature)),
                }
                self.writer.blank();
                self.writer.line("#endif");
            }
            (None, _) if member.is_abstract => self.writer.line(&format!("    {}{} = 0;", prefix, signature)),
            (None, Some(body)) => self.body(&format!("    {}{}", prefix, signature), body),
            (None, None) => self.writer.line(&format!("    {}{};", prefix, signature)),
        }

        self.doc_block(&format!("@fn {}", signature), text, &attributes.notes, &[]);
    }

    fn event(&mut self, member: &Declaration, attributes: &ResolvedAttributes, text: &DocText) {
        self.writer.line(&format!("    {} {};", self.config.placeholders.event_type, member.name));
        self.doc_block(&format!("@var {}", member.name), text, &attributes.notes, &[format!("@event {}", member.name)]);
    }

    /// Body text with comments and literals rewritten; layout is kept
    fn body(&mut self, opening: &str, body: &Body) {
        self.writer.raw(&format!("{} {{", opening));
        for piece in &body.pieces {
            match piece {
                BodyPiece::Code(code) => self.writer.raw(code),
                BodyPiece::Comment(lines) => self.writer.raw(&format!("/*{} */", escape_comment_text(&lines.join("\n")))),
                BodyPiece::Literal(text) => self.writer.raw(&format!("\"{}\"", quote(text))),
            }
        }
        self.writer.raw("}");
        self.writer.finish_line();
    }

    /// Doc block, written only when there is text or at least one note
    fn doc_block(&mut self, header: &str, text: &DocText, notes: &[String], trailer: &[String]) {
        if !text.has_text() && notes.is_empty() {
            return;
        }
        self.writer.line(&format!("/** {}", escape_comment_text(header)));
        self.doc_body(text, notes);
        for line in trailer {
            self.doc_line(line);
        }
        self.writer.line("  */");
    }

    fn doc_body(&mut self, text: &DocText, notes: &[String]) {
        for line in &text.lines {
            self.doc_line(line);
        }
        if text.has_text() && !notes.is_empty() {
            self.writer.line("  *");
        }
        for note in notes {
            self.doc_line(&format!("@note {}", note));
        }
    }

    fn doc_line(&mut self, line: &str) {
        let line = escape_comment_text(line);
        if line.trim().is_empty() {
            self.writer.line("  *");
        } else {
            self.writer.line(&format!("  * {}", line));
        }
    }

    fn free_comments_before(&mut self, free: &mut Peekable<Iter<'_, CommentBlock>>, line: usize) {
        while let Some(block) = free.next_if(|block| block.first_line < line) {
            self.writer.line(&format!("  /*{} */", escape_comment_text(&block.lines.join("\n"))));
        }
    }
}

/// Property note for every property with a getter, a setter or both
fn accessor_notes(class: &ClassDeclaration) -> BTreeMap<&str, &'static str> {
    let mut kinds: BTreeMap<&str, (bool, bool)> = BTreeMap::new();
    for accessor in class.members().filter_map(|member| member.accessor.as_ref()) {
        let entry = kinds.entry(accessor.property.as_str()).or_default();
        match accessor.kind {
            AccessorKind::Get => entry.0 = true,
            AccessorKind::Set => entry.1 = true,
        }
    }

    kinds
        .into_iter()
        .map(|(property, kinds)| {
            let note = match kinds {
                (true, true) => "This property has custom functionality when its value is retrieved or changed.",
                (true, false) => "This property has custom functionality when its value is retrieved.",
                _ => "This property has custom functionality when its value is changed.",
            };
            (property, note)
        })
        .collect()
}

/// Render a default value for display
///
/// Numbers and plain identifiers stay as written, a single literal becomes
/// `"text"`, `struct(...)` and `{...}` keep their outer syntax around a quoted
/// body, and anything else is quoted whole.
pub fn render_default(raw: &str) -> String {
    let text = raw.trim();
    if text.parse::<f64>().is_ok() || is_valid_identifier(text) {
        return text.to_string();
    }
    if let Some(literal) = single_literal(text) {
        return format!("\"{}\"", quote(&literal));
    }
    if let Some(inner) = text.strip_prefix("struct").map(str::trim_start).and_then(|rest| enclosed(rest, '(', ')')) {
        return format!("struct(\"{}\")", quote(inner));
    }
    if let Some(inner) = enclosed(text, '{', '}') {
        return format!("{{\"{}\"}}", quote(inner));
    }
    format!("\"{}\"", quote(text))
}

/// Escape text for a double-quoted run that may span lines
fn quote(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\\n")
}

/// Decoded contents when the text is exactly one literal
fn single_literal(text: &str) -> Option<String> {
    let quote = text.chars().next().filter(|c| *c == '\'' || *c == '"')?;
    let inner = text.strip_prefix(quote)?.strip_suffix(quote)?;

    let mut decoded = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == quote && chars.next() != Some(quote) {
            return None;
        }
        decoded.push(c);
    }
    Some(decoded)
}

/// Body between `open` and `close` when they enclose the whole text
fn enclosed(text: &str, open: char, close: char) -> Option<&str> {
    let inner = text.strip_prefix(open)?.strip_suffix(close)?;
    let mut depth = 0usize;
    let mut literal: Option<char> = None;
    let mut previous = open;

    for c in inner.chars() {
        match literal {
            Some(quote) if c == quote => literal = None,
            Some(_) => {}
            None if c == '"' => literal = Some(c),
            None if c == '\'' && !(previous.is_alphanumeric() || matches!(previous, ')' | ']' | '}' | '.' | '_' | '\'')) => literal = Some(c),
            None if c == open => depth += 1,
            None if c == close => depth = depth.checked_sub(1)?,
            None => {}
        }
        if !c.is_whitespace() {
            previous = c;
        }
    }
    (depth == 0 && literal.is_none()).then_some(inner)
}
