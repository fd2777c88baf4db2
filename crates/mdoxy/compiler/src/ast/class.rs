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

//! Declaration tree for one class definition file

use super::types::QualifiedName;
use crate::parser::common::Position;
use std::fmt;

/// The single class declared by a file
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDeclaration {
    pub name: String,
    /// Superclasses in declaration order
    pub superclasses: Vec<QualifiedName>,
    pub attributes: Vec<Attribute>,
    pub blocks: Vec<Block>,
    /// Class-level comment blocks in file order, not yet bound to anything
    pub comments: Vec<CommentBlock>,
    /// Lines of the `classdef` statement
    pub header: LineRange,
    pub position: Position,
}

impl ClassDeclaration {
    /// All members in file order
    pub fn members(&self) -> impl Iterator<Item = &Declaration> {
        self.blocks.iter().flat_map(|block| block.members.iter())
    }

    /// Find a property by name
    pub fn property(&self, name: &str) -> Option<&Declaration> {
        self.members().find(|member| member.kind == DeclarationKind::Property && member.name == name)
    }

    pub fn is_constructor(&self, member: &Declaration) -> bool {
        member.kind == DeclarationKind::Method && member.accessor.is_none() && member.name == self.name
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    Properties,
    Methods,
    Events,
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BlockKind::Properties => "properties",
            BlockKind::Methods => "methods",
            BlockKind::Events => "events",
        };
        write!(f, "{}", name)
    }
}

/// A `properties`, `methods` or `events` block
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub kind: BlockKind,
    pub attributes: Vec<Attribute>,
    pub members: Vec<Declaration>,
    pub position: Position,
}

/// One entry of a parenthesized attribute list
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name: String,
    pub value: AttributeValue,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeValue {
    /// Bare keyword (`true`) or negated keyword (`~Key`, `false`)
    Flag(bool),
    /// A single word or quoted word, e.g. `private`
    Word(String),
    /// Any other value expression, verbatim
    Raw(String),
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Flag(value) => write!(f, "{}", value),
            AttributeValue::Word(word) => write!(f, "{}", word),
            AttributeValue::Raw(raw) => write!(f, "{}", raw),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclarationKind {
    Property,
    Method,
    Event,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessorKind {
    Get,
    Set,
}

impl AccessorKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            AccessorKind::Get => "get",
            AccessorKind::Set => "set",
        }
    }
}

/// Back-reference from an accessor method to the property it serves
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accessor {
    pub kind: AccessorKind,
    pub property: String,
}

/// A property, method or event member
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub kind: DeclarationKind,
    /// Member name; for accessors the property name
    pub name: String,
    /// Inline type (`name@Type` or validation syntax)
    pub type_ref: Option<QualifiedName>,
    /// Default value text exactly as written
    pub default_value: Option<String>,
    pub params: Vec<String>,
    pub returns: Vec<String>,
    /// `None` for abstract methods, prototypes, properties and events
    pub body: Option<Body>,
    pub is_abstract: bool,
    pub accessor: Option<Accessor>,
    /// Lines of the declaring statement (the signature for methods)
    pub header: LineRange,
    pub position: Position,
}

impl Declaration {
    /// Name as written in the source, `get.x` for accessors
    pub fn source_name(&self) -> String {
        match &self.accessor {
            Some(accessor) => format!("{}.{}", accessor.kind.prefix(), accessor.property),
            None => self.name.clone(),
        }
    }
}

/// Inclusive line range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LineRange {
    pub first: usize,
    pub last: usize,
}

impl LineRange {
    pub fn new(first: usize, last: usize) -> Self {
        Self { first, last }
    }
}

/// Method body between the signature and its closing `end`
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    /// Comment block opening the body; documentation for the method
    pub doc: Option<CommentBlock>,
    pub pieces: Vec<BodyPiece>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BodyPiece {
    /// Code copied verbatim, including layout
    Code(String),
    /// Comment lines (text after the `%` run)
    Comment(Vec<String>),
    /// Decoded literal contents
    Literal(String),
}

/// Consecutive comment lines treated as one unit for documentation binding
#[derive(Debug, Clone, PartialEq)]
pub struct CommentBlock {
    /// Text of each line after the leading `%` characters
    pub lines: Vec<String>,
    pub first_line: usize,
    pub last_line: usize,
    /// Whether the block starts on a line with no code before it
    pub own_line: bool,
    pub position: Position,
}

impl CommentBlock {
    /// Index and trimmed text of the first non-blank line, used to detect tagged blocks
    pub fn first_text(&self) -> Option<(usize, &str)> {
        self.lines.iter().map(|line| line.trim()).enumerate().find(|(_, line)| !line.is_empty())
    }
}
