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

//! Documentation association
//!
//! Binds class-level comment blocks to the class header and to members:
//!
//! 1. Tagged blocks (`@var x`, `@fn run`, `@property x`, `@event e`) are supplementary
//!    documentation of the named member, concatenated in file order.
//! 2. A trailing block (same line, or an own-line block on the next line) binds first.
//!    For methods with a body the opening body comment is the trailing block.
//! 3. An own-line block ending directly above a declaration binds only when that
//!    declaration has no trailing block.
//!
//! Everything left over is a free comment.

use crate::ast::{ClassDeclaration, CommentBlock, Declaration, DeclarationKind};
use crate::parser::common::{Diagnostic, DiagnosticKind};
use tracing::debug;

/// Documentation sources bound to one declaration
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Documentation {
    /// Primary block text, lines after the `%` run
    pub primary: Option<Vec<String>>,
    /// Tagged blocks in file order, tag line removed
    pub supplementary: Vec<Vec<String>>,
}

impl Documentation {
    pub fn is_empty(&self) -> bool {
        self.primary.is_none() && self.supplementary.is_empty()
    }
}

/// Result of binding all comment blocks of one class
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Association {
    pub class: Documentation,
    /// One entry per member, in `ClassDeclaration::members` order
    pub members: Vec<Documentation>,
    /// Unbound blocks in file order
    pub free: Vec<CommentBlock>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DocTagKind {
    Var,
    Fn,
    Property,
    Event,
}

impl DocTagKind {
    fn parse(word: &str) -> Option<Self> {
        match word {
            "@var" => Some(DocTagKind::Var),
            "@fn" => Some(DocTagKind::Fn),
            "@property" => Some(DocTagKind::Property),
            "@event" => Some(DocTagKind::Event),
            _ => None,
        }
    }

    fn declaration_kind(&self) -> DeclarationKind {
        match self {
            DocTagKind::Var | DocTagKind::Property => DeclarationKind::Property,
            DocTagKind::Fn => DeclarationKind::Method,
            DocTagKind::Event => DeclarationKind::Event,
        }
    }
}

/// A block that names its member explicitly
struct DocTag {
    kind: DocTagKind,
    target: String,
    lines: Vec<String>,
}

impl DocTag {
    fn parse(block: &CommentBlock) -> Option<Self> {
        let (index, first) = block.first_text()?;
        let mut words = first.split_whitespace();
        let kind = DocTagKind::parse(words.next()?)?;
        let target = words.next()?.to_string();
        Some(Self {
            kind,
            target,
            lines: block.lines[index + 1..].to_vec(),
        })
    }
}

/// A documentation binding site
struct Target {
    first: usize,
    last: usize,
    has_body: bool,
    label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fate {
    Pending,
    Bound,
    Free,
}

/// Binds comment blocks to declarations, recording ambiguities as diagnostics
pub struct DocumentationAssociator<'d> {
    diagnostics: &'d mut Vec<Diagnostic>,
}

impl<'d> DocumentationAssociator<'d> {
    pub fn new(diagnostics: &'d mut Vec<Diagnostic>) -> Self {
        Self { diagnostics }
    }

    pub fn associate(&mut self, class: &ClassDeclaration) -> Association {
        let members: Vec<&Declaration> = class.members().collect();

        // Target 0 is the class header
        let mut targets = vec![Target {
            first: class.header.first,
            last: class.header.last,
            has_body: false,
            label: format!("class '{}'", class.name),
        }];
        targets.extend(members.iter().map(|member| Target {
            first: member.header.first,
            last: member.header.last,
            has_body: member.body.is_some(),
            label: format!("'{}'", member.source_name()),
        }));

        let mut docs = vec![Documentation::default(); targets.len()];
        for (index, member) in members.iter().enumerate() {
            if let Some(doc) = member.body.as_ref().and_then(|body| body.doc.as_ref()) {
                docs[index + 1].primary = Some(doc.lines.clone());
            }
        }

        let comments = &class.comments;
        let mut fates = vec![Fate::Pending; comments.len()];

        for (index, block) in comments.iter().enumerate() {
            let Some(tag) = DocTag::parse(block) else {
                continue;
            };
            match resolve_tag(&tag, &members) {
                Some(member) => {
                    docs[member + 1].supplementary.push(tag.lines);
                    fates[index] = Fate::Bound;
                }
                None => {
                    self.diagnostics.push(Diagnostic::warning(
                        DiagnosticKind::UnresolvedDocTarget,
                        block.position,
                        format!("documentation block names unknown member '{}'", tag.target),
                    ));
                    fates[index] = Fate::Free;
                }
            }
        }

        for (index, block) in comments.iter().enumerate() {
            if fates[index] != Fate::Pending {
                continue;
            }
            let Some(target) = trailing_target(&targets, block) else {
                continue;
            };
            if docs[target].primary.is_some() {
                continue;
            }
            docs[target].primary = Some(block.lines.clone());
            fates[index] = Fate::Bound;

            if let Some(other) = leading_target(&targets, block).filter(|other| *other != target) {
                self.diagnostics.push(Diagnostic::info(
                    DiagnosticKind::AssociationAmbiguity,
                    block.position,
                    format!("comment block documents {} rather than the following {}", targets[target].label, targets[other].label),
                ));
            }
        }

        for (index, block) in comments.iter().enumerate() {
            if fates[index] != Fate::Pending {
                continue;
            }
            fates[index] = match leading_target(&targets, block) {
                Some(target) if docs[target].primary.is_none() => {
                    docs[target].primary = Some(block.lines.clone());
                    Fate::Bound
                }
                Some(target) => {
                    self.diagnostics.push(Diagnostic::info(
                        DiagnosticKind::AssociationAmbiguity,
                        block.position,
                        format!("leading comment block left unbound: {} is already documented by a trailing block", targets[target].label),
                    ));
                    Fate::Free
                }
                None => Fate::Free,
            };
        }

        let free: Vec<CommentBlock> = comments.iter().zip(&fates).filter(|(_, fate)| **fate != Fate::Bound).map(|(block, _)| block.clone()).collect();
        debug!(blocks = comments.len(), free = free.len(), "associated documentation");

        let mut docs = docs.into_iter();
        let class_docs = docs.next().unwrap_or_default();
        Association {
            class: class_docs,
            members: docs.collect(),
            free,
        }
    }
}

/// Nearest preceding bodiless declaration the block trails
fn trailing_target(targets: &[Target], block: &CommentBlock) -> Option<usize> {
    targets
        .iter()
        .enumerate()
        .filter(|(_, target)| !target.has_body)
        .filter(|(_, target)| if block.own_line { block.first_line == target.last + 1 } else { block.first_line == target.last })
        .map(|(index, _)| index)
        .last()
}

fn leading_target(targets: &[Target], block: &CommentBlock) -> Option<usize> {
    if !block.own_line {
        return None;
    }
    targets.iter().position(|target| target.first == block.last_line + 1)
}

/// Member index named by a tag, preferring members of the tagged kind
fn resolve_tag(tag: &DocTag, members: &[&Declaration]) -> Option<usize> {
    let named = |member: &&&Declaration| member.source_name() == tag.target;
    let kind = tag.kind.declaration_kind();
    members
        .iter()
        .enumerate()
        .filter(|(_, member)| member.kind == kind)
        .find(|(_, member)| named(member))
        .or_else(|| members.iter().enumerate().find(|(_, member)| named(member)))
        .map(|(index, _)| index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::common::Severity;
    use crate::parser::parse_class;

    fn associate(source: &str) -> (Association, Vec<Diagnostic>) {
        let class = parse_class("A.m", source).unwrap();
        let mut diagnostics = Vec::new();
        let association = DocumentationAssociator::new(&mut diagnostics).associate(&class);
        (association, diagnostics)
    }

    fn lines(items: &[&str]) -> Option<Vec<String>> {
        Some(items.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_class_doc_follows_header() {
        let (association, diagnostics) = associate("classdef A < handle\n% A short summary\n% More text\n  properties\n    x\n  end\nend\n");
        assert_eq!(association.class.primary, lines(&[" A short summary", " More text"]));
        assert!(association.members[0].is_empty());
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_trailing_wins_over_leading() {
        let source = "classdef A\n  properties\n    x = 1;\n    % about x\n    y\n  end\nend\n";
        let (association, diagnostics) = associate(source);
        assert_eq!(association.members[0].primary, lines(&[" about x"]));
        assert_eq!(association.members[1].primary, None);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::AssociationAmbiguity);
        assert_eq!(diagnostics[0].severity, Severity::Info);
    }

    #[test]
    fn test_leading_binds_without_trailing() {
        let source = "classdef A\n  properties\n    x = 1;\n\n    % about y\n    y\n  end\nend\n";
        let (association, diagnostics) = associate(source);
        assert_eq!(association.members[0].primary, None);
        assert_eq!(association.members[1].primary, lines(&[" about y"]));
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_same_line_comment_trails() {
        let source = "classdef A\n  properties\n    x = 1; % x doc\n    y % y doc\n  end\nend\n";
        let (association, _) = associate(source);
        assert_eq!(association.members[0].primary, lines(&[" x doc"]));
        assert_eq!(association.members[1].primary, lines(&[" y doc"]));
    }

    #[test]
    fn test_leading_ignored_when_trailing_exists() {
        let source = "classdef A\n  properties\n\n    % above\n    x % beside\n  end\nend\n";
        let (association, diagnostics) = associate(source);
        assert_eq!(association.members[0].primary, lines(&[" beside"]));
        assert_eq!(association.free.len(), 1);
        assert_eq!(association.free[0].lines, vec![" above"]);
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn test_body_doc_is_primary() {
        let source = "classdef A\n  methods\n    % above run\n    function run(obj)\n      % body doc\n      disp(1);\n    end\n  end\nend\n";
        let (association, diagnostics) = associate(source);
        assert_eq!(association.members[0].primary, lines(&[" body doc"]));
        assert_eq!(association.free.len(), 1);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::AssociationAmbiguity);
    }

    #[test]
    fn test_supplementary_blocks_concatenate() {
        let source = "classdef A\n  properties\n    x % primary\n  end\n\n  % @var x\n  % first extra\n\n  %{\n  @property x\n  second extra\n  %}\nend\n";
        let (association, diagnostics) = associate(source);
        let docs = &association.members[0];
        assert_eq!(docs.primary, lines(&[" primary"]));
        assert_eq!(docs.supplementary, vec![vec![" first extra".to_string()], vec!["  second extra".to_string()]]);
        assert!(association.free.is_empty());
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_tag_targets_accessor() {
        let source = "classdef A\n  properties\n    x\n  end\n  methods\n    function v = get.x(obj)\n      v = 1;\n    end\n  end\n\n  % @fn get.x\n  % extra\nend\n";
        let (association, _) = associate(source);
        assert_eq!(association.members[1].supplementary, vec![vec![" extra".to_string()]]);
    }

    #[test]
    fn test_unknown_tag_target_is_free() {
        let source = "classdef A\n  properties\n    x\n  end\n\n  % @var nothere\n  % text\nend\n";
        let (association, diagnostics) = associate(source);
        assert_eq!(association.free.len(), 1);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::UnresolvedDocTarget);
        assert_eq!(diagnostics[0].severity, Severity::Warning);
    }

    #[test]
    fn test_undocumented_properties() {
        let (association, diagnostics) = associate("classdef A\n  properties\n    x\n\n    y\n  end\nend\n");
        assert!(association.members.iter().all(Documentation::is_empty));
        assert!(association.free.is_empty());
        assert!(diagnostics.is_empty());
    }
}
