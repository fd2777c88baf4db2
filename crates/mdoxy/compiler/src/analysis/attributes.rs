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

//! Attribute resolution
//!
//! Maps attribute lists onto an output region (one access level plus the
//! region modifiers) and onto the notes attached to every member of a block.
//! The output grammar has a single access level per member, so asymmetric
//! access collapses to the most restrictive level and is spelled out in a note.

use crate::ast::{Access, Attribute, AttributeValue, Block, BlockKind, Modifier};
use crate::parser::common::{Diagnostic, DiagnosticKind, ParseError, ParseErrorKind, ParseResult, Position};
use std::collections::BTreeSet;
use std::fmt;

/// Access level and region modifiers shared by a run of emitted members
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct RegionKey {
    pub access: Access,
    pub modifiers: BTreeSet<Modifier>,
}

impl RegionKey {
    pub fn new(access: Access) -> Self {
        Self {
            access,
            modifiers: BTreeSet::new(),
        }
    }

    pub fn with_modifier(mut self, modifier: Modifier) -> Self {
        self.modifiers.insert(modifier);
        self
    }
}

impl fmt::Display for RegionKey {
    /// Region marker, e.g. `public: /* ( Abstract, Static ) */`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.access)?;
        if !self.modifiers.is_empty() {
            let names: Vec<&str> = self.modifiers.iter().map(Modifier::as_str).collect();
            write!(f, " /* ( {} ) */", names.join(", "))?;
        }
        Ok(())
    }
}

/// Resolved attributes of one block
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResolvedAttributes {
    pub region: RegionKey,
    /// Every asserted boolean attribute, region modifier or not
    pub modifiers: BTreeSet<Modifier>,
    /// Notes attached to every member of the block, in output order
    pub notes: Vec<String>,
}

impl ResolvedAttributes {
    pub fn has(&self, modifier: Modifier) -> bool {
        self.modifiers.contains(&modifier)
    }
}

/// All occurrences of one attribute key in a list
struct Entry<'a> {
    name: &'a str,
    key: String,
    values: Vec<&'a AttributeValue>,
    position: Position,
}

impl<'a> Entry<'a> {
    fn distinct_values(&self) -> Vec<String> {
        let mut seen: Vec<String> = Vec::new();
        for value in &self.values {
            let normalized = normalize(value);
            if !seen.contains(&normalized) {
                seen.push(normalized);
            }
        }
        seen
    }

    /// Conflicting booleans count as asserted
    fn flag(&self) -> ParseResult<bool> {
        let mut asserted = false;
        for value in &self.values {
            asserted |= truthiness(value).ok_or_else(|| {
                ParseError::new(ParseErrorKind::UnexpectedToken, self.position, format!("attribute '{}' expects true or false, found '{}'", self.name, value))
            })?;
        }
        Ok(asserted)
    }

    /// Conflicting access values resolve to the most restrictive one
    fn access(&self) -> ParseResult<Access> {
        let mut resolved = Access::Public;
        for value in &self.values {
            let text = match value {
                AttributeValue::Word(word) => word.as_str(),
                AttributeValue::Raw(raw) if raw.contains('?') => {
                    return Err(ParseError::unsupported(self.position, &format!("meta-class access list '{}'", raw)));
                }
                other => {
                    return Err(ParseError::new(ParseErrorKind::UnexpectedToken, self.position, format!("invalid value '{}' for attribute '{}'", other, self.name)));
                }
            };
            let access = Access::parse(text)
                .ok_or_else(|| ParseError::new(ParseErrorKind::UnexpectedToken, self.position, format!("invalid access level '{}' for attribute '{}'", text, self.name)))?;
            resolved = resolved.most_restrictive(access);
        }
        Ok(resolved)
    }
}

fn normalize(value: &AttributeValue) -> String {
    match value {
        AttributeValue::Flag(flag) => flag.to_string(),
        AttributeValue::Word(word) => word.to_ascii_lowercase(),
        AttributeValue::Raw(raw) => raw.trim().to_string(),
    }
}

fn truthiness(value: &AttributeValue) -> Option<bool> {
    match value {
        AttributeValue::Flag(flag) => Some(*flag),
        AttributeValue::Word(text) | AttributeValue::Raw(text) => match text.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        },
    }
}

const PROPERTY_KEYS: &[&str] = &[
    "access",
    "setaccess",
    "getaccess",
    "constant",
    "dependent",
    "hidden",
    "transient",
    "abstract",
    "abortset",
    "setobservable",
    "getobservable",
    "noncopyable",
    "description",
    "detaileddescription",
];
const METHOD_KEYS: &[&str] = &["access", "static", "abstract", "hidden", "sealed", "description", "detaileddescription"];
const EVENT_KEYS: &[&str] = &["listenaccess", "notifyaccess", "hidden", "description", "detaileddescription"];
const CLASS_KEYS: &[&str] = &[
    "sealed",
    "abstract",
    "hidden",
    "handlecompatible",
    "constructonload",
    "allowedsubclasses",
    "inferiorclasses",
    "description",
    "detaileddescription",
];

const PROPERTY_NOTE_MODIFIERS: &[Modifier] = &[
    Modifier::Transient,
    Modifier::Dependent,
    Modifier::Hidden,
    Modifier::AbortSet,
    Modifier::SetObservable,
    Modifier::GetObservable,
    Modifier::NonCopyable,
];
const METHOD_NOTE_MODIFIERS: &[Modifier] = &[Modifier::Hidden, Modifier::Sealed];
const EVENT_NOTE_MODIFIERS: &[Modifier] = &[Modifier::Hidden];

/// Resolves attribute lists and records findings as diagnostics
pub struct AttributeResolver<'d> {
    diagnostics: &'d mut Vec<Diagnostic>,
}

impl<'d> AttributeResolver<'d> {
    pub fn new(diagnostics: &'d mut Vec<Diagnostic>) -> Self {
        Self { diagnostics }
    }

    /// Resolve the attribute list of a block
    pub fn resolve_block(&mut self, block: &Block) -> ParseResult<ResolvedAttributes> {
        let (known, noun) = match block.kind {
            BlockKind::Properties => (PROPERTY_KEYS, "property"),
            BlockKind::Methods => (METHOD_KEYS, "method"),
            BlockKind::Events => (EVENT_KEYS, "event"),
        };
        let entries = self.entries(&block.attributes, known, &format!("{} block", block.kind));

        let mut modifiers = BTreeSet::new();
        for entry in &entries {
            if let Some(modifier) = Modifier::parse(&entry.key) {
                if entry.flag()? {
                    modifiers.insert(modifier);
                }
            }
        }

        let find = |key: &str| entries.iter().find(|e| e.key == key);
        let access_of = |key: &str| -> ParseResult<Option<Access>> { find(key).map(Entry::access).transpose() };

        let mut notes = Vec::new();
        let note_modifiers = match block.kind {
            BlockKind::Properties => PROPERTY_NOTE_MODIFIERS,
            BlockKind::Methods => METHOD_NOTE_MODIFIERS,
            BlockKind::Events => EVENT_NOTE_MODIFIERS,
        };
        let attribute_phrase = if block.kind == BlockKind::Methods { "MATLAB method attribute" } else { "MATLAB attribute" };
        for modifier in note_modifiers.iter().filter(|m| modifiers.contains(m)) {
            notes.push(format!("This {} has the {} @c {} set to true.", noun, attribute_phrase, modifier));
        }

        let access = match block.kind {
            BlockKind::Properties => {
                let both = access_of("access")?;
                let set = access_of("setaccess")?.or(both).unwrap_or_default();
                let get = access_of("getaccess")?.or(both).unwrap_or_default();
                if set != get {
                    notes.push(format!("This property has non-unique access specifier: <tt>SetAccess = {}, GetAccess = {}</tt>", set, get));
                }
                set.most_restrictive(get)
            }
            BlockKind::Methods => access_of("access")?.unwrap_or_default(),
            BlockKind::Events => {
                let listen = access_of("listenaccess")?.unwrap_or_default();
                let notify = access_of("notifyaccess")?.unwrap_or_default();
                if listen != notify {
                    notes.push(format!("This event has non-unique access specifier: <tt>ListenAccess = {}, NotifyAccess = {}</tt>", listen, notify));
                }
                listen
            }
        };

        notes.extend(conflict_notes(&entries, noun));

        let region = RegionKey {
            access,
            modifiers: modifiers.iter().copied().filter(Modifier::is_region_modifier).collect(),
        };
        Ok(ResolvedAttributes { region, modifiers, notes })
    }

    /// Resolve class attributes into class notes
    pub fn resolve_class(&mut self, attributes: &[Attribute]) -> ParseResult<Vec<String>> {
        let entries = self.entries(attributes, CLASS_KEYS, "class definition");
        let mut notes = Vec::new();

        for (key, text) in [
            ("sealed", "This class has the class property <tt>Sealed</tt> and cannot be derived from."),
            ("abstract", "This class has the class property <tt>Abstract</tt> and cannot be instantiated."),
            ("hidden", "This class has the class property <tt>Hidden</tt> and is not listed in class queries."),
            ("handlecompatible", "This class has the class property <tt>HandleCompatible</tt> and can be combined with handle classes."),
            ("constructonload", "This class has the class property <tt>ConstructOnLoad</tt>: its constructor runs when an object is loaded."),
        ] {
            if let Some(entry) = entries.iter().find(|e| e.key == key) {
                if entry.flag()? {
                    notes.push(text.to_string());
                }
            }
        }

        notes.extend(conflict_notes(&entries, "class"));
        Ok(notes)
    }

    /// Group occurrences by key, flagging unknown and conflicting keys
    fn entries<'a>(&mut self, attributes: &'a [Attribute], known: &[&str], owner: &str) -> Vec<Entry<'a>> {
        let mut entries: Vec<Entry<'a>> = Vec::new();
        for attribute in attributes {
            let key = attribute.name.to_ascii_lowercase();
            match entries.iter_mut().find(|e| e.key == key) {
                Some(entry) => entry.values.push(&attribute.value),
                None => {
                    if !known.contains(&key.as_str()) {
                        self.diagnostics.push(Diagnostic::info(
                            DiagnosticKind::UnknownAttribute,
                            attribute.position,
                            format!("unknown attribute '{}' in {} ignored", attribute.name, owner),
                        ));
                    }
                    entries.push(Entry {
                        name: &attribute.name,
                        key,
                        values: vec![&attribute.value],
                        position: attribute.position,
                    });
                }
            }
        }

        for entry in &entries {
            let values = entry.distinct_values();
            if values.len() > 1 {
                self.diagnostics.push(Diagnostic::warning(
                    DiagnosticKind::ConflictingAttribute,
                    entry.position,
                    format!("attribute '{}' repeated with conflicting values in {}: {}", entry.name, owner, values.join(", ")),
                ));
            }
        }
        entries
    }
}

fn conflict_notes(entries: &[Entry<'_>], noun: &str) -> Vec<String> {
    entries
        .iter()
        .filter_map(|entry| {
            let values = entry.distinct_values();
            (values.len() > 1).then(|| format!("This {} has conflicting values for attribute <tt>{}</tt>: {}", noun, entry.name, values.join(", ")))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attribute(name: &str, value: AttributeValue) -> Attribute {
        Attribute {
            name: name.to_string(),
            value,
            position: Position::new(2, 14),
        }
    }

    fn word(text: &str) -> AttributeValue {
        AttributeValue::Word(text.to_string())
    }

    fn block(kind: BlockKind, attributes: Vec<Attribute>) -> Block {
        Block {
            kind,
            attributes,
            members: Vec::new(),
            position: Position::new(2, 3),
        }
    }

    fn resolve(block: &Block) -> (ParseResult<ResolvedAttributes>, Vec<Diagnostic>) {
        let mut diagnostics = Vec::new();
        let resolved = AttributeResolver::new(&mut diagnostics).resolve_block(block);
        (resolved, diagnostics)
    }

    #[test]
    fn test_default_region_is_public() {
        let (resolved, diagnostics) = resolve(&block(BlockKind::Properties, Vec::new()));
        let resolved = resolved.unwrap();
        assert_eq!(resolved.region, RegionKey::new(Access::Public));
        assert!(resolved.notes.is_empty());
        assert!(diagnostics.is_empty());
        assert_eq!(resolved.region.to_string(), "public:");
    }

    #[test]
    fn test_asymmetric_access_uses_most_restrictive_region() {
        let attributes = vec![
            attribute("SetAccess", word("private")),
            attribute("GetAccess", word("protected")),
            attribute("Transient", AttributeValue::Flag(true)),
        ];
        let resolved = resolve(&block(BlockKind::Properties, attributes)).0.unwrap();
        assert_eq!(resolved.region, RegionKey::new(Access::Private).with_modifier(Modifier::Transient));
        assert_eq!(
            resolved.notes,
            vec![
                "This property has the MATLAB attribute @c Transient set to true.".to_string(),
                "This property has non-unique access specifier: <tt>SetAccess = private, GetAccess = protected</tt>".to_string(),
            ]
        );
        let asymmetric = resolved.notes.iter().filter(|n| n.contains("non-unique")).count();
        assert_eq!(asymmetric, 1);
    }

    #[test]
    fn test_access_sets_both_sides() {
        let resolved = resolve(&block(BlockKind::Properties, vec![attribute("Access", word("protected"))])).0.unwrap();
        assert_eq!(resolved.region.access, Access::Protected);
        assert!(resolved.notes.is_empty());
    }

    #[test]
    fn test_method_modifiers_and_marker() {
        let attributes = vec![attribute("Static", AttributeValue::Flag(true)), attribute("Abstract", AttributeValue::Flag(true))];
        let resolved = resolve(&block(BlockKind::Methods, attributes)).0.unwrap();
        assert_eq!(resolved.region.to_string(), "public: /* ( Abstract, Static ) */");

        let resolved = resolve(&block(BlockKind::Methods, vec![attribute("Hidden", AttributeValue::Flag(true))])).0.unwrap();
        assert_eq!(resolved.notes, vec!["This method has the MATLAB method attribute @c Hidden set to true.".to_string()]);
    }

    #[test]
    fn test_negated_flag_is_not_asserted() {
        let resolved = resolve(&block(BlockKind::Properties, vec![attribute("Constant", AttributeValue::Flag(false))])).0.unwrap();
        assert!(!resolved.has(Modifier::Constant));
    }

    #[test]
    fn test_conflicting_attribute_is_flagged_not_resolved_by_position() {
        let attributes = vec![attribute("Hidden", AttributeValue::Flag(true)), attribute("Hidden", AttributeValue::Flag(false))];
        let (resolved, diagnostics) = resolve(&block(BlockKind::Properties, attributes));
        let resolved = resolved.unwrap();
        assert!(resolved.has(Modifier::Hidden));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::ConflictingAttribute);
        assert!(resolved.notes.iter().any(|n| n.contains("conflicting values for attribute <tt>Hidden</tt>: true, false")));

        let reversed = vec![attribute("Access", word("private")), attribute("Access", word("public"))];
        let resolved = resolve(&block(BlockKind::Methods, reversed)).0.unwrap();
        assert_eq!(resolved.region.access, Access::Private);
    }

    #[test]
    fn test_identical_repeats_are_silent() {
        let attributes = vec![attribute("Hidden", AttributeValue::Flag(true)), attribute("hidden", word("true"))];
        let (resolved, diagnostics) = resolve(&block(BlockKind::Properties, attributes));
        assert!(diagnostics.is_empty());
        assert!(!resolved.unwrap().notes.iter().any(|n| n.contains("conflicting")));
    }

    #[test]
    fn test_unknown_attribute_is_informational() {
        let (resolved, diagnostics) = resolve(&block(BlockKind::Methods, vec![attribute("TestTags", AttributeValue::Raw("{'a'}".into()))]));
        assert!(resolved.is_ok());
        assert_eq!(diagnostics[0].kind, DiagnosticKind::UnknownAttribute);
        assert_eq!(diagnostics[0].severity, crate::parser::common::Severity::Info);
    }

    #[test]
    fn test_metaclass_access_is_unsupported() {
        let (resolved, _) = resolve(&block(BlockKind::Methods, vec![attribute("Access", AttributeValue::Raw("{?B}".into()))]));
        let error = resolved.unwrap_err();
        assert_eq!(error.kind, ParseErrorKind::UnsupportedConstruct);
    }

    #[test]
    fn test_events_use_listen_access() {
        let attributes = vec![attribute("ListenAccess", word("protected")), attribute("NotifyAccess", word("private"))];
        let resolved = resolve(&block(BlockKind::Events, attributes)).0.unwrap();
        assert_eq!(resolved.region.access, Access::Protected);
        assert_eq!(resolved.notes.len(), 1);
    }

    #[test]
    fn test_class_notes() {
        let mut diagnostics = Vec::new();
        let notes = AttributeResolver::new(&mut diagnostics).resolve_class(&[attribute("Sealed", AttributeValue::Flag(true))]).unwrap();
        assert_eq!(notes, vec!["This class has the class property <tt>Sealed</tt> and cannot be derived from.".to_string()]);
    }
}
