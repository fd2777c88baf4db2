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

//! Integration tests for the complete translation pipeline
//!
//! These tests run whole class files through scanning, parsing, attribute
//! resolution, documentation association and emission.

use mdoxy_compiler::codegen::is_balanced;
use mdoxy_compiler::parser::{DiagnosticKind, ErrorCategory, ParseErrorKind};
use mdoxy_compiler::{Filter, FilterConfig, FilterError, MacroTable, Translation, translate};
use proptest::prelude::*;

const RECT: &str = include_str!("fixtures/+grid/Rect.m");
const RECT_PATH: &str = "tests/fixtures/+grid/Rect.m";

fn bare() -> FilterConfig {
    FilterConfig::new().with_banner(false)
}

fn translate_rect(config: &FilterConfig) -> Translation {
    translate(RECT, RECT_PATH, config).expect("fixture should translate")
}

/// Test the complete pipeline on a realistic class file
#[test]
fn test_fixture_translation() {
    let translation = translate_rect(&bare().with_group("grid"));
    let output = &translation.output;

    assert!(output.starts_with("namespace grid {\nclass Rect\n  :public ::grid::Base,\n   public ::handle {\n/** @class \"Rect\"\n  * @ingroup grid\n  * @brief Rectangular grid of cells\n"));
    assert!(output.contains("  * @note This class has the class property <tt>Sealed</tt> and cannot be derived from.\n"));
    assert!(output.contains("  private: /* ( Transient ) */\n"));
    assert!(output.contains("    ::double nx = 10;\n/** @var nx\n  * @brief Number of cells along x\n"));
    assert!(output.contains("  public: /* ( Constant ) */\n\n    static const matlabtypesubstitute Version = \"1.0\";\n"));
    assert!(output.contains("    EVENT Resized;\n"));
    assert!(output.contains("    Rect(matlabtypesubstitute nx,matlabtypesubstitute ny) {\n"));
    assert!(output.contains("    static mlhsInnerSubst<void> unit();\n"));
    assert!(output.ends_with("};\n}\n"));
}

#[test]
fn test_translation_is_idempotent() {
    let config = bare();
    assert_eq!(translate_rect(&config), translate_rect(&config));

    let filter = Filter::new(FilterConfig::new()).unwrap();
    let first = filter.translate(RECT, RECT_PATH).unwrap();
    let second = filter.translate(RECT, RECT_PATH).unwrap();
    assert_eq!(first.output, second.output);
    assert_eq!(first.diagnostics, second.diagnostics);
}

#[test]
fn test_output_is_balanced() {
    assert!(is_balanced(&translate_rect(&FilterConfig::new()).output));
}

#[test]
fn test_trailing_comment_follows_declaration() {
    let output = translate_rect(&bare()).output;
    assert!(output.contains("    matlabtypesubstitute ny = 20;\n/** @var ny\n  * @brief Number of cells along y\n"));
    assert!(output.contains("    EVENT Resized;\n/** @var Resized\n  * @brief Fired after the extents change\n"));
}

#[test]
fn test_asymmetric_access_note_per_property() {
    let output = translate_rect(&bare()).output;
    let note = "@note This property has non-unique access specifier: <tt>SetAccess = private, GetAccess = protected</tt>";
    assert_eq!(output.matches(note).count(), 3);
    assert_eq!(output.matches("  private: /* ( Transient ) */").count(), 1);
}

#[test]
fn test_multiple_returns_and_sections() {
    let output = translate_rect(&bare()).output;
    let signature = "mlhsSubst<mlhsInnerSubst<void,w> ,mlhsInnerSubst<void,h> > extents(::double scale)";
    assert!(output.contains(&format!("    {} {{\n      w = obj.nx * scale; /* width first */\n", signature)));
    assert!(output.contains(&format!("/** @fn {}\n  * @brief Scaled extents\n", signature)));
    assert!(output.contains("  * @param scale factor applied to both axes\n"));
    assert!(output.contains("  * @retval w width\n  * @retval h height\n"));
    assert!(output.contains("  * @retval h height\n  *  Values are in cell units.\n"));
    assert!(output.contains("disp(\"wide\"); end\n    }\n"));
}

#[test]
fn test_getter_is_guarded() {
    let output = translate_rect(&bare()).output;
    assert!(output.contains("#if 0 // mdoxy: 'get.count'\nmlhsInnerSubst<void> count() {\n      c = obj.nx * obj.ny;\n    }\n\n#endif\n/** @fn mlhsInnerSubst<void> count()\n  * @brief Product of the extents\n"));
    assert!(output.contains("  * @note This property has the MATLAB attribute @c Dependent set to true.\n  * @note This property has custom functionality when its value is retrieved.\n"));
}

#[test]
fn test_verbatim_multiline_default() {
    let output = translate_rect(&bare()).output;
    assert!(output.contains("    matlabtypesubstitute layout = struct(\"'rows', [], ... row layout\\\n                    'cols', {'a', 'b'}\");\n"));
}

#[test]
fn test_macro_expansion() {
    let unexpanded = translate_rect(&bare());
    assert!(unexpanded.output.contains("See ${manual} for details."));
    assert_eq!(unexpanded.diagnostics.iter().filter(|d| d.kind == DiagnosticKind::UnknownMacro).count(), 1);

    let config = bare().with_macros(MacroTable::new().with("manual", "@ref grid_manual"));
    let expanded = translate_rect(&config);
    assert!(expanded.output.contains("See @ref grid_manual for details."));
    assert!(expanded.diagnostics.is_empty());
}

#[test]
fn test_scenario_single_line_class() {
    let output = translate("classdef A < B.C  properties(Constant)  x = 1;  end end", "A.m", &bare()).unwrap().output;
    assert!(output.contains(":public ::B::C {"));
    assert!(output.contains("  public: /* ( Constant ) */\n\n    static const matlabtypesubstitute x = 1;\n"));
}

#[test]
fn test_scenario_undocumented_properties() {
    let translation = translate("classdef A\n  properties\n    first\n\n\n    second\n  end\nend\n", "A.m", &bare()).unwrap();
    let output = &translation.output;
    let first = output.find("    matlabtypesubstitute first;\n").unwrap();
    let second = output.find("    matlabtypesubstitute second;\n").unwrap();
    assert!(first < second);
    assert!(!output.contains("/** @var"));
    assert!(translation.diagnostics.is_empty());
}

#[test]
fn test_fatal_errors_carry_location() {
    let cases = [
        ("classdef A\n  properties\n    x = 'open\n  end\nend\n", ErrorCategory::LexError, "A.m:3:9: "),
        ("classdef A\n  properties\n    x = [1 2\n  end\nend\n", ErrorCategory::SyntaxError, "A.m:3:9: "),
        ("classdef A\n  widgets\n  end\nend\n", ErrorCategory::SyntaxError, "A.m:2:3: "),
        ("classdef A\n  enumeration\n    Red\n  end\nend\n", ErrorCategory::UnsupportedConstructError, "A.m:2:3: "),
        ("function f()\nend\n", ErrorCategory::UnsupportedConstructError, "A.m:1:1: "),
    ];

    for (source, category, prefix) in cases {
        match translate(source, "A.m", &bare()) {
            Err(FilterError::Parse(error)) => {
                assert_eq!(error.category(), category, "{}", source);
                assert!(error.to_string().starts_with(prefix), "{} does not start with {}", error, prefix);
            }
            other => panic!("expected a parse error for {:?}, got {:?}", source, other.map(|t| t.output)),
        }
    }
}

#[test]
fn test_accessor_errors() {
    let unknown = "classdef A\n  methods\n    function v = get.missing(obj)\n      v = 1;\n    end\n  end\nend\n";
    let error = Filter::new(bare()).unwrap().translate(unknown, "A.m").unwrap_err();
    assert_eq!(error.kind, ParseErrorKind::UnknownAccessorTarget);

    let arity = "classdef A\n  properties\n    p\n  end\n  methods\n    function set.p(obj)\n    end\n  end\nend\n";
    let error = Filter::new(bare()).unwrap().translate(arity, "A.m").unwrap_err();
    assert_eq!(error.kind, ParseErrorKind::InvalidAccessor);
}

/// Property names that are not keywords
fn property_name() -> impl Strategy<Value = String> {
    "[a-z][a-zA-Z0-9_]{0,8}".prop_filter("keywords are not property names", |name| {
        !matches!(
            name.as_str(),
            "classdef" | "properties" | "methods" | "events" | "enumeration" | "function" | "end" | "if" | "for" | "parfor" | "while" | "switch" | "try" | "spmd" | "arguments"
        )
    })
}

fn default_value() -> impl Strategy<Value = String> {
    prop_oneof![
        "[0-9]{1,4}".prop_map(String::from),
        "'[a-z\\\\ ]{0,8}'".prop_map(String::from),
        "\\[[0-9 ,]{0,8}\\]".prop_map(String::from),
        "struct\\('[a-z]{1,4}', [0-9]\\)".prop_map(String::from),
        "\\{'[a-z]{0,3}', [0-9]\\}".prop_map(String::from),
    ]
}

fn property_line() -> impl Strategy<Value = String> {
    (property_name(), proptest::option::of(default_value()), proptest::option::of("[a-zA-Z */{}()]{0,20}")).prop_map(|(name, default, comment)| {
        let mut line = format!("    {}", name);
        if let Some(default) = default {
            line.push_str(&format!(" = {};", default));
        }
        if let Some(comment) = comment {
            line.push_str(&format!(" % {}", comment));
        }
        line
    })
}

fn statement() -> impl Strategy<Value = String> {
    prop_oneof![
        "s[a-z]{0,2} = '[a-z\\\\ ]{0,6}';".prop_map(String::from),
        "s[a-z]{0,2} = \"[a-z\\\\ ]{0,6}\";".prop_map(String::from),
        "r = a; % [a-z\\\\ ]{0,8}".prop_map(String::from),
        Just("if a, r = [1 2]; end".to_string()),
        Just("for k = 1:3\n        r(k) = {a};\n      end".to_string()),
    ]
}

fn method_source() -> impl Strategy<Value = String> {
    (property_name(), proptest::option::of("[a-z ]{1,12}"), prop::collection::vec(statement(), 0..4)).prop_map(|(name, doc, statements)| {
        let mut method = format!("    function r = {}(obj, a)\n", name);
        if let Some(doc) = doc {
            method.push_str(&format!("      % {}\n", doc));
        }
        for statement in statements {
            method.push_str(&format!("      {}\n", statement));
        }
        method.push_str("    end\n");
        method
    })
}

fn class_source() -> impl Strategy<Value = String> {
    let block = (prop_oneof![Just(""), Just(" (Constant)"), Just(" (SetAccess = private)"), Just(" (Hidden, Transient)")], prop::collection::vec(property_line(), 0..6))
        .prop_map(|(attributes, lines)| format!("  properties{}\n{}\n  end\n", attributes, lines.join("\n")));
    (prop::collection::vec(block, 0..4), prop::collection::vec(method_source(), 0..4), any::<bool>(), any::<bool>()).prop_map(|(blocks, methods, getter, setter)| {
        let mut source = format!("classdef Generated < base.Type\n% Generated class\n{}  properties\n    tracked\n  end\n  methods\n", blocks.concat());
        source.push_str(&methods.concat());
        if getter {
            source.push_str("    function v = get.tracked(obj)\n      v = 'C:\\';\n    end\n");
        }
        if setter {
            source.push_str("    function set.tracked(obj, v)\n      disp(v);\n    end\n");
        }
        source.push_str("  end\nend\n");
        source
    })
}

proptest! {
    #[test]
    fn prop_translation_is_idempotent_and_balanced(source in class_source()) {
        let config = FilterConfig::new();
        let first = translate(&source, "Generated.m", &config).unwrap();
        let second = translate(&source, "Generated.m", &config).unwrap();
        prop_assert_eq!(&first.output, &second.output);
        prop_assert!(is_balanced(&first.output), "unbalanced output:\n{}", first.output);
    }

    #[test]
    fn prop_malformed_input_never_panics(body in prop::collection::vec(prop_oneof![
        Just("x = [1 2"), Just("y = 'a''b'"), Just(")"), Just("end"), Just("properties"), Just("% c"), Just("%{"), Just("%}"), Just("..."), Just("\n"), Just(" ")
    ], 0..30)) {
        let source = format!("classdef A\n{}", body.concat());
        let _ = translate(&source, "A.m", &FilterConfig::new());
    }
}
