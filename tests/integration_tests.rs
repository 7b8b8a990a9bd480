//! Integration tests for the tlua front-end: parse, analyze with the standard declarations, unparse.

use std::fs;
use std::path::{Path, PathBuf};

use tlua::cli::prelude::standard_environment;
use tlua::diagnostics::{Diagnostic, DiagnosticCode};
use tlua::format::{FormatConfig, unparse};
use tlua::frontend::analyzer::{Analysis, analyze};
use tlua::parser;

/// Helper to run the analysis pipeline on a source string
fn analyze_source(source: &str) -> Analysis {
    let mut chunk = parser::parse(source).unwrap_or_else(|e| panic!("parse failed: {e}"));
    let env = standard_environment().expect("standard declarations are valid");
    analyze(&mut chunk, &env).expect("fresh chunk")
}

fn errors(analysis: &Analysis) -> Vec<&Diagnostic> {
    analysis.diagnostics.iter().filter(|d| d.is_error()).collect()
}

fn fixtures(kind: &str) -> Vec<PathBuf> {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(kind);
    let mut files: Vec<PathBuf> = fs::read_dir(&dir)
        .unwrap_or_else(|e| panic!("cannot read {}: {e}", dir.display()))
        .map(|entry| entry.expect("directory entry").path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "lua"))
        .collect();
    files.sort();
    files
}

/// Test that all valid fixtures analyze without errors
#[test]
fn test_valid_fixtures() {
    let files = fixtures("valid");
    assert!(!files.is_empty());
    for path in files {
        let source = fs::read_to_string(&path).expect("fixture readable");
        let analysis = analyze_source(&source);
        assert!(
            !analysis.has_errors(),
            "Expected {} to analyze cleanly, got: {:?}",
            path.display(),
            errors(&analysis)
        );
    }
}

/// Test that invalid fixtures produce the expected error
#[test]
fn test_invalid_fixtures() {
    let expected = [
        ("arity.lua", DiagnosticCode::WrongParameters),
        ("bad_return.lua", DiagnosticCode::CannotCastReturn),
        ("call_number.lua", DiagnosticCode::CannotCall),
        ("wrong_argument.lua", DiagnosticCode::CannotCast),
    ];
    let files = fixtures("invalid");
    assert_eq!(files.len(), expected.len());

    for (path, (name, code)) in files.iter().zip(expected) {
        assert_eq!(path.file_name().and_then(|n| n.to_str()), Some(name));
        let source = fs::read_to_string(path).expect("fixture readable");
        let analysis = analyze_source(&source);
        let codes: Vec<_> = errors(&analysis).iter().map(|d| d.code).collect();
        assert_eq!(codes, vec![code], "unexpected errors for {name}");
    }
}

/// Unparsing every fixture gives source that parses to the same statement layout
#[test]
fn test_fixtures_survive_unparse() {
    for path in fixtures("valid").into_iter().chain(fixtures("invalid")) {
        let source = fs::read_to_string(&path).expect("fixture readable");
        let chunk = parser::parse(&source).expect("fixture parses");
        let output = unparse(&chunk, &FormatConfig::default());
        let reparsed = parser::parse(&output).unwrap_or_else(|e| panic!("{}: {e}\n{output}", path.display()));

        assert_eq!(chunk.block().len(), reparsed.block().len(), "{}", path.display());
        assert_eq!(unparse(&reparsed, &FormatConfig::default()), output, "{}", path.display());
    }
}

// ============================================================================
// Scenarios against the standard declarations
// ============================================================================

#[test]
fn test_standard_functions_are_typed() {
    let analysis = analyze_source("local s: string = tostring(1)\nlocal n: number = math.floor(2.5)");
    assert!(analysis.diagnostics.is_empty(), "{:?}", analysis.diagnostics);
}

#[test]
fn test_standard_return_mismatch() {
    let analysis = analyze_source("local n: number = tostring(1)");
    let codes: Vec<_> = analysis.diagnostics.iter().map(|d| d.code).collect();
    assert_eq!(codes, vec![DiagnosticCode::CannotCast]);
    assert_eq!(
        analysis.diagnostics[0].message.as_deref(),
        Some("Cannot cast 'string' to 'number'")
    );
}

#[test]
fn test_string_table_members() {
    let analysis = analyze_source("local u = string.upper(\"a\")\nlocal l: number = string.len(u)");
    assert!(analysis.diagnostics.is_empty(), "{:?}", analysis.diagnostics);

    let analysis = analyze_source("string.rep(\"a\")");
    let codes: Vec<_> = analysis.diagnostics.iter().map(|d| d.code).collect();
    assert_eq!(codes, vec![DiagnosticCode::WrongParameters]);
}

#[test]
fn test_unknown_global_call_warns() {
    let analysis = analyze_source("undefined_function(1)");
    assert!(!analysis.has_errors());
    assert!(analysis.warning_count() >= 1);
}

#[test]
fn test_diagnostics_are_in_walk_order() {
    let analysis = analyze_source("local a: number = \"x\"\nlocal b: string = 1\n");
    let indexes: Vec<_> = analysis.diagnostics.iter().map(|d| d.index).collect();
    assert_eq!(indexes.len(), 2);
    assert!(indexes[0] < indexes[1]);
}
