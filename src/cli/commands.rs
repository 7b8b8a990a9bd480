//! CLI command implementations
//!
//! All command functions return `CliResult<ExitCode>` instead of calling
//! `process::exit`. Error handling and exits happen in the top-level `run()`.

use std::fs;
use std::path::Path;

use miette::{NamedSource, Report};
use tracing::{debug, info, warn};

use crate::format::{FormatConfig, diff_lines, unparse};
use crate::frontend::analyzer::{Analysis, TypeEnvironment, analyze};
use crate::frontend::ast::MainChunk;
use crate::frontend::lines::normalize_line_endings;
use crate::frontend::{ParseError, diagnostics, parser};

use super::prelude::standard_environment;
use super::{CliError, CliResult, ExitCode};

/// Maximum source file size (100 MB) to prevent memory exhaustion
const MAX_SOURCE_SIZE: u64 = 100 * 1024 * 1024;

/// Safely read a source file with size limit check.
///
/// ## Errors
/// - The file cannot be accessed
/// - The file exceeds `MAX_SOURCE_SIZE` (100 MB)
pub fn read_source(file_path: &str) -> CliResult<String> {
    // Check file size before reading
    let metadata =
        fs::metadata(file_path).map_err(|e| CliError::failure(format!("Cannot access file '{}': {}", file_path, e)))?;

    if metadata.len() > MAX_SOURCE_SIZE {
        return Err(CliError::failure(format!(
            "Source file '{}' is too large ({} bytes, max {} bytes)",
            file_path,
            metadata.len(),
            MAX_SOURCE_SIZE
        )));
    }

    let source = fs::read_to_string(file_path)
        .map_err(|e| CliError::failure(format!("Error reading file '{}': {}", file_path, e)))?;
    if source.trim().is_empty() {
        warn!(file = file_path, "source file is empty");
    }
    Ok(source)
}

/// The environment the analyzer starts from.
fn environment(prelude: bool) -> CliResult<TypeEnvironment> {
    if !prelude {
        return Ok(TypeEnvironment::new());
    }
    standard_environment().map_err(|e| CliError::failure(format!("Invalid standard declarations: {}", e)))
}

/// Render a parse error against its source.
fn parse_failure(file_path: &str, source: &str, err: ParseError) -> CliError {
    let report = Report::new(err).with_source_code(NamedSource::new(file_path, source.to_string()));
    CliError::failure(format!("{:?}", report))
}

/// Parse a file, rendering syntax errors for the user.
///
/// Returns the chunk together with the normalized source its offsets refer to.
fn parse_source(file_path: &str, source: &str) -> CliResult<(MainChunk, String)> {
    let normalized = normalize_line_endings(source).into_owned();
    let chunk = parser::parse(&normalized).map_err(|e| parse_failure(file_path, &normalized, e))?;
    debug!(file = file_path, nodes = chunk.ast.len(), "parsed");
    Ok((chunk, normalized))
}

/// Parse and analyze a file, printing its diagnostics.
fn analyze_file(file_path: &str, prelude: bool) -> CliResult<(MainChunk, Analysis)> {
    let source = read_source(file_path)?;
    let (mut chunk, normalized) = parse_source(file_path, &source)?;
    let env = environment(prelude)?;
    let analysis = analyze(&mut chunk, &env).map_err(|e| CliError::failure(e.to_string()))?;

    for diagnostic in &analysis.diagnostics {
        diagnostics::print_diagnostic(file_path, &normalized, &chunk.lines, diagnostic);
    }
    Ok((chunk, analysis))
}

/// One-line summary of an analysis, `None` when there is nothing to report.
fn summary(analysis: &Analysis) -> Option<String> {
    let errors = analysis.error_count();
    let warnings = analysis.warning_count();
    if errors == 0 && warnings == 0 {
        return None;
    }
    let plural = |n: usize| if n == 1 { "" } else { "s" };
    Some(format!(
        "{} error{}, {} warning{}",
        errors,
        plural(errors),
        warnings,
        plural(warnings)
    ))
}

fn exit_code(analysis: &Analysis) -> ExitCode {
    if analysis.has_errors() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// Parse a file and print its node table (debug)
pub fn parse_file(file_path: &str) -> CliResult<ExitCode> {
    let source = read_source(file_path)?;
    let (chunk, _) = parse_source(file_path, &source)?;

    println!("=== AST ({} nodes) ===", chunk.ast.len());
    for (id, expr) in chunk.ast.iter() {
        println!(
            "{:>5} {:>4}:{:<3} {}",
            id.index(),
            chunk.lines.line(expr.index),
            chunk.lines.column(expr.index),
            expr.kind.name()
        );
    }
    println!("=== Top-level statements: {} ===", chunk.block().len());
    Ok(ExitCode::SUCCESS)
}

/// Analyze a file and report its diagnostics
pub fn check_file(file_path: &str, prelude: bool) -> CliResult<ExitCode> {
    let (_, analysis) = analyze_file(file_path, prelude)?;

    match summary(&analysis) {
        Some(line) => eprintln!("{}: {}", file_path, line),
        None => println!("✓ {} checked", file_path),
    }
    Ok(exit_code(&analysis))
}

/// Analyze a file, report its diagnostics, then print it with every inferred typing
pub fn run_file(file_path: &str, prelude: bool) -> CliResult<ExitCode> {
    let (chunk, analysis) = analyze_file(file_path, prelude)?;

    let config = FormatConfig::new().with_emit_typings(true);
    print!("{}", unparse(&chunk, &config));

    if let Some(line) = summary(&analysis) {
        eprintln!("{}: {}", file_path, line);
    }
    Ok(exit_code(&analysis))
}

/// How `fmt` reports its result.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormatOptions {
    /// Exit with failure when the output differs from the file
    pub check: bool,
    /// Print a line diff instead of the output
    pub diff: bool,
    /// Write the output back to the file
    pub write: bool,
    /// Analyze against the standard declarations (only used with typings)
    pub prelude: bool,
}

/// Unparse a file
pub fn format_file(file_path: &str, config: &FormatConfig, options: FormatOptions) -> CliResult<ExitCode> {
    let source = read_source(file_path)?;
    let (mut chunk, _) = parse_source(file_path, &source)?;

    if config.emit_typings {
        let env = environment(options.prelude)?;
        analyze(&mut chunk, &env).map_err(|e| CliError::failure(e.to_string()))?;
    }
    let formatted = unparse(&chunk, config);
    let changed = source != formatted;

    if options.diff {
        if let Some(diff) = diff_lines(&source, &formatted) {
            println!("--- {}", file_path);
            print!("{}", diff);
        }
    }

    if options.check {
        if changed {
            println!("Would reformat: {}", file_path);
            return Ok(ExitCode::FAILURE);
        }
        println!("✓ {} is already formatted", file_path);
        return Ok(ExitCode::SUCCESS);
    }

    if options.write {
        if changed {
            fs::write(Path::new(file_path), &formatted)
                .map_err(|e| CliError::failure(format!("Error writing {}: {}", file_path, e)))?;
            info!(file = file_path, "formatted");
            println!("Formatted: {}", file_path);
        }
        return Ok(ExitCode::SUCCESS);
    }

    if !options.diff {
        print!("{}", formatted);
    }
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    /// A scratch file removed on drop.
    struct TempSource {
        path: PathBuf,
    }

    impl TempSource {
        fn new(name: &str, contents: &str) -> Self {
            let path = std::env::temp_dir().join(format!("tlua-{}-{}.lua", std::process::id(), name));
            fs::write(&path, contents).unwrap();
            Self { path }
        }

        fn path(&self) -> String {
            self.path.to_string_lossy().into_owned()
        }
    }

    impl Drop for TempSource {
        fn drop(&mut self) {
            let _ = fs::remove_file(&self.path);
        }
    }

    #[test]
    fn test_read_source_missing_file() {
        let err = read_source("/definitely/not/here.lua").unwrap_err();
        assert!(err.message.starts_with("Cannot access file"));
        assert_eq!(err.exit_code, ExitCode::FAILURE);
    }

    #[test]
    fn test_check_file_clean() {
        let file = TempSource::new("clean", "local x: number = 1\nprint(x)\n");
        assert_eq!(check_file(&file.path(), true).unwrap(), ExitCode::SUCCESS);
    }

    #[test]
    fn test_check_file_with_errors() {
        let file = TempSource::new("errors", "local x: number = \"a\"\n");
        assert_eq!(check_file(&file.path(), false).unwrap(), ExitCode::FAILURE);
    }

    #[test]
    fn test_check_file_syntax_error() {
        let file = TempSource::new("syntax", "local = 1\n");
        let err = check_file(&file.path(), false).unwrap_err();
        assert!(err.message.contains("tlua::parse"));
    }

    #[test]
    fn test_format_file_check_mode() {
        let file = TempSource::new("fmt-check", "print 'x'\n");
        let options = FormatOptions {
            check: true,
            ..FormatOptions::default()
        };
        assert_eq!(
            format_file(&file.path(), &FormatConfig::default(), options).unwrap(),
            ExitCode::FAILURE
        );
    }

    #[test]
    fn test_format_file_write_mode() {
        let file = TempSource::new("fmt-write", "print 'x'\n");
        let options = FormatOptions {
            write: true,
            ..FormatOptions::default()
        };
        format_file(&file.path(), &FormatConfig::default(), options).unwrap();
        assert_eq!(fs::read_to_string(&file.path).unwrap(), "print(\"x\")\n");
    }

    #[test]
    fn test_summary_pluralizes() {
        let file = TempSource::new("summary", "local x: number = \"a\"\nlocal y: number = \"b\"\n");
        let (_, analysis) = analyze_file(&file.path(), false).unwrap();
        assert_eq!(summary(&analysis).as_deref(), Some("2 errors, 0 warnings"));
    }
}
