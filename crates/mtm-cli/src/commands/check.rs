use super::reporting_sink;
use crate::error::CliError;
use mtm_diagnostics::CompilationErrorKind;
use mtm_driver::{CompileOutput, Compiler};
use mtm_source::{QuickFix, SourceFile};
use std::fmt::Write;
use std::path::Path;

/// Compiles `file` without writing anything and prints what was found.
pub fn handle_check(file: &Path) -> Result<(), CliError> {
    let compiler = Compiler::discover(file)?;
    let source = SourceFile::load(file)?;
    let output = compiler.compile(&source, &mut reporting_sink());

    print!("{}", report(&output));
    // Strict mode already turned error-severity diagnostics into errors.
    let count = if output.errors.is_empty() {
        output.diagnostics.iter().filter(|diagnostic| diagnostic.is_error()).count()
    } else {
        output.errors.len()
    };
    if count == 0 {
        println!("{} is valid {} component source", source.display_name(), output.target);
        Ok(())
    } else {
        Err(CliError::CheckFailed {
            file: source.display_name(),
            count,
        })
    }
}

/// Categorized errors and type diagnostics, each with its quick fixes.
fn report(output: &CompileOutput) -> String {
    let mut out = String::new();
    for error in output.errors.iter().filter(|error| error.kind != CompilationErrorKind::Syntax) {
        let _ = write!(out, "error [{}]", error.kind);
        if let (Some(line), Some(column)) = (error.line, error.column) {
            let _ = write!(out, " at line {}, column {}", line, column);
        }
        let _ = writeln!(out, ": {}", error.message);
        for suggestion in &error.suggestions {
            let _ = writeln!(out, "  help: {}", suggestion);
        }
    }
    for error in &output.categorized {
        let _ = writeln!(out, "{} [{}] at {}", error.severity, error.kind, error.location);
        write_fixes(&mut out, &error.quick_fixes);
    }
    for diagnostic in &output.diagnostics {
        let _ = writeln!(out, "{}", diagnostic);
        write_fixes(&mut out, &diagnostic.quick_fixes);
    }
    out
}

fn write_fixes(out: &mut String, fixes: &[QuickFix]) {
    for fix in fixes {
        let _ = writeln!(
            out,
            "  fix: {} (line {}): {}",
            fix.description, fix.range.start.line, fix.replacement
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_check_reports_errors() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("Broken.mtm");
        fs::write(&file, "$count ! = 0\n").unwrap();
        let err = handle_check(&file).unwrap_err();
        assert!(matches!(err, CliError::CheckFailed { count: 1, .. }));
    }

    #[test]
    fn test_report_lists_type_diagnostics_with_fixes() {
        let output = Compiler::default().compile(
            &SourceFile::new("Title.mtm", "$title: string = 42\n"),
            &mut reporting_sink(),
        );
        let report = report(&output);
        assert!(report.starts_with("error[TYPE_CONFLICT]"));
        assert!(report.contains("  fix: "));
    }

    #[test]
    fn test_check_fails_on_type_errors_without_strict_mode() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("Title.mtm");
        fs::write(&file, "$title: string = 42\n").unwrap();
        let err = handle_check(&file).unwrap_err();
        assert!(matches!(err, CliError::CheckFailed { count: 1, .. }));
    }

    #[test]
    fn test_report_lists_unknown_targets() {
        let output = Compiler::default().compile(
            &SourceFile::new("Card.mtm", "---\ntarget: angular\n---\n$open! = false\n"),
            &mut reporting_sink(),
        );
        let report = report(&output);
        assert!(report.starts_with("error [framework] at line 2, column 9: Unsupported target framework 'angular'"));
        assert!(report.contains("  help: Use one of the supported targets: reactjs, vue, svelte, solid"));
    }

    #[test]
    fn test_check_accepts_valid_components() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("Ok.mtm");
        fs::write(&file, "$count! = 0\n").unwrap();
        handle_check(&file).unwrap();
    }
}
