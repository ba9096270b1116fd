use super::reporting_sink;
use crate::error::CliError;
use mtm_driver::Compiler;
use mtm_source::{SourceFile, Target};
use std::path::{Path, PathBuf};

/// Compiles `file` and writes `<stem>.<ext>` for every target.
///
/// With more than one target each output goes to a subdirectory named
/// after the target, so React and Solid do not overwrite each other.
pub fn handle_build(file: &Path, targets: &[Target], out: Option<PathBuf>) -> Result<Vec<PathBuf>, CliError> {
    let compiler = Compiler::discover(file)?;
    let source = SourceFile::load(file)?;
    let mut sink = reporting_sink();

    let outputs = if targets.is_empty() {
        vec![compiler.compile(&source, &mut sink)]
    } else {
        compiler.compile_targets(&source, targets, &mut sink)
    };

    let out_dir = out.unwrap_or_else(|| compiler.config().output.out_dir.clone());
    let mut written = Vec::new();
    let mut failed = 0;
    for output in &outputs {
        if !output.is_success() {
            failed += output.errors.len().max(1);
            continue;
        }
        let dir = if outputs.len() > 1 {
            out_dir.join(output.target.name())
        } else {
            out_dir.clone()
        };
        let path = compiler.output_path(&source, output.target, Some(&dir));
        compiler.write_output(output, &path)?;
        println!("Compiled {} for {} -> {}", source.display_name(), output.target, path.display());
        written.push(path);
    }

    if failed > 0 {
        return Err(CliError::CompileFailed {
            file: source.display_name(),
            count: failed,
        });
    }
    Ok(written)
}
