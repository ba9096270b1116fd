use miette::Diagnostic;
use mtm_driver::DriverError;
use mtm_source::SourceError;
use std::path::PathBuf;
use thiserror::Error;

/// CLI-specific error type that provides rich diagnostics
#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Driver(#[from] DriverError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Source(#[from] SourceError),

    #[error("Failed {operation} {path}")]
    #[diagnostic(code(mtm::cli::io_error))]
    IoError {
        path: PathBuf,
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{file} failed to compile with {count} error(s)")]
    #[diagnostic(code(mtm::cli::compile_failed), help("Run `mtm check {file}` for quick fixes"))]
    CompileFailed { file: String, count: usize },

    #[error("{file} has {count} error(s)")]
    #[diagnostic(code(mtm::cli::check_failed))]
    CheckFailed { file: String, count: usize },

    #[error("{0} already exists")]
    #[diagnostic(code(mtm::cli::already_exists), help("Choose another component name or remove the existing file"))]
    AlreadyExists(PathBuf),
}

pub fn io_error(error: std::io::Error, path: PathBuf, operation: &str) -> CliError {
    CliError::IoError {
        path,
        operation: operation.to_string(),
        source: error,
    }
}
