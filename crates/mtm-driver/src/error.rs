use miette::Diagnostic;
use mtm_source::SourceError;
use std::path::PathBuf;
use thiserror::Error;

/// Failures of the driver itself. Problems in a component are not errors
/// here; they are reported to the error handler and returned in the
/// [`CompileOutput`](crate::CompileOutput).
#[derive(Debug, Error, Diagnostic)]
pub enum DriverError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Source(#[from] SourceError),

    #[error("Failed to write {path}")]
    #[diagnostic(
        code("MTM-DRIVER-001"),
        help("Check that the output directory is writable")
    )]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No code was generated for {file}")]
    #[diagnostic(code("MTM-DRIVER-002"), help("Fix the reported errors and compile again"))]
    NothingToWrite { file: String },
}

/// Result type for driver operations.
pub type DriverResult<T> = Result<T, DriverError>;
