use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for source and configuration operations
pub type SourceResult<T> = Result<T, SourceError>;

/// Errors that can occur when loading sources or configuration
#[derive(Debug, Error, Diagnostic)]
pub enum SourceError {
    /// The source file or directory does not exist
    #[error("Path does not exist: {0}")]
    #[diagnostic(
        code("MTM-SOURCE-001"),
        help("Make sure the path exists and has proper permissions")
    )]
    PathNotFound(PathBuf),

    /// Error reading a file from disk
    #[error("Failed to read {path}")]
    #[diagnostic(
        code("MTM-SOURCE-002"),
        help("Check file permissions and ensure the file is valid UTF-8")
    )]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file does not carry the `.mtm` extension
    #[error("Not an MTM component: {0}")]
    #[diagnostic(
        code("MTM-SOURCE-003"),
        help("Component sources must use the .mtm extension")
    )]
    InvalidExtension(PathBuf),

    /// Error parsing `mtm.toml`
    #[error("Invalid compiler configuration in {path}: {message}")]
    #[diagnostic(
        code("MTM-SOURCE-004"),
        help("Check your mtm.toml syntax; every section and key is optional")
    )]
    ConfigParseError { path: PathBuf, message: String },

    /// Error serializing a configuration
    #[error("Failed to serialize compiler configuration: {0}")]
    #[diagnostic(code("MTM-SOURCE-005"))]
    ConfigSerializeError(String),
}
