//! Source file management for the MTM component compiler.
//!
//! This crate is responsible for:
//! - Loading `.mtm` source files from the filesystem
//! - Line/column/offset bookkeeping shared by the parser and the diagnostics tooling
//! - The diagnostics primitives (`Severity`, `QuickFix`, `Confidence`) every stage reports with
//! - Loading the `mtm.toml` compiler configuration
//!
//! Nothing in here knows about the `.mtm` grammar; it is the leaf of the
//! crate graph so that every other stage can depend on it.

mod config;
mod diagnostic;
mod error;
mod file;
mod location;
mod target;

pub use config::{CompilerConfig, CompilerSection, DiagnosticsSection, OutputSection, CONFIG_FILE_NAME};
pub use diagnostic::{Confidence, QuickFix, Severity};
pub use error::{SourceError, SourceResult};
pub use file::SourceFile;
pub use location::{LineIndex, SourceLocation, SourceRange};
pub use target::Target;
