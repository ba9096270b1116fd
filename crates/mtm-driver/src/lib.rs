//! The MTM compilation pipeline.
//!
//! [`Compiler`] ties the stages together for one component at a time:
//!
//! 1. parse the source into a unified AST (`mtm-syntax`)
//! 2. check declared against inferred types (`mtm-types`)
//! 3. lower the AST for the target framework (`mtm-codegen`)
//! 4. on a parse failure, categorize it and report it (`mtm-diagnostics`)
//!
//! ```rust
//! use mtm_diagnostics::ErrorHandler;
//! use mtm_driver::Compiler;
//! use mtm_source::{SourceFile, Target};
//!
//! let file = SourceFile::new("Toggle.mtm", "---\ntarget: svelte\n---\n$on! = false\n");
//! let output = Compiler::default().compile(&file, &mut ErrorHandler::new());
//! assert_eq!(output.target, Target::Svelte);
//! assert!(output.code.unwrap().contains("const on = writable(false);"));
//! ```

mod compiler;
mod error;

pub use compiler::{CompileOutput, Compiler};
pub use error::{DriverError, DriverResult};
