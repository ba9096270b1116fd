//! Lexer, parser and unified AST for the MTM modern component syntax.
//!
//! The entry point is [`parse`], which turns component source text into a
//! [`UnifiedAst`]. Files written in the old syntax come back as
//! [`UnifiedAst::LegacyProgram`] and are never interpreted further.
//!
//! # Example
//!
//! ```rust
//! use mtm_syntax::{parse, Statement, UnifiedAst};
//!
//! let ast = parse("$count! = 0\n<template><p>{{$count}}</p></template>").unwrap();
//! let UnifiedAst::Program(program) = ast else { unreachable!() };
//! assert!(matches!(program.body[0], Statement::ReactiveVariable(_)));
//! ```

pub mod analysis;
pub mod ast;
mod error;
pub mod infer;
pub mod lexer;
pub mod parser;

pub use ast::*;
pub use error::{SyntaxError, SyntaxResult};
pub use analysis::assigned_names;
pub use infer::{Inference, TypeInferrer};
pub use parser::{detect_syntax_version, parse, parse_expression, split_frontmatter, FrontmatterBlock};

use mtm_source::SourceFile;

/// Parses a loaded source file.
pub fn parse_file(file: &SourceFile) -> SyntaxResult<UnifiedAst> {
    log::debug!("Parsing {}", file.display_name());
    parse(file.contents())
}
