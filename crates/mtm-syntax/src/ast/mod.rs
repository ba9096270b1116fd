//! Unified AST shared by every transformer.

mod decl;
mod expr;
mod program;
mod template;
mod types;

pub use decl::*;
pub use expr::*;
pub use program::*;
pub use template::*;
pub use types::*;
