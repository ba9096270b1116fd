//! Diagnostics for MTM components.
//!
//! - [`ErrorCategorizer`] maps raw parse and compile failures onto the seven
//!   [`ModernSyntaxErrorType`]s, renders the surrounding source and proposes
//!   line-level [`QuickFix`](mtm_source::QuickFix)es.
//! - [`CompilationError`] is the error every failed compile ends in, and
//!   [`format_error_message`] renders it for humans.
//! - [`ErrorHandler`] is the sink a compile reports into; it logs errors or
//!   hands them to registered listeners.

mod categorizer;
mod compilation;
mod context;
pub mod detect;
mod fixes;
mod handler;
mod kind;

pub use categorizer::{suggestions, CategorizedError, ErrorCategorizer, ErrorContext};
pub use compilation::{format_error_message, CompilationError, CompilationErrorKind};
pub use context::{extract_location, message_position, render_context};
pub use fixes::quick_fixes;
pub use handler::{ErrorHandler, ListenerError, ListenerId};
pub use kind::ModernSyntaxErrorType;
