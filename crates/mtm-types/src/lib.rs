//! Type diagnostics for modern-syntax components.
//!
//! [`TypeErrorHandler`] compares annotations against inferred types,
//! explains inference failures, flags reactive variables that hold
//! functions and checks that a component's types are consistent with each
//! other. Everything here is advisory: the handler never fails, it only
//! reports [`TypeErrorInfo`] values that a strict pipeline may choose to
//! treat as errors.

mod handler;
mod hints;
mod info;
mod program;

pub use handler::{conflict_severity, TypeErrorHandler};
pub use info::{
    ConflictResolution, HintPattern, Resolution, TypeErrorInfo, TypeErrorKind, TypeErrorRecovery, TypeHint,
    TypedVariable,
};
