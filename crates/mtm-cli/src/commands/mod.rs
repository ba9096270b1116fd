mod build;
mod check;
mod new;

pub use build::handle_build;
pub use check::handle_check;
pub use new::handle_new;

use mtm_diagnostics::{format_error_message, ErrorHandler};

/// Error handler printing every compilation error to stderr.
fn reporting_sink() -> ErrorHandler {
    let mut sink = ErrorHandler::new();
    sink.add_error_listener(|error| {
        eprintln!("{}\n", format_error_message(error));
        Ok(())
    });
    sink
}
