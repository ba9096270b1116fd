use crate::compilation::{format_error_message, CompilationError};
use std::panic::{catch_unwind, AssertUnwindSafe};

pub type ListenerError = Box<dyn std::error::Error + Send + Sync>;

type Listener = Box<dyn Fn(&CompilationError) -> Result<(), ListenerError>>;

/// Handle returned by [`ErrorHandler::add_error_listener`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Collects compilation errors and fans them out to listeners.
///
/// With no listener registered every error is logged. A listener that
/// fails or panics is logged and skipped; the remaining listeners still
/// run and the caller never sees the failure.
#[derive(Default)]
pub struct ErrorHandler {
    listeners: Vec<(ListenerId, Listener)>,
    next_id: u64,
    history: Vec<CompilationError>,
}

impl ErrorHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_error_listener<F>(&mut self, listener: F) -> ListenerId
    where
        F: Fn(&CompilationError) -> Result<(), ListenerError> + 'static,
    {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns `false` if the listener was already removed.
    pub fn remove_error_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() < before
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Records `error` and dispatches it.
    pub fn handle_compilation_error(&mut self, mut error: CompilationError) {
        if error.suggestions.is_empty() {
            error.suggestions.push(error.kind.default_suggestion().to_string());
        }

        if self.listeners.is_empty() {
            log::error!("{}", format_error_message(&error));
        }
        for (id, listener) in &self.listeners {
            match catch_unwind(AssertUnwindSafe(|| listener(&error))) {
                Ok(Ok(())) => {}
                Ok(Err(err)) => log::error!("Error listener {:?} failed: {}", id, err),
                Err(_) => log::error!("Error listener {:?} panicked", id),
            }
        }
        self.history.push(error);
    }

    /// Every error handled so far, oldest first.
    pub fn errors(&self) -> &[CompilationError] {
        &self.history
    }

    pub fn has_errors(&self) -> bool {
        !self.history.is_empty()
    }

    pub fn clear(&mut self) {
        self.history.clear();
    }
}

impl std::fmt::Debug for ErrorHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorHandler")
            .field("listeners", &self.listeners.len())
            .field("history", &self.history)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CompilationErrorKind;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn error(message: &str) -> CompilationError {
        CompilationError::new(CompilationErrorKind::Syntax, message, "A.mtm")
    }

    #[test]
    fn test_failing_listener_does_not_stop_dispatch() {
        let mut handler = ErrorHandler::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        handler.add_error_listener(|_| Err("listener broke".into()));
        handler.add_error_listener(|_| panic!("listener panicked"));
        let sink = Rc::clone(&seen);
        handler.add_error_listener(move |err| {
            sink.borrow_mut().push(err.message.clone());
            Ok(())
        });

        handler.handle_compilation_error(error("first"));
        assert_eq!(*seen.borrow(), vec!["first".to_string()]);
        assert_eq!(handler.errors().len(), 1);
    }

    #[test]
    fn test_removed_listener_is_not_called() {
        let mut handler = ErrorHandler::new();
        let count = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&count);
        let id = handler.add_error_listener(move |_| {
            *counter.borrow_mut() += 1;
            Ok(())
        });

        handler.handle_compilation_error(error("one"));
        assert!(handler.remove_error_listener(id));
        assert!(!handler.remove_error_listener(id));
        handler.handle_compilation_error(error("two"));
        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn test_errors_always_carry_a_suggestion() {
        let mut handler = ErrorHandler::new();
        handler.handle_compilation_error(error("no hints"));
        assert_eq!(handler.errors()[0].suggestions.len(), 1);
        handler.clear();
        assert!(!handler.has_errors());
    }
}
