//! Host logger seam
//!
//! The host player owns a human-readable log. Backends write diagnostic
//! lines to it and never wait on it.

use std::cell::RefCell;

/// Sink for human-readable diagnostics
pub trait Logger {
    fn log(&self, message: &str);
}

/// Forwards host log lines to `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn log(&self, message: &str) {
        tracing::info!(target: "vidshim::host", "{}", message);
    }
}

/// Keeps every line in memory, used by dry-runs and tests, and to hold
/// lines back until the caller has released any shared state
#[derive(Debug, Default)]
pub struct MemoryLogger {
    lines: RefCell<Vec<String>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.borrow().clone()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines.borrow().iter().any(|l| l.contains(needle))
    }

    /// Hand every buffered line to `sink` in order and empty the buffer
    pub fn flush_into(&self, sink: &dyn Logger) {
        let lines = std::mem::take(&mut *self.lines.borrow_mut());
        for line in &lines {
            sink.log(line);
        }
    }
}

impl Logger for MemoryLogger {
    fn log(&self, message: &str) {
        self.lines.borrow_mut().push(message.to_string());
    }
}

impl<L: Logger + ?Sized> Logger for &L {
    fn log(&self, message: &str) {
        (**self).log(message)
    }
}

impl<L: Logger + ?Sized> Logger for std::rc::Rc<L> {
    fn log(&self, message: &str) {
        (**self).log(message)
    }
}
