//! Diagnostic sinks for parse-time warnings
//!
//! The parser never fails on malformed text; it raises warnings through
//! a sink injected into its entry points. A warning is a message plus an
//! optional byte offset into the input.
//!
//! Sinks are chosen once per invocation and shared by reference for the
//! whole parse. Delivery is synchronous: every warning arrives before
//! the parse call that triggered it returns. A sink must not fail; its
//! own I/O problems are swallowed.

use std::cell::RefCell;

/// Receiver for non-fatal parse warnings.
pub trait DiagnosticSink {
    /// Report a warning, optionally tied to a byte offset in the input.
    fn warn(&self, message: &str, pos: Option<usize>);
}

/// Writes each warning to stderr, one per line.
pub struct StderrSink;

impl DiagnosticSink for StderrSink {
    fn warn(&self, message: &str, pos: Option<usize>) {
        match pos {
            Some(offset) => eprintln!("{} at {}", message, offset),
            None => eprintln!("{}", message),
        }
    }
}

/// Discards every warning.
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn warn(&self, _message: &str, _pos: Option<usize>) {}
}

/// Collects warnings in memory, for inspection after parsing.
#[derive(Default)]
pub struct MemorySink {
    warnings: RefCell<Vec<(String, Option<usize>)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All warnings received so far, in delivery order
    pub fn warnings(&self) -> Vec<(String, Option<usize>)> {
        self.warnings.borrow().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.borrow().is_empty()
    }
}

impl DiagnosticSink for MemorySink {
    fn warn(&self, message: &str, pos: Option<usize>) {
        self.warnings.borrow_mut().push((message.to_string(), pos));
    }
}
