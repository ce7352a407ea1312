//! Main module for dotmark library functionality

pub mod ast;
pub mod block;
pub mod building;
pub mod diagnostics;
pub mod event;
pub mod inline;
pub mod range;

pub use ast::{Doc, Node};
pub use block::EventIter;
pub use building::{parse, ParseError, ParseOpts};
pub use diagnostics::{DiagnosticSink, MemorySink, NullSink, StderrSink};
pub use event::{Annot, Event};
pub use range::{Pos, Position, SourceLocation};
