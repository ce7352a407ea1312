//! # dotmark-parser
//!
//! A parser for the dotmark light markup format.
//!
//! The parser has two faces with the same core: a streaming face that
//! yields a flat sequence of structural events with byte spans, and a
//! whole-document face that folds that sequence into a syntax tree.
//!
//! - [`dotmark::EventIter`] - single-pass iterator over parse events
//! - [`dotmark::parse`] - build a [`dotmark::Doc`] from input text
//!
//! Both entry points take a [`dotmark::DiagnosticSink`] that receives
//! non-fatal warnings raised while parsing.

pub mod dotmark;
