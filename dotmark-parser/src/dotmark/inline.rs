//! Inline parsing for paragraph and heading text
//!
//! Inline structure lives within a single line: the block parser hands
//! this module one line of content at a time, and delimiter matching
//! never crosses a line boundary.
//!
//! Tokenization is handled by logos; delimiter pairing is resolved for
//! the whole line before any event is emitted, so an unpaired `_` or `*`
//! degrades to literal text instead of an unterminated container.

use logos::Logos;
use std::collections::VecDeque;
use std::ops::Range;

use super::diagnostics::DiagnosticSink;
use super::event::{Annot, Event};

/// Inline tokens within one line of content
#[derive(Logos, Debug, PartialEq, Clone, Copy)]
enum Token {
    #[token("_")]
    Underscore,

    #[token("*")]
    Star,

    // A run of backticks opens a verbatim span, closed by a run of the
    // same length
    #[regex(r"`+")]
    Backticks,

    // Backslash escape of ASCII punctuation or space
    #[regex(r"\\[ !-/:-@\[-`{-~]")]
    Escaped,

    // A backslash before anything else is literal
    #[token("\\")]
    Backslash,

    // Text content (catch-all for non-special characters)
    #[regex(r"[^_*`\\]+")]
    Text,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DelimKind {
    Emph,
    Strong,
}

impl DelimKind {
    fn start(self) -> Annot {
        match self {
            DelimKind::Emph => Annot::EmphStart,
            DelimKind::Strong => Annot::StrongStart,
        }
    }

    fn end(self) -> Annot {
        match self {
            DelimKind::Emph => Annot::EmphEnd,
            DelimKind::Strong => Annot::StrongEnd,
        }
    }
}

/// Line content after verbatim resolution, before delimiter pairing
#[derive(Debug)]
enum Item {
    /// Plain text (also escaped characters and demoted delimiters)
    Literal(Range<usize>),
    /// The backslash of an escape; the escaped character follows as Literal
    Escape(Range<usize>),
    /// Verbatim span; the range covers the content between the tick runs
    Verbatim(Range<usize>),
    /// An emphasis or strong delimiter, role not yet decided
    Delim(DelimKind, Range<usize>),
}

/// What delimiter pairing decided for each item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Open,
    Close,
    Literal,
}

/// Parse one line of inline content and append its events to `out`.
///
/// `span` addresses the content within the full input; emitted spans are
/// global. Trailing and leading whitespace is the caller's concern.
pub(crate) fn parse_line(
    input: &str,
    span: Range<usize>,
    sink: &dyn DiagnosticSink,
    out: &mut VecDeque<Event>,
) {
    let tokens = tokenize(&input[span.clone()], span.start);
    let items = resolve_verbatim(&tokens, span.end, sink);
    let roles = pair_delimiters(&items);
    emit(items, &roles, out);
}

/// Tokenize a line, mapping spans to global offsets
fn tokenize(text: &str, base: usize) -> Vec<(Token, Range<usize>)> {
    let mut lexer = Token::lexer(text);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        if let Ok(token) = result {
            let span = lexer.span();
            tokens.push((token, base + span.start..base + span.end));
        }
    }

    tokens
}

/// Fold tokens into items, consuming verbatim spans.
///
/// Delimiters and escapes between matching tick runs are verbatim
/// content, so verbatim has to be resolved before anything else.
fn resolve_verbatim(
    tokens: &[(Token, Range<usize>)],
    line_end: usize,
    sink: &dyn DiagnosticSink,
) -> Vec<Item> {
    let mut items = Vec::new();
    let mut i = 0;

    while i < tokens.len() {
        let (token, span) = &tokens[i];
        match token {
            Token::Backticks => {
                let ticks = span.len();
                let closer = tokens[i + 1..]
                    .iter()
                    .position(|(t, s)| *t == Token::Backticks && s.len() == ticks);
                match closer {
                    Some(offset) => {
                        let j = i + 1 + offset;
                        items.push(Item::Verbatim(span.end..tokens[j].1.start));
                        i = j + 1;
                    }
                    None => {
                        // Unterminated: the rest of the line is verbatim
                        sink.warn("unclosed verbatim", Some(span.start));
                        items.push(Item::Verbatim(span.end..line_end));
                        i = tokens.len();
                    }
                }
            }
            Token::Underscore => {
                items.push(Item::Delim(DelimKind::Emph, span.clone()));
                i += 1;
            }
            Token::Star => {
                items.push(Item::Delim(DelimKind::Strong, span.clone()));
                i += 1;
            }
            Token::Escaped => {
                items.push(Item::Escape(span.start..span.start + 1));
                items.push(Item::Literal(span.start + 1..span.end));
                i += 1;
            }
            Token::Backslash | Token::Text => {
                items.push(Item::Literal(span.clone()));
                i += 1;
            }
        }
    }

    items
}

/// Pair delimiters left to right.
///
/// A delimiter closes the innermost open delimiter of its own kind, but
/// only when that is the top of the stack; a pairing that would cross an
/// open span of the other kind demotes the delimiter to literal text, as
/// does running out of line with the delimiter still open.
fn pair_delimiters(items: &[Item]) -> Vec<Role> {
    let mut roles = vec![Role::Literal; items.len()];
    let mut stack: Vec<(DelimKind, usize)> = Vec::new();

    for (idx, item) in items.iter().enumerate() {
        let Item::Delim(kind, _) = item else { continue };

        if stack.last().map(|(k, _)| *k) == Some(*kind) {
            if let Some((_, open_idx)) = stack.pop() {
                roles[open_idx] = Role::Open;
                roles[idx] = Role::Close;
            }
        } else if stack.iter().all(|(k, _)| k != kind) {
            stack.push((*kind, idx));
        }
        // same kind open but not on top: stays literal, would cross
    }

    roles
}

/// Emit events in line order, merging adjacent literal text into single
/// `str` events.
fn emit(items: Vec<Item>, roles: &[Role], out: &mut VecDeque<Event>) {
    let mut pending: Option<Range<usize>> = None;

    for (idx, item) in items.into_iter().enumerate() {
        match item {
            Item::Literal(span) => extend(&mut pending, span, out),
            Item::Escape(span) => {
                flush(&mut pending, out);
                out.push_back(Event::new(Annot::Escape, span));
            }
            Item::Verbatim(span) => {
                flush(&mut pending, out);
                out.push_back(Event::new(Annot::Verbatim, span));
            }
            Item::Delim(kind, span) => match roles[idx] {
                Role::Open => {
                    flush(&mut pending, out);
                    out.push_back(Event::new(kind.start(), span));
                }
                Role::Close => {
                    flush(&mut pending, out);
                    out.push_back(Event::new(kind.end(), span));
                }
                Role::Literal => extend(&mut pending, span, out),
            },
        }
    }

    flush(&mut pending, out);
}

fn extend(pending: &mut Option<Range<usize>>, span: Range<usize>, out: &mut VecDeque<Event>) {
    match pending {
        Some(range) if range.end == span.start => range.end = span.end,
        _ => {
            flush(pending, out);
            *pending = Some(span);
        }
    }
}

fn flush(pending: &mut Option<Range<usize>>, out: &mut VecDeque<Event>) {
    if let Some(range) = pending.take() {
        if !range.is_empty() {
            out.push_back(Event::new(Annot::Str, range));
        }
    }
}
