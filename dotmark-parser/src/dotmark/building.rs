//! Whole-document parsing
//!
//! Folds the event stream of [`EventIter`] into a [`Doc`]. Start events
//! push a frame, end events pop it and attach the finished node to its
//! parent. The only fatal condition is structural nesting beyond
//! [`MAX_NESTING`]; everything else parses, possibly with warnings.

use std::fmt;
use std::ops::Range;

use super::ast::{Doc, Node};
use super::block::EventIter;
use super::diagnostics::DiagnosticSink;
use super::event::{Annot, Event};
use super::range::{Pos, SourceLocation};

/// Maximum structural nesting depth of a document
pub const MAX_NESTING: usize = 128;

/// Options for whole-document parsing
#[derive(Debug, Clone, Copy, Default)]
pub struct ParseOpts {
    /// Attach source positions to every node
    pub source_positions: bool,
}

/// Fatal parse failure
#[derive(Debug, Clone)]
pub enum ParseError {
    /// Document structure nested beyond [`MAX_NESTING`]
    NestingTooDeep { offset: usize, trace: Vec<String> },
}

impl ParseError {
    /// Source context around the failure, one line per entry
    pub fn trace(&self) -> &[String] {
        match self {
            ParseError::NestingTooDeep { trace, .. } => trace,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::NestingTooDeep { offset, .. } => {
                write!(
                    f,
                    "structure nested deeper than {} levels at offset {}",
                    MAX_NESTING, offset
                )
            }
        }
    }
}

impl std::error::Error for ParseError {}

/// Format source lines around an error offset
///
/// Shows 2 lines before the error, the error line with a >> marker, and
/// 2 lines after. All lines are numbered for easy reference.
fn source_context(source: &str, offset: usize) -> Vec<String> {
    let loc = SourceLocation::new(source);
    let error_line = loc.position(offset.min(source.len())).line - 1;

    let lines: Vec<&str> = source.lines().collect();
    let first = error_line.saturating_sub(2);
    let last = (error_line + 3).min(lines.len());

    (first..last)
        .map(|line_num| {
            let marker = if line_num == error_line { ">>" } else { "  " };
            format!("{} {:3} | {}", marker, line_num + 1, lines[line_num])
        })
        .collect()
}

/// An open container while folding events into nodes
struct Frame {
    kind: FrameKind,
    start: usize,
    children: Vec<Node>,
}

enum FrameKind {
    Para,
    Heading { level: u8 },
    Quote,
    Emph,
    Strong,
    Code { lang: Option<String>, text: String },
}

impl Frame {
    fn into_node(self, pos: Option<Pos>) -> Node {
        match self.kind {
            FrameKind::Para => Node::Para {
                children: self.children,
                pos,
            },
            FrameKind::Heading { level } => Node::Heading {
                level,
                children: self.children,
                pos,
            },
            FrameKind::Quote => Node::BlockQuote {
                children: self.children,
                pos,
            },
            FrameKind::Emph => Node::Emph {
                children: self.children,
                pos,
            },
            FrameKind::Strong => Node::Strong {
                children: self.children,
                pos,
            },
            FrameKind::Code { lang, text } => Node::CodeBlock { lang, text, pos },
        }
    }
}

fn attach(stack: &mut [Frame], root: &mut Vec<Node>, node: Node) {
    match stack.last_mut() {
        Some(frame) => frame.children.push(node),
        None => root.push(node),
    }
}

/// The info string of a fence opening line, if any
fn info_string(fence_line: &str) -> Option<String> {
    let info = fence_line.trim_start_matches(['`', '~']).trim();
    (!info.is_empty()).then(|| info.to_string())
}

/// Parse a complete document.
///
/// Drains the event stream once; every warning the parse raises is
/// delivered to `sink` before this function returns.
pub fn parse(input: &str, opts: ParseOpts, sink: &dyn DiagnosticSink) -> Result<Doc, ParseError> {
    let loc = opts.source_positions.then(|| SourceLocation::new(input));
    let pos_of = |span: Range<usize>| loc.as_ref().map(|l| l.span_to_pos(span));

    let mut root: Vec<Node> = Vec::new();
    let mut stack: Vec<Frame> = Vec::new();

    for event in EventIter::new(input, sink) {
        let Event { annot, start, end } = event;
        match annot {
            Annot::ParaStart
            | Annot::HeadingStart
            | Annot::BlockquoteStart
            | Annot::CodeBlockStart
            | Annot::EmphStart
            | Annot::StrongStart => {
                if stack.len() >= MAX_NESTING {
                    return Err(ParseError::NestingTooDeep {
                        offset: start,
                        trace: source_context(input, start),
                    });
                }
                let kind = match annot {
                    Annot::HeadingStart => FrameKind::Heading {
                        level: (end - start) as u8,
                    },
                    Annot::BlockquoteStart => FrameKind::Quote,
                    Annot::CodeBlockStart => FrameKind::Code {
                        lang: info_string(&input[start..end]),
                        text: String::new(),
                    },
                    Annot::EmphStart => FrameKind::Emph,
                    Annot::StrongStart => FrameKind::Strong,
                    _ => FrameKind::Para,
                };
                stack.push(Frame {
                    kind,
                    start,
                    children: Vec::new(),
                });
            }

            Annot::ParaEnd
            | Annot::HeadingEnd
            | Annot::BlockquoteEnd
            | Annot::CodeBlockEnd
            | Annot::EmphEnd
            | Annot::StrongEnd => {
                // Start/end events are always balanced in a drained stream
                if let Some(frame) = stack.pop() {
                    let pos = pos_of(frame.start..end);
                    let node = frame.into_node(pos);
                    attach(&mut stack, &mut root, node);
                }
            }

            Annot::CodeText => {
                if let Some(Frame {
                    kind: FrameKind::Code { text, .. },
                    ..
                }) = stack.last_mut()
                {
                    text.push_str(&input[start..end]);
                }
            }

            Annot::Str => {
                let node = Node::Str {
                    text: input[start..end].to_string(),
                    pos: pos_of(start..end),
                };
                attach(&mut stack, &mut root, node);
            }

            Annot::Verbatim => {
                let node = Node::Verbatim {
                    text: input[start..end].to_string(),
                    pos: pos_of(start..end),
                };
                attach(&mut stack, &mut root, node);
            }

            Annot::Softbreak => {
                let node = Node::SoftBreak {
                    pos: pos_of(start..end),
                };
                attach(&mut stack, &mut root, node);
            }

            Annot::ThematicBreak => {
                let node = Node::ThematicBreak {
                    pos: pos_of(start..end),
                };
                attach(&mut stack, &mut root, node);
            }

            // The escaped character follows as its own str event
            Annot::Escape => {}
        }
    }

    let pos = pos_of(0..input.len());
    Ok(Doc::new(root, pos))
}
