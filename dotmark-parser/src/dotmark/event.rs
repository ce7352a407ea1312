//! Parse events - the streaming output of the dotmark parser.
//!
//! Events form a flat, ordered description of a depth-first walk over
//! document structure. Containers are represented by start/end pairs
//! (`+para` ... `-para`); leaves by single events. Every event carries a
//! half-open byte span into the original input.
//!
//! A paragraph `hello` emits:
//! ```text
//! +para
//! str        "hello"
//! -para
//! ```
//!
//! A quoted heading `> # Hi` emits:
//! ```text
//! +blockquote
//! +heading
//! str        "Hi"
//! -heading
//! -blockquote
//! ```

use std::fmt;
use std::ops::Range;

/// The semantic kind of a parse event.
///
/// Container kinds come in start/end pairs; the wire form of a start is
/// prefixed `+`, an end `-`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Annot {
    // Block containers
    ParaStart,
    ParaEnd,
    HeadingStart,
    HeadingEnd,
    BlockquoteStart,
    BlockquoteEnd,
    CodeBlockStart,
    CodeBlockEnd,

    // Block leaves
    CodeText,
    ThematicBreak,

    // Inline containers
    EmphStart,
    EmphEnd,
    StrongStart,
    StrongEnd,

    // Inline leaves
    Str,
    Escape,
    Verbatim,
    Softbreak,
}

impl Annot {
    /// Wire name of this annotation, as printed in event-stream output.
    pub fn as_str(self) -> &'static str {
        match self {
            Annot::ParaStart => "+para",
            Annot::ParaEnd => "-para",
            Annot::HeadingStart => "+heading",
            Annot::HeadingEnd => "-heading",
            Annot::BlockquoteStart => "+blockquote",
            Annot::BlockquoteEnd => "-blockquote",
            Annot::CodeBlockStart => "+code_block",
            Annot::CodeBlockEnd => "-code_block",
            Annot::CodeText => "code_text",
            Annot::ThematicBreak => "thematic_break",
            Annot::EmphStart => "+emph",
            Annot::EmphEnd => "-emph",
            Annot::StrongStart => "+strong",
            Annot::StrongEnd => "-strong",
            Annot::Str => "str",
            Annot::Escape => "escape",
            Annot::Verbatim => "verbatim",
            Annot::Softbreak => "softbreak",
        }
    }

    /// Check if this annotation opens a container
    pub fn is_start(self) -> bool {
        matches!(
            self,
            Annot::ParaStart
                | Annot::HeadingStart
                | Annot::BlockquoteStart
                | Annot::CodeBlockStart
                | Annot::EmphStart
                | Annot::StrongStart
        )
    }

    /// Check if this annotation closes a container
    pub fn is_end(self) -> bool {
        matches!(
            self,
            Annot::ParaEnd
                | Annot::HeadingEnd
                | Annot::BlockquoteEnd
                | Annot::CodeBlockEnd
                | Annot::EmphEnd
                | Annot::StrongEnd
        )
    }

    /// The closing annotation paired with this start, if any
    pub fn matching_end(self) -> Option<Annot> {
        match self {
            Annot::ParaStart => Some(Annot::ParaEnd),
            Annot::HeadingStart => Some(Annot::HeadingEnd),
            Annot::BlockquoteStart => Some(Annot::BlockquoteEnd),
            Annot::CodeBlockStart => Some(Annot::CodeBlockEnd),
            Annot::EmphStart => Some(Annot::EmphEnd),
            Annot::StrongStart => Some(Annot::StrongEnd),
            _ => None,
        }
    }
}

impl fmt::Display for Annot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single parse event: an annotation plus its byte span.
///
/// `start <= end` always holds; both offsets land on character
/// boundaries of the input. Structural markers (for example `-para`)
/// may carry a zero-width span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    pub annot: Annot,
    pub start: usize,
    pub end: usize,
}

impl Event {
    pub fn new(annot: Annot, span: Range<usize>) -> Self {
        Self {
            annot,
            start: span.start,
            end: span.end,
        }
    }

    /// The byte span of this event
    pub fn span(&self) -> Range<usize> {
        self.start..self.end
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}..{}", self.annot, self.start, self.end)
    }
}
