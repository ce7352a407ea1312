//! Block-level streaming parser
//!
//! Line-oriented, single pass over the input. [`EventIter`] classifies
//! one line at a time, pushes the events it produces onto an internal
//! queue, and hands them out in order. The sequence is finite and not
//! restartable; draining it once visits every byte of the input.
//!
//! Block structure:
//! - `>` markers open and close block quotes; a line's marker count is
//!   its quote depth, there is no lazy continuation
//! - `#`{1..6} + space starts a one-line heading
//! - three or more backticks or tildes fence a code block
//! - a line of three or more `*` or `-` is a thematic break
//! - blank lines close paragraphs; everything else is paragraph text,
//!   handed to the inline parser one line at a time

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::VecDeque;

use super::diagnostics::DiagnosticSink;
use super::event::{Annot, Event};
use super::inline;

static FENCE_OPEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(`{3,}|~{3,})[ \t]*([^`\s]*)[ \t]*$").unwrap());
static THEMATIC_STARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[ \t]*(\*[ \t]*){3,}$").unwrap());
static THEMATIC_DASHES: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[ \t]*(-[ \t]*){3,}$").unwrap());

/// An open fenced code block
struct Fence {
    ch: u8,
    len: usize,
    /// Offset of the opening fence, for the unclosed-block warning
    open_start: usize,
}

/// Single-pass iterator over the parse events of one input.
///
/// Warnings raised while scanning go to the injected sink; every warning
/// is delivered before the event that follows it is handed out.
pub struct EventIter<'s, 'd> {
    input: &'s str,
    sink: &'d dyn DiagnosticSink,
    /// Start offset of the next unread line
    pos: usize,
    queue: VecDeque<Event>,
    quote_depth: usize,
    para_open: bool,
    /// End offset of the last inline content of the open paragraph
    para_end: usize,
    fence: Option<Fence>,
    done: bool,
}

impl<'s, 'd> EventIter<'s, 'd> {
    pub fn new(input: &'s str, sink: &'d dyn DiagnosticSink) -> Self {
        Self {
            input,
            sink,
            pos: 0,
            queue: VecDeque::new(),
            quote_depth: 0,
            para_open: false,
            para_end: 0,
            fence: None,
            done: false,
        }
    }

    fn push(&mut self, annot: Annot, start: usize, end: usize) {
        self.queue.push_back(Event { annot, start, end });
    }

    fn close_para(&mut self) {
        if self.para_open {
            self.push(Annot::ParaEnd, self.para_end, self.para_end);
            self.para_open = false;
        }
    }

    /// Close everything still open at end of input
    fn finish(&mut self) {
        self.close_para();
        let end = self.input.len();
        if let Some(fence) = self.fence.take() {
            self.sink
                .warn("unclosed code block", Some(fence.open_start));
            self.push(Annot::CodeBlockEnd, end, end);
        }
        while self.quote_depth > 0 {
            self.push(Annot::BlockquoteEnd, end, end);
            self.quote_depth -= 1;
        }
        self.done = true;
    }

    /// Count leading `>` markers (each optionally followed by one space),
    /// up to `max` when given. Returns the depth, the content offset and
    /// the offset of each marker.
    fn strip_markers(
        &self,
        start: usize,
        end: usize,
        max: Option<usize>,
    ) -> (usize, usize, Vec<usize>) {
        let bytes = self.input.as_bytes();
        let mut markers = Vec::new();
        let mut i = start;

        while i < end && bytes[i] == b'>' {
            if max.is_some_and(|m| markers.len() >= m) {
                break;
            }
            markers.push(i);
            i += 1;
            if i < end && bytes[i] == b' ' {
                i += 1;
            }
        }

        (markers.len(), i, markers)
    }

    /// Offsets of the line content with surrounding spaces and tabs removed
    fn trimmed(&self, start: usize, end: usize) -> (usize, usize) {
        let s = &self.input[start..end];
        let ltrimmed = s.trim_start_matches([' ', '\t']);
        let text_start = start + (s.len() - ltrimmed.len());
        let text = ltrimmed.trim_end_matches([' ', '\t']);
        (text_start, text_start + text.len())
    }

    /// Scan one line and queue the events it produces
    fn scan_line(&mut self) {
        let line_start = self.pos;
        let line_end = self.input[line_start..]
            .find('\n')
            .map(|i| line_start + i)
            .unwrap_or(self.input.len());
        let next_pos = if line_end < self.input.len() {
            line_end + 1
        } else {
            line_end
        };
        self.pos = next_pos;

        // Inside a fence, lines are code text until the closing fence or
        // until the enclosing quote dedents out from under the block.
        if self.fence.is_some() {
            let (depth, content_start, _) =
                self.strip_markers(line_start, line_end, Some(self.quote_depth));
            if depth == self.quote_depth {
                let rest = &self.input[content_start..line_end];
                let closes = self
                    .fence
                    .as_ref()
                    .is_some_and(|fence| is_fence_close(rest, fence));
                if closes {
                    self.fence = None;
                    self.push(Annot::CodeBlockEnd, content_start, line_end);
                } else {
                    self.push(Annot::CodeText, content_start, next_pos);
                }
                return;
            }
            // Quote closed underneath the open fence
            if let Some(fence) = self.fence.take() {
                self.sink
                    .warn("unclosed code block", Some(fence.open_start));
                self.push(Annot::CodeBlockEnd, line_start, line_start);
            }
        }

        let (depth, content_start, markers) = self.strip_markers(line_start, line_end, None);

        // Adjust quote depth before anything on this line
        if depth < self.quote_depth {
            self.close_para();
            while self.quote_depth > depth {
                self.push(Annot::BlockquoteEnd, line_start, line_start);
                self.quote_depth -= 1;
            }
        } else if depth > self.quote_depth {
            self.close_para();
            for level in self.quote_depth..depth {
                self.push(Annot::BlockquoteStart, markers[level], markers[level] + 1);
            }
            self.quote_depth = depth;
        }

        let rest = &self.input[content_start..line_end];

        if rest.trim().is_empty() {
            self.close_para();
            return;
        }

        if let Some((level, text_offset)) = heading_marker(rest) {
            self.close_para();
            self.push(Annot::HeadingStart, content_start, content_start + level);
            let (_, text_end) = self.trimmed(content_start + text_offset, line_end);
            inline::parse_line(
                self.input,
                content_start + text_offset..text_end,
                self.sink,
                &mut self.queue,
            );
            self.push(Annot::HeadingEnd, text_end, text_end);
            return;
        }

        if let Some((ch, len)) = fence_open(rest) {
            self.close_para();
            self.push(Annot::CodeBlockStart, content_start, line_end);
            self.fence = Some(Fence {
                ch,
                len,
                open_start: content_start,
            });
            return;
        }

        if THEMATIC_STARS.is_match(rest) || THEMATIC_DASHES.is_match(rest) {
            self.close_para();
            self.push(Annot::ThematicBreak, content_start, line_end);
            return;
        }

        // Paragraph text
        let (text_start, text_end) = self.trimmed(content_start, line_end);
        if self.para_open {
            self.push(Annot::Softbreak, line_start - 1, line_start);
        } else {
            self.push(Annot::ParaStart, text_start, text_start);
            self.para_open = true;
        }
        inline::parse_line(self.input, text_start..text_end, self.sink, &mut self.queue);
        self.para_end = text_end;
    }
}

impl<'s, 'd> Iterator for EventIter<'s, 'd> {
    type Item = Event;

    fn next(&mut self) -> Option<Event> {
        loop {
            if let Some(event) = self.queue.pop_front() {
                return Some(event);
            }
            if self.done {
                return None;
            }
            if self.pos >= self.input.len() {
                self.finish();
            } else {
                self.scan_line();
            }
        }
    }
}

/// Parse a fence opening line: the fence characters and their count
fn fence_open(rest: &str) -> Option<(u8, usize)> {
    let caps = FENCE_OPEN.captures(rest)?;
    let marker = caps.get(1).map(|m| m.as_str())?;
    Some((marker.as_bytes()[0], marker.len()))
}

/// A closing fence repeats the opening character at least as many times,
/// with nothing but trailing whitespace after it
fn is_fence_close(rest: &str, fence: &Fence) -> bool {
    let marker = rest.trim_end_matches([' ', '\t']);
    marker.len() >= fence.len && marker.bytes().all(|b| b == fence.ch)
}

/// An ATX heading marker: 1-6 `#` followed by a space. Returns the level
/// and the offset of the heading text within the line content.
fn heading_marker(rest: &str) -> Option<(usize, usize)> {
    let bytes = rest.as_bytes();
    let level = bytes.iter().take_while(|&&b| b == b'#').count();
    if level == 0 || level > 6 || bytes.get(level) != Some(&b' ') {
        return None;
    }
    let text_offset = level
        + bytes[level..]
            .iter()
            .take_while(|&&b| b == b' ')
            .count();
    Some((level, text_offset))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dotmark::diagnostics::{MemorySink, NullSink};

    fn events(input: &str) -> Vec<Event> {
        EventIter::new(input, &NullSink).collect()
    }

    fn annots(input: &str) -> Vec<Annot> {
        events(input).into_iter().map(|e| e.annot).collect()
    }

    #[test]
    fn test_empty_input_produces_no_events() {
        assert!(events("").is_empty());
    }

    #[test]
    fn test_blank_lines_produce_no_events() {
        assert!(events("\n\n  \n").is_empty());
    }

    #[test]
    fn test_single_paragraph() {
        assert_eq!(
            events("hello"),
            vec![
                Event::new(Annot::ParaStart, 0..0),
                Event::new(Annot::Str, 0..5),
                Event::new(Annot::ParaEnd, 5..5),
            ]
        );
    }

    #[test]
    fn test_paragraph_lines_join_with_softbreak() {
        assert_eq!(
            events("a\nb"),
            vec![
                Event::new(Annot::ParaStart, 0..0),
                Event::new(Annot::Str, 0..1),
                Event::new(Annot::Softbreak, 1..2),
                Event::new(Annot::Str, 2..3),
                Event::new(Annot::ParaEnd, 3..3),
            ]
        );
    }

    #[test]
    fn test_blank_line_separates_paragraphs() {
        assert_eq!(
            annots("a\n\nb"),
            vec![
                Annot::ParaStart,
                Annot::Str,
                Annot::ParaEnd,
                Annot::ParaStart,
                Annot::Str,
                Annot::ParaEnd,
            ]
        );
    }

    #[test]
    fn test_heading_marker_span_covers_hashes() {
        assert_eq!(
            events("## hi"),
            vec![
                Event::new(Annot::HeadingStart, 0..2),
                Event::new(Annot::Str, 3..5),
                Event::new(Annot::HeadingEnd, 5..5),
            ]
        );
    }

    #[test]
    fn test_heading_interrupts_paragraph() {
        assert_eq!(
            annots("text\n# head"),
            vec![
                Annot::ParaStart,
                Annot::Str,
                Annot::ParaEnd,
                Annot::HeadingStart,
                Annot::Str,
                Annot::HeadingEnd,
            ]
        );
    }

    #[test]
    fn test_seven_hashes_is_a_paragraph() {
        assert_eq!(
            annots("####### x"),
            vec![Annot::ParaStart, Annot::Str, Annot::ParaEnd]
        );
    }

    #[test]
    fn test_hash_without_space_is_a_paragraph() {
        assert_eq!(
            annots("#x"),
            vec![Annot::ParaStart, Annot::Str, Annot::ParaEnd]
        );
    }

    #[test]
    fn test_blockquote_wraps_paragraph() {
        assert_eq!(
            events("> a\n"),
            vec![
                Event::new(Annot::BlockquoteStart, 0..1),
                Event::new(Annot::ParaStart, 2..2),
                Event::new(Annot::Str, 2..3),
                Event::new(Annot::ParaEnd, 3..3),
                Event::new(Annot::BlockquoteEnd, 4..4),
            ]
        );
    }

    #[test]
    fn test_nested_blockquotes_open_and_close_in_order() {
        assert_eq!(
            annots("> a\n> > b\n> c\n"),
            vec![
                Annot::BlockquoteStart,
                Annot::ParaStart,
                Annot::Str,
                Annot::ParaEnd,
                Annot::BlockquoteStart,
                Annot::ParaStart,
                Annot::Str,
                Annot::ParaEnd,
                Annot::BlockquoteEnd,
                Annot::ParaStart,
                Annot::Str,
                Annot::ParaEnd,
                Annot::BlockquoteEnd,
            ]
        );
    }

    #[test]
    fn test_code_block_spans() {
        assert_eq!(
            events("```rust\nlet x;\n```\n"),
            vec![
                Event::new(Annot::CodeBlockStart, 0..7),
                Event::new(Annot::CodeText, 8..15),
                Event::new(Annot::CodeBlockEnd, 15..18),
            ]
        );
    }

    #[test]
    fn test_code_block_ignores_markup() {
        let input = "```\n# not a heading\n> not a quote\n```\n";
        assert_eq!(
            annots(input),
            vec![
                Annot::CodeBlockStart,
                Annot::CodeText,
                Annot::CodeText,
                Annot::CodeBlockEnd,
            ]
        );
    }

    #[test]
    fn test_closing_fence_must_be_at_least_as_long() {
        assert_eq!(
            annots("````\n```\n````\n"),
            vec![Annot::CodeBlockStart, Annot::CodeText, Annot::CodeBlockEnd]
        );
    }

    #[test]
    fn test_unclosed_code_block_warns_and_closes_at_eof() {
        let sink = MemorySink::new();
        let events: Vec<Event> = EventIter::new("```\nx\n", &sink).collect();

        assert_eq!(
            events,
            vec![
                Event::new(Annot::CodeBlockStart, 0..3),
                Event::new(Annot::CodeText, 4..6),
                Event::new(Annot::CodeBlockEnd, 6..6),
            ]
        );
        assert_eq!(
            sink.warnings(),
            vec![("unclosed code block".to_string(), Some(0))]
        );
    }

    #[test]
    fn test_quote_dedent_closes_open_fence_with_warning() {
        let sink = MemorySink::new();
        let annots: Vec<Annot> = EventIter::new("> ```\nafter\n", &sink)
            .map(|e| e.annot)
            .collect();

        assert_eq!(
            annots,
            vec![
                Annot::BlockquoteStart,
                Annot::CodeBlockStart,
                Annot::CodeBlockEnd,
                Annot::BlockquoteEnd,
                Annot::ParaStart,
                Annot::Str,
                Annot::ParaEnd,
            ]
        );
        assert_eq!(sink.warnings().len(), 1);
    }

    #[test]
    fn test_thematic_break_variants() {
        assert_eq!(annots("***\n"), vec![Annot::ThematicBreak]);
        assert_eq!(annots("- - -\n"), vec![Annot::ThematicBreak]);
        assert_eq!(
            annots("--\n"),
            vec![Annot::ParaStart, Annot::Str, Annot::ParaEnd]
        );
    }

    #[test]
    fn test_trailing_whitespace_excluded_from_paragraph() {
        assert_eq!(
            events("hi  "),
            vec![
                Event::new(Annot::ParaStart, 0..0),
                Event::new(Annot::Str, 0..2),
                Event::new(Annot::ParaEnd, 2..2),
            ]
        );
    }

    #[test]
    fn test_event_spans_are_ordered_and_bounded() {
        let input = "# Head\n\n> a _b_ `c`\n> more\n\n```txt\nbody\n```\n";
        for event in EventIter::new(input, &NullSink) {
            assert!(event.start <= event.end, "{}", event);
            assert!(event.end <= input.len(), "{}", event);
            // Slicing by any span must be valid (char boundaries)
            let _ = &input[event.span()];
        }
    }
}
