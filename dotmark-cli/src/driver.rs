//! Dual-mode output driver
//!
//! Given a frozen [`Config`] and the full input text, runs the parser in
//! one of two modes and serializes the result to one output stream:
//!
//! - event mode prints the raw event sequence as a bracketed list of
//!   `["annot", start, end]` lines, emitted while the stream is drained
//! - tree mode prints the whole document as pretty JSON
//!
//! The returned value is the process exit status. Parse failures are
//! reported on the output stream itself, not on stderr; warnings and the
//! optional timing line go to stderr.

use std::io::{self, Write};
use std::time::Instant;

use dotmark_parser::dotmark::{parse, DiagnosticSink, EventIter, ParseOpts};

/// Which output the driver produces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Tree,
    Events,
}

/// Frozen per-invocation configuration.
///
/// Built once from the command line before any input is read; never
/// mutated afterwards.
pub struct Config {
    pub mode: Mode,
    /// Attach source positions when a library consumer asks for them.
    /// Tree output always carries positions, independent of this flag.
    #[allow(dead_code)]
    pub source_positions: bool,
    pub timing: bool,
    pub sink: Box<dyn DiagnosticSink>,
}

/// Run one invocation and return its exit status
pub fn run(config: &Config, input: &str, out: &mut dyn Write) -> i32 {
    let result = match config.mode {
        Mode::Events => run_events(config, input, out),
        Mode::Tree => run_tree(config, input, out),
    };
    match result {
        Ok(status) => status,
        Err(err) => {
            eprintln!("dotmark: {}", err);
            1
        }
    }
}

/// Drain the event stream, printing one list entry per line.
///
/// The opening bracket rides on the first entry's line; every later
/// entry is prefixed with a comma; the closing bracket gets a line of
/// its own. Zero events still produce `[` and `]` so the output stays a
/// well-formed list.
fn run_events(config: &Config, input: &str, out: &mut dyn Write) -> io::Result<i32> {
    let mut first = true;

    for event in EventIter::new(input, config.sink.as_ref()) {
        let prefix = if first { '[' } else { ',' };
        first = false;
        writeln!(
            out,
            "{}[\"{}\",{},{}]",
            prefix, event.annot, event.start, event.end
        )?;
    }

    if first {
        writeln!(out, "[")?;
    }
    writeln!(out, "]")?;
    Ok(0)
}

fn run_tree(config: &Config, input: &str, out: &mut dyn Write) -> io::Result<i32> {
    // Positions are always wanted for tree output
    let opts = ParseOpts {
        source_positions: true,
    };

    let started = Instant::now();
    let parsed = parse(input, opts, config.sink.as_ref());
    let elapsed = started.elapsed();

    match parsed {
        Ok(doc) => {
            let json = serde_json::to_string_pretty(&doc).map_err(io::Error::other)?;
            writeln!(out, "{}", json)?;
            if config.timing {
                eprintln!("Parse time = {:.2} ms", elapsed.as_secs_f64() * 1000.0);
            }
            Ok(0)
        }
        Err(err) => {
            writeln!(out, "{}", err)?;
            if !err.trace().is_empty() {
                let trace = serde_json::to_string_pretty(err.trace()).map_err(io::Error::other)?;
                writeln!(out, "{}", trace)?;
            }
            Ok(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dotmark_parser::dotmark::NullSink;

    fn config(mode: Mode) -> Config {
        Config {
            mode,
            source_positions: false,
            timing: false,
            sink: Box::new(NullSink),
        }
    }

    fn run_to_string(mode: Mode, input: &str) -> (i32, String) {
        let mut out = Vec::new();
        let status = run(&config(mode), input, &mut out);
        (status, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_event_mode_empty_input_emits_empty_list() {
        let (status, output) = run_to_string(Mode::Events, "");
        assert_eq!(status, 0);
        assert_eq!(output, "[\n]\n");
    }

    #[test]
    fn test_event_mode_lines_form_a_list() {
        let (status, output) = run_to_string(Mode::Events, "hi");
        assert_eq!(status, 0);
        assert_eq!(
            output,
            "[[\"+para\",0,0]\n,[\"str\",0,2]\n,[\"-para\",2,2]\n]\n"
        );
    }

    #[test]
    fn test_event_mode_output_parses_as_json() {
        let (_, output) = run_to_string(Mode::Events, "# a\n\n> b\n");
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        let entries = value.as_array().unwrap();
        assert!(!entries.is_empty());
        for entry in entries {
            let entry = entry.as_array().unwrap();
            assert_eq!(entry.len(), 3);
            assert!(entry[0].is_string());
            assert!(entry[1].as_u64().unwrap() <= entry[2].as_u64().unwrap());
        }
    }

    #[test]
    fn test_tree_mode_prints_json_with_trailing_newline() {
        let (status, output) = run_to_string(Mode::Tree, "hi");
        assert_eq!(status, 0);
        assert!(output.ends_with("}\n"));

        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["tag"], "doc");
        // Tree output always carries positions
        assert!(value["children"][0]["pos"].is_object());
    }

    #[test]
    fn test_tree_mode_uses_two_space_indent() {
        let (_, output) = run_to_string(Mode::Tree, "hi");
        assert!(output.contains("\n  \"children\": ["));
    }

    #[test]
    fn test_parse_failure_reports_on_the_output_stream() {
        let input = format!("{}x", "> ".repeat(300));
        let (status, output) = run_to_string(Mode::Tree, &input);

        assert_eq!(status, 1);
        assert!(output.contains("nested deeper"));
        // The trace follows as a JSON list of source lines
        assert!(output.contains(">>"));
    }
}
