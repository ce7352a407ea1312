//! Command-line interface for dotmark
//!
//! Reads the named files (or stdin), concatenates them into one input,
//! and prints either the document tree as JSON or the raw event stream.
//!
//! Usage:
//!   dotmark [OPTIONS] [FILE]...

use clap::{Arg, ArgAction, Command};
use std::fs;
use std::io::{self, Read};
use std::process;

use dotmark_parser::dotmark::{DiagnosticSink, NullSink, StderrSink};

mod driver;
use driver::{Config, Mode};

fn main() {
    let command = Command::new("dotmark")
        .about("Parse dotmark documents to a JSON syntax tree or an event stream")
        .arg(
            Arg::new("sourcepos")
                .long("sourcepos")
                .short('p')
                .help("Include source positions")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("quiet")
                .long("quiet")
                .short('q')
                .help("Suppress warnings")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("time")
                .long("time")
                .short('t')
                .help("Print parse time to stderr")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("events")
                .long("events")
                .short('e')
                .help("Print events instead of the syntax tree")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("files")
                .value_name("FILE")
                .num_args(0..)
                .help("Input files, concatenated in order; stdin when omitted"),
        );

    let matches = match command.try_get_matches() {
        Ok(matches) => matches,
        Err(err) => {
            // --help goes to stdout and is not a failure; anything else
            // (unknown option, bad value) goes to stderr and exits 1
            let status = if err.use_stderr() { 1 } else { 0 };
            let _ = err.print();
            process::exit(status);
        }
    };

    let sink: Box<dyn DiagnosticSink> = if matches.get_flag("quiet") {
        Box::new(NullSink)
    } else {
        Box::new(StderrSink)
    };
    let config = Config {
        mode: if matches.get_flag("events") {
            Mode::Events
        } else {
            Mode::Tree
        },
        source_positions: matches.get_flag("sourcepos"),
        timing: matches.get_flag("time"),
        sink,
    };

    let files: Vec<String> = matches
        .get_many::<String>("files")
        .map(|values| values.cloned().collect())
        .unwrap_or_default();

    let input = read_input(&files).unwrap_or_else(|err| {
        eprintln!("dotmark: {}", err);
        process::exit(1);
    });

    let mut stdout = io::stdout().lock();
    process::exit(driver::run(&config, &input, &mut stdout));
}

/// Concatenate the contents of every named file, in argument order;
/// read stdin when no file is named
fn read_input(files: &[String]) -> io::Result<String> {
    if files.is_empty() {
        let mut input = String::new();
        io::stdin().read_to_string(&mut input)?;
        return Ok(input);
    }

    let mut input = String::new();
    for path in files {
        let contents = fs::read_to_string(path)
            .map_err(|err| io::Error::new(err.kind(), format!("{}: {}", path, err)))?;
        input.push_str(&contents);
    }
    Ok(input)
}
