use std::{
    fs::File,
    io::{self, BufRead, BufReader, Write},
    path::{Path, PathBuf},
    process::ExitCode,
};

use anyhow::Context;
use clap::Parser;
use lgrep_matcher::matcher::LineMatcher;

/// Print lines matching a pattern.
///
/// A leading `^` anchors the pattern at the start of the line and a
/// trailing `$` at its end; otherwise the pattern may occur anywhere on the
/// line. Files are read as raw bytes, one line at a time.
#[derive(Debug, Parser)]
#[command(name = "lgrep", version, about)]
struct Args {
    /// The pattern to search for.
    pattern: String,

    /// The files to search.
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Select only matches that cover the whole line.
    #[arg(short = 'x', long)]
    line_regexp: bool,

    /// Prefix each printed line with its 1-based line number.
    #[arg(short = 'n', long)]
    line_number: bool,

    /// Select the lines that do not match.
    #[arg(short = 'v', long)]
    invert_match: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let matcher = match LineMatcher::builder(&args.pattern)
        .whole_line(args.line_regexp)
        .build()
    {
        Ok(matcher) => matcher,
        Err(err) => {
            eprintln!("lgrep: {}: {err}", args.pattern);
            return ExitCode::from(2);
        }
    };

    let show_name = args.files.len() > 1;
    let mut matched_any = false;
    let mut failed = false;
    for path in &args.files {
        // An unreadable file is reported and skipped; the rest of the
        // files are still searched.
        match search(&matcher, path, show_name, &args) {
            Ok(matched) => matched_any |= matched,
            Err(err) => {
                eprintln!("lgrep: {err:#}");
                failed = true;
            }
        }
    }

    if failed {
        ExitCode::from(2)
    } else if matched_any {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    }
}

/// Streams one file, printing its selected lines. Returns whether any line
/// was selected.
fn search(matcher: &LineMatcher, path: &Path, show_name: bool, args: &Args) -> anyhow::Result<bool> {
    let file = File::open(path).with_context(|| path.display().to_string())?;
    let mut reader = BufReader::new(file);

    let stdout = io::stdout();
    let mut out = stdout.lock();

    let mut matched = false;
    let mut line = Vec::new();
    for number in 1.. {
        line.clear();
        let read = reader
            .read_until(b'\n', &mut line)
            .with_context(|| path.display().to_string())?;
        if read == 0 {
            break;
        }
        if line.last() == Some(&b'\n') {
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
        }

        if matcher.is_match(&line) != args.invert_match {
            matched = true;
            if show_name {
                write!(out, "{}:", path.display())?;
            }
            if args.line_number {
                write!(out, "{number}:")?;
            }
            out.write_all(&line)?;
            out.write_all(b"\n")?;
        }
    }
    Ok(matched)
}
