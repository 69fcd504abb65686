//! ledit - Main Entry Point
//!
//! A line-addressed text editor driven by a compact command stream on
//! standard input: `CHANGE`, `DELETE`, `PRINT`, `UNDO`, `REDO`, `QUIT`.
//!
//! # Usage
//! ```bash
//! ledit < commands.txt
//! ledit --debug --history-limit 500 < commands.txt
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use ledit_core::dispatcher::Dispatcher;
use ledit_core::protocol::{CommandSource, OutputSink};
use std::io::{BufRead, BufReader, Stdin, Stdout, Write};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// ledit CLI arguments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Log file path
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// Maximum number of undo groups retained (unlimited if unset)
    #[arg(long, value_name = "N")]
    history_limit: Option<usize>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    setup_logging(&args)?;

    info!("Starting ledit v{}", env!("CARGO_PKG_VERSION"));

    let source = StdinSource::new();
    let sink = StdoutSink::new();

    let mut dispatcher = match args.history_limit {
        Some(limit) => Dispatcher::with_history_limit(source, sink, limit),
        None => Dispatcher::new(source, sink),
    };

    dispatcher
        .run()
        .context("fatal error while dispatching the command stream")?;

    info!("ledit shutdown complete");
    Ok(())
}

/// Setup logging based on CLI arguments, matching the console/file-appender
/// split used throughout the rest of this workspace.
fn setup_logging(args: &Args) -> Result<()> {
    let log_level = if args.debug {
        Level::DEBUG
    } else if args.verbose {
        Level::INFO
    } else {
        Level::WARN
    };

    let filter = EnvFilter::from_default_env()
        .add_directive(log_level.into())
        .add_directive("ledit=trace".parse()?);

    let subscriber = tracing_subscriber::registry().with(filter);

    // stdout is the protocol's output channel; all diagnostics go to stderr.
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true);

    if let Some(log_path) = &args.log_file {
        let file_appender = tracing_appender::rolling::daily(
            log_path.parent().unwrap_or(std::path::Path::new(".")),
            log_path
                .file_name()
                .unwrap_or(std::ffi::OsStr::new("ledit.log")),
        );
        let file_layer = fmt::layer().json().with_writer(file_appender);

        subscriber.with(fmt_layer).with(file_layer).init();
    } else {
        subscriber.with(fmt_layer).init();
    }

    Ok(())
}

/// Reads the command stream from process stdin, one line at a time.
struct StdinSource {
    reader: BufReader<Stdin>,
}

impl StdinSource {
    fn new() -> Self {
        Self {
            reader: BufReader::new(std::io::stdin()),
        }
    }

    fn read_line(&mut self) -> ledit_core::error::Result<Option<String>> {
        let mut buf = String::new();
        let n = self.reader.read_line(&mut buf)?;
        if n == 0 {
            return Ok(None);
        }
        while buf.ends_with('\n') || buf.ends_with('\r') {
            buf.pop();
        }
        Ok(Some(buf))
    }
}

impl CommandSource for StdinSource {
    fn next_header_line(&mut self) -> ledit_core::error::Result<Option<String>> {
        self.read_line()
    }

    fn next_payload_line(&mut self) -> ledit_core::error::Result<String> {
        self.read_line()?
            .ok_or(ledit_core::error::EditorError::UnexpectedEof)
    }
}

/// Writes PRINT output to process stdout.
struct StdoutSink {
    writer: Stdout,
}

impl StdoutSink {
    fn new() -> Self {
        Self {
            writer: std::io::stdout(),
        }
    }
}

impl OutputSink for StdoutSink {
    fn write_line(&mut self, line: &str) -> ledit_core::error::Result<()> {
        self.writer.write_all(line.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parse_defaults() {
        let args = Args::parse_from(["ledit"]);
        assert!(!args.debug);
        assert!(!args.verbose);
        assert!(args.log_file.is_none());
        assert!(args.history_limit.is_none());
    }

    #[test]
    fn test_args_parse_flags() {
        let args = Args::parse_from(["ledit", "--debug", "--history-limit", "100"]);
        assert!(args.debug);
        assert_eq!(args.history_limit, Some(100));
    }
}
