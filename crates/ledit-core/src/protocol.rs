//! Wire Protocol
//!
//! Parses the command grammar of spec §6 (`<int>,<int><cmd>\n`) and defines
//! the `CommandSource`/`OutputSink` seam that isolates the dispatcher from
//! concrete stdin/stdout. This keeps the dispatcher's coalescing logic
//! independently testable against in-memory fixtures, mirroring the
//! teacher's separation of a `Command` trait from its I/O-bound executor.

use crate::error::{EditorError, Result};

/// One command read off the wire, still carrying its raw `(a, b)` operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandHeader {
    pub a: i64,
    pub b: i64,
    pub kind: Kind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Change,
    Delete,
    Print,
    Undo,
    Redo,
    Quit,
}

/// Parses one header line of the form `<int>,<int><cmd>`, tolerating
/// surrounding whitespace (the grammar is "whitespace-insensitive at the
/// command line level").
pub fn parse_header(line: &str) -> Result<CommandHeader> {
    let trimmed = line.trim();
    let cmd_char = trimmed
        .chars()
        .last()
        .ok_or_else(|| EditorError::MalformedCommand(line.to_string()))?;
    let kind = match cmd_char {
        'c' => Kind::Change,
        'd' => Kind::Delete,
        'p' => Kind::Print,
        'u' => Kind::Undo,
        'r' => Kind::Redo,
        'q' => Kind::Quit,
        _ => return Err(EditorError::MalformedCommand(line.to_string())),
    };
    let nums = trimmed[..trimmed.len() - cmd_char.len_utf8()].trim();
    let mut parts = nums.splitn(2, ',');
    let a_str = parts
        .next()
        .ok_or_else(|| EditorError::MalformedCommand(line.to_string()))?;
    let b_str = parts
        .next()
        .ok_or_else(|| EditorError::MalformedCommand(line.to_string()))?;
    let a: i64 = a_str
        .trim()
        .parse()
        .map_err(|_| EditorError::MalformedCommand(line.to_string()))?;
    let b: i64 = b_str
        .trim()
        .parse()
        .map_err(|_| EditorError::MalformedCommand(line.to_string()))?;
    Ok(CommandHeader { a, b, kind })
}

/// Source of command-stream lines. Implementations decide how raw bytes
/// become `String`s (the core never sees a `Read` directly).
pub trait CommandSource {
    /// Reads the next non-payload line (a command header), with its
    /// trailing newline stripped. Returns `Ok(None)` at end of stream.
    fn next_header_line(&mut self) -> Result<Option<String>>;

    /// Reads one payload line belonging to a CHANGE command, with its
    /// trailing newline stripped.
    fn next_payload_line(&mut self) -> Result<String>;
}

/// Sink for PRINT output. Implementations decide how strings reach the
/// outside world.
pub trait OutputSink {
    /// Writes one already-formatted output line, including its trailing
    /// newline.
    fn write_line(&mut self, line: &str) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_change() {
        let h = parse_header("1,3c").unwrap();
        assert_eq!(h, CommandHeader { a: 1, b: 3, kind: Kind::Change });
    }

    #[test]
    fn test_parse_whitespace_insensitive() {
        let h = parse_header("  2 , 3  d  \n").unwrap();
        assert_eq!(h, CommandHeader { a: 2, b: 3, kind: Kind::Delete });
    }

    #[test]
    fn test_parse_quit() {
        let h = parse_header("0,0q").unwrap();
        assert_eq!(h.kind, Kind::Quit);
    }

    #[test]
    fn test_parse_malformed() {
        assert!(parse_header("garbage").is_err());
        assert!(parse_header("1,x c").is_err());
        assert!(parse_header("").is_err());
    }
}
