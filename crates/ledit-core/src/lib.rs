//! ledit-core - Line Editor Core
//!
//! This crate contains the core logic of the line-addressed editor:
//! - an indexed line store (`store`), keyed by 1-based line index;
//! - a dual-stack undo/redo history (`history`), grouped by command;
//! - a dispatcher (`dispatcher`) translating parsed commands into store
//!   mutations plus inverse history records, with UNDO/REDO coalescing;
//! - a thin wire protocol (`protocol`) decoupling the dispatcher from
//!   concrete stdin/stdout.
//!
//! # Architecture
//!
//! ```text
//! Dispatcher
//!   ├── LineStore   (arena-backed red-black tree, keyed by line index)
//!   ├── History     (undo/redo stacks of grouped primitive records)
//!   └── CommandSource / OutputSink (I/O seam, implemented by the binary)
//! ```
//!
//! # Example
//!
//! ```no_run
//! use ledit_core::dispatcher::Dispatcher;
//! use ledit_core::protocol::{CommandSource, OutputSink};
//! use ledit_core::error::Result;
//!
//! struct Stdio;
//! # impl CommandSource for Stdio {
//! #     fn next_header_line(&mut self) -> Result<Option<String>> { Ok(None) }
//! #     fn next_payload_line(&mut self) -> Result<String> { unimplemented!() }
//! # }
//! # impl OutputSink for Stdio {
//! #     fn write_line(&mut self, _line: &str) -> Result<()> { Ok(()) }
//! # }
//!
//! # fn example() -> Result<()> {
//! let mut dispatcher = Dispatcher::new(Stdio, Stdio);
//! dispatcher.run()
//! # }
//! ```

pub mod dispatcher;
pub mod error;
pub mod history;
pub mod protocol;
pub mod store;

pub use dispatcher::Dispatcher;
pub use error::{EditorError, Result};
pub use history::{GroupId, History, HistoryRecord};
pub use protocol::{CommandHeader, CommandSource, Kind, OutputSink};
pub use store::LineStore;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_structure() {
        let _store = LineStore::new();
        let _history = History::new();
    }
}
