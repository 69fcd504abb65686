//! Shared test doubles for the `protocol` seam: an in-memory command source
//! and output sink, so integration/property tests drive a `Dispatcher`
//! without touching real stdin/stdout.

use ledit_core::error::{EditorError, Result};
use ledit_core::protocol::{CommandSource, OutputSink};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

pub struct VecSource {
    lines: VecDeque<String>,
}

impl VecSource {
    pub fn new<S: Into<String>>(lines: impl IntoIterator<Item = S>) -> Self {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }
}

impl CommandSource for VecSource {
    fn next_header_line(&mut self) -> Result<Option<String>> {
        Ok(self.lines.pop_front())
    }

    fn next_payload_line(&mut self) -> Result<String> {
        self.lines.pop_front().ok_or(EditorError::UnexpectedEof)
    }
}

/// An `OutputSink` that appends to a handle the test keeps after the
/// `Dispatcher` has taken ownership of the sink itself.
#[derive(Clone, Default)]
pub struct VecSink {
    out: Rc<RefCell<Vec<String>>>,
}

impl VecSink {
    pub fn handle(&self) -> Rc<RefCell<Vec<String>>> {
        self.out.clone()
    }
}

impl OutputSink for VecSink {
    fn write_line(&mut self, line: &str) -> Result<()> {
        self.out.borrow_mut().push(line.to_string());
        Ok(())
    }
}

/// Runs a full command script through a fresh `Dispatcher` and returns every
/// line written to the output sink, in order.
pub fn run<S: Into<String>>(lines: impl IntoIterator<Item = S>) -> Vec<String> {
    let source = VecSource::new(lines);
    let sink = VecSink::default();
    let handle = sink.handle();
    let mut dispatcher = ledit_core::Dispatcher::new(source, sink);
    dispatcher.run().unwrap();
    handle.borrow().clone()
}
