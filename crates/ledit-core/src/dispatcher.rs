//! Command Dispatcher
//!
//! Translates parsed commands into Line Store primitives while recording
//! their inverses in the History, and runs the UNDO/REDO coalescing pass
//! that folds a contiguous run of undo/redo requests into one signed
//! displacement before touching the store.

use crate::error::Result;
use crate::history::{History, HistoryRecord};
use crate::protocol::{parse_header, CommandHeader, CommandSource, Kind, OutputSink};
use crate::store::LineStore;

pub struct Dispatcher<S, O> {
    store: LineStore,
    history: History,
    source: S,
    sink: O,
}

impl<S: CommandSource, O: OutputSink> Dispatcher<S, O> {
    pub fn new(source: S, sink: O) -> Self {
        Self {
            store: LineStore::new(),
            history: History::new(),
            source,
            sink,
        }
    }

    pub fn with_history_limit(source: S, sink: O, limit: usize) -> Self {
        Self {
            store: LineStore::new(),
            history: History::with_group_limit(limit),
            source,
            sink,
        }
    }

    #[cfg(test)]
    pub(crate) fn store(&self) -> &LineStore {
        &self.store
    }

    /// Runs the dispatch loop to completion (QUIT or end of input).
    pub fn run(&mut self) -> Result<()> {
        let mut pending: Option<CommandHeader> = None;
        loop {
            let header = match pending.take() {
                Some(h) => h,
                None => match self.source.next_header_line()? {
                    None => break,
                    Some(line) => parse_header(&line)?,
                },
            };

            match header.kind {
                Kind::Undo | Kind::Redo => {
                    let (delta, next) = self.coalesce(header)?;
                    tracing::debug!(delta, "coalesced undo/redo run");
                    self.apply_delta(delta);
                    match next {
                        Some(h) => pending = Some(h),
                        None => break,
                    }
                }
                Kind::Change => {
                    tracing::debug!(a = header.a, b = header.b, "CHANGE");
                    self.do_change(header.a, header.b)?;
                }
                Kind::Delete => {
                    tracing::debug!(a = header.a, b = header.b, "DELETE");
                    self.do_delete(header.a, header.b)?;
                }
                Kind::Print => {
                    tracing::debug!(a = header.a, b = header.b, "PRINT");
                    self.do_print(header.a, header.b)?;
                }
                Kind::Quit => {
                    tracing::debug!("QUIT");
                    break;
                }
            }
        }
        Ok(())
    }

    /// Accumulates a signed displacement across a contiguous run of
    /// UNDO/REDO headers, returning it together with the first
    /// non-UNDO/REDO header that ended the run (or `None` at EOF).
    fn coalesce(&mut self, first: CommandHeader) -> Result<(i64, Option<CommandHeader>)> {
        let mut delta: i64 = 0;
        let mut u = self.history.undo_len() as i64;
        let mut r = self.history.redo_len() as i64;
        let mut current = first;
        loop {
            match current.kind {
                Kind::Undo => {
                    let x = current.a.clamp(0, u);
                    delta += x;
                    u -= x;
                    r += x;
                }
                Kind::Redo => {
                    let x = current.a.clamp(0, r);
                    delta -= x;
                    r -= x;
                    u += x;
                }
                _ => return Ok((delta, Some(current))),
            }
            match self.source.next_header_line()? {
                None => return Ok((delta, None)),
                Some(line) => current = parse_header(&line)?,
            }
        }
    }

    fn apply_delta(&mut self, delta: i64) {
        if delta > 0 {
            for _ in 0..delta {
                self.undo_one();
            }
        } else {
            for _ in 0..(-delta) {
                self.redo_one();
            }
        }
    }

    fn undo_one(&mut self) {
        if let Some(records) = self.history.pop_undo() {
            for record in records {
                self.apply_undo_record(record);
            }
        }
    }

    fn redo_one(&mut self) {
        if let Some(records) = self.history.pop_redo() {
            for record in records {
                self.apply_redo_record(record);
            }
        }
    }

    fn apply_undo_record(&mut self, record: HistoryRecord) {
        match record {
            HistoryRecord::Overwrite { key, payload } => {
                self.store.upsert(key, payload);
            }
            HistoryRecord::Remove { key, .. } => {
                self.store.remove(key);
            }
            HistoryRecord::Shift { lo, hi } => self.store.shift_up(lo, hi),
            HistoryRecord::Sentinel => {}
        }
    }

    fn apply_redo_record(&mut self, record: HistoryRecord) {
        match record {
            HistoryRecord::Overwrite { key, .. } => {
                self.store.remove(key);
            }
            HistoryRecord::Remove { key, payload } => {
                self.store.upsert(key, payload);
            }
            HistoryRecord::Shift { lo, hi } => self.store.shift_down(lo, hi),
            HistoryRecord::Sentinel => {}
        }
    }

    fn do_change(&mut self, a: i64, b: i64) -> Result<()> {
        let gid = self.history.alloc_group_id();
        let mut records = Vec::new();
        for k in a..=b {
            let key = k as usize;
            let payload: Box<str> = self.source.next_payload_line()?.into();
            match self.store.upsert(key, payload.clone()) {
                Some(old) => {
                    records.push(HistoryRecord::Overwrite { key, payload: old });
                    records.push(HistoryRecord::Remove { key, payload });
                }
                None => {
                    records.push(HistoryRecord::Remove { key, payload });
                }
            }
        }
        self.history.push_group(gid, records);
        Ok(())
    }

    fn do_delete(&mut self, a: i64, b: i64) -> Result<()> {
        let gid = self.history.alloc_group_id();
        let n0 = self.store.size() as i64;
        let mut records = Vec::new();
        for k in a..=b {
            if k < 1 || k > n0 {
                records.push(HistoryRecord::Sentinel);
                continue;
            }
            let key = k as usize;
            match self.store.remove(key) {
                Some(old) => records.push(HistoryRecord::Overwrite { key, payload: old }),
                None => records.push(HistoryRecord::Sentinel),
            }
        }
        if a >= 1 && b < n0 {
            let lo = a as usize;
            let hi = b as usize;
            self.store.shift_down(lo, hi);
            records.push(HistoryRecord::Shift { lo, hi });
        }
        self.history.push_group(gid, records);
        Ok(())
    }

    /// Clamps `[a, b]` to the live key range and runs a single `scan` over
    /// the in-range portion, padding out-of-range indices with `.` lines
    /// rather than doing one `lookup` per index (spec §4.1's `scan` row:
    /// O(log N + output), not O((b-a+1)·log N)).
    fn do_print(&mut self, a: i64, b: i64) -> Result<()> {
        let n = self.store.size() as i64;
        let lo = a.max(1);
        let hi = b.min(n);
        if lo > hi {
            for _ in 0..(b - a + 1).max(0) {
                self.sink.write_line(".\n")?;
            }
            return Ok(());
        }
        for _ in 0..(lo - a) {
            self.sink.write_line(".\n")?;
        }
        for payload in self.store.scan(lo as usize, hi as usize) {
            let line = format!("{payload}\n");
            self.sink.write_line(&line)?;
        }
        for _ in 0..(b - hi) {
            self.sink.write_line(".\n")?;
        }
        Ok(())
    }
}
