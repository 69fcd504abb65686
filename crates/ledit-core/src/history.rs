//! Undo/Redo History
//!
//! A dual-stack history of command groups. Each group bundles every
//! [`HistoryRecord`] a single dispatched command produced; undo and redo
//! always operate on a whole group, never a partial one.
//!
//! Records are kept in the order they were originally pushed during the
//! command's forward execution. Undoing a group replays its records in
//! reverse (mirroring the push/pop stack discipline of the original
//! implementation); redoing replays them forward.

use std::collections::VecDeque;

/// Identifies one dispatched command's bundle of history records.
pub type GroupId = u64;

/// A single reversible primitive emitted while executing a command.
///
/// `Sentinel` replaces the original implementation's magic `-1` key: it
/// marks a group boundary / no-op placeholder without overloading a valid
/// line index. spec.md's design notes leave the encoding unprescribed, only
/// the replay behavior, so this substitution changes no observable
/// semantics.
///
/// `Overwrite` and `Remove` are not simple opposites of each other: each
/// carries the payload its *redo* (not undo) side needs, so a single record
/// can serve both directions without the dispatcher tracking which stack it
/// came from.
#[derive(Debug, Clone)]
pub enum HistoryRecord {
    /// Undo: `upsert(key, payload)` (restores the prior line). Redo:
    /// `remove(key)` (un-restores it). Emitted for DELETE of an existing
    /// line, and as the first record of a CHANGE that overwrote one.
    Overwrite { key: usize, payload: Box<str> },
    /// Undo: `remove(key)` (un-creates the line). Redo: `upsert(key,
    /// payload)` (recreates it). Emitted for CHANGE of an absent line, and
    /// as the second record of a CHANGE that overwrote one.
    Remove { key: usize, payload: Box<str> },
    /// Undo: `shift_up(lo, hi)`. Redo: `shift_down(lo, hi)`. Emitted once
    /// per DELETE that renumbered the tail of the document.
    Shift { lo: usize, hi: usize },
    /// Marks a command that produced no reversible effect.
    Sentinel,
}

/// One dispatched command's bundle of records, in push order.
#[derive(Debug)]
pub struct Group {
    pub id: GroupId,
    pub records: Vec<HistoryRecord>,
}

/// Dual-stack undo/redo history over command groups.
#[derive(Debug)]
pub struct History {
    undo: VecDeque<Group>,
    redo: Vec<Group>,
    next_id: GroupId,
    limit: Option<usize>,
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

impl History {
    pub fn new() -> Self {
        Self {
            undo: VecDeque::new(),
            redo: Vec::new(),
            next_id: 0,
            limit: None,
        }
    }

    /// Builds a history that retains at most `limit` groups in the undo
    /// stack, evicting the oldest whole group once the cap is exceeded.
    pub fn with_group_limit(limit: usize) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: Vec::new(),
            next_id: 0,
            limit: Some(limit),
        }
    }

    /// Allocates a fresh group id for a new command about to be dispatched.
    pub fn alloc_group_id(&mut self) -> GroupId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Pushes a fully-formed group onto the undo stack, clearing the redo
    /// stack (a new command invalidates any previously undone future).
    pub fn push_group(&mut self, id: GroupId, records: Vec<HistoryRecord>) {
        self.redo.clear();
        self.undo.push_back(Group { id, records });
        if let Some(limit) = self.limit {
            while self.undo.len() > limit {
                self.undo.pop_front();
            }
        }
    }

    /// Number of groups available to undo.
    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    /// Number of groups available to redo.
    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    /// Pops the most recent group off the undo stack and onto the redo
    /// stack, returning its records in undo-replay order (reverse of push
    /// order).
    pub fn pop_undo(&mut self) -> Option<Vec<HistoryRecord>> {
        let group = self.undo.pop_back()?;
        let mut records = group.records.clone();
        records.reverse();
        self.redo.push(group);
        Some(records)
    }

    /// Pops the most recently undone group off the redo stack and back onto
    /// the undo stack, returning its records in redo-replay order (original
    /// push order).
    pub fn pop_redo(&mut self) -> Option<Vec<HistoryRecord>> {
        let group = self.redo.pop()?;
        let records = group.records.clone();
        self.undo.push_back(group);
        Some(records)
    }
}
