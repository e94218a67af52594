//! Local move log with undo/redo
//!
//! Best-effort recovery aid for the local client. Never sent to the
//! opponent and never authoritative.

use crate::board::Color;
use crate::game::PlayerId;
use crate::hex::Hex;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Default number of moves kept
pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

/// One applied move and the state it produced
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRecord {
    /// Position of the move in the game, starting at 0
    pub sequence: u64,
    pub timestamp: DateTime<Utc>,
    pub player: PlayerId,
    pub color: Color,
    pub captured: Vec<Hex>,
    /// Serialized state after the move
    pub snapshot: String,
}

/// Capped move log with an undo cursor
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveHistory {
    capacity: usize,
    /// Serialized state before the oldest kept entry
    base: String,
    /// Sequence number the oldest kept entry has (or would have)
    base_sequence: u64,
    entries: VecDeque<MoveRecord>,
    /// `entries[..cursor]` are applied; the rest can be redone
    cursor: usize,
}

impl MoveHistory {
    /// Empty history starting from `initial_snapshot`
    pub fn new(capacity: usize, initial_snapshot: String) -> Self {
        Self {
            capacity: capacity.max(1),
            base: initial_snapshot,
            base_sequence: 0,
            entries: VecDeque::new(),
            cursor: 0,
        }
    }

    /// Append a move, dropping any redo branch and the oldest entry past
    /// capacity. Returns the new record's sequence number.
    pub fn add_move(
        &mut self,
        player: PlayerId,
        color: Color,
        captured: Vec<Hex>,
        snapshot: String,
    ) -> u64 {
        self.entries.truncate(self.cursor);

        let sequence = self.base_sequence + self.entries.len() as u64;
        self.entries.push_back(MoveRecord {
            sequence,
            timestamp: Utc::now(),
            player,
            color,
            captured,
            snapshot,
        });

        while self.entries.len() > self.capacity {
            if let Some(evicted) = self.entries.pop_front() {
                self.base = evicted.snapshot;
                self.base_sequence += 1;
            }
        }
        self.cursor = self.entries.len();

        sequence
    }

    /// Entry by position among the kept entries
    pub fn get(&self, index: usize) -> Option<&MoveRecord> {
        self.entries.get(index)
    }

    /// Entry by game sequence number
    pub fn find(&self, sequence: u64) -> Option<&MoveRecord> {
        let index = sequence.checked_sub(self.base_sequence)?;
        self.entries.get(usize::try_from(index).ok()?)
    }

    /// Latest applied entry
    pub fn current(&self) -> Option<&MoveRecord> {
        self.cursor.checked_sub(1).and_then(|i| self.entries.get(i))
    }

    /// Serialized state at the cursor
    pub fn current_snapshot(&self) -> &str {
        self.current().map_or(self.base.as_str(), |r| r.snapshot.as_str())
    }

    /// Step back one move; returns the snapshot to restore
    pub fn undo(&mut self) -> Option<&str> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        Some(self.current_snapshot())
    }

    /// Step forward one move
    pub fn redo(&mut self) -> Option<&MoveRecord> {
        if self.cursor >= self.entries.len() {
            return None;
        }
        self.cursor += 1;
        self.current()
    }

    /// Drop every entry after position `index`
    pub fn truncate_after(&mut self, index: usize) {
        self.entries.truncate(index.saturating_add(1));
        self.cursor = self.cursor.min(self.entries.len());
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor < self.entries.len()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MoveRecord> + '_ {
        self.entries.iter()
    }
}
