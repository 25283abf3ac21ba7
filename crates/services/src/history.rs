//! Minimal browser-history contract: committed moves push entries, pops navigate back.

use serde::{Deserialize, Serialize};

/// State stored with a history entry: the zero-based step index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub step: usize,
}

impl HistoryEntry {
    #[must_use]
    pub fn new(step: usize) -> Self {
        Self { step }
    }

    /// Location fragment for the entry, one-based (`#step-1` for the first step).
    #[must_use]
    pub fn location(&self) -> String {
        format!("#step-{}", self.step + 1)
    }
}

pub trait NavigationHistory: Send {
    fn push(&mut self, entry: HistoryEntry);
}

/// Session history kept in memory, with a cursor for back/forward traversal.
#[derive(Debug, Clone, Default)]
pub struct InMemoryHistory {
    entries: Vec<HistoryEntry>,
    cursor: Option<usize>,
}

impl InMemoryHistory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    #[must_use]
    pub fn current(&self) -> Option<HistoryEntry> {
        self.cursor.and_then(|i| self.entries.get(i).copied())
    }

    /// Step back one entry. Returns the entry that becomes current; `None` means the
    /// initial page state, which carries no entry.
    pub fn back(&mut self) -> Option<HistoryEntry> {
        self.cursor = match self.cursor {
            Some(0) | None => None,
            Some(i) => Some(i - 1),
        };
        self.current()
    }

    pub fn forward(&mut self) -> Option<HistoryEntry> {
        let next = self.cursor.map_or(0, |i| i + 1);
        if next < self.entries.len() {
            self.cursor = Some(next);
        }
        self.current()
    }
}

impl NavigationHistory for InMemoryHistory {
    fn push(&mut self, entry: HistoryEntry) {
        let keep = self.cursor.map_or(0, |i| i + 1);
        self.entries.truncate(keep);
        self.entries.push(entry);
        self.cursor = Some(self.entries.len() - 1);
    }
}

/// History sink for hosts without navigation history.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHistory;

impl NavigationHistory for NoHistory {
    fn push(&mut self, _entry: HistoryEntry) {}
}
