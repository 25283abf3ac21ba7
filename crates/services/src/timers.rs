//! Cancellable timers keyed by purpose, driven by an externally supplied clock.

use std::collections::BTreeMap;

/// What a pending timer is for. At most one timer per purpose is pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TimerPurpose {
    /// Fade-out before a step commits, then fade-in after it.
    Transition,
    LoadingDwell,
    AutoAdvance,
    ValidationDebounce,
    SaveDebounce,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimerSet {
    due: BTreeMap<TimerPurpose, u64>,
}

impl TimerSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `purpose` to fire `delay_ms` after `now_ms`, replacing any pending timer
    /// for the same purpose.
    pub fn schedule(&mut self, purpose: TimerPurpose, now_ms: u64, delay_ms: u64) {
        self.due.insert(purpose, now_ms.saturating_add(delay_ms));
    }

    /// Returns true when a pending timer was removed.
    pub fn cancel(&mut self, purpose: TimerPurpose) -> bool {
        self.due.remove(&purpose).is_some()
    }

    #[must_use]
    pub fn is_pending(&self, purpose: TimerPurpose) -> bool {
        self.due.contains_key(&purpose)
    }

    #[must_use]
    pub fn due_at(&self, purpose: TimerPurpose) -> Option<u64> {
        self.due.get(&purpose).copied()
    }

    #[must_use]
    pub fn next_deadline(&self) -> Option<u64> {
        self.due.values().copied().min()
    }

    /// Remove and return the earliest timer due at `now_ms`, with its due time.
    ///
    /// Timers due at the same instant fire in `TimerPurpose` order.
    pub fn pop_due(&mut self, now_ms: u64) -> Option<(TimerPurpose, u64)> {
        let (purpose, due) = self
            .due
            .iter()
            .filter(|(_, due)| **due <= now_ms)
            .map(|(purpose, due)| (*purpose, *due))
            .min_by_key(|(purpose, due)| (*due, *purpose))?;
        self.due.remove(&purpose);
        Some((purpose, due))
    }

    pub fn clear(&mut self) {
        self.due.clear();
    }
}
