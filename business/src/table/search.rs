//! Debounced search input.
//!
//! Keeps two values: `pending` follows every keystroke, `committed` is what
//! actually reaches the server. A term commits immediately once it is long
//! enough to be worth searching, and also immediately when cleared (stale
//! filtered results must not linger); anything in between waits out a quiet
//! period. Time is injected so tests control the clock; there are no timers.

use chrono::{DateTime, Duration, Utc};

pub const DEFAULT_MIN_LENGTH: usize = 3;
pub const DEFAULT_DELAY_MS: i64 = 2500;

#[derive(Debug, Clone)]
pub struct DebouncedSearch {
    pending: String,
    committed: String,
    deadline: Option<DateTime<Utc>>,
    min_length: usize,
    delay: Duration,
}

impl Default for DebouncedSearch {
    fn default() -> Self {
        Self::new()
    }
}

impl DebouncedSearch {
    pub fn new() -> Self {
        Self::with_settings(DEFAULT_MIN_LENGTH, DEFAULT_DELAY_MS)
    }

    pub fn with_settings(min_length: usize, delay_ms: i64) -> Self {
        Self {
            pending: String::new(),
            committed: String::new(),
            deadline: None,
            min_length,
            delay: Duration::milliseconds(delay_ms),
        }
    }

    /// The raw input, as last typed.
    pub fn pending(&self) -> &str {
        &self.pending
    }

    /// The stabilized term that is actually sent to the server.
    pub fn committed(&self) -> &str {
        &self.committed
    }

    /// Whether a commit is scheduled but not yet due.
    pub fn is_pending_commit(&self) -> bool {
        self.deadline.is_some()
    }

    /// Records a keystroke. Returns `true` when the committed term changed.
    pub fn input(&mut self, raw: &str, now: DateTime<Utc>) -> bool {
        self.pending = raw.to_owned();
        let trimmed = raw.trim();
        let length = trimmed.chars().count();

        if length == 0 || length >= self.min_length {
            self.deadline = None;
            self.commit(trimmed)
        } else {
            self.deadline = Some(now + self.delay);
            false
        }
    }

    /// Fires a due deadline. Returns `true` when the committed term changed.
    pub fn tick(&mut self, now: DateTime<Utc>) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                let trimmed = self.pending.trim().to_owned();
                self.commit(&trimmed)
            }
            _ => false,
        }
    }

    /// Clears the input and commits the empty term immediately.
    pub fn reset(&mut self) -> bool {
        self.pending.clear();
        self.deadline = None;
        self.commit("")
    }

    fn commit(&mut self, term: &str) -> bool {
        if self.committed == term {
            return false;
        }
        self.committed = term.to_owned();
        true
    }
}
