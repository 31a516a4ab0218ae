//! Recent command history
//!
//! A fixed-capacity ring of the most recent command lines that were
//! dispatched successfully. Only the termination builtin reads it.

use std::collections::VecDeque;

/// Default number of remembered command lines
pub const DEFAULT_CAPACITY: usize = 3;

#[derive(Debug, Clone)]
pub struct History {
    entries: VecDeque<String>,
    capacity: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl History {
    pub fn new(capacity: usize) -> Self {
        History {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Record a command line, evicting the oldest when full
    pub fn push(&mut self, line: impl Into<String>) {
        if self.capacity == 0 {
            return;
        }
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(line.into());
    }

    /// Entries from most recent to oldest
    pub fn recent(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().rev().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
