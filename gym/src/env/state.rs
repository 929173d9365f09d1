//! Episode lifecycle

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of an environment
///
/// ```text
/// Uninitialized --reset--> Ready --step--> Running --last step--> Done
///                            ^                                     |
///                            +---------------reset-----------------+
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvStatus {
    /// Built but never reset
    Uninitialized,
    /// Reset, no step taken yet
    Ready,
    /// At least one step taken, not terminal
    Running,
    /// Terminal; only `reset` is accepted
    Done,
}

impl EnvStatus {
    pub fn accepts_step(&self) -> bool {
        matches!(self, EnvStatus::Ready | EnvStatus::Running)
    }
}

impl fmt::Display for EnvStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EnvStatus::Uninitialized => "uninitialized",
            EnvStatus::Ready => "ready",
            EnvStatus::Running => "running",
            EnvStatus::Done => "done",
        };
        f.write_str(s)
    }
}

/// Lockstep position within an episode of fixed length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpisodeCursor {
    step: usize,
    len: usize,
}

impl EpisodeCursor {
    pub fn new(len: usize) -> Self {
        Self { step: 0, len }
    }

    pub fn step(&self) -> usize {
        self.step
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Terminal once the last row is reached
    pub fn is_terminal(&self) -> bool {
        self.step + 1 >= self.len
    }

    /// Move forward by one step
    pub fn advance(&mut self) {
        self.step += 1;
    }

    pub fn reset(&mut self) {
        self.step = 0;
    }

    /// Steps left until terminal
    pub fn remaining(&self) -> usize {
        self.len.saturating_sub(self.step + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_terminal_after_len_minus_one() {
        let mut cursor = EpisodeCursor::new(3);
        assert!(!cursor.is_terminal());
        assert_eq!(cursor.remaining(), 2);
        cursor.advance();
        assert!(!cursor.is_terminal());
        cursor.advance();
        assert!(cursor.is_terminal());
        assert_eq!(cursor.remaining(), 0);
        cursor.reset();
        assert_eq!(cursor.step(), 0);
    }

    #[test]
    fn test_status_accepts_step() {
        assert!(!EnvStatus::Uninitialized.accepts_step());
        assert!(EnvStatus::Ready.accepts_step());
        assert!(EnvStatus::Running.accepts_step());
        assert!(!EnvStatus::Done.accepts_step());
    }
}
