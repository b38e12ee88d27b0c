//! 有界日志缓冲

use std::collections::VecDeque;

pub const DEFAULT_LOG_CAPACITY: usize = 1000;

/// Position in the log stream, counted over every line ever appended.
pub type LogCheckpoint = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogBuffer {
    lines: VecDeque<String>,
    cap: usize,
    total: LogCheckpoint,
}

impl LogBuffer {
    pub fn new(cap: usize) -> Self {
        let cap = cap.max(1);
        Self {
            lines: VecDeque::with_capacity(cap.min(DEFAULT_LOG_CAPACITY)),
            cap,
            total: 0,
        }
    }

    pub fn push(&mut self, line: impl Into<String>) {
        if self.lines.len() == self.cap {
            self.lines.pop_front();
        }
        self.lines.push_back(line.into());
        self.total += 1;
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn checkpoint(&self) -> LogCheckpoint {
        self.total
    }

    /// Lines appended after `checkpoint`, plus the checkpoint to resume from.
    /// Lines that already fell out of the buffer are skipped.
    pub fn since(&self, checkpoint: LogCheckpoint) -> (Vec<String>, LogCheckpoint) {
        let first_kept = self.total - self.lines.len() as u64;
        let start = checkpoint.max(first_kept).min(self.total);
        let skip = (start - first_kept) as usize;
        let lines = self.lines.iter().skip(skip).cloned().collect();
        (lines, self.total)
    }
}

impl Default for LogBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_CAPACITY)
    }
}
