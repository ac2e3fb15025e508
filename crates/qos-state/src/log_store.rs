//! Per-channel log buffers.
//!
//! Each backend script and traffic controller appends its output to a
//! channel named after it; clients read back the tail of a channel.

use std::collections::HashMap;

use qos_protocol::LOG_FETCH_LIMIT;

/// Append-only log lines keyed by channel name.
#[derive(Debug, Clone)]
pub struct LogStore {
    logs: HashMap<String, Vec<String>>,
    /// Lines kept per channel; older lines are dropped once exceeded.
    retain: usize,
}

impl LogStore {
    pub fn new() -> Self {
        Self::with_retention(LOG_FETCH_LIMIT * 4)
    }

    pub fn with_retention(retain: usize) -> Self {
        Self {
            logs: HashMap::new(),
            retain: retain.max(1),
        }
    }

    /// Append one line, stripping any trailing line terminator.
    pub fn append(&mut self, channel: &str, line: &str) {
        let clean = line.trim_end_matches(['\n', '\r']);
        let lines = self.logs.entry(channel.to_string()).or_default();
        lines.push(clean.to_string());
        if lines.len() > self.retain {
            let excess = lines.len() - self.retain;
            lines.drain(..excess);
        }
    }

    /// The last `limit` lines of a channel, oldest first. A `limit` of zero
    /// returns everything retained. Unknown channels are empty.
    pub fn get_logs(&self, channel: &str, limit: usize) -> Vec<String> {
        let Some(lines) = self.logs.get(channel) else {
            return Vec::new();
        };
        if limit == 0 {
            return lines.clone();
        }
        let start = lines.len().saturating_sub(limit);
        lines[start..].to_vec()
    }

    pub fn clear(&mut self, channel: &str) {
        if let Some(lines) = self.logs.get_mut(channel) {
            lines.clear();
        }
    }

    /// Number of retained lines in a channel.
    pub fn len(&self, channel: &str) -> usize {
        self.logs.get(channel).map(Vec::len).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.logs.values().all(Vec::is_empty)
    }
}

impl Default for LogStore {
    fn default() -> Self {
        Self::new()
    }
}
