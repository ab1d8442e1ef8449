//! Per-generator append-only event log.

use dashmap::DashMap;

/// One delivered sample as recorded in the log.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    /// Position in the generator's log; 0-based, gapless.
    pub index: u64,
    /// Serialized sample record as it was sent to the sink.
    pub payload: String,
}

/// Append-only ordered store of delivered samples, keyed by generator
/// identifier.
///
/// Indices per identifier are strictly increasing from 0 with no gaps.
/// Only the producer task that owns an identifier appends to it; that
/// single-writer rule is what guarantees monotonicity without a separate
/// locking protocol. Readers never mutate.
pub trait EventLog: Send + Sync {
    /// Appends a payload and returns the index it was stored at.
    fn append(&self, identifier: &str, payload: String) -> u64;

    /// Entries with `from <= index < to`, in index order. Out-of-range
    /// bounds are clamped to the available entries.
    fn read_range(&self, identifier: &str, from: u64, to: u64) -> Vec<LogEntry>;

    /// Number of entries logged for `identifier` (0 when unknown).
    fn count(&self, identifier: &str) -> u64;

    /// Drops all entries for `identifier`; unknown identifiers are a no-op.
    fn clear(&self, identifier: &str);
}

/// In-process event log on a concurrent map of per-identifier vectors.
#[derive(Debug, Default)]
pub struct InMemoryEventLog {
    entries: DashMap<String, Vec<LogEntry>>,
}

impl InMemoryEventLog {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EventLog for InMemoryEventLog {
    fn append(&self, identifier: &str, payload: String) -> u64 {
        let mut log = self.entries.entry(identifier.to_string()).or_default();
        let index = log.len() as u64;
        log.push(LogEntry { index, payload });
        index
    }

    fn read_range(&self, identifier: &str, from: u64, to: u64) -> Vec<LogEntry> {
        match self.entries.get(identifier) {
            Some(log) => {
                let len = log.len() as u64;
                let from = from.min(len) as usize;
                let to = to.min(len) as usize;
                if from >= to {
                    return Vec::new();
                }
                log[from..to].to_vec()
            }
            None => Vec::new(),
        }
    }

    fn count(&self, identifier: &str) -> u64 {
        self.entries
            .get(identifier)
            .map(|log| log.len() as u64)
            .unwrap_or(0)
    }

    fn clear(&self, identifier: &str) {
        self.entries.remove(identifier);
    }
}
