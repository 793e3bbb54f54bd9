/**
 * history.rs
 * Numbered log of evaluated queries
 */

use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub sequence: u64,
    pub query: String,
}

impl HistoryEntry {
    /// `"<n>: <query>\n"`
    pub fn line(&self) -> String {
        format!("{}: {}\n", self.sequence, self.query)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryHistory {
    entries: Vec<HistoryEntry>,
    counter: u64,
}

impl QueryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, query: impl Into<String>) -> u64 {
        self.counter += 1;
        self.entries.push(HistoryEntry {
            sequence: self.counter,
            query: query.into(),
        });
        self.counter
    }

    /// The newest `n` entries, oldest first
    pub fn recent(&self, n: usize) -> &[HistoryEntry] {
        let start = self.entries.len().saturating_sub(n);
        &self.entries[start..]
    }

    /// The newest `n` entries rendered one per line
    pub fn window(&self, n: usize) -> String {
        self.recent(n).iter().map(HistoryEntry::line).collect()
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn counter(&self) -> u64 {
        self.counter
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        info!("Clearing query history ({} entries)", self.entries.len());
        self.entries.clear();
        self.counter = 0;
    }
}
