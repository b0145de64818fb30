// Signal journal - bounded in-memory history plus file-shaped views
pub mod store;

pub use store::{BotStatus, JsonSignalStore};

use crate::models::{CompositeSignal, TradeRecord};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Journal retention: oldest entries are evicted past this count.
pub const JOURNAL_CAPACITY: usize = 100;

/// A journaled event: either an emitted composite signal or a fill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum JournalEntry {
    Signal(CompositeSignal),
    Trade(TradeRecord),
}

/// Bounded FIFO journal of signals and trades for one symbol, plus the
/// most recent composite signal as a separate latest view.
#[derive(Debug, Clone)]
pub struct SignalJournal {
    symbol: String,
    entries: VecDeque<JournalEntry>,
    latest: Option<CompositeSignal>,
    capacity: usize,
}

impl SignalJournal {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self::with_capacity(symbol, JOURNAL_CAPACITY)
    }

    pub fn with_capacity(symbol: impl Into<String>, capacity: usize) -> Self {
        Self {
            symbol: symbol.into(),
            entries: VecDeque::with_capacity(capacity),
            latest: None,
            capacity,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn record_signal(&mut self, signal: CompositeSignal) {
        self.latest = Some(signal.clone());
        self.push(JournalEntry::Signal(signal));
    }

    pub fn record_trade(&mut self, trade: TradeRecord) {
        self.push(JournalEntry::Trade(trade));
    }

    fn push(&mut self, entry: JournalEntry) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    /// Most recent composite signal, if any cycle has completed.
    pub fn latest(&self) -> Option<&CompositeSignal> {
        self.latest.as_ref()
    }

    /// Oldest-first history.
    pub fn history(&self) -> impl Iterator<Item = &JournalEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
