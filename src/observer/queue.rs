use super::dedup::DedupWindow;
use super::store::MessageStore;
use super::tracker::ConsumptionTracker;
use crate::error::{Error, Result};
use crate::{DedupPolicy, MessageId, QueueInfo};
use bytes::Bytes;

/// Outcome of appending to a topic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Appended {
    /// Stored under a new sequence number
    Stored(u64),
    /// Folded onto the earlier occurrence of the same identity
    Duplicate(u64),
}

impl Appended {
    pub fn sqn(self) -> u64 {
        match self {
            Appended::Stored(sqn) | Appended::Duplicate(sqn) => sqn,
        }
    }
}

/// All state owned by one topic. The registry wraps each in its own lock so
/// topics never contend with each other.
pub(crate) struct TopicQueue {
    name: String,
    store: MessageStore,
    dedup: DedupWindow,
    tracker: ConsumptionTracker,
}

impl TopicQueue {
    pub fn new(name: &str, policy: DedupPolicy) -> Self {
        Self {
            name: name.to_string(),
            store: MessageStore::new(),
            dedup: DedupWindow::new(policy),
            tracker: ConsumptionTracker::new(),
        }
    }

    pub fn append(&mut self, id: MessageId, payload: Bytes) -> Result<Appended> {
        let candidate = self
            .store
            .next_sqn()
            .ok_or_else(|| Error::SequenceExhausted(self.name.clone()))?;

        if let Some(prior) = self.dedup.check_and_record(id, candidate) {
            return Ok(Appended::Duplicate(prior));
        }

        let sqn = self
            .store
            .push(payload)
            .ok_or_else(|| Error::SequenceExhausted(self.name.clone()))?;
        Ok(Appended::Stored(sqn))
    }

    fn is_readable(&self, sqn: u64) -> bool {
        match self.store.end() {
            Some(end) => sqn >= self.tracker.frontier() && sqn <= end,
            None => false,
        }
    }

    pub fn read_one(&self, sqn: u64) -> Result<Bytes> {
        if !self.is_readable(sqn) {
            return Err(self.not_found(sqn));
        }
        self.store.get(sqn).cloned().ok_or_else(|| self.not_found(sqn))
    }

    pub fn read_range(&self, start: u64, end: u64) -> Result<Vec<Bytes>> {
        if start > end || !self.is_readable(start) || !self.is_readable(end) {
            return Err(self.invalid_range(start, end));
        }
        self.store
            .range(start, end)
            .ok_or_else(|| self.invalid_range(start, end))
    }

    /// Returns how many sequence numbers the frontier advanced by.
    pub fn acknowledge(&mut self, sqn: u64) -> Result<u64> {
        self.check_acknowledgeable(sqn)?;
        let advanced = self.tracker.acknowledge(sqn);
        self.reclaim();
        Ok(advanced)
    }

    pub fn acknowledge_range(&mut self, start: u64, end: u64) -> Result<u64> {
        if start > end {
            return Err(self.invalid_range(start, end));
        }
        self.check_acknowledgeable(end)?;
        let advanced = self.tracker.acknowledge_range(start, end);
        self.reclaim();
        Ok(advanced)
    }

    fn check_acknowledgeable(&self, sqn: u64) -> Result<()> {
        match self.store.end() {
            Some(end) if sqn <= end => Ok(()),
            _ => Err(self.not_found(sqn)),
        }
    }

    fn reclaim(&mut self) {
        self.store.reclaim_below(self.tracker.frontier());
    }

    /// Overwrite `info` with the current state, reusing its topic string.
    pub fn fill_info(&self, info: &mut QueueInfo) {
        info.topic.clear();
        info.topic.push_str(&self.name);
        info.start = self.tracker.frontier();
        match self.store.end() {
            Some(end) => {
                info.end = end;
                info.is_empty = info.start > end;
            }
            None => {
                info.end = 0;
                info.is_empty = true;
            }
        }
    }

    pub fn info(&self) -> QueueInfo {
        let mut info = QueueInfo::new();
        self.fill_info(&mut info);
        info
    }

    /// Number of payloads still held in memory
    pub fn retained(&self) -> usize {
        self.store.len()
    }

    fn not_found(&self, sqn: u64) -> Error {
        Error::SequenceNotFound {
            topic: self.name.clone(),
            sqn,
        }
    }

    fn invalid_range(&self, start: u64, end: u64) -> Error {
        Error::InvalidRange {
            topic: self.name.clone(),
            start,
            end,
        }
    }
}
