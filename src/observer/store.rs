use bytes::Bytes;
use std::collections::VecDeque;

/// Highest sequence number a topic will assign. One below `u64::MAX` so the
/// consumption frontier (last acknowledged + 1) always fits in a `u64`.
pub const MAX_SEQUENCE: u64 = u64::MAX - 1;

/// Append-only log of payloads for a single topic.
///
/// Records are addressed by sequence number. `base` is the sequence number of
/// the oldest retained record; everything below it has been reclaimed.
pub(crate) struct MessageStore {
    records: VecDeque<Bytes>,
    base: u64,
    end: Option<u64>,
}

impl MessageStore {
    pub fn new() -> Self {
        Self {
            records: VecDeque::new(),
            base: 0,
            end: None,
        }
    }

    /// Sequence number the next append will receive, or `None` once the
    /// sequence space is used up.
    pub fn next_sqn(&self) -> Option<u64> {
        match self.end {
            None => Some(0),
            Some(end) if end < MAX_SEQUENCE => Some(end + 1),
            Some(_) => None,
        }
    }

    /// Sequence number of the most recent append
    pub fn end(&self) -> Option<u64> {
        self.end
    }

    /// Store a payload under the next sequence number and return it.
    ///
    /// Callers check [`MessageStore::next_sqn`] first; a push past the end of
    /// the sequence space is refused with `None`.
    pub fn push(&mut self, payload: Bytes) -> Option<u64> {
        let sqn = self.next_sqn()?;
        if self.records.is_empty() {
            self.base = sqn;
        }
        self.records.push_back(payload);
        self.end = Some(sqn);
        Some(sqn)
    }

    pub fn get(&self, sqn: u64) -> Option<&Bytes> {
        let offset = sqn.checked_sub(self.base)?;
        self.records.get(usize::try_from(offset).ok()?)
    }

    /// Payloads for `start..=end`, or `None` if any of them is not retained.
    pub fn range(&self, start: u64, end: u64) -> Option<Vec<Bytes>> {
        if start > end || start < self.base || Some(end) > self.end {
            return None;
        }
        let from = usize::try_from(start - self.base).ok()?;
        let to = usize::try_from(end - self.base).ok()?;
        Some(self.records.range(from..=to).cloned().collect())
    }

    /// Drop every record below `sqn`.
    pub fn reclaim_below(&mut self, sqn: u64) -> usize {
        let mut reclaimed = 0;
        while self.base < sqn && self.records.pop_front().is_some() {
            self.base += 1;
            reclaimed += 1;
        }
        reclaimed
    }

    /// Number of retained records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// An empty store whose last append was `end`
    #[cfg(test)]
    pub fn resume_after(end: u64) -> Self {
        Self {
            records: VecDeque::new(),
            base: end.saturating_add(1),
            end: Some(end),
        }
    }
}
