use crate::{DedupPolicy, MessageId};
use std::collections::{HashMap, VecDeque};

/// Recently seen message identities for one topic.
///
/// Each identity maps to the sequence number it was first stored under.
/// Entries leave the window in the order they were recorded, either when the
/// sequence distance exceeds the configured span or when the entry count
/// exceeds the configured limit. Eviction never depends on wall-clock time.
pub(crate) struct DedupWindow {
    policy: DedupPolicy,
    seen: HashMap<MessageId, u64>,
    order: VecDeque<(u64, MessageId)>,
}

impl DedupWindow {
    pub fn new(policy: DedupPolicy) -> Self {
        Self {
            policy,
            seen: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    /// Look up `id` before `candidate` is assigned.
    ///
    /// Returns the earlier sequence number if the identity is still in the
    /// window. Otherwise records `id -> candidate` and returns `None`.
    pub fn check_and_record(&mut self, id: MessageId, candidate: u64) -> Option<u64> {
        match self.policy {
            DedupPolicy::Disabled => return None,
            DedupPolicy::SequenceSpan(span) => self.evict_beyond(candidate, span),
            DedupPolicy::EntryCount(_) => {}
        }

        if let Some(&prior) = self.seen.get(&id) {
            return Some(prior);
        }

        self.seen.insert(id, candidate);
        self.order.push_back((candidate, id));

        if let DedupPolicy::EntryCount(limit) = self.policy {
            while self.order.len() > limit {
                self.evict_oldest();
            }
        }
        None
    }

    fn evict_beyond(&mut self, candidate: u64, span: u64) {
        while let Some(&(sqn, _)) = self.order.front() {
            if candidate.saturating_sub(sqn) <= span {
                break;
            }
            self.evict_oldest();
        }
    }

    fn evict_oldest(&mut self) {
        if let Some((sqn, id)) = self.order.pop_front() {
            if self.seen.get(&id) == Some(&sqn) {
                self.seen.remove(&id);
            }
        }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.seen.len()
    }
}
