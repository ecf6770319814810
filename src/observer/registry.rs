use super::queue::TopicQueue;
use crate::error::{Error, Result};
use crate::{DedupPolicy, TopicName};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) type SharedQueue = Arc<RwLock<TopicQueue>>;

/// Known topics, keyed by exact (case sensitive) name.
pub(crate) struct TopicRegistry {
    topics: RwLock<HashMap<String, SharedQueue>>,
    dedup: DedupPolicy,
    max_topics: usize,
}

impl TopicRegistry {
    pub fn new(dedup: DedupPolicy, max_topics: usize) -> Self {
        Self {
            topics: RwLock::new(HashMap::new()),
            dedup,
            max_topics,
        }
    }

    pub fn get(&self, name: &str) -> Option<SharedQueue> {
        self.topics.read().get(name).cloned()
    }

    /// Look up a topic, creating it on first use.
    ///
    /// Concurrent first use of the same name yields one queue: whoever takes
    /// the write lock first creates it and everyone else gets that instance.
    pub fn resolve(&self, name: &TopicName) -> Result<SharedQueue> {
        if let Some(queue) = self.get(name.as_str()) {
            return Ok(queue);
        }

        let mut topics = self.topics.write();
        if let Some(queue) = topics.get(name.as_str()) {
            return Ok(Arc::clone(queue));
        }

        if topics.len() >= self.max_topics {
            warn!("Topic limit exceeded: {}", self.max_topics);
            return Err(Error::TopicLimitExceeded(self.max_topics));
        }

        info!("Creating topic: {}", name);
        let queue = Arc::new(RwLock::new(TopicQueue::new(name.as_str(), self.dedup)));
        topics.insert(name.as_str().to_string(), Arc::clone(&queue));
        Ok(queue)
    }

    pub fn names(&self) -> Vec<String> {
        self.topics.read().keys().cloned().collect()
    }

    /// Snapshot of every queue, taken without holding the registry lock while
    /// the caller inspects them.
    pub fn queues(&self) -> Vec<SharedQueue> {
        self.topics.read().values().cloned().collect()
    }
}
