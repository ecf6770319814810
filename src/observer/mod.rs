mod dedup;
mod queue;
mod registry;
mod store;
mod tracker;

use crate::error::{Error, Result};
use crate::topic::TopicFilter;
use crate::{MessageId, ObserverConfig, ObserverStats, QueueInfo, TopicName};
use bytes::{BufMut, Bytes};
use queue::Appended;
use registry::{SharedQueue, TopicRegistry};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info, warn};

pub use store::MAX_SEQUENCE;

/// Statistics counters for the observer
#[derive(Default)]
struct Counters {
    messages_appended: AtomicU64,
    duplicates_suppressed: AtomicU64,
    messages_acknowledged: AtomicU64,
    messages_read: AtomicU64,
}

/// The observer owns every topic queue and exposes the read, query and
/// acknowledgment surface over them.
///
/// All methods take `&self`; share it across threads with `Arc<Observer>`.
/// Appends to one topic are serialized by that topic's lock, reads of one
/// topic run concurrently, and different topics never block each other.
pub struct Observer {
    registry: TopicRegistry,
    counters: Counters,
    config: ObserverConfig,
}

impl Observer {
    /// Create a new observer instance
    pub fn new(config: ObserverConfig) -> Result<Self> {
        config.validate()?;
        info!("Creating new observer with config: {:?}", config);

        Ok(Self {
            registry: TopicRegistry::new(config.dedup, config.max_topics),
            counters: Counters::default(),
            config,
        })
    }

    pub fn config(&self) -> &ObserverConfig {
        &self.config
    }

    /// Append a payload, deriving its identity from the payload bytes.
    ///
    /// Returns the sequence number the payload is stored under. If an equal
    /// payload was appended recently, that earlier sequence number is returned
    /// and nothing new is stored.
    pub fn append(&self, topic: &str, payload: impl Into<Bytes>) -> Result<u64> {
        let payload = payload.into();
        let id = MessageId::from_payload(&payload);
        self.append_with_id(topic, id, payload)
    }

    /// Append a payload under a producer-supplied identity. The topic is
    /// created on first use.
    pub fn append_with_id(
        &self,
        topic: &str,
        id: MessageId,
        payload: impl Into<Bytes>,
    ) -> Result<u64> {
        let name = TopicName::new(topic)?;
        let payload = payload.into();

        if payload.len() > self.config.max_payload_size {
            warn!(
                "Rejecting {} byte payload on topic {} (limit {})",
                payload.len(),
                name,
                self.config.max_payload_size
            );
            return Err(Error::PayloadTooLarge {
                size: payload.len(),
                limit: self.config.max_payload_size,
            });
        }

        let queue = self.registry.resolve(&name)?;
        let appended = queue.write().append(id, payload)?;

        match appended {
            Appended::Stored(sqn) => {
                debug!("Appended message {} to topic {} at {}", id, name, sqn);
                self.counters.messages_appended.fetch_add(1, Ordering::Relaxed);
            }
            Appended::Duplicate(sqn) => {
                debug!("Suppressed duplicate {} on topic {} (stored at {})", id, name, sqn);
                self.counters.duplicates_suppressed.fetch_add(1, Ordering::Relaxed);
            }
        }
        Ok(appended.sqn())
    }

    /// Names of every known topic, in no particular order
    pub fn list_topics(&self) -> Vec<String> {
        self.registry.names()
    }

    /// Names of the known topics matching a `/`-segmented pattern
    pub fn topics_matching(&self, pattern: &str) -> Vec<String> {
        let filter = TopicFilter::new(pattern);
        let mut names = self.registry.names();
        names.retain(|name| filter.matches(name));
        names
    }

    pub fn all_queue_info(&self) -> Vec<QueueInfo> {
        self.registry
            .queues()
            .iter()
            .map(|queue| queue.read().info())
            .collect()
    }

    /// Current state of a topic, or `None` if the topic is unknown
    pub fn queue_info(&self, topic: &str) -> Option<QueueInfo> {
        self.registry.get(topic).map(|queue| queue.read().info())
    }

    /// Fill `info` in place. Returns `false` and leaves `info` untouched if the
    /// topic is unknown. Once `info` has held a topic name of sufficient
    /// length, polling through this method does not allocate.
    pub fn queue_info_into(&self, topic: &str, info: &mut QueueInfo) -> bool {
        match self.registry.get(topic) {
            Some(queue) => {
                queue.read().fill_info(info);
                true
            }
            None => false,
        }
    }

    /// Read one message. Reading never counts as consumption.
    pub fn read_message(&self, topic: &str, sqn: u64) -> Result<Bytes> {
        let payload = self.queue(topic)?.read().read_one(sqn)?;
        self.counters.messages_read.fetch_add(1, Ordering::Relaxed);
        Ok(payload)
    }

    /// Read `start..=end` in sequence order. Either every payload in the range
    /// is returned or the call fails.
    pub fn read_message_range(&self, topic: &str, start: u64, end: u64) -> Result<Vec<Bytes>> {
        let payloads = self.queue(topic)?.read().read_range(start, end)?;
        self.counters
            .messages_read
            .fetch_add(payloads.len() as u64, Ordering::Relaxed);
        Ok(payloads)
    }

    /// Copy one message into `dst`, returning the payload length.
    ///
    /// If `dst` is shorter than the payload it is left unmodified and
    /// [`Error::BufferTooSmall`] reports the required size.
    pub fn read_message_into(&self, topic: &str, sqn: u64, dst: &mut [u8]) -> Result<usize> {
        let payload = self.queue(topic)?.read().read_one(sqn)?;
        let available = dst.len();
        let slot = dst.get_mut(..payload.len()).ok_or(Error::BufferTooSmall {
            required: payload.len(),
            available,
        })?;
        slot.copy_from_slice(&payload);
        self.counters.messages_read.fetch_add(1, Ordering::Relaxed);
        Ok(payload.len())
    }

    /// Append one message to `buf`, returning the payload length. Nothing is
    /// written unless the whole payload fits.
    pub fn read_message_into_buf<B: BufMut>(
        &self,
        topic: &str,
        sqn: u64,
        buf: &mut B,
    ) -> Result<usize> {
        let payload = self.queue(topic)?.read().read_one(sqn)?;
        if buf.remaining_mut() < payload.len() {
            return Err(Error::BufferTooSmall {
                required: payload.len(),
                available: buf.remaining_mut(),
            });
        }
        buf.put_slice(&payload);
        self.counters.messages_read.fetch_add(1, Ordering::Relaxed);
        Ok(payload.len())
    }

    /// Mark `sqn` as consumed. The topic's start moves to `sqn + 1` unless it
    /// is already past it.
    pub fn consume_message(&self, topic: &str, sqn: u64) -> Result<()> {
        let advanced = self.queue(topic)?.write().acknowledge(sqn)?;
        self.record_acknowledged(topic, advanced);
        Ok(())
    }

    /// Mark `start..=end` as consumed.
    pub fn consume_message_range(&self, topic: &str, start: u64, end: u64) -> Result<()> {
        let advanced = self.queue(topic)?.write().acknowledge_range(start, end)?;
        self.record_acknowledged(topic, advanced);
        Ok(())
    }

    /// Get observer statistics
    pub fn stats(&self) -> ObserverStats {
        let queues = self.registry.queues();
        let retained_messages = queues.iter().map(|queue| queue.read().retained()).sum();

        ObserverStats {
            topics: queues.len(),
            retained_messages,
            messages_appended: self.counters.messages_appended.load(Ordering::Relaxed),
            duplicates_suppressed: self.counters.duplicates_suppressed.load(Ordering::Relaxed),
            messages_acknowledged: self.counters.messages_acknowledged.load(Ordering::Relaxed),
            messages_read: self.counters.messages_read.load(Ordering::Relaxed),
        }
    }

    fn queue(&self, topic: &str) -> Result<SharedQueue> {
        self.registry.get(topic).ok_or_else(|| {
            warn!("Operation on unknown topic: {}", topic);
            Error::UnknownTopic(topic.to_string())
        })
    }

    fn record_acknowledged(&self, topic: &str, advanced: u64) {
        if advanced > 0 {
            debug!("Topic {} frontier advanced by {}", topic, advanced);
            self.counters
                .messages_acknowledged
                .fetch_add(advanced, Ordering::Relaxed);
        }
    }
}
