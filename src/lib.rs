//! An in-process topic queue engine for external observers.
//!
//! Topics are named, append-only logs addressed by per-topic sequence numbers.
//! Observers query the valid range with [`Observer::queue_info`], read messages
//! without consuming them, and acknowledge to advance the topic's start. A
//! message whose identity was seen recently on the same topic is folded onto
//! the earlier sequence number instead of being stored twice; duplicates that
//! arrive far apart are kept.

pub mod client;
pub mod error;
pub mod observer;
mod topic;

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

pub use client::{Producer, Subscriber};
pub use error::{Error, Result};
pub use observer::{Observer, MAX_SEQUENCE};
pub use topic::TopicFilter;

/// Maximum length for topic names
pub const MAX_TOPIC_LENGTH: usize = 256;

/// Default lookback of the dedup window, in sequence numbers
pub const DEFAULT_DEDUP_SPAN: u64 = 1024;

/// Namespace for identities derived from payload bytes
const PAYLOAD_NAMESPACE: Uuid = Uuid::from_u128(0x6f62_7365_7276_6572_2d74_6f70_6963_7100);

/// How far back the dedup window looks when an identity is appended again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DedupPolicy {
    /// Every append gets a fresh sequence number.
    Disabled,
    /// An identity is suppressed while the new candidate sequence number is
    /// at most this far past the recorded one.
    SequenceSpan(u64),
    /// The window holds at most this many identities, oldest evicted first.
    EntryCount(usize),
}

impl Default for DedupPolicy {
    fn default() -> Self {
        DedupPolicy::SequenceSpan(DEFAULT_DEDUP_SPAN)
    }
}

/// Configuration for creating a new observer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObserverConfig {
    /// Name used in log output
    pub name: String,
    /// Dedup window applied to every topic
    pub dedup: DedupPolicy,
    /// Maximum number of topics the registry will create
    pub max_topics: usize,
    /// Maximum payload size in bytes
    pub max_payload_size: usize,
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            name: "observer".to_string(),
            dedup: DedupPolicy::default(),
            max_topics: 1024,
            max_payload_size: 16 * 1024 * 1024, // 16MB
        }
    }
}

impl ObserverConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_topics == 0 {
            return Err(Error::InvalidConfig("max_topics cannot be zero".into()));
        }
        if self.max_payload_size == 0 {
            return Err(Error::InvalidConfig("max_payload_size cannot be zero".into()));
        }
        Ok(())
    }
}

/// Identity of a message, used only to detect near duplicates
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct MessageId(Uuid);

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageId {
    /// Create a new random message ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Derive an ID from the payload, so identical payloads share an identity
    pub fn from_payload(payload: &[u8]) -> Self {
        Self(Uuid::new_v5(&PAYLOAD_NAMESPACE, payload))
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for MessageId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A validated topic name
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct TopicName {
    name: String,
}

impl TopicName {
    /// Validate and wrap a topic name. Names are case sensitive.
    pub fn new(name: &str) -> Result<Self> {
        if name.is_empty() {
            return Err(Error::InvalidTopicName("Topic name cannot be empty".into()));
        }
        if name.len() > MAX_TOPIC_LENGTH {
            return Err(Error::TopicTooLong);
        }
        Ok(Self {
            name: name.to_string(),
        })
    }

    /// Get the topic name
    pub fn as_str(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for TopicName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Observable state of one topic queue.
///
/// `start` and `end` carry no meaning while [`QueueInfo::is_empty`] is true.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueInfo {
    pub(crate) topic: String,
    pub(crate) is_empty: bool,
    pub(crate) start: u64,
    pub(crate) end: u64,
}

impl Default for QueueInfo {
    fn default() -> Self {
        Self {
            topic: String::new(),
            is_empty: true,
            start: 0,
            end: 0,
        }
    }
}

impl QueueInfo {
    /// A blank record meant to be filled by [`Observer::queue_info_into`]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// True if there are no unconsumed messages on the topic
    pub fn is_empty(&self) -> bool {
        self.is_empty
    }

    /// Sequence number of the next message to be consumed
    pub fn start(&self) -> u64 {
        self.start
    }

    /// Sequence number of the most recently appended message
    pub fn end(&self) -> u64 {
        self.end
    }

    /// Number of unconsumed messages
    pub fn pending(&self) -> u64 {
        if self.is_empty {
            0
        } else {
            self.end - self.start + 1
        }
    }
}

/// Statistics about the observer's operation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObserverStats {
    /// Number of known topics
    pub topics: usize,
    /// Payloads held in memory across all topics
    pub retained_messages: usize,
    /// Appends that were assigned a new sequence number
    pub messages_appended: u64,
    /// Appends folded onto an earlier sequence number
    pub duplicates_suppressed: u64,
    /// Acknowledgments that advanced a frontier
    pub messages_acknowledged: u64,
    /// Messages returned by reads
    pub messages_read: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_name_validation() {
        assert!(matches!(TopicName::new(""), Err(Error::InvalidTopicName(_))));
        let long = "x".repeat(MAX_TOPIC_LENGTH + 1);
        assert!(matches!(TopicName::new(&long), Err(Error::TopicTooLong)));
        assert_eq!(TopicName::new("Orders").unwrap().as_str(), "Orders");
    }

    #[test]
    fn test_payload_identity_is_stable() {
        assert_eq!(MessageId::from_payload(b"abc"), MessageId::from_payload(b"abc"));
        assert_ne!(MessageId::from_payload(b"abc"), MessageId::from_payload(b"abd"));
        assert_ne!(MessageId::new(), MessageId::new());
    }

    #[test]
    fn test_config_from_json() {
        let config = ObserverConfig::from_json(
            r#"{"name": "edge", "dedup": {"entry_count": 8}, "max_topics": 4}"#,
        )
        .unwrap();
        assert_eq!(config.name, "edge");
        assert_eq!(config.dedup, DedupPolicy::EntryCount(8));
        assert_eq!(config.max_topics, 4);
        assert_eq!(config.max_payload_size, ObserverConfig::default().max_payload_size);

        let config = ObserverConfig::from_json(r#"{"dedup": "disabled"}"#).unwrap();
        assert_eq!(config.dedup, DedupPolicy::Disabled);
    }

    #[test]
    fn test_config_rejects_invalid_values() {
        assert!(matches!(
            ObserverConfig::from_json(r#"{"max_topics": 0}"#),
            Err(Error::InvalidConfig(_))
        ));
        assert!(matches!(
            ObserverConfig::from_json("{not json"),
            Err(Error::ConfigParse(_))
        ));
    }

    #[test]
    fn test_pending_count() {
        let info = QueueInfo {
            topic: "t".into(),
            is_empty: false,
            start: 3,
            end: 7,
        };
        assert_eq!(info.pending(), 5);
        assert_eq!(QueueInfo::new().pending(), 0);
    }

    #[test]
    fn test_default_queue_info_is_empty() {
        let info = QueueInfo::default();
        assert!(info.is_empty());
        assert_eq!(info.pending(), 0);
        assert_eq!(info, QueueInfo::new());
    }
}
