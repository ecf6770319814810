use crate::error::Result;
use crate::{MessageId, Observer, TopicName};
use bytes::Bytes;
use std::sync::Arc;
use tracing::debug;

/// A handle that appends to a single topic
#[derive(Clone)]
pub struct Producer {
    observer: Arc<Observer>,
    topic: TopicName,
}

impl Producer {
    /// Create a new producer. The topic itself is created on the first append.
    pub fn new(observer: Arc<Observer>, topic: &str) -> Result<Self> {
        let topic = TopicName::new(topic)?;
        debug!("Creating new producer for topic: {}", topic);
        Ok(Self { observer, topic })
    }

    pub fn topic(&self) -> &str {
        self.topic.as_str()
    }

    /// Publish a payload, identified by its content
    pub fn publish(&self, payload: impl Into<Bytes>) -> Result<u64> {
        self.observer.append(self.topic.as_str(), payload)
    }

    /// Publish a payload under an explicit identity
    pub fn publish_with_id(&self, id: MessageId, payload: impl Into<Bytes>) -> Result<u64> {
        self.observer.append_with_id(self.topic.as_str(), id, payload)
    }

    /// Publish several payloads in order, stopping at the first failure.
    pub fn publish_batch<I, P>(&self, payloads: I) -> Result<Vec<u64>>
    where
        I: IntoIterator<Item = P>,
        P: Into<Bytes>,
    {
        let sqns = payloads
            .into_iter()
            .map(|payload| self.publish(payload))
            .collect::<Result<Vec<_>>>()?;
        debug!("Published batch of {} messages to {}", sqns.len(), self.topic);
        Ok(sqns)
    }
}
