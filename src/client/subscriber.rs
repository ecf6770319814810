use crate::error::{Error, Result};
use crate::{Observer, QueueInfo};
use bytes::Bytes;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error};

/// A polling reader with its own position in one topic.
///
/// Reading moves only the subscriber's private cursor. The topic's shared
/// start moves when [`Subscriber::commit`] acknowledges what was read, so
/// several subscribers can read the same topic at different paces.
#[derive(Clone)]
pub struct Subscriber {
    observer: Arc<Observer>,
    topic: String,
    next: u64,
    read_through: Option<u64>,
    info: QueueInfo,
}

impl Subscriber {
    /// Create a new subscriber starting at the topic's current start
    pub fn new(observer: Arc<Observer>, topic: &str) -> Self {
        debug!("Creating new subscriber for topic: {}", topic);
        Self {
            observer,
            topic: topic.to_string(),
            next: 0,
            read_through: None,
            info: QueueInfo::new(),
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Sequence number the next poll starts from
    pub fn position(&self) -> u64 {
        self.next
    }

    /// Move the cursor. Positions below the topic's start are clamped on the
    /// next poll. Seeking does not change what [`Subscriber::commit`]
    /// acknowledges.
    pub fn seek(&mut self, sqn: u64) {
        self.next = sqn;
    }

    /// Read up to `max_messages` unread messages without waiting.
    ///
    /// An unknown or fully consumed topic yields an empty batch.
    pub fn poll(&mut self, max_messages: usize) -> Result<Vec<(u64, Bytes)>> {
        if max_messages == 0
            || !self.observer.queue_info_into(&self.topic, &mut self.info)
            || self.info.is_empty()
        {
            return Ok(Vec::new());
        }

        let from = self.next.max(self.info.start());
        if from > self.info.end() {
            return Ok(Vec::new());
        }
        let to = self
            .info
            .end()
            .min(from.saturating_add(max_messages as u64 - 1));

        match self.observer.read_message_range(&self.topic, from, to) {
            Ok(payloads) => {
                self.next = to + 1;
                self.read_through = Some(self.read_through.map_or(to, |last| last.max(to)));
                Ok((from..=to).zip(payloads).collect())
            }
            Err(Error::InvalidRange { .. }) => {
                // Another observer acknowledged past `from` in the meantime
                debug!("Range {}..={} on {} moved while polling", from, to, self.topic);
                Ok(Vec::new())
            }
            Err(e) => {
                error!("Error polling topic {}: {}", self.topic, e);
                Err(e)
            }
        }
    }

    /// Wait for the next message, polling until `timeout` elapses.
    pub fn receive_timeout(&mut self, timeout: Duration) -> Result<(u64, Bytes)> {
        let start = Instant::now();

        while start.elapsed() < timeout {
            if let Some(message) = self.poll(1)?.pop() {
                return Ok(message);
            }
            std::thread::sleep(Duration::from_millis(1));
        }

        Err(Error::Timeout)
    }

    /// Acknowledge everything read so far. Does nothing before the first
    /// successful poll.
    pub fn commit(&self) -> Result<()> {
        match self.read_through {
            Some(last) => self.observer.consume_message(&self.topic, last),
            None => Ok(()),
        }
    }
}
