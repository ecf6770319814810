use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Unknown topic: {0}")]
    UnknownTopic(String),

    #[error("Sequence number {sqn} not found on topic {topic}")]
    SequenceNotFound { topic: String, sqn: u64 },

    #[error("Invalid range {start}..={end} on topic {topic}")]
    InvalidRange { topic: String, start: u64, end: u64 },

    #[error("Buffer too small: need {required} bytes, have {available}")]
    BufferTooSmall { required: usize, available: usize },

    #[error("Invalid topic name: {0}")]
    InvalidTopicName(String),

    #[error("Topic name too long")]
    TopicTooLong,

    #[error("Topic limit exceeded: {0}")]
    TopicLimitExceeded(usize),

    #[error("Payload of {size} bytes exceeds limit of {limit} bytes")]
    PayloadTooLarge { size: usize, limit: usize },

    #[error("Sequence space exhausted on topic {0}")]
    SequenceExhausted(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error("Operation timeout")]
    Timeout,
}

pub type Result<T> = std::result::Result<T, Error>;
