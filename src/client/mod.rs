//! Convenience handles over a shared [`Observer`](crate::Observer).

mod producer;
mod subscriber;

pub use producer::Producer;
pub use subscriber::Subscriber;
