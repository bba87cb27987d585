use anyhow::Result;
use async_trait::async_trait;

/// Trait for JetStream publisher operations.
///
/// Abstracts the one capability record producers need: publish a payload and
/// wait for the broker's durable acknowledgment. Success is only reported
/// once the stream has accepted the message, never fire-and-forget.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait JetStreamPublisher: Send + Sync {
    /// Publish a message to a subject and await the stream acknowledgment.
    async fn publish(&self, subject: String, payload: bytes::Bytes) -> Result<()>;
}
