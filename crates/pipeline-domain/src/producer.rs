use crate::error::DomainResult;
use crate::record::SensorRecord;
use async_trait::async_trait;

/// Trait for publishing raw sensor records onto the ingest topic.
///
/// Implementations serialize the record to its wire form and publish it to
/// the message broker, returning an error if the broker does not confirm
/// acceptance.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait RawRecordProducer: Send + Sync {
    async fn publish(&self, record: &SensorRecord) -> DomainResult<()>;
}

/// Trait for publishing processed (unit-converted) records downstream.
///
/// Success means the broker has durably accepted the message; callers gate
/// acknowledgment of the inbound message on this.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ProcessedRecordProducer: Send + Sync {
    async fn publish(&self, record: &SensorRecord) -> DomainResult<()>;
}
