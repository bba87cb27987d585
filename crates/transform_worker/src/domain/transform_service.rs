use crate::domain::convert_units;
use pipeline_domain::{DomainResult, ProcessedRecordProducer, SensorRecord};
use std::sync::Arc;
use tracing::{debug, error, instrument};

const PAYLOAD_EXCERPT_LEN: usize = 256;

/// Outcome of processing one inbound payload.
///
/// Every variant means the inbound message should be acknowledged; the
/// leave-for-redelivery cases are the `Err` side of
/// [`TransformService::process_payload`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformOutcome {
    /// Converted record durably published downstream.
    Published,
    /// Payload was not a decodable document. Poison messages are dropped,
    /// not retried: redelivery would see the same bytes forever.
    DroppedMalformed,
    /// Record is missing at least one measurement. An expected, common case
    /// (a sensor that reports no pressure), not a failure.
    DroppedIncomplete,
}

/// Domain service that turns one raw payload into at most one processed
/// record.
///
/// Flow, per message:
/// 1. Decode the payload into a [`SensorRecord`]
/// 2. Drop the record if incomplete
/// 3. Convert units (Celsius -> Fahrenheit, kPa -> psi)
/// 4. Publish via the producer trait, which encodes and awaits durable
///    acceptance
///
/// The service holds no mutable state; one `Arc` is safely shared across any
/// number of concurrently processed messages. The ack/nak classification is
/// centralized here: `Ok(outcome)` means ack (even for drops), `Err` means
/// leave for redelivery.
pub struct TransformService {
    producer: Arc<dyn ProcessedRecordProducer>,
}

impl TransformService {
    pub fn new(producer: Arc<dyn ProcessedRecordProducer>) -> Self {
        Self { producer }
    }

    #[instrument(skip(self, payload), fields(payload_size = payload.len()))]
    pub async fn process_payload(&self, payload: &[u8]) -> DomainResult<TransformOutcome> {
        let record = match SensorRecord::decode(payload) {
            Ok(record) => record,
            Err(e) => {
                error!(
                    error = %e,
                    payload = %payload_excerpt(payload),
                    "dropping undecodable payload"
                );
                return Ok(TransformOutcome::DroppedMalformed);
            }
        };

        if !record.is_complete() {
            debug!(
                profile_name = ?record.profile_name,
                time = ?record.time,
                "dropping incomplete record"
            );
            return Ok(TransformOutcome::DroppedIncomplete);
        }

        // ConversionFault propagates: the decision to retry belongs to the
        // processor, not to a catch-and-discard here.
        let converted = convert_units(&record)?;

        self.producer.publish(&converted).await?;

        debug!(
            profile_name = ?converted.profile_name,
            time = ?converted.time,
            "published processed record"
        );

        Ok(TransformOutcome::Published)
    }
}

fn payload_excerpt(payload: &[u8]) -> String {
    let end = payload.len().min(PAYLOAD_EXCERPT_LEN);
    String::from_utf8_lossy(&payload[..end]).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pipeline_domain::{DomainError, MockProcessedRecordProducer};

    #[tokio::test]
    async fn test_process_payload_success() {
        // Arrange
        let mut mock_producer = MockProcessedRecordProducer::new();

        mock_producer
            .expect_publish()
            .withf(|record: &SensorRecord| {
                record.time == Some(1_600_000_000)
                    && record.profile_name.as_deref() == Some("kitchen")
                    && record.temperature == Some(68.0)
                    && record.humidity == Some(45.0)
                    && record.pressure == Some(14.5033)
            })
            .times(1)
            .return_once(|_| Ok(()));

        let service = TransformService::new(Arc::new(mock_producer));

        let payload =
            br#"{"time":"1.6e9","profileName":"kitchen","temperature":"20","humidity":"45","pressure":"100"}"#;

        // Act
        let result = service.process_payload(payload).await;

        // Assert
        assert!(matches!(result, Ok(TransformOutcome::Published)));
    }

    #[tokio::test]
    async fn test_process_payload_incomplete_record_is_dropped() {
        // Arrange - producer must not be called
        let mock_producer = MockProcessedRecordProducer::new();
        let service = TransformService::new(Arc::new(mock_producer));

        let payload = br#"{"time":1600000000,"profile_name":"kitchen","temperature":20,"pressure":100}"#;

        // Act
        let result = service.process_payload(payload).await;

        // Assert
        assert!(matches!(result, Ok(TransformOutcome::DroppedIncomplete)));
    }

    #[tokio::test]
    async fn test_process_payload_malformed_is_dropped_not_error() {
        // Arrange
        let mock_producer = MockProcessedRecordProducer::new();
        let service = TransformService::new(Arc::new(mock_producer));

        // Act
        let result = service.process_payload(b"definitely not json").await;

        // Assert
        assert!(matches!(result, Ok(TransformOutcome::DroppedMalformed)));
    }

    #[tokio::test]
    async fn test_process_payload_conversion_fault_propagates() {
        // Arrange - "NaN" survives lenient decoding but is not convertible
        let mock_producer = MockProcessedRecordProducer::new();
        let service = TransformService::new(Arc::new(mock_producer));

        let payload = br#"{"temperature":"NaN","humidity":45,"pressure":100}"#;

        // Act
        let result = service.process_payload(payload).await;

        // Assert
        assert!(matches!(
            result,
            Err(DomainError::ConversionFault { .. })
        ));
    }

    #[tokio::test]
    async fn test_process_payload_publish_failure_propagates() {
        // Arrange
        let mut mock_producer = MockProcessedRecordProducer::new();

        mock_producer
            .expect_publish()
            .times(1)
            .return_once(|_| Err(DomainError::PublishError(anyhow::anyhow!("broker down"))));

        let service = TransformService::new(Arc::new(mock_producer));

        let payload = br#"{"temperature":20,"humidity":45,"pressure":100}"#;

        // Act
        let result = service.process_payload(payload).await;

        // Assert
        assert!(matches!(result, Err(DomainError::PublishError(_))));
    }

    #[tokio::test]
    async fn test_process_payload_does_not_require_metadata() {
        // Arrange
        let mut mock_producer = MockProcessedRecordProducer::new();

        mock_producer
            .expect_publish()
            .withf(|record: &SensorRecord| {
                record.time.is_none() && record.profile_name.is_none()
            })
            .times(1)
            .return_once(|_| Ok(()));

        let service = TransformService::new(Arc::new(mock_producer));

        let payload = br#"{"temperature":20,"humidity":45,"pressure":100}"#;

        // Act
        let result = service.process_payload(payload).await;

        // Assert
        assert!(matches!(result, Ok(TransformOutcome::Published)));
    }

    #[tokio::test]
    async fn test_process_payload_converts_exactly_once_per_message() {
        // Regression guard: running the stage twice on the same inbound
        // payload must publish the same converted values both times.
        let mut mock_producer = MockProcessedRecordProducer::new();

        mock_producer
            .expect_publish()
            .withf(|record: &SensorRecord| {
                record.temperature == Some(68.0) && record.pressure == Some(14.5033)
            })
            .times(2)
            .returning(|_| Ok(()));

        let service = TransformService::new(Arc::new(mock_producer));

        let payload = br#"{"temperature":20,"humidity":45,"pressure":100}"#;

        // Act
        let first = service.process_payload(payload).await;
        let second = service.process_payload(payload).await;

        // Assert - withf on the mock verifies both publishes saw the
        // single-application values
        assert!(matches!(first, Ok(TransformOutcome::Published)));
        assert!(matches!(second, Ok(TransformOutcome::Published)));
    }
}
