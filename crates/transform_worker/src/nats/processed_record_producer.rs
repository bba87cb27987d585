use anyhow::Context;
use async_trait::async_trait;
use pipeline_domain::{DomainResult, ProcessedRecordProducer, SensorRecord};
use pipeline_nats::JetStreamPublisher;
use std::sync::Arc;
use tracing::{debug, info};

/// NATS JetStream producer for processed sensor records.
///
/// Encodes the record to its wire form and publishes it under the processed
/// stream's subject; returns only after the stream confirms acceptance.
pub struct NatsProcessedRecordProducer {
    jetstream: Arc<dyn JetStreamPublisher>,
    base_subject: String,
}

impl NatsProcessedRecordProducer {
    pub fn new(jetstream: Arc<dyn JetStreamPublisher>, base_subject: String) -> Self {
        info!(
            "Created NatsProcessedRecordProducer with base subject: {}",
            base_subject
        );
        Self {
            jetstream,
            base_subject,
        }
    }
}

#[async_trait]
impl ProcessedRecordProducer for NatsProcessedRecordProducer {
    async fn publish(&self, record: &SensorRecord) -> DomainResult<()> {
        let payload = record.encode()?;

        let subject = format!("{}.records", self.base_subject);

        debug!(
            subject = %subject,
            profile_name = ?record.profile_name,
            size_bytes = payload.len(),
            "Publishing processed record"
        );

        self.jetstream
            .publish(subject.clone(), payload.into())
            .await
            .context("Failed to publish and acknowledge message")?;

        debug!(
            subject = %subject,
            profile_name = ?record.profile_name,
            "Successfully published processed record"
        );

        Ok(())
    }
}
