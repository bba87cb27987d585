use anyhow::Context;
use async_trait::async_trait;
use pipeline_domain::{DomainResult, RawRecordProducer, SensorRecord};
use pipeline_nats::JetStreamPublisher;
use std::sync::Arc;
use tracing::{debug, info};

/// NATS JetStream producer for raw sensor records.
pub struct NatsRawRecordProducer {
    jetstream: Arc<dyn JetStreamPublisher>,
    base_subject: String,
}

impl NatsRawRecordProducer {
    pub fn new(jetstream: Arc<dyn JetStreamPublisher>, base_subject: String) -> Self {
        info!(
            "Created NatsRawRecordProducer with base subject: {}",
            base_subject
        );
        Self {
            jetstream,
            base_subject,
        }
    }
}

#[async_trait]
impl RawRecordProducer for NatsRawRecordProducer {
    async fn publish(&self, record: &SensorRecord) -> DomainResult<()> {
        let payload = record.encode()?;

        let subject = format!("{}.records", self.base_subject);

        debug!(
            subject = %subject,
            profile_name = ?record.profile_name,
            size_bytes = payload.len(),
            "Publishing raw record"
        );

        self.jetstream
            .publish(subject.clone(), payload.into())
            .await
            .context("Failed to publish and acknowledge message")?;

        debug!(
            subject = %subject,
            profile_name = ?record.profile_name,
            "Successfully published raw record"
        );

        Ok(())
    }
}
