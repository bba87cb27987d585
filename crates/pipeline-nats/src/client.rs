use crate::traits::JetStreamPublisher;
use anyhow::{Context, Result};
use async_nats::jetstream::{self, stream::Config as StreamConfig};
use async_trait::async_trait;
use tracing::{debug, info};

pub struct NatsClient {
    client: async_nats::Client,
    jetstream: jetstream::Context,
}

impl NatsClient {
    pub async fn connect(url: &str, timeout: std::time::Duration) -> Result<Self> {
        info!("Connecting to NATS at {} (timeout={:?})", url, timeout);

        let client = async_nats::ConnectOptions::new()
            .connection_timeout(timeout)
            .connect(url)
            .await
            .context("Failed to connect to NATS")?;

        let jetstream = jetstream::new(client.clone());

        info!("Successfully connected to NATS");
        Ok(Self { client, jetstream })
    }

    /// Create the stream backing a telemetry topic if it does not exist yet.
    ///
    /// The stream accepts every subject one level under its own name, which is
    /// where the record producers publish.
    pub async fn ensure_stream(&self, stream_name: &str) -> Result<()> {
        info!("Ensuring stream '{}' exists", stream_name);

        let stream_config = StreamConfig {
            name: stream_name.to_string(),
            subjects: vec![format!("{}.*", stream_name)],
            description: Some("Stream for sensor telemetry records".to_string()),
            ..Default::default()
        };

        match self.jetstream.get_stream(stream_name).await {
            Ok(_) => {
                info!("Stream '{}' already exists", stream_name);
            }
            Err(_) => {
                self.jetstream
                    .create_stream(stream_config)
                    .await
                    .context("Failed to create stream")?;
                info!("Created stream '{}'", stream_name);
            }
        }

        Ok(())
    }

    pub fn jetstream(&self) -> &jetstream::Context {
        &self.jetstream
    }

    pub async fn close(self) {
        info!("Closing NATS connection");
        if let Err(e) = self.client.drain().await {
            tracing::warn!(error = %e, "Error draining NATS connection");
        }
    }
}

/// Concrete [`JetStreamPublisher`] backed by a JetStream context.
///
/// Shared read-only across all in-flight message handlers; the context is
/// internally synchronized and safe for concurrent publishes.
pub struct NatsJetStreamPublisher {
    jetstream: jetstream::Context,
}

impl NatsJetStreamPublisher {
    pub fn new(jetstream: jetstream::Context) -> Self {
        Self { jetstream }
    }
}

#[async_trait]
impl JetStreamPublisher for NatsJetStreamPublisher {
    async fn publish(&self, subject: String, payload: bytes::Bytes) -> Result<()> {
        debug!(
            subject = %subject,
            size_bytes = payload.len(),
            "Publishing message"
        );

        let ack = self
            .jetstream
            .publish(subject.clone(), payload)
            .await
            .context("Failed to publish message to JetStream")?;

        // Acknowledgment of the inbound message is gated on this confirmation,
        // so the await is not optional.
        ack.await
            .context("Failed to receive JetStream acknowledgment")?;

        debug!(subject = %subject, "Message durably accepted");
        Ok(())
    }
}
