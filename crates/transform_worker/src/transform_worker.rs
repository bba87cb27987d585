use crate::domain::TransformService;
use crate::nats::{create_raw_record_processor, NatsProcessedRecordProducer};
use pipeline_nats::{NatsClient, NatsConsumer, NatsJetStreamPublisher};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

const RAW_CONSUMER_NAME: &str = "transform-worker";

pub struct TransformWorkerConfig {
    /// Stream the raw records are consumed from.
    pub raw_stream: String,
    /// Subject filter for the raw consumer.
    pub raw_subject: String,
    /// Stream the processed records are published to.
    pub processed_stream: String,
    pub nats_batch_size: usize,
    pub nats_batch_wait_secs: u64,
}

/// The transformation stage wired to its broker endpoints: a durable consumer
/// on the raw stream feeding the transform service, which publishes to the
/// processed stream.
pub struct TransformWorker {
    raw_consumer: NatsConsumer,
}

impl TransformWorker {
    pub async fn new(
        nats_client: Arc<NatsClient>,
        config: TransformWorkerConfig,
    ) -> anyhow::Result<Self> {
        info!(
            raw_stream = %config.raw_stream,
            processed_stream = %config.processed_stream,
            "Initializing transform worker"
        );

        let publisher = Arc::new(NatsJetStreamPublisher::new(nats_client.jetstream().clone()));
        let producer = Arc::new(NatsProcessedRecordProducer::new(
            publisher,
            config.processed_stream.clone(),
        ));
        let service = Arc::new(TransformService::new(producer));

        let processor = create_raw_record_processor(service);
        let raw_consumer = NatsConsumer::new(
            nats_client.jetstream(),
            &config.raw_stream,
            RAW_CONSUMER_NAME,
            &config.raw_subject,
            config.nats_batch_size,
            config.nats_batch_wait_secs,
            processor,
        )
        .await?;

        info!("Transform worker initialized");

        Ok(Self { raw_consumer })
    }

    /// Consume and transform until the token is cancelled.
    pub async fn run(self, ctx: CancellationToken) -> anyhow::Result<()> {
        self.raw_consumer.run(ctx).await
    }
}
