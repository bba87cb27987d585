use crate::processor::create_record_viewer_processor;
use pipeline_nats::{NatsClient, NatsConsumer};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

const VIEWER_CONSUMER_NAME: &str = "record-viewer";

pub struct RecordViewerConfig {
    /// Stream the processed records are consumed from.
    pub processed_stream: String,
    /// Subject filter for the viewer consumer.
    pub processed_subject: String,
    pub nats_batch_size: usize,
    pub nats_batch_wait_secs: u64,
}

/// Terminal consumer that tails the processed stream and logs each finished
/// record.
pub struct RecordViewer {
    consumer: NatsConsumer,
}

impl RecordViewer {
    pub async fn new(
        nats_client: Arc<NatsClient>,
        config: RecordViewerConfig,
    ) -> anyhow::Result<Self> {
        info!(
            processed_stream = %config.processed_stream,
            "Initializing record viewer"
        );

        let processor = create_record_viewer_processor();
        let consumer = NatsConsumer::new(
            nats_client.jetstream(),
            &config.processed_stream,
            VIEWER_CONSUMER_NAME,
            &config.processed_subject,
            config.nats_batch_size,
            config.nats_batch_wait_secs,
            processor,
        )
        .await?;

        info!("Record viewer initialized");

        Ok(Self { consumer })
    }

    pub async fn run(self, ctx: CancellationToken) -> anyhow::Result<()> {
        self.consumer.run(ctx).await
    }
}
