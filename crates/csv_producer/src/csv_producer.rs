use crate::nats::NatsRawRecordProducer;
use crate::streamer::CsvStreamer;
use pipeline_nats::{NatsClient, NatsJetStreamPublisher};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;

pub struct CsvProducerConfig {
    /// Path to the sensor export file.
    pub csv_path: PathBuf,
    /// Stream the raw records are published to.
    pub raw_stream: String,
    /// Delay between rows, simulating a live sensor feed.
    pub publish_delay: Duration,
}

/// The ingestion collaborator: replays a CSV sensor export onto the raw
/// stream and exits when the file is exhausted or the token is cancelled.
pub struct CsvProducer {
    streamer: CsvStreamer,
    csv_path: PathBuf,
}

impl CsvProducer {
    pub fn new(nats_client: Arc<NatsClient>, config: CsvProducerConfig) -> Self {
        info!(
            csv_path = %config.csv_path.display(),
            raw_stream = %config.raw_stream,
            "Initializing CSV producer"
        );

        let publisher = Arc::new(NatsJetStreamPublisher::new(nats_client.jetstream().clone()));
        let producer = Arc::new(NatsRawRecordProducer::new(publisher, config.raw_stream));
        let streamer = CsvStreamer::new(producer, config.publish_delay);

        Self {
            streamer,
            csv_path: config.csv_path,
        }
    }

    pub async fn run(self, ctx: CancellationToken) -> anyhow::Result<()> {
        self.streamer.stream_file(&self.csv_path, ctx).await?;
        Ok(())
    }
}
