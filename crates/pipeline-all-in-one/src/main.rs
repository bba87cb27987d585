mod config;
mod runner;

use csv_producer::{CsvProducer, CsvProducerConfig};
use pipeline_nats::NatsClient;
use record_viewer::{RecordViewer, RecordViewerConfig};
use runner::Runner;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use transform_worker::{TransformWorker, TransformWorkerConfig};

#[tokio::main]
async fn main() {
    let config = match config::ServiceConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    info!("Starting pipeline-all-in-one service");
    info!("Configuration: {:?}", config);

    if let Err(e) = run(config).await {
        tracing::error!(error = %format!("{:#}", e), "Service failed");
        std::process::exit(1);
    }
}

async fn run(config: config::ServiceConfig) -> anyhow::Result<()> {
    let startup_timeout = Duration::from_secs(config.startup_timeout_secs);

    let nats_client = Arc::new(NatsClient::connect(&config.nats_url, startup_timeout).await?);

    // Both topics must exist before any component attaches to them.
    nats_client.ensure_stream(&config.raw_stream).await?;
    nats_client.ensure_stream(&config.processed_stream).await?;

    let transform_worker = TransformWorker::new(
        nats_client.clone(),
        TransformWorkerConfig {
            raw_stream: config.raw_stream.clone(),
            raw_subject: config::ServiceConfig::subject_filter(&config.raw_stream),
            processed_stream: config.processed_stream.clone(),
            nats_batch_size: config.nats_batch_size,
            nats_batch_wait_secs: config.nats_batch_wait_secs,
        },
    )
    .await?;

    let mut runner = Runner::new()
        .with_process("transform_worker", move |ctx| transform_worker.run(ctx));

    if config.enable_csv_producer {
        let csv_producer = CsvProducer::new(
            nats_client.clone(),
            CsvProducerConfig {
                csv_path: PathBuf::from(&config.csv_path),
                raw_stream: config.raw_stream.clone(),
                publish_delay: Duration::from_millis(config.publish_delay_ms),
            },
        );
        runner = runner.with_process("csv_producer", move |ctx| csv_producer.run(ctx));
    }

    if config.enable_record_viewer {
        let record_viewer = RecordViewer::new(
            nats_client.clone(),
            RecordViewerConfig {
                processed_stream: config.processed_stream.clone(),
                processed_subject: config::ServiceConfig::subject_filter(&config.processed_stream),
                nats_batch_size: config.nats_batch_size,
                nats_batch_wait_secs: config.nats_batch_wait_secs,
            },
        )
        .await?;
        runner = runner.with_process("record_viewer", move |ctx| record_viewer.run(ctx));
    }

    runner
        .with_closer(async move {
            // The worker processes hold clones of the Arc; by the time closers
            // run they have all stopped and dropped theirs.
            match Arc::try_unwrap(nats_client) {
                Ok(client) => client.close().await,
                Err(_) => tracing::warn!("NATS client still shared, skipping drain"),
            }
        })
        .with_closer_timeout(Duration::from_secs(10))
        .run()
        .await
}
