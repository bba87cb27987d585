use crate::reader::CsvRow;
use pipeline_domain::{RawRecordProducer, SensorRecord};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Streams a sensor export onto the raw topic, one record per row, with a
/// fixed delay between rows to simulate a live feed.
///
/// Per-row policy mirrors the pipeline's isolation rules: a row that cannot
/// be read or published is logged and skipped, never fatal for the rest of
/// the file.
pub struct CsvStreamer {
    producer: Arc<dyn RawRecordProducer>,
    delay: Duration,
}

impl CsvStreamer {
    pub fn new(producer: Arc<dyn RawRecordProducer>, delay: Duration) -> Self {
        Self { producer, delay }
    }

    /// Publish every row of `path`, returning the number of records that the
    /// broker accepted. Stops early when the token is cancelled.
    pub async fn stream_file(
        &self,
        path: &Path,
        ctx: CancellationToken,
    ) -> anyhow::Result<usize> {
        info!(path = %path.display(), "Streaming sensor export");

        let mut reader = csv::Reader::from_path(path)?;
        let mut published = 0usize;

        for result in reader.deserialize::<CsvRow>() {
            if ctx.is_cancelled() {
                info!("Received shutdown signal, stopping CSV stream");
                break;
            }

            let row = match result {
                Ok(row) => row,
                Err(e) => {
                    warn!(error = %e, "Skipping unreadable CSV row");
                    continue;
                }
            };

            let record = SensorRecord::from(row);

            match self.producer.publish(&record).await {
                Ok(()) => {
                    published += 1;
                    info!(
                        profile_name = ?record.profile_name,
                        time = ?record.time,
                        "Published raw record"
                    );
                }
                Err(e) => {
                    error!(
                        error = %e,
                        profile_name = ?record.profile_name,
                        "Failed to publish raw record"
                    );
                }
            }

            tokio::select! {
                _ = ctx.cancelled() => {
                    info!("Received shutdown signal, stopping CSV stream");
                    break;
                }
                _ = tokio::time::sleep(self.delay) => {}
            }
        }

        info!(published, "Finished streaming sensor export");
        Ok(published)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pipeline_domain::{DomainError, MockRawRecordProducer};
    use std::io::Write;

    fn export_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[tokio::test]
    async fn test_stream_file_publishes_every_row() {
        // Arrange
        let file = export_file(
            "time,profileName,temperature,humidity,pressure\n\
             1.6e9,kitchen,20,45,100\n\
             1.6e9,attic,21,,101\n",
        );

        let mut mock_producer = MockRawRecordProducer::new();
        mock_producer
            .expect_publish()
            .times(2)
            .returning(|_| Ok(()));

        let streamer = CsvStreamer::new(Arc::new(mock_producer), Duration::from_millis(0));

        // Act
        let published = streamer
            .stream_file(file.path(), CancellationToken::new())
            .await
            .unwrap();

        // Assert - the incomplete attic row is still published; filtering
        // happens in the transform stage
        assert_eq!(published, 2);
    }

    #[tokio::test]
    async fn test_stream_file_renames_profile_column() {
        // Arrange
        let file = export_file(
            "time,profileName,temperature,humidity,pressure\n1.6e9,kitchen,20,45,100\n",
        );

        let mut mock_producer = MockRawRecordProducer::new();
        mock_producer
            .expect_publish()
            .withf(|record: &SensorRecord| record.profile_name.as_deref() == Some("kitchen"))
            .times(1)
            .returning(|_| Ok(()));

        let streamer = CsvStreamer::new(Arc::new(mock_producer), Duration::from_millis(0));

        // Act
        let published = streamer
            .stream_file(file.path(), CancellationToken::new())
            .await
            .unwrap();

        // Assert
        assert_eq!(published, 1);
    }

    #[tokio::test]
    async fn test_stream_file_continues_after_publish_failure() {
        // Arrange
        let file = export_file(
            "time,profileName,temperature,humidity,pressure\n\
             1.6e9,kitchen,20,45,100\n\
             1.6e9,attic,21,50,101\n",
        );

        let mut mock_producer = MockRawRecordProducer::new();
        let mut calls = 0usize;
        mock_producer.expect_publish().times(2).returning(move |_| {
            calls += 1;
            if calls == 1 {
                Err(DomainError::PublishError(anyhow::anyhow!("broker down")))
            } else {
                Ok(())
            }
        });

        let streamer = CsvStreamer::new(Arc::new(mock_producer), Duration::from_millis(0));

        // Act
        let published = streamer
            .stream_file(file.path(), CancellationToken::new())
            .await
            .unwrap();

        // Assert - only the accepted record counts
        assert_eq!(published, 1);
    }

    #[tokio::test]
    async fn test_stream_file_stops_on_cancellation() {
        // Arrange
        let file = export_file(
            "time,profileName,temperature,humidity,pressure\n\
             1.6e9,kitchen,20,45,100\n\
             1.6e9,attic,21,50,101\n",
        );

        // No publish expected: the token is checked before each row
        let mock_producer = MockRawRecordProducer::new();
        let streamer = CsvStreamer::new(Arc::new(mock_producer), Duration::from_millis(0));

        let ctx = CancellationToken::new();
        ctx.cancel();

        // Act
        let published = streamer.stream_file(file.path(), ctx).await.unwrap();

        // Assert
        assert_eq!(published, 0);
    }

    #[tokio::test]
    async fn test_stream_file_missing_file_is_error() {
        let mock_producer = MockRawRecordProducer::new();
        let streamer = CsvStreamer::new(Arc::new(mock_producer), Duration::from_millis(0));

        let result = streamer
            .stream_file(Path::new("/nonexistent/Labels.csv"), CancellationToken::new())
            .await;

        assert!(result.is_err());
    }
}
