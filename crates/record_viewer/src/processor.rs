use bytes::Bytes;
use pipeline_domain::SensorRecord;
use pipeline_nats::{Disposition, MessageProcessor};
use tracing::{error, info};

/// Create a [`MessageProcessor`] that decodes processed records and logs the
/// finished values.
///
/// Everything is acknowledged: the viewer is a terminal consumer and a
/// payload it cannot decode will not decode on redelivery either.
pub fn create_record_viewer_processor() -> MessageProcessor {
    Box::new(|payload: Bytes| {
        Box::pin(async move {
            match SensorRecord::decode(&payload) {
                Ok(record) => {
                    info!(
                        time = ?record.time,
                        location = ?record.profile_name,
                        temperature_f = ?record.temperature,
                        humidity_pct = ?record.humidity,
                        pressure_psi = ?record.pressure,
                        "Processed record"
                    );
                }
                Err(e) => {
                    error!(error = %e, "Dropping undecodable processed record");
                }
            }
            Disposition::Ack
        })
    })
}
