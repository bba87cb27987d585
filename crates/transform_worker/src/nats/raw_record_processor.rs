use crate::domain::{TransformOutcome, TransformService};
use bytes::Bytes;
use pipeline_nats::{Disposition, MessageProcessor};
use std::sync::Arc;
use tracing::{debug, error};

/// Create a [`MessageProcessor`] that feeds raw payloads through the
/// transform service and maps its result onto an acknowledgment decision.
///
/// `Ok` outcomes (published, or deliberately dropped) acknowledge the inbound
/// message. Retryable errors (conversion fault, encode or publish failure)
/// leave it for the broker's redelivery policy; a permanent error is
/// acknowledged and dropped like any other poison message.
pub fn create_raw_record_processor(service: Arc<TransformService>) -> MessageProcessor {
    Box::new(move |payload: Bytes| {
        let service = Arc::clone(&service);

        Box::pin(async move {
            match service.process_payload(&payload).await {
                Ok(outcome) => {
                    match outcome {
                        TransformOutcome::Published => {
                            debug!("record published, acknowledging")
                        }
                        TransformOutcome::DroppedMalformed => {
                            debug!("poison message dropped, acknowledging")
                        }
                        TransformOutcome::DroppedIncomplete => {
                            debug!("incomplete record dropped, acknowledging")
                        }
                    }
                    Disposition::Ack
                }
                Err(e) if e.is_retryable() => {
                    error!(error = %e, "record processing failed, leaving for redelivery");
                    Disposition::Nak(Some(e.to_string()))
                }
                Err(e) => {
                    error!(error = %e, "record processing failed permanently, dropping");
                    Disposition::Ack
                }
            }
        })
    })
}
