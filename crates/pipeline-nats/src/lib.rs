mod client;
mod consumer;
mod traits;

pub use client::{NatsClient, NatsJetStreamPublisher};
pub use consumer::{Disposition, MessageProcessor, NatsConsumer};
pub use traits::JetStreamPublisher;

#[cfg(any(test, feature = "testing"))]
pub use traits::MockJetStreamPublisher;
