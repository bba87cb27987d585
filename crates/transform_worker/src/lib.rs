pub mod domain;
pub mod nats;
pub mod transform_worker;

pub use domain::*;
pub use nats::*;
pub use transform_worker::*;
