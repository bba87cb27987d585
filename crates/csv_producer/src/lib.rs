mod csv_producer;
pub mod nats;
mod reader;
mod streamer;

pub use csv_producer::*;
pub use nats::*;
pub use reader::*;
pub use streamer::*;
