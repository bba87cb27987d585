mod processed_record_producer;
mod raw_record_processor;

pub use processed_record_producer::*;
pub use raw_record_processor::*;
