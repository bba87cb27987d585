mod raw_record_producer;

pub use raw_record_producer::*;
