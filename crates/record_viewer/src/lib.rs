mod processor;
mod record_viewer;

pub use processor::*;
pub use record_viewer::*;
