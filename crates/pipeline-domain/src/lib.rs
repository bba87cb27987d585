mod coerce;
mod error;
mod producer;
mod record;

pub use coerce::*;
pub use error::*;
pub use producer::*;
pub use record::*;
