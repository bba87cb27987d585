mod transform_service;
mod units;

pub use transform_service::*;
pub use units::*;
