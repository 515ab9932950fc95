//! Postcode geocoding: static CSV dataset, mean coordinate per postcode.

mod error;
pub mod resolver;
pub mod table;

pub use error::GeoError;
pub use resolver::GeocodeResolver;
pub use table::{DatasetFormat, GeoCoordinate, LoadSummary, PostcodeTable};
