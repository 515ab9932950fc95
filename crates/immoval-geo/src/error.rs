use std::path::PathBuf;

use thiserror::Error;

/// Failure to load the geocode dataset.
///
/// Cloneable so a cached load failure can be handed to every caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeoError {
    #[error("geocode dataset not found: {0}")]
    DatasetNotFound(PathBuf),

    #[error("geocode dataset has no {0:?} column")]
    MissingColumn(String),

    #[error("csv error: {0}")]
    Csv(String),
}

impl From<csv::Error> for GeoError {
    fn from(err: csv::Error) -> Self {
        GeoError::Csv(err.to_string())
    }
}
