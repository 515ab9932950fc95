//! Lazily loaded, shareable postcode resolver.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use tracing::debug;

use crate::GeoError;
use crate::table::{DatasetFormat, GeoCoordinate, PostcodeTable};

/// Owns the postcode table and loads it on first lookup.
///
/// The dataset is read at most once per resolver; the outcome of that read
/// (table or error) is kept for the resolver's lifetime. After loading the
/// table is read-only, so `&GeocodeResolver` can be shared across threads.
pub struct GeocodeResolver {
    path: PathBuf,
    format: DatasetFormat,
    table: OnceLock<Result<PostcodeTable, GeoError>>,
}

impl GeocodeResolver {
    /// Resolver over the dataset at `path`. Nothing is read until first use.
    pub fn new(path: impl Into<PathBuf>, format: DatasetFormat) -> Self {
        Self {
            path: path.into(),
            format,
            table: OnceLock::new(),
        }
    }

    /// Resolver over an already built table.
    pub fn from_table(table: PostcodeTable) -> Self {
        Self {
            path: PathBuf::new(),
            format: DatasetFormat::default(),
            table: OnceLock::from(Ok(table)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_loaded(&self) -> bool {
        self.table.get().is_some()
    }

    /// The loaded table, loading it now if this is the first call.
    pub fn table(&self) -> Result<&PostcodeTable, GeoError> {
        self.table
            .get_or_init(|| PostcodeTable::from_path(&self.path, &self.format))
            .as_ref()
            .map_err(Clone::clone)
    }

    /// Mean coordinate for `postcode`, or `None` when the table lacks it.
    ///
    /// Errors only when the dataset itself could not be loaded.
    pub fn resolve(&self, postcode: u32) -> Result<Option<GeoCoordinate>, GeoError> {
        let found = self.table()?.get(postcode);
        debug!(postcode, found = found.is_some(), "geocode lookup");
        Ok(found)
    }
}
