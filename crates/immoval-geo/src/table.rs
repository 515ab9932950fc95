//! Postcode → mean coordinate table built from a delimited dataset.
//!
//! The dataset has one row per locality. Several localities can share a
//! postcode, so rows are grouped by postcode and their coordinates averaged.
//! The result is an approximate placement suitable for display only.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use tracing::{info, warn};

use crate::GeoError;

/// Latitude/longitude in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoCoordinate {
    pub latitude: f64,
    pub longitude: f64,
}

/// Column layout of the dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetFormat {
    pub delimiter: u8,
    /// Column holding `"lat, lon"`.
    pub point_column: String,
    pub postcode_column: String,
}

impl Default for DatasetFormat {
    fn default() -> Self {
        Self {
            delimiter: b';',
            point_column: "Geo Point".to_string(),
            postcode_column: "Post code".to_string(),
        }
    }
}

/// Counts gathered while loading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub rows: usize,
    pub skipped: usize,
    pub postcodes: usize,
}

#[derive(Default)]
struct Accumulator {
    latitude: f64,
    longitude: f64,
    count: usize,
}

/// Read-only postcode lookup table.
#[derive(Debug, Clone, Default)]
pub struct PostcodeTable {
    means: HashMap<u32, GeoCoordinate>,
    summary: LoadSummary,
}

impl PostcodeTable {
    /// Load from a file on disk.
    pub fn from_path(path: &Path, format: &DatasetFormat) -> Result<Self, GeoError> {
        if !path.exists() {
            return Err(GeoError::DatasetNotFound(path.to_path_buf()));
        }
        let file = File::open(path)
            .map_err(|e| GeoError::Csv(format!("{}: {e}", path.display())))?;
        let table = Self::from_reader(file, format)?;
        info!(
            path = %path.display(),
            rows = table.summary.rows,
            skipped = table.summary.skipped,
            postcodes = table.summary.postcodes,
            "loaded geocode dataset"
        );
        Ok(table)
    }

    /// Parse a dataset from any reader.
    ///
    /// Rows whose postcode or point cannot be parsed are skipped and counted.
    pub fn from_reader<R: Read>(reader: R, format: &DatasetFormat) -> Result<Self, GeoError> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(format.delimiter)
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers: StringRecord = reader.headers()?.clone();
        let point_idx = column_index(&headers, &format.point_column)?;
        let postcode_idx = column_index(&headers, &format.postcode_column)?;

        let mut sums: HashMap<u32, Accumulator> = HashMap::new();
        let mut summary = LoadSummary::default();

        for (idx, result) in reader.records().enumerate() {
            summary.rows += 1;
            let row_number = idx + 1;

            let record = match result {
                Ok(rec) => rec,
                Err(e) => {
                    warn!(row = row_number, error = %e, "skipping unreadable geocode row");
                    summary.skipped += 1;
                    continue;
                }
            };

            let postcode = record
                .get(postcode_idx)
                .and_then(|v| v.trim().parse::<u32>().ok());
            let point = record.get(point_idx).and_then(parse_point);

            match (postcode, point) {
                (Some(postcode), Some((latitude, longitude))) => {
                    let acc = sums.entry(postcode).or_default();
                    acc.latitude += latitude;
                    acc.longitude += longitude;
                    acc.count += 1;
                }
                _ => {
                    warn!(row = row_number, "skipping incomplete geocode row");
                    summary.skipped += 1;
                }
            }
        }

        let means: HashMap<u32, GeoCoordinate> = sums
            .into_iter()
            .map(|(postcode, acc)| {
                let n = acc.count as f64;
                (
                    postcode,
                    GeoCoordinate {
                        latitude: acc.latitude / n,
                        longitude: acc.longitude / n,
                    },
                )
            })
            .collect();
        summary.postcodes = means.len();

        Ok(Self { means, summary })
    }

    /// Mean coordinate of every row with exactly this postcode.
    pub fn get(&self, postcode: u32) -> Option<GeoCoordinate> {
        self.means.get(&postcode).copied()
    }

    pub fn len(&self) -> usize {
        self.means.len()
    }

    pub fn is_empty(&self) -> bool {
        self.means.is_empty()
    }

    pub fn summary(&self) -> LoadSummary {
        self.summary
    }
}

/// Split a combined `"lat, lon"` point into its two decimals.
pub fn parse_point(value: &str) -> Option<(f64, f64)> {
    let (lat, lon) = value.split_once(',')?;
    let lat: f64 = lat.trim().parse().ok()?;
    let lon: f64 = lon.trim().parse().ok()?;
    (lat.is_finite() && lon.is_finite()).then_some((lat, lon))
}

fn column_index(headers: &StringRecord, name: &str) -> Result<usize, GeoError> {
    headers
        .iter()
        .position(|h| {
            h.trim_start_matches('\u{feff}')
                .trim()
                .eq_ignore_ascii_case(name.trim())
        })
        .ok_or_else(|| GeoError::MissingColumn(name.to_string()))
}
