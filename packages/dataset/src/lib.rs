#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! In-memory dataset store for crime incident records.
//!
//! Parses the source CSV into a [`Dataset`] and hands out immutable
//! snapshots through [`DatasetStore`]. An upload replaces the whole table
//! in a single `Arc` swap, so concurrent readers observe either the old or
//! the new dataset, never a mix of rows from both.

use std::io::Read;
use std::path::Path;
use std::sync::{Arc, RwLock};

use crime_atlas_models::Incident;
use thiserror::Error;

/// Column headers that every source file must carry.
const REQUIRED_COLUMNS: [&str; 4] = ["city", "crime_type", "latitude", "longitude"];

/// Errors that can occur while loading a dataset.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// Source file could not be opened or read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV structure was malformed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A required column is absent from the header row.
    #[error("missing required column '{name}'")]
    MissingColumn {
        /// The absent column header.
        name: &'static str,
    },

    /// A coordinate cell did not parse as a number.
    #[error("invalid {column} value '{value}' on line {line}")]
    InvalidCoordinate {
        /// Which coordinate column failed.
        column: &'static str,
        /// The offending cell contents.
        value: String,
        /// 1-based line number in the source file.
        line: u64,
    },
}

/// An ordered, immutable collection of [`Incident`] records.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<Incident>,
}

impl Dataset {
    /// Wraps an already-parsed record collection.
    #[must_use]
    pub const fn new(records: Vec<Incident>) -> Self {
        Self { records }
    }

    /// Parses the CSV file at `path` into a dataset.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError`] if the file cannot be opened or does not
    /// parse as incident records.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Parses CSV text from any reader into a dataset.
    ///
    /// The header row drives column mapping: the four required columns
    /// become typed fields and every other column passes through as a
    /// string value keyed by its trimmed header.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::MissingColumn`] if a required header is
    /// absent, [`DatasetError::InvalidCoordinate`] if a latitude or
    /// longitude cell does not parse, or [`DatasetError::Csv`] for
    /// structural CSV failures.
    pub fn from_reader(reader: impl Read) -> Result<Self, DatasetError> {
        let mut csv_reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

        let headers: Vec<String> = csv_reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_owned())
            .collect();

        for name in REQUIRED_COLUMNS {
            if !headers.iter().any(|h| h == name) {
                return Err(DatasetError::MissingColumn { name });
            }
        }

        let mut records = Vec::new();

        for result in csv_reader.records() {
            let record = result?;
            let line = record.position().map_or(0, csv::Position::line);

            let mut city = None;
            let mut crime_type = None;
            let mut latitude = None;
            let mut longitude = None;
            let mut extra = serde_json::Map::new();

            for (i, header) in headers.iter().enumerate() {
                let value = record.get(i).unwrap_or("").trim();
                match header.as_str() {
                    "city" => city = Some(value.to_owned()),
                    "crime_type" => crime_type = Some(value.to_owned()),
                    "latitude" => latitude = Some(parse_coordinate("latitude", value, line)?),
                    "longitude" => longitude = Some(parse_coordinate("longitude", value, line)?),
                    _ => {
                        extra.insert(
                            header.clone(),
                            serde_json::Value::String(value.to_owned()),
                        );
                    }
                }
            }

            records.push(Incident {
                city: city.unwrap_or_default(),
                crime_type: crime_type.unwrap_or_default(),
                latitude: latitude.ok_or(DatasetError::MissingColumn { name: "latitude" })?,
                longitude: longitude.ok_or(DatasetError::MissingColumn { name: "longitude" })?,
                extra,
            });
        }

        log::debug!("Parsed {} incident records", records.len());

        Ok(Self { records })
    }

    /// All records, in source-file order.
    #[must_use]
    pub fn records(&self) -> &[Incident] {
        &self.records
    }

    /// Number of records in the dataset.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn parse_coordinate(column: &'static str, value: &str, line: u64) -> Result<f64, DatasetError> {
    value
        .parse::<f64>()
        .map_err(|_| DatasetError::InvalidCoordinate {
            column,
            value: value.to_owned(),
            line,
        })
}

/// Process-wide handle to the live dataset.
///
/// Readers take an `Arc` snapshot; [`replace`](Self::replace) swaps the
/// `Arc` in a single assignment under a write lock, so a snapshot taken
/// before a swap keeps serving the old table until dropped.
#[derive(Debug)]
pub struct DatasetStore {
    inner: RwLock<Arc<Dataset>>,
}

impl DatasetStore {
    /// Creates a store serving `dataset`.
    #[must_use]
    pub fn new(dataset: Dataset) -> Self {
        Self {
            inner: RwLock::new(Arc::new(dataset)),
        }
    }

    /// Returns a snapshot of the live dataset.
    ///
    /// # Panics
    ///
    /// Panics if the lock is poisoned.
    #[must_use]
    pub fn current(&self) -> Arc<Dataset> {
        Arc::clone(&self.inner.read().expect("dataset lock poisoned"))
    }

    /// Replaces the live dataset. Snapshots taken earlier are unaffected.
    ///
    /// # Panics
    ///
    /// Panics if the lock is poisoned.
    pub fn replace(&self, dataset: Dataset) {
        *self.inner.write().expect("dataset lock poisoned") = Arc::new(dataset);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
city,crime_type,latitude,longitude,year
Chennai,Theft,13.0827,80.2707,2023
Chennai,Assault,13.0827,80.2707,2023
Madurai,Theft,9.9252,78.1198,2022
";

    #[test]
    fn parses_sample_csv() {
        let dataset = Dataset::from_reader(SAMPLE.as_bytes()).unwrap();
        assert_eq!(dataset.len(), 3);

        let first = &dataset.records()[0];
        assert_eq!(first.city, "Chennai");
        assert_eq!(first.crime_type, "Theft");
        assert!((first.latitude - 13.0827).abs() < f64::EPSILON);
        assert!((first.longitude - 80.2707).abs() < f64::EPSILON);
    }

    #[test]
    fn carries_extra_columns_through() {
        let dataset = Dataset::from_reader(SAMPLE.as_bytes()).unwrap();
        let first = &dataset.records()[0];
        assert_eq!(
            first.extra.get("year"),
            Some(&serde_json::Value::String("2023".to_owned()))
        );
    }

    #[test]
    fn serializes_records_flat() {
        let dataset = Dataset::from_reader(SAMPLE.as_bytes()).unwrap();
        let json = serde_json::to_value(&dataset.records()[2]).unwrap();
        assert_eq!(json["city"], "Madurai");
        assert_eq!(json["year"], "2022");
    }

    #[test]
    fn rejects_missing_required_column() {
        let csv = "city,latitude,longitude\nChennai,13.0,80.2\n";
        let err = Dataset::from_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            DatasetError::MissingColumn { name: "crime_type" }
        ));
    }

    #[test]
    fn rejects_unparseable_coordinate() {
        let csv = "city,crime_type,latitude,longitude\nChennai,Theft,north,80.2\n";
        let err = Dataset::from_reader(csv.as_bytes()).unwrap_err();
        match err {
            DatasetError::InvalidCoordinate { column, value, line } => {
                assert_eq!(column, "latitude");
                assert_eq!(value, "north");
                assert_eq!(line, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn header_only_file_is_an_empty_dataset() {
        let csv = "city,crime_type,latitude,longitude\n";
        let dataset = Dataset::from_reader(csv.as_bytes()).unwrap();
        assert!(dataset.is_empty());
    }

    #[test]
    fn replace_swaps_the_whole_dataset() {
        let store = DatasetStore::new(Dataset::from_reader(SAMPLE.as_bytes()).unwrap());
        assert_eq!(store.current().len(), 3);

        let replacement =
            Dataset::from_reader("city,crime_type,latitude,longitude\nSalem,Fraud,11.6,78.1\n".as_bytes())
                .unwrap();
        store.replace(replacement);

        let current = store.current();
        assert_eq!(current.len(), 1);
        assert_eq!(current.records()[0].city, "Salem");
    }

    #[test]
    fn earlier_snapshot_survives_replace() {
        let store = DatasetStore::new(Dataset::from_reader(SAMPLE.as_bytes()).unwrap());
        let before = store.current();

        store.replace(Dataset::default());

        assert_eq!(before.len(), 3);
        assert!(store.current().is_empty());
    }
}
