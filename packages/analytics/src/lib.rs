#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Grouped-count aggregations over the crime dataset.
//!
//! Both aggregations are pure functions of a dataset snapshot: nothing is
//! cached or persisted, every request recomputes from the current table.
//! Rows come out in sorted group-key order, but callers must not depend on
//! ordering.

use std::collections::BTreeMap;

use crime_atlas_dataset::Dataset;
use crime_atlas_models::{CountRow, SummaryRow};

/// Groups records by `(city, crime_type)` and counts each group.
#[must_use]
pub fn summarize(dataset: &Dataset) -> Vec<SummaryRow> {
    let mut groups: BTreeMap<(String, String), u64> = BTreeMap::new();

    for record in dataset.records() {
        *groups
            .entry((record.city.clone(), record.crime_type.clone()))
            .or_insert(0) += 1;
    }

    groups
        .into_iter()
        .map(|((city, crime_type), count)| SummaryRow {
            city,
            crime_type,
            count,
        })
        .collect()
}

/// Groups records by `(city, latitude, longitude)` and counts each group.
///
/// Coordinates are compared by exact bit pattern, so rows whose coordinate
/// cells held identical text in the source file always land in the same
/// group.
#[must_use]
pub fn count_by_location(dataset: &Dataset) -> Vec<CountRow> {
    let mut groups: BTreeMap<(String, u64, u64), (f64, f64, u64)> = BTreeMap::new();

    for record in dataset.records() {
        let key = (
            record.city.clone(),
            record.latitude.to_bits(),
            record.longitude.to_bits(),
        );
        let entry = groups
            .entry(key)
            .or_insert((record.latitude, record.longitude, 0));
        entry.2 += 1;
    }

    groups
        .into_iter()
        .map(|((city, _, _), (latitude, longitude, count))| CountRow {
            city,
            latitude,
            longitude,
            count,
        })
        .collect()
}
