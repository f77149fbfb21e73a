#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Core record and aggregate row types for the crime atlas.

use serde::{Deserialize, Serialize};

/// One crime incident, as parsed from a row of the source CSV.
///
/// The four well-known columns are typed. Any additional columns from the
/// source file are carried through unchanged as string values and flatten
/// back into the JSON object on serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Incident {
    /// City where the incident occurred.
    pub city: String,
    /// Crime type label, exactly as it appears in the source file.
    pub crime_type: String,
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// Remaining columns, keyed by header name.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Grouped incident count by `(city, crime_type)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub city: String,
    pub crime_type: String,
    pub count: u64,
}

/// Grouped incident count by `(city, latitude, longitude)`, for map
/// count markers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountRow {
    pub city: String,
    pub latitude: f64,
    pub longitude: f64,
    pub count: u64,
}
