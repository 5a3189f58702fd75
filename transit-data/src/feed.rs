//! Serde models of the agency's JSON feeds.
//!
//! Unknown fields are ignored. A missing or mistyped field fails decoding.

use serde::Deserialize;

use crate::FeedError;

/// Stops document, optionally carrying the routes of every line.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StopsDocument {
    /// Every stop served by the agency.
    pub stops: Vec<StopRecord>,
    /// Ordered stop ids per line. Absent in some deployments.
    #[serde(default)]
    pub routes: Vec<RouteRecord>,
}

/// One stop as published in the feed.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StopRecord {
    /// Agency stop id.
    pub id: u32,
    /// Display name.
    pub name: String,
    /// `[latitude, longitude]`.
    pub position: [f64; 2],
}

/// Ordered stop ids for the line with the same id.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RouteRecord {
    /// Id of the line this route belongs to.
    pub id: u32,
    /// Stop ids in travel order.
    pub stops: Vec<u32>,
}

/// Lines document.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LinesDocument {
    /// Every line run by the agency.
    pub lines: Vec<LineRecord>,
}

/// One bus line as published in the feed.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LineRecord {
    /// Agency line id.
    pub id: u32,
    /// Whether the line currently runs.
    pub is_active: bool,
    /// Full public name.
    pub long_name: String,
    /// Abbreviated name.
    pub short_name: String,
}

impl StopsDocument {
    /// Decode a stops document read from `location`.
    pub fn from_slice(bytes: &[u8], location: &str) -> Result<Self, FeedError> {
        decode(bytes, location)
    }
}

impl LinesDocument {
    /// Decode a lines document read from `location`.
    pub fn from_slice(bytes: &[u8], location: &str) -> Result<Self, FeedError> {
        decode(bytes, location)
    }
}

fn decode<T: for<'de> Deserialize<'de>>(bytes: &[u8], location: &str) -> Result<T, FeedError> {
    serde_json::from_slice(bytes).map_err(|source| FeedError::Decode {
        location: location.to_owned(),
        source,
    })
}
