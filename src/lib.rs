//! AutoShape: batch ground-track footprint pipeline for satellite
//! imaging missions.
//!
//! The pipeline ingests per-orbit ephemeris point collections ("coasting
//! arcs"), assigns orbit numbers from a table of subpoint daylight
//! intervals, splits the stream into per-orbit segments, derives
//! time-ordered ground-track polylines, buffers them into camera
//! field-of-view footprints and finally exports viewer-ready KMZ overlays
//! plus a calendar-import CSV for ground operations.
//!
//! Geometry storage and derivation are delegated to a [GeoEngine]
//! implementation; [FlatEngine] ships with the crate and persists
//! collections as WKT + CSV attribute tables.
use std::path::PathBuf;

use thiserror::Error;

mod collection;
mod orbit;

pub mod calendar;
pub mod daylight;
pub mod engine;
pub mod illumination;
pub mod mission;
pub mod pipeline;
pub mod timefmt;

pub use collection::{FeatureCollection, FeatureGeometry, FeatureRow};
pub use engine::{flat::FlatEngine, GeoEngine};
pub use orbit::OrbitNumber;

pub mod prelude {
    pub use crate::calendar::CalendarExporter;
    pub use crate::collection::{FeatureCollection, FeatureGeometry, FeatureRow};
    pub use crate::engine::{flat::FlatEngine, GeoEngine};
    pub use crate::illumination::{IlluminationInterval, IlluminationScanner};
    pub use crate::mission::MissionLayout;
    pub use crate::orbit::OrbitNumber;
    pub use crate::timefmt::TimeFormat;
    pub use crate::Error;
}

/// Name of the per-point timestamp attribute carried by raw coasting arcs.
pub const TIME_FIELD: &str = "TA_DATE";

/// Name of the mutable orbit label attribute.
pub const ORBIT_FIELD: &str = "OrbitNum";

/// Name of the per-line start time attribute derived by the lines stage.
pub const START_TIME_FIELD: &str = "Start_Time";

/// Name of the request time attribute added by the relabel stage and
/// rendered into overlay descriptions.
pub const REQ_TIME_FIELD: &str = "ReqTime";

#[derive(Debug, Error)]
pub enum Error {
    #[error("file i/o error")]
    Io(#[from] std::io::Error),
    #[error("timestamp parsing error")]
    Format(#[from] timefmt::FormatError),
    #[error("csv error")]
    Csv(#[from] csv::Error),
    #[error("kml rendering error")]
    Kml(#[from] kml::Error),
    #[error("kmz archive error")]
    Zip(#[from] zip::result::ZipError),
    #[error("wkt geometry error: {0}")]
    Wkt(String),
    #[error("collection has no \"{0}\" attribute")]
    MissingField(String),
    #[error("segment holds {0} point(s), 2 at least are required for a track line")]
    InsufficientPoints(usize),
    #[error("no points labeled \"Orbit {0}\"")]
    NoPointsForOrbit(OrbitNumber),
    #[error("interval tables do not match: {0} start(s) vs {1} end(s)")]
    LengthMismatch(usize, usize),
    #[error("directory \"{}\" does not exist: run the previous stage first", .0.display())]
    MissingDirectory(PathBuf),
    #[error("no raw coasting arcs found under \"{}\"", .0.display())]
    NoArcsFound(PathBuf),
    #[error("invalid orbit identifier \"{0}\"")]
    InvalidOrbitId(String),
    #[error("illumination intervals are not increasing at row {0}")]
    UnorderedIntervals(usize),
}

pub type Result<T> = std::result::Result<T, Error>;
