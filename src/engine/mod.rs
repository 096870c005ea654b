//! The geometry engine seam.
//!
//! The pipeline treats geometry storage and derivation as an external
//! collaborator behind this narrow trait: collections in and out of
//! storage, point-to-timeline conversion, footprint buffering and the
//! final KMZ rendering. Attribute-table edits are plain
//! [crate::FeatureCollection] methods and never hit the engine.
//!
//! [flat::FlatEngine] is the shipped implementation. Tests run the whole
//! pipeline against it over scratch directories; deployments with a
//! full-blown GIS stack can substitute their own implementation.
use std::path::Path;

use crate::{FeatureCollection, Result};

pub mod flat;

pub trait GeoEngine {
    /// Reads one persisted feature collection.
    fn read_collection(&self, path: &Path) -> Result<FeatureCollection>;

    /// Persists one feature collection under `path`.
    fn write_collection(&self, path: &Path, fc: &FeatureCollection) -> Result<()>;

    /// Derives the time-ordered ground-track polyline of a point
    /// collection, tagging it with start time and kinematic attributes
    /// (distance, duration, speed, heading). `time_field` holds
    /// per-point stamps in the Ephemeris representation.
    fn points_to_timeline(&self, fc: &FeatureCollection, time_field: &str)
        -> Result<FeatureCollection>;

    /// Buffers every polyline row into a footprint polygon of
    /// `width_km` half-width on both sides, flat line caps, and
    /// dissolves the output per distinct `dissolve_field` value.
    fn buffer_timeline(
        &self,
        fc: &FeatureCollection,
        width_km: f64,
        dissolve_field: &str,
    ) -> Result<FeatureCollection>;

    /// Renders a polygon collection as a `.kmz` map overlay.
    fn export_kmz(&self, fc: &FeatureCollection, path: &Path, name: &str) -> Result<()>;
}
