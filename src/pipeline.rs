//! Derived geometry stages: point segments to time lines, time lines to
//! buffered footprints, footprint relabeling, and the Google Earth
//! overlay export.
//!
//! Stages are strictly sequential phases: each one fully materializes
//! its output directory before the next starts, and each re-run skips
//! outputs that already exist.
use log::{info, warn};

use crate::engine::GeoEngine;
use crate::mission::MissionLayout;
use crate::timefmt::ephemeris_to_request;
use crate::{
    FeatureCollection, OrbitNumber, Result, ORBIT_FIELD, REQ_TIME_FIELD, START_TIME_FIELD,
    TIME_FIELD,
};

/// Month/day/year copy of the start time, kept for operator readability.
const MDY_TIME_FIELD: &str = "MDYTime";

/// Footprint half-width before the lens swap orbit, in kilometers.
const WIDE_LENS_KM: f64 = 56.0;

/// Footprint half-width after the lens swap orbit, in kilometers.
const NARROW_LENS_KM: f64 = 17.0;

/// Field-of-view buffer width for one orbit: the wide lens applies up to
/// and including the swap orbit itself.
pub fn footprint_width_km(orbit: OrbitNumber, swap_lens: OrbitNumber) -> f64 {
    if orbit <= swap_lens {
        WIDE_LENS_KM
    } else {
        NARROW_LENS_KM
    }
}

/// Lines stage: every arc segment becomes one time-ordered polyline with
/// start time and kinematic attributes.
pub fn run_lines<E: GeoEngine>(engine: &E, layout: &MissionLayout) -> Result<usize> {
    layout.require_dir(&layout.arc_dir())?;
    layout.ensure_dir(&layout.line_dir())?;
    let mut generated = 0;
    for path in layout.collections_in(&layout.arc_dir())? {
        let orbit = OrbitNumber::from_path(&path)?;
        let out = layout.line_file(orbit);
        if out.is_file() {
            info!("\"{}\" exists, not regenerated", out.display());
            continue;
        }
        let segment = engine.read_collection(&path)?;
        let line = engine.points_to_timeline(&segment, TIME_FIELD)?;
        engine.write_collection(&out, &line)?;
        generated += 1;
    }
    info!("lines stage: {} polyline(s) generated", generated);
    Ok(generated)
}

/// Buffers stage: every polyline becomes one footprint polygon, buffered
/// at the lens width in effect for its orbit and dissolved per start time.
pub fn run_buffers<E: GeoEngine>(
    engine: &E,
    layout: &MissionLayout,
    swap_lens: OrbitNumber,
) -> Result<usize> {
    layout.require_dir(&layout.line_dir())?;
    layout.ensure_dir(&layout.buff_dir())?;
    let mut generated = 0;
    for path in layout.collections_in(&layout.line_dir())? {
        let orbit = OrbitNumber::from_path(&path)?;
        let out = layout.buff_file(orbit);
        if out.is_file() {
            info!("\"{}\" exists, not regenerated", out.display());
            continue;
        }
        let width_km = footprint_width_km(orbit, swap_lens);
        let line = engine.read_collection(&path)?;
        let footprint = engine.buffer_timeline(&line, width_km, START_TIME_FIELD)?;
        engine.write_collection(&out, &footprint)?;
        generated += 1;
    }
    info!("buffers stage: {} footprint(s) generated", generated);
    Ok(generated)
}

/// Relabel stage: tags every footprint with its orbit label, the request
/// formatted start time and a verbatim copy of the original stamp, then
/// drops the original attribute.
pub fn run_relabel<E: GeoEngine>(engine: &E, layout: &MissionLayout) -> Result<usize> {
    layout.require_dir(&layout.buff_dir())?;
    let mut relabeled = 0;
    for path in layout.collections_in(&layout.buff_dir())? {
        let orbit = OrbitNumber::from_path(&path)?;
        let mut footprint = engine.read_collection(&path)?;
        if !footprint.has_field(START_TIME_FIELD) {
            // already relabeled on a previous run
            continue;
        }
        relabel(&mut footprint, orbit)?;
        engine.write_collection(&path, &footprint)?;
        relabeled += 1;
    }
    info!("relabel stage: {} footprint(s) retagged", relabeled);
    Ok(relabeled)
}

/// Rewrites one footprint collection's attributes in place.
/// A malformed stamp aborts the whole collection: partially relabeled
/// output would corrupt the downstream overlay and request tooling.
pub fn relabel(footprint: &mut FeatureCollection, orbit: OrbitNumber) -> Result<()> {
    footprint.add_field(ORBIT_FIELD);
    footprint.add_field(REQ_TIME_FIELD);
    footprint.add_field(MDY_TIME_FIELD);
    for index in 0..footprint.len() {
        let start = footprint.required_value(index, START_TIME_FIELD)?.to_string();
        let request = ephemeris_to_request(&start)?;
        footprint.set_value(index, ORBIT_FIELD, &orbit.label());
        footprint.set_value(index, REQ_TIME_FIELD, &request);
        footprint.set_value(index, MDY_TIME_FIELD, &start);
    }
    footprint.delete_field(START_TIME_FIELD)?;
    Ok(())
}

/// Google stage: renders every footprint as a `.kmz` overlay.
/// Run order is checked up front: exporting before the shapes stages
/// have materialized their directories is an operator error.
pub fn run_google<E: GeoEngine>(engine: &E, layout: &MissionLayout) -> Result<usize> {
    layout.require_dir(&layout.processed_dir())?;
    layout.require_dir(&layout.buff_dir())?;
    layout.ensure_dir(&layout.google_dir())?;
    let mut generated = 0;
    for path in layout.collections_in(&layout.buff_dir())? {
        let orbit = OrbitNumber::from_path(&path)?;
        let out = layout.kmz_file(orbit);
        if out.is_file() {
            info!("\"{}\" exists, not regenerated", out.display());
            continue;
        }
        let footprint = engine.read_collection(&path)?;
        if footprint.is_empty() {
            warn!("\"{}\" holds no footprint, overlay skipped", path.display());
            continue;
        }
        engine.export_kmz(&footprint, &out, &format!("Orbit_{}", orbit.zero_padded()))?;
        generated += 1;
    }
    info!("google stage: {} overlay(s) generated", generated);
    Ok(generated)
}

/// The full shapes pipeline: lines, buffers, then relabeling.
pub fn run_shapes<E: GeoEngine>(
    engine: &E,
    layout: &MissionLayout,
    swap_lens: OrbitNumber,
) -> Result<()> {
    run_lines(engine, layout)?;
    run_buffers(engine, layout, swap_lens)?;
    run_relabel(engine, layout)?;
    Ok(())
}
