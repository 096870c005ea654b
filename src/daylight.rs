//! Daylight stage: orbit number assignment and per-orbit segment export.
//!
//! Raw coasting arc collections are processed in file name order through
//! one shared [IlluminationScanner], so the scan state (interval cursor,
//! running orbit number) carries across arc boundaries: the whole stage
//! is a single continuous scan over the concatenated point stream.
use log::{info, warn};

use crate::engine::GeoEngine;
use crate::illumination::{IlluminationInterval, IlluminationScanner};
use crate::mission::MissionLayout;
use crate::timefmt::TimeFormat;
use crate::{Error, FeatureCollection, OrbitNumber, Result, ORBIT_FIELD, TIME_FIELD};

/// Engine specific bookkeeping attribute on raw exports, dropped
/// before labeling.
const TRACKID_FIELD: &str = "TRACKID";

/// Outcome of one daylight run.
#[derive(Debug, Default)]
pub struct DaylightSummary {
    /// Segments written by this run
    pub exported: Vec<OrbitNumber>,
    /// Segments skipped because their output already existed
    pub skipped: Vec<OrbitNumber>,
    /// Orbit numbers in range which no point carries
    pub empty: Vec<OrbitNumber>,
}

/// Labels every raw arc and exports the daylight orbit segments.
///
/// The scanner base orbit is derived from the first arc's own number
/// (minus 2) plus the operator supplied `offset` correction.
pub fn run_daylight<E: GeoEngine>(
    engine: &E,
    layout: &MissionLayout,
    intervals: Vec<IlluminationInterval>,
    offset: i32,
) -> Result<DaylightSummary> {
    layout.require_dir(&layout.raw_dir())?;
    layout.ensure_dir(&layout.arc_dir())?;

    let arcs = layout.collections_in(&layout.raw_dir())?;
    let first = arcs
        .first()
        .ok_or_else(|| Error::NoArcsFound(layout.raw_dir()))?;
    let base = IlluminationScanner::base_orbit(OrbitNumber::from_path(first)?, offset)?;
    let mut scanner = IlluminationScanner::new(intervals, base);
    info!(
        "daylight scan: {} arc(s), base orbit {}",
        arcs.len(),
        base
    );

    let mut summary = DaylightSummary::default();
    for path in &arcs {
        let first_orbit = OrbitNumber::from_path(path)?;
        let mut arc = engine.read_collection(path)?;
        label_arc(&mut arc, &mut scanner)?;
        export_segments(engine, layout, &arc, first_orbit, &mut summary)?;
    }
    Ok(summary)
}

/// Assigns orbit labels to one arc, in place, through the shared scanner.
pub fn label_arc(arc: &mut FeatureCollection, scanner: &mut IlluminationScanner) -> Result<()> {
    if !arc.has_field(TIME_FIELD) {
        return Err(Error::MissingField(TIME_FIELD.to_string()));
    }
    arc.add_field(ORBIT_FIELD);
    if arc.has_field(TRACKID_FIELD) {
        arc.delete_field(TRACKID_FIELD)?;
    }
    for index in 0..arc.len() {
        let stamp = arc.value(index, TIME_FIELD).to_string();
        let t = TimeFormat::Ephemeris.parse(&stamp)?;
        if let Some(orbit) = scanner.assign(t) {
            arc.set_value(index, ORBIT_FIELD, &orbit.label());
        }
    }
    Ok(())
}

/// Highest orbit number labeled within an arc, if any point got one.
pub fn max_labeled_orbit(arc: &FeatureCollection) -> Option<OrbitNumber> {
    (0..arc.len())
        .filter_map(|index| {
            let label = arc.value(index, ORBIT_FIELD);
            label
                .strip_prefix("Orbit ")
                .and_then(|n| n.parse::<u32>().ok())
        })
        .map(OrbitNumber)
        .max()
}

/// Extracts one orbit's points from a labeled arc.
/// An empty selection is an error the caller decides about.
pub fn select_segment(arc: &FeatureCollection, orbit: OrbitNumber) -> Result<FeatureCollection> {
    let segment = arc.select_by(ORBIT_FIELD, &orbit.label());
    if segment.is_empty() {
        Err(Error::NoPointsForOrbit(orbit))
    } else {
        Ok(segment)
    }
}

/// Writes every daylight segment of a labeled arc, from the arc's own
/// first orbit up to the highest labeled one. Existing outputs are never
/// rewritten, which makes re-runs idempotent; orbits without points are
/// reported and skipped.
fn export_segments<E: GeoEngine>(
    engine: &E,
    layout: &MissionLayout,
    arc: &FeatureCollection,
    first_orbit: OrbitNumber,
    summary: &mut DaylightSummary,
) -> Result<()> {
    let Some(ceiling) = max_labeled_orbit(arc) else {
        warn!("no daylight points in arc starting at orbit {}", first_orbit);
        return Ok(());
    };
    for number in first_orbit.0..=ceiling.0 {
        let orbit = OrbitNumber(number);
        let out = layout.arc_file(orbit);
        if out.is_file() {
            info!("\"{}\" exists, not regenerated", out.display());
            summary.skipped.push(orbit);
            continue;
        }
        match select_segment(arc, orbit) {
            Ok(segment) => {
                engine.write_collection(&out, &segment)?;
                summary.exported.push(orbit);
            },
            Err(Error::NoPointsForOrbit(orbit)) => {
                warn!("no points labeled \"Orbit {}\", segment skipped", orbit);
                summary.empty.push(orbit);
            },
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::FeatureGeometry;
    use crate::FeatureRow;
    use geo::point;

    fn labeled_arc() -> FeatureCollection {
        let mut arc = FeatureCollection::new(&[TIME_FIELD, ORBIT_FIELD]);
        for (minute, label) in [
            (0, ""),
            (1, "Orbit 100"),
            (2, "Orbit 100"),
            (3, ""),
            (4, "Orbit 102"),
        ] {
            arc.push(
                FeatureRow::new(FeatureGeometry::Point(point!(x: 0.0, y: minute as f64)))
                    .with_attr(TIME_FIELD, &format!("01/01/20 10:{:02}:00", minute))
                    .with_attr(ORBIT_FIELD, label),
            );
        }
        arc
    }

    #[test]
    fn ceiling_from_labels() {
        assert_eq!(max_labeled_orbit(&labeled_arc()), Some(OrbitNumber(102)));
        let unlabeled = FeatureCollection::new(&[TIME_FIELD, ORBIT_FIELD]);
        assert_eq!(max_labeled_orbit(&unlabeled), None);
    }
    #[test]
    fn segment_selection() {
        let arc = labeled_arc();
        let segment = select_segment(&arc, OrbitNumber(100)).unwrap();
        assert_eq!(segment.len(), 2);
        // intermediate orbit without points surfaces as an error
        assert!(matches!(
            select_segment(&arc, OrbitNumber(101)),
            Err(Error::NoPointsForOrbit(OrbitNumber(101)))
        ));
    }
    #[test]
    fn labeling_drops_trackid() {
        let mut arc = FeatureCollection::new(&[TIME_FIELD, TRACKID_FIELD]);
        arc.push(
            FeatureRow::new(FeatureGeometry::Point(point!(x: 0.0, y: 0.0)))
                .with_attr(TIME_FIELD, "01/01/20 10:02:00")
                .with_attr(TRACKID_FIELD, "1"),
        );
        let intervals = vec![IlluminationInterval {
            start: TimeFormat::Ephemeris.parse("01/01/20 10:00:00").unwrap(),
            end: TimeFormat::Ephemeris.parse("01/01/20 10:05:00").unwrap(),
        }];
        let mut scanner = IlluminationScanner::new(intervals, OrbitNumber(42));
        label_arc(&mut arc, &mut scanner).unwrap();
        assert!(!arc.has_field(TRACKID_FIELD));
        assert_eq!(arc.value(0, ORBIT_FIELD), "Orbit 42");
    }
}
