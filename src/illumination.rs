//! Subpoint daylight intervals and the orbit number scan.
//!
//! The interval table lists one `[start, end]` window per daylight pass.
//! Matching a chronological stream of track points against that table is
//! a single continuous scan: the scanner value owns the interval cursor
//! and the running orbit number, and the caller threads the same scanner
//! through every coasting arc so state carries over arc boundaries.
use std::path::Path;

use chrono::NaiveDateTime;

use crate::timefmt::TimeFormat;
use crate::{Error, OrbitNumber};

/// One daylight pass of the ground track.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IlluminationInterval {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

/// Reads the two-column `start,end` interval table
/// (both stamps in YYYY/MM/DD HH:MM:SS.ffffff).
///
/// The list must be increasing and non-overlapping; it may well be
/// shorter than the point stream it gets matched against.
pub fn read_intervals(path: &Path) -> Result<Vec<IlluminationInterval>, Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .trim(csv::Trim::All)
        .from_path(path)?;
    let mut intervals = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record?;
        let start = TimeFormat::IntervalTable.parse(record.get(0).unwrap_or(""))?;
        let end = TimeFormat::IntervalTable.parse(record.get(1).unwrap_or(""))?;
        if end < start {
            return Err(Error::UnorderedIntervals(index));
        }
        if let Some(previous) = intervals.last() {
            let previous: &IlluminationInterval = previous;
            if start < previous.end {
                return Err(Error::UnorderedIntervals(index));
            }
        }
        intervals.push(IlluminationInterval { start, end });
    }
    Ok(intervals)
}

/// Stateful daylight scan over a chronological point stream.
///
/// Per point, while intervals remain:
/// - before the current interval start: night, no label;
/// - within `[start, end]` (end inclusive): labeled with the current
///   orbit number;
/// - past the current end: advance to the next interval and the next
///   orbit number. The advancing point itself is deliberately *not*
///   re-checked against the new interval: labeling and advancing are
///   mutually exclusive branches, and downstream request timestamps
///   depend on that exact boundary behavior.
///
/// Once the table is exhausted every remaining point stays unlabeled.
/// That is the normal end condition, not a failure.
#[derive(Debug, Clone)]
pub struct IlluminationScanner {
    intervals: Vec<IlluminationInterval>,
    interval_index: usize,
    current_orbit: OrbitNumber,
}

impl IlluminationScanner {
    /// Builds a scanner filling orbit numbers from `base` upwards.
    pub fn new(intervals: Vec<IlluminationInterval>, base: OrbitNumber) -> Self {
        Self {
            intervals,
            interval_index: 0,
            current_orbit: base,
        }
    }
    /// Base orbit number for a mission: the first arc's own number,
    /// minus 2, plus an operator supplied correction offset.
    pub fn base_orbit(first_arc: OrbitNumber, offset: i32) -> Result<OrbitNumber, Error> {
        let base = i64::from(first_arc.0) - 2 + i64::from(offset);
        u32::try_from(base)
            .map(OrbitNumber)
            .map_err(|_| Error::InvalidOrbitId(format!("{} - 2 + ({})", first_arc, offset)))
    }
    pub fn current_orbit(&self) -> OrbitNumber {
        self.current_orbit
    }
    pub fn interval_index(&self) -> usize {
        self.interval_index
    }
    /// Whether the interval table has been consumed entirely.
    pub fn is_exhausted(&self) -> bool {
        self.interval_index >= self.intervals.len()
    }
    /// Assigns an orbit number to one point of the stream, or `None`
    /// for night points. Mutates the scan cursor, so points must be
    /// submitted in chronological order.
    pub fn assign(&mut self, t: NaiveDateTime) -> Option<OrbitNumber> {
        let interval = self.intervals.get(self.interval_index)?;
        if t < interval.start {
            None
        } else if t <= interval.end {
            Some(self.current_orbit)
        } else {
            // night has fallen: move the cursor, drop this point
            self.interval_index += 1;
            self.current_orbit = self.current_orbit.next();
            None
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::timefmt::FormatError;
    use std::path::PathBuf;

    fn interval_table(name: &str, content: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("autoshape-{}-{}", name, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("intervals.csv");
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn interval_table_parsing() {
        let path = interval_table(
            "ivl-ok",
            "2020/01/01 10:00:00.000000, 2020/01/01 10:05:00.500000\n\
             2020/01/01 11:30:00.000000, 2020/01/01 11:35:00.000000\n",
        );
        let intervals = read_intervals(&path).unwrap();
        assert_eq!(intervals.len(), 2);
        assert_eq!(
            intervals[0].start,
            TimeFormat::IntervalTable
                .parse("2020/01/01 10:00:00.000000")
                .unwrap()
        );
        assert_eq!(
            intervals[0].end,
            TimeFormat::IntervalTable
                .parse("2020/01/01 10:05:00.500000")
                .unwrap()
        );
        assert!(intervals[1].start > intervals[0].end);
    }
    #[test]
    fn reversed_interval_is_rejected() {
        let path = interval_table(
            "ivl-rev",
            "2020/01/01 10:05:00.000000, 2020/01/01 10:00:00.000000\n",
        );
        assert!(matches!(
            read_intervals(&path),
            Err(Error::UnorderedIntervals(0))
        ));
    }
    #[test]
    fn overlapping_intervals_are_rejected() {
        let path = interval_table(
            "ivl-ovl",
            "2020/01/01 10:00:00.000000, 2020/01/01 10:05:00.000000\n\
             2020/01/01 10:04:00.000000, 2020/01/01 10:10:00.000000\n",
        );
        assert!(matches!(
            read_intervals(&path),
            Err(Error::UnorderedIntervals(1))
        ));
    }
    #[test]
    fn malformed_interval_rows_are_rejected() {
        // bad stamp
        let path = interval_table(
            "ivl-bad",
            "2020/01/01 10:00:00.000000, not a stamp\n",
        );
        assert!(matches!(
            read_intervals(&path),
            Err(Error::Format(FormatError::Mismatch { .. }))
        ));
        // second column missing entirely
        let path = interval_table("ivl-short", "2020/01/01 10:00:00.000000\n");
        assert!(read_intervals(&path).is_err());
    }

    fn interval(start: &str, end: &str) -> IlluminationInterval {
        IlluminationInterval {
            start: TimeFormat::Ephemeris.parse(start).unwrap(),
            end: TimeFormat::Ephemeris.parse(end).unwrap(),
        }
    }
    fn t(stamp: &str) -> NaiveDateTime {
        TimeFormat::Ephemeris.parse(stamp).unwrap()
    }

    #[test]
    fn five_point_scan() {
        let intervals = vec![
            interval("01/01/20 10:00:00", "01/01/20 10:05:00"),
            interval("01/01/20 10:20:00", "01/01/20 10:25:00"),
        ];
        let mut scanner = IlluminationScanner::new(intervals, OrbitNumber(100));
        assert_eq!(scanner.assign(t("01/01/20 09:59:00")), None);
        assert_eq!(
            scanner.assign(t("01/01/20 10:02:00")),
            Some(OrbitNumber(100))
        );
        // 10:06 exceeds the first end: advances, never labeled
        assert_eq!(scanner.assign(t("01/01/20 10:06:00")), None);
        assert_eq!(
            scanner.assign(t("01/01/20 10:21:00")),
            Some(OrbitNumber(101))
        );
        assert_eq!(scanner.assign(t("01/01/20 10:30:00")), None);
        assert!(scanner.is_exhausted());
    }
    #[test]
    fn end_boundary_is_lit() {
        let intervals = vec![interval("01/01/20 10:00:00", "01/01/20 10:05:00")];
        let mut scanner = IlluminationScanner::new(intervals, OrbitNumber(7));
        assert_eq!(
            scanner.assign(t("01/01/20 10:05:00")),
            Some(OrbitNumber(7)),
            "end stamp belongs to the lit interval"
        );
        // one tick later advances and stays unlabeled
        assert_eq!(scanner.assign(t("01/01/20 10:05:01")), None);
        assert_eq!(scanner.current_orbit(), OrbitNumber(8));
    }
    #[test]
    fn exhaustion_is_not_an_error() {
        let intervals = vec![interval("01/01/20 10:00:00", "01/01/20 10:05:00")];
        let mut scanner = IlluminationScanner::new(intervals, OrbitNumber(0));
        assert_eq!(scanner.assign(t("01/01/20 10:06:00")), None);
        for stamp in ["01/01/20 11:00:00", "01/02/20 00:00:00"] {
            assert_eq!(scanner.assign(t(stamp)), None);
        }
        assert!(scanner.is_exhausted());
        assert_eq!(scanner.current_orbit(), OrbitNumber(1));
    }
    #[test]
    fn orbit_numbers_increase_once_per_interval() {
        let intervals = vec![
            interval("01/01/20 10:00:00", "01/01/20 10:05:00"),
            interval("01/01/20 10:20:00", "01/01/20 10:25:00"),
            interval("01/01/20 10:40:00", "01/01/20 10:45:00"),
        ];
        let mut scanner = IlluminationScanner::new(intervals, OrbitNumber(50));
        let mut labels = Vec::new();
        for minute in 0..60 {
            let stamp = format!("01/01/20 10:{:02}:30", minute);
            if let Some(orbit) = scanner.assign(t(&stamp)) {
                labels.push(orbit.0);
            }
        }
        let mut deduped = labels.clone();
        deduped.dedup();
        assert_eq!(deduped, vec![50, 51, 52]);
        // monotonically non-decreasing
        assert!(labels.windows(2).all(|w| w[0] <= w[1]));
    }
    #[test]
    fn state_carries_across_arcs() {
        let intervals = vec![
            interval("01/01/20 10:00:00", "01/01/20 10:05:00"),
            interval("01/01/20 10:20:00", "01/01/20 10:25:00"),
        ];
        let mut scanner = IlluminationScanner::new(intervals, OrbitNumber(200));
        // first arc consumes the first interval
        assert_eq!(
            scanner.assign(t("01/01/20 10:01:00")),
            Some(OrbitNumber(200))
        );
        assert_eq!(scanner.assign(t("01/01/20 10:10:00")), None);
        // second arc resumes against the second interval
        assert_eq!(
            scanner.assign(t("01/01/20 10:22:00")),
            Some(OrbitNumber(201))
        );
    }
    #[test]
    fn base_orbit_offsets() {
        assert_eq!(
            IlluminationScanner::base_orbit(OrbitNumber(153), 0).unwrap(),
            OrbitNumber(151)
        );
        assert_eq!(
            IlluminationScanner::base_orbit(OrbitNumber(153), 3).unwrap(),
            OrbitNumber(154)
        );
        assert!(IlluminationScanner::base_orbit(OrbitNumber(1), -5).is_err());
    }
}
