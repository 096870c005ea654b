//! Calendar-import CSV for the planning team.
//!
//! Google Calendar and Outlook both accept the five column
//! `Subject,Start Date,Start Time,End Date,End Time` import layout; one
//! event per daylight pass, subjects counting up from the base orbit.
use std::path::Path;

use chrono::NaiveDateTime;
use log::info;

use crate::illumination::IlluminationInterval;
use crate::timefmt::{CALENDAR_DATE_FMT, CALENDAR_TIME_FMT};
use crate::{Error, OrbitNumber, Result};

const HEADER: [&str; 5] = ["Subject", "Start Date", "Start Time", "End Date", "End Time"];

/// Writes daylight passes as calendar events, numbered from a base
/// orbit upwards.
#[derive(Debug, Copy, Clone)]
pub struct CalendarExporter {
    base: OrbitNumber,
}

impl CalendarExporter {
    pub fn new(base: OrbitNumber) -> Self {
        Self { base }
    }

    /// Parses the base orbit from operator input, e.g. `"2950"`.
    pub fn from_text(text: &str) -> Result<Self> {
        Ok(Self::new(OrbitNumber::from_text(text)?))
    }

    /// Writes one event per interval.
    pub fn export(&self, intervals: &[IlluminationInterval], path: &Path) -> Result<usize> {
        let starts: Vec<NaiveDateTime> = intervals.iter().map(|i| i.start).collect();
        let ends: Vec<NaiveDateTime> = intervals.iter().map(|i| i.end).collect();
        self.export_stamps(&starts, &ends, path)
    }

    /// Writes one event per `(start, end)` pair. The two lists come from
    /// independent queries in some workflows, so a length mismatch is
    /// refused rather than truncated to the shorter list.
    pub fn export_stamps(
        &self,
        starts: &[NaiveDateTime],
        ends: &[NaiveDateTime],
        path: &Path,
    ) -> Result<usize> {
        if starts.len() != ends.len() {
            return Err(Error::LengthMismatch(starts.len(), ends.len()));
        }
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(HEADER)?;
        let mut orbit = self.base;
        for (start, end) in starts.iter().zip(ends) {
            writer.write_record([
                orbit.label(),
                start.format(CALENDAR_DATE_FMT).to_string(),
                start.format(CALENDAR_TIME_FMT).to_string(),
                end.format(CALENDAR_DATE_FMT).to_string(),
                end.format(CALENDAR_TIME_FMT).to_string(),
            ])?;
            orbit = orbit.next();
        }
        writer.flush()?;
        info!("\"{}\": {} event(s) written", path.display(), starts.len());
        Ok(starts.len())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::NaiveDate;

    fn stamp(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2020, 1, 1)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn event_rows() {
        let dir = std::env::temp_dir().join(format!("autoshape-cal-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("calendar.csv");
        let intervals = vec![
            IlluminationInterval {
                start: stamp(10, 0),
                end: stamp(10, 5),
            },
            IlluminationInterval {
                start: stamp(11, 30),
                end: stamp(11, 35),
            },
        ];
        let exporter = CalendarExporter::from_text("5").unwrap();
        assert_eq!(exporter.export(&intervals, &path).unwrap(), 2);
        let content = std::fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert_eq!(lines.next(), Some("Subject,Start Date,Start Time,End Date,End Time"));
        assert_eq!(
            lines.next(),
            Some("Orbit 5,01/01/2020,10:00:00,01/01/2020,10:05:00")
        );
        assert_eq!(
            lines.next(),
            Some("Orbit 6,01/01/2020,11:30:00,01/01/2020,11:35:00")
        );
        let _ = std::fs::remove_dir_all(&dir);
    }
    #[test]
    fn mismatched_lists_are_refused() {
        let dir = std::env::temp_dir().join(format!("autoshape-cal-mm-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("calendar.csv");
        let exporter = CalendarExporter::new(OrbitNumber(1));
        let result = exporter.export_stamps(&[stamp(10, 0)], &[], &path);
        assert!(matches!(result, Err(Error::LengthMismatch(1, 0))));
        let _ = std::fs::remove_dir_all(&dir);
    }
}
