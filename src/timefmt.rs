//! Timestamp formats in play across the pipeline.
//!
//! Three representations coexist: the geometry engine tags track points
//! with `MM/DD/YY HH:MM:SS` stamps, the daylight interval table uses
//! `YYYY/MM/DD HH:MM:SS.ffffff`, and photo requests are filed against
//! day-of-year `YYYY/DDD/HH:MM:SS` stamps. All instants are naive: they
//! are only ever compared against each other.
use chrono::NaiveDateTime;
use thiserror::Error;

/// Ephemeris attribute pattern, `MM/DD/YY HH:MM:SS`
const EPHEMERIS_FMT: &str = "%m/%d/%y %H:%M:%S";

/// Interval table pattern, `YYYY/MM/DD HH:MM:SS.ffffff`
const INTERVAL_FMT: &str = "%Y/%m/%d %H:%M:%S%.6f";

/// Photo request pattern, `YYYY/DDD/HH:MM:SS` (day of year)
const REQUEST_FMT: &str = "%Y/%j/%H:%M:%S";

/// Calendar import date pattern, `MM/DD/YYYY`
pub(crate) const CALENDAR_DATE_FMT: &str = "%m/%d/%Y";

/// Calendar import time pattern, `HH:MM:SS`
pub(crate) const CALENDAR_TIME_FMT: &str = "%H:%M:%S";

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("\"{text}\" does not match {format} ({reason})")]
    Mismatch {
        text: String,
        format: TimeFormat,
        reason: chrono::ParseError,
    },
}

/// The three canonical timestamp representations.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TimeFormat {
    /// `MM/DD/YY HH:MM:SS`, as tagged on track points by the engine
    Ephemeris,
    /// `YYYY/MM/DD HH:MM:SS.ffffff`, as found in the interval table
    IntervalTable,
    /// `YYYY/DDD/HH:MM:SS` (day of year), mission request format
    Request,
}

impl TimeFormat {
    fn pattern(&self) -> &'static str {
        match self {
            Self::Ephemeris => EPHEMERIS_FMT,
            Self::IntervalTable => INTERVAL_FMT,
            Self::Request => REQUEST_FMT,
        }
    }
    /// Parses a naive instant from `text`, expected in this representation.
    pub fn parse(&self, text: &str) -> Result<NaiveDateTime, FormatError> {
        NaiveDateTime::parse_from_str(text, self.pattern()).map_err(|reason| {
            FormatError::Mismatch {
                text: text.to_string(),
                format: *self,
                reason,
            }
        })
    }
    /// Renders a naive instant in this representation.
    /// Round-trips exactly: `render(parse(x)) == x` for well-formed `x`.
    pub fn render(&self, t: NaiveDateTime) -> String {
        t.format(self.pattern()).to_string()
    }
}

impl std::fmt::Display for TimeFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Ephemeris => f.write_str("MM/DD/YY HH:MM:SS"),
            Self::IntervalTable => f.write_str("YYYY/MM/DD HH:MM:SS.ffffff"),
            Self::Request => f.write_str("YYYY/DDD/HH:MM:SS"),
        }
    }
}

/// Converts an Ephemeris stamp to the Request representation,
/// the conversion applied by the relabel stage.
pub fn ephemeris_to_request(text: &str) -> Result<String, FormatError> {
    let t = TimeFormat::Ephemeris.parse(text)?;
    Ok(TimeFormat::Request.render(t))
}

#[cfg(test)]
mod test {
    use super::*;
    #[test]
    fn ephemeris_parsing() {
        let t = TimeFormat::Ephemeris.parse("03/23/17 14:05:59").unwrap();
        assert_eq!(TimeFormat::Ephemeris.render(t), "03/23/17 14:05:59");
        assert_eq!(TimeFormat::Request.render(t), "2017/082/14:05:59");
    }
    #[test]
    fn interval_parsing() {
        let t = TimeFormat::IntervalTable
            .parse("2017/03/23 14:05:59.250000")
            .unwrap();
        assert_eq!(
            TimeFormat::IntervalTable.render(t),
            "2017/03/23 14:05:59.250000"
        );
    }
    #[test]
    fn request_round_trip() {
        for stamp in ["2017/001/00:00:00", "2020/366/23:59:59"] {
            let t = TimeFormat::Request.parse(stamp).unwrap();
            assert_eq!(TimeFormat::Request.render(t), stamp, "bad round trip");
        }
    }
    #[test]
    fn malformed_stamps() {
        assert!(TimeFormat::Ephemeris.parse("03/23/17").is_err());
        assert!(TimeFormat::Ephemeris.parse("13/45/17 14:05:59").is_err());
        assert!(TimeFormat::IntervalTable
            .parse("2017/03/23 14:05:59.banana")
            .is_err());
        assert!(TimeFormat::Request.parse("2017/400/00:00:00").is_err());
    }
    #[test]
    fn relabel_conversion() {
        assert_eq!(
            ephemeris_to_request("01/01/20 10:00:00").unwrap(),
            "2020/001/10:00:00"
        );
    }
}
