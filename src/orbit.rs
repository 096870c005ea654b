//! Validated orbit identifiers.
//!
//! The original toolchain re-derived orbit numbers by slicing fixed
//! offsets out of file paths. Here the number is parsed once, validated,
//! and carried as a structured value next to its collection.
use std::path::Path;

use lazy_static::lazy_static;
use regex::Regex;

use crate::Error;

lazy_static! {
    /// trailing 4-digit group of a collection file stem,
    /// e.g. "orb0153_arc" or a raw arc export "coasting_0153".
    /// The leading non-digit guard keeps longer runs from being
    /// silently truncated to their last four digits.
    static ref ORBIT_STEM: Regex = Regex::new(r"(?:^|\D)(\d{4})(_arc|_line|_buff)?$").unwrap();
}

/// An orbit pass number, zero padded to 4 digits in file names
/// and rendered as `Orbit N` in attribute tables.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OrbitNumber(pub u32);

impl OrbitNumber {
    /// Extracts the orbit number embedded in a collection file stem.
    pub fn from_path(path: &Path) -> Result<Self, Error> {
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| Error::InvalidOrbitId(path.display().to_string()))?;
        let captures = ORBIT_STEM
            .captures(stem)
            .ok_or_else(|| Error::InvalidOrbitId(stem.to_string()))?;
        let number = captures[1]
            .parse::<u32>()
            .map_err(|_| Error::InvalidOrbitId(stem.to_string()))?;
        Ok(Self(number))
    }
    /// Parses a plain base-10 orbit number, as supplied
    /// in text form by the operator.
    pub fn from_text(text: &str) -> Result<Self, Error> {
        text.trim()
            .parse::<u32>()
            .map(Self)
            .map_err(|_| Error::InvalidOrbitId(text.to_string()))
    }
    /// The attribute table label, `Orbit N`
    pub fn label(&self) -> String {
        format!("Orbit {}", self.0)
    }
    /// Zero padded form used in file names
    pub fn zero_padded(&self) -> String {
        format!("{:04}", self.0)
    }
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }
}

impl std::fmt::Display for OrbitNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::path::PathBuf;
    #[test]
    fn stem_extraction() {
        for (path, expected) in [
            ("Arc/orb0153_arc.shp", 153),
            ("Line/orb0009_line.shp", 9),
            ("Buff/orb6000_buff.shp", 6000),
            ("Mission_115_Raw_Orbits/coasting_0153.shp", 153),
        ] {
            let orbit = OrbitNumber::from_path(&PathBuf::from(path)).unwrap();
            assert_eq!(orbit, OrbitNumber(expected), "bad orbit for {}", path);
        }
    }
    #[test]
    fn invalid_stems() {
        assert!(OrbitNumber::from_path(&PathBuf::from("orb_arc.shp")).is_err());
        assert!(OrbitNumber::from_path(&PathBuf::from("orb12_arc.shp")).is_err());
        // over-long digit runs are rejected, never truncated to 2345
        assert!(OrbitNumber::from_path(&PathBuf::from("orb12345_arc.shp")).is_err());
    }
    #[test]
    fn labels() {
        let orbit = OrbitNumber(153);
        assert_eq!(orbit.label(), "Orbit 153");
        assert_eq!(orbit.zero_padded(), "0153");
        assert_eq!(orbit.next(), OrbitNumber(154));
    }
    #[test]
    fn text_form() {
        assert_eq!(OrbitNumber::from_text(" 5 ").unwrap(), OrbitNumber(5));
        assert!(OrbitNumber::from_text("five").is_err());
    }
}
