//! Mission workspace layout.
//!
//! All pipeline artifacts live under one mission root:
//!
//! ```text
//! <root>/Mission_<N>_Raw_Orbits/*.shp
//! <root>/Mission_<N>_Processed_Orbits/Arc/orb<NNNN>_arc.shp
//! <root>/Mission_<N>_Processed_Orbits/Line/orb<NNNN>_line.shp
//! <root>/Mission_<N>_Processed_Orbits/Buff/orb<NNNN>_buff.shp
//! <root>/Mission_<N>_Processed_Orbits/Google/Orbit_<NNNN>.kmz
//! ```
//!
//! Downstream operator tooling matches these names verbatim, so they are
//! produced here and nowhere else.
use std::fs::create_dir_all;
use std::path::{Path, PathBuf};

use itertools::Itertools;
use log::info;

use crate::{Error, OrbitNumber, Result};

/// Mission root directory and naming policy for every stage output.
#[derive(Debug, Clone)]
pub struct MissionLayout {
    /// Mission root. All stage directories are created below it.
    pub root: PathBuf,
    /// Mission number, embedded in top-level directory names.
    pub mission: u32,
}

impl MissionLayout {
    pub fn new(root: &Path, mission: u32) -> Self {
        Self {
            root: root.to_path_buf(),
            mission,
        }
    }
    /// Raw coasting arc exports, pipeline input.
    pub fn raw_dir(&self) -> PathBuf {
        self.root
            .join(format!("Mission_{}_Raw_Orbits", self.mission))
    }
    /// Root of every processed stage output.
    pub fn processed_dir(&self) -> PathBuf {
        self.root
            .join(format!("Mission_{}_Processed_Orbits", self.mission))
    }
    pub fn arc_dir(&self) -> PathBuf {
        self.processed_dir().join("Arc")
    }
    pub fn line_dir(&self) -> PathBuf {
        self.processed_dir().join("Line")
    }
    pub fn buff_dir(&self) -> PathBuf {
        self.processed_dir().join("Buff")
    }
    pub fn google_dir(&self) -> PathBuf {
        self.processed_dir().join("Google")
    }
    pub fn arc_file(&self, orbit: OrbitNumber) -> PathBuf {
        self.arc_dir()
            .join(format!("orb{}_arc.shp", orbit.zero_padded()))
    }
    pub fn line_file(&self, orbit: OrbitNumber) -> PathBuf {
        self.line_dir()
            .join(format!("orb{}_line.shp", orbit.zero_padded()))
    }
    pub fn buff_file(&self, orbit: OrbitNumber) -> PathBuf {
        self.buff_dir()
            .join(format!("orb{}_buff.shp", orbit.zero_padded()))
    }
    pub fn kmz_file(&self, orbit: OrbitNumber) -> PathBuf {
        self.google_dir()
            .join(format!("Orbit_{}.kmz", orbit.zero_padded()))
    }
    /// Creates a stage directory when missing.
    pub fn ensure_dir(&self, dir: &Path) -> Result<()> {
        if !dir.is_dir() {
            create_dir_all(dir)?;
            info!("\"{}\" created", dir.display());
        }
        Ok(())
    }
    /// Up-front check that a prior stage has run: surfaces a
    /// precondition failure instead of failing mid-pipeline.
    pub fn require_dir(&self, dir: &Path) -> Result<()> {
        if dir.is_dir() {
            Ok(())
        } else {
            Err(Error::MissingDirectory(dir.to_path_buf()))
        }
    }
    /// Collection files of one stage directory, sorted by file name.
    /// The fixed ordering is what makes multi-arc scans reproducible.
    pub fn collections_in(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let mut paths = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) == Some("shp") {
                paths.push(path);
            }
        }
        Ok(paths.into_iter().sorted().collect())
    }
}
