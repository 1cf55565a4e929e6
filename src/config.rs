use std::path::{Path, PathBuf};

use crate::error::{Result, SkyError};

pub const SUITE_DIR: &str = "conky/gtex62-clean-suite";
pub const STATION_SCRIPT: &str = "scripts/station_latlon.sh";
pub const CACHE_APP_DIR: &str = "conky";
pub const OUTPUT_FILE: &str = "sky.vars";
pub const LAT_VAR: &str = "LAT";
pub const LON_VAR: &str = "LON";

/// Process-wide paths and variable names, fixed at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub station_script: PathBuf,
    pub output_path: PathBuf,
    pub lat_var: String,
    pub lon_var: String,
}

impl Config {
    pub fn from_home(home: &Path) -> Self {
        Self {
            station_script: home.join(".config").join(SUITE_DIR).join(STATION_SCRIPT),
            output_path: home.join(".cache").join(CACHE_APP_DIR).join(OUTPUT_FILE),
            lat_var: LAT_VAR.to_string(),
            lon_var: LON_VAR.to_string(),
        }
    }

    pub fn discover() -> Result<Self> {
        let home = dirs::home_dir().ok_or(SkyError::NoHomeDirectory)?;
        Ok(Self::from_home(&home))
    }
}
