use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use log::{debug, info};

use crate::config::Config;
use crate::error::{Result, SkyError};
use crate::types::Location;

/// One place an observer location might come from.
pub trait LocationSource {
    fn name(&self) -> &'static str;
    fn locate(&self) -> Option<Location>;
}

/// First two numeric tokens of `text`, splitting on whitespace, `,` and `=`.
///
/// Accepts `32.9 -96.8`, `LAT=32.9 LON=-96.8` and `32.9,-96.8`.
pub fn parse_lat_lon(text: &str) -> Option<Location> {
    let mut numbers = text
        .split(|c: char| c.is_whitespace() || c == ',' || c == '=')
        .filter(|tok| !tok.is_empty())
        .filter_map(|tok| tok.parse::<f64>().ok());
    let latitude = numbers.next()?;
    let longitude = numbers.next()?;
    Some(Location::new(latitude, longitude))
}

/// The suite's `station_latlon.sh`, run and parsed leniently.
#[derive(Debug, Clone)]
pub struct StationScript {
    path: PathBuf,
}

impl StationScript {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn run(&self) -> std::result::Result<String, String> {
        if !is_executable(&self.path) {
            return Err("missing or not executable".to_string());
        }
        let output = Command::new(&self.path)
            .stdin(Stdio::inherit())
            .stderr(Stdio::inherit())
            .output()
            .map_err(|e| format!("spawn failed: {e}"))?;
        if !output.status.success() {
            return Err(format!("exited with {}", output.status));
        }
        let stdout =
            String::from_utf8(output.stdout).map_err(|_| "output is not UTF-8".to_string())?;
        Ok(stdout.trim().to_string())
    }
}

impl LocationSource for StationScript {
    fn name(&self) -> &'static str {
        "station script"
    }

    fn locate(&self) -> Option<Location> {
        match self.run() {
            Ok(out) if out.is_empty() => {
                debug!("{}: no output", self.path.display());
                None
            }
            Ok(out) => {
                let parsed = parse_lat_lon(&out);
                if parsed.is_none() {
                    debug!("{}: fewer than two numbers in {:?}", self.path.display(), out);
                }
                parsed
            }
            Err(reason) => {
                debug!("{}: {}", self.path.display(), reason);
                None
            }
        }
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|m| m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.exists()
}

/// Latitude and longitude from a pair of variables.
///
/// The lookup is injectable so callers are not tied to the process environment.
pub struct EnvironmentVars<F> {
    lat_var: String,
    lon_var: String,
    lookup: F,
}

impl EnvironmentVars<fn(&str) -> Option<String>> {
    pub fn from_process(lat_var: impl Into<String>, lon_var: impl Into<String>) -> Self {
        fn process_var(key: &str) -> Option<String> {
            std::env::var(key).ok()
        }
        Self::with_lookup(lat_var, lon_var, process_var)
    }
}

impl<F> EnvironmentVars<F>
where
    F: Fn(&str) -> Option<String>,
{
    pub fn with_lookup(lat_var: impl Into<String>, lon_var: impl Into<String>, lookup: F) -> Self {
        Self {
            lat_var: lat_var.into(),
            lon_var: lon_var.into(),
            lookup,
        }
    }

    fn read(&self, key: &str) -> Option<f64> {
        let raw = (self.lookup)(key)?;
        match raw.trim().parse::<f64>() {
            Ok(v) => Some(v),
            Err(_) => {
                debug!("{key}={raw:?} is not a number");
                None
            }
        }
    }
}

impl<F> LocationSource for EnvironmentVars<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn name(&self) -> &'static str {
        "environment"
    }

    fn locate(&self) -> Option<Location> {
        let latitude = self.read(&self.lat_var)?;
        let longitude = self.read(&self.lon_var)?;
        Some(Location::new(latitude, longitude))
    }
}

/// Ordered fallback chain; the first source that yields a location wins.
pub struct LocationResolver {
    sources: Vec<Box<dyn LocationSource>>,
    failure: SkyError,
}

impl LocationResolver {
    /// Station script first, then the `LAT`/`LON` style variables.
    pub fn from_config(config: &Config) -> Self {
        Self::with_sources(
            config,
            vec![
                Box::new(StationScript::new(config.station_script.clone()))
                    as Box<dyn LocationSource>,
                Box::new(EnvironmentVars::from_process(
                    &config.lat_var,
                    &config.lon_var,
                )),
            ],
        )
    }

    pub fn with_sources(config: &Config, sources: Vec<Box<dyn LocationSource>>) -> Self {
        Self {
            sources,
            failure: SkyError::LocationUnavailable {
                script: config.station_script.clone(),
                lat_var: config.lat_var.clone(),
                lon_var: config.lon_var.clone(),
            },
        }
    }

    pub fn resolve(self) -> Result<Location> {
        for source in &self.sources {
            if let Some(location) = source.locate() {
                info!(
                    "location from {}: {}, {}",
                    source.name(),
                    location.latitude,
                    location.longitude
                );
                return Ok(location);
            }
            debug!("{} gave no location", source.name());
        }
        Err(self.failure)
    }
}
