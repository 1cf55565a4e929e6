use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone};
use log::{debug, info};
use tempfile::NamedTempFile;

use crate::angles::{az_to_theta, rad_to_deg};
use crate::ephemeris::{Ephemeris, Observer};
use crate::error::{Result, SkyError};
use crate::types::{BodyReading, CelestialBody, Location, SkySnapshot};

/// Positions of every body in [`CelestialBody::ALL`] for one observer and instant.
pub fn compute_snapshot<E, Tz>(
    ephemeris: &E,
    location: Location,
    instant: &DateTime<Tz>,
) -> Result<SkySnapshot>
where
    E: Ephemeris + ?Sized,
    Tz: TimeZone,
{
    let observer = Observer::new(location, instant)?;
    let mut readings = Vec::with_capacity(CelestialBody::ALL.len());
    for body in CelestialBody::ALL {
        let pos = ephemeris.horizontal(body, &observer)?;
        let azimuth = rad_to_deg(pos.azimuth);
        let altitude = rad_to_deg(pos.altitude);
        debug!("{}: az={:.3} alt={:.3}", body.key(), azimuth, altitude);
        readings.push(BodyReading {
            body,
            azimuth,
            altitude,
            theta: az_to_theta(azimuth),
        });
    }
    Ok(SkySnapshot {
        location,
        timestamp: instant.timestamp(),
        readings,
    })
}

/// Shortest round-trip text that always reads back as a float (`33` -> `33.0`).
pub fn format_coordinate(value: f64) -> String {
    let text = format!("{value}");
    if value.is_finite() && !text.contains('.') {
        format!("{text}.0")
    } else {
        text
    }
}

pub fn snapshot_lines(snapshot: &SkySnapshot) -> Vec<String> {
    let mut lines = Vec::with_capacity(3 + snapshot.readings.len() * 3);
    lines.push(format!("LAT={}", format_coordinate(snapshot.location.latitude)));
    lines.push(format!("LON={}", format_coordinate(snapshot.location.longitude)));
    lines.push(format!("TS={}", snapshot.timestamp));
    for r in &snapshot.readings {
        let key = r.body.key();
        lines.push(format!("{key}_AZ={:.3}", r.azimuth));
        lines.push(format!("{key}_ALT={:.3}", r.altitude));
        lines.push(format!("{key}_THETA={:.3}", r.theta));
    }
    lines
}

pub fn render_vars(snapshot: &SkySnapshot) -> String {
    let mut out = snapshot_lines(snapshot).join("\n");
    out.push('\n');
    out
}

/// Fully written temporary file waiting to replace its destination.
///
/// Dropping it without [`StagedSnapshot::commit`] deletes the temporary file
/// and leaves the destination as it was.
#[derive(Debug)]
pub struct StagedSnapshot {
    file: NamedTempFile,
    destination: PathBuf,
}

impl StagedSnapshot {
    pub fn stage(destination: &Path, contents: &str) -> Result<Self> {
        let dir = match destination.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir).map_err(|e| SkyError::io(&dir, e))?;

        let prefix = match destination.file_name() {
            Some(name) => format!(".{}.", name.to_string_lossy()),
            None => ".sky.".to_string(),
        };
        let mut file = tempfile::Builder::new()
            .prefix(&prefix)
            .suffix(".tmp")
            .tempfile_in(&dir)
            .map_err(|e| SkyError::io(&dir, e))?;
        let temp = file.path().to_path_buf();
        file.write_all(contents.as_bytes())
            .and_then(|_| file.as_file().sync_all())
            .map_err(|e| SkyError::io(&temp, e))?;
        set_readable(&file).map_err(|e| SkyError::io(&temp, e))?;
        debug!("staged {} bytes in {}", contents.len(), temp.display());

        Ok(Self {
            file,
            destination: destination.to_path_buf(),
        })
    }

    pub fn temp_path(&self) -> &Path {
        self.file.path()
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Atomically renames the temporary file over the destination.
    pub fn commit(self) -> Result<PathBuf> {
        let StagedSnapshot { file, destination } = self;
        file.persist(&destination)
            .map_err(|e| SkyError::io(destination.clone(), e.error))?;
        Ok(destination)
    }
}

// tempfile creates 0600 files.
#[cfg(unix)]
fn set_readable(file: &NamedTempFile) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    file.as_file()
        .set_permissions(std::fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn set_readable(_file: &NamedTempFile) -> std::io::Result<()> {
    Ok(())
}

pub fn write_atomic(destination: &Path, contents: &str) -> Result<PathBuf> {
    StagedSnapshot::stage(destination, contents)?.commit()
}

/// Compute, render and publish in one pass. Nothing touches the filesystem
/// until every body has been computed.
pub fn publish<E, Tz>(
    ephemeris: &E,
    location: Location,
    instant: &DateTime<Tz>,
    destination: &Path,
) -> Result<SkySnapshot>
where
    E: Ephemeris + ?Sized,
    Tz: TimeZone,
{
    let snapshot = compute_snapshot(ephemeris, location, instant)?;
    let contents = render_vars(&snapshot);
    let written = write_atomic(destination, &contents)?;
    info!(
        "wrote {} ({} bodies)",
        written.display(),
        snapshot.readings.len()
    );
    Ok(snapshot)
}
