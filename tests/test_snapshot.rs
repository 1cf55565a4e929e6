use std::fs;

use chrono::{TimeZone, Utc};

use sky_vars::angles::deg_to_rad;
use sky_vars::ephemeris::{Ephemeris, Observer, Vsop87Ephemeris};
use sky_vars::error::{Result, SkyError};
use sky_vars::snapshot::*;
use sky_vars::types::{BodyReading, CelestialBody, HorizontalPosition, Location, SkySnapshot};

macro_rules! assert_approx {
    ($left:expr, $right:expr, $tol:expr) => {
        let (l, r) = ($left as f64, $right as f64);
        assert!(
            (l - r).abs() <= $tol,
            "assert_approx failed: left={}, right={}, diff={}, tol={}",
            l, r, (l - r).abs(), $tol
        );
    };
}

/// Every body at a fixed compass bearing, 30° apart starting just south of east.
struct CompassEphemeris;

impl Ephemeris for CompassEphemeris {
    fn horizontal(&self, body: CelestialBody, _observer: &Observer) -> Result<HorizontalPosition> {
        let idx = CelestialBody::ALL.iter().position(|b| *b == body).unwrap() as f64;
        Ok(HorizontalPosition {
            azimuth: deg_to_rad(100.0 + 30.0 * idx),
            altitude: deg_to_rad(-10.0 + 5.0 * idx),
        })
    }
}

struct BrokenEphemeris(CelestialBody);

impl Ephemeris for BrokenEphemeris {
    fn horizontal(&self, body: CelestialBody, _observer: &Observer) -> Result<HorizontalPosition> {
        if body == self.0 {
            return Err(SkyError::NonFinitePosition { body: body.key() });
        }
        Ok(HorizontalPosition {
            azimuth: 0.0,
            altitude: 0.0,
        })
    }
}

fn dallas() -> Location {
    Location::new(32.9, -96.8)
}

fn sample_snapshot() -> SkySnapshot {
    let readings = CelestialBody::ALL
        .iter()
        .map(|&body| BodyReading {
            body,
            azimuth: 123.456_78,
            altitude: -4.5,
            theta: 33.456_78,
        })
        .collect();
    SkySnapshot {
        location: dallas(),
        timestamp: 1_700_000_000,
        readings,
    }
}

fn three_decimals(value: &str) -> bool {
    match value.split_once('.') {
        Some((int, frac)) => {
            frac.len() == 3
                && frac.chars().all(|c| c.is_ascii_digit())
                && int.trim_start_matches('-').chars().all(|c| c.is_ascii_digit())
                && !int.trim_start_matches('-').is_empty()
        }
        None => false,
    }
}

// ── Compute ──

#[test]
fn test_compute_converts_and_remaps() {
    let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
    let snap = compute_snapshot(&CompassEphemeris, dallas(), &now).unwrap();
    assert_eq!(snap.location, dallas());
    assert_eq!(snap.timestamp, now.timestamp());
    let bodies: Vec<_> = snap.readings.iter().map(|r| r.body).collect();
    assert_eq!(bodies, CelestialBody::ALL.to_vec());

    let expected_theta = [10.0, 40.0, 70.0, 100.0, 130.0, 160.0];
    for (r, theta) in snap.readings.iter().zip(expected_theta) {
        assert_approx!(r.theta, theta, 1e-9);
        assert_approx!(r.azimuth, theta + 90.0, 1e-9);
    }
    assert_approx!(snap.readings[0].altitude, -10.0, 1e-9);
    assert_approx!(snap.readings[5].altitude, 15.0, 1e-9);
}

#[test]
fn test_compute_propagates_ephemeris_failure() {
    let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
    let err = compute_snapshot(&BrokenEphemeris(CelestialBody::Mars), dallas(), &now).unwrap_err();
    assert!(matches!(err, SkyError::NonFinitePosition { body: "MARS" }));
}

#[test]
fn test_compute_rejects_bad_observer() {
    let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
    let err = compute_snapshot(&CompassEphemeris, Location::new(95.0, 0.0), &now).unwrap_err();
    assert!(matches!(err, SkyError::InvalidObserver { .. }));
}

// ── Format ──

#[test]
fn test_format_coordinate() {
    assert_eq!(format_coordinate(32.9), "32.9");
    assert_eq!(format_coordinate(-96.8), "-96.8");
    assert_eq!(format_coordinate(33.0), "33.0");
    assert_eq!(format_coordinate(0.0), "0.0");
    assert_eq!(format_coordinate(-96.123456), "-96.123456");
}

#[test]
fn test_render_layout() {
    let text = render_vars(&sample_snapshot());
    assert!(text.ends_with('\n'));
    assert!(!text.ends_with("\n\n"));
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 21);
    assert_eq!(lines[0], "LAT=32.9");
    assert_eq!(lines[1], "LON=-96.8");
    assert_eq!(lines[2], "TS=1700000000");
    assert_eq!(lines[3], "MOON_AZ=123.457");
    assert_eq!(lines[4], "MOON_ALT=-4.500");
    assert_eq!(lines[5], "MOON_THETA=33.457");

    let keys: Vec<&str> = lines[3..]
        .iter()
        .map(|l| l.split_once('=').unwrap().0)
        .collect();
    let mut expected = Vec::new();
    for body in ["MOON", "VENUS", "MARS", "JUPITER", "SATURN", "MERCURY"] {
        for field in ["AZ", "ALT", "THETA"] {
            expected.push(format!("{body}_{field}"));
        }
    }
    assert_eq!(keys, expected);
}

#[test]
fn test_render_real_sky_has_three_decimals() {
    let now = Utc::now();
    let snap = compute_snapshot(&Vsop87Ephemeris::new(), dallas(), &now).unwrap();
    let text = render_vars(&snap);
    let body_lines: Vec<&str> = text.lines().skip(3).collect();
    assert_eq!(body_lines.len(), 18);
    for line in body_lines {
        let (_, value) = line.split_once('=').unwrap();
        assert!(three_decimals(value), "{}", line);
    }
}

#[test]
fn test_consecutive_runs_match_structurally() {
    let eph = Vsop87Ephemeris::new();
    let t0 = Utc.with_ymd_and_hms(2025, 5, 5, 3, 0, 0).unwrap();
    let t1 = t0 + chrono::Duration::seconds(1);
    let a = render_vars(&compute_snapshot(&eph, dallas(), &t0).unwrap());
    let b = render_vars(&compute_snapshot(&eph, dallas(), &t1).unwrap());
    let (a, b): (Vec<&str>, Vec<&str>) = (a.lines().collect(), b.lines().collect());
    assert_eq!(a.len(), b.len());
    assert_eq!(a[..2], b[..2]);
    for (la, lb) in a.iter().zip(&b).skip(3) {
        let (ka, va) = la.split_once('=').unwrap();
        let (kb, vb) = lb.split_once('=').unwrap();
        assert_eq!(ka, kb);
        let (va, vb): (f64, f64) = (va.parse().unwrap(), vb.parse().unwrap());
        let mut drift = (va - vb).abs();
        if drift > 180.0 {
            drift = 360.0 - drift;
        }
        assert!(drift < 0.1, "{} vs {}", la, lb);
    }
}

// ── Atomic write ──

#[test]
fn test_write_creates_parent_directories() {
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join(".cache").join("conky").join("sky.vars");
    let written = write_atomic(&dest, "LAT=1.0\n").unwrap();
    assert_eq!(written, dest);
    assert_eq!(fs::read_to_string(&dest).unwrap(), "LAT=1.0\n");
}

#[test]
fn test_write_replaces_whole_file() {
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("sky.vars");
    write_atomic(&dest, "A=1\nB=2\nC=3\n").unwrap();
    write_atomic(&dest, "A=9\n").unwrap();
    assert_eq!(fs::read_to_string(&dest).unwrap(), "A=9\n");
    let leftovers: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .filter(|n| n != "sky.vars")
        .collect();
    assert!(leftovers.is_empty(), "{:?}", leftovers);
}

#[test]
fn test_uncommitted_stage_leaves_previous_file() {
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("sky.vars");
    write_atomic(&dest, "LAT=32.9\nLON=-96.8\n").unwrap();
    let before = fs::read(&dest).unwrap();

    let staged = StagedSnapshot::stage(&dest, "LAT=0.0\n").unwrap();
    let temp = staged.temp_path().to_path_buf();
    assert_eq!(temp.parent(), dest.parent());
    assert_eq!(fs::read_to_string(&temp).unwrap(), "LAT=0.0\n");
    assert_eq!(fs::read(&dest).unwrap(), before);

    drop(staged);
    assert!(!temp.exists());
    assert_eq!(fs::read(&dest).unwrap(), before);
}

#[test]
fn test_commit_swaps_in_staged_contents() {
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("sky.vars");
    write_atomic(&dest, "OLD=1\n").unwrap();
    let staged = StagedSnapshot::stage(&dest, "NEW=1\n").unwrap();
    assert_eq!(staged.destination(), dest.as_path());
    let temp = staged.temp_path().to_path_buf();
    staged.commit().unwrap();
    assert_eq!(fs::read_to_string(&dest).unwrap(), "NEW=1\n");
    assert!(!temp.exists());
}

#[cfg(unix)]
#[test]
fn test_published_file_is_world_readable() {
    use std::os::unix::fs::PermissionsExt;
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("sky.vars");
    write_atomic(&dest, "A=1\n").unwrap();
    let mode = fs::metadata(&dest).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o644);
}

// ── Publish ──

#[test]
fn test_publish_writes_rendered_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("conky").join("sky.vars");
    let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
    let snap = publish(&CompassEphemeris, dallas(), &now, &dest).unwrap();
    assert_eq!(fs::read_to_string(&dest).unwrap(), render_vars(&snap));
}

#[test]
fn test_failed_publish_leaves_previous_file() {
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("sky.vars");
    fs::write(&dest, "LAT=1.0\nLON=2.0\n").unwrap();
    let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();

    assert!(publish(&BrokenEphemeris(CelestialBody::Saturn), dallas(), &now, &dest).is_err());
    assert!(publish(&CompassEphemeris, Location::new(0.0, 999.0), &now, &dest).is_err());

    assert_eq!(fs::read_to_string(&dest).unwrap(), "LAT=1.0\nLON=2.0\n");
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn test_failed_publish_creates_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("never").join("sky.vars");
    let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
    assert!(publish(&BrokenEphemeris(CelestialBody::Moon), dallas(), &now, &dest).is_err());
    assert!(!dest.parent().unwrap().exists());
}
