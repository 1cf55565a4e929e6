use std::f64::consts::TAU;

use crate::types::{EquatorialPosition, HorizontalPosition};

pub const FULL_TURN: f64 = 360.0;
/// Azimuth of due east; the renderer's arc starts here.
pub const THETA_ORIGIN: f64 = 90.0;
pub const EARTH_EQUATORIAL_RADIUS_KM: f64 = 6378.14;
pub const STANDARD_PRESSURE_HPA: f64 = 1010.0;
pub const STANDARD_TEMPERATURE_C: f64 = 15.0;

// Past this magnitude subtracting one turn at a time stops making progress.
const THETA_LOOP_LIMIT: f64 = FULL_TURN * 1024.0;

pub fn deg_to_rad(deg: f64) -> f64 {
    deg * (std::f64::consts::PI / 180.0)
}

pub fn rad_to_deg(rad: f64) -> f64 {
    rad * (180.0 / std::f64::consts::PI)
}

pub fn normalize_angle(angle: f64) -> f64 {
    angle.rem_euclid(FULL_TURN)
}

pub fn normalize_radians(angle: f64) -> f64 {
    angle.rem_euclid(TAU)
}

/// Maps a compass azimuth (0=N, 90=E) onto the horizon-arc theta used by the
/// widget: E -> 0, S -> 90, W -> 180, N -> 270.
///
/// Normalisation is a pair of correction loops rather than a single modulo so
/// in-range inputs come out exactly as the loop formulation produces them.
pub fn az_to_theta(azimuth: f64) -> f64 {
    let mut t = azimuth - THETA_ORIGIN;
    if !t.is_finite() {
        return t;
    }
    if t.abs() >= THETA_LOOP_LIMIT {
        t = t.rem_euclid(FULL_TURN);
    }
    while t >= FULL_TURN {
        t -= FULL_TURN;
    }
    while t < 0.0 {
        t += FULL_TURN;
    }
    t
}

/// Julian centuries since J2000.0.
pub fn julian_centuries(jd: f64) -> f64 {
    (jd - 2_451_545.0) / 36_525.0
}

/// Mean obliquity of the ecliptic (IAU), degrees.
pub fn mean_obliquity(jde: f64) -> f64 {
    let t = julian_centuries(jde);
    23.439_291_1 - 0.013_004_166_7 * t - 1.638_9e-7 * t * t + 5.036_1e-7 * t * t * t
}

/// Greenwich mean sidereal time for a UT Julian day, degrees in [0, 360).
pub fn greenwich_mean_sidereal_time(jd: f64) -> f64 {
    let t = julian_centuries(jd);
    normalize_angle(
        280.460_618_37 + 360.985_647_366_29 * (jd - 2_451_545.0) + 0.000_387_933 * t * t
            - t * t * t / 38_710_000.0,
    )
}

/// Local hour angle in radians. Longitude is degrees, east positive.
pub fn hour_angle(jd: f64, longitude: f64, right_ascension: f64) -> f64 {
    let lst = deg_to_rad(greenwich_mean_sidereal_time(jd) + longitude);
    normalize_radians(lst - right_ascension)
}

pub fn ecliptic_to_equatorial(longitude: f64, latitude: f64, obliquity: f64) -> EquatorialPosition {
    let (sin_eps, cos_eps) = obliquity.sin_cos();
    let ra = (longitude.sin() * cos_eps - latitude.tan() * sin_eps).atan2(longitude.cos());
    let sin_dec = latitude.sin() * cos_eps + latitude.cos() * sin_eps * longitude.sin();
    EquatorialPosition {
        right_ascension: normalize_radians(ra),
        declination: sin_dec.clamp(-1.0, 1.0).asin(),
    }
}

/// Equatorial to horizontal, everything in radians. Azimuth is measured from
/// north through east.
pub fn equatorial_to_horizontal(
    hour_angle: f64,
    declination: f64,
    latitude: f64,
) -> HorizontalPosition {
    let sin_alt =
        latitude.sin() * declination.sin() + latitude.cos() * declination.cos() * hour_angle.cos();
    let sin_az = -declination.cos() * hour_angle.sin();
    let cos_az =
        declination.sin() * latitude.cos() - declination.cos() * latitude.sin() * hour_angle.cos();
    HorizontalPosition {
        azimuth: normalize_radians(sin_az.atan2(cos_az)),
        altitude: sin_alt.clamp(-1.0, 1.0).asin(),
    }
}

/// Lowering of the altitude seen from the surface instead of Earth's centre.
pub fn parallax_in_altitude(altitude: f64, distance_km: f64) -> f64 {
    let sin_pi = (EARTH_EQUATORIAL_RADIUS_KM / distance_km).min(1.0);
    (sin_pi * altitude.cos()).asin()
}

/// Saemundsson refraction for a true altitude in degrees, returned in degrees.
pub fn refraction(true_altitude: f64, pressure_hpa: f64, temperature_c: f64) -> f64 {
    if true_altitude < -1.0 {
        return 0.0;
    }
    let arg = deg_to_rad(true_altitude + 10.3 / (true_altitude + 5.11));
    let arcmin = 1.02 / arg.tan() + 0.001_927_9;
    let scale = (pressure_hpa / STANDARD_PRESSURE_HPA) * (283.0 / (273.0 + temperature_c));
    arcmin * scale / 60.0
}
