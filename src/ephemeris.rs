//! Observer context and the ephemeris used to place bodies on the local sky.
//!
//! Planets come from VSOP87D (heliocentric, ecliptic and equinox of date) and
//! the Moon from ELP-2000/82. Both are reduced to geocentric ecliptic
//! coordinates, rotated to equatorial with the mean obliquity, then to the
//! observer's horizon with parallax and refraction applied.

use chrono::{DateTime, TimeZone};
use log::debug;
use vsop87::vsop87d;

use crate::angles::{
    deg_to_rad, ecliptic_to_equatorial, equatorial_to_horizontal, hour_angle, mean_obliquity,
    parallax_in_altitude, rad_to_deg, refraction, STANDARD_PRESSURE_HPA, STANDARD_TEMPERATURE_C,
};
use crate::error::{Result, SkyError};
use crate::types::{CelestialBody, EclipticPosition, HorizontalPosition, Location};

pub const UNIX_EPOCH_JD: f64 = 2_440_587.5;
pub const AU_KM: f64 = 149_597_870.7;
/// Light travel time for one astronomical unit, in days.
pub const LIGHT_TIME_DAYS_PER_AU: f64 = 0.005_775_518_3;

const SECONDS_PER_DAY: f64 = 86_400.0;

pub fn julian_day<Tz: TimeZone>(instant: &DateTime<Tz>) -> f64 {
    instant.timestamp_millis() as f64 / (SECONDS_PER_DAY * 1000.0) + UNIX_EPOCH_JD
}

pub fn decimal_year(jd: f64) -> f64 {
    2000.0 + (jd - 2_451_545.0) / 365.25
}

/// TT - UT in seconds, Espenak & Meeus polynomial fits.
pub fn delta_t(year: f64) -> f64 {
    if (1941.0..1961.0).contains(&year) {
        let t = year - 1950.0;
        29.07 + 0.407 * t - t * t / 233.0 + t * t * t / 2547.0
    } else if (1961.0..1986.0).contains(&year) {
        let t = year - 1975.0;
        45.45 + 1.067 * t - t * t / 260.0 - t * t * t / 718.0
    } else if (1986.0..2005.0).contains(&year) {
        let t = year - 2000.0;
        63.86 + 0.3345 * t - 0.060_374 * t.powi(2)
            + 0.001_727_5 * t.powi(3)
            + 0.000_651_814 * t.powi(4)
            + 0.000_023_735_99 * t.powi(5)
    } else if (2005.0..2050.0).contains(&year) {
        let t = year - 2000.0;
        62.92 + 0.322_17 * t + 0.005_589 * t * t
    } else if (2050.0..2150.0).contains(&year) {
        let u = (year - 1820.0) / 100.0;
        -20.0 + 32.0 * u * u - 0.5628 * (2150.0 - year)
    } else {
        let u = (year - 1820.0) / 100.0;
        -20.0 + 32.0 * u * u
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observer {
    location: Location,
    elevation_m: f64,
    pressure_hpa: f64,
    temperature_c: f64,
    jd: f64,
    jde: f64,
}

impl Observer {
    /// Sea-level observer with standard atmosphere at `instant`.
    pub fn new<Tz: TimeZone>(location: Location, instant: &DateTime<Tz>) -> Result<Self> {
        let Location {
            latitude,
            longitude,
        } = location;
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(SkyError::InvalidObserver {
                latitude,
                longitude,
            });
        }
        let jd = julian_day(instant);
        let jde = jd + delta_t(decimal_year(jd)) / SECONDS_PER_DAY;
        let observer = Self {
            location,
            elevation_m: 0.0,
            pressure_hpa: STANDARD_PRESSURE_HPA,
            temperature_c: STANDARD_TEMPERATURE_C,
            jd,
            jde,
        };
        debug!(
            "observer lat={} lon={} elev={}m jd={:.6} jde={:.6}",
            latitude, longitude, observer.elevation_m, jd, jde
        );
        Ok(observer)
    }

    pub fn location(&self) -> Location {
        self.location
    }

    pub fn elevation_m(&self) -> f64 {
        self.elevation_m
    }

    /// Julian day, universal time.
    pub fn jd(&self) -> f64 {
        self.jd
    }

    /// Julian ephemeris day, dynamical time.
    pub fn jde(&self) -> f64 {
        self.jde
    }
}

/// Source of topocentric positions. Treated as a trusted oracle by the writer.
pub trait Ephemeris {
    fn horizontal(&self, body: CelestialBody, observer: &Observer) -> Result<HorizontalPosition>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Vsop87Ephemeris;

impl Vsop87Ephemeris {
    pub fn new() -> Self {
        Self
    }

    pub fn geocentric_ecliptic(&self, body: CelestialBody, jde: f64) -> EclipticPosition {
        planet_geocentric(body, jde).unwrap_or_else(|| moon_geocentric(jde))
    }
}

impl Ephemeris for Vsop87Ephemeris {
    fn horizontal(&self, body: CelestialBody, observer: &Observer) -> Result<HorizontalPosition> {
        let Location {
            latitude,
            longitude,
        } = observer.location;
        let ecl = self.geocentric_ecliptic(body, observer.jde);
        let eq = ecliptic_to_equatorial(
            ecl.longitude,
            ecl.latitude,
            deg_to_rad(mean_obliquity(observer.jde)),
        );
        let ha = hour_angle(observer.jd, longitude, eq.right_ascension);
        let geo = equatorial_to_horizontal(ha, eq.declination, deg_to_rad(latitude));

        let true_altitude = geo.altitude - parallax_in_altitude(geo.altitude, ecl.distance_km);
        let apparent_altitude = true_altitude
            + deg_to_rad(refraction(
                rad_to_deg(true_altitude),
                observer.pressure_hpa,
                observer.temperature_c,
            ));

        if !geo.azimuth.is_finite() || !apparent_altitude.is_finite() {
            return Err(SkyError::NonFinitePosition { body: body.key() });
        }
        Ok(HorizontalPosition {
            azimuth: geo.azimuth,
            altitude: apparent_altitude,
        })
    }
}

fn moon_geocentric(jde: f64) -> EclipticPosition {
    let (point, distance_km) = astro::lunar::geocent_ecl_pos(jde);
    EclipticPosition {
        longitude: point.long,
        latitude: point.lat,
        distance_km,
    }
}

/// Heliocentric rectangular ecliptic coordinates in AU, `None` for the Moon.
fn heliocentric(body: CelestialBody, jde: f64) -> Option<[f64; 3]> {
    let coords = match body {
        CelestialBody::Moon => return None,
        CelestialBody::Mercury => vsop87d::mercury(jde),
        CelestialBody::Venus => vsop87d::venus(jde),
        CelestialBody::Mars => vsop87d::mars(jde),
        CelestialBody::Jupiter => vsop87d::jupiter(jde),
        CelestialBody::Saturn => vsop87d::saturn(jde),
    };
    Some(rectangular(
        coords.longitude(),
        coords.latitude(),
        coords.distance(),
    ))
}

fn earth_heliocentric(jde: f64) -> [f64; 3] {
    let coords = vsop87d::earth(jde);
    rectangular(coords.longitude(), coords.latitude(), coords.distance())
}

fn rectangular(longitude: f64, latitude: f64, radius: f64) -> [f64; 3] {
    [
        radius * latitude.cos() * longitude.cos(),
        radius * latitude.cos() * longitude.sin(),
        radius * latitude.sin(),
    ]
}

fn sub(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

fn norm(v: [f64; 3]) -> f64 {
    (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
}

fn planet_geocentric(body: CelestialBody, jde: f64) -> Option<EclipticPosition> {
    let earth = earth_heliocentric(jde);
    let mut d = sub(heliocentric(body, jde)?, earth);
    // Planet seen where it was when the light left it.
    for _ in 0..2 {
        let tau = LIGHT_TIME_DAYS_PER_AU * norm(d);
        d = sub(heliocentric(body, jde - tau)?, earth);
    }

    let [x, y, z] = d;
    Some(EclipticPosition {
        longitude: y.atan2(x).rem_euclid(std::f64::consts::TAU),
        latitude: z.atan2(x.hypot(y)),
        distance_km: norm(d) * AU_KM,
    })
}
