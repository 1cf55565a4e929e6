#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Bodies published to the vars file, in output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CelestialBody {
    Moon,
    Venus,
    Mars,
    Jupiter,
    Saturn,
    Mercury,
}

impl CelestialBody {
    pub const ALL: [CelestialBody; 6] = [
        CelestialBody::Moon,
        CelestialBody::Venus,
        CelestialBody::Mars,
        CelestialBody::Jupiter,
        CelestialBody::Saturn,
        CelestialBody::Mercury,
    ];

    /// Upper-case prefix used for the `<KEY>_AZ` style variable names.
    pub fn key(&self) -> &'static str {
        match self {
            CelestialBody::Moon => "MOON",
            CelestialBody::Venus => "VENUS",
            CelestialBody::Mars => "MARS",
            CelestialBody::Jupiter => "JUPITER",
            CelestialBody::Saturn => "SATURN",
            CelestialBody::Mercury => "MERCURY",
        }
    }
}

/// Topocentric apparent position, radians. Azimuth runs from north through east.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HorizontalPosition {
    pub azimuth: f64,
    pub altitude: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EquatorialPosition {
    pub right_ascension: f64,
    pub declination: f64,
}

/// Geocentric ecliptic coordinates of date. Angles in radians, distance in km.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EclipticPosition {
    pub longitude: f64,
    pub latitude: f64,
    pub distance_km: f64,
}

/// One body's published fields, all in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyReading {
    pub body: CelestialBody,
    pub azimuth: f64,
    pub altitude: f64,
    pub theta: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkySnapshot {
    pub location: Location,
    pub timestamp: i64,
    pub readings: Vec<BodyReading>,
}
