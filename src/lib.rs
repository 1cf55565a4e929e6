pub mod angles;
pub mod config;
pub mod ephemeris;
pub mod error;
pub mod location;
pub mod snapshot;
pub mod types;

pub use angles::{
    az_to_theta, deg_to_rad, ecliptic_to_equatorial, equatorial_to_horizontal,
    greenwich_mean_sidereal_time, hour_angle, mean_obliquity, normalize_angle, rad_to_deg,
    refraction, FULL_TURN, THETA_ORIGIN,
};

pub use config::Config;

pub use ephemeris::{delta_t, julian_day, Ephemeris, Observer, Vsop87Ephemeris};

pub use error::{Result, SkyError};

pub use location::{parse_lat_lon, EnvironmentVars, LocationResolver, LocationSource, StationScript};

pub use snapshot::{
    compute_snapshot, format_coordinate, publish, render_vars, snapshot_lines, write_atomic,
    StagedSnapshot,
};

pub use types::{
    BodyReading, CelestialBody, EclipticPosition, EquatorialPosition, HorizontalPosition, Location,
    SkySnapshot,
};
