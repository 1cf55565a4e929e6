use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SkyError>;

#[derive(Error, Debug)]
pub enum SkyError {
    /// Every location source came up empty. The user can fix this one.
    #[error("could not determine observer location (script {script}, env {lat_var}/{lon_var})")]
    LocationUnavailable {
        script: PathBuf,
        lat_var: String,
        lon_var: String,
    },

    #[error("observer coordinates out of range: lat={latitude} lon={longitude}")]
    InvalidObserver { latitude: f64, longitude: f64 },

    #[error("ephemeris produced a non-finite position for {body}")]
    NonFinitePosition { body: &'static str },

    #[error("home directory could not be determined")]
    NoHomeDirectory,

    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SkyError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SkyError::Io {
            path: path.into(),
            source,
        }
    }
}
