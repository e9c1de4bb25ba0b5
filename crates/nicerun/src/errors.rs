use serde::Serialize;
use thiserror::Error;

/// Fatal failures while turning raw file bytes into an activity.
#[derive(Error, Debug)]
pub enum TrackError {
    #[error("Malformed track: {0}")]
    MalformedTrack(String),

    #[error("Unsupported file: {0}")]
    UnsupportedFormat(String),

    #[error("Failed to parse FIT file: {0}")]
    Fit(String),

    #[error("Failed to parse XML document: {0}")]
    Xml(String),
}

impl TrackError {
    pub fn malformed(msg: impl Into<String>) -> Self {
        TrackError::MalformedTrack(msg.into())
    }
}

/// Degraded-data conditions that do not stop processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataWarning {
    /// The heart-rate channel is absent for the whole track.
    MissingHeartRate,
    /// The elevation provider had no value for this many samples.
    ElevationUnavailable { samples: usize },
}

impl std::fmt::Display for DataWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataWarning::MissingHeartRate => write!(f, "no heart rate data"),
            DataWarning::ElevationUnavailable { samples } => {
                write!(f, "elevation unavailable for {samples} samples")
            }
        }
    }
}
