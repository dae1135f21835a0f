use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimulationError {
    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("Invalid profile {name}: {reason}")]
    InvalidProfile { name: String, reason: String },

    #[error("Comparison run failed for profile {profile}: {source}")]
    ComparisonRun {
        profile: String,
        #[source]
        source: Box<SimulationError>,
    },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl SimulationError {
    pub fn invalid_profile(name: &str, reason: impl Into<String>) -> Self {
        Self::InvalidProfile {
            name: name.to_string(),
            reason: reason.into(),
        }
    }

    /// Wrap a per-profile failure raised during an orchestrated run
    pub fn comparison(profile: &str, cause: SimulationError) -> Self {
        Self::ComparisonRun {
            profile: profile.to_string(),
            source: Box::new(cause),
        }
    }
}

pub type Result<T> = std::result::Result<T, SimulationError>;
