//! Generator specification parsing and validation.
//!
//! A [`GeneratorSpecification`] is the submission payload: it names the
//! run, points at the delivery sink, and carries the geographic waypoints
//! plus the stochastic sampling parameters. It is consumed once to spawn a
//! producer task and never mutated afterwards.
//!
//! Validation happens synchronously at submission, before any task starts;
//! a specification that fails here never touches the registry.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

/// Default mean time between samples in seconds.
pub const DEFAULT_MEAN_TIME_DELTA: f64 = 7.5;
/// Default spread of the time between samples in seconds.
pub const DEFAULT_STD_TIME_DELTA: f64 = 1.5;
/// Default mean vehicle speed in meters per second.
pub const DEFAULT_MEAN_SPEED: f64 = 1.25;
/// Default spread of the vehicle speed.
pub const DEFAULT_STD_SPEED: f64 = 0.25;
/// Default spatial noise per axis in meters.
pub const DEFAULT_STD_SPATIAL: f64 = 0.25;
/// Default turning radius in meters.
pub const DEFAULT_TURNING_RADIUS: f64 = 25.0;

/// A geographic waypoint as submitted by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct GeoWaypoint {
    /// Latitude in degrees, positive north.
    pub latitude: f64,
    /// Longitude in degrees, positive east.
    pub longitude: f64,
    /// Elevation in meters; carried through the planar projection as-is.
    pub elevation: f64,
}

/// Specification of one trajectory generation run.
#[derive(Debug, Clone, Deserialize)]
pub struct GeneratorSpecification {
    /// Unique key naming the run; must not contain whitespace.
    pub identifier: String,

    /// Sink URL receiving one POST per generated sample.
    pub url: String,

    /// Geographic waypoints the vehicle navigates through; at least two.
    pub waypoints: Vec<GeoWaypoint>,

    /// Timestamp of the first generated sample.
    #[serde(default = "Utc::now", alias = "start_datetime")]
    pub start_time: DateTime<Utc>,

    /// Mean time between samples in seconds.
    #[serde(default = "default_mean_time_delta")]
    pub mean_time_delta: f64,

    /// Spread of the time between samples in seconds.
    #[serde(default = "default_std_time_delta")]
    pub std_time_delta: f64,

    /// Mean vehicle speed in meters per second.
    #[serde(default = "default_mean_speed")]
    pub mean_speed: f64,

    /// Spread of the vehicle speed.
    #[serde(default = "default_std_speed")]
    pub std_speed: f64,

    /// Spatial noise per axis in meters.
    #[serde(default = "default_std_spatial")]
    pub std_spatial: f64,

    /// Turning radius in meters.
    #[serde(default = "default_turning_radius")]
    pub turning_radius: f64,
}

fn default_mean_time_delta() -> f64 {
    DEFAULT_MEAN_TIME_DELTA
}
fn default_std_time_delta() -> f64 {
    DEFAULT_STD_TIME_DELTA
}
fn default_mean_speed() -> f64 {
    DEFAULT_MEAN_SPEED
}
fn default_std_speed() -> f64 {
    DEFAULT_STD_SPEED
}
fn default_std_spatial() -> f64 {
    DEFAULT_STD_SPATIAL
}
fn default_turning_radius() -> f64 {
    DEFAULT_TURNING_RADIUS
}

/// Rejections raised before a submission reaches the registry.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("the identifier cannot be empty or contain whitespace")]
    InvalidIdentifier,

    #[error("the waypoint list needs at least 2 entries, got {0}")]
    TooFewWaypoints(usize),

    #[error("the field '{0}' must be non-negative")]
    NegativeField(&'static str),

    #[error("the sink URL '{url}' is not a valid http(s) URL")]
    InvalidSinkUrl { url: String },
}

impl GeneratorSpecification {
    /// Checks the specification against the submission rules.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.identifier.is_empty() || self.identifier.chars().any(char::is_whitespace) {
            return Err(ValidationError::InvalidIdentifier);
        }

        match self.url.parse::<reqwest::Url>() {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            _ => {
                return Err(ValidationError::InvalidSinkUrl {
                    url: self.url.clone(),
                })
            }
        }

        if self.waypoints.len() < 2 {
            return Err(ValidationError::TooFewWaypoints(self.waypoints.len()));
        }

        for (name, value) in [
            ("mean_time_delta", self.mean_time_delta),
            ("std_time_delta", self.std_time_delta),
            ("std_speed", self.std_speed),
            ("std_spatial", self.std_spatial),
            ("turning_radius", self.turning_radius),
        ] {
            if value < 0.0 {
                return Err(ValidationError::NegativeField(name));
            }
        }

        Ok(())
    }
}
