//! Stochastic path sampling.
//!
//! Walks a [`Curve`] in arc length and time: each step draws a half-normal
//! time increment and a normally distributed instantaneous speed, advances
//! the cumulative arc position by their product, and stops before the walk
//! would pass the end of the curve. The surviving arc positions become
//! noisy, timestamped [`SamplePoint`]s; the raw per-step time deltas are
//! kept alongside them because the producer paces real-time delivery with
//! them.
//!
//! The walk only terminates probabilistically (the expected step size must
//! be positive), so an explicit step cap bounds it: a specification whose
//! draws never advance the walk fails with [`SamplerError::StepLimitExceeded`]
//! instead of spinning.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use rand_distr::{Distribution, Normal};
use thiserror::Error;

use crate::path::{Curve, Waypoint};

/// Hard cap on sampling steps, counting discarded draws.
pub const MAX_SAMPLE_STEPS: usize = 1_000_000;

/// Parameters of the stochastic walk.
#[derive(Debug, Clone)]
pub struct SamplerConfig {
    /// Mean time between samples in seconds.
    pub mean_time_delta: f64,
    /// Half-normal spread added to the mean time delta, in seconds.
    pub std_time_delta: f64,
    /// Mean vehicle speed in meters per second.
    pub mean_speed: f64,
    /// Normal spread of the instantaneous speed.
    pub std_speed: f64,
    /// Per-axis Gaussian noise applied to every sampled position, in meters.
    pub std_spatial: f64,
    /// Timestamp of the first sample.
    pub start_time: DateTime<Utc>,
    /// Step cap; [`MAX_SAMPLE_STEPS`] unless a test narrows it.
    pub max_steps: usize,
}

/// One noisy position sample with its absolute timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplePoint {
    pub position: Waypoint,
    pub timestamp: DateTime<Utc>,
}

/// A fully sampled trajectory.
///
/// `time_deltas[i]` is the simulated travel time leading into `points[i]`;
/// the first entry is always zero.
#[derive(Debug, Clone)]
pub struct Trajectory {
    pub points: Vec<SamplePoint>,
    pub time_deltas: Vec<f64>,
}

/// Errors produced while sampling a curve.
#[derive(Debug, Error, PartialEq)]
pub enum SamplerError {
    /// The curve has zero total length; start and end coincide.
    #[error("degenerate path: the curve has zero total length")]
    DegeneratePath,

    /// The walk failed to reach the end of the curve within the step cap.
    #[error("sampling did not finish within {limit} steps; expected step size is too small")]
    StepLimitExceeded { limit: usize },

    /// A deviation parameter was not usable as a normal distribution.
    #[error("invalid distribution parameter: {0}")]
    Distribution(String),
}

/// Samples a curve into a timestamped noisy trajectory.
///
/// The walk starts at arc position zero (so the first sample sits at the
/// start of the curve, spatial noise included) and discards the first step
/// that would reach or pass the total length; no sample is ever emitted
/// beyond the end of the path. Speed draws are clamped at zero and a draw
/// that does not advance the walk is discarded, which keeps the sequence
/// of arc-length fractions strictly increasing. Discarded draws still
/// count against `config.max_steps`.
pub fn sample_path<R: Rng + ?Sized>(
    curve: &Curve,
    config: &SamplerConfig,
    rng: &mut R,
) -> Result<Trajectory, SamplerError> {
    let total = curve.total_length();
    if total <= 0.0 {
        return Err(SamplerError::DegeneratePath);
    }

    let time_noise = normal(config.std_time_delta)?;
    let speed_noise = normal(config.std_speed)?;
    let spatial_noise = normal(config.std_spatial)?;

    let mut arc_positions = vec![0.0_f64];
    let mut deltas = vec![0.0_f64];
    let mut arc = 0.0_f64;
    let mut steps = 0_usize;

    loop {
        steps += 1;
        if steps > config.max_steps {
            return Err(SamplerError::StepLimitExceeded {
                limit: config.max_steps,
            });
        }

        let dt = config.mean_time_delta + time_noise.sample(rng).abs();
        let speed = (config.mean_speed + speed_noise.sample(rng)).max(0.0);
        let advance = speed * dt;
        if advance <= 0.0 {
            // Non-advancing draw; discarded but counted against the cap
            continue;
        }
        if arc + advance >= total {
            break;
        }
        arc += advance;
        arc_positions.push(arc);
        deltas.push(dt);
    }

    let mut points = Vec::with_capacity(arc_positions.len());
    let mut elapsed = 0.0_f64;
    for (position, dt) in arc_positions.iter().zip(&deltas) {
        elapsed += dt;
        let base = curve.point_at_fraction(position / total);
        let noisy = Waypoint::new(
            base.x + spatial_noise.sample(rng),
            base.y + spatial_noise.sample(rng),
            base.z + spatial_noise.sample(rng),
        );
        points.push(SamplePoint {
            position: noisy,
            timestamp: config.start_time + Duration::microseconds((elapsed * 1e6).round() as i64),
        });
    }

    Ok(Trajectory {
        points,
        time_deltas: deltas,
    })
}

fn normal(std_dev: f64) -> Result<Normal<f64>, SamplerError> {
    Normal::new(0.0, std_dev).map_err(|e| SamplerError::Distribution(e.to_string()))
}
