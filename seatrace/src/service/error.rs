//! Service error types.

use thiserror::Error;

use crate::coord::CoordError;
use crate::delivery::DeliveryError;
use crate::path::PathError;
use crate::sampler::SamplerError;
use crate::spec::ValidationError;

/// Failures surfaced by the service facade.
///
/// Everything here is raised synchronously at submission or construction;
/// once a producer task is running, per-step failures are logged and
/// swallowed instead of propagating.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The specification failed a submission rule.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Another run already owns the identifier.
    #[error("the identifier '{identifier}' is already in use")]
    Conflict { identifier: String },

    /// A waypoint could not be projected into or out of the planar frame.
    #[error(transparent)]
    Coord(#[from] CoordError),

    /// The geometry collaborator rejected the waypoints.
    #[error(transparent)]
    Path(#[from] PathError),

    /// The stochastic walk failed (degenerate path, step cap).
    #[error(transparent)]
    Sampler(#[from] SamplerError),

    /// A sample record could not be serialized for delivery.
    #[error("failed to encode sample payload: {0}")]
    Payload(#[from] serde_json::Error),

    /// The delivery transport could not be constructed.
    #[error(transparent)]
    Delivery(#[from] DeliveryError),
}
