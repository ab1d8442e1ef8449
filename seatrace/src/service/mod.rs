//! Service facade module
//!
//! Wires validation, projection, geometry, sampling, the coordination
//! store, delivery and the producer tasks behind one entry point. The HTTP
//! layer talks only to [`TraceService`].

mod error;
mod facade;

pub use error::ServiceError;
pub use facade::TraceService;
