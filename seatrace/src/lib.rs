//! seatrace - Simulated UUV trajectory generation and streaming
//!
//! This library simulates moving underwater vehicles: each submitted
//! specification turns a sequence of geographic waypoints into a stochastic,
//! time-stamped stream of noisy position samples, delivered at a paced
//! real-time rate to an external HTTP sink. Any number of generators run
//! concurrently; all of them can be inspected live and stopped on demand.
//!
//! # High-Level API
//!
//! The [`service`] module provides the facade most callers want:
//!
//! ```ignore
//! use seatrace::config::ServiceSettings;
//! use seatrace::service::TraceService;
//!
//! let service = TraceService::new(ServiceSettings::default())?;
//! service.submit(specification)?;
//! ```
//!
//! The building blocks underneath are exposed for direct use: [`path`]
//! builds an arc-length-parameterized curve through the waypoints,
//! [`sampler`] walks it stochastically, [`producer`] delivers the resulting
//! trajectory, and [`store`] + [`tail`] carry the live status and log views.

pub mod config;
pub mod coord;
pub mod delivery;
pub mod logging;
pub mod path;
pub mod producer;
pub mod sampler;
pub mod service;
pub mod spec;
pub mod store;
pub mod tail;

/// Version of the seatrace library and CLI.
///
/// Synchronized across all workspace members; defined in `Cargo.toml` and
/// injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
