//! CLI error handling with user-friendly messages.

use std::net::SocketAddr;
use std::process;

use seatrace::service::ServiceError;
use thiserror::Error;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Failed to initialize logging
    #[error("failed to initialize logging: {0}")]
    LoggingInit(String),

    /// Failed to create the trace service
    #[error("failed to create service: {0}")]
    ServiceCreation(#[source] ServiceError),

    /// Failed to bind the HTTP listener
    #[error("failed to bind {addr}: {error}")]
    Bind {
        addr: SocketAddr,
        #[source]
        error: std::io::Error,
    },

    /// The HTTP server exited with an error
    #[error("server error: {0}")]
    Serve(String),
}

impl CliError {
    /// Exit the process with an error message and a non-zero code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);
        process::exit(1)
    }
}
