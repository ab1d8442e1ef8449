//! seatrace CLI - HTTP service entry point
//!
//! Parses arguments, bootstraps logging, wires the trace service and serves
//! the HTTP interface until Ctrl-C.

mod error;
mod server;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::info;

use error::CliError;
use seatrace::config::{ServiceSettings, DEFAULT_UTM_ZONE};
use seatrace::logging::{default_log_dir, default_log_file, init_logging};
use seatrace::service::TraceService;

#[derive(Debug, Parser)]
#[command(name = "seatrace")]
#[command(about = "Simulated UUV trajectory generation service", long_about = None)]
#[command(version = seatrace::VERSION)]
struct Args {
    /// Address the HTTP interface binds to
    #[arg(long, default_value = "127.0.0.1:8000")]
    bind: SocketAddr,

    /// UTM zone of the local planar frame
    #[arg(long, default_value_t = DEFAULT_UTM_ZONE)]
    utm_zone: u8,

    /// Live-tail poll interval in milliseconds
    #[arg(long, default_value_t = 250)]
    poll_interval_ms: u64,

    /// Per-request sample delivery timeout in milliseconds
    #[arg(long, default_value_t = 2500)]
    delivery_timeout_ms: u64,

    /// Directory for log files
    #[arg(long, default_value_t = default_log_dir().to_string())]
    log_dir: String,

    /// Log file name
    #[arg(long, default_value_t = default_log_file().to_string())]
    log_file: String,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    if let Err(e) = run(args).await {
        e.exit();
    }
}

async fn run(args: Args) -> Result<(), CliError> {
    let _logging_guard = init_logging(&args.log_dir, &args.log_file)
        .map_err(|e| CliError::LoggingInit(e.to_string()))?;

    info!(version = seatrace::VERSION, "starting seatrace");

    let settings = ServiceSettings::new()
        .with_utm_zone(args.utm_zone)
        .with_poll_interval(Duration::from_millis(args.poll_interval_ms))
        .with_delivery_timeout(Duration::from_millis(args.delivery_timeout_ms));
    let service = Arc::new(TraceService::new(settings).map_err(CliError::ServiceCreation)?);

    let app = server::router(service);
    let listener = tokio::net::TcpListener::bind(args.bind)
        .await
        .map_err(|error| CliError::Bind {
            addr: args.bind,
            error,
        })?;
    info!(addr = %args.bind, "HTTP interface listening");

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown signal received");
            signal_token.cancel();
        }
    });

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| CliError::Serve(e.to_string()))?;

    info!("seatrace stopped");
    Ok(())
}
