//! HTTP interface of the trace service.
//!
//! Routes map one-to-one onto the external interfaces: submission, stop,
//! the two live-tail streams (server-sent events), a liveness probe, and a
//! debug echo sink that logs whatever samples reach it. Handlers stay thin;
//! everything of substance happens in [`TraceService`].

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use futures::stream::Stream;
use serde_json::{json, Value};
use tracing::{error, info};

use seatrace::delivery::SampleRecord;
use seatrace::service::{ServiceError, TraceService};
use seatrace::spec::GeneratorSpecification;
use seatrace::store::LogEntry;
use seatrace::tail::LogCursor;

/// Builds the application router around a shared service instance.
pub fn router(service: Arc<TraceService>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/generators", post(submit_generator))
        .route("/generators/:id/stop", post(stop_generator))
        .route("/generators/status/stream", get(status_stream))
        .route("/generators/:id/log/stream", get(log_stream))
        .route("/sink/echo", post(sink_echo))
        .with_state(service)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn submit_generator(
    State(service): State<Arc<TraceService>>,
    Json(spec): Json<GeneratorSpecification>,
) -> Response {
    let identifier = spec.identifier.clone();
    match service.submit(spec) {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "message": format!("Generator '{}' started.", identifier) })),
        )
            .into_response(),
        Err(e) => submit_error_response(e),
    }
}

/// Maps submission failures onto status codes: bad input is 400, a live
/// duplicate identifier is 409, a specification that parses but cannot
/// produce a trajectory is 422.
fn submit_error_response(error: ServiceError) -> Response {
    let status = match &error {
        ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
        ServiceError::Conflict { .. } => StatusCode::CONFLICT,
        ServiceError::Coord(_) | ServiceError::Path(_) | ServiceError::Sampler(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        ServiceError::Payload(_) | ServiceError::Delivery(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(json!({ "detail": error.to_string() }))).into_response()
}

async fn stop_generator(
    State(service): State<Arc<TraceService>>,
    Path(identifier): Path<String>,
) -> Response {
    service.stop(&identifier);
    (
        StatusCode::OK,
        Json(json!({ "message": format!("Generator '{}' shut down.", identifier) })),
    )
        .into_response()
}

/// Streams a full status snapshot every poll interval.
async fn status_stream(
    State(service): State<Arc<TraceService>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let interval = service.settings().poll_interval();
    let stream = futures::stream::unfold((service, true), move |(service, first)| async move {
        if !first {
            tokio::time::sleep(interval).await;
        }
        let rows = service.status();
        let event = match Event::default().json_data(&rows) {
            Ok(event) => event,
            Err(e) => {
                error!(error = %e, "failed to encode status snapshot");
                Event::default().data("[]")
            }
        };
        Some((Ok(event), (service, false)))
    });
    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// Streams one generator's event log: the full backlog on connect, then
/// only the delta on each poll that saw new entries.
async fn log_stream(
    State(service): State<Arc<TraceService>>,
    Path(identifier): Path<String>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let interval = service.settings().poll_interval();
    let log = service.event_log();
    let stream = futures::stream::unfold(
        (log, LogCursor::new(), identifier, true),
        move |(log, mut cursor, identifier, first)| async move {
            loop {
                let delta = cursor.poll(log.as_ref(), &identifier);
                // The initial read goes out even when empty so the observer
                // sees the connection is live; later polls only emit deltas
                if !delta.is_empty() || first {
                    let event = log_batch_event(&delta);
                    return Some((
                        Ok::<_, Infallible>(event),
                        (log, cursor, identifier, false),
                    ));
                }
                tokio::time::sleep(interval).await;
            }
        },
    );
    Sse::new(stream).keep_alive(KeepAlive::default())
}

fn log_batch_event(entries: &[LogEntry]) -> Event {
    let batch: Vec<Value> = entries
        .iter()
        .map(|entry| {
            json!({
                "index": entry.index,
                "record": serde_json::from_str::<Value>(&entry.payload)
                    .unwrap_or(Value::String(entry.payload.clone())),
            })
        })
        .collect();
    match Event::default().json_data(&batch) {
        Ok(event) => event,
        Err(e) => {
            error!(error = %e, "failed to encode log batch");
            Event::default().data("[]")
        }
    }
}

/// Debug sink: logs any sample record posted to it.
async fn sink_echo(Json(record): Json<SampleRecord>) -> Response {
    info!(
        identifier = %record.identifier,
        latitude = record.latitude,
        longitude = record.longitude,
        elevation = record.elevation,
        timestamp = %record.timestamp,
        "echo sink received sample"
    );
    (
        StatusCode::OK,
        Json(json!({ "message": "Sample received." })),
    )
        .into_response()
}
