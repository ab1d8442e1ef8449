//! Integration tests for the trace service.
//!
//! These tests drive the full pipeline through the public facade with an
//! injected recording sink: submission, projection, interpolation,
//! sampling, producer pacing, event logging, live-tail cursors and stop
//! handling. Time is paused so the paced runs complete deterministically.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use seatrace::config::ServiceSettings;
use seatrace::coord::{geo_to_local, local_to_geo};
use seatrace::delivery::{DeliveryError, SampleRecord, SampleSink};
use seatrace::path::FilletInterpolator;
use seatrace::sampler::SamplerError;
use seatrace::service::{ServiceError, TraceService};
use seatrace::spec::{GeneratorSpecification, GeoWaypoint};
use seatrace::store::{InMemoryEventLog, InMemoryRegistry};
use seatrace::tail::LogCursor;

// =============================================================================
// Test Helpers
// =============================================================================

const ZONE: u8 = 35;
const BASE_LAT: f64 = 43.187634;
const BASE_LON: f64 = 27.926699;

/// Sink that records every delivered payload.
struct RecordingSink {
    delivered: Mutex<Vec<String>>,
}

impl RecordingSink {
    fn new() -> Self {
        Self {
            delivered: Mutex::new(Vec::new()),
        }
    }

    fn delivered(&self) -> Vec<String> {
        self.delivered.lock().unwrap().clone()
    }
}

impl SampleSink for RecordingSink {
    fn deliver<'a>(
        &'a self,
        _url: &'a str,
        payload: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<(), DeliveryError>> + Send + 'a>> {
        Box::pin(async move {
            self.delivered.lock().unwrap().push(payload.to_string());
            Ok(())
        })
    }
}

struct Fixture {
    service: TraceService,
    sink: Arc<RecordingSink>,
}

fn fixture() -> Fixture {
    let sink = Arc::new(RecordingSink::new());
    let service = TraceService::with_components(
        ServiceSettings::default(),
        Arc::new(InMemoryRegistry::new()),
        Arc::new(InMemoryEventLog::new()),
        Arc::clone(&sink) as Arc<dyn SampleSink>,
        Arc::new(FilletInterpolator::new()),
    );
    Fixture { service, sink }
}

/// A waypoint `north_m` meters north of the base point.
fn waypoint_north(north_m: f64) -> GeoWaypoint {
    let (northing, easting) = geo_to_local(BASE_LAT, BASE_LON, ZONE).expect("base point projects");
    let (latitude, longitude) =
        local_to_geo(northing + north_m, easting, ZONE).expect("offset point projects");
    GeoWaypoint {
        latitude,
        longitude,
        elevation: 0.0,
    }
}

/// Deterministic specification: a straight south-to-north leg walked at
/// 1 m/s in exact 10 s steps with no noise anywhere.
fn deterministic_spec(identifier: &str, length_m: f64) -> GeneratorSpecification {
    serde_json::from_value(serde_json::json!({
        "identifier": identifier,
        "url": "http://sink.example/ingest",
        "waypoints": [waypoint_json(waypoint_north(0.0)), waypoint_json(waypoint_north(length_m))],
        "start_datetime": "2024-05-01T12:00:00Z",
        "mean_time_delta": 10.0,
        "std_time_delta": 0.0,
        "mean_speed": 1.0,
        "std_speed": 0.0,
        "std_spatial": 0.0,
        "turning_radius": 0.0,
    }))
    .expect("deterministic specification must parse")
}

fn waypoint_json(w: GeoWaypoint) -> serde_json::Value {
    serde_json::json!({
        "latitude": w.latitude,
        "longitude": w.longitude,
        "elevation": w.elevation,
    })
}

async fn wait_until_inactive(service: &TraceService, identifier: &str) {
    let registry = service.registry();
    for _ in 0..2_000 {
        if !registry.is_active(identifier) {
            return;
        }
        tokio::time::sleep(Duration::from_secs(1)).await;
    }
    panic!("generator '{}' did not finish in time", identifier);
}

// =============================================================================
// Scenario A: deterministic end-to-end run
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_deterministic_run_delivers_ten_points_at_gapless_indices() {
    let fx = fixture();
    // 95 m at 1 m/s in 10 s steps: samples at 0, 10, ..., 90 m; the step
    // that would pass the end of the path is discarded
    fx.service
        .submit(deterministic_spec("uuv1", 95.0))
        .expect("submission starts");

    wait_until_inactive(&fx.service, "uuv1").await;

    let delivered = fx.sink.delivered();
    assert_eq!(delivered.len(), 10, "exactly ten samples must be delivered");

    let entries = fx.service.event_log().read_range("uuv1", 0, 100);
    assert_eq!(entries.len(), 10);
    for (i, entry) in entries.iter().enumerate() {
        assert_eq!(entry.index, i as u64, "log indices must be gapless");
        assert_eq!(entry.payload, delivered[i], "log mirrors the wire payload");
    }

    // Delivered records are geographic, stamped 10 s apart, and walk north
    let records: Vec<SampleRecord> = delivered
        .iter()
        .map(|p| serde_json::from_str(p).expect("payload must parse"))
        .collect();
    assert!((records[0].latitude - BASE_LAT).abs() < 1e-6);
    for (i, record) in records.iter().enumerate() {
        assert_eq!(record.identifier, "uuv1");
        assert_eq!(record.elevation, 0.0);
        if i > 0 {
            let dt = record.timestamp - records[i - 1].timestamp;
            assert_eq!(dt, chrono::Duration::seconds(10));
            assert!(
                record.latitude > records[i - 1].latitude,
                "the vehicle must move north"
            );
        }
    }
}

// =============================================================================
// Scenario B: duplicate identifier
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_duplicate_identifier_conflicts_and_leaves_first_run_intact() {
    let fx = fixture();
    fx.service
        .submit(deterministic_spec("x", 500.0))
        .expect("first submission starts");

    match fx.service.submit(deterministic_spec("x", 500.0)) {
        Err(ServiceError::Conflict { identifier }) => assert_eq!(identifier, "x"),
        other => panic!("expected a conflict, got {:?}", other),
    }

    // The first run keeps going and eventually exhausts on its own
    assert!(fx.service.registry().is_active("x"));
    wait_until_inactive(&fx.service, "x").await;
    assert_eq!(fx.service.event_log().count("x"), 50);
}

// =============================================================================
// Scenario C: stop mid-run
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_stop_mid_run_halts_appends_and_clears_the_active_set() {
    let fx = fixture();
    fx.service
        .submit(deterministic_spec("uuv1", 500.0))
        .expect("submission starts");

    // Let at least one sample through
    let log = fx.service.event_log();
    while log.count("uuv1") == 0 {
        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    fx.service.stop("uuv1");
    assert!(fx.service.status().is_empty());
    assert_eq!(log.count("uuv1"), 0, "stop clears the event log");

    // The producer observes the removal on its next poll; nothing is
    // appended afterwards no matter how long we wait
    tokio::time::sleep(Duration::from_secs(120)).await;
    assert_eq!(log.count("uuv1"), 0);
    assert!(!fx.service.registry().is_active("uuv1"));
}

// =============================================================================
// Scenario D: degenerate path
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_degenerate_path_fails_at_submission_without_registering() {
    let fx = fixture();
    let mut spec = deterministic_spec("uuv1", 95.0);
    spec.waypoints[1] = spec.waypoints[0];

    match fx.service.submit(spec) {
        Err(ServiceError::Sampler(SamplerError::DegeneratePath)) => {}
        other => panic!("expected a degenerate-path error, got {:?}", other),
    }

    assert!(fx.service.status().is_empty());
    assert!(fx.sink.delivered().is_empty());
    assert_eq!(fx.service.event_log().count("uuv1"), 0);
}

// =============================================================================
// Live tail: cursor correctness against a running producer
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_incremental_tail_reassembles_the_full_log() {
    let fx = fixture();
    fx.service
        .submit(deterministic_spec("uuv1", 300.0))
        .expect("submission starts");

    let log = fx.service.event_log();
    let registry = fx.service.registry();
    let mut cursor = LogCursor::new();
    let mut collected = Vec::new();

    while registry.is_active("uuv1") {
        collected.extend(cursor.poll(log.as_ref(), "uuv1"));
        tokio::time::sleep(Duration::from_millis(250)).await;
    }
    collected.extend(cursor.poll(log.as_ref(), "uuv1"));

    let full = log.read_range("uuv1", 0, log.count("uuv1"));
    assert!(!full.is_empty());
    assert_eq!(
        collected, full,
        "concatenated deltas must equal one full read"
    );
}

// =============================================================================
// Status view
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_status_reports_all_running_generators() {
    let fx = fixture();
    fx.service
        .submit(deterministic_spec("uuv1", 500.0))
        .expect("first submission starts");
    fx.service
        .submit(deterministic_spec("uuv2", 500.0))
        .expect("second submission starts");

    let rows = fx.service.status();
    let ids: Vec<&str> = rows.iter().map(|r| r.identifier.as_str()).collect();
    assert_eq!(ids, vec!["uuv1", "uuv2"]);

    fx.service.stop("uuv1");
    let rows = fx.service.status();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].identifier, "uuv2");

    fx.service.stop("uuv2");
    assert!(fx.service.status().is_empty());
}
