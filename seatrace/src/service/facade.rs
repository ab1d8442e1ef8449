//! Trace service facade implementation.

use std::sync::Arc;

use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

use super::error::ServiceError;
use crate::config::ServiceSettings;
use crate::coord::{geo_to_local, local_to_geo};
use crate::delivery::{HttpSampleSink, SampleRecord, SampleSink};
use crate::path::{FilletInterpolator, PathInterpolator, Waypoint};
use crate::producer::{run_producer, DeliveryStep, ProducerContext};
use crate::sampler::{sample_path, SamplerConfig};
use crate::spec::GeneratorSpecification;
use crate::store::{EventLog, GeneratorRegistry, InMemoryEventLog, InMemoryRegistry};
use crate::tail::{status_snapshot, StatusRow};

/// High-level facade over the trajectory generation subsystems.
///
/// One instance serves any number of concurrent generator runs; the only
/// state it holds are the shared store handles and the wiring of the
/// collaborator seams, so it is cheap to share behind an `Arc`.
pub struct TraceService {
    settings: ServiceSettings,
    registry: Arc<dyn GeneratorRegistry>,
    event_log: Arc<dyn EventLog>,
    sink: Arc<dyn SampleSink>,
    interpolator: Arc<dyn PathInterpolator>,
}

impl TraceService {
    /// Create a service with the in-process store, the HTTP delivery sink
    /// and the corner-rounding interpolator.
    ///
    /// # Errors
    ///
    /// Returns an error if the delivery client cannot be built.
    pub fn new(settings: ServiceSettings) -> Result<Self, ServiceError> {
        let sink = HttpSampleSink::with_timeout(settings.delivery_timeout())?;
        Ok(Self::with_components(
            settings,
            Arc::new(InMemoryRegistry::new()),
            Arc::new(InMemoryEventLog::new()),
            Arc::new(sink),
            Arc::new(FilletInterpolator::new()),
        ))
    }

    /// Create a service from explicit collaborators.
    ///
    /// Production wiring goes through [`TraceService::new`]; this
    /// constructor exists so tests can inject mock sinks and stores.
    pub fn with_components(
        settings: ServiceSettings,
        registry: Arc<dyn GeneratorRegistry>,
        event_log: Arc<dyn EventLog>,
        sink: Arc<dyn SampleSink>,
        interpolator: Arc<dyn PathInterpolator>,
    ) -> Self {
        Self {
            settings,
            registry,
            event_log,
            sink,
            interpolator,
        }
    }

    /// Submit a generator specification and spawn its producer task.
    ///
    /// Validation, projection, geometry and sampling all run before the
    /// registry is touched, so a specification that cannot produce a
    /// trajectory never creates an entry. The register call itself is the
    /// atomic conflict gate: of two concurrent submissions with the same
    /// identifier exactly one wins, the other gets
    /// [`ServiceError::Conflict`].
    pub fn submit(&self, spec: GeneratorSpecification) -> Result<(), ServiceError> {
        spec.validate()?;
        let zone = self.settings.utm_zone();

        let mut waypoints = Vec::with_capacity(spec.waypoints.len());
        for geo in &spec.waypoints {
            let (northing, easting) = geo_to_local(geo.latitude, geo.longitude, zone)?;
            waypoints.push(Waypoint::new(northing, easting, geo.elevation));
        }

        let curve = self.interpolator.interpolate(&waypoints, spec.turning_radius)?;

        let sampler_config = SamplerConfig {
            mean_time_delta: spec.mean_time_delta,
            std_time_delta: spec.std_time_delta,
            mean_speed: spec.mean_speed,
            std_speed: spec.std_speed,
            std_spatial: spec.std_spatial,
            start_time: spec.start_time,
            max_steps: self.settings.max_sample_steps(),
        };
        let mut rng = StdRng::from_entropy();
        let trajectory = sample_path(&curve, &sampler_config, &mut rng)?;

        // Project every sample back to geographic coordinates and serialize
        // up front; the producer loop then only delivers and paces
        let mut steps = Vec::with_capacity(trajectory.points.len());
        for (point, dt) in trajectory.points.iter().zip(&trajectory.time_deltas) {
            let (latitude, longitude) = local_to_geo(point.position.x, point.position.y, zone)?;
            let record = SampleRecord {
                latitude,
                longitude,
                elevation: point.position.z,
                timestamp: point.timestamp,
                identifier: spec.identifier.clone(),
            };
            steps.push(DeliveryStep {
                payload: serde_json::to_string(&record)?,
                time_delta: *dt,
            });
        }

        let now = Utc::now();
        let activation_score = now.timestamp_micros() as f64 / 1e6;
        if !self.registry.register(&spec.identifier, activation_score, now) {
            return Err(ServiceError::Conflict {
                identifier: spec.identifier,
            });
        }

        info!(
            identifier = %spec.identifier,
            samples = steps.len(),
            path_length_m = curve.total_length(),
            "generator registered; spawning producer"
        );

        let ctx = ProducerContext {
            identifier: spec.identifier,
            sink_url: spec.url,
            registry: Arc::clone(&self.registry),
            event_log: Arc::clone(&self.event_log),
            sink: Arc::clone(&self.sink),
        };
        tokio::spawn(run_producer(ctx, steps));

        Ok(())
    }

    /// Stop a generator and clear its event log.
    ///
    /// Idempotent: stopping an identifier that is not active (never
    /// submitted, already exhausted, already stopped) is a no-op that still
    /// reports success.
    pub fn stop(&self, identifier: &str) {
        self.registry.deregister(identifier);
        self.event_log.clear(identifier);
        info!(identifier, "generator shut down");
    }

    /// Full status snapshot of all active generators.
    pub fn status(&self) -> Vec<StatusRow> {
        status_snapshot(self.registry.as_ref(), Utc::now())
    }

    pub fn settings(&self) -> &ServiceSettings {
        &self.settings
    }

    pub fn registry(&self) -> Arc<dyn GeneratorRegistry> {
        Arc::clone(&self.registry)
    }

    pub fn event_log(&self) -> Arc<dyn EventLog> {
        Arc::clone(&self.event_log)
    }
}
