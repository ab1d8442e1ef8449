//! Producer task for one trajectory generation run.
//!
//! A producer walks `Starting -> Running -> {Exhausted, Stopped} ->
//! Terminated`. The `Starting` phase lives in the service facade: the whole
//! trajectory is precomputed and serialized before the task spawns, so the
//! loop here only delivers, appends and paces. Before every step the task
//! polls the registry; an identifier removed externally is observed on the
//! next poll and ends the run without further appends.
//!
//! Delivery failures are logged and swallowed: the step still counts, still
//! lands in the event log, and pacing continues. Only registry removal or
//! running out of samples ends the loop.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::delivery::SampleSink;
use crate::store::{EventLog, GeneratorRegistry};

/// One precomputed delivery step.
#[derive(Debug, Clone)]
pub struct DeliveryStep {
    /// Serialized sample record, exactly as posted to the sink.
    pub payload: String,
    /// Simulated travel time leading into this sample, in seconds; the
    /// producer sleeps this long after emitting the step.
    pub time_delta: f64,
}

/// Terminal state of a producer run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProducerOutcome {
    /// Every precomputed sample was delivered; the task deregistered itself.
    Exhausted,
    /// An external stop removed the identifier from the registry.
    Stopped,
}

/// Shared collaborators of one producer run.
pub struct ProducerContext {
    pub identifier: String,
    pub sink_url: String,
    pub registry: Arc<dyn GeneratorRegistry>,
    pub event_log: Arc<dyn EventLog>,
    pub sink: Arc<dyn SampleSink>,
}

/// Runs one producer to completion.
///
/// The caller has already registered `identifier`; this routine delivers
/// each step, appends it to the event log at the matching index, and paces
/// with the step's own time delta. On exhaustion it deregisters the
/// identifier; on an external stop it leaves the registry alone, since the
/// stopper already removed the entry.
pub async fn run_producer(ctx: ProducerContext, steps: Vec<DeliveryStep>) -> ProducerOutcome {
    for step in &steps {
        if !ctx.registry.is_active(&ctx.identifier) {
            info!(
                identifier = %ctx.identifier,
                delivered = ctx.event_log.count(&ctx.identifier),
                "generator stopped externally"
            );
            return ProducerOutcome::Stopped;
        }

        if let Err(e) = ctx.sink.deliver(&ctx.sink_url, &step.payload).await {
            warn!(
                identifier = %ctx.identifier,
                error = %e,
                "sample delivery failed; continuing"
            );
        }

        let index = ctx.event_log.append(&ctx.identifier, step.payload.clone());
        debug!(identifier = %ctx.identifier, index, "sample appended");

        let pause = Duration::try_from_secs_f64(step.time_delta).unwrap_or_default();
        tokio::time::sleep(pause).await;
    }

    ctx.registry.deregister(&ctx.identifier);
    info!(
        identifier = %ctx.identifier,
        delivered = steps.len(),
        "trajectory exhausted"
    );
    ProducerOutcome::Exhausted
}
