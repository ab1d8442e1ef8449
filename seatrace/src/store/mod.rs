//! Coordination store module
//!
//! The registry and the event log are the only state shared between
//! producer tasks and live-tail observers. Both are expressed as
//! capability traits so the in-process implementations here can be swapped
//! for any external store that offers atomic test-and-set insertion,
//! monotonic append, and ranged reads.
//!
//! Concurrency contract: many readers per identifier, exactly one writer
//! (the owning producer task). Writers of different identifiers never
//! contend with each other beyond the map shard.

mod event_log;
mod registry;

pub use event_log::{EventLog, InMemoryEventLog, LogEntry};
pub use registry::{ActiveGenerator, GeneratorRegistry, InMemoryRegistry};
