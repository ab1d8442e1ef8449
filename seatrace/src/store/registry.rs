//! Active generator registry.

use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

/// A registry row describing one active generator.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveGenerator {
    pub identifier: String,
    /// Monotonic activation value (epoch seconds at registration); the
    /// status view iterates in this order so output is deterministic.
    pub activation_score: f64,
    pub start_time: DateTime<Utc>,
}

/// Tracks which generator identifiers are currently active.
///
/// This is the single source of truth for "is this generator still
/// supposed to be running": the owning producer task polls [`is_active`]
/// cooperatively before every step, so stop latency is bounded by the
/// pacing interval rather than being instantaneous.
///
/// [`is_active`]: GeneratorRegistry::is_active
pub trait GeneratorRegistry: Send + Sync {
    /// Atomically inserts an entry for `identifier` if none exists.
    ///
    /// Returns `false` when the identifier is already active; the caller
    /// must treat that as a conflict, never as permission to overwrite.
    fn register(&self, identifier: &str, activation_score: f64, start_time: DateTime<Utc>)
        -> bool;

    fn is_active(&self, identifier: &str) -> bool;

    /// All active entries, ordered by activation score then identifier.
    fn list_active(&self) -> Vec<ActiveGenerator>;

    /// Removes the entry for `identifier`. Removing an identifier that is
    /// not registered is a no-op, not an error.
    fn deregister(&self, identifier: &str);
}

#[derive(Debug, Clone)]
struct RegistryEntry {
    activation_score: f64,
    start_time: DateTime<Utc>,
}

/// In-process registry on a concurrent map.
///
/// The test-and-set in [`register`] happens under the map's shard lock via
/// the entry API, so two concurrent submissions of one identifier resolve
/// to exactly one winner.
///
/// [`register`]: GeneratorRegistry::register
#[derive(Debug, Default)]
pub struct InMemoryRegistry {
    entries: DashMap<String, RegistryEntry>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

impl GeneratorRegistry for InMemoryRegistry {
    fn register(
        &self,
        identifier: &str,
        activation_score: f64,
        start_time: DateTime<Utc>,
    ) -> bool {
        match self.entries.entry(identifier.to_string()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(RegistryEntry {
                    activation_score,
                    start_time,
                });
                true
            }
        }
    }

    fn is_active(&self, identifier: &str) -> bool {
        self.entries.contains_key(identifier)
    }

    fn list_active(&self) -> Vec<ActiveGenerator> {
        let mut rows: Vec<ActiveGenerator> = self
            .entries
            .iter()
            .map(|entry| ActiveGenerator {
                identifier: entry.key().clone(),
                activation_score: entry.value().activation_score,
                start_time: entry.value().start_time,
            })
            .collect();
        rows.sort_by(|a, b| {
            a.activation_score
                .total_cmp(&b.activation_score)
                .then_with(|| a.identifier.cmp(&b.identifier))
        });
        rows
    }

    fn deregister(&self, identifier: &str) {
        self.entries.remove(identifier);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> InMemoryRegistry {
        InMemoryRegistry::new()
    }

    #[test]
    fn test_register_then_duplicate_register_conflicts() {
        let reg = registry();
        assert!(reg.register("uuv1", 1.0, Utc::now()));
        assert!(!reg.register("uuv1", 2.0, Utc::now()));
        assert!(reg.is_active("uuv1"));
    }

    #[test]
    fn test_duplicate_register_does_not_overwrite() {
        let reg = registry();
        let first_start = Utc::now();
        assert!(reg.register("uuv1", 1.0, first_start));
        reg.register("uuv1", 99.0, Utc::now());

        let rows = reg.list_active();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].activation_score, 1.0);
        assert_eq!(rows[0].start_time, first_start);
    }

    #[test]
    fn test_deregister_is_idempotent() {
        let reg = registry();
        assert!(reg.register("uuv1", 1.0, Utc::now()));
        reg.deregister("uuv1");
        assert!(!reg.is_active("uuv1"));
        // Second removal and removal of an unknown identifier are no-ops
        reg.deregister("uuv1");
        reg.deregister("never-registered");
        assert!(reg.list_active().is_empty());
    }

    #[test]
    fn test_identifier_can_be_reused_after_deregister() {
        let reg = registry();
        assert!(reg.register("uuv1", 1.0, Utc::now()));
        reg.deregister("uuv1");
        assert!(reg.register("uuv1", 2.0, Utc::now()));
    }

    #[test]
    fn test_list_active_orders_by_activation_score() {
        let reg = registry();
        reg.register("c", 3.0, Utc::now());
        reg.register("a", 1.0, Utc::now());
        reg.register("b", 2.0, Utc::now());

        let ids: Vec<String> = reg
            .list_active()
            .into_iter()
            .map(|row| row.identifier)
            .collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_concurrent_registration_has_exactly_one_winner() {
        use std::sync::Arc;

        let reg = Arc::new(registry());
        let mut handles = Vec::new();
        for _ in 0..8 {
            let reg = Arc::clone(&reg);
            handles.push(std::thread::spawn(move || {
                reg.register("contested", 1.0, Utc::now())
            }));
        }
        let wins = handles
            .into_iter()
            .map(|h| h.join().expect("registration thread panicked"))
            .filter(|&won| won)
            .count();
        assert_eq!(wins, 1, "exactly one concurrent registration may win");
        assert!(reg.is_active("contested"));
    }
}
