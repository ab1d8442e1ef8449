//! Live-tail views over the coordination store.
//!
//! Observers follow running generators by polling: the status view takes a
//! full registry snapshot each poll, the log view keeps a monotonic cursor
//! and reads only the entries appended since its last poll. Neither view
//! touches the producer tasks; they read the shared store and nothing else.

use std::time::Duration;

use chrono::{DateTime, Timelike, Utc};
use serde::Serialize;

use crate::store::{EventLog, GeneratorRegistry, LogEntry};

/// Interval between live-tail polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// One row of the status view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusRow {
    pub identifier: String,
    /// Wall-clock start time, formatted `HH:MM:SS.ss`.
    pub start_time: String,
    /// Elapsed running time, formatted `HH:MM:SS.ss`.
    pub running_time: String,
}

/// Formats an elapsed duration as `HH:MM:SS.ss`.
///
/// Negative durations clamp to zero; they can only arise from clock skew
/// between the registry entry and the observer.
pub fn format_timedelta(elapsed: chrono::Duration) -> String {
    let millis = elapsed.num_milliseconds().max(0);
    let total_seconds = millis / 1000;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    let hundredths = (millis % 1000) / 10;
    format!("{:02}:{:02}:{:02}.{:02}", hours, minutes, seconds, hundredths)
}

/// Formats the time-of-day part of a timestamp as `HH:MM:SS.ss`.
pub fn format_datetime(dt: DateTime<Utc>) -> String {
    let hundredths = dt.timestamp_subsec_millis() / 10;
    format!(
        "{:02}:{:02}:{:02}.{:02}",
        dt.hour(),
        dt.minute(),
        dt.second(),
        hundredths
    )
}

/// Full status snapshot of all active generators at `now`.
///
/// Rows come back in the registry's activation order, so repeated polls
/// render a stable table.
pub fn status_snapshot(registry: &dyn GeneratorRegistry, now: DateTime<Utc>) -> Vec<StatusRow> {
    registry
        .list_active()
        .into_iter()
        .map(|entry| StatusRow {
            identifier: entry.identifier,
            start_time: format_datetime(entry.start_time),
            running_time: format_timedelta(now - entry.start_time),
        })
        .collect()
}

/// Monotonic cursor over one generator's event log.
///
/// The first poll returns everything logged so far; each later poll returns
/// only the delta since the previous one, so per-poll work is proportional
/// to new entries rather than to the log size.
#[derive(Debug, Default)]
pub struct LogCursor {
    seen: u64,
}

impl LogCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries appended since the last poll; empty when nothing changed.
    pub fn poll(&mut self, log: &dyn EventLog, identifier: &str) -> Vec<LogEntry> {
        let count = log.count(identifier);
        if count <= self.seen {
            return Vec::new();
        }
        let delta = log.read_range(identifier, self.seen, count);
        self.seen = count;
        delta
    }

    /// Index of the next entry this cursor has not consumed.
    pub fn position(&self) -> u64 {
        self.seen
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{InMemoryEventLog, InMemoryRegistry};
    use chrono::TimeZone;

    #[test]
    fn test_format_timedelta_pads_fields() {
        let td = chrono::Duration::milliseconds(3_723_450);
        assert_eq!(format_timedelta(td), "01:02:03.45");
        assert_eq!(format_timedelta(chrono::Duration::zero()), "00:00:00.00");
        assert_eq!(
            format_timedelta(chrono::Duration::milliseconds(-500)),
            "00:00:00.00"
        );
    }

    #[test]
    fn test_format_datetime_keeps_hundredths() {
        let dt = Utc
            .with_ymd_and_hms(2024, 5, 1, 9, 7, 3)
            .unwrap()
            .checked_add_signed(chrono::Duration::milliseconds(210))
            .unwrap();
        assert_eq!(format_datetime(dt), "09:07:03.21");
    }

    #[test]
    fn test_status_snapshot_computes_running_time() {
        let registry = InMemoryRegistry::new();
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        registry.register("uuv1", 1.0, start);

        let now = start + chrono::Duration::seconds(61);
        let rows = status_snapshot(&registry, now);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].identifier, "uuv1");
        assert_eq!(rows[0].start_time, "12:00:00.00");
        assert_eq!(rows[0].running_time, "00:01:01.00");
    }

    #[test]
    fn test_status_snapshot_is_empty_without_generators() {
        let registry = InMemoryRegistry::new();
        assert!(status_snapshot(&registry, Utc::now()).is_empty());
    }

    #[test]
    fn test_cursor_first_poll_reads_everything() {
        let log = InMemoryEventLog::new();
        log.append("uuv1", "a".into());
        log.append("uuv1", "b".into());

        let mut cursor = LogCursor::new();
        let delta = cursor.poll(&log, "uuv1");
        assert_eq!(delta.len(), 2);
        assert_eq!(cursor.position(), 2);
    }

    #[test]
    fn test_cursor_skips_unchanged_polls() {
        let log = InMemoryEventLog::new();
        log.append("uuv1", "a".into());

        let mut cursor = LogCursor::new();
        assert_eq!(cursor.poll(&log, "uuv1").len(), 1);
        assert!(cursor.poll(&log, "uuv1").is_empty());
        assert!(cursor.poll(&log, "uuv1").is_empty());

        log.append("uuv1", "b".into());
        let delta = cursor.poll(&log, "uuv1");
        assert_eq!(delta.len(), 1);
        assert_eq!(delta[0].index, 1);
    }

    #[test]
    fn test_cursor_deltas_concatenate_to_a_full_read() {
        let log = InMemoryEventLog::new();
        let mut cursor = LogCursor::new();
        let mut collected = Vec::new();

        for batch in [2_u64, 0, 3, 1] {
            for _ in 0..batch {
                let index = log.count("uuv1");
                log.append("uuv1", format!("entry-{}", index));
            }
            collected.extend(cursor.poll(&log, "uuv1"));
        }

        assert_eq!(collected, log.read_range("uuv1", 0, log.count("uuv1")));
    }

    #[test]
    fn test_cursor_on_unknown_identifier_stays_at_zero() {
        let log = InMemoryEventLog::new();
        let mut cursor = LogCursor::new();
        assert!(cursor.poll(&log, "unknown").is_empty());
        assert_eq!(cursor.position(), 0);
    }
}
