//! Relay counters exposed on `GET /metrics`.
//!
//! Counters are plain atomics; readers see a consistent value per
//! counter, not a consistent snapshot across counters.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};

/// Process-wide relay counters.
#[derive(Debug)]
pub struct RelayMetrics {
    started_at: DateTime<Utc>,
    /// Log batches received from the watcher.
    pub batches_received: AtomicU64,
    /// Batches that contained a `TookAHit` entry and produced a broadcast.
    pub events_handled: AtomicU64,
    /// Batches with a match that were abandoned (read or store failure).
    pub events_failed: AtomicU64,
    /// Successful `sendMessage` calls across all broadcasts.
    pub deliveries_ok: AtomicU64,
    /// Failed `sendMessage` calls across all broadcasts.
    pub deliveries_failed: AtomicU64,
    /// Commands answered.
    pub commands_handled: AtomicU64,
    /// Commands whose reply could not be sent.
    pub commands_failed: AtomicU64,
}

impl RelayMetrics {
    /// Creates zeroed counters stamped with the current time.
    #[must_use]
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            batches_received: AtomicU64::new(0),
            events_handled: AtomicU64::new(0),
            events_failed: AtomicU64::new(0),
            deliveries_ok: AtomicU64::new(0),
            deliveries_failed: AtomicU64::new(0),
            commands_handled: AtomicU64::new(0),
            commands_failed: AtomicU64::new(0),
        }
    }

    /// Records one watcher batch.
    pub fn record_batch(&self) {
        self.batches_received.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a completed broadcast and its per-recipient outcome.
    pub fn record_broadcast(&self, delivered: usize, failed: usize) {
        self.events_handled.fetch_add(1, Ordering::Relaxed);
        self.deliveries_ok.fetch_add(to_u64(delivered), Ordering::Relaxed);
        self.deliveries_failed.fetch_add(to_u64(failed), Ordering::Relaxed);
    }

    /// Records a matched event that did not reach the broadcast stage.
    pub fn record_event_failure(&self) {
        self.events_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a command and whether its reply went out.
    pub fn record_command(&self, replied: bool) {
        if replied {
            self.commands_handled.fetch_add(1, Ordering::Relaxed);
        } else {
            self.commands_failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Seconds since the counters were created.
    #[must_use]
    pub fn uptime_secs(&self) -> u64 {
        u64::try_from((Utc::now() - self.started_at).num_seconds()).unwrap_or(0)
    }

    /// Serializes the counters; `subscribers` is included when known.
    #[must_use]
    pub fn to_json(&self, subscribers: Option<u64>) -> serde_json::Value {
        serde_json::json!({
            "uptime_secs": self.uptime_secs(),
            "batches_received": self.batches_received.load(Ordering::Relaxed),
            "events_handled": self.events_handled.load(Ordering::Relaxed),
            "events_failed": self.events_failed.load(Ordering::Relaxed),
            "deliveries_ok": self.deliveries_ok.load(Ordering::Relaxed),
            "deliveries_failed": self.deliveries_failed.load(Ordering::Relaxed),
            "commands_handled": self.commands_handled.load(Ordering::Relaxed),
            "commands_failed": self.commands_failed.load(Ordering::Relaxed),
            "subscribers": subscribers,
        })
    }
}

impl Default for RelayMetrics {
    fn default() -> Self {
        Self::new()
    }
}

fn to_u64(n: usize) -> u64 {
    u64::try_from(n).unwrap_or(u64::MAX)
}
