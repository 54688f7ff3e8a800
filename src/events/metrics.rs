//! Delivery counters for the event notifier.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

/// Receives one call per event outcome, labelled by event type.
pub trait MetricsRecorder: Send + Sync {
    fn event_published(&self, event_type: &'static str);
    fn event_failed(&self, event_type: &'static str);
    /// The event never reached a worker (queue full or closed).
    fn event_dropped(&self, event_type: &'static str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Outcome {
    Published,
    Failed,
    Dropped,
}

/// Counters kept in memory, readable back. Handy in tests and for health
/// endpoints.
#[derive(Debug, Default)]
pub struct InMemoryMetrics {
    counts: Mutex<HashMap<(&'static str, Outcome), u64>>,
}

impl InMemoryMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    fn bump(&self, event_type: &'static str, outcome: Outcome) {
        let mut counts = self.counts.lock().unwrap_or_else(PoisonError::into_inner);
        *counts.entry((event_type, outcome)).or_default() += 1;
    }

    fn count(&self, event_type: Option<&str>, outcome: Outcome) -> u64 {
        let counts = self.counts.lock().unwrap_or_else(PoisonError::into_inner);
        counts
            .iter()
            .filter(|((ty, out), _)| *out == outcome && event_type.is_none_or(|t| t == *ty))
            .map(|(_, n)| *n)
            .sum()
    }

    pub fn published(&self, event_type: &str) -> u64 {
        self.count(Some(event_type), Outcome::Published)
    }

    pub fn failed(&self, event_type: &str) -> u64 {
        self.count(Some(event_type), Outcome::Failed)
    }

    pub fn dropped(&self, event_type: &str) -> u64 {
        self.count(Some(event_type), Outcome::Dropped)
    }

    pub fn total_published(&self) -> u64 {
        self.count(None, Outcome::Published)
    }

    pub fn total_failed(&self) -> u64 {
        self.count(None, Outcome::Failed)
    }

    pub fn total_dropped(&self) -> u64 {
        self.count(None, Outcome::Dropped)
    }
}

impl MetricsRecorder for InMemoryMetrics {
    fn event_published(&self, event_type: &'static str) {
        self.bump(event_type, Outcome::Published);
    }

    fn event_failed(&self, event_type: &'static str) {
        self.bump(event_type, Outcome::Failed);
    }

    fn event_dropped(&self, event_type: &'static str) {
        self.bump(event_type, Outcome::Dropped);
    }
}

/// Forwards to the `metrics` facade. Install any `metrics` exporter to scrape:
///
/// - `vira_id_events_published_total{event_type}`
/// - `vira_id_events_failed_total{event_type}`
/// - `vira_id_events_dropped_total{event_type}`
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsFacade;

impl MetricsRecorder for MetricsFacade {
    fn event_published(&self, event_type: &'static str) {
        ::metrics::counter!("vira_id_events_published_total", "event_type" => event_type).increment(1);
    }

    fn event_failed(&self, event_type: &'static str) {
        ::metrics::counter!("vira_id_events_failed_total", "event_type" => event_type).increment(1);
    }

    fn event_dropped(&self, event_type: &'static str) {
        ::metrics::counter!("vira_id_events_dropped_total", "event_type" => event_type).increment(1);
    }
}
