//! Named-counter metrics.
//!
//! The sink is an injected object constructed once at service startup and
//! shared via `Arc`, so tests can observe counts and nothing depends on a
//! module-level singleton.

use std::collections::HashMap;

use dashmap::DashMap;

/// Sink for monotonically increasing named counters.
pub trait MetricsSink: Send + Sync {
    fn increment(&self, name: &str);
}

/// In-process counter set backed by a concurrent map.
#[derive(Debug, Default)]
pub struct CounterMetrics {
    counters: DashMap<String, u64>,
}

impl CounterMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value of one counter; 0 if it was never incremented.
    pub fn get(&self, name: &str) -> u64 {
        self.counters.get(name).map(|v| *v).unwrap_or(0)
    }

    /// Snapshot of every counter, for the metrics endpoint.
    pub fn snapshot(&self) -> HashMap<String, u64> {
        self.counters
            .iter()
            .map(|entry| (entry.key().clone(), *entry.value()))
            .collect()
    }
}

impl MetricsSink for CounterMetrics {
    fn increment(&self, name: &str) {
        *self.counters.entry(name.to_string()).or_insert(0) += 1;
        tracing::debug!(metric = name, "metric incremented");
    }
}
