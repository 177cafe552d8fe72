//! Counters describing what a session has done since load.

use std::time::Duration;

use serde_json::json;

use crate::logging::{LogEvent, LogFields, LogLevel, event_with_fields};

#[derive(Debug, Default, Clone)]
pub struct StateMetrics {
    ticks: u64,
    size_changes: u64,
    swaps: u64,
    selection_misses: u64,
    orientation_changes: u64,
}

impl StateMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_tick(&mut self) {
        self.ticks = self.ticks.saturating_add(1);
    }

    pub fn record_size_change(&mut self) {
        self.size_changes = self.size_changes.saturating_add(1);
    }

    pub fn record_swap(&mut self) {
        self.swaps = self.swaps.saturating_add(1);
    }

    pub fn record_selection_miss(&mut self) {
        self.selection_misses = self.selection_misses.saturating_add(1);
    }

    pub fn record_orientation_change(&mut self) {
        self.orientation_changes = self.orientation_changes.saturating_add(1);
    }

    pub fn snapshot(&self, uptime: Duration) -> MetricSnapshot {
        MetricSnapshot {
            uptime_ms: uptime.as_millis() as u64,
            ticks: self.ticks,
            size_changes: self.size_changes,
            swaps: self.swaps,
            selection_misses: self.selection_misses,
            orientation_changes: self.orientation_changes,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricSnapshot {
    pub uptime_ms: u64,
    pub ticks: u64,
    pub size_changes: u64,
    pub swaps: u64,
    pub selection_misses: u64,
    pub orientation_changes: u64,
}

impl MetricSnapshot {
    pub fn as_fields(&self) -> LogFields {
        let mut map = LogFields::new();
        map.insert("uptime_ms".to_string(), json!(self.uptime_ms));
        map.insert("ticks".to_string(), json!(self.ticks));
        map.insert("size_changes".to_string(), json!(self.size_changes));
        map.insert("swaps".to_string(), json!(self.swaps));
        map.insert(
            "selection_misses".to_string(),
            json!(self.selection_misses),
        );
        map.insert(
            "orientation_changes".to_string(),
            json!(self.orientation_changes),
        );
        map
    }

    pub fn to_log_event(&self, target: &str) -> LogEvent {
        event_with_fields(
            LogLevel::Info,
            target,
            "state_metrics",
            self.as_fields(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_reflects_counters() {
        let mut metrics = StateMetrics::new();
        metrics.record_tick();
        metrics.record_tick();
        metrics.record_size_change();
        metrics.record_swap();
        metrics.record_selection_miss();
        metrics.record_orientation_change();

        let snapshot = metrics.snapshot(Duration::from_millis(1500));
        assert_eq!(snapshot.uptime_ms, 1500);
        assert_eq!(snapshot.ticks, 2);
        assert_eq!(snapshot.size_changes, 1);
        assert_eq!(snapshot.swaps, 1);
        assert_eq!(snapshot.selection_misses, 1);
        assert_eq!(snapshot.orientation_changes, 1);
    }

    #[test]
    fn snapshot_event_carries_fields() {
        let metrics = StateMetrics::new();
        let event = metrics
            .snapshot(Duration::from_secs(1))
            .to_log_event("chrome::state.metrics");
        assert_eq!(event.message, "state_metrics");
        assert_eq!(event.fields.get("uptime_ms"), Some(&json!(1000)));
        assert_eq!(event.fields.get("ticks"), Some(&json!(0)));
    }
}
