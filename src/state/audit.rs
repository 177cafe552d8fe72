//! Session lifecycle audit hooks.
//!
//! Lightweight instrumentation so callers can observe the major transitions
//! of a chrome session. Records carry a stage identifier plus structured
//! details so downstream code can log, buffer, or visualize progression
//! without contorting the tick path.

use std::time::SystemTime;

use serde_json::Value;

/// Distinct checkpoints emitted by [`StateManager`](super::StateManager).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateAuditStage {
    /// A session finished loading.
    SessionLoaded,
    /// Discovery produced the session's chrome list.
    ChromesDiscovered,
    /// A tick ran, whether or not anything changed.
    TickDispatched,
    /// The measured size differed from the stored one.
    SizeChanged,
    /// A chrome was activated and attached.
    ChromeActivated,
    /// A chrome was deactivated.
    ChromeDeactivated,
    /// No registered chrome fit the measured size.
    SelectionMissed,
    /// The stored orientation changed.
    OrientationChanged,
    /// The session was torn down.
    SessionUnloaded,
}

/// Structured audit entry.
#[derive(Debug, Clone)]
pub struct StateAuditEvent {
    pub timestamp: SystemTime,
    pub stage: StateAuditStage,
    pub details: Vec<(String, Value)>,
}

impl StateAuditEvent {
    pub fn new(stage: StateAuditStage) -> Self {
        Self {
            timestamp: SystemTime::now(),
            stage,
            details: Vec::new(),
        }
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: Value) -> Self {
        self.details.push((key.into(), value));
        self
    }
}

/// Trait implemented by any audit sink.
pub trait StateAudit: Send + Sync {
    fn record(&self, event: StateAuditEvent);
}

/// Default no-op implementation used when auditing is disabled.
#[derive(Debug, Default)]
pub struct NullStateAudit;

impl StateAudit for NullStateAudit {
    fn record(&self, _event: StateAuditEvent) {}
}
