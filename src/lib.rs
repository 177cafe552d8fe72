//! Experimental pilot implementation of the adaptive chrome state engine.
//!
//! The engine keeps a document-like presentation matched to whatever display
//! the host currently offers: it discovers candidate chromes, filters them by
//! capability, selects the first one that fits the measured viewport, and
//! swaps the active chrome whenever a resize or rotation makes the current
//! one stop fitting. The modules follow the orchestrator pattern so the code
//! can be promoted into a production crate without major surgery.

pub mod capability;
pub mod chrome;
pub mod error;
pub mod geometry;
pub mod host;
pub mod lifecycle;
pub mod logging;
pub mod metrics;
pub mod registry;
pub mod schedule;
pub mod state;
pub mod viewport;

pub use capability::{CapabilityProbe, CapabilitySet, StaticCapabilities, UnknownCapability};
pub use chrome::{Chrome, ChromeFactory, select};
pub use error::{ChromeError, Result};
pub use geometry::Size;
pub use host::{DescriptorNode, HostEnvironment, NodeId};
pub use lifecycle::swap_active;
pub use logging::{
    FileSink, LogEvent, LogFields, LogLevel, LogSink, Logger, LoggingError, LoggingResult,
    MemorySink,
};
pub use metrics::{MetricSnapshot, StateMetrics};
pub use registry::{CHROME_DESCRIPTOR_TAG, ChromeRegistry};
pub use schedule::{
    HostHooks, OrientationEvents, Scheduler, SimulatedLoop, StateCommand, SubscriptionId,
    TaskHandle,
};
pub use state::audit::{NullStateAudit, StateAudit, StateAuditEvent, StateAuditStage};
pub use state::{StateConfig, StateManager};
pub use viewport::{LANDSCAPE_HINT, PORTRAIT_HINT, available_size};
