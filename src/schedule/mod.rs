//! Scheduling module orchestrator.
//!
//! The host supplies the actual timers and event plumbing; the engine only
//! ever asks for commands to be enqueued. Everything that mutates a session
//! arrives as a [`StateCommand`] on one serialized queue.

mod core;

pub use core::{
    HostHooks, OrientationEvents, Scheduler, SimulatedLoop, StateCommand, SubscriptionId,
    TaskHandle,
};
