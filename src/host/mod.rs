//! Host environment module orchestrator.

mod core;

pub use core::{DescriptorNode, HostEnvironment, NodeId};
