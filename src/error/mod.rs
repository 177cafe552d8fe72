//! Error module orchestrator.

mod types;

pub use types::{ChromeError, Result};
