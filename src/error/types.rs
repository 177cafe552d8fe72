use thiserror::Error;

/// Unified result type for the chrome state engine.
pub type Result<T> = std::result::Result<T, ChromeError>;

/// Errors surfaced by the chrome state engine.
///
/// `NoFittingChrome` is never returned from the tick path; it exists so log
/// sinks and callers share one taxonomy when the degraded state is reported.
#[derive(Debug, Error)]
pub enum ChromeError {
    #[error("no chromes survived discovery")]
    NoChromesDiscovered,
    #[error("no chrome fits {width}x{height}")]
    NoFittingChrome { width: u32, height: u32 },
    #[error("host environment error: {0}")]
    Host(String),
}
