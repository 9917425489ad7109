//! VFit Core - Backend logic for the `compress` tool
//!
//! This crate derives bitrate plans from a size budget and sequences calls
//! to an external media engine (FFmpeg). It has no UI dependencies and can
//! be driven by the CLI or by tests with a mock engine.

pub mod config;
pub mod engine;
pub mod logging;
pub mod models;
pub mod orchestrator;
pub mod planner;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_returns_value() {
        assert!(!version().is_empty());
    }
}
