//! Data models shared across the planner, engine, and orchestrator.

mod media;
mod plan;

pub use media::{MediaInfo, ProbeData, StreamInfo, StreamKind};
pub use plan::{BitratePlan, ClipSpec};
