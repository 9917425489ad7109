//! Encode orchestration.
//!
//! A run probes the input, plans bit rates, and attempts a two-pass
//! compression. If the plan is rejected, a pass fails, or the result is
//! too large, it falls back to cutting highlight clips.
//!
//! # Stages
//!
//! ```text
//! Probing ─► Planning ─► Pass 1 ─► Pass 2 ─► Size check ─► Done
//!               │           │         │           │
//!               └───────────┴─────────┴───────────┴──► Fallback to clips
//! ```
//!
//! `--clips-only` goes from Probing straight to the fallback.
//!
//! # Example
//!
//! ```ignore
//! use vfit_core::engine::FfmpegEngine;
//! use vfit_core::orchestrator::{CompressRequest, Compressor, Context};
//!
//! let engine = FfmpegEngine::new(settings.encoder.clone());
//! let ctx = Context::new(CompressRequest::new("movie.mkv", 50.0), settings, logger);
//! match Compressor::new(engine).run(&ctx)? {
//!     RunReport::Compressed { output, .. } => println!("{}", output.display()),
//!     RunReport::Clips(report) => println!("{} clips", report.clips.len()),
//! }
//! ```

mod compressor;
mod errors;
mod types;

pub use compressor::Compressor;
pub use errors::{CompressError, CompressResult};
pub use types::{
    ClipsReport, CompressRequest, Context, ProducedClip, ProgressCallback, RunReport, Stage,
};
