//! Core types for a compression run.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::Settings;
use crate::logging::JobLogger;
use crate::models::{BitratePlan, ClipSpec, MediaInfo};

use super::errors::CompressError;

/// Progress callback type for reporting run progress.
///
/// Arguments: (stage, percent_complete, message)
pub type ProgressCallback = Box<dyn Fn(Stage, u32, &str) + Send + Sync>;

/// Stages of a run, in order.
///
/// `Probing → Planning → Pass1 → Pass2 → SizeCheck → Done`, with
/// `FallbackToClips` reachable from Planning, either pass, or SizeCheck.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Probing,
    Planning,
    Pass1,
    Pass2,
    SizeCheck,
    Done,
    FallbackToClips,
}

impl Stage {
    /// Display name used in phase markers.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Probing => "Probing",
            Self::Planning => "Planning",
            Self::Pass1 => "Pass 1",
            Self::Pass2 => "Pass 2",
            Self::SizeCheck => "Size check",
            Self::Done => "Done",
            Self::FallbackToClips => "Fallback to clips",
        }
    }

    /// Overall progress when the stage starts.
    pub fn percent(&self) -> u32 {
        match self {
            Self::Probing => 0,
            Self::Planning => 5,
            Self::Pass1 => 10,
            Self::Pass2 => 50,
            Self::SizeCheck => 95,
            Self::Done => 100,
            Self::FallbackToClips => 0,
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// What to compress and how hard.
#[derive(Debug, Clone, PartialEq)]
pub struct CompressRequest {
    /// Source video.
    pub input: PathBuf,
    /// Size budget in MB (MiB).
    pub target_size_mb: f64,
    /// Number of highlight clips for the fallback.
    pub num_clips: usize,
    /// Skip full compression and cut clips directly.
    pub clips_only: bool,
}

impl CompressRequest {
    /// Full-compression request with the default clip count.
    pub fn new(input: impl Into<PathBuf>, target_size_mb: f64) -> Self {
        Self {
            input: input.into(),
            target_size_mb,
            num_clips: crate::config::ClipSettings::default().count,
            clips_only: false,
        }
    }

    /// Set the clip count.
    pub fn with_num_clips(mut self, num_clips: usize) -> Self {
        self.num_clips = num_clips;
        self
    }

    /// Set clips-only mode.
    pub fn with_clips_only(mut self, clips_only: bool) -> Self {
        self.clips_only = clips_only;
        self
    }

    /// Input file stem, used to name outputs and pass logs.
    pub fn input_stem(&self) -> String {
        self.input
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "output".to_string())
    }
}

/// Read-only context for one run.
pub struct Context {
    /// The request being processed.
    pub request: CompressRequest,
    /// Application settings.
    pub settings: Settings,
    /// Directory receiving outputs and pass logs.
    pub output_dir: PathBuf,
    /// Per-run logger.
    pub logger: Arc<JobLogger>,
    /// Optional progress callback.
    progress_callback: Option<ProgressCallback>,
}

impl Context {
    /// Create a context writing next to the input file.
    pub fn new(request: CompressRequest, settings: Settings, logger: Arc<JobLogger>) -> Self {
        let output_dir = request
            .input
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        Self {
            request,
            settings,
            output_dir,
            logger,
            progress_callback: None,
        }
    }

    /// Set the progress callback.
    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Report progress to callback (if set).
    pub fn report_progress(&self, stage: Stage, percent: u32, message: &str) {
        if let Some(ref callback) = self.progress_callback {
            callback(stage, percent, message);
        }
    }

    /// Log a stage transition and report it.
    pub fn enter_stage(&self, stage: Stage, message: &str) {
        tracing::info!("{}: {}", stage, message);
        self.logger.phase(stage.name());
        self.logger.info(message);
        self.report_progress(stage, stage.percent(), message);
    }

    /// `<stem>_compressed.<ext>` in the output directory.
    pub fn compressed_output_path(&self) -> PathBuf {
        self.output_dir.join(format!(
            "{}_compressed.{}",
            self.request.input_stem(),
            self.settings.encoder.output_extension
        ))
    }

    /// `<prefix>_<number>.<ext>` in the output directory.
    pub fn clip_output_path(&self, number: usize) -> PathBuf {
        self.output_dir.join(format!(
            "{}_{}.{}",
            self.settings.clips.name_prefix, number, self.settings.encoder.output_extension
        ))
    }
}

/// A clip that was written successfully.
#[derive(Debug, Clone, PartialEq)]
pub struct ProducedClip {
    /// The plan the clip was cut from.
    pub spec: ClipSpec,
    /// Output file.
    pub path: PathBuf,
    /// File size in bytes.
    pub size_bytes: u64,
}

/// Outcome of the clip fallback.
#[derive(Debug)]
pub struct ClipsReport {
    /// Why full compression was abandoned; `None` in clips-only mode.
    pub reason: Option<CompressError>,
    /// Clips written, in index order.
    pub clips: Vec<ProducedClip>,
    /// Per-clip failures that were skipped.
    pub failures: Vec<CompressError>,
}

impl ClipsReport {
    /// Combined size of all produced clips.
    pub fn total_bytes(&self) -> u64 {
        self.clips.iter().map(|c| c.size_bytes).sum()
    }
}

/// Successful outcome of a run.
#[derive(Debug)]
pub enum RunReport {
    /// Full compression fit the budget.
    Compressed {
        output: PathBuf,
        size_bytes: u64,
        plan: BitratePlan,
        media: MediaInfo,
    },
    /// The fallback produced at least one clip.
    Clips(ClipsReport),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::LogConfig;

    fn context(input: &str) -> Context {
        let logger = Arc::new(JobLogger::console("test", LogConfig::default(), None));
        Context::new(
            CompressRequest::new(input, 50.0),
            Settings::default(),
            logger,
        )
    }

    #[test]
    fn stage_names_and_progress() {
        assert_eq!(Stage::Pass1.to_string(), "Pass 1");
        assert_eq!(Stage::FallbackToClips.name(), "Fallback to clips");
        assert!(Stage::Pass1.percent() < Stage::Pass2.percent());
        assert_eq!(Stage::Done.percent(), 100);
    }

    #[test]
    fn request_defaults() {
        let request = CompressRequest::new("/v/movie.mkv", 25.0);
        assert_eq!(request.num_clips, 3);
        assert!(!request.clips_only);
        assert_eq!(request.input_stem(), "movie");

        let request = request.with_num_clips(5).with_clips_only(true);
        assert_eq!(request.num_clips, 5);
        assert!(request.clips_only);
    }

    #[test]
    fn output_paths_sit_next_to_input() {
        let ctx = context("/videos/movie.mkv");
        assert_eq!(ctx.output_dir, PathBuf::from("/videos"));
        assert_eq!(
            ctx.compressed_output_path(),
            PathBuf::from("/videos/movie_compressed.mp4")
        );
        assert_eq!(
            ctx.clip_output_path(2),
            PathBuf::from("/videos/highlight_clip_2.mp4")
        );
    }

    #[test]
    fn bare_file_name_uses_current_dir() {
        let ctx = context("movie.mkv");
        assert_eq!(ctx.output_dir, PathBuf::from("."));
    }

    #[test]
    fn progress_callback_receives_stage() {
        let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let ctx = context("movie.mkv").with_progress_callback(Box::new(
            move |stage: Stage, pct: u32, _: &str| {
                sink.lock().push((stage, pct));
            },
        ));

        ctx.enter_stage(Stage::Planning, "planning");
        assert_eq!(*seen.lock(), vec![(Stage::Planning, 5)]);
    }
}
