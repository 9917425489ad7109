//! Run driver: full two-pass compression with highlight-clip fallback.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::engine::{EncodeRequest, EngineError, EngineResult, MediaEngine, PassLog};
use crate::models::{BitratePlan, MediaInfo};
use crate::planner::{plan_clips, plan_full_compression, within_size_budget, BYTES_PER_MB};

use super::errors::{CompressError, CompressResult};
use super::types::{ClipsReport, Context, ProducedClip, RunReport, Stage};

/// Drives one compression run against a media engine.
///
/// Runs are linear and never retried. Every engine call blocks until it
/// resolves, and clips are cut one after another.
pub struct Compressor<E> {
    engine: E,
}

impl<E: MediaEngine> Compressor<E> {
    /// Create a compressor using `engine`.
    pub fn new(engine: E) -> Self {
        Self { engine }
    }

    /// Run the request in `ctx`.
    ///
    /// Returns the compressed file, or the clips produced by the fallback.
    /// Fails only for fatal errors (see [`CompressError::is_fatal`]).
    pub fn run(&self, ctx: &Context) -> CompressResult<RunReport> {
        let request = &ctx.request;
        ctx.logger.section(&format!(
            "Compressing {} to {} MB",
            request.input.display(),
            request.target_size_mb
        ));

        if let Err(e) = validate_request(ctx) {
            ctx.logger.error(&e.to_string());
            return Err(e);
        }

        let media = self.probe(ctx)?;

        if request.clips_only {
            ctx.logger.info("Clips-only mode, skipping full compression");
            return self.fallback_to_clips(ctx, &media, None);
        }

        match self.compress_full(ctx, &media) {
            Ok(report) => Ok(report),
            Err(e) if !e.is_fatal() => {
                ctx.logger
                    .warn(&format!("{}, falling back to highlight clips", e));
                self.fallback_to_clips(ctx, &media, Some(e))
            }
            Err(e) => {
                ctx.logger.error(&e.to_string());
                Err(e)
            }
        }
    }

    /// Probing stage: build [`MediaInfo`] with configured defaults.
    fn probe(&self, ctx: &Context) -> CompressResult<MediaInfo> {
        let input = &ctx.request.input;
        ctx.enter_stage(Stage::Probing, &format!("Probing {}", input.display()));

        let probe = self.engine.probe(input).map_err(|e| {
            ctx.logger.error(&e.to_string());
            match e {
                EngineError::FileNotFound(_) => CompressError::InputNotFound(input.clone()),
                other => CompressError::probe_failed(input, other.to_string()),
            }
        })?;

        let media = MediaInfo::from_probe(&probe, &ctx.settings.probe).ok_or_else(|| {
            ctx.logger.error("Probe returned no usable duration");
            CompressError::probe_failed(input, "no usable duration")
        })?;

        ctx.logger.info(&format!("Source: {}", media.describe()));
        Ok(media)
    }

    /// Planning through SizeCheck. Non-fatal errors mean "fall back".
    fn compress_full(&self, ctx: &Context, media: &MediaInfo) -> CompressResult<RunReport> {
        let target = ctx.request.target_size_mb;
        ctx.enter_stage(
            Stage::Planning,
            &format!("Planning {:.1}s into {} MB", media.duration, target),
        );

        let plan = plan_full_compression(media.duration, target, &ctx.settings.planner)?;
        ctx.logger.info(&format!("Plan: {}", plan));

        let output = ctx.compressed_output_path();

        let mut passlog = PassLog::new(&ctx.output_dir, &ctx.request.input_stem());
        let encoded = self.two_pass(ctx, &plan, &output, &passlog);
        let removed = passlog.cleanup();
        ctx.logger
            .debug(&format!("Removed {} pass log file(s)", removed));
        encoded?;

        ctx.enter_stage(Stage::SizeCheck, &format!("Checking {}", output.display()));
        let size_bytes = file_size(&output).map_err(|_| CompressError::PassFailed {
            pass: 2,
            source: EngineError::FileNotFound(output.display().to_string()),
        })?;

        let actual_mb = size_bytes as f64 / BYTES_PER_MB;
        let tolerance = ctx.settings.planner.size_tolerance;
        if !within_size_budget(actual_mb, target, tolerance) {
            if ctx.settings.encoder.keep_oversized_output {
                ctx.logger
                    .warn(&format!("Keeping oversized {}", output.display()));
            } else {
                remove_output(&output, &ctx.request.input);
            }
            return Err(CompressError::OutputTooLarge {
                actual_mb,
                limit_mb: target * tolerance,
            });
        }

        ctx.enter_stage(
            Stage::Done,
            &format!("{} ({:.2} MB)", output.display(), actual_mb),
        );
        ctx.logger.success("Compression finished within budget");

        Ok(RunReport::Compressed {
            output,
            size_bytes,
            plan,
            media: *media,
        })
    }

    /// Pass 1 then Pass 2. Pass-log cleanup is the caller's job.
    fn two_pass(
        &self,
        ctx: &Context,
        plan: &BitratePlan,
        output: &Path,
        passlog: &PassLog,
    ) -> CompressResult<()> {
        let input = &ctx.request.input;

        ctx.enter_stage(Stage::Pass1, "Analysis pass");
        self.encode(ctx, &EncodeRequest::first_pass(input, plan, passlog))
            .map_err(|source| CompressError::PassFailed { pass: 1, source })?;

        ctx.enter_stage(Stage::Pass2, "Encoding pass");
        self.encode(
            ctx,
            &EncodeRequest::second_pass(input, output, plan, passlog),
        )
        .map_err(|source| CompressError::PassFailed { pass: 2, source })?;

        Ok(())
    }

    /// FallbackToClips: cut each planned clip, skipping failures.
    fn fallback_to_clips(
        &self,
        ctx: &Context,
        media: &MediaInfo,
        reason: Option<CompressError>,
    ) -> CompressResult<RunReport> {
        let request = &ctx.request;
        let num_clips = request.num_clips;
        ctx.enter_stage(
            Stage::FallbackToClips,
            &format!("Extracting {} highlight clips", num_clips),
        );

        let specs = plan_clips(
            media.duration,
            request.target_size_mb,
            num_clips,
            ctx.settings.clips.max_duration_secs,
            &ctx.settings.planner,
        )?;

        let mut clips = Vec::with_capacity(specs.len());
        let mut failures = Vec::new();

        for spec in specs {
            let number = spec.number();
            let path = ctx.clip_output_path(number);
            let message = format!(
                "Clip {}/{}: {:.1}s +{:.1}s, {}",
                number, num_clips, spec.start_time, spec.duration, spec.plan
            );
            ctx.logger.info(&message);
            ctx.report_progress(
                Stage::FallbackToClips,
                (spec.index * 100 / num_clips) as u32,
                &message,
            );

            let result = self
                .encode(ctx, &EncodeRequest::clip(&request.input, &path, &spec))
                .and_then(|()| {
                    file_size(&path)
                        .map_err(|_| EngineError::FileNotFound(path.display().to_string()))
                });

            match result {
                Ok(size_bytes) => {
                    ctx.logger.success(&format!(
                        "{} ({:.2} MB)",
                        path.display(),
                        size_bytes as f64 / BYTES_PER_MB
                    ));
                    clips.push(ProducedClip {
                        spec,
                        path,
                        size_bytes,
                    });
                }
                Err(source) => {
                    let err = CompressError::ClipFailed {
                        clip: number,
                        source,
                    };
                    ctx.logger.warn(&format!("{}, skipping", err));
                    failures.push(err);
                }
            }
        }

        let message = format!("{} of {} clips produced", clips.len(), num_clips);
        ctx.report_progress(Stage::FallbackToClips, 100, &message);

        if clips.is_empty() {
            ctx.logger.error(&message);
            return Err(CompressError::NoClipsProduced {
                attempted: num_clips,
            });
        }

        ctx.logger.success(&message);
        Ok(RunReport::Clips(ClipsReport {
            reason,
            clips,
            failures,
        }))
    }

    /// Run one encode, surfacing engine stderr and removing partial output on failure.
    ///
    /// An output that resolves to the input file is refused before the
    /// engine runs, since `-y` would truncate the source while reading it.
    fn encode(&self, ctx: &Context, request: &EncodeRequest) -> EngineResult<()> {
        if let Some(path) = request.output_path() {
            if same_file(path, &request.input) {
                let err = EngineError::OutputIsInput(path.display().to_string());
                ctx.logger.error(&err.to_string());
                return Err(err);
            }
        }

        ctx.logger.command(&request.to_string());

        self.engine.encode(request).map_err(|e| {
            for line in e.stderr_lines() {
                ctx.logger.output_line(line, true);
            }
            ctx.logger.error(&e.to_string());
            ctx.logger.show_tail("ffmpeg");

            if let Some(path) = request.output_path() {
                remove_output(path, &request.input);
            }
            e
        })
    }
}

/// Reject requests the planner cannot work with, before touching the engine.
fn validate_request(ctx: &Context) -> CompressResult<()> {
    let request = &ctx.request;

    if !request.input.exists() {
        return Err(CompressError::InputNotFound(request.input.clone()));
    }
    if !(request.target_size_mb.is_finite() && request.target_size_mb > 0.0) {
        return Err(CompressError::invalid_input(format!(
            "target size must be positive, got {}",
            request.target_size_mb
        )));
    }
    if request.num_clips == 0 {
        return Err(CompressError::invalid_input(
            "clip count must be at least 1",
        ));
    }
    Ok(())
}

fn file_size(path: &Path) -> io::Result<u64> {
    fs::metadata(path).map(|m| m.len())
}

/// Resolve `path` to an absolute form, canonicalizing the parent when the
/// file itself does not exist yet.
fn resolve(path: &Path) -> Option<PathBuf> {
    if let Ok(resolved) = fs::canonicalize(path) {
        return Some(resolved);
    }
    let name = path.file_name()?;
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::canonicalize(parent).ok().map(|dir| dir.join(name))
}

/// Whether two paths name the same file.
fn same_file(a: &Path, b: &Path) -> bool {
    match (resolve(a), resolve(b)) {
        (Some(a), Some(b)) => a == b,
        _ => a == b,
    }
}

/// Delete an output file if present. Never deletes `input`.
fn remove_output(path: &Path, input: &Path) {
    if same_file(path, input) {
        tracing::warn!("Not removing {}: it is the input file", path.display());
        return;
    }
    match fs::remove_file(path) {
        Ok(()) => tracing::debug!("Removed {}", path.display()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!("Failed to remove {}: {}", path.display(), e),
    }
}
