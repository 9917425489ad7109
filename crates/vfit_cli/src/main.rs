//! compress - fit a video into a size budget.
//!
//! Probes the input, plans bit rates, runs a two-pass FFmpeg encode, and
//! falls back to highlight clips when the full encode cannot fit.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context as _;
use clap::Parser;

use vfit_core::config::{ConfigManager, Settings};
use vfit_core::engine::FfmpegEngine;
use vfit_core::logging::{
    init_tracing, init_tracing_with_file, JobLoggerBuilder, LogConfig, LogLevel,
};
use vfit_core::orchestrator::{CompressError, CompressRequest, Compressor, Context, RunReport};
use vfit_core::planner::BYTES_PER_MB;

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(name = "compress")]
#[command(version)]
#[command(about = "Compress a video to fit a size budget, or cut highlight clips")]
#[command(long_about = "Runs a two-pass FFmpeg encode sized to the target. If the \
    video cannot fit at acceptable quality, cuts short highlight clips instead.\n\n\
    EXAMPLES:\n    \
    compress movie.mkv\n    \
    compress movie.mkv --target-size 25\n    \
    compress movie.mkv --clips-only --num-clips 5")]
struct Args {
    /// Input video file
    input: PathBuf,

    /// Target size in MB
    #[arg(long, default_value_t = 50.0, value_parser = parse_target_size)]
    target_size: f64,

    /// Skip full compression and cut highlight clips only
    #[arg(long)]
    clips_only: bool,

    /// Number of highlight clips (default from config)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    num_clips: Option<u32>,

    /// Settings file (TOML); created with defaults if missing
    #[arg(long)]
    config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Also write log files into the configured logs folder
    #[arg(long)]
    log_file: bool,
}

// Exit statuses. 4 and 5 are neither a missing input nor a bad probe.
const EXIT_INPUT_NOT_FOUND: u8 = 1;
const EXIT_PROBE_FAILED: u8 = 2;
const EXIT_NO_CLIPS: u8 = 3;
const EXIT_INVALID_REQUEST: u8 = 4;
const EXIT_SETUP_FAILED: u8 = 5;

fn parse_target_size(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{}' is not a number", s))?;
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(format!("target size must be positive, got {}", s))
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    match run(args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(EXIT_SETUP_FAILED)
        }
    }
}

fn run(args: Args) -> anyhow::Result<ExitCode> {
    let settings = load_settings(args.config.as_ref());

    // User-facing lines go to stdout through the job logger; tracing stays
    // quiet on stderr unless asked for.
    let tracing_level = match args.verbose {
        0 => LogLevel::Warn,
        n => LogLevel::from_verbosity(n - 1),
    };
    let logs_dir = PathBuf::from(&settings.logging.logs_folder);
    let _log_guard = if args.log_file {
        std::fs::create_dir_all(&logs_dir)
            .with_context(|| format!("creating logs folder {}", logs_dir.display()))?;
        Some(
            init_tracing_with_file(tracing_level, &logs_dir)
                .context("initializing file logging")?,
        )
    } else {
        init_tracing(tracing_level);
        None
    };

    tracing::info!("compress {} starting", vfit_core::version());
    tracing::debug!("Arguments: {:?}", args);

    let job_name = args
        .input
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "compress".to_string());

    let log_config =
        LogConfig::from_settings(&settings.logging, LogLevel::from_verbosity(args.verbose));
    let mut builder = JobLoggerBuilder::new(job_name)
        .config(log_config)
        .callback(Box::new(|line: &str| println!("{}", line)));
    if args.log_file {
        builder = builder.log_dir(&logs_dir);
    }
    let logger = Arc::new(builder.build().context("creating job log")?);

    let num_clips = args
        .num_clips
        .map(|n| n as usize)
        .unwrap_or(settings.clips.count);
    let request = CompressRequest::new(&args.input, args.target_size)
        .with_num_clips(num_clips)
        .with_clips_only(args.clips_only);

    let engine = FfmpegEngine::new(settings.encoder.clone());
    let ctx = Context::new(request, settings, Arc::clone(&logger));

    let result = Compressor::new(engine).run(&ctx);
    tracing::info!("Job {} finished", logger.job_name());
    logger.flush();

    println!();
    match result {
        Ok(report) => {
            for line in summary_lines(&report) {
                println!("{}", line);
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            println!("Failed: {}", e);
            tracing::error!("Run failed: {}", e);
            Ok(ExitCode::from(exit_code(&e)))
        }
    }
}

/// Load settings from `--config`, falling back to defaults.
fn load_settings(path: Option<&PathBuf>) -> Settings {
    let Some(path) = path else {
        return Settings::default();
    };

    let mut manager = ConfigManager::new(path);
    if let Err(e) = manager.load_or_create() {
        eprintln!(
            "Warning: Failed to load config {}: {}. Using defaults.",
            path.display(),
            e
        );
        return Settings::default();
    }
    manager.into_settings()
}

/// Process exit status for a failed run.
///
/// Only fatal errors reach here: a missing input (1), a failed probe (2),
/// an empty clip fallback (3), or a request the planner rejected as
/// invalid (4). Non-fatal kinds always fall back to clips first, so they
/// share the fallback's status.
fn exit_code(err: &CompressError) -> u8 {
    match err {
        CompressError::InputNotFound(_) => EXIT_INPUT_NOT_FOUND,
        CompressError::ProbeFailed { .. } => EXIT_PROBE_FAILED,
        CompressError::InvalidInput(_) => EXIT_INVALID_REQUEST,
        _ => EXIT_NO_CLIPS,
    }
}

/// Final summary printed after a successful run.
fn summary_lines(report: &RunReport) -> Vec<String> {
    match report {
        RunReport::Compressed {
            output, size_bytes, ..
        } => vec![format!(
            "Compressed: {} ({})",
            output.display(),
            format_mb(*size_bytes)
        )],
        RunReport::Clips(clips) => {
            let mut lines = Vec::with_capacity(clips.clips.len() + 3);
            if let Some(reason) = &clips.reason {
                lines.push(format!("Full compression abandoned: {}", reason));
            }
            lines.push(format!("Produced {} highlight clip(s):", clips.clips.len()));
            for clip in &clips.clips {
                lines.push(format!(
                    "  {} ({})",
                    clip.path.display(),
                    format_mb(clip.size_bytes)
                ));
            }
            for failure in &clips.failures {
                lines.push(format!("  skipped: {}", failure));
            }
            lines.push(format!("Total: {}", format_mb(clips.total_bytes())));
            lines
        }
    }
}

fn format_mb(bytes: u64) -> String {
    format!("{:.2} MB", bytes as f64 / BYTES_PER_MB)
}
