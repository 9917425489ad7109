//! FFmpeg-backed media engine.

use std::ffi::OsString;
use std::path::Path;
use std::process::{Command, Stdio};

use super::errors::{EngineError, EngineResult};
use super::ffprobe::run_probe;
use super::{EncodeRequest, EncodeTarget, MediaEngine};
use crate::config::EncoderSettings;
use crate::models::ProbeData;

/// Null device used as the output of the analysis pass.
#[cfg(windows)]
const NULL_DEVICE: &str = "NUL";
#[cfg(not(windows))]
const NULL_DEVICE: &str = "/dev/null";

/// Media engine that shells out to ffprobe and ffmpeg.
#[derive(Debug, Clone)]
pub struct FfmpegEngine {
    settings: EncoderSettings,
}

impl FfmpegEngine {
    /// Create an engine using the given executables, codecs, and preset.
    pub fn new(settings: EncoderSettings) -> Self {
        Self { settings }
    }
}

impl MediaEngine for FfmpegEngine {
    fn probe(&self, path: &Path) -> EngineResult<ProbeData> {
        run_probe(&self.settings.ffprobe_path, path)
    }

    fn encode(&self, request: &EncodeRequest) -> EngineResult<()> {
        let tool = self.settings.ffmpeg_path.as_str();

        let mut cmd = Command::new(tool);
        cmd.args(build_ffmpeg_args(request, &self.settings))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        tracing::debug!("Running FFmpeg: {:?}", cmd);

        let output = cmd.output().map_err(|e| EngineError::spawn(tool, e))?;

        if !output.status.success() {
            return Err(EngineError::CommandFailed {
                tool: tool.to_string(),
                exit_code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            });
        }

        Ok(())
    }
}

/// Build the ffmpeg argument list for a request.
///
/// Layout:
/// `-hide_banner -nostdin -loglevel error -y [-ss S -t D] -i IN
///  -c:v CODEC -b:v RATE -preset P [-pass N -passlogfile PREFIX]
///  (-an | -c:a CODEC -b:a RATE) [-f FMT] OUT`
pub fn build_ffmpeg_args(request: &EncodeRequest, settings: &EncoderSettings) -> Vec<OsString> {
    let mut args: Vec<OsString> = ["-hide_banner", "-nostdin", "-loglevel", "error", "-y"]
        .into_iter()
        .map(OsString::from)
        .collect();

    // Input-side seek
    if let Some(segment) = &request.segment {
        args.push("-ss".into());
        args.push(format!("{:.3}", segment.start).into());
        args.push("-t".into());
        args.push(format!("{:.3}", segment.duration).into());
    }

    args.push("-i".into());
    args.push(request.input.clone().into_os_string());

    args.push("-c:v".into());
    args.push(settings.video_codec.as_str().into());
    args.push("-b:v".into());
    args.push(request.video_bitrate.to_string().into());
    args.push("-preset".into());
    args.push(settings.preset.as_str().into());

    if let Some(pass) = &request.pass {
        args.push("-pass".into());
        args.push(pass.number.to_string().into());
        args.push("-passlogfile".into());
        args.push(pass.log_prefix.clone().into_os_string());
    }

    match request.audio_bitrate {
        Some(rate) => {
            args.push("-c:a".into());
            args.push(settings.audio_codec.as_str().into());
            args.push("-b:a".into());
            args.push(rate.to_string().into());
        }
        None => args.push("-an".into()),
    }

    match &request.target {
        EncodeTarget::File(path) => args.push(path.clone().into_os_string()),
        EncodeTarget::Discard => {
            // Muxer must be named when writing to the null device
            args.push("-f".into());
            args.push(settings.output_extension.as_str().into());
            args.push(NULL_DEVICE.into());
        }
    }

    args
}
