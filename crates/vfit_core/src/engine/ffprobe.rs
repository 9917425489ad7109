//! Media probing using `ffprobe -show_format -show_streams -of json`.

use std::path::Path;
use std::process::Command;

use serde_json::Value;

use super::errors::{EngineError, EngineResult};
use crate::models::{ProbeData, StreamInfo, StreamKind};

/// Run ffprobe on `path` and parse its JSON output.
pub(super) fn run_probe(ffprobe: &str, path: &Path) -> EngineResult<ProbeData> {
    if !path.exists() {
        return Err(EngineError::FileNotFound(path.display().to_string()));
    }

    let mut cmd = Command::new(ffprobe);
    cmd.args(["-v", "error", "-show_format", "-show_streams", "-of", "json"])
        .arg(path);

    tracing::debug!("Running ffprobe: {:?}", cmd);

    let output = cmd.output().map_err(|e| EngineError::spawn(ffprobe, e))?;

    if !output.status.success() {
        return Err(EngineError::CommandFailed {
            tool: ffprobe.to_string(),
            exit_code: output.status.code().unwrap_or(-1),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        });
    }

    let json: Value = serde_json::from_slice(&output.stdout)
        .map_err(|e| EngineError::parse_error(ffprobe, e.to_string()))?;

    Ok(parse_probe_json(&json))
}

/// Parse ffprobe JSON into [`ProbeData`].
///
/// ffprobe reports `duration` and `bit_rate` as strings; unparsable or
/// missing values become `None`.
pub fn parse_probe_json(json: &Value) -> ProbeData {
    let duration = json
        .get("format")
        .and_then(|f| f.get("duration"))
        .and_then(number_or_string);

    let streams = json
        .get("streams")
        .and_then(|s| s.as_array())
        .map(|streams| streams.iter().map(parse_stream).collect())
        .unwrap_or_default();

    ProbeData { duration, streams }
}

fn parse_stream(stream: &Value) -> StreamInfo {
    let kind = stream
        .get("codec_type")
        .and_then(|v| v.as_str())
        .map(StreamKind::from_codec_type)
        .unwrap_or(StreamKind::Other);

    StreamInfo {
        kind,
        bit_rate: stream
            .get("bit_rate")
            .and_then(number_or_string)
            .filter(|b| *b >= 0.0)
            .map(|b| b as u64),
        width: stream
            .get("width")
            .and_then(|v| v.as_u64())
            .map(|w| w as u32),
        height: stream
            .get("height")
            .and_then(|v| v.as_u64())
            .map(|h| h as u32),
    }
}

/// Read a JSON number or a numeric string.
fn number_or_string(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
