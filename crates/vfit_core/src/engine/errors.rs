//! Error types for media engine calls.

use std::io;

use thiserror::Error;

/// Failure of a single probe or encode call.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The input file does not exist.
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// The tool executable could not be found.
    #[error("{tool} not found (is it installed and on PATH?)")]
    ToolNotFound { tool: String },

    /// The tool could not be started.
    #[error("Failed to run {tool}: {source}")]
    SpawnFailed {
        tool: String,
        #[source]
        source: io::Error,
    },

    /// The tool exited unsuccessfully.
    #[error("{tool} failed with exit code {exit_code}")]
    CommandFailed {
        tool: String,
        exit_code: i32,
        /// Captured stderr, for the tail log.
        stderr: String,
    },

    /// The requested output path is the input file.
    #[error("Output {0} would overwrite the input file")]
    OutputIsInput(String),

    /// The tool's output could not be understood.
    #[error("Failed to parse {tool} output: {message}")]
    ParseError { tool: String, message: String },
}

impl EngineError {
    /// Create a parse error.
    pub fn parse_error(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ParseError {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Map a spawn failure, distinguishing a missing executable.
    pub fn spawn(tool: impl Into<String>, source: io::Error) -> Self {
        let tool = tool.into();
        if source.kind() == io::ErrorKind::NotFound {
            Self::ToolNotFound { tool }
        } else {
            Self::SpawnFailed { tool, source }
        }
    }

    /// Captured stderr lines, if the tool ran and failed.
    pub fn stderr_lines(&self) -> Vec<&str> {
        match self {
            Self::CommandFailed { stderr, .. } => stderr
                .lines()
                .map(str::trim_end)
                .filter(|l| !l.is_empty())
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// Result type for engine calls.
pub type EngineResult<T> = Result<T, EngineError>;
