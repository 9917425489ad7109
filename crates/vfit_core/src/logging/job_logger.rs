//! Per-run logger with callback and optional file output.
//!
//! Each run gets its own logger that:
//! - Sends formatted lines to a callback (the CLI prints them to stdout)
//! - Optionally writes the same lines to a dedicated log file
//! - Keeps a tail buffer of encoder output for error diagnosis

use std::collections::VecDeque;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Local;
use parking_lot::Mutex;

use super::types::{LogCallback, LogConfig, LogLevel, MessagePrefix};

/// Per-run logger with dual output (callback + file).
pub struct JobLogger {
    /// Job name for identification.
    job_name: String,
    /// Path to log file, if file output is enabled.
    log_path: Option<PathBuf>,
    /// File writer (buffered).
    file_writer: Arc<Mutex<Option<BufWriter<File>>>>,
    /// Callback receiving each formatted line.
    callback: Arc<Mutex<Option<LogCallback>>>,
    /// Logging configuration.
    config: LogConfig,
    /// Tail buffer for recent encoder output lines.
    tail_buffer: Arc<Mutex<VecDeque<String>>>,
}

impl JobLogger {
    /// Create a logger that writes to `<log_dir>/<job_name>.log` and the callback.
    pub fn new(
        job_name: impl Into<String>,
        log_dir: impl AsRef<Path>,
        config: LogConfig,
        callback: Option<LogCallback>,
    ) -> std::io::Result<Self> {
        let job_name = job_name.into();
        let log_dir = log_dir.as_ref();

        fs::create_dir_all(log_dir)?;

        let log_path = log_dir.join(format!("{}.log", sanitize_filename(&job_name)));
        let file = File::create(&log_path)?;

        Ok(Self {
            job_name,
            log_path: Some(log_path),
            file_writer: Arc::new(Mutex::new(Some(BufWriter::new(file)))),
            callback: Arc::new(Mutex::new(callback)),
            tail_buffer: Arc::new(Mutex::new(VecDeque::with_capacity(config.error_tail))),
            config,
        })
    }

    /// Create a logger without file output.
    pub fn console(
        job_name: impl Into<String>,
        config: LogConfig,
        callback: Option<LogCallback>,
    ) -> Self {
        Self {
            job_name: job_name.into(),
            log_path: None,
            file_writer: Arc::new(Mutex::new(None)),
            callback: Arc::new(Mutex::new(callback)),
            tail_buffer: Arc::new(Mutex::new(VecDeque::with_capacity(config.error_tail))),
            config,
        }
    }

    /// Get the job name.
    pub fn job_name(&self) -> &str {
        &self.job_name
    }

    /// Get the log file path, if file output is enabled.
    pub fn log_path(&self) -> Option<&Path> {
        self.log_path.as_deref()
    }

    /// Log a message at the specified level.
    pub fn log(&self, level: LogLevel, message: &str) {
        if level < self.config.level {
            return;
        }

        let formatted = self.format_message(message);
        self.output(&formatted);
    }

    /// Log an info message.
    pub fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    /// Log a debug message.
    pub fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message);
    }

    /// Log a warning message.
    pub fn warn(&self, message: &str) {
        let msg = MessagePrefix::Warning.format(message);
        self.log(LogLevel::Warn, &msg);
    }

    /// Log an error message.
    pub fn error(&self, message: &str) {
        let msg = MessagePrefix::Error.format(message);
        self.log(LogLevel::Error, &msg);
    }

    /// Log a command being executed.
    pub fn command(&self, command: &str) {
        let msg = MessagePrefix::Command.format(command);
        self.log(LogLevel::Debug, &msg);
    }

    /// Log a phase marker.
    pub fn phase(&self, phase_name: &str) {
        let msg = MessagePrefix::Phase.format(phase_name);
        self.log(LogLevel::Info, &msg);
    }

    /// Log a section marker.
    pub fn section(&self, section_name: &str) {
        let msg = MessagePrefix::Section.format(section_name);
        self.log(LogLevel::Info, &msg);
    }

    /// Log a success message.
    pub fn success(&self, message: &str) {
        let msg = MessagePrefix::Success.format(message);
        self.log(LogLevel::Info, &msg);
    }

    /// Log an output line from an external tool.
    ///
    /// In compact mode, lines only go to the tail buffer.
    pub fn output_line(&self, line: &str, is_stderr: bool) {
        {
            let mut buffer = self.tail_buffer.lock();
            if self.config.error_tail > 0 {
                if buffer.len() >= self.config.error_tail {
                    buffer.pop_front();
                }
                buffer.push_back(line.to_string());
            }
        }

        if self.config.compact {
            return;
        }

        let prefix = if is_stderr { "[stderr] " } else { "" };
        let msg = format!("{}{}", prefix, line);
        self.log(LogLevel::Debug, &msg);
    }

    /// Show the tail buffer (typically after an error) and clear it.
    pub fn show_tail(&self, header: &str) {
        let lines: Vec<String> = self.tail_buffer.lock().drain(..).collect();
        if lines.is_empty() {
            return;
        }

        self.output(&self.format_message(&format!("[{}/tail]", header)));
        for line in &lines {
            self.output(&self.format_message(line));
        }
    }

    /// Get the current tail buffer contents.
    pub fn get_tail(&self) -> Vec<String> {
        self.tail_buffer.lock().iter().cloned().collect()
    }

    /// Flush the log file.
    pub fn flush(&self) {
        if let Some(ref mut writer) = *self.file_writer.lock() {
            let _ = writer.flush();
        }
    }

    /// Close the logger and release the file.
    pub fn close(&self) {
        self.flush();
        *self.file_writer.lock() = None;
    }

    /// Format a message with timestamp (if enabled).
    fn format_message(&self, message: &str) -> String {
        if self.config.show_timestamps {
            let timestamp = Local::now().format("%H:%M:%S");
            format!("[{}] {}", timestamp, message)
        } else {
            message.to_string()
        }
    }

    /// Output a formatted message to file and callback.
    fn output(&self, formatted: &str) {
        if let Some(ref mut writer) = *self.file_writer.lock() {
            let _ = writeln!(writer, "{}", formatted);
        }

        if let Some(ref callback) = *self.callback.lock() {
            callback(formatted);
        }
    }
}

impl Drop for JobLogger {
    fn drop(&mut self) {
        self.close();
    }
}

/// Sanitize a string to be safe for use as a filename.
fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            _ => c,
        })
        .collect()
}

/// Builder for creating JobLogger with fluent API.
pub struct JobLoggerBuilder {
    job_name: String,
    log_dir: Option<PathBuf>,
    config: LogConfig,
    callback: Option<LogCallback>,
}

impl JobLoggerBuilder {
    /// Create a new builder (console output only until `log_dir` is set).
    pub fn new(job_name: impl Into<String>) -> Self {
        Self {
            job_name: job_name.into(),
            log_dir: None,
            config: LogConfig::default(),
            callback: None,
        }
    }

    /// Also write a log file into this directory.
    pub fn log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.log_dir = Some(dir.into());
        self
    }

    /// Set the logging configuration.
    pub fn config(mut self, config: LogConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the log level.
    pub fn level(mut self, level: LogLevel) -> Self {
        self.config.level = level;
        self
    }

    /// Set the line callback.
    pub fn callback(mut self, callback: LogCallback) -> Self {
        self.callback = Some(callback);
        self
    }

    /// Build the JobLogger.
    pub fn build(self) -> std::io::Result<JobLogger> {
        match self.log_dir {
            Some(dir) => JobLogger::new(self.job_name, dir, self.config, self.callback),
            None => Ok(JobLogger::console(
                self.job_name,
                self.config,
                self.callback,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::tempdir;

    fn collecting_callback() -> (LogCallback, Arc<Mutex<Vec<String>>>) {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&lines);
        let callback: LogCallback = Box::new(move |msg| sink.lock().push(msg.to_string()));
        (callback, lines)
    }

    #[test]
    fn creates_log_file() {
        let dir = tempdir().unwrap();
        let logger = JobLogger::new("movie.mp4", dir.path(), LogConfig::default(), None).unwrap();

        let path = logger.log_path().unwrap();
        assert!(path.exists());
        assert!(path.to_string_lossy().contains("movie.mp4.log"));
    }

    #[test]
    fn writes_to_file() {
        let dir = tempdir().unwrap();
        let logger = JobLogger::new("job", dir.path(), LogConfig::default(), None).unwrap();

        logger.phase("Pass 1");
        logger.flush();

        let content = fs::read_to_string(logger.log_path().unwrap()).unwrap();
        assert!(content.contains("=== Pass 1 ==="));
    }

    #[test]
    fn console_logger_has_no_file() {
        let logger = JobLogger::console("job", LogConfig::default(), None);
        assert!(logger.log_path().is_none());
        logger.info("goes nowhere");
    }

    #[test]
    fn calls_callback() {
        let call_count = Arc::new(AtomicUsize::new(0));
        let count_clone = call_count.clone();

        let callback: LogCallback = Box::new(move |_msg| {
            count_clone.fetch_add(1, Ordering::SeqCst);
        });

        let logger = JobLogger::console("job", LogConfig::default(), Some(callback));

        logger.info("Message 1");
        logger.success("Message 2");

        assert_eq!(call_count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn level_filters_debug_lines() {
        let (callback, lines) = collecting_callback();
        let logger = JobLogger::console("job", LogConfig::default(), Some(callback));

        logger.command("ffmpeg -y -i in.mp4");
        logger.info("visible");

        assert_eq!(*lines.lock(), vec!["visible".to_string()]);
    }

    #[test]
    fn tail_buffer_maintains_limit() {
        let mut config = LogConfig::default();
        config.error_tail = 5;

        let logger = JobLogger::console("job", config, None);

        for i in 0..10 {
            logger.output_line(&format!("Line {}", i), true);
        }

        let tail = logger.get_tail();
        assert_eq!(tail.len(), 5);
        assert_eq!(tail[0], "Line 5");
        assert_eq!(tail[4], "Line 9");
    }

    #[test]
    fn show_tail_prints_and_drains() {
        let (callback, lines) = collecting_callback();
        let logger = JobLogger::console("job", LogConfig::default(), Some(callback));

        logger.output_line("Unknown encoder 'libx999'", true);
        logger.show_tail("ffmpeg");

        let printed = lines.lock().clone();
        assert_eq!(printed[0], "[ffmpeg/tail]");
        assert_eq!(printed[1], "Unknown encoder 'libx999'");
        assert!(logger.get_tail().is_empty());
    }

    #[test]
    fn builder_without_dir_is_console_only() {
        let logger = JobLoggerBuilder::new("job")
            .level(LogLevel::Warn)
            .build()
            .unwrap();
        assert!(logger.log_path().is_none());
    }

    #[test]
    fn sanitizes_filename() {
        assert_eq!(sanitize_filename("normal_name"), "normal_name");
        assert_eq!(sanitize_filename("has/slash"), "has_slash");
        assert_eq!(sanitize_filename("has:colon"), "has_colon");
        assert_eq!(sanitize_filename("a<b>c"), "a_b_c");
    }
}
