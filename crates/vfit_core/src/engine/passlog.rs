//! Two-pass statistics files.
//!
//! Pass 1 writes its statistics to `<prefix>-0.log` (plus the x264
//! macroblock tree `<prefix>-0.log.mbtree`); pass 2 reads them. The prefix
//! includes the input stem and the process id so concurrent runs in the
//! same directory never share statistics.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Suffixes the encoder appends to the pass-log prefix.
///
/// The `.temp` variants exist while pass 1 is running and survive it if
/// the encoder dies.
const ARTIFACT_SUFFIXES: [&str; 4] = [
    "-0.log",
    "-0.log.mbtree",
    "-0.log.temp",
    "-0.log.mbtree.temp",
];

/// Pass-log files of one two-pass encode.
///
/// Acquired before pass 1 and released after the pass 2 attempt. Release
/// happens through [`PassLog::cleanup`] or, failing that, on drop.
#[derive(Debug)]
pub struct PassLog {
    prefix: PathBuf,
    released: bool,
}

impl PassLog {
    /// Pass-log for `stem` inside `dir`.
    pub fn new(dir: &Path, stem: &str) -> Self {
        let name = format!("{}_2pass_{}", stem, std::process::id());
        Self {
            prefix: dir.join(name),
            released: false,
        }
    }

    /// Prefix passed to `-passlogfile`.
    pub fn prefix(&self) -> &Path {
        &self.prefix
    }

    /// The statistics file and the macroblock tree file.
    pub fn artifacts(&self) -> [PathBuf; 2] {
        [
            self.artifact(ARTIFACT_SUFFIXES[0]),
            self.artifact(ARTIFACT_SUFFIXES[1]),
        ]
    }

    /// Delete every pass-log file that exists. Returns how many were removed.
    pub fn cleanup(&mut self) -> usize {
        self.released = true;

        let mut removed = 0;
        for suffix in ARTIFACT_SUFFIXES {
            let path = self.artifact(suffix);
            match fs::remove_file(&path) {
                Ok(()) => {
                    tracing::debug!("Removed pass log {}", path.display());
                    removed += 1;
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => {
                    tracing::warn!("Failed to remove pass log {}: {}", path.display(), e);
                }
            }
        }
        removed
    }

    fn artifact(&self, suffix: &str) -> PathBuf {
        let mut name = self.prefix.clone().into_os_string();
        name.push(suffix);
        PathBuf::from(name)
    }
}

impl Drop for PassLog {
    fn drop(&mut self) {
        if !self.released {
            self.cleanup();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn touch_all(log: &PassLog) {
        for path in log.artifacts() {
            fs::write(path, b"stats").unwrap();
        }
    }

    #[test]
    fn artifacts_follow_encoder_naming() {
        let log = PassLog::new(Path::new("/videos"), "holiday");
        let [stats, mbtree] = log.artifacts();

        let prefix = log.prefix().to_string_lossy().to_string();
        assert!(prefix.starts_with("/videos/holiday_2pass_"));
        assert_eq!(stats.to_string_lossy(), format!("{}-0.log", prefix));
        assert_eq!(mbtree.to_string_lossy(), format!("{}-0.log.mbtree", prefix));
    }

    #[test]
    fn cleanup_removes_files() {
        let dir = tempdir().unwrap();
        let mut log = PassLog::new(dir.path(), "clip");
        touch_all(&log);

        assert_eq!(log.cleanup(), 2);
        for path in log.artifacts() {
            assert!(!path.exists());
        }
        // Second cleanup is a no-op
        assert_eq!(log.cleanup(), 0);
    }

    #[test]
    fn drop_removes_files() {
        let dir = tempdir().unwrap();
        let paths = {
            let log = PassLog::new(dir.path(), "clip");
            touch_all(&log);
            log.artifacts()
        };

        for path in paths {
            assert!(!path.exists());
        }
    }

    #[test]
    fn cleanup_sweeps_leftover_temp_files() {
        let dir = tempdir().unwrap();
        let mut log = PassLog::new(dir.path(), "clip");
        let temp = log.artifact("-0.log.mbtree.temp");
        fs::write(&temp, b"partial").unwrap();

        assert_eq!(log.cleanup(), 1);
        assert!(!temp.exists());
    }
}
