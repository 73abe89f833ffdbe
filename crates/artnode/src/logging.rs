//! Logging configuration
//!
//! Console output goes to stderr; file output writes one timestamped file
//! per session into `log_directory` and keeps the newest `max_files`.

use std::fs;
use std::io;
use std::path::PathBuf;

use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::Level;

const LOG_FILE_PREFIX: &str = "artnode_";
const LOG_FILE_EXTENSION: &str = "log";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// trace, debug, info, warn or error
    pub level: String,
    pub console_output: bool,
    pub file_output: bool,
    pub log_directory: PathBuf,
    /// Log files kept by `cleanup_old_logs`
    pub max_files: usize,
    #[serde(skip)]
    pub(crate) session_stamp: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            console_output: true,
            file_output: false,
            log_directory: PathBuf::from("logs"),
            max_files: 10,
            session_stamp: Local::now().format("%Y-%m-%d_%H-%M-%S").to_string(),
        }
    }
}

impl LogConfig {
    /// Level from `level`, INFO when unrecognised
    pub fn parse_level(&self) -> Level {
        self.level.parse().unwrap_or(Level::INFO)
    }

    pub fn ensure_log_directory(&self) -> io::Result<()> {
        if self.file_output {
            fs::create_dir_all(&self.log_directory)?;
        }
        Ok(())
    }

    /// Log file of the current session
    pub fn current_log_path(&self) -> PathBuf {
        self.log_directory.join(format!(
            "{}{}.{}",
            LOG_FILE_PREFIX, self.session_stamp, LOG_FILE_EXTENSION
        ))
    }

    /// Delete the oldest log files so that a new session stays within `max_files`
    pub fn cleanup_old_logs(&self) -> io::Result<usize> {
        if !self.file_output || !self.log_directory.is_dir() {
            return Ok(0);
        }
        let mut logs: Vec<PathBuf> = fs::read_dir(&self.log_directory)?
            .filter_map(|entry| entry.ok().map(|entry| entry.path()))
            .filter(|path| is_log_file(path))
            .collect();
        // Timestamped names sort chronologically
        logs.sort();

        let keep = self.max_files.saturating_sub(1);
        let excess = logs.len().saturating_sub(keep);
        for path in logs.iter().take(excess) {
            fs::remove_file(path)?;
        }
        Ok(excess)
    }
}

fn is_log_file(path: &std::path::Path) -> bool {
    let name_matches = path
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with(LOG_FILE_PREFIX));
    name_matches && path.extension().and_then(|ext| ext.to_str()) == Some(LOG_FILE_EXTENSION)
}
