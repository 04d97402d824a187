//! CLI runner for common setup.
//!
//! Loads the config file and starts logging for commands that do real work.

use globemap::config::ConfigFile;
use globemap::logging::{default_log_file, init_logging, LoggingGuard};

use crate::error::CliError;

/// Keeps logging alive for the lifetime of a command.
pub struct CliRunner {
    _logging_guard: LoggingGuard,
    config: ConfigFile,
}

impl CliRunner {
    /// Loads `~/.globemap/config.ini` (defaults if missing) and starts
    /// logging to the file it names.
    pub fn new() -> Result<Self, CliError> {
        let config = ConfigFile::load()?;

        let log_path = &config.logging.file;
        let log_dir = log_path
            .parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| ".".into());
        let log_file = log_path
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| default_log_file().to_string());

        let logging_guard = init_logging(&log_dir, &log_file)
            .map_err(|e| CliError::LoggingInit(e.to_string()))?;

        Ok(Self {
            _logging_guard: logging_guard,
            config,
        })
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }
}
