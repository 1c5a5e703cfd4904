//! File sinks.
//!
//! - **`FileLog`**: appends timestamped, leveled lines to a log file
//! - **`TracingSink`**: forwards the same lines as `tracing` events, for hosts that already
//!   persist logs through a subscriber

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use chrono::Local;

use super::{FileLevel, FileSink};
use crate::error::SinkError;

/// Appends `2026-10-19 12:00:00.123 [LEVEL] text` lines to a file.
pub struct FileLog {
    path: PathBuf,
    threshold: FileLevel,
    writer: Mutex<BufWriter<File>>,
}

impl FileLog {
    /// Opens (or creates) the log file, creating parent directories as needed.
    pub fn open(path: impl AsRef<Path>, threshold: FileLevel) -> Result<Self, SinkError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            threshold,
            writer: Mutex::new(BufWriter::new(file)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn threshold(&self) -> FileLevel {
        self.threshold
    }
}

impl FileSink for FileLog {
    fn log(&self, level: FileLevel, text: &str) -> Result<(), SinkError> {
        if level < self.threshold {
            return Ok(());
        }
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        writeln!(
            writer,
            "{} [{}] {}",
            Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
            level,
            text
        )?;
        writer.flush()?;
        Ok(())
    }
}

/// Emits each line as a `tracing` event under the `vouch` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl FileSink for TracingSink {
    fn log(&self, level: FileLevel, text: &str) -> Result<(), SinkError> {
        match level {
            FileLevel::Debug => tracing::debug!(target: "vouch", "{}", text),
            FileLevel::Info => tracing::info!(target: "vouch", "{}", text),
            FileLevel::Warn => tracing::warn!(target: "vouch", "{}", text),
            FileLevel::Error => tracing::error!(target: "vouch", "{}", text),
        }
        Ok(())
    }
}
