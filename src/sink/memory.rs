//! In-memory sink for tests and programmatic capture.
//!
//! A single `MemorySink` can stand in for all three destinations at once; every call is kept
//! in arrival order so tests can assert on fan-out ordering.

use std::sync::{Mutex, PoisonError};

use super::{ConsoleColor, ConsoleSink, FileLevel, FileSink, Media, ReportSection, ReportSink};
use crate::error::{ReportError, SinkError};

/// One call received by a `MemorySink`.
#[derive(Debug, Clone, PartialEq)]
pub enum Captured {
    Console {
        color: ConsoleColor,
        text: String,
    },
    File {
        level: FileLevel,
        text: String,
    },
    Report {
        node: String,
        section: ReportSection,
        text: String,
        media: Option<Media>,
    },
}

#[derive(Debug, Default)]
struct MemoryState {
    captured: Vec<Captured>,
    test: Option<String>,
    node: Option<String>,
    flushes: usize,
}

/// MemorySink: collects every sink call for later inspection.
#[derive(Debug, Default)]
pub struct MemorySink {
    state: Mutex<MemoryState>,
    unavailable: bool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink whose every write fails, for exercising failure containment.
    pub fn unavailable() -> Self {
        Self {
            state: Mutex::default(),
            unavailable: true,
        }
    }

    pub fn captured(&self) -> Vec<Captured> {
        self.lock().captured.clone()
    }

    pub fn console_lines(&self) -> Vec<(ConsoleColor, String)> {
        self.lock()
            .captured
            .iter()
            .filter_map(|c| match c {
                Captured::Console { color, text } => Some((*color, text.clone())),
                _ => None,
            })
            .collect()
    }

    pub fn file_lines(&self) -> Vec<(FileLevel, String)> {
        self.lock()
            .captured
            .iter()
            .filter_map(|c| match c {
                Captured::File { level, text } => Some((*level, text.clone())),
                _ => None,
            })
            .collect()
    }

    pub fn report_entries(&self) -> Vec<(ReportSection, String)> {
        self.lock()
            .captured
            .iter()
            .filter_map(|c| match c {
                Captured::Report { section, text, .. } => Some((*section, text.clone())),
                _ => None,
            })
            .collect()
    }

    pub fn flushes(&self) -> usize {
        self.lock().flushes
    }

    pub fn clear(&self) {
        self.lock().captured.clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_available(&self) -> Result<(), SinkError> {
        if self.unavailable {
            return Err(SinkError::Unavailable("memory sink marked unavailable".into()));
        }
        Ok(())
    }
}

impl ConsoleSink for MemorySink {
    fn print(&self, color: ConsoleColor, text: &str) -> Result<(), SinkError> {
        self.check_available()?;
        self.lock().captured.push(Captured::Console {
            color,
            text: text.to_string(),
        });
        Ok(())
    }
}

impl FileSink for MemorySink {
    fn log(&self, level: FileLevel, text: &str) -> Result<(), SinkError> {
        self.check_available()?;
        self.lock().captured.push(Captured::File {
            level,
            text: text.to_string(),
        });
        Ok(())
    }
}

impl ReportSink for MemorySink {
    fn create_test(&self, name: &str) {
        let mut state = self.lock();
        if state.test.as_deref() != Some(name) {
            state.test = Some(name.to_string());
            state.node = None;
        }
    }

    fn create_node(&self, name: &str) -> Result<(), ReportError> {
        let mut state = self.lock();
        if state.test.is_none() {
            return Err(ReportError::NoActiveTest);
        }
        state.node = Some(name.to_string());
        Ok(())
    }

    fn log(
        &self,
        section: ReportSection,
        text: &str,
        media: Option<Media>,
    ) -> Result<(), SinkError> {
        self.check_available()?;
        let mut state = self.lock();
        let Some(node) = state.node.clone() else {
            return Ok(());
        };
        state.captured.push(Captured::Report {
            node,
            section,
            text: text.to_string(),
            media,
        });
        Ok(())
    }

    fn flush(&self) -> Result<(), ReportError> {
        self.lock().flushes += 1;
        Ok(())
    }
}
