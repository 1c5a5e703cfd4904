//! # Log sinks
//!
//! A sink is one independent destination for a log event. The dispatcher talks to exactly
//! three of them through the narrow traits below:
//!
//! - **`ConsoleSink`**: one colored line on standard output
//! - **`FileSink`**: one leveled line in persistent storage
//! - **`ReportSink`**: one entry in the HTML test report, under the active test node
//!
//! Sinks are process-wide and shared between concurrently running tests, so every
//! implementation serializes its own writes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ReportError, SinkError};

pub mod console;
pub mod file;
pub mod memory;

pub use console::StandardConsole;
pub use file::{FileLog, TracingSink};
pub use memory::{Captured, MemorySink};

// ============================================================================
// SINK TRAITS
// ============================================================================

/// Writes one colored line to standard output.
pub trait ConsoleSink: Send + Sync {
    fn print(&self, color: ConsoleColor, text: &str) -> Result<(), SinkError>;
}

/// Writes one leveled line to persistent storage, honoring its own level threshold.
pub trait FileSink: Send + Sync {
    fn log(&self, level: FileLevel, text: &str) -> Result<(), SinkError>;
}

/// Test report destination. Logging before any test node exists is a silent no-op.
pub trait ReportSink: Send + Sync {
    fn create_test(&self, name: &str);
    fn create_node(&self, name: &str) -> Result<(), ReportError>;
    fn log(&self, section: ReportSection, text: &str, media: Option<Media>)
        -> Result<(), SinkError>;
    fn flush(&self) -> Result<(), ReportError>;
}

// ============================================================================
// SINK VOCABULARY
// ============================================================================

/// Console colors used by the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConsoleColor {
    Red,
    Green,
    Cyan,
    Yellow,
    Magenta,
}

impl From<ConsoleColor> for termcolor::Color {
    fn from(color: ConsoleColor) -> Self {
        match color {
            ConsoleColor::Red => termcolor::Color::Red,
            ConsoleColor::Green => termcolor::Color::Green,
            ConsoleColor::Cyan => termcolor::Color::Cyan,
            ConsoleColor::Yellow => termcolor::Color::Yellow,
            ConsoleColor::Magenta => termcolor::Color::Magenta,
        }
    }
}

/// Levels understood by the file sink, least severe first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FileLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl FileLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            FileLevel::Debug => "DEBUG",
            FileLevel::Info => "INFO",
            FileLevel::Warn => "WARN",
            FileLevel::Error => "ERROR",
        }
    }
}

impl fmt::Display for FileLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" => Ok(FileLevel::Debug),
            "info" => Ok(FileLevel::Info),
            "warn" | "warning" => Ok(FileLevel::Warn),
            "error" => Ok(FileLevel::Error),
            other => Err(format!("unknown log level: {}", other)),
        }
    }
}

/// Report sections an entry can be filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportSection {
    Info,
    Warning,
    Fail,
    Pass,
    Skip,
}

impl ReportSection {
    /// Rank used to derive node and test status; higher wins.
    pub fn severity(self) -> u8 {
        match self {
            ReportSection::Info => 0,
            ReportSection::Pass => 1,
            ReportSection::Warning => 2,
            ReportSection::Skip => 3,
            ReportSection::Fail => 4,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ReportSection::Info => "info",
            ReportSection::Warning => "warning",
            ReportSection::Fail => "fail",
            ReportSection::Pass => "pass",
            ReportSection::Skip => "skip",
        }
    }
}

impl fmt::Display for ReportSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Language tag of an embedded code block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodeLanguage {
    Json,
    Xml,
}

/// Attachment carried by a report entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Media {
    ScreenshotPath { path: String },
    ScreenshotBase64 { data: String },
    CodeBlock { language: CodeLanguage, code: String },
}
