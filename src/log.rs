//! # Unified log dispatcher
//!
//! Fans one logged event out to the report, the console and the file sink, in that order.
//!
//! ## Routing
//!
//! | level | console | file  | report  |
//! |-------|---------|-------|---------|
//! | Debug | magenta | DEBUG | (none)  |
//! | Info  | cyan    | INFO  | info    |
//! | Warn  | yellow  | WARN  | warning |
//! | Fail  | red     | ERROR | fail    |
//! | Pass  | green   | INFO  | pass    |
//! | Skip  | yellow  | WARN  | skip    |
//!
//! ## Failure containment
//!
//! Sinks never depend on each other. A failing sink is reported on a side channel (the console,
//! then `tracing`) and the remaining sinks are still notified; `emit` itself never fails.

use std::error::Error;
use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use sha2::{Digest, Sha256};

use crate::config::Config;
use crate::error::SinkError;
use crate::sink::{
    CodeLanguage, ConsoleColor, ConsoleSink, FileLevel, FileLog, FileSink, Media, ReportSection,
    ReportSink, StandardConsole, TracingSink,
};

// ============================================================================
// EVENTS
// ============================================================================

/// Severity of a test-lifecycle event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Fail,
    Pass,
    Skip,
}

impl LogLevel {
    pub fn console_color(self) -> ConsoleColor {
        match self {
            LogLevel::Debug => ConsoleColor::Magenta,
            LogLevel::Info => ConsoleColor::Cyan,
            LogLevel::Warn => ConsoleColor::Yellow,
            LogLevel::Fail => ConsoleColor::Red,
            LogLevel::Pass => ConsoleColor::Green,
            LogLevel::Skip => ConsoleColor::Yellow,
        }
    }

    pub fn file_level(self) -> FileLevel {
        match self {
            LogLevel::Debug => FileLevel::Debug,
            LogLevel::Info => FileLevel::Info,
            LogLevel::Warn => FileLevel::Warn,
            LogLevel::Fail => FileLevel::Error,
            LogLevel::Pass => FileLevel::Info,
            LogLevel::Skip => FileLevel::Warn,
        }
    }

    /// Debug detail is operational, not test evidence, so it has no report section.
    pub fn report_section(self) -> Option<ReportSection> {
        match self {
            LogLevel::Debug => None,
            LogLevel::Info => Some(ReportSection::Info),
            LogLevel::Warn => Some(ReportSection::Warning),
            LogLevel::Fail => Some(ReportSection::Fail),
            LogLevel::Pass => Some(ReportSection::Pass),
            LogLevel::Skip => Some(ReportSection::Skip),
        }
    }
}

/// The unit dispatched to the sinks.
#[derive(Debug, Clone, Copy)]
pub struct LogEvent<'e> {
    pub level: LogLevel,
    pub text: &'e str,
    pub cause: Option<&'e (dyn Error + 'static)>,
}

impl<'e> LogEvent<'e> {
    pub fn new(level: LogLevel, text: &'e str) -> Self {
        Self {
            level,
            text,
            cause: None,
        }
    }

    pub fn with_cause(mut self, cause: &'e (dyn Error + 'static)) -> Self {
        self.cause = Some(cause);
        self
    }

    /// The event text, or the cause's message on one line when no text was given.
    pub fn display_text(&self) -> String {
        match self.cause {
            Some(cause) if self.text.is_empty() => flatten(&cause.to_string()),
            _ => self.text.to_string(),
        }
    }
}

// ============================================================================
// DISPATCHER
// ============================================================================

/// Fan-out of one event to console, file and report sinks.
#[derive(Clone)]
pub struct LogDispatcher {
    report: Option<Arc<dyn ReportSink>>,
    console: Arc<dyn ConsoleSink>,
    file: Arc<dyn FileSink>,
}

impl fmt::Debug for LogDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogDispatcher")
            .field("report", &self.report.is_some())
            .finish_non_exhaustive()
    }
}

impl LogDispatcher {
    pub fn new(console: Arc<dyn ConsoleSink>, file: Arc<dyn FileSink>) -> Self {
        Self {
            report: None,
            console,
            file,
        }
    }

    /// Stdout console plus the configured log file. Falls back to `TracingSink` when the log
    /// file cannot be opened.
    pub fn standard(config: &Config) -> Self {
        let file: Arc<dyn FileSink> = match FileLog::open(&config.log_path, config.file_level()) {
            Ok(file) => Arc::new(file),
            Err(e) => {
                tracing::warn!(
                    target: "vouch",
                    path = %config.log_path.display(),
                    error = %e,
                    "log file unavailable, forwarding file output to tracing"
                );
                Arc::new(TracingSink)
            }
        };
        Self::new(Arc::new(StandardConsole::new()), file)
    }

    pub fn with_report(mut self, report: Arc<dyn ReportSink>) -> Self {
        self.report = Some(report);
        self
    }

    pub fn set_report(&mut self, report: Option<Arc<dyn ReportSink>>) {
        self.report = report;
    }

    pub fn report(&self) -> Option<&Arc<dyn ReportSink>> {
        self.report.as_ref()
    }

    /// Notifies report, console and file, in that order. Never fails.
    pub fn emit(&self, event: &LogEvent<'_>) {
        let text = event.display_text();

        if let (Some(report), Some(section)) = (&self.report, event.level.report_section()) {
            let entry = match (event.level, event.cause) {
                (LogLevel::Fail, Some(cause)) if !event.text.is_empty() => {
                    format!("{} - {}", text, flatten(&cause.to_string()))
                }
                _ => text.clone(),
            };
            if let Err(e) = report.log(section, &entry, None) {
                self.side_channel("report", &e);
            }
        }

        if let Err(e) = self.console.print(event.level.console_color(), &text) {
            tracing::warn!(target: "vouch", sink = "console", error = %e, "sink write failed");
        }

        if let Err(e) = self.write_file(event.level.file_level(), event.text, event.cause) {
            self.side_channel("file", &e);
        }
    }

    pub fn debug(&self, text: &str) {
        self.emit(&LogEvent::new(LogLevel::Debug, text));
    }

    pub fn info(&self, text: &str) {
        self.emit(&LogEvent::new(LogLevel::Info, text));
    }

    pub fn warn(&self, text: &str) {
        self.emit(&LogEvent::new(LogLevel::Warn, text));
    }

    pub fn warn_with_cause(&self, text: &str, cause: &(dyn Error + 'static)) {
        self.emit(&LogEvent::new(LogLevel::Warn, text).with_cause(cause));
    }

    pub fn fail(&self, text: &str) {
        self.emit(&LogEvent::new(LogLevel::Fail, text));
    }

    pub fn fail_with_cause(&self, text: &str, cause: &(dyn Error + 'static)) {
        self.emit(&LogEvent::new(LogLevel::Fail, text).with_cause(cause));
    }

    pub fn pass(&self, text: &str) {
        self.emit(&LogEvent::new(LogLevel::Pass, text));
    }

    pub fn skip(&self, text: &str) {
        self.emit(&LogEvent::new(LogLevel::Skip, text));
    }

    // ------------------------------------------------------------------------
    // Report-only entries
    // ------------------------------------------------------------------------

    pub fn info_with_screenshot_by_path(&self, text: &str, path: &str) {
        self.report_only(
            text,
            Media::ScreenshotPath {
                path: path.to_string(),
            },
        );
    }

    pub fn info_with_screenshot_base64(&self, text: &str, base64: &str) {
        self.report_only(
            text,
            Media::ScreenshotBase64 {
                data: base64.to_string(),
            },
        );
    }

    pub fn info_with_json(&self, json: &str) {
        self.report_only(
            "",
            Media::CodeBlock {
                language: CodeLanguage::Json,
                code: json.to_string(),
            },
        );
    }

    pub fn info_with_xml(&self, xml: &str) {
        self.report_only(
            "",
            Media::CodeBlock {
                language: CodeLanguage::Xml,
                code: xml.to_string(),
            },
        );
    }

    // ------------------------------------------------------------------------
    // Private helpers
    // ------------------------------------------------------------------------

    fn report_only(&self, text: &str, media: Media) {
        let Some(report) = &self.report else {
            return;
        };
        if let Err(e) = report.log(ReportSection::Info, text, Some(media)) {
            self.side_channel("report", &e);
        }
    }

    /// One line for the text, then one per cause link. Without text only the chain is written.
    fn write_file(
        &self,
        level: FileLevel,
        text: &str,
        cause: Option<&(dyn Error + 'static)>,
    ) -> Result<(), SinkError> {
        let Some(cause) = cause else {
            return self.file.log(level, &flatten(text));
        };
        if !text.is_empty() {
            self.file.log(level, &flatten(text))?;
        }
        let incident = incident_id();
        for link in cause_chain(cause) {
            self.file
                .log(level, &format!("{} [caused_by] {}", incident, flatten(&link.to_string())))?;
        }
        Ok(())
    }

    fn side_channel(&self, sink: &str, error: &SinkError) {
        tracing::warn!(target: "vouch", sink, error = %error, "sink write failed");
        let _ = self.console.print(
            ConsoleColor::Yellow,
            &format!("[vouch] {} sink write failed: {}", sink, error),
        );
    }
}

// ============================================================================
// CAUSE CHAINS AND INCIDENTS
// ============================================================================

/// Random per-call tag shared by every cause line of one event, e.g. `[#3fa90c1]`.
pub fn incident_id() -> String {
    let mut hasher = Sha256::new();
    hasher.update(rand::random::<u64>().to_le_bytes());
    hasher.update(Utc::now().timestamp_millis().to_le_bytes());
    let hex: String = hasher
        .finalize()
        .iter()
        .map(|byte| format!("{:02x}", byte))
        .collect();
    format!("[#{}]", &hex[..7])
}

/// The error followed by its `source()` chain, stopping at an error already visited.
pub fn cause_chain<'e>(root: &'e (dyn Error + 'static)) -> Vec<&'e (dyn Error + 'static)> {
    let mut chain = vec![root];
    let mut current = root;
    while let Some(next) = current.source() {
        if chain.iter().any(|seen| same_error(*seen, next)) {
            break;
        }
        chain.push(next);
        current = next;
    }
    chain
}

fn same_error(a: &(dyn Error + 'static), b: &(dyn Error + 'static)) -> bool {
    std::ptr::eq(
        a as *const (dyn Error + 'static) as *const (),
        b as *const (dyn Error + 'static) as *const (),
    )
}

fn flatten(text: &str) -> String {
    text.replace("\r\n", " ").replace('\n', " ")
}

#[cfg(test)]
mod log_tests {
    use super::*;

    #[derive(Debug)]
    struct Link {
        name: &'static str,
        next: Option<Box<Link>>,
    }

    impl fmt::Display for Link {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.name)
        }
    }

    impl Error for Link {
        fn source(&self) -> Option<&(dyn Error + 'static)> {
            self.next.as_deref().map(|n| n as &(dyn Error + 'static))
        }
    }

    /// An error that names itself as its own source.
    #[derive(Debug)]
    struct Ouroboros;

    impl fmt::Display for Ouroboros {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("ouroboros")
        }
    }

    impl Error for Ouroboros {
        fn source(&self) -> Option<&(dyn Error + 'static)> {
            Some(self)
        }
    }

    #[test]
    fn test_routing_table() {
        use LogLevel::*;
        let expected = [
            (Debug, ConsoleColor::Magenta, FileLevel::Debug, None),
            (Info, ConsoleColor::Cyan, FileLevel::Info, Some(ReportSection::Info)),
            (Warn, ConsoleColor::Yellow, FileLevel::Warn, Some(ReportSection::Warning)),
            (Fail, ConsoleColor::Red, FileLevel::Error, Some(ReportSection::Fail)),
            (Pass, ConsoleColor::Green, FileLevel::Info, Some(ReportSection::Pass)),
            (Skip, ConsoleColor::Yellow, FileLevel::Warn, Some(ReportSection::Skip)),
        ];
        for (level, color, file, section) in expected {
            assert_eq!(level.console_color(), color, "{:?}", level);
            assert_eq!(level.file_level(), file, "{:?}", level);
            assert_eq!(level.report_section(), section, "{:?}", level);
        }
    }

    #[test]
    fn test_incident_id_shape() {
        let id = incident_id();
        assert_eq!(id.len(), 10);
        assert!(id.starts_with("[#"));
        assert!(id.ends_with(']'));
        assert!(id[2..9].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_cause_chain_walks_sources_in_order() {
        let root = Link {
            name: "outer",
            next: Some(Box::new(Link {
                name: "middle",
                next: Some(Box::new(Link {
                    name: "inner",
                    next: None,
                })),
            })),
        };
        let names: Vec<String> = cause_chain(&root).iter().map(|e| e.to_string()).collect();
        assert_eq!(names, vec!["outer", "middle", "inner"]);
    }

    #[test]
    fn test_cause_chain_stops_at_cycle() {
        let chain = cause_chain(&Ouroboros);
        assert_eq!(chain.len(), 1);
    }

    #[test]
    fn test_display_text_fallback_is_one_line() {
        let cause = crate::compare::ComparisonFailure::new("3", "2");
        let event = LogEvent::new(LogLevel::Fail, "").with_cause(&cause);
        assert_eq!(event.display_text(), "expected: 3 but was: 2");
    }

    #[test]
    fn test_display_text_falls_back_to_cause() {
        let cause = Ouroboros;
        let event = LogEvent::new(LogLevel::Fail, "").with_cause(&cause);
        assert_eq!(event.display_text(), "ouroboros");
        let event = LogEvent::new(LogLevel::Fail, "ctx").with_cause(&cause);
        assert_eq!(event.display_text(), "ctx");
    }
}
