//! Fan-out, routing and failure containment of the log dispatcher.

mod common;

use std::fs;
use std::sync::Arc;

use common::{captured_dispatcher, is_report, report_texts};
use vouch::log::LogDispatcher;
use vouch::prelude::*;
use vouch::sink::{
    Captured, CodeLanguage, ConsoleColor, FileLevel, FileLog, Media, MemorySink, ReportSection,
    ReportSink,
};

#[cfg(test)]
mod routing_tests {
    use super::*;

    #[test]
    fn test_sinks_notified_report_console_file() {
        let (sink, log) = captured_dispatcher();

        log.warn("careful");

        assert_eq!(
            sink.captured(),
            vec![
                Captured::Report {
                    node: "case".to_string(),
                    section: ReportSection::Warning,
                    text: "careful".to_string(),
                    media: None,
                },
                Captured::Console {
                    color: ConsoleColor::Yellow,
                    text: "careful".to_string(),
                },
                Captured::File {
                    level: FileLevel::Warn,
                    text: "careful".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_debug_bypasses_report() {
        let (sink, log) = captured_dispatcher();

        log.debug("internal detail");

        assert!(!sink.captured().iter().any(is_report));
        assert_eq!(
            sink.console_lines(),
            vec![(ConsoleColor::Magenta, "internal detail".to_string())]
        );
        assert_eq!(
            sink.file_lines(),
            vec![(FileLevel::Debug, "internal detail".to_string())]
        );
    }

    #[test]
    fn test_pass_and_skip_routing() {
        let (sink, log) = captured_dispatcher();

        log.pass("ok");
        log.skip("later");
        log.info("note");

        assert_eq!(
            sink.report_entries(),
            vec![
                (ReportSection::Pass, "ok".to_string()),
                (ReportSection::Skip, "later".to_string()),
                (ReportSection::Info, "note".to_string()),
            ]
        );
        assert_eq!(
            sink.file_lines(),
            vec![
                (FileLevel::Info, "ok".to_string()),
                (FileLevel::Warn, "later".to_string()),
                (FileLevel::Info, "note".to_string()),
            ]
        );
    }

    #[test]
    fn test_entries_without_report_node_are_dropped() {
        let sink = Arc::new(MemorySink::new());
        let log = LogDispatcher::new(sink.clone(), sink.clone()).with_report(sink.clone());

        log.fail("before any test");
        log.info_with_json("{}");

        assert!(sink.report_entries().is_empty());
        assert_eq!(sink.console_lines().len(), 1);
    }
}

#[cfg(test)]
mod cause_tests {
    use super::*;

    #[test]
    fn test_cause_chain_lines_share_one_incident() {
        let (sink, log) = captured_dispatcher();
        let cause = ComparisonFailure::new("a valid pattern /(/", "\"x\"")
            .with_source(std::io::Error::new(std::io::ErrorKind::Other, "root cause"));

        log.fail_with_cause("broken", &cause);

        let files = sink.file_lines();
        assert_eq!(files.len(), 3);
        assert_eq!(files[0], (FileLevel::Error, "broken".to_string()));
        let incident = &files[1].1[..10];
        assert!(incident.starts_with("[#"));
        assert!(files[1].1.contains("[caused_by] expected: a valid pattern /(/ but was: \"x\""));
        assert_eq!(&files[2].1[..10], incident);
        assert!(files[2].1.ends_with("[caused_by] root cause"));

        let fails = report_texts(&sink, ReportSection::Fail);
        assert_eq!(
            fails,
            vec!["broken - expected: a valid pattern /(/ but was: \"x\"".to_string()]
        );
        assert_eq!(sink.console_lines()[0].1, "broken");
    }

    #[test]
    fn test_missing_text_uses_cause_message() {
        let (sink, log) = captured_dispatcher();

        log.warn_with_cause("", &ComparisonFailure::explicit());

        assert_eq!(
            sink.console_lines(),
            vec![(ConsoleColor::Yellow, "explicit failure".to_string())]
        );
    }
}

#[cfg(test)]
mod containment_tests {
    use super::*;

    #[test]
    fn test_failing_report_does_not_block_other_sinks() {
        let broken = Arc::new(MemorySink::unavailable());
        let sink = Arc::new(MemorySink::new());
        let log = LogDispatcher::new(sink.clone(), sink.clone()).with_report(broken);

        log.fail("still visible");

        let console = sink.console_lines();
        assert_eq!(console.len(), 2);
        assert_eq!(console[0].0, ConsoleColor::Yellow);
        assert!(console[0].1.contains("report sink write failed"));
        assert_eq!(console[1], (ConsoleColor::Red, "still visible".to_string()));
        assert_eq!(
            sink.file_lines(),
            vec![(FileLevel::Error, "still visible".to_string())]
        );
    }

    #[test]
    fn test_failing_file_and_console_never_reach_the_caller() {
        let broken = Arc::new(MemorySink::unavailable());
        let log = LogDispatcher::new(broken.clone(), broken.clone());
        let mut hard = Assertions::new(&log);

        hard.assert_that(1).is_equal_to(1).unwrap();
        let err = hard.assert_that(1).is_equal_to(2).unwrap_err();
        assert!(err.cause().is_some());
    }

    #[test]
    fn test_failing_file_is_reported_on_console() {
        let broken = Arc::new(MemorySink::unavailable());
        let console = Arc::new(MemorySink::new());
        let log = LogDispatcher::new(console.clone(), broken);

        log.info("hello");

        let lines = console.console_lines();
        assert_eq!(lines[0], (ConsoleColor::Cyan, "hello".to_string()));
        assert!(lines[1].1.contains("file sink write failed"));
    }
}

#[cfg(test)]
mod file_log_tests {
    use super::*;

    #[test]
    fn test_file_log_honours_threshold() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("run.log");
        let file = Arc::new(FileLog::open(&path, FileLevel::Warn).unwrap());
        let console = Arc::new(MemorySink::new());
        let log = LogDispatcher::new(console, file);

        log.info("hidden");
        log.fail("visible");

        let written = fs::read_to_string(&path).unwrap();
        assert!(!written.contains("hidden"));
        let line = written.lines().next().unwrap();
        assert!(line.ends_with("[ERROR] visible"));
    }

    #[test]
    fn test_failure_without_message_writes_only_leveled_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.log");
        let file = Arc::new(FileLog::open(&path, FileLevel::Debug).unwrap());
        let sink = Arc::new(MemorySink::new());
        let log = LogDispatcher::new(sink.clone(), file).with_report(sink.clone());
        sink.create_test("Suite");
        sink.create_node("case").unwrap();

        let err = Assertions::new(&log).assert_that(2).is_equal_to(3).unwrap_err();
        let cause = err.cause().unwrap().to_string().replace('\n', " ");

        let written = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(lines.len(), 1);
        assert!(lines
            .iter()
            .all(|line| line.contains("[ERROR]") && line.contains("[caused_by]")));
        assert_eq!(sink.console_lines(), vec![(ConsoleColor::Red, cause.clone())]);
        assert_eq!(report_texts(&sink, ReportSection::Fail), vec![cause]);
    }
}

#[cfg(test)]
mod media_tests {
    use super::*;

    fn report_media(sink: &MemorySink) -> Vec<(String, Option<Media>)> {
        sink.captured()
            .into_iter()
            .filter_map(|captured| match captured {
                Captured::Report {
                    section: ReportSection::Info,
                    text,
                    media,
                    ..
                } => Some((text, media)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_media_entries_reach_report_only() {
        let (sink, log) = captured_dispatcher();

        log.info_with_screenshot_by_path("login page", "screenshots/login.png");
        log.info_with_screenshot_base64("cart", "iVBORw0KGgo=");
        log.info_with_json(r#"{"id":1}"#);
        log.info_with_xml("<order id=\"1\"/>");

        assert_eq!(
            report_media(&sink),
            vec![
                (
                    "login page".to_string(),
                    Some(Media::ScreenshotPath {
                        path: "screenshots/login.png".to_string(),
                    })
                ),
                (
                    "cart".to_string(),
                    Some(Media::ScreenshotBase64 {
                        data: "iVBORw0KGgo=".to_string(),
                    })
                ),
                (
                    String::new(),
                    Some(Media::CodeBlock {
                        language: CodeLanguage::Json,
                        code: r#"{"id":1}"#.to_string(),
                    })
                ),
                (
                    String::new(),
                    Some(Media::CodeBlock {
                        language: CodeLanguage::Xml,
                        code: "<order id=\"1\"/>".to_string(),
                    })
                ),
            ]
        );
        assert!(sink.console_lines().is_empty());
        assert!(sink.file_lines().is_empty());
    }
}
