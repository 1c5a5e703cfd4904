//! Soft assertion sessions: recording, draining and the tracker state machine.

mod common;

use common::{captured_dispatcher, report_texts};
use vouch::prelude::*;
use vouch::sink::{FileLevel, ReportSection};
use vouch::tracker::ErrorTracker;

#[cfg(test)]
mod tracker_tests {
    use super::*;

    #[test]
    fn test_record_rendering() {
        let mut tracker = ErrorTracker::new();
        tracker.add_description("only description");
        tracker.add_cause(ComparisonFailure::new("3", "2"));
        tracker.add_error("both", ComparisonFailure::explicit());

        assert_eq!(
            tracker.errors_as_string(),
            "[description] only description\n\
             [error_message] expected: 3\nbut was: 2\n\
             [description] both\n[error_message] explicit failure"
        );
    }

    #[test]
    fn test_empty_tracker_renders_empty_string() {
        let mut tracker = ErrorTracker::new();
        assert_eq!(tracker.errors_as_string(), "");
        assert!(!tracker.contains_errors());
        tracker.clear();
        tracker.clear();
        assert!(tracker.is_empty());
    }
}

#[cfg(test)]
mod session_tests {
    use super::*;

    #[test]
    fn test_failures_do_not_interrupt_the_session() {
        let (_sink, log) = captured_dispatcher();
        let mut soft = SoftAssertions::new(&log);

        assert!(soft.assert_that(2).is_equal_to(3).is_ok());
        assert!(soft.assert_that("abc").contains("z").is_ok());
        assert!(soft.assert_that(vec![1, 2]).has_size(5).is_ok());

        assert_eq!(soft.tracker().len(), 3);
    }

    #[test]
    fn test_scenario_one_failure_one_pass() {
        let (sink, log) = captured_dispatcher();
        let mut soft = SoftAssertions::new(&log);

        soft.assert_that(2).is_equal_to(3).unwrap();
        soft.assert_that("a").is_equal_to("a").unwrap();

        assert_eq!(report_texts(&sink, ReportSection::Pass).len(), 1);
        assert!(report_texts(&sink, ReportSection::Fail).is_empty());

        let err = soft.assert_all().unwrap_err();
        assert!(matches!(err, AssertionError::Aggregate { failures: 1 }));
        assert_eq!(report_texts(&sink, ReportSection::Fail).len(), 1);
        assert!(!soft.tracker().contains_errors());
    }

    #[test]
    fn test_drain_emits_one_fail_per_record_in_order() {
        let (sink, log) = captured_dispatcher();
        let mut soft = SoftAssertions::new(&log);

        soft.assert_with_message("first").assert_that(1).is_equal_to(2).unwrap();
        soft.assert_with_message("second").soft_fail();
        soft.assert_with_message("third").assert_that(true).is_false().unwrap();
        sink.clear();

        let err = soft.assert_all().unwrap_err();

        assert!(err.is_aggregate());
        let fails = report_texts(&sink, ReportSection::Fail);
        assert_eq!(fails.len(), 3);
        assert!(fails[0].starts_with("first - "));
        assert!(fails[1].starts_with("second - "));
        assert!(fails[2].starts_with("third - "));
        let errors: Vec<String> = sink
            .file_lines()
            .into_iter()
            .filter(|(level, text)| *level == FileLevel::Error && !text.contains("[caused_by]"))
            .map(|(_, text)| text)
            .collect();
        assert_eq!(errors, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_assert_all_on_empty_tracker_is_silent() {
        let (sink, log) = captured_dispatcher();
        let mut soft = SoftAssertions::new(&log);

        assert!(soft.assert_all().is_ok());
        assert!(sink.captured().is_empty());
    }

    #[test]
    fn test_tracker_is_reusable_after_drain() {
        let (_sink, log) = captured_dispatcher();
        let mut soft = SoftAssertions::new(&log);

        soft.soft_fail();
        assert!(soft.assert_all().is_err());
        assert!(soft.assert_all().is_ok());

        soft.soft_fail();
        soft.soft_fail();
        assert!(matches!(
            soft.assert_all(),
            Err(AssertionError::Aggregate { failures: 2 })
        ));
        assert!(soft.tracker().is_empty());
    }

    #[test]
    fn test_record_without_message_falls_back_to_cause_text() {
        let (sink, log) = captured_dispatcher();
        let mut soft = SoftAssertions::new(&log);

        soft.assert_that(1).is_greater_than(5).unwrap();
        soft.assert_all().unwrap_err();

        let fails = report_texts(&sink, ReportSection::Fail);
        assert!(fails[0].contains("but was: 1"));
    }

    #[test]
    fn test_hard_fail_bypasses_and_keeps_tracker() {
        let (sink, log) = captured_dispatcher();
        let mut soft = SoftAssertions::new(&log);

        soft.assert_that(1).is_equal_to(2).unwrap();
        let err = soft.assert_with_message("stop").hard_fail().unwrap_err();

        assert_eq!(err.message(), Some("stop"));
        assert!(!err.is_aggregate());
        assert_eq!(report_texts(&sink, ReportSection::Fail).len(), 1);
        assert_eq!(soft.tracker().len(), 1);
    }
}
