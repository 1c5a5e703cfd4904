//! # Hard and soft assertion facades
//!
//! Both facades expose the same comparison surface through [`Subject`]; they differ only in
//! what they hand to failure processing:
//!
//! - **`Assertions`** (hard): no tracker, so a failure is logged and returned as
//!   `Err(AssertionError::Immediate)` at once.
//! - **`SoftAssertions`** (soft): its own `ErrorTracker`, so failures are recorded and every
//!   comparison returns `Ok(())` until `assert_all` drains the tracker.
//!
//! ```ignore
//! let mut soft = SoftAssertions::new(&log);
//! soft.assert_that(2).is_equal_to(3)?;            // recorded, not raised
//! soft.assert_with_message("name").assert_that("a").is_equal_to("a")?;
//! soft.assert_all()?;                              // one fail event, then Aggregate
//! ```

use std::fmt::Display;

use crate::compare::ComparisonFailure;
use crate::error::AssertionError;
use crate::log::LogDispatcher;
use crate::processing;
use crate::subject::Subject;
use crate::tracker::ErrorTracker;

// ============================================================================
// HARD ASSERTIONS
// ============================================================================

/// Assertions that raise on the first failure.
#[derive(Debug)]
pub struct Assertions<'l> {
    log: &'l LogDispatcher,
    message: Option<String>,
}

impl<'l> Assertions<'l> {
    pub fn new(log: &'l LogDispatcher) -> Self {
        Self { log, message: None }
    }

    /// Sets the context message for the next comparison only.
    ///
    /// Accepts plain text as well as `format_args!(...)`.
    pub fn assert_with_message(&mut self, message: impl Display) -> &mut Self {
        self.message = Some(message.to_string());
        self
    }

    pub fn assert_that<T>(&mut self, actual: T) -> Subject<'_, T> {
        Subject::new(actual, self.message.take(), None, self.log)
    }

    /// Unconditional failure.
    pub fn fail(&mut self) -> Result<(), AssertionError> {
        let message = self.message.take();
        processing::process(
            self.log,
            message.as_deref(),
            None,
            ComparisonFailure::explicit(),
        )
    }
}

// ============================================================================
// SOFT ASSERTIONS
// ============================================================================

/// Assertions that record failures and raise them together from `assert_all`.
///
/// One instance per test: the tracker is not meant to be shared between concurrent tests.
#[derive(Debug)]
pub struct SoftAssertions<'l> {
    log: &'l LogDispatcher,
    tracker: ErrorTracker,
    message: Option<String>,
}

impl<'l> SoftAssertions<'l> {
    pub fn new(log: &'l LogDispatcher) -> Self {
        Self {
            log,
            tracker: ErrorTracker::new(),
            message: None,
        }
    }

    /// Sets the context message for the next comparison only.
    pub fn assert_with_message(&mut self, message: impl Display) -> &mut Self {
        self.message = Some(message.to_string());
        self
    }

    /// Comparisons on the returned subject always return `Ok(())`; failures go to the tracker.
    pub fn assert_that<T>(&mut self, actual: T) -> Subject<'_, T> {
        Subject::new(
            actual,
            self.message.take(),
            Some(&mut self.tracker),
            self.log,
        )
    }

    /// Records an unconditional failure without raising.
    pub fn soft_fail(&mut self) {
        let message = self.message.take();
        let result = processing::process(
            self.log,
            message.as_deref(),
            Some(&mut self.tracker),
            ComparisonFailure::explicit(),
        );
        debug_assert!(result.is_ok());
    }

    /// Logs and raises immediately, bypassing the tracker. Recorded failures stay recorded.
    pub fn hard_fail(&mut self) -> Result<(), AssertionError> {
        let message = self.message.take();
        processing::process(
            self.log,
            message.as_deref(),
            None,
            ComparisonFailure::explicit(),
        )
    }

    /// Drains the tracker.
    ///
    /// With recorded failures: one fail event per record in recording order, the tracker is
    /// cleared, and `AssertionError::Aggregate` is returned. With none: `Ok(())` and no event.
    pub fn assert_all(&mut self) -> Result<(), AssertionError> {
        if !self.tracker.contains_errors() {
            return Ok(());
        }

        let failures = self.tracker.len();
        for record in self.tracker.records() {
            let text = record.description().unwrap_or("");
            match record.cause() {
                Some(cause) => self.log.fail_with_cause(text, cause),
                None => self.log.fail(text),
            }
        }
        self.tracker.clear();

        Err(AssertionError::Aggregate { failures })
    }

    pub fn tracker(&self) -> &ErrorTracker {
        &self.tracker
    }
}
