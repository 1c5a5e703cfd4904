//! Vouch error handling.
//!
//! Three families of error live here:
//!
//! - **Assertion errors** (`AssertionError`): the only errors an assertion caller ever sees.
//!   Hard comparisons, `fail` and `hard_fail` produce `Immediate`; draining a soft tracker
//!   produces `Aggregate`.
//! - **Configuration errors** (`ConfigError`): startup faults, surfaced synchronously.
//! - **Sink and report errors** (`SinkError`, `ReportError`): contained by the log dispatcher
//!   and the lifecycle adapter, never returned to assertion code.

use std::io;

use miette::Diagnostic;
use thiserror::Error;

use crate::compare::ComparisonFailure;

// ============================================================================
// ASSERTION ERRORS
// ============================================================================

/// Failure surfaced to the caller of an assertion.
#[derive(Debug, Error, Diagnostic)]
pub enum AssertionError {
    /// Raised by hard comparisons, `fail()` and `hard_fail()`. Wraps the comparison failure.
    #[error("{}", immediate_text(.message))]
    #[diagnostic(code(vouch::assertion::immediate))]
    Immediate {
        message: Option<String>,
        #[source]
        cause: Option<ComparisonFailure>,
    },

    /// Raised by `assert_all()` when the tracker held failures. Details were already logged
    /// while the tracker was drained.
    #[error("{failures} soft assertion(s) failed")]
    #[diagnostic(
        code(vouch::assertion::aggregate),
        help("each recorded failure was logged as a fail event before this error was raised")
    )]
    Aggregate { failures: usize },
}

impl AssertionError {
    /// The comparison failure wrapped by an immediate failure.
    pub fn cause(&self) -> Option<&ComparisonFailure> {
        match self {
            AssertionError::Immediate { cause, .. } => cause.as_ref(),
            AssertionError::Aggregate { .. } => None,
        }
    }

    /// The context message attached with `assert_with_message`, if any.
    pub fn message(&self) -> Option<&str> {
        match self {
            AssertionError::Immediate { message, .. } => message.as_deref(),
            AssertionError::Aggregate { .. } => None,
        }
    }

    pub fn is_aggregate(&self) -> bool {
        matches!(self, AssertionError::Aggregate { .. })
    }
}

fn immediate_text(message: &Option<String>) -> &str {
    match message.as_deref() {
        Some(text) if !text.is_empty() => text,
        _ => "assertion failed",
    }
}

// ============================================================================
// CONFIGURATION ERRORS
// ============================================================================

/// Fatal configuration fault, raised at report filename generation.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("report.type parameter is not set correctly ({value:?}), use single or multi")]
    #[diagnostic(
        code(vouch::config::report_mode),
        help("set REPORT_TYPE to `single` or `multi`")
    )]
    UnknownReportMode { value: String },
}

// ============================================================================
// SINK AND REPORT ERRORS
// ============================================================================

/// Error raised by a single sink write. Contained by the dispatcher.
#[derive(Debug, Error, Diagnostic)]
pub enum SinkError {
    #[error("sink I/O failed: {0}")]
    #[diagnostic(code(vouch::sink::io))]
    Io(#[from] io::Error),

    #[error("sink unavailable: {0}")]
    #[diagnostic(code(vouch::sink::unavailable))]
    Unavailable(String),
}

/// Misuse of the HTML report or failure to persist it.
#[derive(Debug, Error, Diagnostic)]
pub enum ReportError {
    #[error("create a test before trying to create or rename a node")]
    #[diagnostic(code(vouch::report::no_active_test))]
    NoActiveTest,

    #[error("the current test has no node to rename")]
    #[diagnostic(code(vouch::report::no_active_node))]
    NoActiveNode,

    #[error("failed to write report {}: {source}", .path.display())]
    #[diagnostic(code(vouch::report::io))]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to serialize report model: {0}")]
    #[diagnostic(code(vouch::report::serialize))]
    Serialize(#[from] serde_json::Error),
}

#[cfg(test)]
mod error_tests {
    use miette::Diagnostic;

    use super::*;

    #[test]
    fn test_immediate_display_falls_back_without_message() {
        let bare = AssertionError::Immediate {
            message: None,
            cause: Some(ComparisonFailure::explicit()),
        };
        assert_eq!(bare.to_string(), "assertion failed");
        assert!(std::error::Error::source(&bare).is_some());

        let blank = AssertionError::Immediate {
            message: Some(String::new()),
            cause: None,
        };
        assert_eq!(blank.to_string(), "assertion failed");
    }

    #[test]
    fn test_diagnostic_codes() {
        let aggregate = AssertionError::Aggregate { failures: 2 };
        assert_eq!(aggregate.to_string(), "2 soft assertion(s) failed");
        assert_eq!(
            aggregate.code().map(|c| c.to_string()).as_deref(),
            Some("vouch::assertion::aggregate")
        );

        let config = ConfigError::UnknownReportMode {
            value: "weird".into(),
        };
        assert_eq!(
            config.code().map(|c| c.to_string()).as_deref(),
            Some("vouch::config::report_mode")
        );
        assert!(config.to_string().contains("\"weird\""));
    }
}
