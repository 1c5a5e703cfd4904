//! # Vouch
//!
//! Hard and soft fluent assertions for test suites, with every outcome mirrored to the
//! console, a log file and an HTML report.
//!
//! ```ignore
//! use vouch::prelude::*;
//!
//! let listener = SuiteListener::standard("Smoke", &Config::from_env())?;
//! let mut soft = SoftAssertions::new(listener.log());
//! soft.assert_that(vec![1, 2, 3]).contains(2)?;
//! soft.assert_with_message("greeting").assert_that("hello").starts_with("he")?;
//! soft.assert_all()?;
//! listener.finish();
//! ```

pub use crate::error::{AssertionError, ConfigError, ReportError, SinkError};

pub mod assertions;
pub mod compare;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod log;
pub mod processing;
pub mod report;
pub mod sink;
pub mod subject;
pub mod tracker;

/// Everything a test file needs.
pub mod prelude {
    pub use crate::assertions::{Assertions, SoftAssertions};
    pub use crate::compare::ComparisonFailure;
    pub use crate::config::{Config, ReportMode};
    pub use crate::error::AssertionError;
    pub use crate::lifecycle::{ConfigurationPhase, SuiteListener, TestInfo};
    pub use crate::log::{LogDispatcher, LogLevel};
    pub use crate::subject::{IterableAssertions, MapAssertions, Subject, TextAssertions};
}
