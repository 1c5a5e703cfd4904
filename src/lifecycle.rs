//! # Test-runner lifecycle adapter
//!
//! `SuiteListener` owns the suite's report and log dispatcher from suite start to suite
//! finish. A test runner (or a harness macro) calls it at each lifecycle moment; it keeps the
//! report's tests and nodes in step and logs one line per transition.
//!
//! ## Report layout
//!
//! | moment         | report test     | report node          |
//! |----------------|-----------------|----------------------|
//! | before suite   | `Suite Setup`   | `Setup`              |
//! | before class   | `<Class>`       | `Test Setup`         |
//! | before method  | `<Class>`       | `Before Method`      |
//! | test start     | `<Class>`       | test display name    |
//! | after method   | (unchanged)     | (unchanged)          |
//! | after class    | (unchanged)     | `Test Teardown`      |
//! | after suite    | `Suite Teardown`| `Teardown`           |
//!
//! A `Before Method` node is renamed to the test's display name when the test starts, so the
//! setup output and the test output share one node.

use std::error::Error;
use std::fmt::{self, Debug};
use std::sync::Arc;

use chrono::Utc;

use crate::config::Config;
use crate::error::{AssertionError, ConfigError, ReportError};
use crate::log::LogDispatcher;
use crate::report::{Report, ReportSummary};
use crate::sink::{ConsoleSink, FileSink};

const BEFORE_METHOD_NODE: &str = "Before Method";
const AFTER_METHOD_NODE: &str = "After Method";

/// Setup and teardown moments reported by the runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigurationPhase {
    BeforeSuite,
    BeforeClass,
    BeforeMethod,
    AfterMethod,
    AfterClass,
    AfterSuite,
}

// ============================================================================
// TEST INFO
// ============================================================================

/// What the runner knows about the test being started.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestInfo {
    pub class_name: String,
    pub method_name: String,
    pub description: Option<String>,
    /// Parameters already rendered with `Debug`.
    pub parameters: Vec<String>,
}

impl TestInfo {
    pub fn new(class_name: impl Into<String>, method_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            method_name: method_name.into(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_parameter<P: Debug + ?Sized>(mut self, parameter: &P) -> Self {
        self.parameters.push(format!("{:?}", parameter));
        self
    }

    /// Last path segment of the class name: `suite::login::LoginTests` -> `LoginTests`.
    pub fn short_class_name(&self) -> &str {
        short_name(&self.class_name)
    }

    /// Description (or method name) followed by the parameters, e.g. `testName[1,true,"x"]`.
    pub fn display_name(&self) -> String {
        let name = match self.description.as_deref() {
            Some(description) if !description.is_empty() => description,
            _ => self.method_name.as_str(),
        };
        if self.parameters.is_empty() {
            name.to_string()
        } else {
            format!("{}[{}]", name, self.parameters.join(","))
        }
    }
}

impl fmt::Display for TestInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name())
    }
}

fn short_name(class_name: &str) -> &str {
    let after_path = class_name.rsplit("::").next().unwrap_or(class_name);
    after_path.rsplit('.').next().unwrap_or(after_path)
}

// ============================================================================
// SUITE LISTENER
// ============================================================================

/// Lifecycle adapter for one suite run.
pub struct SuiteListener {
    report: Arc<Report>,
    log: LogDispatcher,
    current_node: String,
}

impl fmt::Debug for SuiteListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SuiteListener")
            .field("report", &self.report.file())
            .field("current_node", &self.current_node)
            .finish_non_exhaustive()
    }
}

impl SuiteListener {
    /// Creates the report for `suite_name` and a dispatcher wired to it.
    ///
    /// Fails with `ConfigError` when the report mode is neither `single` nor `multi`; no
    /// report file exists at that point.
    pub fn start(
        suite_name: &str,
        config: &Config,
        console: Arc<dyn ConsoleSink>,
        file: Arc<dyn FileSink>,
    ) -> Result<Self, ConfigError> {
        let log = LogDispatcher::new(console, file);
        Self::with_dispatcher(suite_name, config, log)
    }

    /// Stdout console and the configured log file.
    pub fn standard(suite_name: &str, config: &Config) -> Result<Self, ConfigError> {
        Self::with_dispatcher(suite_name, config, LogDispatcher::standard(config))
    }

    fn with_dispatcher(
        suite_name: &str,
        config: &Config,
        log: LogDispatcher,
    ) -> Result<Self, ConfigError> {
        let filename = config.report_filename(suite_name, Utc::now().timestamp_millis())?;
        let report = Arc::new(Report::create(&config.report_path, &filename));
        tracing::debug!(target: "vouch", suite = suite_name, file = %report.file().display(), "suite started");
        Ok(Self {
            log: log.with_report(report.clone()),
            report,
            current_node: String::new(),
        })
    }

    /// The dispatcher tests should log and assert through.
    pub fn log(&self) -> &LogDispatcher {
        &self.log
    }

    pub fn report(&self) -> &Arc<Report> {
        &self.report
    }

    pub fn current_node(&self) -> &str {
        &self.current_node
    }

    // ------------------------------------------------------------------------
    // Configuration methods
    // ------------------------------------------------------------------------

    pub fn before_configuration(&mut self, phase: ConfigurationPhase, class_name: &str) {
        let class_name = short_name(class_name);
        match phase {
            ConfigurationPhase::BeforeSuite => self.open("Suite Setup", "Setup"),
            ConfigurationPhase::BeforeClass => self.open(class_name, "Test Setup"),
            ConfigurationPhase::BeforeMethod => self.open(class_name, BEFORE_METHOD_NODE),
            ConfigurationPhase::AfterMethod => {}
            ConfigurationPhase::AfterClass => self.open_node("Test Teardown"),
            ConfigurationPhase::AfterSuite => self.open("Suite Teardown", "Teardown"),
        }
        let node = self.phase_node(phase);
        self.log
            .info(&format!("Configuration [{}] has started", node));
    }

    pub fn on_configuration_success(&mut self, phase: ConfigurationPhase) {
        let node = self.phase_node(phase);
        self.log
            .info(&format!("Configuration [{}] finished with success", node));
    }

    /// `error` is what the configuration method failed with, if the runner has it.
    pub fn on_configuration_failure(
        &mut self,
        phase: ConfigurationPhase,
        error: Option<&(dyn Error + 'static)>,
    ) {
        self.report_unexpected("Configuration failed unexpectedly", error);
        let node = self.phase_node(phase);
        self.log.info(&format!("Configuration [{}] failed", node));
    }

    pub fn on_configuration_skip(&mut self, phase: ConfigurationPhase) {
        let node = self.phase_node(phase);
        self.log.skip(&format!("Configuration [{}] was skipped", node));
    }

    // ------------------------------------------------------------------------
    // Test methods
    // ------------------------------------------------------------------------

    pub fn on_test_start(&mut self, test: &TestInfo) {
        self.report.create_test(test.short_class_name());
        self.current_node = test.display_name();
        let result = if self.report.is_current_node(BEFORE_METHOD_NODE) {
            self.report.rename_current_node(&self.current_node)
        } else {
            self.report.create_node(&self.current_node)
        };
        self.contain(result);
        self.log
            .info(&format!("Test [{}] has started", self.current_node));
    }

    pub fn on_test_success(&self) {
        self.log
            .info(&format!("Test [{}] finished with success", self.current_node));
    }

    /// Assertion failures were already logged when raised; anything else is logged here as
    /// an unexpected failure with its cause chain.
    pub fn on_test_failure(&self, error: Option<&(dyn Error + 'static)>) {
        self.report_unexpected("Test failed unexpectedly", error);
        self.log
            .info(&format!("Test [{}] failed", self.current_node));
    }

    pub fn on_test_skipped(&self) {
        self.log
            .skip(&format!("Test [{}] was skipped", self.current_node));
    }

    /// Flushes the report. A flush failure is logged, not returned.
    pub fn finish(&self) -> ReportSummary {
        self.contain(self.report.flush());
        self.report.summary()
    }

    // ------------------------------------------------------------------------
    // Private helpers
    // ------------------------------------------------------------------------

    fn open(&mut self, test: &str, node: &str) {
        self.report.create_test(test);
        self.open_node(node);
    }

    fn open_node(&mut self, node: &str) {
        self.current_node = node.to_string();
        let result = self.report.create_node(node);
        self.contain(result);
    }

    fn phase_node(&self, phase: ConfigurationPhase) -> String {
        match phase {
            ConfigurationPhase::AfterMethod => AFTER_METHOD_NODE.to_string(),
            _ => self.current_node.clone(),
        }
    }

    fn report_unexpected(&self, text: &str, error: Option<&(dyn Error + 'static)>) {
        if let Some(error) = error.filter(|e| !e.is::<AssertionError>()) {
            self.log.fail_with_cause(text, error);
        }
    }

    fn contain(&self, result: Result<(), ReportError>) {
        if let Err(e) = result {
            tracing::warn!(target: "vouch", error = %e, "report update failed");
            self.log.warn_with_cause("report update failed", &e);
        }
    }
}

#[cfg(test)]
mod lifecycle_tests {
    use super::*;

    #[test]
    fn test_short_name_handles_rust_and_java_paths() {
        assert_eq!(short_name("suite::login::LoginTests"), "LoginTests");
        assert_eq!(short_name("com.example.LoginTests"), "LoginTests");
        assert_eq!(short_name("LoginTests"), "LoginTests");
    }

    #[test]
    fn test_display_name_with_parameters() {
        let info = TestInfo::new("Suite", "testName")
            .with_parameter(&1)
            .with_parameter(&true)
            .with_parameter("x");
        assert_eq!(info.display_name(), "testName[1,true,\"x\"]");
    }

    #[test]
    fn test_display_name_prefers_description() {
        let info = TestInfo::new("Suite", "test_login").with_description("Login works");
        assert_eq!(info.display_name(), "Login works");
        let blank = TestInfo::new("Suite", "test_login").with_description("");
        assert_eq!(blank.display_name(), "test_login");
    }
}
