//! Ordered accumulator of soft-assertion failures.
//!
//! One tracker belongs to exactly one soft-assertion session. Records keep the order in which
//! the assertions were called and are only drained by `SoftAssertions::assert_all`.

use std::fmt;

use crate::compare::ComparisonFailure;

/// One recorded soft failure.
#[derive(Debug, Clone)]
pub struct FailureRecord {
    description: Option<String>,
    cause: Option<ComparisonFailure>,
}

impl FailureRecord {
    pub fn new(description: Option<String>, cause: Option<ComparisonFailure>) -> Self {
        Self { description, cause }
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn cause(&self) -> Option<&ComparisonFailure> {
        self.cause.as_ref()
    }
}

impl fmt::Display for FailureRecord {
    /// `[description] …` then `[error_message] …`, omitting absent or empty parts.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let description = self
            .description
            .as_deref()
            .filter(|text| !text.is_empty())
            .map(|text| format!("[description] {}", text));
        let error_message = self
            .cause
            .as_ref()
            .map(ToString::to_string)
            .filter(|text| !text.is_empty())
            .map(|text| format!("[error_message] {}", text));

        match (description, error_message) {
            (Some(description), Some(error_message)) => {
                write!(f, "{}\n{}", description, error_message)
            }
            (Some(part), None) | (None, Some(part)) => f.write_str(&part),
            (None, None) => Ok(()),
        }
    }
}

/// Session-scoped, ordered list of failures.
#[derive(Debug, Default)]
pub struct ErrorTracker {
    records: Vec<FailureRecord>,
}

impl ErrorTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a failure with both a description and its cause.
    pub fn add_error(&mut self, description: impl Into<String>, cause: ComparisonFailure) {
        self.records
            .push(FailureRecord::new(Some(description.into()), Some(cause)));
    }

    /// Appends a failure known only by its description.
    pub fn add_description(&mut self, description: impl Into<String>) {
        self.records
            .push(FailureRecord::new(Some(description.into()), None));
    }

    /// Appends a failure known only by its cause.
    pub fn add_cause(&mut self, cause: ComparisonFailure) {
        self.records.push(FailureRecord::new(None, Some(cause)));
    }

    pub fn contains_errors(&self) -> bool {
        !self.records.is_empty()
    }

    /// Every record rendered and joined with `\n`, in insertion order.
    pub fn errors_as_string(&self) -> String {
        self.records
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn records(&self) -> &[FailureRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}
