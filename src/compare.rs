//! Comparison boundary.
//!
//! Value predicates come from the `predicates` crate; this module only turns their verdict
//! into a `ComparisonFailure` that the assertion pipeline can record or raise. Nothing here
//! logs or raises by itself.

use std::error::Error;
use std::fmt;
use std::sync::Arc;

use difference::{Changeset, Difference};
use predicates::Predicate;

type SourceError = Arc<dyn Error + Send + Sync + 'static>;

// ============================================================================
// COMPARISON FAILURE
// ============================================================================

/// Typed failure produced by a comparison, carrying a human-readable description.
#[derive(Debug, Clone)]
pub struct ComparisonFailure {
    expected: String,
    actual: Option<String>,
    diff: Option<String>,
    source: Option<SourceError>,
}

impl ComparisonFailure {
    pub fn new(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self {
            expected: expected.into(),
            actual: Some(actual.into()),
            diff: None,
            source: None,
        }
    }

    /// Failure raised on purpose by `fail`, `soft_fail` or `hard_fail`.
    pub fn explicit() -> Self {
        Self {
            expected: "explicit failure".to_string(),
            actual: None,
            diff: None,
            source: None,
        }
    }

    /// Attaches the error that prevented the comparison from running (e.g. a bad pattern).
    pub fn with_source(mut self, source: impl Error + Send + Sync + 'static) -> Self {
        self.source = Some(Arc::new(source));
        self
    }

    /// Attaches a line diff of the pretty-printed values when either spans several lines.
    pub fn with_diff_of<E: fmt::Debug + ?Sized, A: fmt::Debug + ?Sized>(
        mut self,
        expected: &E,
        actual: &A,
    ) -> Self {
        let expected = format!("{:#?}", expected);
        let actual = format!("{:#?}", actual);
        if expected.contains('\n') || actual.contains('\n') {
            self.diff = Some(render_diff(&expected, &actual));
        }
        self
    }

    pub fn expected(&self) -> &str {
        &self.expected
    }

    pub fn actual(&self) -> Option<&str> {
        self.actual.as_deref()
    }

    pub fn diff(&self) -> Option<&str> {
        self.diff.as_deref()
    }
}

impl fmt::Display for ComparisonFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.actual {
            Some(actual) => write!(f, "expected: {}\nbut was: {}", self.expected, actual)?,
            None => write!(f, "{}", self.expected)?,
        }
        if let Some(diff) = &self.diff {
            write!(f, "\ndiff (-expected +actual):\n{}", diff)?;
        }
        Ok(())
    }
}

impl Error for ComparisonFailure {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source
            .as_ref()
            .map(|source| source.as_ref() as &(dyn Error + 'static))
    }
}

// ============================================================================
// COMPARISON ENTRY POINT
// ============================================================================

/// Evaluates `predicate` against `actual`.
///
/// On failure the predicate's own description becomes the expectation and the actual value
/// is rendered with `Debug`.
pub fn compare<T, P>(actual: &T, predicate: &P) -> Result<(), ComparisonFailure>
where
    T: fmt::Debug + ?Sized,
    P: Predicate<T> + ?Sized,
{
    if predicate.eval(actual) {
        return Ok(());
    }
    Err(ComparisonFailure::new(
        predicate.to_string(),
        format!("{:?}", actual),
    ))
}

/// Evaluates a check that has no predicate counterpart.
pub fn verify<T: fmt::Debug + ?Sized>(
    actual: &T,
    passed: bool,
    expectation: impl fmt::Display,
) -> Result<(), ComparisonFailure> {
    if passed {
        return Ok(());
    }
    Err(ComparisonFailure::new(
        expectation.to_string(),
        format!("{:?}", actual),
    ))
}

// ============================================================================
// PRIVATE HELPERS
// ============================================================================

fn render_diff(expected: &str, actual: &str) -> String {
    let changeset = Changeset::new(expected, actual, "\n");
    let mut lines = Vec::new();
    for diff in &changeset.diffs {
        let (marker, chunk) = match diff {
            Difference::Same(chunk) => (' ', chunk),
            Difference::Rem(chunk) => ('-', chunk),
            Difference::Add(chunk) => ('+', chunk),
        };
        for line in chunk.lines() {
            lines.push(format!("{}{}", marker, line));
        }
    }
    lines.join("\n")
}
