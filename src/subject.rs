//! # Generic assertion subject
//!
//! `Subject<'a, T>` wraps one actual value for exactly one comparison. The comparison surface
//! is selected by the capabilities of `T` at the call site:
//!
//! - **Equality** (`PartialEq`): `is_equal_to`, `is_in`, `is_any_of`, ...
//! - **Ordering** (`PartialOrd`): `is_greater_than`, `is_in_range`, ...
//! - **Absence** (`Option<U>`): `is_none`, `is_some`
//! - **Numbers**: float checks for `f32`/`f64`, scale-aware checks for `Decimal`
//! - **Text, sequences and maps**: the [`TextAssertions`], [`IterableAssertions`] and
//!   [`MapAssertions`] capability traits
//!
//! Every comparison consumes the subject, so a context message set with
//! `assert_with_message` applies to that one comparison only. Failures are routed through
//! [`processing::process`](crate::processing::process); whether they are raised or recorded
//! depends on whether the subject carries a tracker.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::fmt::{self, Debug, Display};
use std::hash::{BuildHasher, Hash};
use std::ops::{Bound, RangeBounds};

use predicates::prelude::*;
use regex::Regex;
use rust_decimal::Decimal;

use crate::compare::{compare, verify, ComparisonFailure};
use crate::error::AssertionError;
use crate::log::LogDispatcher;
use crate::processing;
use crate::tracker::ErrorTracker;

type Outcome = Result<(), AssertionError>;

// ============================================================================
// SUBJECT
// ============================================================================

/// One actual value awaiting a single comparison.
pub struct Subject<'a, T> {
    actual: T,
    message: Option<String>,
    tracker: Option<&'a mut ErrorTracker>,
    log: &'a LogDispatcher,
}

impl<'a, T: Debug> Debug for Subject<'a, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subject")
            .field("actual", &self.actual)
            .field("message", &self.message)
            .field("soft", &self.tracker.is_some())
            .finish()
    }
}

impl<'a, T> Subject<'a, T> {
    pub(crate) fn new(
        actual: T,
        message: Option<String>,
        tracker: Option<&'a mut ErrorTracker>,
        log: &'a LogDispatcher,
    ) -> Self {
        Self {
            actual,
            message,
            tracker,
            log,
        }
    }

    pub fn actual(&self) -> &T {
        &self.actual
    }

    /// Emits the pass event or hands the failure to failure processing.
    fn conclude(
        self,
        expectation: &dyn Display,
        outcome: Result<(), ComparisonFailure>,
    ) -> Outcome {
        let Subject {
            message,
            tracker,
            log,
            ..
        } = self;
        match outcome {
            Ok(()) => {
                let text = match message {
                    Some(text) if !text.is_empty() => text,
                    _ => format!("verified: {}", expectation),
                };
                log.pass(&text);
                Ok(())
            }
            Err(cause) => processing::process(log, message.as_deref(), tracker, cause),
        }
    }

    fn check_that(self, passed: bool, expectation: String) -> Outcome
    where
        T: Debug,
    {
        let outcome = verify(&self.actual, passed, &expectation);
        self.conclude(&expectation, outcome)
    }

    fn fail_with(self, failure: ComparisonFailure) -> Outcome {
        let expectation = failure.expected().to_string();
        self.conclude(&expectation, Err(failure))
    }
}

// ----------------------------------------------------------------------------
// Any value
// ----------------------------------------------------------------------------

impl<'a, T: Debug> Subject<'a, T> {
    /// Evaluates an arbitrary `predicates` predicate against the actual value.
    pub fn satisfies<P: Predicate<T>>(self, predicate: P) -> Outcome {
        let outcome = compare(&self.actual, &predicate);
        self.conclude(&predicate, outcome)
    }
}

// ----------------------------------------------------------------------------
// Equality
// ----------------------------------------------------------------------------

impl<'a, T: PartialEq + Debug> Subject<'a, T> {
    pub fn is_equal_to(self, expected: T) -> Outcome {
        let predicate = predicate::eq(&expected);
        let outcome = compare(&self.actual, &predicate)
            .map_err(|failure| failure.with_diff_of(&expected, &self.actual));
        self.conclude(&predicate, outcome)
    }

    pub fn is_not_equal_to(self, unexpected: T) -> Outcome {
        let predicate = predicate::ne(unexpected);
        let outcome = compare(&self.actual, &predicate);
        self.conclude(&predicate, outcome)
    }

    /// Passes when the actual value equals one of the items yielded by `values`.
    pub fn is_in<I: IntoIterator<Item = T>>(self, values: I) -> Outcome {
        let values: Vec<T> = values.into_iter().collect();
        let passed = values.contains(&self.actual);
        self.check_that(passed, format!("a value in {:?}", values))
    }

    pub fn is_not_in<I: IntoIterator<Item = T>>(self, values: I) -> Outcome {
        let values: Vec<T> = values.into_iter().collect();
        let passed = !values.contains(&self.actual);
        self.check_that(passed, format!("a value not in {:?}", values))
    }

    pub fn is_any_of(self, values: &[T]) -> Outcome {
        let passed = values.contains(&self.actual);
        self.check_that(passed, format!("any of {:?}", values))
    }

    pub fn is_none_of(self, values: &[T]) -> Outcome {
        let passed = !values.contains(&self.actual);
        self.check_that(passed, format!("none of {:?}", values))
    }
}

// ----------------------------------------------------------------------------
// Ordering
// ----------------------------------------------------------------------------

impl<'a, T: PartialOrd + Debug> Subject<'a, T> {
    pub fn is_greater_than(self, bound: T) -> Outcome {
        self.satisfies(predicate::gt(bound))
    }

    pub fn is_less_than(self, bound: T) -> Outcome {
        self.satisfies(predicate::lt(bound))
    }

    pub fn is_at_least(self, bound: T) -> Outcome {
        self.satisfies(predicate::ge(bound))
    }

    pub fn is_at_most(self, bound: T) -> Outcome {
        self.satisfies(predicate::le(bound))
    }

    /// Range membership, e.g. `is_in_range(1..=5)` or `is_in_range(..10)`.
    pub fn is_in_range<R: RangeBounds<T>>(self, range: R) -> Outcome {
        let passed = range.contains(&self.actual);
        self.check_that(passed, format!("a value in {}", describe_range(&range)))
    }

    pub fn is_not_in_range<R: RangeBounds<T>>(self, range: R) -> Outcome {
        let passed = !range.contains(&self.actual);
        self.check_that(passed, format!("a value outside {}", describe_range(&range)))
    }

    /// Equal by ordering rather than by `==` (e.g. decimals of different scale).
    pub fn is_equivalent_according_to_compare_to(self, other: T) -> Outcome {
        let passed = self.actual.partial_cmp(&other) == Some(Ordering::Equal);
        self.check_that(passed, format!("a value comparing equal to {:?}", other))
    }
}

/// Renders a range as `[1..5)`, `(-∞..10]`, and so on.
fn describe_range<T: Debug, R: RangeBounds<T>>(range: &R) -> String {
    let start = match range.start_bound() {
        Bound::Included(value) => format!("[{:?}", value),
        Bound::Excluded(value) => format!("({:?}", value),
        Bound::Unbounded => "(-∞".to_string(),
    };
    let end = match range.end_bound() {
        Bound::Included(value) => format!("{:?}]", value),
        Bound::Excluded(value) => format!("{:?})", value),
        Bound::Unbounded => "+∞)".to_string(),
    };
    format!("{}..{}", start, end)
}

// ----------------------------------------------------------------------------
// Absence
// ----------------------------------------------------------------------------

impl<'a, U: Debug> Subject<'a, Option<U>> {
    pub fn is_none(self) -> Outcome {
        let passed = self.actual.is_none();
        self.check_that(passed, "None".to_string())
    }

    pub fn is_some(self) -> Outcome {
        let passed = self.actual.is_some();
        self.check_that(passed, "Some(_)".to_string())
    }
}

impl<'a> Subject<'a, bool> {
    pub fn is_true(self) -> Outcome {
        let passed = self.actual;
        self.check_that(passed, "true".to_string())
    }

    pub fn is_false(self) -> Outcome {
        let passed = !self.actual;
        self.check_that(passed, "false".to_string())
    }
}

// ----------------------------------------------------------------------------
// Floats
// ----------------------------------------------------------------------------

mod sealed {
    pub trait Sealed {}
    impl Sealed for f32 {}
    impl Sealed for f64 {}
}

/// Floating point types with float-specific checks. Sealed.
pub trait Float: sealed::Sealed + Copy + Debug + Into<f64> {}

impl Float for f32 {}
impl Float for f64 {}

impl<'a, F: Float> Subject<'a, F> {
    fn value(&self) -> f64 {
        self.actual.into()
    }

    pub fn is_nan(self) -> Outcome {
        let passed = self.value().is_nan();
        self.check_that(passed, "NaN".to_string())
    }

    pub fn is_not_nan(self) -> Outcome {
        let passed = !self.value().is_nan();
        self.check_that(passed, "a value other than NaN".to_string())
    }

    pub fn is_finite(self) -> Outcome {
        let passed = self.value().is_finite();
        self.check_that(passed, "a finite value".to_string())
    }

    /// Either signed zero.
    pub fn is_zero(self) -> Outcome {
        let passed = self.value() == 0.0;
        self.check_that(passed, "zero".to_string())
    }

    pub fn is_non_zero(self) -> Outcome {
        let value = self.value();
        let passed = value != 0.0 && !value.is_nan();
        self.check_that(passed, "a non-zero value".to_string())
    }

    pub fn is_positive_infinity(self) -> Outcome {
        let passed = self.value() == f64::INFINITY;
        self.check_that(passed, "+∞".to_string())
    }

    pub fn is_negative_infinity(self) -> Outcome {
        let passed = self.value() == f64::NEG_INFINITY;
        self.check_that(passed, "-∞".to_string())
    }

    /// `|actual - expected| <= tolerance`. NaN never passes.
    pub fn is_close_to(self, expected: F, tolerance: F) -> Outcome {
        let (expected, tolerance) = (expected.into(), tolerance.into());
        let passed = (self.value() - expected).abs() <= tolerance;
        self.check_that(
            passed,
            format!("a value within {:?} of {:?}", tolerance, expected),
        )
    }
}

// ----------------------------------------------------------------------------
// Decimals
// ----------------------------------------------------------------------------

impl<'a> Subject<'a, Decimal> {
    /// `1.0` and `1.000` are equal here.
    pub fn is_equal_to_ignoring_scale(self, expected: impl Into<Decimal>) -> Outcome {
        let expected = expected.into();
        let passed = self.actual.normalize() == expected.normalize();
        self.check_that(passed, format!("{} (scale ignored)", expected))
    }

    /// Same value and same scale: `1.0` and `1.00` differ.
    pub fn is_equal_to_with_scale(self, expected: impl Into<Decimal>) -> Outcome {
        let expected = expected.into();
        let passed = self.actual == expected && self.actual.scale() == expected.scale();
        self.check_that(
            passed,
            format!("{} with scale {}", expected, expected.scale()),
        )
    }
}

// ============================================================================
// TEXT
// ============================================================================

/// Comparisons over anything that reads as a string.
pub trait TextAssertions {
    /// Length in characters, not bytes.
    fn has_length(self, expected: usize) -> Outcome;
    fn is_empty(self) -> Outcome;
    fn is_not_empty(self) -> Outcome;
    fn contains(self, fragment: &str) -> Outcome;
    fn does_not_contain(self, fragment: &str) -> Outcome;
    fn starts_with(self, prefix: &str) -> Outcome;
    fn ends_with(self, suffix: &str) -> Outcome;
    /// The whole string matches `pattern`.
    fn matches(self, pattern: &str) -> Outcome;
    fn does_not_match(self, pattern: &str) -> Outcome;
    /// Some substring matches `pattern`.
    fn contains_match(self, pattern: &str) -> Outcome;
    fn does_not_contain_match(self, pattern: &str) -> Outcome;
    fn is_equal_to_ignoring_case(self, expected: &str) -> Outcome;
    fn contains_ignoring_case(self, fragment: &str) -> Outcome;
}

impl<'a, S: AsRef<str> + Debug> Subject<'a, S> {
    fn check_text<P: Predicate<str>>(self, predicate: P) -> Outcome {
        let outcome = compare(self.actual.as_ref(), &predicate);
        self.conclude(&predicate, outcome)
    }

    fn check_pattern(self, pattern: &str, anchored: bool, expect_match: bool) -> Outcome {
        let source = if anchored {
            format!("^(?:{})$", pattern)
        } else {
            pattern.to_string()
        };
        let regex = match Regex::new(&source) {
            Ok(regex) => regex,
            Err(e) => {
                let failure = ComparisonFailure::new(
                    format!("a valid pattern /{}/", pattern),
                    format!("{:?}", self.actual),
                )
                .with_source(e);
                return self.fail_with(failure);
            }
        };
        let found = regex.is_match(self.actual.as_ref());
        let verb = match (anchored, expect_match) {
            (true, true) => "a string matching",
            (true, false) => "a string not matching",
            (false, true) => "a string containing a match for",
            (false, false) => "a string containing no match for",
        };
        self.check_that(found == expect_match, format!("{} /{}/", verb, pattern))
    }
}

impl<'a, S: AsRef<str> + Debug> TextAssertions for Subject<'a, S> {
    fn has_length(self, expected: usize) -> Outcome {
        let length = self.actual.as_ref().chars().count();
        self.check_that(
            length == expected,
            format!("a string of length {} (was {})", expected, length),
        )
    }

    fn is_empty(self) -> Outcome {
        self.check_text(predicates::str::is_empty())
    }

    fn is_not_empty(self) -> Outcome {
        self.check_text(predicates::str::is_empty().not())
    }

    fn contains(self, fragment: &str) -> Outcome {
        self.check_text(predicates::str::contains(fragment))
    }

    fn does_not_contain(self, fragment: &str) -> Outcome {
        self.check_text(predicates::str::contains(fragment).not())
    }

    fn starts_with(self, prefix: &str) -> Outcome {
        self.check_text(predicates::str::starts_with(prefix))
    }

    fn ends_with(self, suffix: &str) -> Outcome {
        self.check_text(predicates::str::ends_with(suffix))
    }

    fn matches(self, pattern: &str) -> Outcome {
        self.check_pattern(pattern, true, true)
    }

    fn does_not_match(self, pattern: &str) -> Outcome {
        self.check_pattern(pattern, true, false)
    }

    fn contains_match(self, pattern: &str) -> Outcome {
        self.check_pattern(pattern, false, true)
    }

    fn does_not_contain_match(self, pattern: &str) -> Outcome {
        self.check_pattern(pattern, false, false)
    }

    fn is_equal_to_ignoring_case(self, expected: &str) -> Outcome {
        let passed = self.actual.as_ref().to_lowercase() == expected.to_lowercase();
        self.check_that(passed, format!("{:?} (ignoring case)", expected))
    }

    fn contains_ignoring_case(self, fragment: &str) -> Outcome {
        let passed = self
            .actual
            .as_ref()
            .to_lowercase()
            .contains(&fragment.to_lowercase());
        self.check_that(
            passed,
            format!("a string containing {:?} (ignoring case)", fragment),
        )
    }
}

// ============================================================================
// SEQUENCES
// ============================================================================

/// A finite collection whose elements can be listed in iteration order.
pub trait Sequence {
    type Item: PartialEq + Debug;

    fn elements(&self) -> Vec<&Self::Item>;
}

impl<T: PartialEq + Debug> Sequence for Vec<T> {
    type Item = T;

    fn elements(&self) -> Vec<&T> {
        self.iter().collect()
    }
}

impl<T: PartialEq + Debug> Sequence for VecDeque<T> {
    type Item = T;

    fn elements(&self) -> Vec<&T> {
        self.iter().collect()
    }
}

impl<T: PartialEq + Debug> Sequence for [T] {
    type Item = T;

    fn elements(&self) -> Vec<&T> {
        self.iter().collect()
    }
}

impl<T: PartialEq + Debug, const N: usize> Sequence for [T; N] {
    type Item = T;

    fn elements(&self) -> Vec<&T> {
        self.iter().collect()
    }
}

impl<T: Eq + Hash + Debug, H: BuildHasher> Sequence for HashSet<T, H> {
    type Item = T;

    fn elements(&self) -> Vec<&T> {
        self.iter().collect()
    }
}

impl<T: Ord + Debug> Sequence for BTreeSet<T> {
    type Item = T;

    fn elements(&self) -> Vec<&T> {
        self.iter().collect()
    }
}

impl<S: Sequence + ?Sized> Sequence for &S {
    type Item = S::Item;

    fn elements(&self) -> Vec<&S::Item> {
        (**self).elements()
    }
}

/// Comparisons over sequences (`Vec`, `VecDeque`, slices, arrays, sets).
pub trait IterableAssertions {
    type Item;

    fn contains(self, element: Self::Item) -> Outcome;
    fn does_not_contain(self, element: Self::Item) -> Outcome;
    fn has_size(self, expected: usize) -> Outcome;
    fn is_empty(self) -> Outcome;
    fn is_not_empty(self) -> Outcome;
    fn contains_any_of(self, candidates: &[Self::Item]) -> Outcome;
    fn contains_none_of(self, excluded: &[Self::Item]) -> Outcome;
    /// Every expected element is present, counting duplicates.
    fn contains_at_least(self, expected: &[Self::Item]) -> Outcome;
    /// Same elements with the same multiplicities, in any order.
    fn contains_exactly(self, expected: &[Self::Item]) -> Outcome;
    fn contains_exactly_in_order(self, expected: &[Self::Item]) -> Outcome;
    fn contains_no_duplicates(self) -> Outcome;
    fn is_in_order(self) -> Outcome
    where
        Self::Item: PartialOrd;
    fn is_in_strict_order(self) -> Outcome
    where
        Self::Item: PartialOrd;
    fn is_in_order_by<F>(self, compare: F) -> Outcome
    where
        F: Fn(&Self::Item, &Self::Item) -> Ordering;
}

/// Elements of `expected` left unmatched after pairing each with a distinct actual element,
/// plus the actual elements nothing claimed.
fn unmatched<'e, T: PartialEq>(actual: &[&'e T], expected: &'e [T]) -> (Vec<&'e T>, Vec<&'e T>) {
    let mut claimed = vec![false; actual.len()];
    let mut missing = Vec::new();
    for wanted in expected {
        let slot = actual
            .iter()
            .enumerate()
            .position(|(i, candidate)| !claimed[i] && *candidate == wanted);
        match slot {
            Some(i) => claimed[i] = true,
            None => missing.push(wanted),
        }
    }
    let extra = actual
        .iter()
        .zip(&claimed)
        .filter(|(_, taken)| !**taken)
        .map(|(element, _)| *element)
        .collect();
    (missing, extra)
}

impl<'a, S: Sequence + Debug> IterableAssertions for Subject<'a, S> {
    type Item = S::Item;

    fn contains(self, element: S::Item) -> Outcome {
        let passed = self.actual.elements().contains(&&element);
        self.check_that(passed, format!("a collection containing {:?}", element))
    }

    fn does_not_contain(self, element: S::Item) -> Outcome {
        let passed = !self.actual.elements().contains(&&element);
        self.check_that(passed, format!("a collection without {:?}", element))
    }

    fn has_size(self, expected: usize) -> Outcome {
        let size = self.actual.elements().len();
        self.check_that(
            size == expected,
            format!("a collection of size {} (was {})", expected, size),
        )
    }

    fn is_empty(self) -> Outcome {
        let passed = self.actual.elements().is_empty();
        self.check_that(passed, "an empty collection".to_string())
    }

    fn is_not_empty(self) -> Outcome {
        let passed = !self.actual.elements().is_empty();
        self.check_that(passed, "a non-empty collection".to_string())
    }

    fn contains_any_of(self, candidates: &[S::Item]) -> Outcome {
        let elements = self.actual.elements();
        let passed = candidates.iter().any(|c| elements.contains(&c));
        self.check_that(
            passed,
            format!("a collection containing any of {:?}", candidates),
        )
    }

    fn contains_none_of(self, excluded: &[S::Item]) -> Outcome {
        let elements = self.actual.elements();
        let present: Vec<&S::Item> = excluded.iter().filter(|e| elements.contains(e)).collect();
        let passed = present.is_empty();
        let expectation = format!(
            "a collection containing none of {:?} (found {:?})",
            excluded, present
        );
        self.check_that(passed, expectation)
    }

    fn contains_at_least(self, expected: &[S::Item]) -> Outcome {
        let elements = self.actual.elements();
        let (missing, _) = unmatched(&elements, expected);
        let passed = missing.is_empty();
        let expectation = format!(
            "a collection containing at least {:?} (missing {:?})",
            expected, missing
        );
        self.check_that(passed, expectation)
    }

    fn contains_exactly(self, expected: &[S::Item]) -> Outcome {
        let elements = self.actual.elements();
        let (missing, extra) = unmatched(&elements, expected);
        let passed = missing.is_empty() && extra.is_empty();
        let expectation = format!(
            "a collection containing exactly {:?} (missing {:?}, unexpected {:?})",
            expected, missing, extra
        );
        self.check_that(passed, expectation)
    }

    fn contains_exactly_in_order(self, expected: &[S::Item]) -> Outcome {
        let elements = self.actual.elements();
        let passed = elements.len() == expected.len()
            && elements.iter().zip(expected).all(|(a, e)| *a == e);
        if passed {
            return self.check_that(true, format!("exactly {:?} in order", expected));
        }
        let failure = ComparisonFailure::new(
            format!("exactly {:?} in order", expected),
            format!("{:?}", self.actual),
        )
        .with_diff_of(&expected, &elements);
        self.fail_with(failure)
    }

    fn contains_no_duplicates(self) -> Outcome {
        let elements = self.actual.elements();
        let mut duplicates: Vec<&S::Item> = Vec::new();
        for (i, element) in elements.iter().enumerate() {
            if elements[..i].contains(element) && !duplicates.contains(element) {
                duplicates.push(element);
            }
        }
        let passed = duplicates.is_empty();
        let expectation = format!("a collection without duplicates (repeated {:?})", duplicates);
        self.check_that(passed, expectation)
    }

    fn is_in_order(self) -> Outcome
    where
        Self::Item: PartialOrd,
    {
        let passed = self.actual.elements().windows(2).all(|pair| pair[0] <= pair[1]);
        self.check_that(passed, "a collection in ascending order".to_string())
    }

    fn is_in_strict_order(self) -> Outcome
    where
        Self::Item: PartialOrd,
    {
        let passed = self.actual.elements().windows(2).all(|pair| pair[0] < pair[1]);
        self.check_that(passed, "a collection in strictly ascending order".to_string())
    }

    fn is_in_order_by<F>(self, compare: F) -> Outcome
    where
        F: Fn(&Self::Item, &Self::Item) -> Ordering,
    {
        let passed = self
            .actual
            .elements()
            .windows(2)
            .all(|pair| compare(pair[0], pair[1]) != Ordering::Greater);
        self.check_that(passed, "a collection in the given order".to_string())
    }
}

// ============================================================================
// MAPS
// ============================================================================

/// A key-value collection.
pub trait Mapping {
    type Key: PartialEq + Debug;
    type Value: PartialEq + Debug;

    fn entries(&self) -> Vec<(&Self::Key, &Self::Value)>;
    fn lookup(&self, key: &Self::Key) -> Option<&Self::Value>;
}

impl<K: Eq + Hash + Debug, V: PartialEq + Debug, H: BuildHasher> Mapping for HashMap<K, V, H> {
    type Key = K;
    type Value = V;

    fn entries(&self) -> Vec<(&K, &V)> {
        self.iter().collect()
    }

    fn lookup(&self, key: &K) -> Option<&V> {
        self.get(key)
    }
}

impl<K: Ord + Debug, V: PartialEq + Debug> Mapping for BTreeMap<K, V> {
    type Key = K;
    type Value = V;

    fn entries(&self) -> Vec<(&K, &V)> {
        self.iter().collect()
    }

    fn lookup(&self, key: &K) -> Option<&V> {
        self.get(key)
    }
}

impl<M: Mapping + ?Sized> Mapping for &M {
    type Key = M::Key;
    type Value = M::Value;

    fn entries(&self) -> Vec<(&M::Key, &M::Value)> {
        (**self).entries()
    }

    fn lookup(&self, key: &M::Key) -> Option<&M::Value> {
        (**self).lookup(key)
    }
}

/// Comparisons over maps (`HashMap`, `BTreeMap`).
pub trait MapAssertions {
    type Key;
    type Value;

    fn contains_key(self, key: Self::Key) -> Outcome;
    fn does_not_contain_key(self, key: Self::Key) -> Outcome;
    fn contains_entry(self, key: Self::Key, value: Self::Value) -> Outcome;
    fn does_not_contain_entry(self, key: Self::Key, value: Self::Value) -> Outcome;
    fn has_size(self, expected: usize) -> Outcome;
    fn is_empty(self) -> Outcome;
    fn is_not_empty(self) -> Outcome;
    fn contains_exactly_entries_in<M>(self, expected: &M) -> Outcome
    where
        M: Mapping<Key = Self::Key, Value = Self::Value>;
    fn contains_at_least_entries_in<M>(self, expected: &M) -> Outcome
    where
        M: Mapping<Key = Self::Key, Value = Self::Value>;
}

impl<'a, M: Mapping + Debug> Subject<'a, M> {
    /// Expected entries that are absent or hold a different value.
    fn mismatched_entries<'e, E>(&self, expected: &'e E) -> Vec<(&'e M::Key, &'e M::Value)>
    where
        E: Mapping<Key = M::Key, Value = M::Value>,
    {
        expected
            .entries()
            .into_iter()
            .filter(|(key, value)| self.actual.lookup(key) != Some(*value))
            .collect()
    }
}

impl<'a, M: Mapping + Debug> MapAssertions for Subject<'a, M> {
    type Key = M::Key;
    type Value = M::Value;

    fn contains_key(self, key: M::Key) -> Outcome {
        let passed = self.actual.lookup(&key).is_some();
        self.check_that(passed, format!("a map containing key {:?}", key))
    }

    fn does_not_contain_key(self, key: M::Key) -> Outcome {
        let passed = self.actual.lookup(&key).is_none();
        self.check_that(passed, format!("a map without key {:?}", key))
    }

    fn contains_entry(self, key: M::Key, value: M::Value) -> Outcome {
        let passed = self.actual.lookup(&key) == Some(&value);
        self.check_that(
            passed,
            format!("a map containing entry {:?}={:?}", key, value),
        )
    }

    fn does_not_contain_entry(self, key: M::Key, value: M::Value) -> Outcome {
        let passed = self.actual.lookup(&key) != Some(&value);
        self.check_that(passed, format!("a map without entry {:?}={:?}", key, value))
    }

    fn has_size(self, expected: usize) -> Outcome {
        let size = self.actual.entries().len();
        self.check_that(
            size == expected,
            format!("a map of size {} (was {})", expected, size),
        )
    }

    fn is_empty(self) -> Outcome {
        let passed = self.actual.entries().is_empty();
        self.check_that(passed, "an empty map".to_string())
    }

    fn is_not_empty(self) -> Outcome {
        let passed = !self.actual.entries().is_empty();
        self.check_that(passed, "a non-empty map".to_string())
    }

    fn contains_exactly_entries_in<E>(self, expected: &E) -> Outcome
    where
        E: Mapping<Key = Self::Key, Value = Self::Value>,
    {
        let mismatched = self.mismatched_entries(expected);
        let (actual_size, expected_size) = (self.actual.entries().len(), expected.entries().len());
        let passed = mismatched.is_empty() && actual_size == expected_size;
        self.check_that(
            passed,
            format!(
                "a map with exactly the {} entries {:?} (mismatched {:?})",
                expected_size,
                expected.entries(),
                mismatched
            ),
        )
    }

    fn contains_at_least_entries_in<E>(self, expected: &E) -> Outcome
    where
        E: Mapping<Key = Self::Key, Value = Self::Value>,
    {
        let mismatched = self.mismatched_entries(expected);
        self.check_that(
            mismatched.is_empty(),
            format!(
                "a map containing at least {:?} (mismatched {:?})",
                expected.entries(),
                mismatched
            ),
        )
    }
}

#[cfg(test)]
mod subject_tests {
    use super::*;

    #[test]
    fn test_describe_range_bounds() {
        assert_eq!(describe_range(&(1..5)), "[1..5)");
        assert_eq!(describe_range(&(1..=5)), "[1..5]");
        assert_eq!(describe_range(&(..5)), "(-∞..5)");
        assert_eq!(describe_range::<i32, _>(&(3..)), "[3..+∞)");
    }

    #[test]
    fn test_unmatched_counts_duplicates() {
        let actual = [1, 2, 2, 3];
        let refs: Vec<&i32> = actual.iter().collect();

        let (missing, extra) = unmatched(&refs, &[2, 2, 2]);
        assert_eq!(missing, vec![&2]);
        assert_eq!(extra, vec![&1, &3]);

        let (missing, extra) = unmatched(&refs, &[3, 2, 1, 2]);
        assert!(missing.is_empty());
        assert!(extra.is_empty());
    }
}
