// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Test utilities for the hurl crate.
//!
//! This module is only available when the `test-util` feature is enabled.

use std::fmt;

use crate::{SharedError, Values};

/// The two primitives a test framework must expose to [`Assert`].
pub trait FailureReporter {
    /// Records a failure message without stopping the test.
    fn report_failure(&mut self, message: &str);

    /// Stops the test immediately.
    fn abort_test(&mut self);
}

type Check<R> = Box<dyn FnMut(&mut R, Option<&SharedError>)>;

/// Turns failures into test failures through a [`FailureReporter`].
///
/// # Examples
///
/// ```rust
/// use hurl::test_util::{Assert, PanicReporter};
/// use hurl::values;
///
/// let mut must = Assert::new(PanicReporter::default());
/// must.no_error(&values![1; None::<std::io::Error>]);
/// assert_eq!(must.ok(Ok::<_, std::io::Error>(5)), Some(5));
/// ```
pub struct Assert<R> {
    reporter: R,
    check: Option<Check<R>>,
}

impl<R: FailureReporter> Assert<R> {
    /// Reports the verbose rendering of any trailing error and aborts the test.
    #[must_use]
    pub fn new(reporter: R) -> Self {
        Self { reporter, check: None }
    }

    /// Hands every trailing error, or its absence, to `check` instead.
    #[must_use]
    pub fn with_check(reporter: R, check: impl FnMut(&mut R, Option<&SharedError>) + 'static) -> Self {
        Self {
            reporter,
            check: Some(Box::new(check)),
        }
    }

    /// Fails the test if `values` ends with an error.
    pub fn no_error(&mut self, values: &Values) {
        let error = values.trailing_error();
        if let Some(check) = &mut self.check {
            check(&mut self.reporter, error);
            return;
        }

        if let Some(error) = error {
            self.fail(error);
        }
    }

    /// Returns the value of `result`, failing the test if it holds an error.
    pub fn ok<T, E: fmt::Display>(&mut self, result: Result<T, E>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(error) => {
                self.fail(&error);
                None
            }
        }
    }

    /// The wrapped reporter.
    #[must_use]
    pub fn reporter(&self) -> &R {
        &self.reporter
    }

    fn fail(&mut self, error: &dyn fmt::Display) {
        self.reporter.report_failure(&format!("{error:#}"));
        self.reporter.abort_test();
    }
}

impl<R: fmt::Debug> fmt::Debug for Assert<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Assert")
            .field("reporter", &self.reporter)
            .field("check", &self.check.is_some())
            .finish()
    }
}

/// A [`FailureReporter`] for Rust's built-in test harness.
///
/// Failures are collected; aborting panics with every collected message.
#[derive(Debug, Default)]
pub struct PanicReporter {
    failures: Vec<String>,
}

impl PanicReporter {
    /// The failures reported so far.
    #[must_use]
    pub fn failures(&self) -> &[String] {
        &self.failures
    }
}

impl FailureReporter for PanicReporter {
    fn report_failure(&mut self, message: &str) {
        self.failures.push(message.to_owned());
    }

    #[expect(clippy::panic, reason = "aborting a test is done by panicking")]
    fn abort_test(&mut self) {
        panic!("{}", self.failures.join("\n"));
    }
}

/// Panics with the verbose rendering of the trailing error of `values`, if any.
///
/// Shorthand for [`Assert::no_error`] with a [`PanicReporter`].
pub fn assert_no_error(values: &Values) {
    Assert::new(PanicReporter::default()).no_error(values);
}

/// Asserts that `body` throws, and that the default rendering of the failure equals `expected`.
///
/// # Examples
///
/// ```
/// use hurl::assert_thrown;
///
/// assert_thrown!(hurl::throw!("oops"), "oops");
/// ```
#[macro_export]
macro_rules! assert_thrown {
    ($body:expr, $expected:expr $(,)?) => {{
        let expected: &str = $expected;
        match $crate::catch(|| -> () { $body; }) {
            ::core::result::Result::Ok(()) => panic!("expected a thrown failure rendered as {expected:?}, but nothing was thrown"),
            ::core::result::Result::Err(caught) => assert_eq!(caught.to_string(), expected),
        }
    }};
}
