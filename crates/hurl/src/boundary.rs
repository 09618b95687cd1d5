// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Boundaries that intercept unwinds and turn managed failures back into values.
//!
//! Every boundary follows the same rule: a [`Catchable`] is handed to a handler, anything
//! else is re-raised unchanged with [`resume_unwind`](panic::resume_unwind). A boundary
//! never converts a foreign panic into an error value.
//!
//! Handlers run after the guarded region has been left. A handler that throws again
//! reaches the next enclosing boundary.
//!
//! Like [`catch_unwind`](panic::catch_unwind), a boundary may expose state that the body
//! left half updated when it threw. Bodies are not required to be
//! [`UnwindSafe`](panic::UnwindSafe).

use std::borrow::Cow;
use std::panic::{self, AssertUnwindSafe, Location};

use crate::Catchable;
use crate::hook::{self, Guarded};

/// What happened inside a [`guard`]ed region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T, R> {
    /// The body returned normally.
    Returned(T),
    /// The body threw; this is what the handler made of the failure.
    Caught(R),
}

impl<T, R> Outcome<T, R> {
    /// Returns `true` if the body threw.
    #[must_use]
    pub fn is_caught(&self) -> bool {
        matches!(self, Self::Caught(_))
    }

    /// The returned value, if the body completed normally.
    #[must_use]
    pub fn returned(self) -> Option<T> {
        match self {
            Self::Returned(value) => Some(value),
            Self::Caught(_) => None,
        }
    }

    /// The handler output, if the body threw.
    #[must_use]
    pub fn caught(self) -> Option<R> {
        match self {
            Self::Returned(_) => None,
            Self::Caught(handled) => Some(handled),
        }
    }

    /// Converts into a `Result`, the handler output becoming the error.
    ///
    /// # Errors
    ///
    /// Returns the handler output if the body threw.
    pub fn into_result(self) -> Result<T, R> {
        match self {
            Self::Returned(value) => Ok(value),
            Self::Caught(handled) => Err(handled),
        }
    }
}

/// Runs `body`, handing a thrown [`Catchable`] to `handler`.
///
/// This is the primitive every other boundary is built on. The handler decides what the
/// failure becomes: a replacement error, `None` to suppress it, or a fresh throw that
/// propagates to the next boundary. Panics that did not come from this crate pass through
/// untouched.
///
/// # Examples
///
/// ```rust
/// use hurl::{Outcome, guard};
///
/// let outcome = guard(|| -> u32 { hurl::throw("disk full") }, |failure| {
///     (failure.to_string() != "disk full").then_some(failure)
/// });
///
/// // the handler chose to suppress the failure
/// assert!(matches!(outcome, Outcome::Caught(None)));
/// ```
pub fn guard<T, R>(body: impl FnOnce() -> T, handler: impl FnOnce(Catchable) -> R) -> Outcome<T, R> {
    hook::install();

    let guarded = Guarded::enter();
    let result = panic::catch_unwind(AssertUnwindSafe(body));
    drop(guarded);

    match result {
        Ok(value) => Outcome::Returned(value),
        Err(payload) => match Catchable::from_panic(payload) {
            Ok(catchable) => {
                #[cfg(any(feature = "logs", test))]
                tracing::event!(
                    name: "hurl.caught",
                    tracing::Level::DEBUG,
                    failure = %catchable,
                    location = %catchable.location(),
                    "caught managed failure"
                );

                Outcome::Caught(handler(catchable))
            }
            Err(foreign) => {
                #[cfg(any(feature = "logs", test))]
                tracing::event!(name: "hurl.passthrough", tracing::Level::TRACE, "foreign unwind crossed a boundary");

                panic::resume_unwind(foreign)
            }
        },
    }
}

/// Runs `body`, returning a thrown [`Catchable`] as the error.
///
/// # Examples
///
/// ```rust
/// use hurl::OrThrow;
///
/// fn count_lines(text: &str) -> Result<usize, hurl::Catchable> {
///     hurl::catch(|| {
///         let first = text.lines().next().or_throw_msg("empty input");
///         first.len()
///     })
/// }
///
/// assert_eq!(count_lines("abc\ndef").unwrap(), 3);
/// assert_eq!(count_lines("").unwrap_err().to_string(), "empty input: unknown error");
/// ```
///
/// # Errors
///
/// Returns the failure thrown by `body`.
pub fn catch<T>(body: impl FnOnce() -> T) -> Result<T, Catchable> {
    guard(body, |catchable| catchable).into_result()
}

/// Runs `body`, returning a thrown [`Catchable`] annotated with `message`.
///
/// The annotation is recorded at the caller's location.
///
/// # Examples
///
/// ```rust
/// let failure = hurl::catch_annotated("defer annotation", || -> u8 { hurl::throw!("oops") }).unwrap_err();
/// assert_eq!(failure.to_string(), "defer annotation: oops");
/// ```
///
/// # Errors
///
/// Returns the annotated failure thrown by `body`.
#[track_caller]
pub fn catch_annotated<T>(message: impl Into<Cow<'static, str>>, body: impl FnOnce() -> T) -> Result<T, Catchable> {
    let message = message.into();
    let location = Location::caller();
    guard(body, move |catchable| catchable.annotate_at(message, location)).into_result()
}

/// Runs `body`, mapping a thrown [`Catchable`] into an error of the caller's choosing.
///
/// # Errors
///
/// Returns the mapped failure thrown by `body`.
pub fn catch_map<T, E>(body: impl FnOnce() -> T, f: impl FnOnce(Catchable) -> E) -> Result<T, E> {
    guard(body, f).into_result()
}

/// Runs `body`, letting `handler` observe a thrown [`Catchable`] without recovering a value.
///
/// Returns `None` if the body threw. Typically used at the top of a program to report a
/// failure before terminating.
///
/// # Examples
///
/// ```rust
/// let mut reported = Vec::new();
/// let value = hurl::observe(|| -> u8 { hurl::throw("fatal") }, |failure| reported.push(failure.to_string()));
///
/// assert_eq!(value, None);
/// assert_eq!(reported, ["fatal"]);
/// ```
pub fn observe<T>(body: impl FnOnce() -> T, handler: impl FnOnce(Catchable)) -> Option<T> {
    guard(body, handler).returned()
}
