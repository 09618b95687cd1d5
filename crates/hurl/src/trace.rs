// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The tracing hook applied when a raw error first becomes a [`Catchable`].

use std::backtrace::Backtrace as StdBacktrace;
use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt;
use std::panic::Location;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::backtrace::Backtrace;
use crate::{BacktracePolicy, Catchable, SharedError, Thrown};

type TraceFn = dyn Fn(SharedError) -> SharedError + Send + Sync;

static CURRENT: RwLock<Tracer> = parking_lot::const_rwlock(Tracer::identity());

/// Strategy that enriches an error the first time it is captured.
///
/// The tracer runs exactly once per raised error, when the raw error is turned into a
/// [`Catchable`]. Re-annotating or rethrowing an existing `Catchable` never runs it again.
///
/// A process-wide tracer is read by [`throw`](crate::throw) and the other raise primitives.
/// It is meant to be installed once at startup with [`set_tracer`] or [`set_trace_fn`].
/// Code that wants to avoid the global can hold a `Tracer` value and call
/// [`Tracer::throw`] or [`Tracer::catchable`] directly.
///
/// # Examples
///
/// ```rust
/// use hurl::{BacktracePolicy, Tracer};
///
/// let tracer = Tracer::backtrace(BacktracePolicy::Never);
/// let failure = tracer.catchable("connection reset");
///
/// assert_eq!(failure.to_string(), "connection reset");
/// assert!(!failure.has_backtrace());
/// ```
#[derive(Clone, Default)]
pub struct Tracer {
    kind: Kind,
}

#[derive(Clone, Default)]
enum Kind {
    #[default]
    Identity,
    Backtrace(BacktracePolicy),
    Custom(Arc<TraceFn>),
}

impl Tracer {
    /// A tracer that leaves errors untouched.
    #[must_use]
    pub const fn identity() -> Self {
        Self { kind: Kind::Identity }
    }

    /// A tracer that wraps errors into [`Traced`], capturing a backtrace according to `policy`.
    #[must_use]
    pub const fn backtrace(policy: BacktracePolicy) -> Self {
        Self {
            kind: Kind::Backtrace(policy),
        }
    }

    /// A tracer backed by a custom function.
    ///
    /// The function receives the raw error and returns the error to store in the
    /// [`Catchable`]. It should keep the original error reachable through
    /// [`source`](StdError::source) so that cause lookups keep working.
    #[must_use]
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(SharedError) -> SharedError + Send + Sync + 'static,
    {
        Self {
            kind: Kind::Custom(Arc::new(f)),
        }
    }

    /// A copy of the process-wide tracer.
    #[must_use]
    pub fn current() -> Self {
        CURRENT.read().clone()
    }

    /// Applies the strategy to `error`.
    #[must_use]
    pub fn trace(&self, error: SharedError) -> SharedError {
        match &self.kind {
            Kind::Identity => error,
            Kind::Backtrace(policy) => Arc::new(Traced::new(error, *policy)),
            Kind::Custom(f) => f(error),
        }
    }

    /// Wraps an optional error into a [`Catchable`].
    ///
    /// Returns `None` when there is no error. An error that already is a `Catchable` is
    /// annotated without being traced again; any other error is traced and then annotated
    /// with `message`, unless the message is empty.
    #[must_use]
    #[track_caller]
    pub fn wrap(&self, cause: Option<SharedError>, message: impl Into<Cow<'static, str>>) -> Option<Catchable> {
        cause.map(|error| self.wrap_at(error, message.into(), Location::caller()))
    }

    /// Converts anything raisable into a [`Catchable`].
    ///
    /// An existing `Catchable` passes through unchanged, errors are traced, and strings or
    /// rendered values become new basic errors. [`Thrown::Nothing`] still produces a valid
    /// failure, rendered as `"unknown error"`.
    #[must_use]
    #[track_caller]
    pub fn catchable(&self, thrown: impl Into<Thrown>) -> Catchable {
        self.catchable_at(thrown.into(), Cow::Borrowed(""), Location::caller())
    }

    /// Like [`catchable`](Self::catchable), with an extra annotation layer.
    #[must_use]
    #[track_caller]
    pub fn catchable_annotated(&self, thrown: impl Into<Thrown>, message: impl Into<Cow<'static, str>>) -> Catchable {
        self.catchable_at(thrown.into(), message.into(), Location::caller())
    }

    /// Converts `thrown` with this tracer and starts an unwind carrying it.
    #[track_caller]
    pub fn throw(&self, thrown: impl Into<Thrown>) -> ! {
        crate::raise::raise(self.catchable_at(thrown.into(), Cow::Borrowed(""), Location::caller()))
    }

    pub(crate) fn wrap_at(&self, error: SharedError, message: Cow<'static, str>, location: &'static Location<'static>) -> Catchable {
        let catchable = match error.downcast_ref::<Catchable>() {
            Some(existing) => existing.clone(),
            None => Catchable::origin_at(self.trace(error), location),
        };
        catchable.annotate_at(message, location)
    }

    pub(crate) fn catchable_at(&self, thrown: Thrown, message: Cow<'static, str>, location: &'static Location<'static>) -> Catchable {
        match thrown {
            Thrown::Catchable(existing) => existing.annotate_at(message, location),
            Thrown::Error(error) => self.wrap_at(error, message, location),
            Thrown::Message(text) => self.wrap_at(basic_error(text), message, location),
            Thrown::Value(text) => self.wrap_at(basic_error(text.into()), message, location),
            Thrown::Nothing => self.wrap_at(basic_error(Cow::Borrowed(Thrown::NOTHING)), message, location),
        }
    }
}

impl fmt::Debug for Tracer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            Kind::Identity => f.write_str("Tracer::Identity"),
            Kind::Backtrace(policy) => f.debug_tuple("Tracer::Backtrace").field(policy).finish(),
            Kind::Custom(_) => f.write_str("Tracer::Custom"),
        }
    }
}

fn basic_error(text: Cow<'static, str>) -> SharedError {
    Arc::from(Box::<dyn StdError + Send + Sync>::from(text))
}

/// Installs `tracer` as the process-wide tracer.
///
/// Intended for startup configuration; raises running concurrently on other threads may
/// observe either the old or the new tracer.
pub fn set_tracer(tracer: Tracer) {
    *CURRENT.write() = tracer;
}

/// Installs a custom function as the process-wide tracer.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
///
/// hurl::set_trace_fn(|error| Arc::new(hurl::Traced::new(error, hurl::BacktracePolicy::Auto)));
/// # hurl::reset_trace_fn();
/// ```
pub fn set_trace_fn<F>(f: F)
where
    F: Fn(SharedError) -> SharedError + Send + Sync + 'static,
{
    set_tracer(Tracer::from_fn(f));
}

/// Restores the identity tracer.
pub fn reset_trace_fn() {
    set_tracer(Tracer::identity());
}

/// An error paired with the backtrace captured when it was first raised.
///
/// Displays exactly like the wrapped error and reports it as its
/// [`source`](StdError::source), so lookups through the cause chain still find the original.
#[derive(Clone)]
pub struct Traced {
    error: SharedError,
    backtrace: Backtrace,
}

impl Traced {
    /// Wraps `error`, capturing a backtrace according to `policy`.
    #[must_use]
    pub fn new(error: SharedError, policy: BacktracePolicy) -> Self {
        Self {
            error,
            backtrace: Backtrace::capture(policy),
        }
    }

    /// The wrapped error.
    #[must_use]
    pub fn error(&self) -> &SharedError {
        &self.error
    }

    /// The captured backtrace; disabled when nothing was captured.
    #[must_use]
    pub fn backtrace(&self) -> &StdBacktrace {
        self.backtrace.as_backtrace()
    }
}

impl fmt::Display for Traced {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.error, f)
    }
}

impl fmt::Debug for Traced {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Traced")
            .field("error", &self.error)
            .field("backtrace", &self.backtrace.status())
            .finish()
    }
}

impl StdError for Traced {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(self.error.as_ref())
    }
}

#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg(test)]
mod tests {
    use std::backtrace::BacktraceStatus;

    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("{inner} [attached info]")]
    struct Tagged {
        #[source]
        inner: SharedError,
    }

    fn tagging() -> Tracer {
        Tracer::from_fn(|inner| Arc::new(Tagged { inner }))
    }

    fn shared(error: impl Into<Box<dyn StdError + Send + Sync>>) -> SharedError {
        Arc::from(error.into())
    }

    #[test]
    fn wrap_nothing_is_none() {
        for message in ["", "anything", "some annotation"] {
            assert!(Tracer::identity().wrap(None, message).is_none());
            assert!(tagging().wrap(None, message).is_none());
        }
    }

    #[test]
    fn wrap_with_and_without_message() {
        let error = shared("oops");

        let plain = Tracer::identity().wrap(Some(Arc::clone(&error)), "").unwrap();
        assert_eq!(plain.to_string(), "oops");
        assert!(Arc::ptr_eq(plain.origin(), &error));

        let annotated = Tracer::identity().wrap(Some(Arc::clone(&error)), "context").unwrap();
        assert_eq!(annotated.to_string(), "context: oops");
        assert!(Arc::ptr_eq(annotated.origin(), &error));
    }

    #[test]
    fn custom_tracer_applies_once() {
        let tracer = tagging();
        let catchable = tracer.catchable("oops");
        assert_eq!(catchable.to_string(), "oops [attached info]");

        let rewrapped = tracer.wrap(Some(Arc::new(catchable.clone())), "outer").unwrap();
        let reannotated = tracer.catchable_annotated(rewrapped, "outermost");

        let rendered = reannotated.to_string();
        assert_eq!(rendered, "outermost: outer: oops [attached info]");
        assert_eq!(rendered.matches("[attached info]").count(), 1);
        assert!(reannotated.find_source::<Tagged>().is_some());
        assert_eq!(reannotated.root_cause().to_string(), "oops");
    }

    #[test]
    fn catchable_passes_existing_through() {
        let tracer = tagging();
        let first = tracer.catchable("oops");
        let again = tracer.catchable(first.clone());
        assert!(Catchable::ptr_eq(&first, &again));

        let boxed: Box<dyn StdError + Send + Sync> = Box::new(first.clone());
        assert!(Catchable::ptr_eq(&first, &tracer.catchable(boxed)));
    }

    #[test]
    fn catchable_from_nothing_is_valid() {
        let catchable = Tracer::identity().catchable(Thrown::Nothing);
        assert_eq!(catchable.to_string(), "unknown error");
    }

    #[test]
    fn catchable_renders_values() {
        let tracer = Tracer::identity();
        assert_eq!(tracer.catchable(Thrown::value(42)).to_string(), "42");
        assert_eq!(tracer.catchable(Thrown::value(2.5)).to_string(), "2.5");
        assert_eq!(tracer.catchable(Thrown::debug(vec![1, 2])).to_string(), "[1, 2]");
    }

    #[test]
    fn backtrace_tracer_is_transparent() {
        let error = shared(std::io::Error::other("io failure"));
        let traced = Tracer::backtrace(BacktracePolicy::Never).trace(Arc::clone(&error));

        assert_eq!(traced.to_string(), "io failure");
        let wrapper = traced.downcast_ref::<Traced>().unwrap();
        assert!(Arc::ptr_eq(wrapper.error(), &error));
        assert_eq!(wrapper.backtrace().status(), BacktraceStatus::Disabled);
        assert!(traced.source().unwrap().downcast_ref::<std::io::Error>().is_some());
        assert!(format!("{wrapper:?}").starts_with("Traced"));
    }

    #[test]
    fn identity_is_default() {
        assert!(matches!(Tracer::default().kind, Kind::Identity));
        let error = shared("oops");
        assert!(Arc::ptr_eq(&Tracer::default().trace(Arc::clone(&error)), &error));
    }

    #[test]
    fn debug_names_strategy() {
        assert_eq!(format!("{:?}", Tracer::identity()), "Tracer::Identity");
        assert_eq!(format!("{:?}", Tracer::backtrace(BacktracePolicy::Never)), "Tracer::Backtrace(Never)");
        assert_eq!(format!("{:?}", tagging()), "Tracer::Custom");
    }
}
