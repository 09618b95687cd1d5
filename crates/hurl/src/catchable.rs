// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::any::Any;
use std::backtrace::{Backtrace as StdBacktrace, BacktraceStatus};
use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt;
use std::panic::Location;
use std::sync::Arc;

use crate::{Annotation, SharedError, Traced};

/// A managed failure: an error raised by this crate, travelling as an unwind payload.
///
/// A `Catchable` is a cheap handle to an immutable chain of layers. The deepest layer holds
/// the origin error, already passed through the [`Tracer`](crate::Tracer) once. Every
/// [`annotate`](Self::annotate) call produces a new handle whose cause is the previous one,
/// so nothing is ever mutated in place and the original cause stays reachable.
///
/// # Rendering
///
/// - `{}` renders the message chain on one line, newest message first: `"m2: m1: origin"`.
/// - `{:#}` and `{:?}` render verbosely: the origin error on the first line, followed by one
///   line per annotation from the oldest to the newest, and finally the backtrace when the
///   origin carries a captured one.
///
/// ```text
/// file not found
/// > reading config (at src/config.rs:12)
/// > starting service (at src/main.rs:40)
/// ```
///
/// # Examples
///
/// ```rust
/// let failure = hurl::catch::<()>(|| hurl::throw("oops")).unwrap_err();
/// let annotated = failure.annotate("loading settings");
///
/// assert_eq!(annotated.to_string(), "loading settings: oops");
/// assert_eq!(annotated.root_cause().to_string(), "oops");
/// ```
#[derive(Clone)]
pub struct Catchable {
    layer: Arc<Layer>,
}

enum Layer {
    Origin {
        error: SharedError,
        location: &'static Location<'static>,
    },
    Annotated {
        annotation: Annotation,
        cause: Catchable,
    },
}

impl Catchable {
    pub(crate) fn origin_at(error: SharedError, location: &'static Location<'static>) -> Self {
        Self {
            layer: Arc::new(Layer::Origin { error, location }),
        }
    }

    pub(crate) fn annotate_at(&self, message: Cow<'static, str>, location: &'static Location<'static>) -> Self {
        if message.is_empty() {
            return self.clone();
        }

        Self {
            layer: Arc::new(Layer::Annotated {
                annotation: Annotation::new(message, location),
                cause: self.clone(),
            }),
        }
    }

    /// Returns a new `Catchable` with `message` layered on top of this one.
    ///
    /// The tracer is not invoked again. An empty message returns the same handle.
    #[must_use]
    #[track_caller]
    pub fn annotate(&self, message: impl Into<Cow<'static, str>>) -> Self {
        self.annotate_at(message.into(), Location::caller())
    }

    /// Where this layer was created: the raise site for the origin layer, the annotation site otherwise.
    #[must_use]
    pub fn location(&self) -> &'static Location<'static> {
        match &*self.layer {
            Layer::Origin { location, .. } => location,
            Layer::Annotated { annotation, .. } => annotation.location(),
        }
    }

    /// The traced error stored at the bottom of the chain.
    #[must_use]
    pub fn origin(&self) -> &SharedError {
        let mut current = self;
        loop {
            match &*current.layer {
                Layer::Origin { error, .. } => return error,
                Layer::Annotated { cause, .. } => current = cause,
            }
        }
    }

    /// The last error reachable through [`source`](StdError::source), walking through every
    /// annotation layer and every tracer wrapper.
    #[must_use]
    pub fn root_cause(&self) -> &(dyn StdError + 'static) {
        let mut current: &(dyn StdError + 'static) = self.origin().as_ref();
        while let Some(source) = current.source() {
            current = source;
        }
        current
    }

    /// Finds the first error of type `T` in the cause chain, not counting `self`.
    #[must_use]
    pub fn find_source<T: StdError + 'static>(&self) -> Option<&T> {
        let mut source = self.source();
        while let Some(err) = source {
            if let Some(target) = err.downcast_ref::<T>() {
                return Some(target);
            }
            source = err.source();
        }
        None
    }

    /// Iterates over the annotations, most recent first.
    pub fn annotations(&self) -> impl Iterator<Item = &Annotation> {
        let mut current = Some(self);
        std::iter::from_fn(move || {
            let Layer::Annotated { annotation, cause } = &*current?.layer else {
                current = None;
                return None;
            };
            current = Some(cause);
            Some(annotation)
        })
    }

    /// Iterates over the annotation messages, most recent first.
    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.annotations().map(Annotation::message)
    }

    /// Returns the backtrace attached by the tracer, or a disabled one.
    #[must_use]
    pub fn backtrace(&self) -> &StdBacktrace {
        static DISABLED_BACKTRACE: StdBacktrace = StdBacktrace::disabled();
        self.traced().map_or(&DISABLED_BACKTRACE, Traced::backtrace)
    }

    /// Returns `true` if the tracer captured a backtrace for the origin error.
    #[must_use]
    pub fn has_backtrace(&self) -> bool {
        self.backtrace().status() == BacktraceStatus::Captured
    }

    /// Returns `true` if both handles point at the same layer.
    #[must_use]
    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        Arc::ptr_eq(&this.layer, &other.layer)
    }

    /// The verbose rendering, equivalent to formatting with `{:#}`.
    #[must_use]
    pub fn verbose(&self) -> String {
        format!("{self:#}")
    }

    /// Separates a managed failure from a foreign unwind payload.
    ///
    /// Harnesses that run their own [`catch_unwind`](std::panic::catch_unwind) use this to tell
    /// an uncaught `Catchable` apart from any other panic. A foreign payload is handed back
    /// untouched so it can be passed on to [`resume_unwind`](std::panic::resume_unwind).
    ///
    /// # Errors
    ///
    /// Returns the original payload if it is not a `Catchable`.
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Result<Self, Box<dyn Any + Send>> {
        payload.downcast::<Self>().map(|catchable| *catchable)
    }

    /// Borrowing variant of [`from_panic`](Self::from_panic).
    #[must_use]
    pub fn downcast_panic(payload: &(dyn Any + Send)) -> Option<&Self> {
        payload.downcast_ref::<Self>()
    }

    /// Starts an unwind carrying this failure, without tracing or annotating it again.
    pub fn rethrow(self) -> ! {
        crate::raise::raise(self)
    }

    fn traced(&self) -> Option<&Traced> {
        let mut current: Option<&(dyn StdError + 'static)> = Some(self.origin().as_ref());
        while let Some(err) = current {
            if let Some(traced) = err.downcast_ref::<Traced>() {
                return Some(traced);
            }
            current = err.source();
        }
        None
    }

    fn fmt_verbose(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.origin())?;

        let annotations: Vec<_> = self.annotations().collect();
        for annotation in annotations.iter().rev() {
            write!(f, "\n> {annotation}")?;
        }

        if self.has_backtrace() {
            write!(f, "\n\nBacktrace:\n{}", self.backtrace())?;
        }

        Ok(())
    }
}

impl fmt::Display for Catchable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            return self.fmt_verbose(f);
        }

        match &*self.layer {
            Layer::Origin { error, .. } => write!(f, "{error}"),
            Layer::Annotated { annotation, cause } => write!(f, "{}: {cause}", annotation.message()),
        }
    }
}

impl fmt::Debug for Catchable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // `fn main() -> Result<(), Catchable>` prints the full chain this way
        self.fmt_verbose(f)
    }
}

impl StdError for Catchable {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match &*self.layer {
            Layer::Origin { error, .. } => Some(error.as_ref()),
            Layer::Annotated { cause, .. } => Some(cause),
        }
    }
}
