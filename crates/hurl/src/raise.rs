// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Primitives that turn a failure into an unwind.
//!
//! Nothing is allocated on the success path: the `Catchable` is only built once a failure
//! is known, inside a cold function.

use std::borrow::Cow;
use std::fmt;
use std::panic::{self, Location};
use std::sync::Arc;

use crate::{Catchable, Thrown, Tracer, Values};

/// Converts `thrown` into a [`Catchable`] and starts an unwind carrying it.
///
/// The conversion uses the process-wide [`Tracer`]. Control resumes at the nearest
/// enclosing boundary such as [`catch`](crate::catch).
///
/// # Examples
///
/// ```rust
/// let failure = hurl::catch(|| -> u32 { hurl::throw("out of range") }).unwrap_err();
/// assert_eq!(failure.to_string(), "out of range");
/// ```
#[track_caller]
pub fn throw(thrown: impl Into<Thrown>) -> ! {
    raise(Tracer::current().catchable_at(thrown.into(), Cow::Borrowed(""), Location::caller()))
}

/// Formats a message and throws it as a new error.
///
/// Usually reached through [`throw!`](crate::throw!).
#[track_caller]
pub fn throw_fmt(args: fmt::Arguments<'_>) -> ! {
    let message = args.as_str().map_or_else(|| Cow::Owned(args.to_string()), Cow::Borrowed);
    throw(Thrown::Message(message))
}

/// Throws from a string literal, a format string with arguments, or any expression
/// convertible into [`Thrown`].
///
/// # Examples
///
/// ```rust
/// fn check(x: i32) -> i32 {
///     if x < 0 {
///         hurl::throw!("value must be non-negative, got {x}");
///     }
///     x
/// }
///
/// let failure = hurl::catch(|| check(-5)).unwrap_err();
/// assert_eq!(failure.to_string(), "value must be non-negative, got -5");
/// ```
#[macro_export]
macro_rules! throw {
    ($msg:literal $(,)?) => {
        $crate::throw_fmt(::core::format_args!($msg))
    };
    ($err:expr $(,)?) => {
        $crate::throw($err)
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::throw_fmt(::core::format_args!($fmt, $($arg)*))
    };
}

/// Unwinds with the trailing error of `values`, or returns them unchanged.
///
/// # Examples
///
/// ```rust
/// use hurl::{Values, try_values};
///
/// let answer: Result<i32, std::io::Error> = Ok(42);
/// let values = try_values(Values::from(answer));
/// assert_eq!(values.nth_as::<i32>(0), Some(&42));
/// ```
#[track_caller]
pub fn try_values(values: Values) -> Values {
    if let Some(error) = values.trailing_error() {
        fail(Thrown::Error(Arc::clone(error)), Cow::Borrowed(""), Location::caller());
    }
    values
}

/// Curried [`try_values`] that annotates the failure with `message` before unwinding.
///
/// # Examples
///
/// ```rust
/// use hurl::{try_values_with_msg, values};
///
/// let failure = hurl::catch(|| {
///     try_values_with_msg("parse header")(values![; Some("bad magic")]);
/// })
/// .unwrap_err();
/// assert_eq!(failure.to_string(), "parse header: bad magic");
/// ```
#[track_caller]
pub fn try_values_with_msg(message: impl Into<Cow<'static, str>>) -> impl FnOnce(Values) -> Values {
    let message = message.into();
    let location = Location::caller();
    move |values| {
        if let Some(error) = values.trailing_error() {
            fail(Thrown::Error(Arc::clone(error)), message, location);
        }
        values
    }
}

/// Extension trait that unwraps a value or throws the failure.
///
/// This is the typed, per-call-site counterpart of [`try_values`].
///
/// # Examples
///
/// ```rust
/// use hurl::OrThrow;
///
/// fn parse(text: &str) -> u16 {
///     text.parse::<u16>().or_throw_msg(format!("parse port {text:?}"))
/// }
///
/// assert_eq!(hurl::catch(|| parse("8080")).unwrap(), 8080);
/// let failure = hurl::catch(|| parse("http")).unwrap_err();
/// assert_eq!(failure.to_string(), "parse port \"http\": invalid digit found in string");
/// ```
pub trait OrThrow<T> {
    /// Returns the value, or throws the failure.
    fn or_throw(self) -> T;

    /// Returns the value, or throws the failure annotated with `message`.
    fn or_throw_msg(self, message: impl Into<Cow<'static, str>>) -> T;

    /// Returns the value, or throws the failure annotated with the message produced by `f`.
    ///
    /// `f` only runs on failure.
    fn or_throw_with<M, F>(self, f: F) -> T
    where
        M: Into<Cow<'static, str>>,
        F: FnOnce() -> M;
}

impl<T, E> OrThrow<T> for Result<T, E>
where
    E: Into<Thrown>,
{
    #[track_caller]
    fn or_throw(self) -> T {
        match self {
            Ok(value) => value,
            Err(error) => fail(error.into(), Cow::Borrowed(""), Location::caller()),
        }
    }

    #[track_caller]
    fn or_throw_msg(self, message: impl Into<Cow<'static, str>>) -> T {
        match self {
            Ok(value) => value,
            Err(error) => fail(error.into(), message.into(), Location::caller()),
        }
    }

    #[track_caller]
    fn or_throw_with<M, F>(self, f: F) -> T
    where
        M: Into<Cow<'static, str>>,
        F: FnOnce() -> M,
    {
        match self {
            Ok(value) => value,
            Err(error) => fail(error.into(), f().into(), Location::caller()),
        }
    }
}

impl<T> OrThrow<T> for Option<T> {
    #[track_caller]
    fn or_throw(self) -> T {
        match self {
            Some(value) => value,
            None => fail(Thrown::Nothing, Cow::Borrowed(""), Location::caller()),
        }
    }

    #[track_caller]
    fn or_throw_msg(self, message: impl Into<Cow<'static, str>>) -> T {
        match self {
            Some(value) => value,
            None => fail(Thrown::Nothing, message.into(), Location::caller()),
        }
    }

    #[track_caller]
    fn or_throw_with<M, F>(self, f: F) -> T
    where
        M: Into<Cow<'static, str>>,
        F: FnOnce() -> M,
    {
        match self {
            Some(value) => value,
            None => fail(Thrown::Nothing, f().into(), Location::caller()),
        }
    }
}

#[cold]
#[inline(never)]
fn fail(thrown: Thrown, message: Cow<'static, str>, location: &'static Location<'static>) -> ! {
    raise(Tracer::current().catchable_at(thrown, message, location))
}

pub(crate) fn raise(catchable: Catchable) -> ! {
    crate::hook::install();
    panic::panic_any(catchable)
}
