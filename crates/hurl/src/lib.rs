// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Structured throw and catch on top of Rust unwinding.
//!
//! Hurl lets deeply nested code give up on a failure with a single call, and lets a chosen
//! boundary further up the stack turn that failure back into an ordinary `Result`. Failures
//! carry a causal chain of annotations with source locations, and a process-wide
//! [`Tracer`] can attach a backtrace the first time an error is raised.
//!
//! # Key Features
//!
//! - [**`Catchable`**](Catchable): The managed failure. An immutable chain of annotations over
//!   an origin error, implementing [`std::error::Error`]
//! - [**`throw`**](throw()) and [**`throw!`**](throw!): Raise anything convertible into [`Thrown`]
//! - [**`OrThrow`**](OrThrow): Unwrap a `Result` or `Option`, or throw the failure
//! - [**`catch`**](catch()), [**`catch_annotated`**](catch_annotated), [**`catch_map`**](catch_map),
//!   [**`observe`**](observe) and [**`guard`**](guard): Boundaries that recover failures
//! - [**`#[boundary]`**](macro@boundary): Attribute macro running a whole function behind a boundary
//! - [**`Values`**](Values): Result tuples following the "trailing element is the error" convention
//! - [**`Tracer`**](Tracer): The hook applied exactly once when a raw error is first captured
//!
//! # Quick Start
//!
//! ```rust
//! use hurl::OrThrow;
//!
//! fn parse_pair(text: &str) -> (u8, u8) {
//!     let (left, right) = text.split_once(',').or_throw_msg("missing comma");
//!     let left = left.trim().parse().or_throw_msg("parsing left side");
//!     let right = right.trim().parse().or_throw_msg("parsing right side");
//!     (left, right)
//! }
//!
//! #[hurl::boundary("reading pair {text:?}")]
//! fn read_pair(text: &str) -> Result<(u8, u8), hurl::Catchable> {
//!     Ok(parse_pair(text))
//! }
//!
//! assert_eq!(read_pair("1, 2").unwrap(), (1, 2));
//!
//! let failure = read_pair("1, 300").unwrap_err();
//! assert_eq!(
//!     failure.to_string(),
//!     "reading pair \"1, 300\": parsing right side: number too large to fit in target type"
//! );
//! ```
//!
//! # Rendering
//!
//! `{}` renders a failure on one line, newest annotation first. `{:#}` and `{:?}` render the
//! origin error followed by every annotation with its location, oldest first:
//!
//! ```text
//! number too large to fit in target type
//! > parsing right side (at src/pair.rs:5)
//! > reading pair "1, 300" (at src/pair.rs:9)
//! ```
//!
//! # Foreign Panics
//!
//! Boundaries only intercept failures raised by this crate. Any other panic, including
//! runtime faults like an out-of-bounds index, passes through every boundary unchanged.
//!
//! ```rust
//! let outcome = std::panic::catch_unwind(|| {
//!     hurl::catch(|| -> u8 { panic!("not managed") })
//! });
//! assert!(outcome.is_err());
//! ```
//!
//! # Tracing
//!
//! The process-wide [`Tracer`] is the identity by default. Install a backtrace tracer at
//! startup to capture where each failure originated:
//!
//! ```rust
//! use hurl::{BacktracePolicy, Tracer};
//!
//! hurl::set_tracer(Tracer::backtrace(BacktracePolicy::Auto));
//! # hurl::reset_trace_fn();
//! ```
//!
//! # Requirements
//!
//! Hurl requires `panic = "unwind"`, the default. With `panic = "abort"` every throw
//! terminates the process.
//!
//! # Features
//!
//! - `logs`: emits `tracing` events when a boundary intercepts a failure and when a failure
//!   escapes every boundary
//! - `test-util`: assertion helpers in the `test_util` module

#[doc(hidden)]
extern crate self as hurl;

mod annotation;
mod backtrace;
mod boundary;
mod catchable;
mod hook;
mod raise;
mod thrown;
mod trace;
mod values;

#[cfg(any(feature = "test-util", test))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-util")))]
pub mod test_util;

use std::borrow::Cow;
use std::error::Error as StdError;
use std::panic::Location;
use std::sync::Arc;

pub use annotation::Annotation;
pub use backtrace::BacktracePolicy;
pub use boundary::{Outcome, catch, catch_annotated, catch_map, guard, observe};
pub use catchable::Catchable;
pub use hurl_macros::boundary;
pub use raise::{OrThrow, throw, throw_fmt, try_values, try_values_with_msg};
pub use thrown::Thrown;
pub use trace::{Traced, Tracer, reset_trace_fn, set_trace_fn, set_tracer};
pub use values::{ErrorSlot, Value, Values};

/// A shared, type-erased error.
pub type SharedError = Arc<dyn StdError + Send + Sync>;

/// Converts `thrown` into a [`Catchable`] with the process-wide [`Tracer`], without unwinding.
///
/// # Examples
///
/// ```rust
/// let failure = hurl::as_catchable("oops");
/// assert_eq!(failure.to_string(), "oops");
///
/// // an existing failure passes through untouched
/// assert!(hurl::Catchable::ptr_eq(&failure, &hurl::as_catchable(failure.clone())));
/// ```
#[must_use]
#[track_caller]
pub fn as_catchable(thrown: impl Into<Thrown>) -> Catchable {
    Tracer::current().catchable_at(thrown.into(), Cow::Borrowed(""), Location::caller())
}

/// Like [`as_catchable`], with an extra annotation layer.
///
/// Re-annotating an existing [`Catchable`] adds a layer without tracing it again.
///
/// # Examples
///
/// ```rust
/// let failure = hurl::as_catchable_annotated(std::io::Error::other("refused"), "connecting");
/// assert_eq!(failure.to_string(), "connecting: refused");
/// ```
#[must_use]
#[track_caller]
pub fn as_catchable_annotated(thrown: impl Into<Thrown>, message: impl Into<Cow<'static, str>>) -> Catchable {
    Tracer::current().catchable_at(thrown.into(), message.into(), Location::caller())
}
