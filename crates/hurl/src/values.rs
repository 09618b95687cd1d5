// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Heterogeneous result tuples following the "trailing element is the error" convention.
//!
//! Most Rust code returns a `Result` and should use [`OrThrow`](crate::OrThrow) instead.
//! `Values` exists for interop with callers that produce a variable number of results.

use std::any::Any;
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use crate::SharedError;

/// One element of a [`Values`] tuple.
pub enum Value {
    /// A payload of any type.
    Payload(Box<dyn Any + Send>),
    /// An error slot; `None` means the operation did not fail.
    Error(Option<SharedError>),
}

impl Value {
    /// Wraps a payload.
    ///
    /// A payload is never treated as an error, even when `value` implements
    /// [`std::error::Error`]. Use [`Value::error`] or [`Value::error_slot`] for the trailing
    /// error so that [`Values::trailing_error`] and [`try_values`](crate::try_values) see it.
    ///
    /// ```rust
    /// use hurl::{Value, Values};
    ///
    /// let err = std::io::Error::other("oops");
    /// let values = Values::pack([Value::payload(1), Value::payload(err)]);
    /// assert!(values.trailing_error().is_none());
    /// ```
    #[must_use]
    pub fn payload<T: Any + Send>(value: T) -> Self {
        Self::Payload(Box::new(value))
    }

    /// An error slot holding `error`.
    #[must_use]
    pub fn error(error: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        Self::Error(Some(Arc::from(error.into())))
    }

    /// An error slot filled from anything that may or may not hold an error.
    #[must_use]
    pub fn error_slot(slot: impl ErrorSlot) -> Self {
        Self::Error(slot.into_error())
    }

    /// Returns `true` for error slots, whether or not they hold an error.
    #[must_use]
    pub fn is_error_slot(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// The error held by this slot, if any.
    #[must_use]
    pub fn as_error(&self) -> Option<&SharedError> {
        match self {
            Self::Error(error) => error.as_ref(),
            Self::Payload(_) => None,
        }
    }

    /// The payload, if it is a `T`.
    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            Self::Payload(payload) => payload.downcast_ref(),
            Self::Error(_) => None,
        }
    }

    /// Takes the payload out, if it is a `T`.
    #[must_use]
    pub fn downcast<T: Any>(self) -> Option<T> {
        match self {
            Self::Payload(payload) => payload.downcast().ok().map(|value| *value),
            Self::Error(_) => None,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Payload(_) => f.write_str("Payload(..)"),
            Self::Error(error) => f.debug_tuple("Error").field(error).finish(),
        }
    }
}

/// Anything that can fill an error slot of a [`Values`] tuple.
pub trait ErrorSlot {
    /// The error, or `None` if there is none.
    fn into_error(self) -> Option<SharedError>;
}

impl<E> ErrorSlot for Option<E>
where
    E: Into<Box<dyn StdError + Send + Sync>>,
{
    fn into_error(self) -> Option<SharedError> {
        self.map(|error| Arc::from(error.into()))
    }
}

impl<E> ErrorSlot for Result<(), E>
where
    E: Into<Box<dyn StdError + Send + Sync>>,
{
    fn into_error(self) -> Option<SharedError> {
        self.err().into_error()
    }
}

/// An ordered snapshot of the results of one fallible call.
///
/// If the last element is an error slot holding an error, that error is the call's
/// failure; every other element is payload. Indexing never panics: negative indices count
/// from the end and out-of-range indices yield `None`.
///
/// # Examples
///
/// ```rust
/// use hurl::values;
///
/// let xs = values![1, 2, 3];
/// assert_eq!(xs.nth_as::<i32>(-1), Some(&3));
/// assert!(xs.nth(3).is_none());
/// assert!(xs.nth(-4).is_none());
/// assert!(xs.trailing_error().is_none());
///
/// let failed = values![0; Some("oops")];
/// assert_eq!(failed.trailing_error().unwrap().to_string(), "oops");
/// ```
#[derive(Debug, Default)]
pub struct Values {
    items: Vec<Value>,
}

impl Values {
    /// An empty tuple.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Captures `items` in order.
    #[must_use]
    pub fn pack(items: impl IntoIterator<Item = Value>) -> Self {
        Self {
            items: items.into_iter().collect(),
        }
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if there are no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The element at `index`; negative indices count from the end.
    #[must_use]
    pub fn nth(&self, index: isize) -> Option<&Value> {
        self.items.get(self.resolve(index)?)
    }

    /// The payload at `index`, if it is a `T`.
    #[must_use]
    pub fn nth_as<T: Any>(&self, index: isize) -> Option<&T> {
        self.nth(index)?.downcast_ref()
    }

    /// Takes the payload at `index` out of the tuple, if it is a `T`.
    #[must_use]
    pub fn into_nth<T: Any>(mut self, index: isize) -> Option<T> {
        let index = self.resolve(index)?;
        self.items.swap_remove(index).downcast()
    }

    /// The error held by the last element, if the last element is an error slot.
    #[must_use]
    pub fn trailing_error(&self) -> Option<&SharedError> {
        self.items.last()?.as_error()
    }

    /// Iterates over the elements in order.
    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.items.iter()
    }

    fn resolve(&self, index: isize) -> Option<usize> {
        if index < 0 {
            self.items.len().checked_sub(index.unsigned_abs())
        } else {
            let index = index.unsigned_abs();
            (index < self.items.len()).then_some(index)
        }
    }
}

impl<T, E> From<Result<T, E>> for Values
where
    T: Any + Send,
    E: Into<Box<dyn StdError + Send + Sync>>,
{
    /// `Ok(value)` becomes `[value, no error]`, `Err(error)` becomes `[error]`.
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Self::pack([Value::payload(value), Value::Error(None)]),
            Err(error) => Self::pack([Value::error(error)]),
        }
    }
}

impl FromIterator<Value> for Values {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self::pack(iter)
    }
}

impl IntoIterator for Values {
    type Item = Value;
    type IntoIter = std::vec::IntoIter<Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

/// Builds a [`Values`] tuple.
///
/// - `values![a, b]` packs payloads only.
/// - `values![a, b; err]` appends an error slot filled from `err`, any [`ErrorSlot`]
///   such as an `Option<E>`.
///
/// ```rust
/// use hurl::values;
///
/// let ok = values![42; None::<std::io::Error>];
/// assert_eq!(ok.len(), 2);
/// assert!(ok.trailing_error().is_none());
/// ```
///
/// Only the `;` form creates an error slot. An error listed after a comma is packed as an
/// ordinary payload and the tuple counts as a success:
///
/// ```rust
/// use hurl::values;
///
/// let err = std::io::Error::other("oops");
/// let wrong = values![1, 2, err];
/// assert!(wrong.trailing_error().is_none());
///
/// let err = std::io::Error::other("oops");
/// let right = values![1, 2; Some(err)];
/// assert_eq!(right.trailing_error().map(ToString::to_string).as_deref(), Some("oops"));
/// ```
#[macro_export]
macro_rules! values {
    ($($value:expr),* ; $err:expr $(,)?) => {
        $crate::Values::pack([$($crate::Value::payload($value),)* $crate::Value::error_slot($err)])
    };
    ($($value:expr),* $(,)?) => {
        $crate::Values::pack(::std::vec::Vec::<$crate::Value>::from([$($crate::Value::payload($value)),*]))
    };
}
