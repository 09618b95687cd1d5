// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use crate::{Catchable, SharedError};

/// Anything that can be raised.
///
/// Every variant ends up as the same causal chain once converted by a
/// [`Tracer`](crate::Tracer). Most code never names this type and relies on the [`From`]
/// conversion instead, which accepts the same inputs as `Box<dyn Error + Send + Sync>`:
///
/// - string types (`&str`, `String`, `Cow<str>`) become [`Message`](Self::Message),
/// - a [`Catchable`], even boxed, becomes [`Catchable`](Self::Catchable),
/// - every other error becomes [`Error`](Self::Error).
///
/// Values that are not errors go through [`Thrown::value`] or [`Thrown::debug`].
///
/// # Examples
///
/// ```rust
/// use hurl::Thrown;
///
/// assert!(matches!(Thrown::from("oops"), Thrown::Message(_)));
/// assert!(matches!(Thrown::from(std::io::Error::other("oops")), Thrown::Error(_)));
/// assert!(matches!(Thrown::value(42), Thrown::Value(_)));
/// ```
#[derive(Debug, Clone)]
pub enum Thrown {
    /// A failure that is already managed; it passes through untouched.
    Catchable(Catchable),
    /// A native error, traced on conversion.
    Error(SharedError),
    /// A plain message, turned into a new basic error.
    Message(Cow<'static, str>),
    /// A rendered value, turned into a new basic error.
    Value(String),
    /// A failure carrying no information at all.
    Nothing,
}

impl Thrown {
    pub(crate) const NOTHING: &'static str = "unknown error";

    /// Raises an arbitrary value, rendered with its [`Display`](fmt::Display) implementation.
    #[must_use]
    pub fn value(value: impl fmt::Display) -> Self {
        Self::Value(value.to_string())
    }

    /// Raises an arbitrary value, rendered with its [`Debug`](fmt::Debug) implementation.
    #[must_use]
    pub fn debug(value: impl fmt::Debug) -> Self {
        Self::Value(format!("{value:?}"))
    }
}

impl<E> From<E> for Thrown
where
    E: Into<Box<dyn StdError + Send + Sync>>,
{
    fn from(error: E) -> Self {
        if is_string_error(&error) {
            return Self::Message(Cow::Owned(error.into().to_string()));
        }

        match error.into().downcast::<Catchable>() {
            Ok(catchable) => Self::Catchable(*catchable),
            Err(error) => Self::Error(Arc::from(error)),
        }
    }
}

const STR_TYPE_IDS: [typeid::ConstTypeId; 3] = [
    typeid::ConstTypeId::of::<&str>(),
    typeid::ConstTypeId::of::<String>(),
    typeid::ConstTypeId::of::<Cow<'_, str>>(),
];

fn is_string_error<T>(_: &T) -> bool {
    let typeid_of_t = typeid::of::<T>();
    STR_TYPE_IDS.iter().any(|&id| id == typeid_of_t)
}

#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::Tracer;

    #[test]
    fn is_string_error_test() {
        assert!(is_string_error(&"a string slice"));
        assert!(is_string_error(&String::from("a string")));
        assert!(is_string_error(&Cow::Borrowed("a string slice")));
        assert!(is_string_error(&Cow::<'static, str>::Owned(String::from("a string"))));
        assert!(!is_string_error(&std::io::Error::other("an io error")));
    }

    #[rstest]
    #[case::str(Thrown::from("a string"))]
    #[case::string(Thrown::from(String::from("a string")))]
    #[case::cow(Thrown::from(Cow::Borrowed("a string")))]
    fn strings_become_messages(#[case] input: Thrown) {
        let Thrown::Message(text) = input else {
            panic!("expected a message");
        };
        assert_eq!(text, "a string");
    }

    #[test]
    fn errors_stay_errors() {
        let Thrown::Error(error) = Thrown::from(std::io::Error::other("an error")) else {
            panic!("expected an error");
        };
        assert!(error.downcast_ref::<std::io::Error>().is_some());
    }

    #[test]
    fn boxed_catchable_is_recognised() {
        let catchable = Tracer::identity().catchable("oops");
        let boxed: Box<dyn StdError + Send + Sync> = Box::new(catchable.clone());

        let Thrown::Catchable(recovered) = Thrown::from(boxed) else {
            panic!("expected a catchable");
        };
        assert!(Catchable::ptr_eq(&recovered, &catchable));
        assert!(matches!(Thrown::from(catchable), Thrown::Catchable(_)));
    }

    #[test]
    fn values_render() {
        assert!(matches!(Thrown::value(42), Thrown::Value(text) if text == "42"));
        assert!(matches!(Thrown::debug("quoted"), Thrown::Value(text) if text == "\"quoted\""));
    }
}
