// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::borrow::Cow;
use std::fmt;
use std::panic::Location;

/// A message layer added to a [`Catchable`](crate::Catchable), together with the place it was added.
#[derive(Debug, Clone)]
pub struct Annotation {
    message: Cow<'static, str>,
    location: &'static Location<'static>,
}

impl Annotation {
    pub(crate) fn new(message: Cow<'static, str>, location: &'static Location<'static>) -> Self {
        Self { message, location }
    }

    /// The annotation message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Where the annotation was added.
    #[must_use]
    pub fn location(&self) -> &'static Location<'static> {
        self.location
    }
}

impl fmt::Display for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (at {}:{})", self.message, self.location.file(), self.location.line())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_location() {
        let location = Location::caller();
        let annotation = Annotation::new("reading config".into(), location);
        assert_eq!(
            annotation.to_string(),
            format!("reading config (at {}:{})", location.file(), location.line())
        );
        assert_eq!(annotation.message(), "reading config");
        assert_eq!(annotation.location().file(), file!());
    }
}
