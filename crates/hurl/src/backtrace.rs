// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! A clonable wrapper around [`std::backtrace::Backtrace`] with a capture policy.

use std::backtrace::{Backtrace as StdBacktrace, BacktraceStatus};
use std::sync::Arc;

/// Policy for capturing backtraces when an error is first traced.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BacktracePolicy {
    /// Decide based on the `RUST_BACKTRACE` and `RUST_LIB_BACKTRACE` environment variables.
    #[default]
    Auto,
    /// Capture even if the environment variables are unset or disable backtraces.
    Forced,
    /// Never capture, regardless of the environment.
    Never,
}

/// Captured backtraces live behind an [`Arc`] so that traced errors stay cheap to share;
/// disabled and unsupported backtraces need no allocation at all.
#[derive(Debug, Clone)]
pub(crate) enum Backtrace {
    Captured(Arc<StdBacktrace>),
    Disabled,
    Unsupported,
}

impl Backtrace {
    #[cfg_attr(coverage_nightly, coverage(off))] // Unsupported backtraces cannot be produced in tests
    #[cfg_attr(test, mutants::skip)]
    fn from_backtrace(bt: StdBacktrace) -> Self {
        match bt.status() {
            BacktraceStatus::Disabled => Self::Disabled,
            BacktraceStatus::Unsupported => Self::Unsupported,
            _ => Self::Captured(Arc::new(bt)),
        }
    }

    pub(crate) fn capture(policy: BacktracePolicy) -> Self {
        match policy {
            BacktracePolicy::Auto => Self::from_backtrace(StdBacktrace::capture()),
            BacktracePolicy::Forced => Self::from_backtrace(StdBacktrace::force_capture()),
            BacktracePolicy::Never => Self::Disabled,
        }
    }

    pub(crate) fn status(&self) -> BacktraceStatus {
        match self {
            Self::Captured(bt) => bt.status(),
            Self::Disabled => BacktraceStatus::Disabled,
            Self::Unsupported => BacktraceStatus::Unsupported,
        }
    }

    pub(crate) fn as_backtrace(&self) -> &StdBacktrace {
        static DISABLED_BACKTRACE: StdBacktrace = StdBacktrace::disabled();
        match self {
            Self::Captured(bt) => bt.as_ref(),
            _ => &DISABLED_BACKTRACE,
        }
    }
}
