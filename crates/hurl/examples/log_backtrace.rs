// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Logs the same annotated failure in its short and verbose renderings.
//!
//! Run with `cargo run --example log_backtrace`.

use hurl::{BacktracePolicy, Catchable, Tracer};

#[hurl::boundary("defer annotation")]
fn f() -> Result<(), Catchable> {
    hurl::throw(std::io::Error::other("oops"))
}

fn main() {
    tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();
    hurl::set_tracer(Tracer::backtrace(BacktracePolicy::Forced));

    if let Err(failure) = f() {
        tracing::info!(%failure, "short rendering");
        tracing::info!("verbose rendering:\n{failure:#}");
        tracing::error!(error = &failure as &dyn std::error::Error, ">>>");
    }
}
