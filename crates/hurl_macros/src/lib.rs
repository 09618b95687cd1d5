// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Macros for the [hurl](https://docs.rs/hurl) crate.
//!
//! Use the re-exports from `hurl` rather than depending on this crate directly.

use proc_macro::TokenStream;

mod boundary;
mod utils;

/// Attribute macro that runs the body of a function behind a `hurl::catch` boundary.
///
/// The function must return a `Result<T, E>` where `E: From<hurl::Catchable>`. A failure
/// thrown anywhere inside the body is recovered and returned as `Err`. Panics that were not
/// raised by hurl pass through untouched.
///
/// Supported forms:
/// - `#[boundary]` returns the recovered failure as is
/// - `#[boundary("message")]` annotates the recovered failure first
/// - `#[boundary("reading {path}")]` and `#[boundary("reading {}", path.display())]` build
///   the annotation with `format!`, only when a failure was recovered
///
/// `async` functions, functions without a return type and functions returning
/// `impl Trait` are rejected.
///
/// See the main `hurl` crate documentation for detailed usage examples.
#[proc_macro_attribute]
#[cfg_attr(test, mutants::skip)]
pub fn boundary(args: TokenStream, input: TokenStream) -> TokenStream {
    boundary::boundary(args, input)
}
