// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Utilities for comparing verbose renderings independently of source locations.

/// Strips the `(at file:line)` suffix from every line of a verbose rendering.
#[must_use]
pub fn strip_locations(verbose: &str) -> String {
    let re = regex::Regex::new(r" \(at [^:]+:\d+\)$").unwrap();
    verbose.lines().map(|line| re.replace(line, "")).collect::<Vec<_>>().join("\n")
}

/// Asserts that the verbose rendering of a failure lists exactly the expected lines,
/// ignoring annotation locations.
#[macro_export]
macro_rules! assert_verbose {
    ($failure:expr, [$($line:expr),* $(,)?]) => {{
        let verbose = format!("{:#}", $failure);
        let expected: Vec<&str> = vec![$($line),*];
        assert_eq!(util::strip_locations(&verbose), expected.join("\n"), "verbose rendering:\n{verbose}");
    }};
}
