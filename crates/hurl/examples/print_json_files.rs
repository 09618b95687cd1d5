// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Prints every JSON file named on the command line in compact form.
//!
//! Shows annotated throws in a helper, a function-level boundary and a top-level observer
//! printing the verbose chain with its backtrace.
//!
//! Run with `RUST_BACKTRACE=1 cargo run --example print_json_files -- a.json b.json`.

use hurl::{BacktracePolicy, Catchable, OrThrow, Tracer};
use serde_json::Value;

fn load(path: &str) -> Value {
    let text = std::fs::read_to_string(path).or_throw_msg(format!("read {path}"));
    serde_json::from_str::<Value>(&text).or_throw_msg(format!("decode {path}"))
}

#[hurl::boundary]
fn print_all(paths: &[String]) -> Result<(), Catchable> {
    for (index, path) in paths.iter().enumerate() {
        let value = load(path);
        let compact = serde_json::to_string(&value).or_throw();
        println!("{index} {compact}");
    }
    Ok(())
}

fn main() {
    hurl::set_tracer(Tracer::backtrace(BacktracePolicy::Auto));

    println!("# BEGIN");
    let paths: Vec<String> = std::env::args().skip(1).collect();
    hurl::observe(|| print_all(&paths).or_throw(), |failure| println!("# OOPS: {failure:#}"));
    println!("# END");
}
