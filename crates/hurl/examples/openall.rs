// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Opens every file named on the command line, giving up on the first one that fails.
//!
//! Run with `cargo run --example openall -- Cargo.toml missing.txt`.

use std::error::Error;
use std::fmt;
use std::fs::File;
use std::io;

use hurl::OrThrow;

#[derive(Debug)]
struct OpenAllError(hurl::Catchable);

impl From<hurl::Catchable> for OpenAllError {
    fn from(caught: hurl::Catchable) -> Self {
        Self(caught.annotate("openall failed"))
    }
}

impl fmt::Display for OpenAllError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl Error for OpenAllError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.0.source()
    }
}

#[hurl::boundary]
fn open_all(paths: &[String]) -> Result<Vec<File>, OpenAllError> {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        let count = files.len();
        let file = File::open(path).or_throw_with(|| format!("open file #{count}: {path:?}"));
        println!("open {path} as {file:?}");
        files.push(file);
    }
    Ok(files)
}

fn main() -> Result<(), io::Error> {
    let paths: Vec<String> = std::env::args().skip(1).collect();

    let opened = hurl::observe(
        || {
            open_all(&paths)
                .unwrap_or_else(|OpenAllError(failure)| failure.rethrow())
                .len()
        },
        |failure| eprintln!("{failure:#}"),
    );

    match opened {
        Some(count) => {
            println!("succeeded in opening {count} files");
            Ok(())
        }
        None => Err(io::Error::other("not every file could be opened")),
    }
}
