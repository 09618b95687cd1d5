// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![allow(
    missing_docs,
    clippy::unwrap_used,
    reason = "Benchmarks don't require documentation and should fail fast on errors"
)]

use std::hint::black_box;
use std::io;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use hurl::{OrThrow, Values, catch, try_values, values};

const INPUTS: usize = 1024;

fn step(fail: bool) -> Result<u32, io::Error> {
    if fail { Err(io::Error::other("step failed")) } else { Ok(1) }
}

fn step_values(fail: bool) -> Values {
    if fail {
        values![0_u32; Some(io::Error::other("step failed"))]
    } else {
        values![1_u32; None::<io::Error>]
    }
}

fn with_question_mark(fail: bool) -> Result<u32, io::Error> {
    let a = step(false)?;
    let b = step(fail)?;
    Ok(a + b)
}

fn with_or_throw(fail: bool) -> u32 {
    let a = step(false).or_throw();
    let b = step(fail).or_throw_msg("second step");
    a + b
}

fn with_try_values(fail: bool) -> u32 {
    let a = try_values(step_values(false)).into_nth::<u32>(0).unwrap();
    let b = try_values(step_values(fail)).into_nth::<u32>(0).unwrap();
    a + b
}

fn inputs(error_rate: f64) -> Vec<bool> {
    let mut rng = fastrand::Rng::with_seed(0x5eed);
    (0..INPUTS).map(|_| rng.f64() < error_rate).collect()
}

fn entry(c: &mut Criterion) {
    let mut group = c.benchmark_group("throw_catch");

    for error_rate in [0.0, 0.1] {
        let inputs = inputs(error_rate);

        group.bench_with_input(BenchmarkId::new("question_mark", error_rate), &inputs, |b, inputs| {
            b.iter(|| {
                for &fail in inputs {
                    let _ = black_box(with_question_mark(black_box(fail)));
                }
            });
        });

        group.bench_with_input(BenchmarkId::new("or_throw", error_rate), &inputs, |b, inputs| {
            b.iter(|| {
                for &fail in inputs {
                    let _ = black_box(catch(|| with_or_throw(black_box(fail))));
                }
            });
        });

        group.bench_with_input(BenchmarkId::new("try_values", error_rate), &inputs, |b, inputs| {
            b.iter(|| {
                for &fail in inputs {
                    let _ = black_box(catch(|| with_try_values(black_box(fail))));
                }
            });
        });
    }

    group.finish();
}

criterion_group!(benches, entry);
criterion_main!(benches);
