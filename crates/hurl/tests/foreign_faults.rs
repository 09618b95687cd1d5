// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![expect(missing_docs, reason = "Test code")]

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use hurl::{Catchable, catch, catch_annotated, catch_map, guard, observe, throw};
use rstest::rstest;

#[derive(Debug)]
struct Fault(&'static str);

fn nest(depth: usize, body: &dyn Fn() -> u8) -> u8 {
    if depth == 0 {
        return body();
    }

    match depth % 4 {
        0 => catch(|| nest(depth - 1, body)).unwrap_or(0),
        1 => catch_annotated("nested", || nest(depth - 1, body)).unwrap_or(0),
        2 => observe(|| nest(depth - 1, body), drop).unwrap_or(0),
        _ => guard(|| nest(depth - 1, body), |_| None::<Catchable>).returned().unwrap_or(0),
    }
}

#[rstest]
#[case(1)]
#[case(2)]
#[case(5)]
#[case(16)]
fn foreign_payload_reaches_outer_observer(#[case] depth: usize) {
    let marker = Arc::new(Fault("marker"));
    let thrown = Arc::clone(&marker);

    let payload = panic::catch_unwind(AssertUnwindSafe(|| {
        nest(depth, &|| panic::panic_any(Arc::clone(&thrown)))
    }))
    .unwrap_err();

    let received = payload.downcast_ref::<Arc<Fault>>().unwrap();
    assert!(Arc::ptr_eq(received, &marker));
    assert!(Catchable::downcast_panic(payload.as_ref()).is_none());
}

#[rstest]
#[case(1)]
#[case(5)]
fn managed_failure_stops_at_innermost_boundary(#[case] depth: usize) {
    assert_eq!(nest(depth, &|| throw("oops")), 0);
}

#[test]
fn runtime_fault_is_not_masked() {
    let items = [1_u8, 2, 3];
    let index = items.len();

    let payload = panic::catch_unwind(|| catch(|| items[index])).unwrap_err();
    assert!(Catchable::downcast_panic(payload.as_ref()).is_none());
}

#[test]
fn handler_rethrow_reaches_next_boundary() {
    let failure = catch(|| {
        catch_map(|| -> u8 { throw("inner") }, |caught| -> std::io::Error {
            caught.annotate("rethrown by handler").rethrow()
        })
    })
    .unwrap_err();

    assert_eq!(failure.to_string(), "rethrown by handler: inner");
}

#[test]
fn handler_foreign_panic_bypasses_outer_boundaries() {
    let payload = panic::catch_unwind(|| {
        catch(|| observe(|| -> u8 { throw("inner") }, |_| panic::panic_any(Fault("from handler"))))
    })
    .unwrap_err();

    assert_eq!(payload.downcast_ref::<Fault>().map(|fault| fault.0), Some("from handler"));
}

#[test]
fn uncaught_failure_is_recognisable_by_harness() {
    let payload = panic::catch_unwind(|| -> u8 { throw("escaped") }).unwrap_err();

    let failure = Catchable::from_panic(payload).unwrap();
    assert_eq!(failure.to_string(), "escaped");
}
