// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Panic hook integration.
//!
//! Unwinds raised by this crate are ordinary panics, so the panic hook would print a
//! `panicked at` report for every throw. The hook installed here stays quiet for a
//! [`Catchable`] raised while a boundary is active on the current thread, reports a
//! `Catchable` that escapes every boundary with its verbose rendering, and forwards every
//! other payload to the previously installed hook untouched.

use std::cell::Cell;
use std::panic::{self, Location, PanicHookInfo};
use std::sync::Once;

use crate::Catchable;

thread_local! {
    static DEPTH: Cell<usize> = const { Cell::new(0) };
}

static INSTALL: Once = Once::new();

/// Installs the hook the first time it is called; later calls do nothing.
///
/// A hook installed afterwards by other code replaces this one, in which case every managed
/// unwind is reported like any other panic.
pub(crate) fn install() {
    INSTALL.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| match Catchable::downcast_panic(info.payload()) {
            Some(_) if is_guarded() => {}
            Some(catchable) => report_uncaught(catchable, info),
            None => previous(info),
        }));
    });
}

/// Returns `true` if a boundary is active on the current thread.
pub(crate) fn is_guarded() -> bool {
    DEPTH.with(Cell::get) > 0
}

/// Marks the current thread as running inside a boundary until dropped.
#[derive(Debug)]
pub(crate) struct Guarded(());

impl Guarded {
    pub(crate) fn enter() -> Self {
        DEPTH.with(|depth| depth.set(depth.get() + 1));
        Self(())
    }
}

impl Drop for Guarded {
    fn drop(&mut self) {
        DEPTH.with(|depth| depth.set(depth.get() - 1));
    }
}

fn report_uncaught(catchable: &Catchable, info: &PanicHookInfo<'_>) {
    #[cfg(any(feature = "logs", test))]
    tracing::event!(
        name: "hurl.uncaught",
        tracing::Level::ERROR,
        failure = %catchable,
        location = %catchable.location(),
        "managed failure escaped every boundary"
    );

    let thread = std::thread::current();
    eprintln!("{}", uncaught_report(thread.name(), info.location(), catchable));
}

fn uncaught_report(thread: Option<&str>, location: Option<&Location<'_>>, catchable: &Catchable) -> String {
    let name = thread.unwrap_or("<unnamed>");
    match location {
        Some(location) => format!("thread '{name}' threw an uncaught failure at {location}:\n{catchable:#}"),
        None => format!("thread '{name}' threw an uncaught failure:\n{catchable:#}"),
    }
}
