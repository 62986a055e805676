//! Cancellation flag for SIGINT/SIGTERM.
//!
//! The handler does nothing but an atomic store; the main thread polls the
//! flag and returns, so teardown runs through the ordinary drop path instead
//! of inside signal delivery.

use std::sync::atomic::{AtomicBool, Ordering};

static SHUTDOWN: AtomicBool = AtomicBool::new(false);

extern "C" fn handle(_sig: libc::c_int) {
    SHUTDOWN.store(true, Ordering::SeqCst);
}

pub fn install() {
    let handler = handle as extern "C" fn(libc::c_int) as *const () as libc::sighandler_t;
    // SAFETY: the handler is async-signal-safe (a single atomic store).
    unsafe {
        libc::signal(libc::SIGINT, handler);
        libc::signal(libc::SIGTERM, handler);
    }
}

pub fn shutdown_requested() -> bool {
    SHUTDOWN.load(Ordering::SeqCst)
}
