//! Early termination of the memory-clock sweep.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use nvprobe_bringup::nv3::{sweep_memory_clock, SweepConfig};
use nvprobe_mmio::{MmioRouter, VirtualBackend};
use nvprobe_regs::nv3::{MPLL_NOMINAL_13500, MPLL_NOMINAL_14318, PRAMDAC_MPLL_COEFF};
use nvprobe_regs::Crystal;

fn attached_router() -> MmioRouter {
    let mut router = MmioRouter::unattached();
    router.attach(Box::new(VirtualBackend::new()));
    router
}

static STOP_IMMEDIATELY: AtomicBool = AtomicBool::new(false);

fn stop_immediately() -> bool {
    STOP_IMMEDIATELY.load(Ordering::SeqCst)
}

#[test]
fn a_pending_cancellation_ends_the_sweep_without_holding_any_step() {
    STOP_IMMEDIATELY.store(true, Ordering::SeqCst);
    let mut router = attached_router();
    let config = SweepConfig {
        dwell: Duration::from_secs(5),
        cancel: Some(stop_immediately),
    };

    let started = Instant::now();
    sweep_memory_clock(&mut router, Crystal::Khz14318, &config);

    // No step may be held for its dwell once cancellation is pending.
    assert!(started.elapsed() < Duration::from_secs(1));
    assert_eq!(router.read32(PRAMDAC_MPLL_COEFF), MPLL_NOMINAL_14318);
}

static CANCEL_QUERIES: AtomicUsize = AtomicUsize::new(0);

fn stop_after_a_few_queries() -> bool {
    CANCEL_QUERIES.fetch_add(1, Ordering::SeqCst) >= 6
}

#[test]
fn cancellation_mid_sweep_stops_stepping_and_restores_the_nominal_clock() {
    let mut router = attached_router();
    let config = SweepConfig {
        dwell: Duration::ZERO,
        cancel: Some(stop_after_a_few_queries),
    };

    sweep_memory_clock(&mut router, Crystal::Khz13500, &config);

    // A full 13.5 MHz sweep polls cancellation far more often than this; a
    // low final count shows the walk stopped at the request, not at 0xFF.
    assert!(CANCEL_QUERIES.load(Ordering::SeqCst) < 30);
    assert_eq!(router.read32(PRAMDAC_MPLL_COEFF), MPLL_NOMINAL_13500);
}
