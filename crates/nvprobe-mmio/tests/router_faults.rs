//! Fail-closed behaviour of the address router.

use nvprobe_mmio::{MmioRouter, VirtualBackend, INVALID_READ};

#[test]
fn unattached_router_reads_all_ones_and_drops_writes() {
    let mut router = MmioRouter::unattached();
    assert!(!router.is_attached());

    // In-range addresses still fault before a backend is attached.
    assert_eq!(router.read32(0x0000_0000), INVALID_READ);
    assert_eq!(router.read32(0x0100_0000), INVALID_READ);
    assert_eq!(router.read32(0x01C0_0000), INVALID_READ);
    router.write32(0x0000_0200, 0x1111_1111);

    // The dropped write must not materialise once a backend shows up.
    router.attach(Box::new(VirtualBackend::new()));
    assert_eq!(router.read32(0x0000_0200), 0);
}

#[test]
fn addresses_outside_all_regions_fault_with_a_backend_attached() {
    let mut router = MmioRouter::unattached();
    router.attach(Box::new(VirtualBackend::new()));

    // Gap between the framebuffer limit and the instance-RAM base.
    assert_eq!(router.read32(0x0180_0000), INVALID_READ);
    assert_eq!(router.read32(0x01BF_FFFC), INVALID_READ);
    // Past the instance-RAM limit.
    assert_eq!(router.read32(0x0200_0000), INVALID_READ);
    assert_eq!(router.read32(0xFFFF_FFFC), INVALID_READ);

    // Writes into the gap are silently dropped; neighbouring regions keep
    // their contents.
    router.write32(0x0180_0000, 0xDEAD_BEEF);
    assert_eq!(router.read32(0x017F_FFFC), 0);
    assert_eq!(router.read32(0x01C0_0000), 0);
}

#[test]
fn teardown_detaches_and_is_idempotent() {
    let mut router = MmioRouter::unattached();
    router.attach(Box::new(VirtualBackend::new()));
    router.write32(0x0100_0000, 0xCAFE_F00D);
    assert_eq!(router.read32(0x0100_0000), 0xCAFE_F00D);

    router.teardown();
    assert!(!router.is_attached());
    assert_eq!(router.read32(0x0100_0000), INVALID_READ);

    // Second teardown releases nothing and must not panic.
    router.teardown();
    assert_eq!(router.read32(0x0100_0000), INVALID_READ);
}
