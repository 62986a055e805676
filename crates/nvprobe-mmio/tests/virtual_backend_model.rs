//! Seeded state and register semantics of the virtual NV3 model.

use nvprobe_mmio::router::RegionBackend;
use nvprobe_mmio::{MmioRouter, Region, VirtualBackend, INVALID_READ};
use nvprobe_regs::nv3;

fn attached_router() -> MmioRouter {
    let mut router = MmioRouter::unattached();
    router.attach(Box::new(VirtualBackend::new()));
    router
}

#[test]
fn boot_registers_are_seeded_like_a_rev_b0_part() {
    let router = attached_router();
    assert_eq!(router.read32(nv3::PMC_BOOT_0), nv3::PMC_BOOT_0_REV_B00);
    assert_eq!(router.read32(nv3::PFB_BOOT_0), 0b10); // 4 MiB
    assert_eq!(router.read32(nv3::PSTRAPS), (1 << 6) | (1 << 1) | (1 << 0));
    assert_eq!(router.read32(nv3::PRAMDAC_MPLL_COEFF), nv3::MPLL_DEFAULT);
    // Unseeded registers read as zero, not as the fault sentinel.
    assert_eq!(router.read32(nv3::PRAMDAC_VPLL_COEFF), 0);
}

#[test]
fn read_after_write_round_trips_in_every_region() {
    let mut router = attached_router();

    router.write32(0x0000_4000, 0x1234_5678);
    assert_eq!(router.read32(0x0000_4000), 0x1234_5678);

    // Framebuffer and instance RAM addresses are rebased before storage.
    router.write32(0x0100_0010, 0xAAAA_5555);
    assert_eq!(router.read32(0x0100_0010), 0xAAAA_5555);

    router.write32(0x01C0_0020, 0x5555_AAAA);
    assert_eq!(router.read32(0x01C0_0020), 0x5555_AAAA);

    // The three stores went to distinct buffers.
    assert_eq!(router.read32(0x0000_0010), 0);
    assert_eq!(router.read32(0x0100_0020), 0);
}

#[test]
fn clock_coefficient_writes_keep_the_stored_value_exact() {
    // The MCLK decode hook is observability only; the register must hold
    // whatever was written, including nonsense divider fields.
    let mut router = attached_router();
    for value in [0x01_C4_0E, 0x01_FF_0E, 0x0000_0000, 0xFFFF_FFFF] {
        router.write32(nv3::PRAMDAC_MPLL_COEFF, value);
        assert_eq!(router.read32(nv3::PRAMDAC_MPLL_COEFF), value);
    }
}

#[test]
fn unaligned_offsets_fault_instead_of_truncating() {
    let mut router = attached_router();

    // An unaligned read must not round down to the containing word.
    assert_eq!(router.read32(nv3::PMC_BOOT_0 + 2), INVALID_READ);

    // An unaligned write must be dropped, leaving the neighbouring word
    // untouched, in every region.
    router.write32(0x0000_0402, 0xDEAD_BEEF);
    assert_eq!(router.read32(0x0000_0400), 0);
    router.write32(0x0100_0006, 0xDEAD_BEEF);
    assert_eq!(router.read32(0x0100_0004), 0);
    router.write32(0x01C0_000A, 0xDEAD_BEEF);
    assert_eq!(router.read32(0x01C0_0008), 0);
}

#[test]
fn backend_teardown_is_idempotent_and_fails_closed() {
    let mut backend = VirtualBackend::new();
    assert_eq!(backend.read32(Region::Control, nv3::PMC_BOOT_0), Some(nv3::PMC_BOOT_0_REV_B00));

    backend.teardown();
    assert_eq!(backend.read32(Region::Control, nv3::PMC_BOOT_0), None);
    assert!(!backend.write32(Region::Framebuffer, 0, 1));

    // Second teardown has nothing left to release.
    backend.teardown();
    assert_eq!(backend.read32(Region::InstanceRam, 0), None);
}

#[test]
fn torn_down_backend_reads_the_sentinel_through_the_router() {
    let mut router = attached_router();
    router.teardown();
    assert_eq!(router.read32(nv3::PMC_BOOT_0), INVALID_READ);
}
