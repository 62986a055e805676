//! Full bring-up against the virtual device model: detection through the
//! clock-stability sweep, with every observable register checked afterwards.

use std::time::Duration;

use nvprobe_bringup::{detect, BackendKind, BringupOptions, DeviceSession, SweepConfig};
use nvprobe_mmio::INVALID_READ;
use nvprobe_pci::VirtualPci;
use nvprobe_regs::nv3 as regs;
use nvprobe_regs::pci_ids::{PCI_DEVICE_NV3, PCI_VENDOR_SGS_NVIDIA};
use nvprobe_regs::{Crystal, VramSize};

fn options() -> BringupOptions {
    BringupOptions {
        backend: BackendKind::Virtual,
        sweep: SweepConfig {
            dwell: Duration::ZERO,
            cancel: None,
        },
    }
}

fn brought_up_session() -> DeviceSession {
    let pci = VirtualPci::with_device(PCI_VENDOR_SGS_NVIDIA, PCI_DEVICE_NV3);
    let (model, location) = detect(&pci).expect("virtual NV3 must be detected");
    let mut session = DeviceSession::new(model, location);
    let bring_up = model.bringup.expect("NV3 has a bring-up entry point");
    bring_up(&mut session, &pci, &options()).expect("virtual bring-up cannot fail to map");
    session
}

#[test]
fn identify_reads_the_seeded_boot_words() {
    let session = brought_up_session();
    assert_eq!(session.pmc_boot_0, regs::PMC_BOOT_0_REV_B00);
    assert_eq!(session.pfb_boot_0, 0b10);
}

#[test]
fn vram_resolves_to_the_seeded_4_mib_configuration() {
    let session = brought_up_session();
    assert_eq!(session.vram_size, Some(VramSize::Mib4));
}

#[test]
fn straps_resolve_to_the_14318_crystal() {
    let session = brought_up_session();
    let straps = session.straps.expect("straps read during bring-up");
    assert_eq!(straps.crystal, Crystal::Khz14318);
    assert!(straps.bus_66mhz);
    assert!(straps.bios_present);
}

#[test]
fn power_up_and_interrupt_enables_land_at_the_documented_offsets() {
    let session = brought_up_session();
    assert_eq!(session.router.read32(regs::PMC_ENABLE), regs::PMC_ENABLE_ALL);
    assert_eq!(
        session.router.read32(regs::PMC_INTR_EN_0),
        regs::PMC_INTR_EN_HARDWARE | regs::PMC_INTR_EN_SOFTWARE
    );
}

#[test]
fn sweep_ends_on_the_nominal_coefficient_for_the_strapped_crystal() {
    let session = brought_up_session();
    assert_eq!(
        session.router.read32(regs::PRAMDAC_MPLL_COEFF),
        regs::MPLL_NOMINAL_14318
    );
}

#[test]
fn teardown_releases_the_model_and_later_accesses_fault() {
    let mut session = brought_up_session();
    session.teardown();
    assert_eq!(session.router.read32(regs::PMC_BOOT_0), INVALID_READ);
    // Idempotent: nothing left to release.
    session.teardown();
}
