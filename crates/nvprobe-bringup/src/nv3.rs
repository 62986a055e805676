//! NV3 (Riva 128 / 128 ZX) bring-up sequence and memory-clock sweep.
//!
//! The sequence is linear with no backward transitions: Locate → Map →
//! Identify → Size VRAM → Read Straps → Power Up → Enable Interrupts →
//! Stability Check. Only a Map failure aborts; later anomalies are logged
//! and the sequence keeps going, because partial or uncertain hardware state
//! is the normal condition during bring-up.

use std::thread;
use std::time::Duration;

use nvprobe_mmio::{DevMemBackend, MapError, MmioRouter, RegionBackend, VirtualBackend};
use nvprobe_pci::{PciAccess, PciLocation};
use nvprobe_regs::nv3 as regs;
use nvprobe_regs::pci_ids::{BAR_BASE_MASK, PCI_CFG_OFFSET_BAR0, PCI_CFG_OFFSET_BAR1};
use nvprobe_regs::{decode_vram_size, Crystal, PllCoefficient, StrapInfo};
use thiserror::Error;

use crate::session::{BackendKind, BringupOptions, DeviceSession};

#[derive(Debug, Error)]
pub enum BringupError {
    /// Map-phase failure. The only fatal condition in the sequence.
    #[error("MMIO mapping failed: {0}")]
    Map(#[from] MapError),
}

/// How the memory-clock sweep paces itself and when it gives up early.
#[derive(Debug, Clone)]
pub struct SweepConfig {
    /// How long each candidate coefficient is held before the next step.
    pub dwell: Duration,
    /// Polled between steps and during each hold. When it reports `true`,
    /// the sweep restores the nominal coefficient and returns early, so a
    /// cancellation request never leaves the card on an overclock step.
    pub cancel: Option<fn() -> bool>,
}

impl SweepConfig {
    fn cancelled(&self) -> bool {
        self.cancel.map(|requested| requested()).unwrap_or(false)
    }
}

impl Default for SweepConfig {
    fn default() -> SweepConfig {
        SweepConfig {
            dwell: Duration::from_secs(5),
            cancel: None,
        }
    }
}

/// Highest `n` divider tried by the sweep (inclusive).
pub const SWEEP_DIVIDER_MAX: u8 = 0xFF;

struct SweepParams {
    m: u8,
    p: u8,
    n_start: u8,
    nominal: u32,
}

fn sweep_params(crystal: Crystal) -> SweepParams {
    match crystal {
        Crystal::Khz13500 => SweepParams {
            m: 0x0B,
            p: 0x01,
            n_start: 0xA3,
            nominal: regs::MPLL_NOMINAL_13500,
        },
        // The higher base clock starts further up the divider range so both
        // crystals open the sweep at their ~100 MHz nominal point.
        Crystal::Khz14318 => SweepParams {
            m: 0x0E,
            p: 0x01,
            n_start: 0xC4,
            nominal: regs::MPLL_NOMINAL_14318,
        },
    }
}

/// The exact coefficients the sweep writes, in order. Only `n` varies across
/// the sweep; the `m` and `p` divider fields stay fixed for a given crystal.
pub fn sweep_steps(crystal: Crystal) -> impl Iterator<Item = PllCoefficient> {
    let params = sweep_params(crystal);
    (params.n_start..=SWEEP_DIVIDER_MAX).map(move |n| PllCoefficient {
        m: params.m,
        n,
        p: params.p,
    })
}

/// Nominal (~100 MHz) coefficient restored after the sweep.
pub fn nominal_coefficient(crystal: Crystal) -> u32 {
    sweep_params(crystal).nominal
}

/// Granularity at which a dwelling sweep notices a cancellation request.
const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Holds the current step for the dwell interval, polling for cancellation.
/// Returns `false` if the hold was cut short by a cancellation request.
fn hold_step(config: &SweepConfig) -> bool {
    let mut remaining = config.dwell;
    loop {
        if config.cancelled() {
            return false;
        }
        if remaining.is_zero() {
            return true;
        }
        let slice = remaining.min(CANCEL_POLL_INTERVAL);
        thread::sleep(slice);
        remaining -= slice;
    }
}

/// Empirical clock-stability sweep: hold each candidate memory-clock
/// coefficient for the dwell interval, walking upward from the nominal point
/// one integer divider step at a time. There is no rollback on a bad step
/// (the GPU either survives or needs a power cycle) and no crash detection.
/// The nominal coefficient is restored on completion and on cancellation.
pub fn sweep_memory_clock(router: &mut MmioRouter, crystal: Crystal, config: &SweepConfig) {
    tracing::info!(
        "memory-clock stability sweep: {}s per step, crystal {:?}",
        config.dwell.as_secs(),
        crystal
    );
    tracing::info!("some TSMC-built Riva 128 ZX boards run at 90 MHz and overclock less");

    for coeff in sweep_steps(crystal) {
        if config.cancelled() {
            tracing::info!("memory-clock sweep cancelled");
            break;
        }
        let word = coeff.pack();
        let mhz = coeff.frequency_hz(crystal) / 1_000_000.0;
        tracing::info!("trying MCLK ~{mhz:.2} MHz (coefficient {word:#010x})");
        router.write32(regs::PRAMDAC_MPLL_COEFF, word);
        if !hold_step(config) {
            tracing::info!("memory-clock sweep cancelled");
            break;
        }
    }

    tracing::info!("restoring the nominal memory clock");
    router.write32(regs::PRAMDAC_MPLL_COEFF, nominal_coefficient(crystal));
}

/// Reads a BAR and masks it to the chip's decode granularity. A failed read
/// is logged and yields the masked all-ones pattern, like a slot with
/// nothing behind it.
fn read_bar(pci: &dyn PciAccess, location: PciLocation, offset: u16) -> u32 {
    match pci.read_config32(location, offset) {
        Ok(value) => value & BAR_BASE_MASK,
        Err(err) => {
            tracing::warn!("BAR read at {offset:#04x} failed: {err}");
            u32::MAX & BAR_BASE_MASK
        }
    }
}

/// Bring-up entry point for NV3/NV3T.
pub fn bring_up(
    session: &mut DeviceSession,
    pci: &dyn PciAccess,
    opts: &BringupOptions,
) -> Result<(), BringupError> {
    // Locate.
    let bar0 = read_bar(pci, session.location, PCI_CFG_OFFSET_BAR0);
    let bar1 = read_bar(pci, session.location, PCI_CFG_OFFSET_BAR1);
    tracing::info!("NV3 BAR0 {bar0:#010x}, BAR1 {bar1:#010x}");

    // Map. The only phase whose failure aborts the sequence.
    let backend: Box<dyn RegionBackend> = match opts.backend {
        BackendKind::Real => Box::new(DevMemBackend::init(bar0, bar1)?),
        BackendKind::Virtual => Box::new(VirtualBackend::new()),
    };
    session.router.attach(backend);

    // Identify.
    session.pmc_boot_0 = session.router.read32(regs::PMC_BOOT_0);
    session.pfb_boot_0 = session.router.read32(regs::PFB_BOOT_0);
    tracing::info!("PMC_BOOT_0 = {:#010x}", session.pmc_boot_0);
    tracing::info!("PFB_BOOT_0 = {:#010x}", session.pfb_boot_0);

    // Size VRAM. An unresolved decode is reported, never defaulted.
    match decode_vram_size(session.pfb_boot_0) {
        Ok(size) => {
            session.vram_size = Some(size);
            tracing::info!("video RAM size: {} MiB", size.mib());
        }
        Err(err) => tracing::warn!("video RAM size undetermined: {err}"),
    }

    // Read straps.
    let straps = StrapInfo::decode(session.router.read32(regs::PSTRAPS));
    tracing::info!(
        "straps = {:#010x} (crystal {:?}, 66 MHz bus: {}, BIOS: {})",
        straps.raw,
        straps.crystal,
        straps.bus_66mhz,
        straps.bios_present
    );
    session.straps = Some(straps);

    // Clock coefficients, logged for the record.
    let vpll = session.router.read32(regs::PRAMDAC_VPLL_COEFF);
    let mpll = session.router.read32(regs::PRAMDAC_MPLL_COEFF);
    tracing::info!("pixel clock coefficient  = {vpll:#010x}");
    tracing::info!("memory clock coefficient = {mpll:#010x}");

    // Power up every subsystem.
    tracing::info!("enabling all GPU subsystems");
    session
        .router
        .write32(regs::PMC_ENABLE, regs::PMC_ENABLE_ALL);

    // Enable interrupts.
    tracing::info!("enabling interrupts");
    session.router.write32(
        regs::PMC_INTR_EN_0,
        regs::PMC_INTR_EN_HARDWARE | regs::PMC_INTR_EN_SOFTWARE,
    );

    // Stability check.
    sweep_memory_clock(&mut session.router, straps.crystal, &opts.sweep);

    Ok(())
}
