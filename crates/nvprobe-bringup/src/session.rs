//! Per-device bring-up state.

use nvprobe_mmio::MmioRouter;
use nvprobe_pci::PciLocation;
use nvprobe_regs::{StrapInfo, VramSize};

use crate::nv3::SweepConfig;
use crate::table::GpuModel;

/// Which register backend to stand up during the Map phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// `/dev/mem` mappings of the real apertures.
    Real,
    /// The in-process device model.
    Virtual,
}

/// Knobs the caller picks at process construction time.
#[derive(Debug, Clone)]
pub struct BringupOptions {
    pub backend: BackendKind,
    pub sweep: SweepConfig,
}

/// Everything bring-up learns about the selected device, mutated phase by
/// phase. The router owns the active backend and therefore the mappings, so
/// dropping the session releases every hardware resource exactly once.
pub struct DeviceSession {
    pub model: &'static GpuModel,
    pub location: PciLocation,
    pub router: MmioRouter,
    /// Raw boot/revision word (`PMC_BOOT_0`), zero until Identify.
    pub pmc_boot_0: u32,
    /// Raw RAM-configuration word (`PFB_BOOT_0`), zero until Identify.
    pub pfb_boot_0: u32,
    pub vram_size: Option<VramSize>,
    pub straps: Option<StrapInfo>,
}

impl DeviceSession {
    pub fn new(model: &'static GpuModel, location: PciLocation) -> DeviceSession {
        DeviceSession {
            model,
            location,
            router: MmioRouter::unattached(),
            pmc_boot_0: 0,
            pfb_boot_0: 0,
            vram_size: None,
            straps: None,
        }
    }

    /// Explicit early teardown; also runs implicitly on drop. Idempotent.
    pub fn teardown(&mut self) {
        self.router.teardown();
    }
}
