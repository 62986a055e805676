//! Virtual backend: the three apertures modelled in process memory.
//!
//! Emulation fidelity is intentionally partial: only the registers the
//! bring-up sequencer touches are seeded, and a handful of well-known writes
//! get a derived quantity logged as a side channel. The stored values behave
//! like plain RAM either way.

use nvprobe_regs::nv3::{
    self, Crystal, PllCoefficient, PMC_ENABLE_ALL,
};

use crate::region::Region;
use crate::router::RegionBackend;

/// In-process register files standing in for an NV3 revision B0 with 4 MiB
/// of VRAM and the 14.31818 MHz crystal strapped.
pub struct VirtualBackend {
    control: Vec<u32>,
    framebuffer: Vec<u32>,
    instance_ram: Vec<u32>,
    active: bool,
}

impl VirtualBackend {
    pub fn new() -> VirtualBackend {
        let mut backend = VirtualBackend {
            control: vec![0; (Region::Control.size() / 4) as usize],
            framebuffer: vec![0; (Region::Framebuffer.size() / 4) as usize],
            instance_ram: vec![0; (Region::InstanceRam.size() / 4) as usize],
            active: true,
        };

        // Boot identification: NV3 revision B00.
        backend.seed(nv3::PMC_BOOT_0, nv3::PMC_BOOT_0_REV_B00);
        // RAM configuration: 4 MiB, 64-bit wide, 2 banks.
        backend.seed(nv3::PFB_BOOT_0, 0b10);
        // Straps: 14.31818 MHz crystal, 66 MHz bus, BIOS present.
        backend.seed(nv3::PSTRAPS, (1 << 6) | (1 << 1) | (1 << 0));
        // Power-on memory clock coefficient.
        backend.seed(nv3::PRAMDAC_MPLL_COEFF, nv3::MPLL_DEFAULT);

        tracing::info!("virtual NV3 device model initialized");
        backend
    }

    fn seed(&mut self, offset: u32, value: u32) {
        self.control[(offset / 4) as usize] = value;
    }

    fn words(&self, region: Region) -> Option<&Vec<u32>> {
        if !self.active {
            return None;
        }
        Some(match region {
            Region::Control => &self.control,
            Region::Framebuffer => &self.framebuffer,
            Region::InstanceRam => &self.instance_ram,
        })
    }

    fn words_mut(&mut self, region: Region) -> Option<&mut Vec<u32>> {
        if !self.active {
            return None;
        }
        Some(match region {
            Region::Control => &mut self.control,
            Region::Framebuffer => &mut self.framebuffer,
            Region::InstanceRam => &mut self.instance_ram,
        })
    }

    fn log_control_read(offset: u32, value: u32) {
        match offset {
            nv3::PMC_BOOT_0 => tracing::debug!("read PMC_BOOT_0 = {value:#010x}"),
            nv3::PFB_BOOT_0 => tracing::debug!("read PFB_BOOT_0 = {value:#010x}"),
            nv3::PSTRAPS => tracing::debug!("read PSTRAPS = {value:#010x}"),
            _ => {}
        }
    }

    /// Observability side effects for writes the sequencer performs. The
    /// stored register value is not affected by any of this.
    fn log_control_write(offset: u32, value: u32) {
        match offset {
            nv3::PMC_ENABLE => {
                if value == PMC_ENABLE_ALL {
                    tracing::info!("PMC_ENABLE = {value:#010x} (all subsystems enabled)");
                } else {
                    tracing::info!("PMC_ENABLE = {value:#010x} (partial subsystem enable)");
                }
            }
            nv3::PMC_INTR_EN_0 => {
                let state = if value & 0x3 != 0 { "enabled" } else { "disabled" };
                tracing::info!("PMC_INTR_EN_0 = {value:#010x} (interrupts {state})");
            }
            nv3::PRAMDAC_MPLL_COEFF => {
                // The emulated part straps the 14.31818 MHz crystal.
                let coeff = PllCoefficient::unpack(value);
                let mhz = coeff.frequency_hz(Crystal::Khz14318) / 1_000_000.0;
                tracing::info!("PRAMDAC_MPLL_COEFF = {value:#010x} (MCLK ~{mhz:.2} MHz)");
            }
            _ => {}
        }
    }
}

impl Default for VirtualBackend {
    fn default() -> Self {
        VirtualBackend::new()
    }
}

impl RegionBackend for VirtualBackend {
    fn read32(&self, region: Region, offset: u32) -> Option<u32> {
        // Word-addressed, like the hardware mappings: unaligned offsets fault
        // instead of being truncated to the containing word.
        if offset % 4 != 0 {
            return None;
        }
        let value = *self.words(region)?.get((offset / 4) as usize)?;
        if region == Region::Control {
            Self::log_control_read(offset, value);
        }
        Some(value)
    }

    fn write32(&mut self, region: Region, offset: u32, value: u32) -> bool {
        if offset % 4 != 0 {
            return false;
        }
        let Some(words) = self.words_mut(region) else {
            return false;
        };
        let Some(slot) = words.get_mut((offset / 4) as usize) else {
            return false;
        };
        *slot = value;
        if region == Region::Control {
            Self::log_control_write(offset, value);
        }
        true
    }

    fn teardown(&mut self) {
        if self.active {
            self.control = Vec::new();
            self.framebuffer = Vec::new();
            self.instance_ram = Vec::new();
            self.active = false;
            tracing::info!("virtual device model released");
        }
    }
}
