//! Static capability table and the detection scan.

use nvprobe_pci::{PciAccess, PciLocation};
use nvprobe_regs::pci_ids::*;

use crate::nv3;
use crate::session::{BringupOptions, DeviceSession};

pub type BringupFn =
    fn(&mut DeviceSession, &dyn PciAccess, &BringupOptions) -> Result<(), nv3::BringupError>;

/// One supported silicon variant. A missing `bringup` entry point means
/// "detected but unsupported", which is a valid state rather than an error.
pub struct GpuModel {
    pub vendor_id: u16,
    pub device_id: u16,
    pub name: &'static str,
    pub bringup: Option<BringupFn>,
}

/// Probe order matters: the scan stops at the first identity present, so
/// this table is a priority list.
pub static SUPPORTED_GPUS: &[GpuModel] = &[
    GpuModel {
        vendor_id: PCI_VENDOR_SGS,
        device_id: PCI_DEVICE_NV1,
        name: "NV1 (STG-2000 DRAM version)",
        bringup: None,
    },
    GpuModel {
        vendor_id: PCI_VENDOR_NVIDIA,
        device_id: PCI_DEVICE_NV1,
        name: "NV1 (VRAM version)",
        bringup: None,
    },
    GpuModel {
        vendor_id: PCI_VENDOR_NVIDIA,
        device_id: PCI_DEVICE_NV2,
        name: "NV2 (Mutara V08, never released)",
        bringup: None,
    },
    GpuModel {
        vendor_id: PCI_VENDOR_SGS_NVIDIA,
        device_id: PCI_DEVICE_NV3,
        name: "Riva 128 (NV3), or Riva 128 ZX without ACPI support (NV3T)",
        bringup: Some(nv3::bring_up),
    },
    GpuModel {
        vendor_id: PCI_VENDOR_SGS_NVIDIA,
        device_id: PCI_DEVICE_NV3T_ACPI,
        name: "Riva 128 ZX with ACPI support (NV3T)",
        bringup: Some(nv3::bring_up),
    },
    GpuModel {
        vendor_id: PCI_VENDOR_NVIDIA,
        device_id: PCI_DEVICE_NV4,
        name: "Riva TNT (NV4)",
        bringup: None,
    },
    GpuModel {
        vendor_id: PCI_VENDOR_NVIDIA,
        device_id: PCI_DEVICE_NV5,
        name: "Riva TNT2 / TNT2 Pro (NV5)",
        bringup: None,
    },
    GpuModel {
        vendor_id: PCI_VENDOR_NVIDIA,
        device_id: PCI_DEVICE_NV5_ULTRA,
        name: "Riva TNT2 Ultra (NV5)",
        bringup: None,
    },
    GpuModel {
        vendor_id: PCI_VENDOR_NVIDIA,
        device_id: PCI_DEVICE_NV5_VANTA,
        name: "Vanta (Riva TNT2 derivative)",
        bringup: None,
    },
    GpuModel {
        vendor_id: PCI_VENDOR_NVIDIA,
        device_id: PCI_DEVICE_NV6,
        name: "Riva TNT2 M64 (NV6)",
        bringup: None,
    },
    GpuModel {
        vendor_id: PCI_VENDOR_NVIDIA,
        device_id: PCI_DEVICE_NV10,
        name: "GeForce 256 with SDRAM (NV10)",
        bringup: None,
    },
    GpuModel {
        vendor_id: PCI_VENDOR_NVIDIA,
        device_id: PCI_DEVICE_NV10_DDR,
        name: "GeForce 256 with DDR (NV10)",
        bringup: None,
    },
    GpuModel {
        vendor_id: PCI_VENDOR_NVIDIA,
        device_id: PCI_DEVICE_NV10_QUADRO,
        name: "Quadro (NV10GL)",
        bringup: None,
    },
];

/// Scans the capability table in priority order; the first identity the PCI
/// layer can find wins. `None` is a normal, reportable outcome.
pub fn detect(pci: &dyn PciAccess) -> Option<(&'static GpuModel, PciLocation)> {
    for model in SUPPORTED_GPUS {
        tracing::debug!("probing for {}", model.name);
        if let Some(location) = pci.find_device(model.vendor_id, model.device_id) {
            tracing::info!(
                "detected {} ({:04x}:{:04x}) at {location}",
                model.name,
                model.vendor_id,
                model.device_id
            );
            return Some((model, location));
        }
    }
    tracing::info!("no supported NVIDIA GPU found");
    None
}
