//! PCI identities of early NVIDIA parts.

pub const PCI_VENDOR_NVIDIA: u16 = 0x10DE;
/// SGS-Thomson, used by some early NV1 boards.
pub const PCI_VENDOR_SGS: u16 = 0x104A;
/// SGS-Thomson / NVIDIA joint identity (NV3 era).
pub const PCI_VENDOR_SGS_NVIDIA: u16 = 0x12D2;

pub const PCI_DEVICE_NV1: u16 = 0x0008;
pub const PCI_DEVICE_NV1_STG: u16 = 0x0009; // STG-2000 DRAM version
pub const PCI_DEVICE_NV2: u16 = 0x0010; // never released
pub const PCI_DEVICE_NV3: u16 = 0x0018; // Riva 128, or 128 ZX without ACPI
pub const PCI_DEVICE_NV3T_ACPI: u16 = 0x0019; // Riva 128 ZX with ACPI
pub const PCI_DEVICE_NV4: u16 = 0x0020; // Riva TNT
pub const PCI_DEVICE_NV5: u16 = 0x0028; // Riva TNT2 / TNT2 Pro
pub const PCI_DEVICE_NV5_ULTRA: u16 = 0x0029;
pub const PCI_DEVICE_NV5_VANTA: u16 = 0x002C;
pub const PCI_DEVICE_NV6: u16 = 0x002D; // Riva TNT2 M64
pub const PCI_DEVICE_NV10: u16 = 0x0100; // GeForce 256 SDR
pub const PCI_DEVICE_NV10_DDR: u16 = 0x0101;
pub const PCI_DEVICE_NV10_QUADRO: u16 = 0x0103;

// Configuration-space offsets the bring-up path reads.
pub const PCI_CFG_OFFSET_BAR0: u16 = 0x10;
pub const PCI_CFG_OFFSET_BAR1: u16 = 0x14;

/// BAR alignment granularity on these parts: only the top byte of a BAR is
/// decoded by the chip.
pub const BAR_BASE_MASK: u32 = 0xFF00_0000;
