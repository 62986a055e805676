//! NV3 (Riva 128 / 128 ZX) register map and field decoding.
//!
//! Offsets are into BAR0 (the control-register aperture). Only the registers
//! the bring-up path touches are defined; this is not a full register file.

use thiserror::Error;

// PMC (master control).
pub const PMC_BOOT_0: u32 = 0x000000; // chip id / revision
pub const PMC_INTR_EN_0: u32 = 0x000140;
pub const PMC_ENABLE: u32 = 0x000200;

/// `PMC_BOOT_0` value of an NV3 revision B00 part.
pub const PMC_BOOT_0_REV_B00: u32 = 0x0003_0110;

/// Enable pattern for every PMC-gated subsystem at once.
pub const PMC_ENABLE_ALL: u32 = 0x1111_1111;

pub const PMC_INTR_EN_HARDWARE: u32 = 1 << 0;
pub const PMC_INTR_EN_SOFTWARE: u32 = 1 << 1;

// PFB (framebuffer controller).
pub const PFB_BOOT_0: u32 = 0x100000; // RAM configuration sampled at power-up

// Straps.
pub const PSTRAPS: u32 = 0x101000;

// PRAMDAC clock generators.
pub const PRAMDAC_VPLL_COEFF: u32 = 0x680500; // pixel clock
pub const PRAMDAC_MPLL_COEFF: u32 = 0x680504; // memory clock

/// Nominal (~100 MHz) memory-clock coefficient for a 13.5 MHz crystal.
pub const MPLL_NOMINAL_13500: u32 = 0x01_A3_0B;
/// Nominal (~100 MHz) memory-clock coefficient for a 14.31818 MHz crystal.
pub const MPLL_NOMINAL_14318: u32 = 0x01_C4_0E;
/// Power-on default memory-clock coefficient observed on retail boards.
pub const MPLL_DEFAULT: u32 = 0x0E_C4_0E;

// `PFB_BOOT_0` fields used for VRAM sizing.
pub const PFB_BOOT_RAM_AMOUNT_SHIFT: u32 = 0;
pub const PFB_BOOT_RAM_AMOUNT_MASK: u32 = 0x3;
pub const PFB_BOOT_RAM_EXTENSION_SHIFT: u32 = 5;

/// Installed VRAM, as decoded from `PFB_BOOT_0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VramSize {
    Mib1,
    Mib2,
    Mib4,
    Mib8,
}

impl VramSize {
    pub fn bytes(self) -> u32 {
        match self {
            VramSize::Mib1 => 0x10_0000,
            VramSize::Mib2 => 0x20_0000,
            VramSize::Mib4 => 0x40_0000,
            VramSize::Mib8 => 0x80_0000,
        }
    }

    pub fn mib(self) -> u32 {
        self.bytes() >> 20
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum VramDecodeError {
    /// The RAM amount code matches none of the documented configurations.
    /// Known silicon never reports this; surfacing it beats guessing a size.
    #[error("unresolved RAM amount code {amount:#04b} in PFB_BOOT_0 {raw:#010x}")]
    Unresolved { raw: u32, amount: u32 },
}

/// Decodes installed VRAM from `PFB_BOOT_0`.
///
/// The amount field is two bits; code `0b00` is disambiguated by the NV3T
/// 8 MiB extension strap. Code `0b11` is undocumented and reported as
/// [`VramDecodeError::Unresolved`] rather than mapped to a default.
pub fn decode_vram_size(pfb_boot_0: u32) -> Result<VramSize, VramDecodeError> {
    let amount = (pfb_boot_0 >> PFB_BOOT_RAM_AMOUNT_SHIFT) & PFB_BOOT_RAM_AMOUNT_MASK;
    let extension_8mib = (pfb_boot_0 >> PFB_BOOT_RAM_EXTENSION_SHIFT) & 0x1 != 0;

    match (amount, extension_8mib) {
        (0b00, true) => Ok(VramSize::Mib8),  // Riva 128 ZX
        (0b00, false) => Ok(VramSize::Mib1), // never shipped
        (0b01, _) => Ok(VramSize::Mib2),     // single NEC OEM card
        (0b10, _) => Ok(VramSize::Mib4),     // most Riva 128s
        _ => Err(VramDecodeError::Unresolved {
            raw: pfb_boot_0,
            amount,
        }),
    }
}

bitflags::bitflags! {
    /// Power-up strap bits sampled into `PSTRAPS`. Read-only at runtime.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Straps: u32 {
        const BIOS_PRESENT = 1 << 0;
        const BUS_66MHZ = 1 << 1;
        const CRYSTAL_14318 = 1 << 6;
    }
}

/// Crystal oscillator selection (strap bit 6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Crystal {
    Khz13500,
    Khz14318,
}

impl Crystal {
    pub fn hz(self) -> f64 {
        match self {
            Crystal::Khz13500 => 13_500_000.0,
            Crystal::Khz14318 => 14_318_180.0,
        }
    }
}

/// Decoded view of `PSTRAPS`, keeping the raw word for fields we don't model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrapInfo {
    pub raw: u32,
    pub crystal: Crystal,
    pub bus_66mhz: bool,
    pub bios_present: bool,
}

impl StrapInfo {
    pub fn decode(raw: u32) -> Self {
        let straps = Straps::from_bits_retain(raw);
        let crystal = if straps.contains(Straps::CRYSTAL_14318) {
            Crystal::Khz14318
        } else {
            Crystal::Khz13500
        };
        StrapInfo {
            raw,
            crystal,
            bus_66mhz: straps.contains(Straps::BUS_66MHZ),
            bios_present: straps.contains(Straps::BIOS_PRESENT),
        }
    }
}

/// A packed PLL coefficient: `(p << 16) | (n << 8) | m`.
///
/// The generated frequency is `crystal * n / (m * 2^p)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PllCoefficient {
    pub m: u8,
    pub n: u8,
    pub p: u8,
}

impl PllCoefficient {
    pub fn pack(self) -> u32 {
        (u32::from(self.p & 0x7) << 16) | (u32::from(self.n) << 8) | u32::from(self.m)
    }

    pub fn unpack(word: u32) -> Self {
        PllCoefficient {
            m: word as u8,
            n: (word >> 8) as u8,
            p: ((word >> 16) & 0x7) as u8,
        }
    }

    /// Approximate output frequency in Hz for the given crystal.
    pub fn frequency_hz(self, crystal: Crystal) -> f64 {
        (crystal.hz() * f64::from(self.n)) / (f64::from(self.m) * f64::from(1u32 << self.p))
    }
}
