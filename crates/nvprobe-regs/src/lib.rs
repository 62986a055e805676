//! Register-level constants and bit-field decoding for early NVIDIA GPUs.
//!
//! This crate is pure data and pure functions: MMIO register offsets, PCI
//! identities, and the decode logic for the hardware words the bring-up
//! sequencer reads (`PFB_BOOT_0` VRAM sizing, `PSTRAPS` straps, PLL
//! coefficients). No I/O happens here, which keeps every decode testable
//! without a device model.
#![forbid(unsafe_code)]

pub mod nv3;
pub mod pci_ids;

pub use nv3::{
    decode_vram_size, Crystal, PllCoefficient, StrapInfo, Straps, VramDecodeError, VramSize,
};
