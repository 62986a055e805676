//! The GPU's logical MMIO address space and its two interchangeable backends.
//!
//! Early NVIDIA parts expose three physically distinct apertures: control
//! registers (BAR0), the framebuffer (BAR1), and an instance-RAM window at a
//! fixed offset inside BAR1. [`MmioRouter`] multiplexes all three behind one
//! `read32`/`write32` interface keyed by a flat 32-bit logical address, and
//! fails closed (all-ones reads, dropped writes) for anything outside the
//! mapped regions.
//!
//! Two backends implement [`RegionBackend`] with identical external
//! contracts:
//! - [`DevMemBackend`] maps the real apertures through `/dev/mem`, and
//! - [`VirtualBackend`] models them in process memory, pre-seeded so the
//!   bring-up sequencer sees a plausible NV3 revision B0.

pub mod real;
pub mod region;
pub mod router;
pub mod virt;

pub use real::{DevMemBackend, MapError, DEV_MEM_PATH};
pub use region::{
    Region, CONTROL_SIZE, FRAMEBUFFER_BASE, FRAMEBUFFER_SIZE, INSTANCE_RAM_BAR1_OFFSET,
    INSTANCE_RAM_BASE, INSTANCE_RAM_SIZE,
};
pub use router::{MmioRouter, RegionBackend, INVALID_READ};
pub use virt::VirtualBackend;
