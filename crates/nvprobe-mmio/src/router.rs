//! Address router: one `read32`/`write32` interface over the three apertures.

use crate::region::Region;

/// Value returned for any faulting read. Consumers treat this as the
/// documented "invalid read" signal, so it must stay exact.
pub const INVALID_READ: u32 = 0xFFFF_FFFF;

/// Storage behind the router. Implementations return `None`/`false` when the
/// addressed region is not (or no longer) available; the router turns that
/// into the fail-closed contract.
pub trait RegionBackend {
    fn read32(&self, region: Region, offset: u32) -> Option<u32>;
    fn write32(&mut self, region: Region, offset: u32, value: u32) -> bool;

    /// Releases every resource the backend holds. Must be idempotent.
    fn teardown(&mut self);
}

/// Routes 32-bit register accesses to whichever backend is attached.
///
/// Faulting accesses (addresses outside all regions, or accesses before a
/// backend is attached / after teardown) read as [`INVALID_READ`] and drop
/// writes, with a warning logged. No access ever panics.
pub struct MmioRouter {
    backend: Option<Box<dyn RegionBackend>>,
}

impl MmioRouter {
    pub fn unattached() -> Self {
        MmioRouter { backend: None }
    }

    pub fn attach(&mut self, backend: Box<dyn RegionBackend>) {
        self.backend = Some(backend);
    }

    pub fn is_attached(&self) -> bool {
        self.backend.is_some()
    }

    pub fn read32(&self, addr: u32) -> u32 {
        let Some((region, offset)) = Region::locate(addr) else {
            tracing::warn!("invalid MMIO read address {addr:#010x}");
            return INVALID_READ;
        };
        let value = self
            .backend
            .as_ref()
            .and_then(|backend| backend.read32(region, offset));
        match value {
            Some(value) => value,
            None => {
                tracing::warn!("MMIO read {addr:#010x} before {region:?} was mapped");
                INVALID_READ
            }
        }
    }

    pub fn write32(&mut self, addr: u32, value: u32) {
        let Some((region, offset)) = Region::locate(addr) else {
            tracing::warn!("invalid MMIO write address {addr:#010x} (value {value:#010x})");
            return;
        };
        let accepted = self
            .backend
            .as_mut()
            .map(|backend| backend.write32(region, offset, value))
            .unwrap_or(false);
        if !accepted {
            tracing::warn!("MMIO write {addr:#010x} dropped: {region:?} not mapped");
        }
    }

    /// Tears down and detaches the backend. Safe to call repeatedly; later
    /// accesses fault as if the router was never attached.
    pub fn teardown(&mut self) {
        if let Some(mut backend) = self.backend.take() {
            backend.teardown();
        }
    }
}

impl Drop for MmioRouter {
    fn drop(&mut self) {
        self.teardown();
    }
}
