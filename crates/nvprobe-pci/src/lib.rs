//! PCI device enumeration and configuration-space access.
//!
//! Two implementations share the [`PciAccess`] contract: [`SysfsPci`] walks
//! the kernel's `/sys/bus/pci/devices` tree, and [`VirtualPci`] serves a
//! single in-process 256-byte configuration snapshot so everything above it
//! can run without hardware. Higher layers depend only on the trait.
#![forbid(unsafe_code)]

use std::fmt;

use thiserror::Error;

pub mod sysfs;
pub mod virt;

pub use sysfs::{PciInitError, SysfsPci, SYSFS_PCI_DEVICES};
pub use virt::{VirtualPci, VIRTUAL_BAR0_BASE, VIRTUAL_BAR1_BASE};

pub const PCI_CONFIG_SPACE_SIZE: u16 = 256;

/// Bus/device/function address of a device (domain 0 only).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PciLocation {
    pub bus: u8,
    pub devfn: u8,
}

impl PciLocation {
    pub fn new(bus: u8, device: u8, function: u8) -> PciLocation {
        PciLocation {
            bus,
            devfn: (device << 3) | (function & 0x7),
        }
    }

    pub fn device(self) -> u8 {
        self.devfn >> 3
    }

    pub fn function(self) -> u8 {
        self.devfn & 0x7
    }
}

impl fmt::Display for PciLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02x}:{:02x}.{}", self.bus, self.device(), self.function())
    }
}

/// Identity of one enumerated device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PciDeviceInfo {
    pub location: PciLocation,
    pub vendor_id: u16,
    pub device_id: u16,
}

#[derive(Debug, Error)]
pub enum ConfigAccessError {
    /// The offset is not aligned to the access width. Detected before any
    /// underlying access happens.
    #[error("misaligned {width}-bit config read at offset {offset:#x}")]
    Misaligned { offset: u16, width: u32 },
    #[error("config offset {offset:#x} out of range for a {width}-bit read")]
    OutOfRange { offset: u16, width: u32 },
    #[error("no PCI device at {0}")]
    NoSuchDevice(PciLocation),
    #[error("config space I/O failed for {location}: {source}")]
    Io {
        location: PciLocation,
        #[source]
        source: std::io::Error,
    },
}

/// Validates alignment and range for an access of `width_bytes`. Runs before
/// the implementation touches any resource.
fn check_access(offset: u16, width_bytes: u16) -> Result<(), ConfigAccessError> {
    let width = u32::from(width_bytes) * 8;
    if offset % width_bytes != 0 {
        return Err(ConfigAccessError::Misaligned { offset, width });
    }
    if u32::from(offset) + u32::from(width_bytes) > u32::from(PCI_CONFIG_SPACE_SIZE) {
        return Err(ConfigAccessError::OutOfRange { offset, width });
    }
    Ok(())
}

/// Enumeration plus configuration-space reads, real or virtual.
pub trait PciAccess {
    fn devices(&self) -> Vec<PciDeviceInfo>;

    /// First enumerated device with the given identity, if any.
    fn find_device(&self, vendor_id: u16, device_id: u16) -> Option<PciLocation> {
        self.devices()
            .iter()
            .find(|dev| dev.vendor_id == vendor_id && dev.device_id == device_id)
            .map(|dev| dev.location)
    }

    fn read_config8(&self, location: PciLocation, offset: u16) -> Result<u8, ConfigAccessError>;
    fn read_config16(&self, location: PciLocation, offset: u16) -> Result<u16, ConfigAccessError>;
    fn read_config32(&self, location: PciLocation, offset: u16) -> Result<u32, ConfigAccessError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_access_flags_misalignment_before_range() {
        assert!(matches!(
            check_access(0x101, 2),
            Err(ConfigAccessError::Misaligned { offset: 0x101, width: 16 })
        ));
        assert!(matches!(
            check_access(0x100, 4),
            Err(ConfigAccessError::OutOfRange { offset: 0x100, width: 32 })
        ));
        assert!(check_access(0xFC, 4).is_ok());
        assert!(check_access(0xFF, 1).is_ok());
    }

    #[test]
    fn location_packs_device_and_function() {
        let loc = PciLocation::new(1, 2, 3);
        assert_eq!(loc.device(), 2);
        assert_eq!(loc.function(), 3);
        assert_eq!(loc.to_string(), "01:02.3");
    }
}
