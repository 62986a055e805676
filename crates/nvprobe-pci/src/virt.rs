//! Virtual PCI access: one emulated device behind a configuration snapshot.

use crate::{check_access, ConfigAccessError, PciAccess, PciDeviceInfo, PciLocation};

/// Where the virtual device claims its control-register aperture lives.
pub const VIRTUAL_BAR0_BASE: u32 = 0xF000_0000;
/// Where the virtual device claims its framebuffer aperture lives.
pub const VIRTUAL_BAR1_BASE: u32 = 0xF800_0000;

const CFG_COMMAND: usize = 0x04;
const CFG_STATUS: usize = 0x06;
const CFG_REVISION: usize = 0x08;
const CFG_CLASS_BASE: usize = 0x0B;
const CFG_BAR0: usize = 0x10;
const CFG_BAR1: usize = 0x14;

/// A single virtual device at `00:00.0` with a fixed 256-byte configuration
/// snapshot. All reads are served from the snapshot regardless of the
/// requested location; there is exactly one device to talk to.
pub struct VirtualPci {
    config: [u8; 256],
    info: PciDeviceInfo,
}

impl VirtualPci {
    pub fn with_device(vendor_id: u16, device_id: u16) -> VirtualPci {
        let mut config = [0u8; 256];
        config[0..2].copy_from_slice(&vendor_id.to_le_bytes());
        config[2..4].copy_from_slice(&device_id.to_le_bytes());
        // Command: I/O and memory space enabled.
        config[CFG_COMMAND..CFG_COMMAND + 2].copy_from_slice(&0x0003u16.to_le_bytes());
        // Status: 66 MHz capable.
        config[CFG_STATUS..CFG_STATUS + 2].copy_from_slice(&0x2000u16.to_le_bytes());
        // Revision B0 silicon.
        config[CFG_REVISION] = 0x10;
        // Class: display controller.
        config[CFG_CLASS_BASE] = 0x03;
        config[CFG_BAR0..CFG_BAR0 + 4].copy_from_slice(&VIRTUAL_BAR0_BASE.to_le_bytes());
        config[CFG_BAR1..CFG_BAR1 + 4].copy_from_slice(&VIRTUAL_BAR1_BASE.to_le_bytes());

        tracing::info!("virtual PCI device {vendor_id:04x}:{device_id:04x} registered at 00:00.0");
        VirtualPci {
            config,
            info: PciDeviceInfo {
                location: PciLocation::new(0, 0, 0),
                vendor_id,
                device_id,
            },
        }
    }
}

impl PciAccess for VirtualPci {
    fn devices(&self) -> Vec<PciDeviceInfo> {
        vec![self.info]
    }

    fn read_config8(&self, _location: PciLocation, offset: u16) -> Result<u8, ConfigAccessError> {
        check_access(offset, 1)?;
        let value = self.config[usize::from(offset)];
        tracing::debug!("virtual config read8 [{offset:#04x}] = {value:#04x}");
        Ok(value)
    }

    fn read_config16(&self, _location: PciLocation, offset: u16) -> Result<u16, ConfigAccessError> {
        check_access(offset, 2)?;
        let offset = usize::from(offset);
        let value = u16::from_le_bytes([self.config[offset], self.config[offset + 1]]);
        tracing::debug!("virtual config read16 [{offset:#04x}] = {value:#06x}");
        Ok(value)
    }

    fn read_config32(&self, _location: PciLocation, offset: u16) -> Result<u32, ConfigAccessError> {
        check_access(offset, 4)?;
        let offset = usize::from(offset);
        let mut bytes = [0u8; 4];
        bytes.copy_from_slice(&self.config[offset..offset + 4]);
        let value = u32::from_le_bytes(bytes);
        tracing::debug!("virtual config read32 [{offset:#04x}] = {value:#010x}");
        Ok(value)
    }
}
