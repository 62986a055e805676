//! Real PCI access through the kernel's sysfs tree.

use std::fs;
use std::io::{Read, Seek, SeekFrom};
use std::path::PathBuf;

use thiserror::Error;

use crate::{check_access, ConfigAccessError, PciAccess, PciDeviceInfo, PciLocation};

pub const SYSFS_PCI_DEVICES: &str = "/sys/bus/pci/devices";

#[derive(Debug, Error)]
pub enum PciInitError {
    #[error("failed to scan {SYSFS_PCI_DEVICES}: {0}")]
    Scan(#[source] std::io::Error),
}

struct SysfsDevice {
    info: PciDeviceInfo,
    config_path: PathBuf,
}

/// Enumerates `/sys/bus/pci/devices` once at construction and serves config
/// reads from each device's `config` attribute.
pub struct SysfsPci {
    devices: Vec<SysfsDevice>,
}

impl SysfsPci {
    pub fn probe() -> Result<SysfsPci, PciInitError> {
        let mut devices = Vec::new();
        for entry in fs::read_dir(SYSFS_PCI_DEVICES).map_err(PciInitError::Scan)? {
            let entry = entry.map_err(PciInitError::Scan)?;
            let name = entry.file_name();
            let name = name.to_string_lossy();
            let Some(location) = parse_device_node(&name) else {
                tracing::warn!("skipping unparsable PCI node {name}");
                continue;
            };
            let path = entry.path();
            let (vendor_id, device_id) = match (
                read_hex_attr(path.join("vendor")),
                read_hex_attr(path.join("device")),
            ) {
                (Some(vendor), Some(device)) => (vendor, device),
                _ => {
                    tracing::warn!("skipping PCI node {name}: unreadable identity");
                    continue;
                }
            };
            devices.push(SysfsDevice {
                info: PciDeviceInfo {
                    location,
                    vendor_id,
                    device_id,
                },
                config_path: path.join("config"),
            });
        }
        tracing::info!("PCI scan found {} devices", devices.len());
        Ok(SysfsPci { devices })
    }

    fn device(&self, location: PciLocation) -> Result<&SysfsDevice, ConfigAccessError> {
        self.devices
            .iter()
            .find(|dev| dev.info.location == location)
            .ok_or(ConfigAccessError::NoSuchDevice(location))
    }

    fn read_bytes(
        &self,
        location: PciLocation,
        offset: u16,
        buf: &mut [u8],
    ) -> Result<(), ConfigAccessError> {
        let device = self.device(location)?;
        let io_err = |source| ConfigAccessError::Io { location, source };
        let mut file = fs::File::open(&device.config_path).map_err(io_err)?;
        file.seek(SeekFrom::Start(u64::from(offset))).map_err(io_err)?;
        file.read_exact(buf).map_err(io_err)
    }
}

impl PciAccess for SysfsPci {
    fn devices(&self) -> Vec<PciDeviceInfo> {
        self.devices.iter().map(|dev| dev.info).collect()
    }

    fn read_config8(&self, location: PciLocation, offset: u16) -> Result<u8, ConfigAccessError> {
        check_access(offset, 1)?;
        let mut buf = [0u8; 1];
        self.read_bytes(location, offset, &mut buf)?;
        Ok(buf[0])
    }

    fn read_config16(&self, location: PciLocation, offset: u16) -> Result<u16, ConfigAccessError> {
        check_access(offset, 2)?;
        let mut buf = [0u8; 2];
        self.read_bytes(location, offset, &mut buf)?;
        Ok(u16::from_le_bytes(buf))
    }

    fn read_config32(&self, location: PciLocation, offset: u16) -> Result<u32, ConfigAccessError> {
        check_access(offset, 4)?;
        let mut buf = [0u8; 4];
        self.read_bytes(location, offset, &mut buf)?;
        Ok(u32::from_le_bytes(buf))
    }
}

/// Parses a sysfs device node name (`0000:01:00.0`). Non-zero domains are
/// rejected; this tool only drives domain-0 AGP/PCI systems.
fn parse_device_node(name: &str) -> Option<PciLocation> {
    let (domain, rest) = name.split_once(':')?;
    let (bus, devfn) = rest.split_once(':')?;
    let (device, function) = devfn.split_once('.')?;
    if u16::from_str_radix(domain, 16).ok()? != 0 {
        return None;
    }
    Some(PciLocation::new(
        u8::from_str_radix(bus, 16).ok()?,
        u8::from_str_radix(device, 16).ok()?,
        u8::from_str_radix(function, 16).ok()?,
    ))
}

/// Reads a sysfs hex attribute of the form `0x10de\n`.
fn read_hex_attr(path: PathBuf) -> Option<u16> {
    let text = fs::read_to_string(path).ok()?;
    let text = text.trim();
    let text = text.strip_prefix("0x").unwrap_or(text);
    u16::from_str_radix(text, 16).ok()
}
