//! Real backend: the three apertures mapped from physical memory.

use std::fs::{File, OpenOptions};
use std::os::fd::AsRawFd;
use std::os::unix::fs::OpenOptionsExt;

use nvprobe_regs::pci_ids::BAR_BASE_MASK;
use thiserror::Error;

use crate::region::{Region, INSTANCE_RAM_BAR1_OFFSET};
use crate::router::RegionBackend;

pub const DEV_MEM_PATH: &str = "/dev/mem";

#[derive(Debug, Error)]
pub enum MapError {
    #[error("failed to open {DEV_MEM_PATH}: {0}")]
    Open(#[source] std::io::Error),
    #[error("failed to map {region:?} ({len:#x} bytes at physical {phys:#010x}): {source}")]
    Map {
        region: Region,
        len: usize,
        phys: u64,
        #[source]
        source: std::io::Error,
    },
}

/// One `mmap`ed aperture. Unmapped exactly once, on drop.
struct Mapping {
    base: *mut u8,
    len: usize,
}

impl Mapping {
    fn new(file: &File, region: Region, phys: u64) -> Result<Mapping, MapError> {
        let len = region.size() as usize;
        // SAFETY: anonymous-address shared mapping of a file we hold open;
        // length and offset come from the fixed region layout.
        let base = unsafe {
            libc::mmap(
                std::ptr::null_mut(),
                len,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_SHARED,
                file.as_raw_fd(),
                phys as libc::off_t,
            )
        };
        if base == libc::MAP_FAILED {
            return Err(MapError::Map {
                region,
                len,
                phys,
                source: std::io::Error::last_os_error(),
            });
        }
        Ok(Mapping {
            base: base.cast(),
            len,
        })
    }

    fn read32(&self, offset: u32) -> Option<u32> {
        let offset = offset as usize;
        // Registers are word-addressed; an unaligned access faults rather
        // than dereferencing an unaligned pointer.
        if offset % 4 != 0 || offset + 4 > self.len {
            return None;
        }
        // SAFETY: in-bounds, and device registers require volatile access.
        Some(unsafe { (self.base.add(offset) as *const u32).read_volatile() })
    }

    fn write32(&self, offset: u32, value: u32) -> bool {
        let offset = offset as usize;
        if offset % 4 != 0 || offset + 4 > self.len {
            return false;
        }
        // SAFETY: as above.
        unsafe { (self.base.add(offset) as *mut u32).write_volatile(value) };
        true
    }
}

impl Drop for Mapping {
    fn drop(&mut self) {
        // SAFETY: base/len are exactly what mmap returned.
        unsafe { libc::munmap(self.base.cast(), self.len) };
    }
}

/// Backend driving real hardware through `/dev/mem`.
///
/// `init` either establishes all three mappings or unwinds everything it
/// acquired (drop order takes care of partially built state), so a failed
/// init never leaks a mapping or the file descriptor.
pub struct DevMemBackend {
    file: Option<File>,
    control: Option<Mapping>,
    framebuffer: Option<Mapping>,
    instance_ram: Option<Mapping>,
}

impl DevMemBackend {
    pub fn init(bar0: u32, bar1: u32) -> Result<DevMemBackend, MapError> {
        // Only the top byte of a BAR is decoded by the chip.
        let bar0 = u64::from(bar0 & BAR_BASE_MASK);
        let bar1 = u64::from(bar1 & BAR_BASE_MASK);

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(libc::O_SYNC)
            .open(DEV_MEM_PATH)
            .map_err(MapError::Open)?;

        let control = Mapping::new(&file, Region::Control, bar0)?;
        let framebuffer = Mapping::new(&file, Region::Framebuffer, bar1)?;
        let instance_ram = Mapping::new(
            &file,
            Region::InstanceRam,
            bar1 + u64::from(INSTANCE_RAM_BAR1_OFFSET),
        )?;

        tracing::info!(
            "mapped control at {bar0:#010x}, framebuffer at {bar1:#010x}, \
             instance RAM at {:#010x}",
            bar1 + u64::from(INSTANCE_RAM_BAR1_OFFSET)
        );

        Ok(DevMemBackend {
            file: Some(file),
            control: Some(control),
            framebuffer: Some(framebuffer),
            instance_ram: Some(instance_ram),
        })
    }

    fn mapping(&self, region: Region) -> Option<&Mapping> {
        match region {
            Region::Control => self.control.as_ref(),
            Region::Framebuffer => self.framebuffer.as_ref(),
            Region::InstanceRam => self.instance_ram.as_ref(),
        }
    }
}

impl RegionBackend for DevMemBackend {
    fn read32(&self, region: Region, offset: u32) -> Option<u32> {
        self.mapping(region)?.read32(offset)
    }

    fn write32(&mut self, region: Region, offset: u32, value: u32) -> bool {
        match self.mapping(region) {
            Some(mapping) => mapping.write32(offset, value),
            None => false,
        }
    }

    fn teardown(&mut self) {
        // Instance RAM and framebuffer alias BAR1; unmap innermost first.
        let had_mappings = self.instance_ram.take().is_some()
            | self.framebuffer.take().is_some()
            | self.control.take().is_some();
        let had_fd = self.file.take().is_some();
        if had_mappings || had_fd {
            tracing::info!("released {DEV_MEM_PATH} mappings");
        }
    }
}

impl Drop for DevMemBackend {
    fn drop(&mut self) {
        self.teardown();
    }
}
