//! Logical address-space layout.

/// Control-register aperture: logical `[0, 0x100_0000)`, backed by BAR0.
pub const CONTROL_SIZE: u32 = 0x0100_0000;

/// Framebuffer aperture: logical `[0x100_0000, 0x180_0000)`, backed by BAR1.
pub const FRAMEBUFFER_BASE: u32 = 0x0100_0000;
pub const FRAMEBUFFER_SIZE: u32 = 0x0080_0000;

/// Instance-RAM window: logical `[0x1C0_0000, 0x200_0000)`. Physically it
/// sits inside BAR1 at [`INSTANCE_RAM_BAR1_OFFSET`]; the logical gap below it
/// is unmapped.
pub const INSTANCE_RAM_BASE: u32 = 0x01C0_0000;
pub const INSTANCE_RAM_SIZE: u32 = 0x0040_0000;
pub const INSTANCE_RAM_BAR1_OFFSET: u32 = 0x00C0_0000;

/// One of the three apertures behind the router.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    Control,
    Framebuffer,
    InstanceRam,
}

impl Region {
    pub fn size(self) -> u32 {
        match self {
            Region::Control => CONTROL_SIZE,
            Region::Framebuffer => FRAMEBUFFER_SIZE,
            Region::InstanceRam => INSTANCE_RAM_SIZE,
        }
    }

    /// Resolves a logical address to `(region, region-relative offset)`.
    /// Returns `None` for the gap between framebuffer and instance RAM and
    /// for anything past the instance-RAM limit.
    pub fn locate(addr: u32) -> Option<(Region, u32)> {
        if addr < CONTROL_SIZE {
            Some((Region::Control, addr))
        } else if addr < FRAMEBUFFER_BASE + FRAMEBUFFER_SIZE {
            Some((Region::Framebuffer, addr - FRAMEBUFFER_BASE))
        } else if (INSTANCE_RAM_BASE..INSTANCE_RAM_BASE + INSTANCE_RAM_SIZE).contains(&addr) {
            Some((Region::InstanceRam, addr - INSTANCE_RAM_BASE))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locate_rebases_each_region() {
        assert_eq!(Region::locate(0), Some((Region::Control, 0)));
        assert_eq!(Region::locate(0x00FF_FFFC), Some((Region::Control, 0x00FF_FFFC)));
        assert_eq!(Region::locate(0x0100_0000), Some((Region::Framebuffer, 0)));
        assert_eq!(Region::locate(0x0150_0000), Some((Region::Framebuffer, 0x50_0000)));
        assert_eq!(Region::locate(0x01C0_0000), Some((Region::InstanceRam, 0)));
        assert_eq!(Region::locate(0x01FF_FFFC), Some((Region::InstanceRam, 0x3F_FFFC)));
    }

    #[test]
    fn locate_rejects_the_gap_and_the_upper_limit() {
        assert_eq!(Region::locate(0x0180_0000), None);
        assert_eq!(Region::locate(0x01BF_FFFC), None);
        assert_eq!(Region::locate(0x0200_0000), None);
        assert_eq!(Region::locate(u32::MAX), None);
    }
}
