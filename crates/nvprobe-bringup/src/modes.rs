//! Static display-mode timing table for NV3.
//!
//! Pure configuration data: nothing in the bring-up path programs a mode,
//! but the table records the timings a mode-set layer would use. Blank
//! intervals run from display end to total in both axes.

use nvprobe_regs::nv3::MPLL_DEFAULT;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeTimings {
    pub width: u16,
    pub height: u16,
    pub bpp: u8,
    pub refresh_hz: u8,

    pub h_total: u32,
    pub h_display_end: u32,
    pub h_blank_start: u32,
    pub h_blank_end: u32,
    pub h_retrace_start: u32,
    pub h_retrace_end: u32,

    pub v_total: u32,
    pub v_display_end: u32,
    pub v_blank_start: u32,
    pub v_blank_end: u32,
    pub v_retrace_start: u32,
    pub v_retrace_end: u32,

    pub pixel_clock_khz: u32,
    pub memory_clock: u32,
}

#[allow(clippy::too_many_arguments)]
const fn mode(
    width: u16,
    height: u16,
    bpp: u8,
    h_total: u32,
    h_retrace_start: u32,
    h_retrace_end: u32,
    v_total: u32,
    v_retrace_start: u32,
    v_retrace_end: u32,
    pixel_clock_khz: u32,
) -> ModeTimings {
    ModeTimings {
        width,
        height,
        bpp,
        refresh_hz: 60,
        h_total,
        h_display_end: width as u32,
        h_blank_start: width as u32,
        h_blank_end: h_total,
        h_retrace_start,
        h_retrace_end,
        v_total,
        v_display_end: height as u32,
        v_blank_start: height as u32,
        v_blank_end: v_total,
        v_retrace_start,
        v_retrace_end,
        pixel_clock_khz,
        memory_clock: MPLL_DEFAULT,
    }
}

/// Common NV3 modes at 60 Hz, in 8/16/32 bpp variants.
pub static MODE_TABLE: &[ModeTimings] = &[
    mode(640, 480, 8, 800, 656, 752, 525, 490, 492, 25_175),
    mode(640, 480, 16, 800, 656, 752, 525, 490, 492, 25_175),
    mode(640, 480, 32, 800, 656, 752, 525, 490, 492, 25_175),
    mode(800, 600, 8, 1056, 840, 968, 628, 601, 605, 40_000),
    mode(800, 600, 16, 1056, 840, 968, 628, 601, 605, 40_000),
    mode(800, 600, 32, 1056, 840, 968, 628, 601, 605, 40_000),
    mode(1024, 768, 8, 1344, 1048, 1184, 806, 771, 777, 65_000),
    mode(1024, 768, 16, 1344, 1048, 1184, 806, 771, 777, 65_000),
    mode(1024, 768, 32, 1344, 1048, 1184, 806, 771, 777, 65_000),
    mode(1280, 1024, 8, 1688, 1328, 1440, 1066, 1025, 1028, 108_000),
    mode(1280, 1024, 16, 1688, 1328, 1440, 1066, 1025, 1028, 108_000),
    mode(1280, 1024, 32, 1688, 1328, 1440, 1066, 1025, 1028, 108_000),
];

pub fn find_mode(width: u16, height: u16, bpp: u8) -> Option<&'static ModeTimings> {
    MODE_TABLE
        .iter()
        .find(|m| m.width == width && m.height == height && m.bpp == bpp)
}
