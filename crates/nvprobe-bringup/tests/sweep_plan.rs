//! Shape of the memory-clock sweep, per crystal.

use nvprobe_bringup::nv3::{nominal_coefficient, sweep_steps, SWEEP_DIVIDER_MAX};
use nvprobe_regs::nv3::{MPLL_NOMINAL_13500, MPLL_NOMINAL_14318};
use nvprobe_regs::{Crystal, PllCoefficient};

#[test]
fn step_count_covers_the_divider_range_inclusively() {
    // 13.5 MHz crystal starts at n=0xA3, 14.318 MHz at n=0xC4.
    assert_eq!(sweep_steps(Crystal::Khz13500).count(), (0xFF - 0xA3) + 1);
    assert_eq!(sweep_steps(Crystal::Khz14318).count(), (0xFF - 0xC4) + 1);
}

#[test]
fn only_the_n_field_varies_across_a_sweep() {
    for crystal in [Crystal::Khz13500, Crystal::Khz14318] {
        let steps: Vec<PllCoefficient> = sweep_steps(crystal).collect();
        let first = steps[0];
        for (i, coeff) in steps.iter().enumerate() {
            assert_eq!(coeff.m, first.m, "m drifted at step {i}");
            assert_eq!(coeff.p, first.p, "p drifted at step {i}");
            assert_eq!(coeff.n, first.n + i as u8, "n must advance one per step");
        }
        assert_eq!(steps.last().unwrap().n, SWEEP_DIVIDER_MAX);
    }
}

#[test]
fn sweep_opens_at_the_nominal_coefficient_and_walks_monotonically_upward() {
    for crystal in [Crystal::Khz13500, Crystal::Khz14318] {
        let steps: Vec<PllCoefficient> = sweep_steps(crystal).collect();
        // The first step is the ~100 MHz nominal point itself.
        assert_eq!(steps[0].pack(), nominal_coefficient(crystal));

        let freqs: Vec<f64> = steps.iter().map(|c| c.frequency_hz(crystal)).collect();
        assert!(freqs.windows(2).all(|w| w[0] < w[1]));
        // Everything after the opening step is an overclock.
        assert!(*freqs.last().unwrap() > *freqs.first().unwrap());
    }
}

#[test]
fn nominal_restore_coefficients_match_the_crystals() {
    assert_eq!(nominal_coefficient(Crystal::Khz13500), MPLL_NOMINAL_13500);
    assert_eq!(nominal_coefficient(Crystal::Khz14318), MPLL_NOMINAL_14318);
}
