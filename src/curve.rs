//! Closed-form charge curve for a single 18650 cell.

use libm::round;

/// Charge percentage for a cell voltage strictly between the configured
/// bounds (the gauge clamps to 0/100 before calling in here).
///
/// Two fitted segments: a linear tail for the steep drop below 3.700 V,
/// truncated like the integer arithmetic it replaces, and a quadratic for
/// the flatter stretch above it. The quadratic sits one point low through
/// 3.755-3.870 V and again from 3.940 V up, so those bands get a +1 nudge.
/// The coefficients are an empirical fit to a measured discharge profile;
/// don't retune them without recollecting the data.
pub fn charge_percent(volts: f64) -> u8 {
    if volts <= 3.700 {
        return (20.0 * volts - 64.0) as u8;
    }

    let fitted = round(-233.82 * volts * volts + 2021.3 * volts - 4266.0) as i32;
    if (volts > 3.755 && volts <= 3.870) || volts >= 3.940 {
        (fitted + 1) as u8
    } else {
        fitted as u8
    }
}
