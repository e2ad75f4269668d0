//! Throttle percentage to pulse width conversion.

use num_traits::Float;

use crate::config::Calibration;

pub const MIN_PERCENTAGE: f32 = 0.;
pub const MAX_PERCENTAGE: f32 = 100.;

/// Saturate a throttle percentage to `[0, 100]`. NaN maps to 0%.
pub fn clamp_percentage(pct: f32) -> f32 {
    if pct.is_nan() {
        return MIN_PERCENTAGE;
    }
    pct.clamp(MIN_PERCENTAGE, MAX_PERCENTAGE)
}

/// Convert a throttle percentage into a pulse width in ticks, rounded to
/// the nearest tick and exact at both ends of the calibrated range.
///
/// An inverted calibration (`min > max`) collapses to `min` inside the range.
pub fn ticks_of(pct: f32, calibration: &Calibration) -> u32 {
    let Calibration {
        min_pulse_ticks: min,
        max_pulse_ticks: max,
    } = *calibration;

    let pct = clamp_percentage(pct);
    if pct <= MIN_PERCENTAGE {
        return min;
    }
    if pct >= MAX_PERCENTAGE {
        return max;
    }

    let pulse_diff = max.saturating_sub(min) as f32;
    let offset =
        Float::round((pct - MIN_PERCENTAGE) * pulse_diff / (MAX_PERCENTAGE - MIN_PERCENTAGE));
    min + offset as u32
}
