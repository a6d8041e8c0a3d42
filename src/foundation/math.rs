/// Gain shift applied to effects whose configured gain is zero or negative.
pub const SILENT_DB: f64 = -100.0;

pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

/// Convert a linear gain multiplier to a decibel shift; `gain <= 0` is effectively silent.
pub fn gain_to_db(gain: f64) -> f64 {
    if gain > 0.0 && gain.is_finite() {
        20.0 * gain.log10()
    } else {
        SILENT_DB
    }
}

/// Convert a decibel shift back to a linear amplitude multiplier.
pub fn db_to_linear(db: f64) -> f64 {
    10f64.powf(db / 20.0)
}

/// Round a signed pixel coordinate from `f64`, saturating at `i32` bounds.
pub(crate) fn round_px(v: f64) -> i32 {
    if !v.is_finite() {
        return 0;
    }
    v.round().clamp(f64::from(i32::MIN), f64::from(i32::MAX)) as i32
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
