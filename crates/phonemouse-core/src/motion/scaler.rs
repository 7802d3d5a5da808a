//! Q16.16 fixed-point speed scaling.
//!
//! # What is Q16.16? (for beginners)
//!
//! A Q16.16 number stores a real value as an integer scaled by 2^16 = 65536:
//! `1.0` is `65536`, `0.5` is `32768`, `-2.0` is `-131072`.  Multiplying a
//! delta by such a number and shifting the product right by 16 bits rescales
//! the result back to whole device units without any floating point.
//!
//! The speed is configured as a percentage (`100` = unchanged, `50` = half,
//! `200` = double, negative = inverted axes), so the multiplier is
//! `speed_percent * 65536 / 100`.

/// `1.0` in Q16.16.
pub const Q16_ONE: i64 = 1 << 16;

/// Converts a speed percentage into a Q16.16 multiplier.
///
/// Uses integer division truncating toward zero.  Every input is valid:
/// `0` disables motion and negative values invert direction.
///
/// # Examples
///
/// ```rust
/// use phonemouse_core::compute_multiplier;
///
/// assert_eq!(compute_multiplier(100), 65536);
/// assert_eq!(compute_multiplier(50), 32768);
/// assert_eq!(compute_multiplier(-33), -21626);
/// ```
pub fn compute_multiplier(speed_percent: i32) -> i64 {
    i64::from(speed_percent) * Q16_ONE / 100
}

/// Applies a Q16.16 multiplier to a raw delta.
///
/// The shift is arithmetic, so negative products round toward negative
/// infinity (`-1 * 0.5` becomes `-1`, not `0`).  Results outside the `i32`
/// range saturate.
pub fn scale(delta: i16, multiplier: i64) -> i32 {
    let scaled = (i64::from(delta) * multiplier) >> 16;
    scaled.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

// ── Tests ─────────────────────────────────────────────────────────────────────
