//! Motion pipeline: speed scaling followed by optional interpolation.
//!
//! ```text
//! raw i16 delta ──scale(multiplier)──▶ i32 delta ──split(steps)──▶ N × (dx, dy)
//! ```
//!
//! Both stages are pure functions.  The multiplier is derived once from the
//! configured speed percentage and never changes while the bridge runs.

pub mod interpolate;
pub mod scaler;
