//! Visual closeness derived from a guess distance.

/// Distances below this are considered near the secret word.
pub const NEAR_LIMIT: u32 = 100;
/// Distances below this (and not near) are considered medium.
pub const MEDIUM_LIMIT: u32 = 1500;

/// Rank span over which the bar decays to almost nothing.
const DECAY_SPAN: f64 = 40_000.0;
/// Exponent reached at the end of the decay span.
const DECAY_EXPONENT: f64 = 100.0;
/// Smallest bar width, in percent.
const MIN_WIDTH: f64 = 1.0;

/// Colour tier of a guess bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    /// Green.
    Near,
    /// Yellow.
    Medium,
    /// Red.
    Far,
}

/// Classify `distance` into its colour tier.
pub fn tier(distance: u32) -> Tier {
    if distance < NEAR_LIMIT {
        Tier::Near
    } else if distance < MEDIUM_LIMIT {
        Tier::Medium
    } else {
        Tier::Far
    }
}

/// Bar width in percent, within `1.0..=100.0`.
///
/// The width decays exponentially with distance, normalised so distance `0`
/// fills the bar and the floor keeps every guess visible.
pub fn bar_width(distance: u32) -> f64 {
    let raw = (-f64::from(distance) / DECAY_SPAN * DECAY_EXPONENT).exp();
    let floor = (-DECAY_EXPONENT).exp();
    let normalized = (raw - floor) / (1.0 - floor);
    (normalized * 100.0).max(MIN_WIDTH)
}
