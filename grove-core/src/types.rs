/// Timestamp attached to a heart-rate [`crate::sample::Sample`].
///
/// Only the ordering matters; the unit is whatever the sample source
/// counts in (the synthetic source uses a reading counter).
pub type Timestamp = i64;

/// Cancellation token for scheduled ticks.
///
/// Bumped by [`crate::controller::GrowthController`] on every state
/// transition. A tick carrying an older generation is discarded.
pub type Generation = u64;
