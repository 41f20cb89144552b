//! Pose Settings
//!
//! Tunables of a [`Pose`](crate::animation::pose::Pose), fixed at
//! construction time.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use pose::{Pose, PoseSettings};
//!
//! // Defaults: 1e-20 weight epsilon, refresh on bind
//! let pose = Pose::new();
//!
//! // Bind without evaluating; the first `update` computes the posture
//! let pose = Pose::with_settings(PoseSettings {
//!     refresh_on_bind: false,
//!     ..Default::default()
//! });
//! ```

/// Configuration of a pose.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseSettings {
    /// Threshold below which accumulated weights and animation durations
    /// count as zero.
    ///
    /// Default: `1e-20`
    pub epsilon: f32,

    /// Evaluate the pose with a zero time step right after a model is bound,
    /// so nodes and groups are valid before the first `update`.
    ///
    /// Default: `true`
    pub refresh_on_bind: bool,
}

impl Default for PoseSettings {
    fn default() -> Self {
        Self {
            epsilon: 1e-20,
            refresh_on_bind: true,
        }
    }
}
