use crate::animation::blend::{channel_weight, smooth_fade};
use crate::animation::channel::PoseChannel;
use crate::animation::clip::Animation;

/// Length of a fade-out started by [`Pose::fade_channel`](crate::animation::pose::Pose::fade_channel).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FadeDuration {
    /// Use the channel's own `fade_out`.
    Automatic,
    Seconds(f32),
}

/// A stopped channel that keeps contributing with decaying weight.
#[derive(Debug, Clone)]
pub struct PoseFade {
    animation: Animation,

    /// Playback time inside the animation.
    pub time: f32,
    /// Time elapsed since the fade started.
    pub time_fade: f32,
    pub fade_out: f32,
    /// Weights captured from the channel when the fade started.
    pub priority_scale: f32,
    pub priority_transform: f32,
    /// Weights used by the current blend.
    pub current_weight_scale: f32,
    pub current_weight_transform: f32,
}

impl PoseFade {
    /// Snapshots `channel` into a fade lasting `fade_out` seconds.
    #[must_use]
    pub fn from_channel(channel: &PoseChannel, fade_out: f32) -> Self {
        let (scale, transform) = channel_weight(channel, None);
        Self {
            animation: channel.animation().clone(),
            time: channel.time,
            time_fade: 0.0,
            fade_out,
            priority_scale: scale,
            priority_transform: transform,
            current_weight_scale: scale,
            current_weight_transform: transform,
        }
    }

    #[inline]
    #[must_use]
    pub fn animation(&self) -> &Animation {
        &self.animation
    }

    pub(crate) fn set_animation(&mut self, animation: Animation) {
        self.animation = animation;
    }

    /// Refreshes the current weights, then advances by `dt`.
    ///
    /// Returns `true` once the fade has run its full length.
    pub fn advance(&mut self, dt: f32) -> bool {
        self.current_weight_scale = smooth_fade(self.priority_scale, self.time_fade, self.fade_out);
        self.current_weight_transform =
            smooth_fade(self.priority_transform, self.time_fade, self.fade_out);
        self.time += dt;
        self.time_fade += dt;
        self.time_fade >= self.fade_out
    }
}
