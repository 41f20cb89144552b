use rustc_hash::FxHashMap;

use crate::animation::clip::Animation;

/// `repeats` value for a channel that loops until stopped.
pub const REPEAT_FOREVER: i32 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChannelState {
    #[default]
    Playing,
    Paused,
}

/// Outcome of advancing a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Playback {
    Running,
    Finished,
}

/// One playback slot of a pose.
///
/// A channel plays a private copy of an animation. Weights are
/// `priority_scale` and `priority_transform`, optionally overridden per
/// node through `weights`, and eased in and out by `fade_in`/`fade_out`.
#[derive(Debug, Clone)]
pub struct PoseChannel {
    animation: Animation,

    pub state: ChannelState,
    pub additive: bool,
    pub time: f32,
    pub time_scale: f32,
    /// Completed loops.
    pub repeat: i32,
    /// Loops to play, or [`REPEAT_FOREVER`].
    pub repeats: i32,
    /// Time each loop after the first restarts from.
    pub repeat_start: f32,
    pub fade_in: f32,
    pub fade_out: f32,
    pub priority_scale: f32,
    pub priority_transform: f32,

    pub(crate) weights: Option<FxHashMap<String, f32>>,
}

impl PoseChannel {
    #[must_use]
    pub fn new() -> Self {
        Self {
            animation: Animation::empty(),
            state: ChannelState::Playing,
            additive: false,
            time: 0.0,
            time_scale: 1.0,
            repeat: 0,
            repeats: 0,
            repeat_start: 0.0,
            fade_in: 0.0,
            fade_out: 0.0,
            priority_scale: 0.0,
            priority_transform: 1.0,
            weights: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn animation(&self) -> &Animation {
        &self.animation
    }

    #[inline]
    pub(crate) fn animation_mut(&mut self) -> &mut Animation {
        &mut self.animation
    }

    pub(crate) fn set_animation(&mut self, animation: Animation) {
        self.animation = animation;
    }

    /// Per-node transform priority override.
    #[must_use]
    pub fn node_priority(&self, node: &str) -> Option<f32> {
        self.weights.as_ref()?.get(node).copied()
    }

    pub fn set_node_priority(&mut self, node: &str, value: f32) {
        self.weights
            .get_or_insert_with(FxHashMap::default)
            .insert(node.to_string(), value);
    }

    pub fn clear_node_priorities(&mut self) {
        self.weights = None;
    }

    #[inline]
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.repeats != REPEAT_FOREVER && self.repeat >= self.repeats
    }

    /// Advances playback by `dt` seconds, wrapping into the repeat range.
    ///
    /// A channel whose animation has (near) zero duration only survives
    /// when it loops forever.
    pub fn advance(&mut self, dt: f32, epsilon: f32) -> Playback {
        let duration = self.animation.duration();
        if duration < epsilon {
            self.time = 0.0;
            return if self.repeats == REPEAT_FOREVER {
                Playback::Running
            } else {
                Playback::Finished
            };
        }

        self.time += self.time_scale * dt;
        if self.time > duration {
            let start = self.repeat_start.clamp(0.0, duration);
            if start < duration {
                let span = duration - start;
                let cycles = ((self.time - start) / span).floor();
                self.time -= cycles * span;
                self.repeat = self.repeat.saturating_add(cycles as i32);
            } else {
                self.time = duration;
                self.repeat = self.repeat.saturating_add(1);
            }
        }

        if self.is_finished() {
            Playback::Finished
        } else {
            Playback::Running
        }
    }
}

impl Default for PoseChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::clip::FRAME_TIME;

    fn channel_with_length(frames: usize) -> PoseChannel {
        let mut animation = Animation::new("walk");
        animation.insert_channel("root").unwrap();
        animation.set_length(frames).unwrap();
        let mut channel = PoseChannel::new();
        channel.set_animation(animation);
        channel
    }

    #[test]
    fn defaults() {
        let channel = PoseChannel::new();
        assert_eq!(channel.state, ChannelState::Playing);
        assert_eq!(channel.priority_scale, 0.0);
        assert_eq!(channel.priority_transform, 1.0);
        assert_eq!(channel.time_scale, 1.0);
        assert_eq!(channel.animation().name(), "empty");
        assert_eq!(channel.animation().length(), 0);
    }

    #[test]
    fn wraps_multiple_cycles_in_one_step() {
        let mut channel = channel_with_length(11);
        channel.repeats = REPEAT_FOREVER;
        let duration = 10.0 * FRAME_TIME;
        assert_eq!(channel.advance(duration * 3.5, 1e-6), Playback::Running);
        assert_eq!(channel.repeat, 3);
        assert!((channel.time - duration * 0.5).abs() < 1e-4);
    }

    #[test]
    fn repeat_start_shortens_later_loops() {
        let mut channel = channel_with_length(11);
        channel.repeats = REPEAT_FOREVER;
        channel.repeat_start = 0.1;
        channel.advance(0.25, 1e-6);
        // 0.25 past a 0.2 s loop restarting at 0.1 lands at 0.15.
        assert_eq!(channel.repeat, 1);
        assert!((channel.time - 0.15).abs() < 1e-4);
    }

    #[test]
    fn repeat_start_at_end_pins_time() {
        let mut channel = channel_with_length(11);
        channel.repeats = 3;
        channel.repeat_start = 5.0;
        channel.advance(0.3, 1e-6);
        assert_eq!(channel.repeat, 1);
        assert_eq!(channel.time, channel.animation().duration());
    }

    #[test]
    fn node_priorities_override_and_clear() {
        let mut channel = PoseChannel::new();
        assert_eq!(channel.node_priority("arm"), None);
        channel.set_node_priority("arm", 0.25);
        assert_eq!(channel.node_priority("arm"), Some(0.25));
        channel.clear_node_priorities();
        assert_eq!(channel.node_priority("arm"), None);
    }
}
