//! Pose
//!
//! A [`Pose`] plays any number of animation channels on a private copy of a
//! model's node tree and blends them into one posture per tick.
//!
//! # Tick order
//!
//! [`Pose::update`] runs, in this order:
//! 1. advance playing channels, dropping the ones that finished
//! 2. advance fades, dropping the expired ones
//! 3. reset every node's world transform to the rest tree
//! 4. blend each node's local transform and propagate it, parents first
//! 5. refresh the pose groups used for skinning
//!
//! # Channels
//!
//! Channels are keyed by caller-chosen ids. Every `set_channel_*` call on a
//! bound pose creates the channel with defaults when the id is unknown;
//! getters on unknown ids return a zero value instead. A pose without a
//! model has no channels, and setters are ignored.

use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;

use glam::Mat4;

use crate::animation::blend::blend_node;
use crate::animation::channel::{ChannelState, Playback, PoseChannel};
use crate::animation::clip::Animation;
use crate::animation::fade::{FadeDuration, PoseFade};
use crate::errors::{PoseError, Result};
use crate::scene::NodeHandle;
use crate::scene::hierarchy::NodeTree;
use crate::scene::model::Model;
use crate::scene::node::Node;
use crate::scene::skeleton::PoseGroup;
use crate::scene::transform::Transform;
use crate::settings::PoseSettings;

#[derive(Debug, Default)]
pub struct Pose {
    settings: PoseSettings,
    model: Option<Arc<Model>>,
    channels: BTreeMap<u32, PoseChannel>,
    /// Newest first.
    fades: VecDeque<PoseFade>,
    nodes: NodeTree,
    /// Pre-order traversal of `nodes`.
    order: Vec<NodeHandle>,
    groups: Vec<PoseGroup>,
}

impl Pose {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_settings(settings: PoseSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    #[inline]
    #[must_use]
    pub fn settings(&self) -> &PoseSettings {
        &self.settings
    }

    #[inline]
    #[must_use]
    pub fn model(&self) -> Option<&Arc<Model>> {
        self.model.as_ref()
    }

    // ========================================================================
    // Binding
    // ========================================================================

    /// Binds the pose to `model`, or unbinds it with `None`.
    ///
    /// Channels and fades survive only when the new model has an animation
    /// of the same name; they continue with a fresh copy of it. On error the
    /// previous binding is left untouched.
    pub fn set_model(&mut self, model: Option<Arc<Model>>) -> Result<()> {
        let Some(model) = model else {
            log::debug!(
                "Unbinding pose ({} channels, {} fades dropped)",
                self.channels.len(),
                self.fades.len()
            );
            self.model = None;
            self.channels.clear();
            self.fades.clear();
            self.nodes = NodeTree::new();
            self.order.clear();
            self.groups.clear();
            return Ok(());
        };

        let nodes = model.nodes().clone();
        let order = nodes.traversal_order();

        let group_count = model.weight_groups().len();
        let mut groups = Vec::new();
        groups
            .try_reserve_exact(group_count)
            .map_err(|e| PoseError::alloc("pose groups", group_count, e))?;
        for (index, weight_group) in model.weight_groups().iter().enumerate() {
            let group = PoseGroup::bind(index, weight_group, model.nodes(), &nodes);
            if !group.enabled {
                log::warn!(
                    "Weight group '{}' disabled: bone '{}' not resolved",
                    weight_group.name,
                    weight_group.bone
                );
            }
            groups.push(group);
        }

        self.channels.retain(|id, channel| {
            match model.find_animation(channel.animation().name()) {
                Some(animation) => {
                    channel.set_animation(animation.clone());
                    true
                }
                None => {
                    log::debug!(
                        "Dropping channel {id}: animation '{}' not in new model",
                        channel.animation().name()
                    );
                    false
                }
            }
        });
        self.fades
            .retain_mut(|fade| match model.find_animation(fade.animation().name()) {
                Some(animation) => {
                    fade.set_animation(animation.clone());
                    true
                }
                None => false,
            });

        log::debug!(
            "Bound pose: {} nodes, {} groups, {} channels kept, {} fades kept",
            nodes.len(),
            groups.len(),
            self.channels.len(),
            self.fades.len()
        );

        self.model = Some(model);
        self.nodes = nodes;
        self.order = order;
        self.groups = groups;

        if self.settings.refresh_on_bind {
            self.update(0.0);
        }
        Ok(())
    }

    // ========================================================================
    // Tick
    // ========================================================================

    /// Advances playback by `dt` seconds and recomputes the posture.
    pub fn update(&mut self, dt: f32) {
        let Some(model) = self.model.as_deref() else {
            return;
        };
        let epsilon = self.settings.epsilon;

        self.channels.retain(|id, channel| {
            if channel.state == ChannelState::Paused {
                return true;
            }
            match channel.advance(dt, epsilon) {
                Playback::Running => true,
                Playback::Finished => {
                    log::debug!("Channel {id} finished");
                    false
                }
            }
        });

        self.fades.retain_mut(|fade| {
            let expired = fade.advance(dt);
            if expired {
                log::debug!("Fade of '{}' expired", fade.animation().name());
            }
            !expired
        });

        log::trace!(
            "Pose tick dt={dt}: {} channels, {} fades",
            self.channels.len(),
            self.fades.len()
        );

        self.nodes.reset_globals_from(model.nodes());

        for &handle in &self.order {
            let name = self.nodes.get(handle).and_then(Node::name_opt);
            let (scale, transform) = blend_node(&self.channels, &self.fades, name, epsilon);
            self.nodes.set_local_transform(handle, scale, transform);
            self.nodes.rebuild(handle, false);
        }

        for group in &mut self.groups {
            group.refresh(model.nodes(), &self.nodes);
        }
    }

    // ========================================================================
    // Channel Control
    // ========================================================================

    fn channel_or_create(&mut self, id: u32) -> Option<&mut PoseChannel> {
        if self.model.is_none() {
            log::trace!("Ignoring change to channel {id}: no model bound");
            return None;
        }
        Some(self.channels.entry(id).or_insert_with(|| {
            log::trace!("Creating channel {id}");
            PoseChannel::new()
        }))
    }

    /// Starts playing the model's animation `name` on channel `id` from the
    /// beginning, without fades.
    ///
    /// When the model has no such animation the channel is destroyed.
    pub fn set_channel_animation(&mut self, id: u32, name: &str) {
        let Some(model) = self.model.as_deref() else {
            return;
        };
        let Some(animation) = model.find_animation(name) else {
            log::warn!("Animation '{name}' not found, destroying channel {id}");
            self.channels.remove(&id);
            return;
        };
        let animation = animation.clone();

        let channel = self.channels.entry(id).or_default();
        channel.time = 0.0;
        channel.fade_in = 0.0;
        channel.fade_out = 0.0;
        channel.set_animation(animation);
    }

    pub fn set_channel_additive(&mut self, id: u32, value: bool) {
        if let Some(channel) = self.channel_or_create(id) {
            channel.additive = value;
        }
    }

    pub fn set_channel_fade_in(&mut self, id: u32, value: f32) {
        if let Some(channel) = self.channel_or_create(id) {
            channel.fade_in = value;
        }
    }

    pub fn set_channel_fade_out(&mut self, id: u32, value: f32) {
        if let Some(channel) = self.channel_or_create(id) {
            channel.fade_out = value;
        }
    }

    /// Seeks channel `id`, clamping to the animation duration.
    pub fn set_channel_position(&mut self, id: u32, value: f32) {
        if let Some(channel) = self.channel_or_create(id) {
            channel.time = value.min(channel.animation().duration());
        }
    }

    pub fn set_channel_priority_scale(&mut self, id: u32, value: f32) {
        if let Some(channel) = self.channel_or_create(id) {
            channel.priority_scale = value;
        }
    }

    pub fn set_channel_priority_transform(&mut self, id: u32, value: f32) {
        if let Some(channel) = self.channel_or_create(id) {
            channel.priority_transform = value;
        }
    }

    /// Overrides the transform priority of channel `id` for one node.
    pub fn set_channel_priority_node(&mut self, id: u32, node: &str, value: f32) {
        if let Some(channel) = self.channel_or_create(id) {
            channel.set_node_priority(node, value);
        }
    }

    pub fn clear_channel_node_priorities(&mut self, id: u32) {
        if let Some(channel) = self.channels.get_mut(&id) {
            channel.clear_node_priorities();
        }
    }

    pub fn set_channel_repeats(&mut self, id: u32, value: i32) {
        if let Some(channel) = self.channel_or_create(id) {
            channel.repeats = value;
        }
    }

    pub fn set_channel_repeat_start(&mut self, id: u32, value: f32) {
        if let Some(channel) = self.channel_or_create(id) {
            channel.repeat_start = value;
        }
    }

    pub fn set_channel_state(&mut self, id: u32, state: ChannelState) {
        if let Some(channel) = self.channel_or_create(id) {
            channel.state = state;
        }
    }

    pub fn set_channel_time_scale(&mut self, id: u32, value: f32) {
        if let Some(channel) = self.channel_or_create(id) {
            channel.time_scale = value;
        }
    }

    /// Writes a keyframe for `node` into the animation copy of channel `id`.
    ///
    /// The animation gains a channel for the node and grows to cover
    /// `frame` when needed. On error the animation is left as it was.
    pub fn set_channel_transform(
        &mut self,
        id: u32,
        frame: usize,
        node: &str,
        scale: f32,
        transform: &Transform,
    ) -> Result<()> {
        if self.model.is_none() {
            return Err(PoseError::ModelNotBound);
        }
        if self.nodes.find_node(node).is_none() {
            return Err(PoseError::NodeNotFound(node.to_string()));
        }
        let channel = self
            .channels
            .get_mut(&id)
            .ok_or(PoseError::PoseChannelNotFound(id))?;

        let animation = channel.animation_mut();
        let old_length = animation.length();
        let length = frame
            .checked_add(1)
            .ok_or(PoseError::FrameOutOfRange {
                frame,
                length: old_length,
            })?
            .max(old_length);

        // Shrinking back never allocates, so a failed insert can be undone.
        animation.set_length(length)?;
        if let Err(err) = animation.insert_channel(node) {
            animation.set_length(old_length)?;
            return Err(err);
        }
        animation.set_transform(node, frame, scale, transform)
    }

    /// Stops channel `id`, letting it blend out over `duration`.
    ///
    /// With [`FadeDuration::Automatic`] the channel's own `fade_out` is used,
    /// and a channel without one keeps playing.
    pub fn fade_channel(&mut self, id: u32, duration: FadeDuration) {
        let Some(channel) = self.channels.get(&id) else {
            return;
        };
        let seconds = match duration {
            FadeDuration::Automatic => {
                if channel.fade_out < self.settings.epsilon {
                    return;
                }
                channel.fade_out
            }
            FadeDuration::Seconds(seconds) => seconds,
        };

        if seconds > 0.0 {
            log::debug!(
                "Fading channel {id} ('{}') over {seconds}s",
                channel.animation().name()
            );
            self.fades.push_front(PoseFade::from_channel(channel, seconds));
        }
        self.channels.remove(&id);
    }

    pub fn destroy_channel(&mut self, id: u32) {
        self.channels.remove(&id);
    }

    // ========================================================================
    // Channel Queries
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn channel(&self, id: u32) -> Option<&PoseChannel> {
        self.channels.get(&id)
    }

    /// Ids of the live channels in ascending order.
    pub fn channel_ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.channels.keys().copied()
    }

    #[must_use]
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    #[must_use]
    pub fn channel_additive(&self, id: u32) -> bool {
        self.channel(id).is_some_and(|c| c.additive)
    }

    #[must_use]
    pub fn channel_animation(&self, id: u32) -> Option<&Animation> {
        self.channel(id).map(PoseChannel::animation)
    }

    /// Name of the animation on channel `id`, or `""`.
    #[must_use]
    pub fn channel_name(&self, id: u32) -> &str {
        self.channel(id).map_or("", |c| c.animation().name())
    }

    #[must_use]
    pub fn channel_position(&self, id: u32) -> f32 {
        self.channel(id).map_or(0.0, |c| c.time)
    }

    #[must_use]
    pub fn channel_fade_in(&self, id: u32) -> f32 {
        self.channel(id).map_or(0.0, |c| c.fade_in)
    }

    #[must_use]
    pub fn channel_fade_out(&self, id: u32) -> f32 {
        self.channel(id).map_or(0.0, |c| c.fade_out)
    }

    #[must_use]
    pub fn channel_priority_scale(&self, id: u32) -> f32 {
        self.channel(id).map_or(0.0, |c| c.priority_scale)
    }

    #[must_use]
    pub fn channel_priority_transform(&self, id: u32) -> f32 {
        self.channel(id).map_or(0.0, |c| c.priority_transform)
    }

    /// Per-node transform priority of channel `id`, if one was set.
    #[must_use]
    pub fn channel_priority_node(&self, id: u32, node: &str) -> Option<f32> {
        self.channel(id)?.node_priority(node)
    }

    /// Every per-node transform priority of channel `id`, sorted by node name.
    #[must_use]
    pub fn channel_priority_nodes(&self, id: u32) -> Vec<(String, f32)> {
        let mut nodes: Vec<(String, f32)> = self
            .channel(id)
            .and_then(|c| c.weights.as_ref())
            .map(|weights| weights.iter().map(|(k, &v)| (k.clone(), v)).collect())
            .unwrap_or_default();
        nodes.sort_by(|a, b| a.0.cmp(&b.0));
        nodes
    }

    #[must_use]
    pub fn channel_repeats(&self, id: u32) -> i32 {
        self.channel(id).map_or(0, |c| c.repeats)
    }

    #[must_use]
    pub fn channel_repeat_start(&self, id: u32) -> f32 {
        self.channel(id).map_or(0.0, |c| c.repeat_start)
    }

    #[must_use]
    pub fn channel_state(&self, id: u32) -> Option<ChannelState> {
        self.channel(id).map(|c| c.state)
    }

    #[must_use]
    pub fn channel_time_scale(&self, id: u32) -> f32 {
        self.channel(id).map_or(0.0, |c| c.time_scale)
    }

    // ========================================================================
    // Posture
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn fades(&self) -> &VecDeque<PoseFade> {
        &self.fades
    }

    #[inline]
    #[must_use]
    pub fn nodes(&self) -> &NodeTree {
        &self.nodes
    }

    #[inline]
    #[must_use]
    pub fn node(&self, handle: NodeHandle) -> Option<&Node> {
        self.nodes.get(handle)
    }

    #[must_use]
    pub fn find_node(&self, name: &str) -> Option<NodeHandle> {
        self.nodes.find_node(name)
    }

    /// Pose groups, aligned with the model's weight groups.
    #[inline]
    #[must_use]
    pub fn groups(&self) -> &[PoseGroup] {
        &self.groups
    }

    /// One skinning matrix per pose group.
    #[must_use]
    pub fn skinning_matrices(&self) -> Vec<Mat4> {
        self.groups.iter().map(PoseGroup::skinning_matrix).collect()
    }
}
