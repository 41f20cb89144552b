//! Per-node weighted blending of channels and fades.
//!
//! Non-additive channels and fades are combined by a normalized running
//! blend: each contributor is mixed into the accumulated value with its
//! share of the total weight, in ascending channel id order followed by
//! fades newest first. Additive channels are mixed on top afterwards with
//! their raw weights.

use std::collections::{BTreeMap, VecDeque};

use smallvec::SmallVec;

use crate::animation::channel::{PoseChannel, REPEAT_FOREVER};
use crate::animation::clip::Frame;
use crate::animation::fade::PoseFade;
use crate::animation::values::{Interpolatable, smoothstep};
use crate::scene::transform::Transform;

/// Eases `weight` towards zero as `offset` approaches `length`.
///
/// At `offset == 0` the full weight is returned, at `offset == length`
/// zero. A non-positive `length` means no easing.
#[must_use]
pub fn smooth_fade(weight: f32, offset: f32, length: f32) -> f32 {
    if length <= 0.0 {
        return weight;
    }
    let base = 1.0 - offset / length;
    let scaled = base * weight;
    let ease = 1.0 - smoothstep(offset, 0.0, length);
    base + (scaled - base) * ease
}

/// Effective `(scale, transform)` weights of a channel.
///
/// With a node name, a per-node priority override replaces the transform
/// priority. The weights ramp up over `fade_in` during the first loop and
/// down over `fade_out` before the last loop ends.
#[must_use]
pub fn channel_weight(channel: &PoseChannel, node: Option<&str>) -> (f32, f32) {
    let duration = channel.animation().duration();
    let time = channel.repeat as f32 * duration + channel.time;
    let end = channel.repeats as f32 * duration;

    let scale = channel.priority_scale;
    let transform = node
        .and_then(|name| channel.node_priority(name))
        .unwrap_or(channel.priority_transform);

    if channel.repeat == 0 && time < channel.fade_in {
        let offset = channel.fade_in - time;
        (
            smooth_fade(scale, offset, channel.fade_in),
            smooth_fade(transform, offset, channel.fade_in),
        )
    } else if channel.repeats == REPEAT_FOREVER || time < end - channel.fade_out {
        (scale, transform)
    } else {
        let offset = time - (end - channel.fade_out);
        (
            smooth_fade(scale, offset, channel.fade_out),
            smooth_fade(transform, offset, channel.fade_out),
        )
    }
}

struct Contribution {
    frame: Option<Frame>,
    scale_weight: f32,
    transform_weight: f32,
}

/// Blends the local `(scale, transform)` of the node named `node`.
///
/// Unnamed nodes and nodes no contributor animates get `(1.0, IDENTITY)`.
#[must_use]
pub fn blend_node(
    channels: &BTreeMap<u32, PoseChannel>,
    fades: &VecDeque<PoseFade>,
    node: Option<&str>,
    epsilon: f32,
) -> (f32, Transform) {
    let Some(name) = node else {
        return (1.0, Transform::IDENTITY);
    };

    let mut contributions: SmallVec<[Contribution; 8]> = SmallVec::new();
    for channel in channels.values().filter(|c| !c.additive) {
        if channel.animation().get_channel(name).is_some() {
            let (scale_weight, transform_weight) = channel_weight(channel, Some(name));
            contributions.push(Contribution {
                frame: channel.animation().get_transform(name, channel.time),
                scale_weight,
                transform_weight,
            });
        }
    }
    for fade in fades {
        if fade.animation().get_channel(name).is_some() {
            contributions.push(Contribution {
                frame: fade.animation().get_transform(name, fade.time),
                scale_weight: fade.current_weight_scale,
                transform_weight: fade.current_weight_transform,
            });
        }
    }

    let total_scale: f32 = contributions.iter().map(|c| c.scale_weight).sum();
    let total_transform: f32 = contributions.iter().map(|c| c.transform_weight).sum();

    let mut transform = Transform::IDENTITY;
    if !contributions.is_empty() && total_transform >= epsilon {
        for c in &contributions {
            let Some(frame) = c.frame else { continue };
            let w = c.transform_weight / total_transform;
            transform.rotation = frame.transform.rotation.blend(transform.rotation, w);
            transform.position = frame.transform.position.blend(transform.position, w);
        }
    }

    let mut scale = 1.0;
    if !contributions.is_empty() && total_scale >= epsilon {
        scale = contributions
            .iter()
            .filter_map(|c| c.frame.map(|f| f.scale * c.scale_weight / total_scale))
            .sum();
    }

    for channel in channels.values().filter(|c| c.additive) {
        let Some(frame) = channel.animation().get_transform(name, channel.time) else {
            continue;
        };
        let (scale_weight, transform_weight) = channel_weight(channel, Some(name));
        transform.rotation = frame.transform.rotation.blend(transform.rotation, transform_weight);
        transform.position = frame.transform.position.blend(transform.position, transform_weight);
        scale += frame.scale * scale_weight;
    }

    (scale, transform)
}
