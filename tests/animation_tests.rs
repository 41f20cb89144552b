//! Animation Clip Tests
//!
//! Tests for:
//! - Duration of short and long clips
//! - Keyframe sampling (boundaries, interpolation, missing channels)
//! - Channel insertion (idempotence, re-striding existing frames)
//! - Length changes (grow/shrink round-trip, channel-less clips)
//! - Checked keyframe writes
//! - Interpolatable blending helpers

use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};

use glam::{Quat, Vec3};

use pose::animation::clip::{Animation, FRAME_TIME, Frame};
use pose::animation::values::{Interpolatable, nlerp};
use pose::errors::PoseError;
use pose::scene::transform::Transform;

const EPSILON: f32 = 1e-5;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn vec3_approx(a: Vec3, b: Vec3) -> bool {
    approx(a.x, b.x) && approx(a.y, b.y) && approx(a.z, b.z)
}

fn quat_approx(a: Quat, b: Quat) -> bool {
    a.angle_between(b) < 1e-3
}

/// Two-frame clip on channel "root": identity, then `second`.
fn two_frame_clip(second: Transform) -> Animation {
    Animation::from_frames(
        "move",
        vec!["root".to_string()],
        2,
        vec![Frame::IDENTITY, Frame::new(1.0, second)],
    )
    .unwrap()
}

// ============================================================================
// Duration
// ============================================================================

#[test]
fn duration_of_short_clips_is_one_second() {
    let mut anim = Animation::new("idle");
    assert_eq!(anim.duration(), 1.0);

    anim.insert_channel("root").unwrap();
    anim.set_length(1).unwrap();
    assert_eq!(anim.duration(), 1.0);
}

#[test]
fn duration_follows_frame_grid() {
    let mut anim = Animation::new("walk");
    anim.insert_channel("root").unwrap();
    for n in [2_usize, 3, 11, 51] {
        anim.set_length(n).unwrap();
        let expected = (n - 1) as f32 * FRAME_TIME;
        assert_eq!(anim.duration(), expected, "length {n}");
    }
}

#[test]
fn empty_factory() {
    let anim = Animation::empty();
    assert_eq!(anim.name(), "empty");
    assert_eq!(anim.length(), 0);
    assert_eq!(anim.channel_count(), 0);
}

// ============================================================================
// Sampling
// ============================================================================

#[test]
fn sample_at_zero_returns_first_frame() {
    let anim = two_frame_clip(Transform::from_position(Vec3::new(10.0, 0.0, 0.0)));
    let frame = anim.get_transform("root", 0.0).unwrap();
    assert_eq!(frame.transform.position, Vec3::ZERO);
    assert!(quat_approx(frame.transform.rotation, Quat::IDENTITY));
    assert_eq!(frame.scale, 1.0);

    let before = anim.get_transform("root", -1.0).unwrap();
    assert_eq!(before.transform.position, Vec3::ZERO);
}

#[test]
fn sample_past_end_returns_last_frame() {
    let target = Vec3::new(10.0, 0.0, 0.0);
    let anim = two_frame_clip(Transform::from_position(target));
    for t in [anim.duration(), anim.duration() + 0.5, 100.0] {
        let frame = anim.get_transform("root", t).unwrap();
        assert_eq!(frame.transform.position, target, "time {t}");
    }
}

#[test]
fn sample_interpolates_position() {
    let anim = two_frame_clip(Transform::from_position(Vec3::new(10.0, 0.0, 0.0)));
    let frame = anim.get_transform("root", FRAME_TIME / 2.0).unwrap();
    let p = frame.transform.position;
    assert!((p.x - 5.0).abs() < 1e-3, "Expected 5.0, got {}", p.x);
    assert!(approx(p.y, 0.0) && approx(p.z, 0.0));
}

#[test]
fn sample_interpolates_rotation_and_scale() {
    let mut anim = two_frame_clip(Transform::from_rotation(Quat::from_rotation_z(FRAC_PI_2)));
    anim.set_transform(
        "root",
        1,
        3.0,
        &Transform::from_rotation(Quat::from_rotation_z(FRAC_PI_2)),
    )
    .unwrap();

    let frame = anim.get_transform("root", FRAME_TIME / 2.0).unwrap();
    assert!(quat_approx(frame.transform.rotation, Quat::from_rotation_z(FRAC_PI_4)));
    assert!((frame.scale - 2.0).abs() < 1e-3, "Expected 2.0, got {}", frame.scale);
}

#[test]
fn sample_unknown_channel_is_none() {
    let anim = two_frame_clip(Transform::IDENTITY);
    assert!(anim.get_transform("arm", 0.0).is_none());
    assert_eq!(anim.get_channel("arm"), None);
    assert_eq!(anim.get_channel("root"), Some(0));
}

#[test]
fn sample_zero_length_clip_is_none() {
    let mut anim = Animation::new("blank");
    anim.insert_channel("root").unwrap();
    assert!(anim.get_transform("root", 0.0).is_none());
}

// ============================================================================
// Channel Insertion
// ============================================================================

#[test]
fn insert_channel_is_idempotent() {
    let mut anim = Animation::new("wave");
    anim.insert_channel("root").unwrap();
    anim.set_length(3).unwrap();
    let moved = Transform::from_position(Vec3::new(1.0, 2.0, 3.0));
    anim.set_transform("root", 2, 0.5, &moved).unwrap();

    assert_eq!(anim.insert_channel("root").unwrap(), 0);
    assert_eq!(anim.channel_count(), 1);
    assert_eq!(anim.frame(0, 2), Some(&Frame::new(0.5, moved)));
}

#[test]
fn insert_channel_restrides_existing_frames() {
    let mut anim = Animation::new("wave");
    anim.insert_channel("root").unwrap();
    anim.set_length(3).unwrap();
    for i in 0..3 {
        let t = Transform::from_position(Vec3::splat(i as f32));
        anim.set_transform("root", i, 1.0, &t).unwrap();
    }

    let arm = anim.insert_channel("arm").unwrap();
    assert_eq!(arm, 1);
    assert_eq!(anim.frames().len(), 6);
    for i in 0..3 {
        let root = anim.frame(0, i).unwrap();
        assert!(vec3_approx(root.transform.position, Vec3::splat(i as f32)));
        assert_eq!(anim.frame(arm, i), Some(&Frame::IDENTITY));
    }
}

#[test]
fn insert_channel_into_lengthened_empty_clip() {
    let mut anim = Animation::new("late");
    anim.set_length(4).unwrap();
    assert_eq!(anim.length(), 4);
    assert!(anim.frames().is_empty());

    anim.insert_channel("root").unwrap();
    assert_eq!(anim.frames().len(), 4);
    assert!(anim.frames().iter().all(|f| *f == Frame::IDENTITY));
}

// ============================================================================
// Length
// ============================================================================

#[test]
fn set_length_round_trip_preserves_frames() {
    let mut anim = Animation::new("run");
    anim.insert_channel("root").unwrap();
    anim.insert_channel("leg").unwrap();
    anim.set_length(3).unwrap();
    for i in 0..3 {
        let t = Transform::from_position(Vec3::new(i as f32, 1.0, 0.0));
        anim.set_transform("leg", i, 2.0, &t).unwrap();
    }
    let before = anim.frames().to_vec();

    anim.set_length(10).unwrap();
    assert_eq!(anim.frames().len(), 20);
    assert_eq!(anim.frame(1, 9), Some(&Frame::IDENTITY));

    anim.set_length(3).unwrap();
    assert_eq!(anim.frames(), before.as_slice());
}

#[test]
fn set_length_zero_clears_frames() {
    let mut anim = Animation::new("run");
    anim.insert_channel("root").unwrap();
    anim.set_length(5).unwrap();
    anim.set_length(0).unwrap();
    assert_eq!(anim.length(), 0);
    assert!(anim.frames().is_empty());
    assert_eq!(anim.channel_count(), 1);
}

// ============================================================================
// Keyframe Writes
// ============================================================================

#[test]
fn set_transform_out_of_range_is_error() {
    let mut anim = two_frame_clip(Transform::IDENTITY);
    let err = anim
        .set_transform("root", 2, 1.0, &Transform::IDENTITY)
        .unwrap_err();
    assert!(matches!(err, PoseError::FrameOutOfRange { frame: 2, length: 2 }));
}

#[test]
fn set_transform_unknown_channel_is_error() {
    let mut anim = two_frame_clip(Transform::IDENTITY);
    let err = anim
        .set_transform("tail", 0, 1.0, &Transform::IDENTITY)
        .unwrap_err();
    assert!(matches!(err, PoseError::ChannelNotFound(ref name) if name == "tail"));
}

#[test]
fn from_frames_rejects_ragged_grid() {
    let err = Animation::from_frames(
        "bad",
        vec!["a".to_string(), "b".to_string()],
        2,
        vec![Frame::IDENTITY; 3],
    )
    .unwrap_err();
    assert!(matches!(err, PoseError::FrameGridMismatch { expected: 4, actual: 3 }));
}

#[test]
fn oversized_grids_are_rejected_untouched() {
    let err = Animation::from_frames(
        "huge",
        vec!["a".to_string(), "b".to_string()],
        usize::MAX,
        Vec::new(),
    )
    .unwrap_err();
    assert!(matches!(err, PoseError::FrameGridOverflow { channels: 2, .. }));

    let mut anim = two_frame_clip(Transform::from_position(Vec3::X));
    anim.insert_channel("arm").unwrap();
    let before = anim.frames().to_vec();

    let err = anim.set_length(usize::MAX).unwrap_err();
    assert!(matches!(err, PoseError::FrameGridOverflow { channels: 2, .. }));
    assert_eq!(anim.length(), 2);
    assert_eq!(anim.frames(), before.as_slice());
}

#[test]
fn duplicate_channel_names_resolve_to_first() {
    let moved = Frame::new(1.0, Transform::from_position(Vec3::X));
    let anim = Animation::from_frames(
        "dup",
        vec!["root".to_string(), "root".to_string()],
        1,
        vec![moved, Frame::IDENTITY],
    )
    .unwrap();
    assert_eq!(anim.get_channel("root"), Some(0));
    assert_eq!(anim.get_transform("root", 0.0), Some(moved));
}

// ============================================================================
// Interpolatable
// ============================================================================

#[test]
fn interpolatable_weight_belongs_to_receiver() {
    let v = Vec3::new(10.0, 0.0, 0.0).blend(Vec3::ZERO, 0.3);
    assert!(vec3_approx(v, Vec3::new(3.0, 0.0, 0.0)));
    assert!(approx(4.0_f32.blend(2.0, 0.5), 3.0));
}

#[test]
fn nlerp_result_is_normalized() {
    let a = Quat::from_rotation_x(1.0);
    let b = Quat::from_rotation_y(-0.5);
    for w in [0.0, 0.2, 0.5, 0.9, 1.0] {
        let q = nlerp(a, b, w);
        assert!(approx(q.length(), 1.0), "weight {w}");
    }
    assert!(quat_approx(nlerp(a, b, 1.0), a));
    assert!(quat_approx(nlerp(a, b, 0.0), b));
}
