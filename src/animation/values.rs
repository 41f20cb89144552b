use glam::{Quat, Vec3, Vec4};

/// Lengths below this are treated as a degenerate quaternion.
const NORMALIZE_EPSILON: f32 = 1e-20;

/// Weighted two-way blend used by keyframe sampling and pose blending.
///
/// `a.blend(b, w)` returns `a * w + b * (1 - w)`: the weight belongs to the
/// receiver. The running pose blend feeds each contributor as the receiver
/// and the accumulated value as `other`, so the argument order matters.
pub trait Interpolatable: Copy {
    #[must_use]
    fn blend(self, other: Self, weight: f32) -> Self;
}

impl Interpolatable for f32 {
    #[inline]
    fn blend(self, other: Self, weight: f32) -> Self {
        weight * self + (1.0 - weight) * other
    }
}

impl Interpolatable for Vec3 {
    #[inline]
    fn blend(self, other: Self, weight: f32) -> Self {
        self * weight + other * (1.0 - weight)
    }
}

impl Interpolatable for Quat {
    /// Normalized lerp. No shortest-arc sign flip is applied.
    #[inline]
    fn blend(self, other: Self, weight: f32) -> Self {
        nlerp(self, other, weight)
    }
}

/// Normalized linear interpolation of two quaternions.
///
/// Falls back to identity when the weighted sum collapses to zero length.
#[must_use]
pub fn nlerp(a: Quat, b: Quat, weight: f32) -> Quat {
    let v = Vec4::from(a) * weight + Vec4::from(b) * (1.0 - weight);
    let len = v.length();
    if len < NORMALIZE_EPSILON {
        Quat::IDENTITY
    } else {
        Quat::from_vec4(v / len)
    }
}

/// Cubic Hermite ease (`3x² - 2x³`) of `value` normalized into `[edge0, edge1]`.
#[inline]
#[must_use]
pub fn smoothstep(value: f32, edge0: f32, edge1: f32) -> f32 {
    let x = ((value - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    x * x * (3.0 - 2.0 * x)
}
