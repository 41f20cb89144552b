use glam::{Affine3A, Quat, Vec3};
use std::ops::Mul;

use crate::animation::values::Interpolatable;

/// Rigid transform: a position and a rotation, no scale.
///
/// Scale travels separately as a scalar next to the transform (see
/// [`NodeTransform`](crate::scene::node::NodeTransform)), so composing two
/// transforms never has to deal with shear.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    #[must_use]
    pub const fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    #[must_use]
    pub const fn from_position(position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
        }
    }

    #[must_use]
    pub const fn from_rotation(rotation: Quat) -> Self {
        Self {
            position: Vec3::ZERO,
            rotation,
        }
    }

    /// Concatenates `other` after `self`: `other` is expressed in the space of `self`.
    #[inline]
    #[must_use]
    pub fn multiply(&self, other: &Self) -> Self {
        Self {
            position: self.position + self.rotation * other.position,
            rotation: self.rotation * other.rotation,
        }
    }

    #[inline]
    #[must_use]
    pub fn invert(&self) -> Self {
        let rotation = self.rotation.conjugate();
        Self {
            position: rotation * -self.position,
            rotation,
        }
    }

    #[inline]
    #[must_use]
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.rotation * point + self.position
    }

    /// Interpolates towards `other`.
    ///
    /// Position is lerped and rotation is normalized-lerped; `blend == 0`
    /// yields `self`, `blend == 1` yields `other`.
    #[must_use]
    pub fn interpolate(&self, other: &Self, blend: f32) -> Self {
        Self {
            position: other.position.blend(self.position, blend),
            rotation: other.rotation.blend(self.rotation, blend),
        }
    }

    #[inline]
    #[must_use]
    pub fn to_affine(&self) -> Affine3A {
        Affine3A::from_rotation_translation(self.rotation, self.position)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Transform {
    type Output = Transform;

    fn mul(self, rhs: Self) -> Self::Output {
        self.multiply(&rhs)
    }
}
