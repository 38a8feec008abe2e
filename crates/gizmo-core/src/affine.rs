//! 2D affine transforms.
//!
//! Thin value type over glam's `Affine2`. Composition uses the "append"
//! convention: `a.append(&b)` maps a point through `b` first and then `a`,
//! which is the order needed to push a local transform under its parent
//! (`parent_world.append(&local)`).

use std::ops::Mul;

use bevy::math::{Affine2, Vec2};

/// A 2D affine matrix (linear part plus translation).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AffineTransform(Affine2);

impl Default for AffineTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl From<Affine2> for AffineTransform {
    fn from(affine: Affine2) -> Self {
        Self(affine)
    }
}

impl From<AffineTransform> for Affine2 {
    fn from(transform: AffineTransform) -> Self {
        transform.0
    }
}

impl AffineTransform {
    pub const IDENTITY: Self = Self(Affine2::IDENTITY);

    /// Builds a matrix from its six coefficients:
    /// `x' = a*x + c*y + tx`, `y' = b*x + d*y + ty`.
    pub fn from_coefficients(a: f32, b: f32, c: f32, d: f32, tx: f32, ty: f32) -> Self {
        Self(Affine2::from_cols(
            Vec2::new(a, b),
            Vec2::new(c, d),
            Vec2::new(tx, ty),
        ))
    }

    pub fn from_translation(translation: Vec2) -> Self {
        Self(Affine2::from_translation(translation))
    }

    /// Rotation by `angle` radians about the origin.
    pub fn from_angle(angle: f32) -> Self {
        Self(Affine2::from_angle(angle))
    }

    pub fn from_scale(scale: Vec2) -> Self {
        Self(Affine2::from_scale(scale))
    }

    /// Scale, then rotate, then translate.
    pub fn from_scale_angle_translation(scale: Vec2, angle: f32, translation: Vec2) -> Self {
        Self(Affine2::from_scale_angle_translation(scale, angle, translation))
    }

    /// Conjugates `inner` so that it operates about `pivot` instead of the origin.
    ///
    /// `pivot` is a fixed point of the result whenever it is a fixed point of
    /// `inner` relative to the origin (rotations, scales).
    pub fn about(pivot: Vec2, inner: &Self) -> Self {
        Self::from_translation(pivot)
            .append(inner)
            .append(&Self::from_translation(-pivot))
    }

    /// Follows this transform with a translation.
    #[must_use]
    pub fn translate(self, offset: Vec2) -> Self {
        Self(Affine2::from_translation(offset) * self.0)
    }

    /// Follows this transform with a rotation about the origin.
    #[must_use]
    pub fn rotate(self, angle: f32) -> Self {
        Self(Affine2::from_angle(angle) * self.0)
    }

    /// Follows this transform with a scale about the origin.
    #[must_use]
    pub fn scale(self, scale: Vec2) -> Self {
        Self(Affine2::from_scale(scale) * self.0)
    }

    /// `self ∘ other`: applies `other` first, then `self`.
    #[must_use]
    pub fn append(&self, other: &Self) -> Self {
        Self(self.0 * other.0)
    }

    /// `other ∘ self`: applies `self` first, then `other`.
    #[must_use]
    pub fn prepend(&self, other: &Self) -> Self {
        Self(other.0 * self.0)
    }

    pub fn determinant(&self) -> f32 {
        self.0.matrix2.determinant()
    }

    pub fn is_finite(&self) -> bool {
        self.0.is_finite()
    }

    /// Inverse transform, or `None` when the linear part is singular.
    pub fn invert(&self) -> Option<Self> {
        let det = self.determinant();
        if det == 0.0 || !det.is_finite() {
            return None;
        }
        let inverse = self.0.inverse();
        inverse.is_finite().then_some(Self(inverse))
    }

    pub fn apply(&self, point: Vec2) -> Vec2 {
        self.0.transform_point2(point)
    }

    /// Maps `point` through the inverse transform.
    pub fn apply_inverse(&self, point: Vec2) -> Option<Vec2> {
        self.invert().map(|inverse| inverse.apply(point))
    }

    pub fn translation(&self) -> Vec2 {
        self.0.translation
    }

    #[must_use]
    pub fn with_translation(mut self, translation: Vec2) -> Self {
        self.0.translation = translation;
        self
    }

    /// Angle of the transformed x axis, in radians.
    pub fn rotation(&self) -> f32 {
        self.0.matrix2.x_axis.to_angle()
    }

    /// Decomposes into `(scale, angle, translation)`; `None` when singular.
    pub fn to_scale_angle_translation(&self) -> Option<(Vec2, f32, Vec2)> {
        self.invert()?;
        Some(self.0.to_scale_angle_translation())
    }

    pub fn abs_diff_eq(&self, other: &Self, max_abs_diff: f32) -> bool {
        self.0.abs_diff_eq(other.0, max_abs_diff)
    }
}

impl Mul for AffineTransform {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        self.append(&rhs)
    }
}
