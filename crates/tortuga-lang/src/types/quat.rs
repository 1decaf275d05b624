//! Unit quaternions for turtle orientation.
//!
//! Every constructed value is normalised and has near-zero components snapped
//! to exactly zero, so repeated composition does not drift off unit length.

use glam::DVec3;
use serde::{Deserialize, Serialize};
use std::ops::Mul;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quaternion {
    pub w: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Default for Quaternion {
    fn default() -> Self { Self::IDENTITY }
}

fn snap(v: f64) -> f64 {
    if v.abs() < f64::EPSILON { 0.0 } else { v }
}

impl Quaternion {
    pub const IDENTITY: Self = Self { w: 1.0, x: 0.0, y: 0.0, z: 0.0 };

    /// Normalising constructor. A zero-length input collapses to the identity.
    pub fn new(w: f64, x: f64, y: f64, z: f64) -> Self {
        let len = (w * w + x * x + y * y + z * z).sqrt();
        if len < f64::EPSILON || !len.is_finite() {
            return Self::IDENTITY;
        }
        Self { w: snap(w / len), x: snap(x / len), y: snap(y / len), z: snap(z / len) }
    }

    /// Rotation of `degrees` about `axis`. The angle is reduced modulo 360
    /// first; a vanishing angle or axis gives the identity.
    pub fn from_axis_angle(axis: DVec3, degrees: f64) -> Self {
        let angle = degrees % 360.0;
        let len = axis.length();
        if angle.abs() < f64::EPSILON || len < f64::EPSILON || !angle.is_finite() {
            return Self::IDENTITY;
        }
        let axis = axis / len;
        let half = angle.to_radians() / 2.0;
        let s = half.sin();
        Self::new(half.cos(), axis.x * s, axis.y * s, axis.z * s)
    }

    pub fn is_identity(&self) -> bool {
        (self.w.abs() - 1.0).abs() < f64::EPSILON
            && self.x.abs() < f64::EPSILON
            && self.y.abs() < f64::EPSILON
            && self.z.abs() < f64::EPSILON
    }

    pub fn conjugate(&self) -> Self {
        Self { w: self.w, x: -self.x, y: -self.y, z: -self.z }
    }

    /// Hamilton product `self * other`: apply `other` in the frame of `self`.
    pub fn multiply(&self, other: &Self) -> Self {
        let (w, x, y, z) = hamilton(self, other);
        Self::new(w, x, y, z)
    }

    /// Rotates `v` by this quaternion (q · v · q*).
    pub fn rotate(&self, v: DVec3) -> DVec3 {
        if self.is_identity() {
            return v;
        }
        // Pure quaternions are not unit length, so build them raw.
        let p = Self { w: 0.0, x: v.x, y: v.y, z: v.z };
        let (w1, x1, y1, z1) = hamilton(self, &p);
        let left = Self { w: w1, x: x1, y: y1, z: z1 };
        let (_, x, y, z) = hamilton(&left, &self.conjugate());
        DVec3::new(snap(x), snap(y), snap(z))
    }

    /// 2-D affine projection `[a, b, c, d, e, f]` in canvas `setTransform`
    /// order: the images of the unit x and y axes dropped onto the xy plane.
    pub fn transform_values(&self) -> [f64; 6] {
        let ex = self.rotate(DVec3::X);
        let ey = self.rotate(DVec3::Y);
        [ex.x, ex.y, ey.x, ey.y, 0.0, 0.0]
    }
}

fn hamilton(a: &Quaternion, b: &Quaternion) -> (f64, f64, f64, f64) {
    (
        a.w * b.w - a.x * b.x - a.y * b.y - a.z * b.z,
        a.w * b.x + a.x * b.w + a.y * b.z - a.z * b.y,
        a.w * b.y - a.x * b.z + a.y * b.w + a.z * b.x,
        a.w * b.z + a.x * b.y - a.y * b.x + a.z * b.w,
    )
}

impl Mul for Quaternion {
    type Output = Quaternion;
    fn mul(self, rhs: Quaternion) -> Quaternion { self.multiply(&rhs) }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
