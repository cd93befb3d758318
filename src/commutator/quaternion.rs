// Quaternion and vector types for orientation samples
//
// Public component order is (w, x, y, z): scalar first.

use std::ops::Mul;

/// Threshold under which a norm is treated as zero
const NORM_EPSILON: f64 = 1e-12;

/// Plain 3-D vector
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn dot(&self, other: &Vector3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn norm(&self) -> f64 {
        self.dot(self).sqrt()
    }

    pub fn scale(&self, k: f64) -> Vector3 {
        Vector3::new(self.x * k, self.y * k, self.z * k)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// Orientation quaternion, Hamilton convention
///
/// The all-zero value is the "no sample yet" sentinel and is never a valid orientation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quaternion {
    pub w: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::SENTINEL
    }
}

impl Quaternion {
    /// "No data yet" marker
    pub const SENTINEL: Quaternion = Quaternion {
        w: 0.0,
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub const IDENTITY: Quaternion = Quaternion {
        w: 1.0,
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub const fn new(w: f64, x: f64, y: f64, z: f64) -> Self {
        Self { w, x, y, z }
    }

    /// Build from `[w, x, y, z]`, the only ordering accepted at the public boundary
    pub const fn from_wxyz(q: [f64; 4]) -> Self {
        Self::new(q[0], q[1], q[2], q[3])
    }

    pub const fn to_wxyz(&self) -> [f64; 4] {
        [self.w, self.x, self.y, self.z]
    }

    /// Rotation of `angle` radians about `axis` (axis need not be unit length)
    pub fn from_axis_angle(axis: Vector3, angle: f64) -> Self {
        let n = axis.norm();
        if n < NORM_EPSILON {
            return Self::IDENTITY;
        }
        let half = angle / 2.0;
        let v = axis.scale(half.sin() / n);
        Self::new(half.cos(), v.x, v.y, v.z)
    }

    pub fn vector(&self) -> Vector3 {
        Vector3::new(self.x, self.y, self.z)
    }

    pub fn norm(&self) -> f64 {
        (self.w * self.w + self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    pub fn is_sentinel(&self) -> bool {
        self.w == 0.0 && self.x == 0.0 && self.y == 0.0 && self.z == 0.0
    }

    pub fn is_finite(&self) -> bool {
        self.w.is_finite() && self.vector().is_finite()
    }

    /// Unit-length copy, or `None` for the sentinel, non-finite or degenerate values
    pub fn normalized(&self) -> Option<Quaternion> {
        if !self.is_finite() {
            return None;
        }
        let n = self.norm();
        if n < NORM_EPSILON {
            return None;
        }
        Some(Self::new(self.w / n, self.x / n, self.y / n, self.z / n))
    }

    pub fn negated(&self) -> Quaternion {
        Self::new(-self.w, -self.x, -self.y, -self.z)
    }
}

/// Hamilton product: `a * b` applies `b` first, then `a`
impl Mul for Quaternion {
    type Output = Quaternion;

    fn mul(self, rhs: Quaternion) -> Quaternion {
        Quaternion::new(
            self.w * rhs.w - self.x * rhs.x - self.y * rhs.y - self.z * rhs.z,
            self.w * rhs.x + self.x * rhs.w + self.y * rhs.z - self.z * rhs.y,
            self.w * rhs.y - self.x * rhs.z + self.y * rhs.w + self.z * rhs.x,
            self.w * rhs.z + self.x * rhs.y - self.y * rhs.x + self.z * rhs.w,
        )
    }
}
