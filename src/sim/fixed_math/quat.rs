use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::{asin, atan2, cos, sin, sqrt, FixedNum, FixedVec3, EPSILON, HALF_PI};

/// Unit rotation quaternion with fixed-point components.
///
/// The unit-magnitude invariant is not self-maintaining under fixed-point
/// arithmetic: every product loses a few low bits. Public composition paths
/// therefore renormalize after multiplying rather than trusting the inputs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedQuat {
    pub x: FixedNum,
    pub y: FixedNum,
    pub z: FixedNum,
    pub w: FixedNum,
}

impl FixedQuat {
    pub const IDENTITY: Self = Self {
        x: FixedNum::ZERO,
        y: FixedNum::ZERO,
        z: FixedNum::ZERO,
        w: FixedNum::ONE,
    };

    pub fn new(x: FixedNum, y: FixedNum, z: FixedNum, w: FixedNum) -> Self {
        Self { x, y, z, w }
    }

    pub fn magnitude_squared(self) -> FixedNum {
        self.x * self.x + self.y * self.y + self.z * self.z + self.w * self.w
    }

    pub fn magnitude(self) -> FixedNum {
        sqrt(self.magnitude_squared())
    }

    pub fn dot(self, other: Self) -> FixedNum {
        self.x * other.x + self.y * other.y + self.z * other.z + self.w * other.w
    }

    /// Renormalize to unit magnitude. A degenerate zero quaternion yields
    /// the identity, not a fault.
    pub fn normalize(self) -> Self {
        let mag = self.magnitude();
        if mag == FixedNum::ZERO {
            return Self::IDENTITY;
        }
        Self {
            x: self.x / mag,
            y: self.y / mag,
            z: self.z / mag,
            w: self.w / mag,
        }
    }

    /// Conjugate; equals the inverse for unit quaternions.
    pub fn conjugate(self) -> Self {
        Self {
            x: -self.x,
            y: -self.y,
            z: -self.z,
            w: self.w,
        }
    }

    pub fn inverse(self) -> Self {
        self.conjugate()
    }

    /// Rotation about a (not necessarily normalized) axis, angle in radians.
    pub fn from_axis_angle(axis: FixedVec3, angle: FixedNum) -> Self {
        let axis = axis.normalize();
        let half = angle / FixedNum::from_num(2);
        let s = sin(half);
        Self {
            x: axis.x * s,
            y: axis.y * s,
            z: axis.z * s,
            w: cos(half),
        }
        .normalize()
    }

    /// Build from Euler angles (radians), applied in fixed Y·X·Z order:
    /// yaw about Y, then pitch about X, then roll about Z.
    pub fn from_euler(euler: FixedVec3) -> Self {
        let yaw = Self::from_axis_angle(FixedVec3::Y, euler.y);
        let pitch = Self::from_axis_angle(FixedVec3::X, euler.x);
        let roll = Self::from_axis_angle(FixedVec3::Z, euler.z);
        (yaw * pitch * roll).normalize()
    }

    /// Extract Y·X·Z Euler angles (radians), inverse of [`Self::from_euler`].
    ///
    /// At the gimbal-lock singularity (pitch at ±π/2) yaw and roll collapse
    /// into one degree of freedom; the extraction clamps the pitch operand
    /// and assigns the whole twist to yaw with roll zeroed, so the result
    /// is always well defined.
    pub fn to_euler(self) -> FixedVec3 {
        let two = FixedNum::from_num(2);

        // Rotation-matrix elements expressed in quaternion terms.
        let sin_pitch = two * (self.w * self.x - self.y * self.z);

        if sin_pitch.abs() >= FixedNum::ONE - EPSILON {
            let pitch = if sin_pitch > FixedNum::ZERO {
                HALF_PI
            } else {
                -HALF_PI
            };
            let m20 = two * (self.x * self.z - self.w * self.y);
            let m00 = FixedNum::ONE - two * (self.y * self.y + self.z * self.z);
            return FixedVec3::new(pitch, atan2(-m20, m00), FixedNum::ZERO);
        }

        let m02 = two * (self.x * self.z + self.w * self.y);
        let m22 = FixedNum::ONE - two * (self.x * self.x + self.y * self.y);
        let m10 = two * (self.x * self.y + self.w * self.z);
        let m11 = FixedNum::ONE - two * (self.x * self.x + self.z * self.z);

        FixedVec3::new(asin(sin_pitch), atan2(m02, m22), atan2(m10, m11))
    }

    pub fn from_quat(q: Quat) -> Self {
        Self {
            x: FixedNum::from_num(q.x),
            y: FixedNum::from_num(q.y),
            z: FixedNum::from_num(q.z),
            w: FixedNum::from_num(q.w),
        }
        .normalize()
    }

    pub fn to_quat(self) -> Quat {
        Quat::from_xyzw(
            self.x.to_num(),
            self.y.to_num(),
            self.z.to_num(),
            self.w.to_num(),
        )
        .normalize()
    }
}

impl Default for FixedQuat {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Hamilton product. Non-commutative: `a * b` applies `b` first, then `a`.
/// Composing a delta in the rotating body's own space is `current * delta`;
/// in world space it is `delta * current`.
impl std::ops::Mul for FixedQuat {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self::Output {
        Self {
            x: self.w * rhs.x + self.x * rhs.w + self.y * rhs.z - self.z * rhs.y,
            y: self.w * rhs.y - self.x * rhs.z + self.y * rhs.w + self.z * rhs.x,
            z: self.w * rhs.z + self.x * rhs.y - self.y * rhs.x + self.z * rhs.w,
            w: self.w * rhs.w - self.x * rhs.x - self.y * rhs.y - self.z * rhs.z,
        }
    }
}

/// Rotate a vector: `v + 2w(qv × v) + 2(qv × (qv × v))`.
impl std::ops::Mul<FixedVec3> for FixedQuat {
    type Output = FixedVec3;
    fn mul(self, v: FixedVec3) -> FixedVec3 {
        let qv = FixedVec3::new(self.x, self.y, self.z);
        let t = qv.cross(v) * FixedNum::from_num(2);
        v + t * self.w + qv.cross(t)
    }
}
