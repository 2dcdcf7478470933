use serde::{Deserialize, Serialize};

use super::{cos, sin, sqrt, FixedNum, FixedQuat, FixedVec3, EPSILON, INFINITY};

/// 3×3 fixed-point matrix, row-major (`mRC` = row R, column C).
///
/// Vectors are columns: `m * v` applies the transform, and in a product the
/// left operand is the second-applied transform. The matrix is orthonormal
/// only when constructed from a normalized quaternion or axis-angle; nothing
/// enforces it in general.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedMat3 {
    pub m00: FixedNum,
    pub m01: FixedNum,
    pub m02: FixedNum,
    pub m10: FixedNum,
    pub m11: FixedNum,
    pub m12: FixedNum,
    pub m20: FixedNum,
    pub m21: FixedNum,
    pub m22: FixedNum,
}

impl FixedMat3 {
    pub const ZERO: Self = Self {
        m00: FixedNum::ZERO,
        m01: FixedNum::ZERO,
        m02: FixedNum::ZERO,
        m10: FixedNum::ZERO,
        m11: FixedNum::ZERO,
        m12: FixedNum::ZERO,
        m20: FixedNum::ZERO,
        m21: FixedNum::ZERO,
        m22: FixedNum::ZERO,
    };

    pub const IDENTITY: Self = Self {
        m00: FixedNum::ONE,
        m01: FixedNum::ZERO,
        m02: FixedNum::ZERO,
        m10: FixedNum::ZERO,
        m11: FixedNum::ONE,
        m12: FixedNum::ZERO,
        m20: FixedNum::ZERO,
        m21: FixedNum::ZERO,
        m22: FixedNum::ONE,
    };

    /// Result of inverting a singular matrix: every component is the
    /// [`INFINITY`] sentinel. Callers probe invertibility explicitly
    /// instead of catching a fault.
    pub const SINGULAR: Self = Self {
        m00: INFINITY,
        m01: INFINITY,
        m02: INFINITY,
        m10: INFINITY,
        m11: INFINITY,
        m12: INFINITY,
        m20: INFINITY,
        m21: INFINITY,
        m22: INFINITY,
    };

    #[allow(clippy::too_many_arguments)]
    pub fn new(
        m00: FixedNum,
        m01: FixedNum,
        m02: FixedNum,
        m10: FixedNum,
        m11: FixedNum,
        m12: FixedNum,
        m20: FixedNum,
        m21: FixedNum,
        m22: FixedNum,
    ) -> Self {
        Self {
            m00,
            m01,
            m02,
            m10,
            m11,
            m12,
            m20,
            m21,
            m22,
        }
    }

    /// Rotation matrix from a unit quaternion (standard formula).
    pub fn from_quaternion(q: FixedQuat) -> Self {
        let two = FixedNum::from_num(2);
        let (x, y, z, w) = (q.x, q.y, q.z, q.w);
        Self {
            m00: FixedNum::ONE - two * (y * y + z * z),
            m01: two * (x * y - w * z),
            m02: two * (x * z + w * y),
            m10: two * (x * y + w * z),
            m11: FixedNum::ONE - two * (x * x + z * z),
            m12: two * (y * z - w * x),
            m20: two * (x * z - w * y),
            m21: two * (y * z + w * x),
            m22: FixedNum::ONE - two * (x * x + y * y),
        }
    }

    /// Rotation about an axis by an angle in radians (Rodrigues' formula).
    pub fn from_axis_angle(axis: FixedVec3, angle: FixedNum) -> Self {
        let a = axis.normalize();
        let c = cos(angle);
        let s = sin(angle);
        let t = FixedNum::ONE - c;
        Self {
            m00: c + a.x * a.x * t,
            m01: a.x * a.y * t - a.z * s,
            m02: a.x * a.z * t + a.y * s,
            m10: a.x * a.y * t + a.z * s,
            m11: c + a.y * a.y * t,
            m12: a.y * a.z * t - a.x * s,
            m20: a.x * a.z * t - a.y * s,
            m21: a.y * a.z * t + a.x * s,
            m22: c + a.z * a.z * t,
        }
    }

    /// Orthonormal basis with local +Z pointing along `forward`.
    ///
    /// Returns `None` when `forward` is zero or parallel to `up`: a
    /// degenerate basis must be detected by the caller, never silently
    /// propagated as a non-orthonormal matrix.
    pub fn look_at(forward: FixedVec3, up: FixedVec3) -> Option<Self> {
        let z = forward.normalize();
        if z == FixedVec3::ZERO {
            return None;
        }
        let x = up.cross(z);
        if x.length_squared() <= EPSILON {
            return None;
        }
        let x = x.normalize();
        let y = z.cross(x);
        Some(Self {
            m00: x.x,
            m01: y.x,
            m02: z.x,
            m10: x.y,
            m11: y.y,
            m12: z.y,
            m20: x.z,
            m21: y.z,
            m22: z.z,
        })
    }

    /// Extract the rotation as a quaternion (Shepperd's trace branching),
    /// renormalized to absorb fixed-point drift.
    pub fn to_quaternion(&self) -> FixedQuat {
        let two = FixedNum::from_num(2);
        let quarter = FixedNum::from_num(0.25);
        let trace = self.m00 + self.m11 + self.m22;

        let q = if trace > FixedNum::ZERO {
            let s = sqrt(trace + FixedNum::ONE) * two;
            FixedQuat::new(
                (self.m21 - self.m12) / s,
                (self.m02 - self.m20) / s,
                (self.m10 - self.m01) / s,
                quarter * s,
            )
        } else if self.m00 > self.m11 && self.m00 > self.m22 {
            let s = sqrt(FixedNum::ONE + self.m00 - self.m11 - self.m22) * two;
            FixedQuat::new(
                quarter * s,
                (self.m01 + self.m10) / s,
                (self.m02 + self.m20) / s,
                (self.m21 - self.m12) / s,
            )
        } else if self.m11 > self.m22 {
            let s = sqrt(FixedNum::ONE + self.m11 - self.m00 - self.m22) * two;
            FixedQuat::new(
                (self.m01 + self.m10) / s,
                quarter * s,
                (self.m12 + self.m21) / s,
                (self.m02 - self.m20) / s,
            )
        } else {
            let s = sqrt(FixedNum::ONE + self.m22 - self.m00 - self.m11) * two;
            FixedQuat::new(
                (self.m02 + self.m20) / s,
                (self.m12 + self.m21) / s,
                quarter * s,
                (self.m10 - self.m01) / s,
            )
        };
        q.normalize()
    }

    pub fn transpose(&self) -> Self {
        Self {
            m00: self.m00,
            m01: self.m10,
            m02: self.m20,
            m10: self.m01,
            m11: self.m11,
            m12: self.m21,
            m20: self.m02,
            m21: self.m12,
            m22: self.m22,
        }
    }

    /// Cofactor expansion along the first row.
    pub fn determinant(&self) -> FixedNum {
        self.m00 * (self.m11 * self.m22 - self.m12 * self.m21)
            - self.m01 * (self.m10 * self.m22 - self.m12 * self.m20)
            + self.m02 * (self.m10 * self.m21 - self.m11 * self.m20)
    }

    pub fn is_invertible(&self) -> bool {
        self.determinant() != FixedNum::ZERO
    }

    pub fn is_singular(&self) -> bool {
        *self == Self::SINGULAR
    }

    /// Exact adjugate-over-determinant inverse.
    ///
    /// A zero determinant yields [`Self::SINGULAR`] rather than a fault;
    /// invertibility is routinely probed here, and a platform-dependent
    /// fault would break lockstep where a sentinel cannot.
    pub fn inverse(&self) -> Self {
        let det = self.determinant();
        if det == FixedNum::ZERO {
            return Self::SINGULAR;
        }
        Self {
            m00: (self.m11 * self.m22 - self.m12 * self.m21) / det,
            m01: (self.m02 * self.m21 - self.m01 * self.m22) / det,
            m02: (self.m01 * self.m12 - self.m02 * self.m11) / det,
            m10: (self.m12 * self.m20 - self.m10 * self.m22) / det,
            m11: (self.m00 * self.m22 - self.m02 * self.m20) / det,
            m12: (self.m02 * self.m10 - self.m00 * self.m12) / det,
            m20: (self.m10 * self.m21 - self.m11 * self.m20) / det,
            m21: (self.m01 * self.m20 - self.m00 * self.m21) / det,
            m22: (self.m00 * self.m11 - self.m01 * self.m10) / det,
        }
    }

    /// True when `self * selfᵀ` is the identity within `eps` per component.
    pub fn is_orthonormal(&self, eps: FixedNum) -> bool {
        let p = *self * self.transpose();
        let close = |a: FixedNum, b: FixedNum| (a - b).abs() <= eps;
        close(p.m00, FixedNum::ONE)
            && close(p.m11, FixedNum::ONE)
            && close(p.m22, FixedNum::ONE)
            && close(p.m01, FixedNum::ZERO)
            && close(p.m02, FixedNum::ZERO)
            && close(p.m10, FixedNum::ZERO)
            && close(p.m12, FixedNum::ZERO)
            && close(p.m20, FixedNum::ZERO)
            && close(p.m21, FixedNum::ZERO)
    }
}

impl std::ops::Mul for FixedMat3 {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self::Output {
        Self {
            m00: self.m00 * rhs.m00 + self.m01 * rhs.m10 + self.m02 * rhs.m20,
            m01: self.m00 * rhs.m01 + self.m01 * rhs.m11 + self.m02 * rhs.m21,
            m02: self.m00 * rhs.m02 + self.m01 * rhs.m12 + self.m02 * rhs.m22,
            m10: self.m10 * rhs.m00 + self.m11 * rhs.m10 + self.m12 * rhs.m20,
            m11: self.m10 * rhs.m01 + self.m11 * rhs.m11 + self.m12 * rhs.m21,
            m12: self.m10 * rhs.m02 + self.m11 * rhs.m12 + self.m12 * rhs.m22,
            m20: self.m20 * rhs.m00 + self.m21 * rhs.m10 + self.m22 * rhs.m20,
            m21: self.m20 * rhs.m01 + self.m21 * rhs.m11 + self.m22 * rhs.m21,
            m22: self.m20 * rhs.m02 + self.m21 * rhs.m12 + self.m22 * rhs.m22,
        }
    }
}

impl std::ops::Add for FixedMat3 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self {
            m00: self.m00 + rhs.m00,
            m01: self.m01 + rhs.m01,
            m02: self.m02 + rhs.m02,
            m10: self.m10 + rhs.m10,
            m11: self.m11 + rhs.m11,
            m12: self.m12 + rhs.m12,
            m20: self.m20 + rhs.m20,
            m21: self.m21 + rhs.m21,
            m22: self.m22 + rhs.m22,
        }
    }
}

impl std::ops::Mul<FixedVec3> for FixedMat3 {
    type Output = FixedVec3;
    fn mul(self, v: FixedVec3) -> FixedVec3 {
        FixedVec3 {
            x: self.m00 * v.x + self.m01 * v.y + self.m02 * v.z,
            y: self.m10 * v.x + self.m11 * v.y + self.m12 * v.z,
            z: self.m20 * v.x + self.m21 * v.y + self.m22 * v.z,
        }
    }
}
