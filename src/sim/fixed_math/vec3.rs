use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::FixedNum;

/// 3-component fixed-point vector.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FixedVec3 {
    pub x: FixedNum,
    pub y: FixedNum,
    pub z: FixedNum,
}

impl FixedVec3 {
    pub const ZERO: Self = Self {
        x: FixedNum::ZERO,
        y: FixedNum::ZERO,
        z: FixedNum::ZERO,
    };

    pub const ONE: Self = Self {
        x: FixedNum::ONE,
        y: FixedNum::ONE,
        z: FixedNum::ONE,
    };

    /// Canonical right axis.
    pub const X: Self = Self {
        x: FixedNum::ONE,
        y: FixedNum::ZERO,
        z: FixedNum::ZERO,
    };

    /// Canonical up axis.
    pub const Y: Self = Self {
        x: FixedNum::ZERO,
        y: FixedNum::ONE,
        z: FixedNum::ZERO,
    };

    /// Canonical forward axis.
    pub const Z: Self = Self {
        x: FixedNum::ZERO,
        y: FixedNum::ZERO,
        z: FixedNum::ONE,
    };

    pub fn new(x: FixedNum, y: FixedNum, z: FixedNum) -> Self {
        Self { x, y, z }
    }

    pub fn splat(v: FixedNum) -> Self {
        Self { x: v, y: v, z: v }
    }

    pub fn from_f32(x: f32, y: f32, z: f32) -> Self {
        Self {
            x: FixedNum::from_num(x),
            y: FixedNum::from_num(y),
            z: FixedNum::from_num(z),
        }
    }

    pub fn from_vec3(v: Vec3) -> Self {
        Self::from_f32(v.x, v.y, v.z)
    }

    pub fn to_vec3(self) -> Vec3 {
        Vec3::new(self.x.to_num(), self.y.to_num(), self.z.to_num())
    }

    pub fn length(self) -> FixedNum {
        let len_sq = self.length_squared();
        if len_sq == FixedNum::ZERO {
            return FixedNum::ZERO;
        }
        len_sq.sqrt()
    }

    pub fn length_squared(self) -> FixedNum {
        self.x * self.x + self.y * self.y + self.z * self.z
    }

    pub fn distance_squared(self, other: Self) -> FixedNum {
        (self - other).length_squared()
    }

    /// Normalizing the zero vector yields the zero vector, not a fault.
    pub fn normalize(self) -> Self {
        let len = self.length();
        if len == FixedNum::ZERO {
            Self::ZERO
        } else {
            Self {
                x: self.x / len,
                y: self.y / len,
                z: self.z / len,
            }
        }
    }

    pub fn dot(self, other: Self) -> FixedNum {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Right-handed cross product. Parallel inputs yield zero, not an error.
    pub fn cross(self, other: Self) -> Self {
        Self {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    pub fn lerp(self, other: Self, t: FixedNum) -> Self {
        self + (other - self) * t
    }

    /// Component-wise division where a zero divisor component maps to zero.
    ///
    /// Used by the inverse scale transforms; a zero scale axis flattens
    /// space, so mapping back onto it is defined as zero rather than a
    /// division fault.
    pub fn div_or_zero(self, other: Self) -> Self {
        let div = |a: FixedNum, b: FixedNum| {
            if b == FixedNum::ZERO {
                FixedNum::ZERO
            } else {
                a / b
            }
        };
        Self {
            x: div(self.x, other.x),
            y: div(self.y, other.y),
            z: div(self.z, other.z),
        }
    }
}

impl std::ops::Add for FixedVec3 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
            z: self.z + rhs.z,
        }
    }
}

impl std::ops::Sub for FixedVec3 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
            z: self.z - rhs.z,
        }
    }
}

impl std::ops::Mul<FixedNum> for FixedVec3 {
    type Output = Self;
    fn mul(self, rhs: FixedNum) -> Self::Output {
        Self {
            x: self.x * rhs,
            y: self.y * rhs,
            z: self.z * rhs,
        }
    }
}

/// Component-wise product, used for scale application.
impl std::ops::Mul<FixedVec3> for FixedVec3 {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x * rhs.x,
            y: self.y * rhs.y,
            z: self.z * rhs.z,
        }
    }
}

impl std::ops::Div<FixedNum> for FixedVec3 {
    type Output = Self;
    fn div(self, rhs: FixedNum) -> Self::Output {
        Self {
            x: self.x / rhs,
            y: self.y / rhs,
            z: self.z / rhs,
        }
    }
}

impl std::ops::Neg for FixedVec3 {
    type Output = Self;
    fn neg(self) -> Self::Output {
        Self {
            x: -self.x,
            y: -self.y,
            z: -self.z,
        }
    }
}
