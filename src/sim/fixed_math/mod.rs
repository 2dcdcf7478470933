//! Deterministic fixed-point mathematics library.
//!
//! This module provides deterministic math types and operations using
//! fixed-point arithmetic to ensure identical behavior across different
//! platforms and architectures. This is critical for multiplayer lockstep
//! networking where all clients must simulate identically.
//!
//! Floats exist only at the host-engine boundary (`to_vec3`, `to_quat` and
//! friends); nothing inside the simulation ever touches an `f32`.

use fixed::types::I48F16;

pub use mat3::FixedMat3;
pub use mat4::FixedMat4;
pub use quat::FixedQuat;
pub use vec3::FixedVec3;

pub mod mat3;
pub mod mat4;
pub mod quat;
pub mod vec3;

#[cfg(test)]
mod tests;

/// Fixed-point number type used throughout the simulation.
///
/// Uses I48F16 format: 48 bits for the integer part, 16 bits for the
/// fractional part. This provides a range of approximately ±140 trillion
/// with a precision of ~0.000015.
pub type FixedNum = I48F16;

/// π as an exact bit pattern (205887 / 65536). Truncated rather than
/// rounded so every derived constant below is a plain multiple of it.
pub const PI: FixedNum = FixedNum::from_bits(205_887);

/// 2π, exactly twice [`PI`].
pub const TAU: FixedNum = FixedNum::from_bits(411_774);

/// π/2 for gimbal-lock clamping and axis construction.
pub const HALF_PI: FixedNum = FixedNum::from_bits(102_943);

/// Default comparison tolerance (~0.001). Exact bit pattern, so epsilon
/// comparisons are themselves deterministic.
pub const EPSILON: FixedNum = FixedNum::from_bits(66);

/// Sentinel standing in for positive infinity.
///
/// Fixed-point has no IEEE infinity, so singular-matrix results are filled
/// with the saturating maximum instead of raising a fault. A fault could
/// fire on one platform's intermediate state and not another's, which
/// would break lockstep; a sentinel compares identically everywhere.
pub const INFINITY: FixedNum = FixedNum::MAX;

/// Wrap an angle into `[-π, π)`.
///
/// The trig kernels expect their argument in the principal range; callers
/// routinely accumulate angles past it (e.g. repeated `rotate` calls).
pub fn wrap_angle(angle: FixedNum) -> FixedNum {
    let mut a = angle % TAU;
    if a >= PI {
        a -= TAU;
    } else if a < -PI {
        a += TAU;
    }
    a
}

/// Deterministic sine.
pub fn sin(angle: FixedNum) -> FixedNum {
    fixed_trigonometry::sin(wrap_angle(angle))
}

/// Deterministic cosine.
pub fn cos(angle: FixedNum) -> FixedNum {
    fixed_trigonometry::cos(wrap_angle(angle))
}

/// Deterministic four-quadrant arctangent. `atan2(0, 0)` is defined as 0.
pub fn atan2(y: FixedNum, x: FixedNum) -> FixedNum {
    if y == FixedNum::ZERO && x == FixedNum::ZERO {
        return FixedNum::ZERO;
    }
    fixed_trigonometry::atan::atan2(y, x)
}

/// Deterministic arcsine, derived from `atan2` and `sqrt`.
///
/// The operand is clamped to `[-1, 1]` first; fixed-point drift routinely
/// pushes matrix elements a hair past the legal range, and the clamp is
/// exactly the gimbal-lock behavior the quaternion extraction relies on.
pub fn asin(s: FixedNum) -> FixedNum {
    if s >= FixedNum::ONE {
        return HALF_PI;
    }
    if s <= -FixedNum::ONE {
        return -HALF_PI;
    }
    atan2(s, sqrt(FixedNum::ONE - s * s))
}

/// Square root that treats negative input as zero.
///
/// Negative operands only arise from accumulated rounding in expressions
/// that are non-negative in exact arithmetic.
pub fn sqrt(v: FixedNum) -> FixedNum {
    if v <= FixedNum::ZERO {
        FixedNum::ZERO
    } else {
        v.sqrt()
    }
}
