use serde::{Deserialize, Serialize};

use super::{FixedMat3, FixedNum, FixedVec3, EPSILON, INFINITY};

/// 4×4 fixed-point affine matrix, row-major: a 3×3 rotation block plus a
/// translation column. Vectors are columns (`transform_point` computes
/// `M · [p, 1]`), so the left operand of a product is the second-applied
/// transform.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedMat4 {
    pub m: [[FixedNum; 4]; 4],
}

impl FixedMat4 {
    pub const IDENTITY: Self = {
        let mut m = [[FixedNum::ZERO; 4]; 4];
        m[0][0] = FixedNum::ONE;
        m[1][1] = FixedNum::ONE;
        m[2][2] = FixedNum::ONE;
        m[3][3] = FixedNum::ONE;
        Self { m }
    };

    /// Inverse of a singular matrix: all components are the [`INFINITY`]
    /// sentinel, mirroring [`FixedMat3::SINGULAR`].
    pub const SINGULAR: Self = Self {
        m: [[INFINITY; 4]; 4],
    };

    pub fn from_rotation(rot: FixedMat3) -> Self {
        Self::from_rotation_translation(rot, FixedVec3::ZERO)
    }

    pub fn from_rotation_translation(rot: FixedMat3, t: FixedVec3) -> Self {
        let mut m = Self::IDENTITY.m;
        m[0][0] = rot.m00;
        m[0][1] = rot.m01;
        m[0][2] = rot.m02;
        m[1][0] = rot.m10;
        m[1][1] = rot.m11;
        m[1][2] = rot.m12;
        m[2][0] = rot.m20;
        m[2][1] = rot.m21;
        m[2][2] = rot.m22;
        m[0][3] = t.x;
        m[1][3] = t.y;
        m[2][3] = t.z;
        Self { m }
    }

    pub fn rotation_block(&self) -> FixedMat3 {
        FixedMat3::new(
            self.m[0][0],
            self.m[0][1],
            self.m[0][2],
            self.m[1][0],
            self.m[1][1],
            self.m[1][2],
            self.m[2][0],
            self.m[2][1],
            self.m[2][2],
        )
    }

    pub fn translation(&self) -> FixedVec3 {
        FixedVec3::new(self.m[0][3], self.m[1][3], self.m[2][3])
    }

    pub fn transpose(&self) -> Self {
        let mut out = [[FixedNum::ZERO; 4]; 4];
        for (r, row) in self.m.iter().enumerate() {
            for (c, v) in row.iter().enumerate() {
                out[c][r] = *v;
            }
        }
        Self { m: out }
    }

    /// Determinant of the 3×3 minor obtained by deleting row `r` and
    /// column `c`.
    fn minor(&self, r: usize, c: usize) -> FixedNum {
        let mut rows = [0usize; 3];
        let mut cols = [0usize; 3];
        let mut ri = 0;
        let mut ci = 0;
        for i in 0..4 {
            if i != r {
                rows[ri] = i;
                ri += 1;
            }
            if i != c {
                cols[ci] = i;
                ci += 1;
            }
        }
        let e = |i: usize, j: usize| self.m[rows[i]][cols[j]];
        e(0, 0) * (e(1, 1) * e(2, 2) - e(1, 2) * e(2, 1))
            - e(0, 1) * (e(1, 0) * e(2, 2) - e(1, 2) * e(2, 0))
            + e(0, 2) * (e(1, 0) * e(2, 1) - e(1, 1) * e(2, 0))
    }

    fn cofactor(&self, r: usize, c: usize) -> FixedNum {
        let minor = self.minor(r, c);
        if (r + c) % 2 == 0 {
            minor
        } else {
            -minor
        }
    }

    /// Cofactor expansion along the first row, over 3×3 minors.
    pub fn determinant(&self) -> FixedNum {
        (0..4)
            .map(|c| self.m[0][c] * self.cofactor(0, c))
            .sum()
    }

    pub fn is_invertible(&self) -> bool {
        self.determinant() != FixedNum::ZERO
    }

    pub fn is_singular(&self) -> bool {
        *self == Self::SINGULAR
    }

    /// True for `[R | t; 0 0 0 1]` with orthonormal `R`, the shape every
    /// matrix produced by transform composition has.
    fn is_rigid(&self) -> bool {
        self.m[3][0] == FixedNum::ZERO
            && self.m[3][1] == FixedNum::ZERO
            && self.m[3][2] == FixedNum::ZERO
            && self.m[3][3] == FixedNum::ONE
            && self.rotation_block().is_orthonormal(EPSILON)
    }

    /// Inverse.
    ///
    /// For the common rigid case the block form `[Rᵀ, −Rᵀt; 0 1]` is exact
    /// and cheap; anything else falls back to the general adjugate over the
    /// determinant. A zero determinant yields [`Self::SINGULAR`] instead of
    /// faulting, keeping degenerate input deterministic across platforms.
    pub fn inverse(&self) -> Self {
        if self.is_rigid() {
            let rt = self.rotation_block().transpose();
            let t = self.translation();
            return Self::from_rotation_translation(rt, -(rt * t));
        }

        let det = self.determinant();
        if det == FixedNum::ZERO {
            return Self::SINGULAR;
        }
        let mut out = [[FixedNum::ZERO; 4]; 4];
        for r in 0..4 {
            for c in 0..4 {
                // Adjugate: transposed cofactors.
                out[c][r] = self.cofactor(r, c) / det;
            }
        }
        Self { m: out }
    }

    /// Transform a point: rotation plus translation.
    pub fn transform_point(&self, p: FixedVec3) -> FixedVec3 {
        FixedVec3 {
            x: self.m[0][0] * p.x + self.m[0][1] * p.y + self.m[0][2] * p.z + self.m[0][3],
            y: self.m[1][0] * p.x + self.m[1][1] * p.y + self.m[1][2] * p.z + self.m[1][3],
            z: self.m[2][0] * p.x + self.m[2][1] * p.y + self.m[2][2] * p.z + self.m[2][3],
        }
    }

    /// Transform a vector: rotation only, translation ignored.
    pub fn transform_vector(&self, v: FixedVec3) -> FixedVec3 {
        FixedVec3 {
            x: self.m[0][0] * v.x + self.m[0][1] * v.y + self.m[0][2] * v.z,
            y: self.m[1][0] * v.x + self.m[1][1] * v.y + self.m[1][2] * v.z,
            z: self.m[2][0] * v.x + self.m[2][1] * v.y + self.m[2][2] * v.z,
        }
    }
}

impl std::ops::Mul for FixedMat4 {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self::Output {
        let mut out = [[FixedNum::ZERO; 4]; 4];
        for r in 0..4 {
            for c in 0..4 {
                let mut acc = FixedNum::ZERO;
                for (k, rhs_row) in rhs.m.iter().enumerate() {
                    acc += self.m[r][k] * rhs_row[c];
                }
                out[r][c] = acc;
            }
        }
        Self { m: out }
    }
}

impl std::ops::Add for FixedMat4 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        let mut out = self.m;
        for (r, row) in rhs.m.iter().enumerate() {
            for (c, v) in row.iter().enumerate() {
                out[r][c] += *v;
            }
        }
        Self { m: out }
    }
}
