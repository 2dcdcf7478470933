//! Tests for the fixed-point math layer.

use super::*;

fn approx(a: FixedNum, b: FixedNum, tolerance: f64) -> bool {
    (a - b).abs() <= FixedNum::from_num(tolerance)
}

fn vec_approx(a: FixedVec3, b: FixedVec3, tolerance: f64) -> bool {
    approx(a.x, b.x, tolerance) && approx(a.y, b.y, tolerance) && approx(a.z, b.z, tolerance)
}

fn mat3_approx(a: FixedMat3, b: FixedMat3, tolerance: f64) -> bool {
    approx(a.m00, b.m00, tolerance)
        && approx(a.m01, b.m01, tolerance)
        && approx(a.m02, b.m02, tolerance)
        && approx(a.m10, b.m10, tolerance)
        && approx(a.m11, b.m11, tolerance)
        && approx(a.m12, b.m12, tolerance)
        && approx(a.m20, b.m20, tolerance)
        && approx(a.m21, b.m21, tolerance)
        && approx(a.m22, b.m22, tolerance)
}

fn random_fixed(range: f32) -> FixedNum {
    FixedNum::from_num((fastrand::f32() * 2.0 - 1.0) * range)
}

fn random_vec(range: f32) -> FixedVec3 {
    FixedVec3::new(random_fixed(range), random_fixed(range), random_fixed(range))
}

fn random_unit_quat() -> FixedQuat {
    // Rejection-free: random axis and angle, normalized by construction.
    let mut axis = random_vec(1.0);
    if axis == FixedVec3::ZERO {
        axis = FixedVec3::Y;
    }
    FixedQuat::from_axis_angle(axis, random_fixed(3.0))
}

// ============================================================================
// Scalar helpers
// ============================================================================

#[test]
fn test_wrap_angle_principal_range() {
    let wrapped = wrap_angle(TAU + HALF_PI);
    assert!(approx(wrapped, HALF_PI, 1e-3), "got {}", wrapped);

    let wrapped = wrap_angle(-TAU - HALF_PI);
    assert!(approx(wrapped, -HALF_PI, 1e-3), "got {}", wrapped);
}

#[test]
fn test_sin_cos_landmarks() {
    assert!(approx(sin(FixedNum::ZERO), FixedNum::ZERO, 1e-3));
    assert!(approx(sin(HALF_PI), FixedNum::ONE, 5e-3));
    assert!(approx(cos(FixedNum::ZERO), FixedNum::ONE, 1e-3));
    assert!(approx(cos(PI), -FixedNum::ONE, 5e-3));
}

#[test]
fn test_asin_clamps_out_of_range() {
    assert_eq!(asin(FixedNum::from_num(2)), HALF_PI);
    assert_eq!(asin(FixedNum::from_num(-2)), -HALF_PI);
}

#[test]
fn test_sqrt_negative_is_zero() {
    assert_eq!(sqrt(FixedNum::from_num(-4)), FixedNum::ZERO);
    assert!(approx(sqrt(FixedNum::from_num(9)), FixedNum::from_num(3), 1e-3));
}

// ============================================================================
// Vector3
// ============================================================================

#[test]
fn test_normalize_zero_vector_is_zero() {
    assert_eq!(FixedVec3::ZERO.normalize(), FixedVec3::ZERO);
}

#[test]
fn test_normalize_unit_length() {
    fastrand::seed(7);
    for _ in 0..50 {
        let v = random_vec(20.0);
        if v == FixedVec3::ZERO {
            continue;
        }
        let n = v.normalize();
        assert!(approx(n.length(), FixedNum::ONE, 1e-2), "v={:?} n={:?}", v, n);
    }
}

#[test]
fn test_cross_of_parallel_is_zero() {
    fastrand::seed(11);
    for _ in 0..50 {
        let a = random_vec(10.0);
        assert_eq!(a.cross(a), FixedVec3::ZERO);
    }
}

#[test]
fn test_cross_is_orthogonal() {
    fastrand::seed(13);
    for _ in 0..50 {
        let a = random_vec(4.0);
        let b = random_vec(4.0);
        // dot(a, a × b) == 0 in exact arithmetic; fixed rounding leaves dust.
        let d = a.dot(a.cross(b));
        assert!(approx(d, FixedNum::ZERO, 0.05), "a={:?} b={:?} d={}", a, b, d);
    }
}

#[test]
fn test_component_div_or_zero() {
    let v = FixedVec3::from_f32(4.0, 9.0, 1.0);
    let s = FixedVec3::from_f32(2.0, 0.0, 4.0);
    let out = v.div_or_zero(s);
    assert_eq!(out.x, FixedNum::from_num(2));
    assert_eq!(out.y, FixedNum::ZERO);
    assert!(approx(out.z, FixedNum::from_num(0.25), 1e-4));
}

#[test]
fn test_vec3_serde_roundtrip() {
    let v = FixedVec3::from_f32(1.25, -3.5, 1000.0625);
    let json = serde_json::to_string(&v).unwrap();
    let back: FixedVec3 = serde_json::from_str(&json).unwrap();
    assert_eq!(v, back);
}

// ============================================================================
// Quaternion
// ============================================================================

#[test]
fn test_product_normalizes_to_unit() {
    fastrand::seed(17);
    for _ in 0..50 {
        let a = random_unit_quat();
        let b = random_unit_quat();
        let m = (a * b).normalize().magnitude();
        assert!(approx(m, FixedNum::ONE, 1e-2), "a={:?} b={:?} m={}", a, b, m);
    }
}

#[test]
fn test_identity_product() {
    let q = FixedQuat::from_axis_angle(FixedVec3::Y, HALF_PI);
    let composed = q * FixedQuat::IDENTITY;
    assert!(approx(composed.dot(q), FixedNum::ONE, 1e-2));
}

#[test]
fn test_rotate_vector_quarter_turn() {
    // 90° about Y carries +Z to +X.
    let q = FixedQuat::from_axis_angle(FixedVec3::Y, HALF_PI);
    let rotated = q * FixedVec3::Z;
    assert!(vec_approx(rotated, FixedVec3::X, 1e-2), "got {:?}", rotated);
}

#[test]
fn test_euler_roundtrip_away_from_gimbal_lock() {
    let cases = [
        (0.3f32, 0.7f32, -0.4f32),
        (-0.9, 0.2, 1.1),
        (1.0, -1.2, 0.5),
        (0.0, 2.5, 0.0),
    ];
    for (x, y, z) in cases {
        let euler = FixedVec3::from_f32(x, y, z);
        let out = FixedQuat::from_euler(euler).to_euler();
        // Compare via the rotations, which sidesteps equivalent-angle
        // representations of the same orientation.
        let a = FixedQuat::from_euler(euler);
        let b = FixedQuat::from_euler(out);
        assert!(
            approx(a.dot(b).abs(), FixedNum::ONE, 2e-2),
            "euler=({}, {}, {}) out={:?}",
            x,
            y,
            z,
            out
        );
    }
}

#[test]
fn test_euler_extraction_clamps_at_gimbal_lock() {
    // Pitch exactly at the singularity: extraction must stay finite and
    // put the whole twist in yaw.
    let s = sqrt(FixedNum::from_num(0.5));
    let q = FixedQuat::new(s, FixedNum::ZERO, FixedNum::ZERO, s).normalize();
    let out = q.to_euler();
    assert!(approx(out.x, HALF_PI, 5e-3), "pitch={}", out.x);
    assert_eq!(out.z, FixedNum::ZERO);
}

#[test]
fn test_zero_quaternion_normalizes_to_identity() {
    let zero = FixedQuat::new(FixedNum::ZERO, FixedNum::ZERO, FixedNum::ZERO, FixedNum::ZERO);
    assert_eq!(zero.normalize(), FixedQuat::IDENTITY);
}

#[test]
fn test_conjugate_undoes_rotation() {
    fastrand::seed(23);
    for _ in 0..20 {
        let q = random_unit_quat();
        let v = random_vec(5.0);
        let back = q.conjugate() * (q * v);
        assert!(vec_approx(back, v, 0.05), "q={:?} v={:?} back={:?}", q, v, back);
    }
}

// ============================================================================
// Matrix3
// ============================================================================

#[test]
fn test_from_identity_quaternion_is_exact_identity() {
    assert_eq!(FixedMat3::from_quaternion(FixedQuat::IDENTITY), FixedMat3::IDENTITY);
}

#[test]
fn test_quaternion_matrix_roundtrip() {
    fastrand::seed(29);
    for _ in 0..30 {
        let q = random_unit_quat();
        let back = FixedMat3::from_quaternion(q).to_quaternion();
        // q and -q are the same rotation.
        assert!(approx(q.dot(back).abs(), FixedNum::ONE, 1e-2), "q={:?} back={:?}", q, back);
    }
}

#[test]
fn test_axis_angle_matches_quaternion_rotation() {
    let axis = FixedVec3::from_f32(1.0, 2.0, -0.5);
    let angle = FixedNum::from_num(1.2);
    let m = FixedMat3::from_axis_angle(axis, angle);
    let q = FixedQuat::from_axis_angle(axis, angle);
    let v = FixedVec3::from_f32(3.0, -1.0, 2.0);
    assert!(vec_approx(m * v, q * v, 0.05));
}

#[test]
fn test_inverse_of_inverse_roundtrip() {
    let m = FixedMat3::new(
        FixedNum::from_num(2),
        FixedNum::from_num(1),
        FixedNum::ZERO,
        FixedNum::from_num(-1),
        FixedNum::from_num(3),
        FixedNum::from_num(1),
        FixedNum::ZERO,
        FixedNum::from_num(1),
        FixedNum::from_num(1),
    );
    assert!(m.is_invertible());
    let back = m.inverse().inverse();
    assert!(mat3_approx(back, m, 0.02), "back={:?}", back);
}

#[test]
fn test_inverse_times_original_is_identity() {
    let m = FixedMat3::from_axis_angle(FixedVec3::from_f32(0.0, 1.0, 0.3), FixedNum::from_num(0.8));
    let product = m.inverse() * m;
    assert!(mat3_approx(product, FixedMat3::IDENTITY, 0.02), "product={:?}", product);
}

#[test]
fn test_singular_inverse_returns_sentinel() {
    // Two identical rows: determinant is exactly zero.
    let one = FixedNum::ONE;
    let two = FixedNum::from_num(2);
    let three = FixedNum::from_num(3);
    let m = FixedMat3::new(one, two, three, one, two, three, one, one, one);
    assert_eq!(m.determinant(), FixedNum::ZERO);
    assert!(!m.is_invertible());
    let inv = m.inverse();
    assert!(inv.is_singular());
    assert_eq!(inv.m00, INFINITY);
}

#[test]
fn test_rotation_matrix_is_orthonormal() {
    let m = FixedMat3::from_quaternion(FixedQuat::from_euler(FixedVec3::from_f32(0.4, -1.0, 0.2)));
    assert!(m.is_orthonormal(FixedNum::from_num(0.01)));
}

#[test]
fn test_look_at_points_forward() {
    let m = FixedMat3::look_at(FixedVec3::from_f32(0.0, 0.0, 10.0), FixedVec3::Y).unwrap();
    let forward = m * FixedVec3::Z;
    assert!(vec_approx(forward, FixedVec3::Z, 1e-2), "forward={:?}", forward);

    let m = FixedMat3::look_at(FixedVec3::from_f32(5.0, 0.0, 0.0), FixedVec3::Y).unwrap();
    let forward = m * FixedVec3::Z;
    assert!(vec_approx(forward, FixedVec3::X, 1e-2), "forward={:?}", forward);
}

#[test]
fn test_look_at_detects_degenerate_basis() {
    assert!(FixedMat3::look_at(FixedVec3::ZERO, FixedVec3::Y).is_none());
    // Forward parallel to up.
    assert!(FixedMat3::look_at(FixedVec3::from_f32(0.0, 3.0, 0.0), FixedVec3::Y).is_none());
}

#[test]
fn test_matrix_multiply_order() {
    // Left operand is applied second: (A * B) v == A (B v).
    let a = FixedMat3::from_axis_angle(FixedVec3::Y, HALF_PI);
    let b = FixedMat3::from_axis_angle(FixedVec3::X, HALF_PI);
    let v = FixedVec3::from_f32(1.0, 2.0, 3.0);
    assert!(vec_approx((a * b) * v, a * (b * v), 0.02));
}

// ============================================================================
// Matrix4
// ============================================================================

#[test]
fn test_mat4_identity_transform() {
    let p = FixedVec3::from_f32(1.0, -2.0, 3.0);
    assert_eq!(FixedMat4::IDENTITY.transform_point(p), p);
    assert_eq!(FixedMat4::IDENTITY.transform_vector(p), p);
}

#[test]
fn test_mat4_point_includes_translation_vector_does_not() {
    let t = FixedVec3::from_f32(10.0, 0.0, 0.0);
    let m = FixedMat4::from_rotation_translation(FixedMat3::IDENTITY, t);
    let p = FixedVec3::from_f32(1.0, 1.0, 1.0);
    assert_eq!(m.transform_point(p), p + t);
    assert_eq!(m.transform_vector(p), p);
}

#[test]
fn test_mat4_rigid_inverse_roundtrip() {
    let rot = FixedMat3::from_axis_angle(FixedVec3::Y, FixedNum::from_num(0.7));
    let m = FixedMat4::from_rotation_translation(rot, FixedVec3::from_f32(3.0, -1.0, 2.0));
    let inv = m.inverse();
    let p = FixedVec3::from_f32(4.0, 5.0, -6.0);
    let back = inv.transform_point(m.transform_point(p));
    assert!(vec_approx(back, p, 0.05), "back={:?}", back);
}

#[test]
fn test_mat4_general_inverse_roundtrip() {
    // Non-orthonormal block forces the adjugate path.
    let mut m = FixedMat4::IDENTITY;
    m.m[0][0] = FixedNum::from_num(2);
    m.m[1][1] = FixedNum::from_num(4);
    m.m[0][3] = FixedNum::from_num(1);
    assert!(m.is_invertible());
    let back = m.inverse().inverse();
    for r in 0..4 {
        for c in 0..4 {
            assert!(approx(back.m[r][c], m.m[r][c], 0.02), "({}, {})", r, c);
        }
    }
}

#[test]
fn test_mat4_singular_inverse_returns_sentinel() {
    let mut m = FixedMat4::IDENTITY;
    // Duplicate row ⇒ zero determinant.
    m.m[1] = m.m[0];
    assert_eq!(m.determinant(), FixedNum::ZERO);
    let inv = m.inverse();
    assert!(inv.is_singular());
    assert_eq!(inv.m[3][3], INFINITY);
}

#[test]
fn test_mat4_determinant_of_identity() {
    assert_eq!(FixedMat4::IDENTITY.determinant(), FixedNum::ONE);
}

#[test]
fn test_mat4_multiply_composes() {
    let a = FixedMat4::from_rotation_translation(FixedMat3::IDENTITY, FixedVec3::from_f32(1.0, 0.0, 0.0));
    let b = FixedMat4::from_rotation_translation(
        FixedMat3::from_axis_angle(FixedVec3::Y, HALF_PI),
        FixedVec3::ZERO,
    );
    let p = FixedVec3::Z;
    // a ∘ b: rotate first, translate second.
    let out = (a * b).transform_point(p);
    assert!(vec_approx(out, FixedVec3::from_f32(2.0, 0.0, 0.0), 0.02), "out={:?}", out);
}
