//! Transform-node components and pose math.
//!
//! [`SimPose`] is the pure fixed-point pose value with all the spatial
//! operations; [`SimTransform`] is the node component wrapping a pose with
//! the backing tag, parent link and lifecycle flag. Accessors that a body
//! may proxy take the body as an explicit `Option` parameter so the proxy
//! branch is visible at every call site.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::sim::body::SimBody;
use crate::sim::fixed_math::{FixedMat3, FixedMat4, FixedNum, FixedQuat, FixedVec3};

// ============================================================================
// Relative Space
// ============================================================================

/// Which frame a displacement or delta rotation is expressed in.
///
/// Rotation composition is non-commutative, so the frame fixes the product
/// order: `Local` composes `current * delta`, `World` composes
/// `delta * current`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Space {
    #[default]
    World,
    Local,
}

// ============================================================================
// Pose Value
// ============================================================================

/// Position, rotation and scale as one fixed-point value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimPose {
    pub position: FixedVec3,
    pub rotation: FixedQuat,
    pub scale: FixedVec3,
}

impl SimPose {
    pub const IDENTITY: Self = Self {
        position: FixedVec3::ZERO,
        rotation: FixedQuat::IDENTITY,
        scale: FixedVec3::ONE,
    };

    pub fn from_position(position: FixedVec3) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    pub fn from_position_rotation(position: FixedVec3, rotation: FixedQuat) -> Self {
        Self {
            position,
            rotation,
            ..Self::IDENTITY
        }
    }

    /// Pose matrix: rotation block plus translation. Scale is deliberately
    /// not folded in; it is applied by the point/vector transforms instead.
    pub fn matrix(&self) -> FixedMat4 {
        FixedMat4::from_rotation_translation(FixedMat3::from_quaternion(self.rotation), self.position)
    }

    /// Canonical +Z rotated by the orientation.
    pub fn forward(&self) -> FixedVec3 {
        self.rotation * FixedVec3::Z
    }

    /// Canonical +X rotated by the orientation.
    pub fn right(&self) -> FixedVec3 {
        self.rotation * FixedVec3::X
    }

    /// Canonical +Y rotated by the orientation.
    pub fn up(&self) -> FixedVec3 {
        self.rotation * FixedVec3::Y
    }

    /// Add a displacement to the position. `Space::Local` first rotates the
    /// displacement into this pose's orientation.
    pub fn translate(&mut self, translation: FixedVec3, space: Space) {
        let delta = match space {
            Space::World => translation,
            Space::Local => self.rotation * translation,
        };
        self.position = self.position + delta;
    }

    /// Like [`Self::translate`] with `Space::Local`, but relative to a
    /// supplied reference orientation instead of this pose's own.
    pub fn translate_relative_to(&mut self, translation: FixedVec3, reference: FixedQuat) {
        self.position = self.position + reference * translation;
    }

    /// Compose a delta rotation about an axis; renormalized before storing.
    pub fn rotate_axis_angle(&mut self, axis: FixedVec3, angle: FixedNum, space: Space) {
        self.apply_delta(FixedQuat::from_axis_angle(axis, angle), space);
    }

    /// Compose a delta rotation given as Euler angles (radians, Y·X·Z).
    pub fn rotate_euler(&mut self, euler: FixedVec3, space: Space) {
        self.apply_delta(FixedQuat::from_euler(euler), space);
    }

    fn apply_delta(&mut self, delta: FixedQuat, space: Space) {
        let composed = match space {
            Space::Local => self.rotation * delta,
            Space::World => delta * self.rotation,
        };
        self.rotation = composed.normalize();
    }

    /// Rotate the position about `point` and compose the same rotation into
    /// the orientation.
    pub fn rotate_around(&mut self, point: FixedVec3, axis: FixedVec3, angle: FixedNum) {
        let delta = FixedQuat::from_axis_angle(axis, angle);
        self.position = point + delta * (self.position - point);
        self.rotation = (delta * self.rotation).normalize();
    }

    /// Point the forward axis at `target` with +Y as up.
    ///
    /// Returns `false` and leaves the rotation unchanged when the basis is
    /// degenerate (target at the position, or the direction parallel to up).
    pub fn look_at(&mut self, target: FixedVec3) -> bool {
        match FixedMat3::look_at(target - self.position, FixedVec3::Y) {
            Some(basis) => {
                self.rotation = basis.to_quaternion();
                true
            }
            None => false,
        }
    }

    /// Local point to world: rotate, scale, then translate.
    pub fn transform_point(&self, p: FixedVec3) -> FixedVec3 {
        self.position + (self.rotation * p) * self.scale
    }

    /// World point to local: un-translate, divide by scale, un-rotate.
    pub fn inverse_transform_point(&self, p: FixedVec3) -> FixedVec3 {
        self.rotation.inverse() * (p - self.position).div_or_zero(self.scale)
    }

    /// Local vector to world: rotation and scale, no translation.
    pub fn transform_vector(&self, v: FixedVec3) -> FixedVec3 {
        (self.rotation * v) * self.scale
    }

    pub fn inverse_transform_vector(&self, v: FixedVec3) -> FixedVec3 {
        self.rotation.inverse() * v.div_or_zero(self.scale)
    }

    /// Local direction to world: rotation only; scale never applies to
    /// directions.
    pub fn transform_direction(&self, d: FixedVec3) -> FixedVec3 {
        self.rotation * d
    }

    pub fn inverse_transform_direction(&self, d: FixedVec3) -> FixedVec3 {
        self.rotation.inverse() * d
    }

    /// Capture from the host's float pose. One of the two float boundaries
    /// of the crate (the other is the render push).
    pub fn from_host(transform: &Transform) -> Self {
        Self {
            position: FixedVec3::from_vec3(transform.translation),
            rotation: FixedQuat::from_quat(transform.rotation),
            scale: FixedVec3::from_vec3(transform.scale),
        }
    }
}

impl Default for SimPose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

// ============================================================================
// Backing Tag
// ============================================================================

/// Where a node's authoritative pose lives, chosen once at init.
///
/// Read and write paths branch on this tag rather than on ad hoc null
/// checks scattered through the accessors.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PoseBacking {
    /// The node's own `local` pose is authoritative.
    #[default]
    Standalone,
    /// Pose reads and writes redirect through the attached body.
    /// `center` is the collider's unscaled pivot offset; it is multiplied
    /// by the node's current scale on every access.
    BodyBacked { center: FixedVec3 },
}

// ============================================================================
// Transform Node
// ============================================================================

/// Hierarchical transform node with a fixed-point pose.
///
/// While body-backed, the body is authoritative: `local.position` and
/// `local.rotation` are stale and serve only as the fallback when the
/// collaborator is missing. `local.scale` is always authoritative; a body
/// has no concept of scale.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct SimTransform {
    pub local: SimPose,
    pub backing: PoseBacking,
    /// Nearest ancestor carrying a `SimTransform`, resolved once at init.
    pub parent: Option<Entity>,
    pub initialized: bool,
}

impl SimTransform {
    pub fn from_pose(pose: SimPose) -> Self {
        Self {
            local: pose,
            ..Self::default()
        }
    }

    /// Collider pivot offset scaled by the current scale; zero for
    /// standalone nodes.
    pub fn scaled_center(&self) -> FixedVec3 {
        match self.backing {
            PoseBacking::Standalone => FixedVec3::ZERO,
            PoseBacking::BodyBacked { center } => center * self.local.scale,
        }
    }

    fn proxies_through<'a>(&self, body: Option<&'a SimBody>) -> Option<&'a SimBody> {
        match self.backing {
            PoseBacking::BodyBacked { .. } => body.filter(|b| b.initialized),
            PoseBacking::Standalone => None,
        }
    }

    /// Position, redirected through an initialized attached body (minus the
    /// scaled-center offset), else the local cache.
    pub fn position(&self, body: Option<&SimBody>) -> FixedVec3 {
        match self.proxies_through(body) {
            Some(b) => b.position - self.scaled_center(),
            None => self.local.position,
        }
    }

    /// Write the position: to the body (plus the scaled-center offset) when
    /// proxied, else to the local cache.
    pub fn set_position(&mut self, position: FixedVec3, body: Option<&mut SimBody>) {
        let offset = self.scaled_center();
        match self.backing {
            PoseBacking::BodyBacked { .. } => {
                if let Some(b) = body.filter(|b| b.initialized) {
                    b.position = position + offset;
                    return;
                }
                self.local.position = position;
            }
            PoseBacking::Standalone => self.local.position = position,
        }
    }

    /// Rotation, reconstructed from the body's orientation matrix when
    /// proxied, else the local cache.
    pub fn rotation(&self, body: Option<&SimBody>) -> FixedQuat {
        match self.proxies_through(body) {
            Some(b) => b.orientation.to_quaternion(),
            None => self.local.rotation,
        }
    }

    pub fn set_rotation(&mut self, rotation: FixedQuat, body: Option<&mut SimBody>) {
        match self.backing {
            PoseBacking::BodyBacked { .. } => {
                if let Some(b) = body.filter(|b| b.initialized) {
                    b.orientation = FixedMat3::from_quaternion(rotation);
                    return;
                }
                self.local.rotation = rotation;
            }
            PoseBacking::Standalone => self.local.rotation = rotation,
        }
    }

    /// Effective pose with proxied position/rotation and the local scale.
    pub fn pose(&self, body: Option<&SimBody>) -> SimPose {
        SimPose {
            position: self.position(body),
            rotation: self.rotation(body),
            scale: self.local.scale,
        }
    }

    pub fn translate(&mut self, translation: FixedVec3, space: Space, mut body: Option<&mut SimBody>) {
        let mut pose = self.pose(body.as_deref());
        pose.translate(translation, space);
        self.set_position(pose.position, body.take());
    }

    pub fn translate_relative_to(
        &mut self,
        translation: FixedVec3,
        reference: FixedQuat,
        mut body: Option<&mut SimBody>,
    ) {
        let mut pose = self.pose(body.as_deref());
        pose.translate_relative_to(translation, reference);
        self.set_position(pose.position, body.take());
    }

    pub fn rotate_axis_angle(
        &mut self,
        axis: FixedVec3,
        angle: FixedNum,
        space: Space,
        mut body: Option<&mut SimBody>,
    ) {
        let mut pose = self.pose(body.as_deref());
        pose.rotate_axis_angle(axis, angle, space);
        self.set_rotation(pose.rotation, body.take());
    }

    pub fn rotate_euler(&mut self, euler: FixedVec3, space: Space, mut body: Option<&mut SimBody>) {
        let mut pose = self.pose(body.as_deref());
        pose.rotate_euler(euler, space);
        self.set_rotation(pose.rotation, body.take());
    }

    pub fn rotate_around(
        &mut self,
        point: FixedVec3,
        axis: FixedVec3,
        angle: FixedNum,
        mut body: Option<&mut SimBody>,
    ) {
        let mut pose = self.pose(body.as_deref());
        pose.rotate_around(point, axis, angle);
        self.set_position(pose.position, body.as_deref_mut());
        self.set_rotation(pose.rotation, body.take());
    }

    /// Point the forward axis at `target`. Returns `false` on a degenerate
    /// basis, leaving the rotation untouched.
    pub fn look_at(&mut self, target: FixedVec3, mut body: Option<&mut SimBody>) -> bool {
        let mut pose = self.pose(body.as_deref());
        if pose.look_at(target) {
            self.set_rotation(pose.rotation, body.take());
            true
        } else {
            false
        }
    }

    pub fn forward(&self, body: Option<&SimBody>) -> FixedVec3 {
        self.pose(body).forward()
    }

    pub fn right(&self, body: Option<&SimBody>) -> FixedVec3 {
        self.pose(body).right()
    }

    pub fn up(&self, body: Option<&SimBody>) -> FixedVec3 {
        self.pose(body).up()
    }

    pub fn transform_point(&self, p: FixedVec3, body: Option<&SimBody>) -> FixedVec3 {
        self.pose(body).transform_point(p)
    }

    pub fn inverse_transform_point(&self, p: FixedVec3, body: Option<&SimBody>) -> FixedVec3 {
        self.pose(body).inverse_transform_point(p)
    }

    pub fn transform_vector(&self, v: FixedVec3, body: Option<&SimBody>) -> FixedVec3 {
        self.pose(body).transform_vector(v)
    }

    pub fn inverse_transform_vector(&self, v: FixedVec3, body: Option<&SimBody>) -> FixedVec3 {
        self.pose(body).inverse_transform_vector(v)
    }

    pub fn transform_direction(&self, d: FixedVec3, body: Option<&SimBody>) -> FixedVec3 {
        self.pose(body).transform_direction(d)
    }

    pub fn inverse_transform_direction(&self, d: FixedVec3, body: Option<&SimBody>) -> FixedVec3 {
        self.pose(body).inverse_transform_direction(d)
    }
}
