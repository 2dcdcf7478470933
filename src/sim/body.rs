//! Rigid-body and collider collaborator components.
//!
//! The dynamics solver itself lives outside this crate; transform nodes
//! only consume a body through the accessor surface below. Whatever
//! integrates the bodies must do so in a stable, input-independent order
//! before the transform sync runs, or lockstep peers will diverge.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::sim::fixed_math::{FixedMat3, FixedVec3};

/// How a body's simulated pose is carried over to the host scene pose
/// each step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyInterpolation {
    /// Write the simulated pose directly.
    #[default]
    Snap,
    /// Blend the host pose toward the simulated pose by a time-scaled
    /// factor.
    Interpolate,
    /// Predict position one step ahead via linear velocity, then blend
    /// orientation and scale.
    Extrapolate,
}

/// Fixed-point pose accessor surface of a rigid body.
///
/// `initialized` mirrors the solver's own lifecycle: a transform node only
/// proxies through a body the solver has accepted, and pushes its cached
/// pose into the body the moment that happens.
#[derive(Component, Debug, Clone, Copy)]
pub struct SimBody {
    pub position: FixedVec3,
    pub orientation: FixedMat3,
    pub linear_velocity: FixedVec3,
    pub initialized: bool,
    pub interpolation: BodyInterpolation,
}

impl Default for SimBody {
    fn default() -> Self {
        Self {
            position: FixedVec3::ZERO,
            orientation: FixedMat3::IDENTITY,
            linear_velocity: FixedVec3::ZERO,
            initialized: false,
            interpolation: BodyInterpolation::Snap,
        }
    }
}

/// Collider collaborator: supplies the offset between the node's authored
/// pivot and the body's center of mass. The offset is authored unscaled;
/// the node multiplies it by its current scale on every access.
///
/// A body is expected to carry a collider; a node attached to a body
/// without one logs a warning and proxies with a zero offset.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct SimCollider {
    pub center: FixedVec3,
}

impl SimCollider {
    pub fn new(center: FixedVec3) -> Self {
        Self { center }
    }
}
