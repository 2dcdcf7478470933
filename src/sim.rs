//! Deterministic spatial-transform core.
//!
//! Everything under this module either is fixed-point math or moves poses
//! between the fixed-point simulation and the host scene:
//! - **fixed_math**: vectors, quaternions and matrices over `FixedNum`
//! - **body**: rigid-body / collider collaborator components
//! - **transform**: hierarchical transform nodes and their step pipeline
//! - **config**: startup and hot-reloadable configuration
//! - **snapshot**: pose checksums for lockstep desync detection

use bevy::prelude::*;

pub mod body;
pub mod config;
pub mod fixed_math;
pub mod snapshot;
pub mod transform;

use config::SimConfigPlugin;
use transform::SimTransformPlugin;

/// Top-level plugin wiring the config layer and the transform pipeline.
pub struct SimPlugin;

impl Plugin for SimPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((SimConfigPlugin, SimTransformPlugin));
    }
}
