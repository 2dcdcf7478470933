//! Hierarchical transform nodes synchronized with the fixed-point
//! simulation.
//!
//! This module is organized into:
//! - **components**: pose value, backing tag and the node component
//! - **hierarchy**: parent resolution and world-matrix composition
//! - **tracker**: change-tracking registry for standalone nodes
//! - **sync**: per-step init / capture / push systems

use bevy::prelude::*;

pub mod components;
pub mod hierarchy;
pub mod sync;
pub mod tracker;


pub use components::{PoseBacking, SimPose, SimTransform, Space};
pub use hierarchy::{resolve_parent, world_matrix, world_matrix_with, MAX_PARENT_DEPTH};
pub use tracker::PoseChangeTracker;

/// System sets for the per-step transform pipeline, chained in order.
#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub enum TransformSet {
    /// Tick bookkeeping.
    Tick,
    /// Idempotent node initialization.
    Init,
    /// Pose exchange with the host (capture or push, mode dependent).
    Sync,
}

/// Monotonic fixed-step counter, incremented first in every step.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct SimTick(pub u64);

impl SimTick {
    pub fn increment(&mut self) {
        self.0 += 1;
    }
}

/// Externally supplied mode flag: `true` while the fixed-point simulation
/// is authoritative, `false` while the host (editor) is. Selected once per
/// step; flip it only between steps.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct SimulationActive(pub bool);

/// Transform-node plugin: registers resources and the fixed-step pipeline.
pub struct SimTransformPlugin;

impl Plugin for SimTransformPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SimTick>();
        app.init_resource::<SimulationActive>();
        app.init_resource::<PoseChangeTracker>();
        // Default until the config loader replaces it at startup; also lets
        // headless tests run the pipeline without the asset stack.
        app.init_resource::<crate::sim::config::SimConfig>();

        app.configure_sets(
            FixedUpdate,
            (TransformSet::Tick, TransformSet::Init, TransformSet::Sync).chain(),
        );

        app.add_systems(
            FixedUpdate,
            (
                sync::increment_sim_tick.in_set(TransformSet::Tick),
                sync::initialize_transforms.in_set(TransformSet::Init),
                tracker::prune_tracker.in_set(TransformSet::Init),
                sync::capture_host_pose
                    .in_set(TransformSet::Sync)
                    .run_if(sync::simulation_stopped),
                // On the stop transition the cached pose must land on the
                // host before the capture sees it, or the capture would
                // read back the simulation's last pushed pose instead.
                sync::reapply_tracked_poses
                    .in_set(TransformSet::Sync)
                    .before(sync::capture_host_pose),
                sync::push_sim_pose
                    .in_set(TransformSet::Sync)
                    .run_if(sync::simulation_running),
            ),
        );
    }
}
