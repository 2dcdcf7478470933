//! Per-step transform node lifecycle.
//!
//! This module handles:
//! - Tick counting
//! - Idempotent node initialization (backing tag, parent link, body handoff)
//! - Editing mode: capturing the host pose into the fixed-point cache
//! - Simulation mode: pushing the fixed-point pose out to the host pose
//!   under the body's interpolation mode
//! - Reapplying cached poses when the simulation stops

use bevy::ecs::hierarchy::ChildOf;
use bevy::prelude::*;
use kestrel_macros::profile;

use super::components::{PoseBacking, SimPose, SimTransform};
use super::hierarchy::resolve_parent;
use super::tracker::PoseChangeTracker;
use super::{SimTick, SimulationActive};
use crate::profile_log;
use crate::sim::body::{BodyInterpolation, SimBody, SimCollider};
use crate::sim::config::{RenderConfig, RenderConfigHandle, SimConfig};
use crate::sim::fixed_math::{FixedMat3, FixedNum, FixedVec3};

// ============================================================================
// Tick Management
// ============================================================================

/// Increment the global simulation tick counter.
///
/// Runs first in the FixedUpdate schedule so every other system sees the
/// current tick value for deterministic logic and conditional logging.
pub fn increment_sim_tick(mut tick: ResMut<SimTick>) {
    tick.increment();
}

// ============================================================================
// Run Conditions
// ============================================================================

/// The externally supplied "simulation active" flag, read once per step.
pub fn simulation_running(active: Res<SimulationActive>) -> bool {
    active.0
}

pub fn simulation_stopped(active: Res<SimulationActive>) -> bool {
    !active.0
}

// ============================================================================
// Initialization
// ============================================================================

/// Idempotent node init: resolve the parent link, choose the backing tag,
/// and hand the cached pose to the body (or register with the tracker).
///
/// Runs every step but only touches nodes whose `initialized` flag is still
/// clear, so late-spawned nodes come up on their first step and re-running
/// is free.
#[profile]
pub fn initialize_transforms(
    active: Res<SimulationActive>,
    mut tracker: ResMut<PoseChangeTracker>,
    mut nodes: Query<(
        Entity,
        &mut SimTransform,
        Option<&mut SimBody>,
        Option<&SimCollider>,
        Option<&mut Transform>,
    )>,
    links: Query<&ChildOf>,
    #[allow(unused_variables)] tick: Res<SimTick>,
) {
    let pending: Vec<Entity> = nodes
        .iter()
        .filter(|(_, node, ..)| !node.initialized)
        .map(|(entity, ..)| entity)
        .collect();
    if pending.is_empty() {
        return;
    }

    for entity in pending {
        let parent = resolve_parent(entity, &links, |e| e != entity && nodes.contains(e));
        let Ok((_, mut node, body, collider, host)) = nodes.get_mut(entity) else {
            continue;
        };
        if node.initialized {
            continue;
        }
        node.parent = parent;

        match body {
            Some(mut body) => {
                let center = match collider {
                    Some(collider) => collider.center,
                    None => {
                        warn!(
                            "transform node {:?} has a body but no collider; using zero pivot offset",
                            entity
                        );
                        FixedVec3::ZERO
                    }
                };
                node.backing = PoseBacking::BodyBacked { center };
                if body.initialized {
                    // Hand the authored pose over to the solver's state.
                    body.position = node.local.position + node.scaled_center();
                    body.orientation = FixedMat3::from_quaternion(node.local.rotation);
                    // On a stopped step the change-driven capture runs right
                    // after this system and the freshly spawned host pose
                    // counts as changed. The host must already hold the
                    // handed-off pose by then, or the capture writes the
                    // spawn-default host pose back over the body.
                    if !active.0 {
                        if let Some(mut host) = host {
                            host.translation = node.local.position.to_vec3();
                            host.rotation = node.local.rotation.to_quat();
                            host.scale = node.local.scale.to_vec3();
                        }
                    }
                } else {
                    tracker.register(entity);
                }
            }
            None => {
                node.backing = PoseBacking::Standalone;
                tracker.register(entity);
            }
        }
        node.initialized = true;
    }

    profile_log!(tick, "transform nodes initialized; {} tracked", tracker.len());
}

// ============================================================================
// Editing Mode
// ============================================================================

/// While the simulation is stopped, capture the host pose into the
/// fixed-point cache, but only for nodes whose host `Transform` actually
/// changed since the last step (dirty-flag driven via change detection).
/// An initialized body attached to the node is updated alongside the cache.
#[profile]
pub fn capture_host_pose(
    mut nodes: Query<
        (&Transform, &mut SimTransform, Option<&mut SimBody>),
        Changed<Transform>,
    >,
) {
    for (host, mut node, body) in nodes.iter_mut() {
        if !node.initialized {
            continue;
        }
        let pose = SimPose::from_host(host);
        node.local = pose;
        if let Some(mut body) = body.filter(|b| b.initialized) {
            body.position = pose.position + node.scaled_center();
            body.orientation = FixedMat3::from_quaternion(pose.rotation);
        }
    }
}

/// On the simulation-active → stopped transition, write the cached pose of
/// every tracked node back to the host, in sorted entity order.
pub fn reapply_tracked_poses(
    active: Res<SimulationActive>,
    mut was_active: Local<bool>,
    tracker: Res<PoseChangeTracker>,
    mut nodes: Query<(&SimTransform, &mut Transform)>,
) {
    let stopped = *was_active && !active.0;
    *was_active = active.0;
    if !stopped {
        return;
    }

    let mut count = 0usize;
    for entity in tracker.sorted() {
        let Ok((node, mut host)) = nodes.get_mut(entity) else {
            continue;
        };
        host.translation = node.local.position.to_vec3();
        host.rotation = node.local.rotation.to_quat();
        host.scale = node.local.scale.to_vec3();
        count += 1;
    }
    info!("simulation stopped; reapplied {} cached poses", count);
}

// ============================================================================
// Simulation Mode
// ============================================================================

/// While the simulation runs, push the fixed-point pose out to the host
/// scene pose. Body-backed nodes honor the body's interpolation mode;
/// standalone nodes always snap.
///
/// Everything here is render-side float math: it can differ across
/// machines without consequence because it never feeds back into the
/// fixed-point state.
#[profile(2)]
pub fn push_sim_pose(
    sim_config: Res<SimConfig>,
    render_handle: Option<Res<RenderConfigHandle>>,
    render_configs: Option<Res<Assets<RenderConfig>>>,
    mut nodes: Query<(&SimTransform, Option<&SimBody>, &mut Transform)>,
    #[allow(unused_variables)] tick: Res<SimTick>,
) {
    let delta = 1.0 / sim_config.tick_rate as f32;
    let render = render_handle
        .as_ref()
        .zip(render_configs.as_ref())
        .and_then(|(handle, assets)| assets.get(&handle.0))
        .copied()
        .unwrap_or_default();
    let alpha = (render.interpolation_rate * delta).clamp(0.0, 1.0);
    let snap_distance_sq = render.snap_distance * render.snap_distance;

    let mut count = 0usize;
    for (node, body, mut host) in nodes.iter_mut() {
        if !node.initialized {
            continue;
        }
        let pose = node.pose(body);
        let target_pos = pose.position.to_vec3();
        let target_rot = pose.rotation.to_quat();
        let target_scale = pose.scale.to_vec3();

        let body = body.filter(|b| b.initialized);
        let mode = body
            .map(|b| b.interpolation)
            .unwrap_or(BodyInterpolation::Snap);

        match mode {
            BodyInterpolation::Snap => {
                host.translation = target_pos;
                host.rotation = target_rot;
                host.scale = target_scale;
            }
            BodyInterpolation::Interpolate => {
                if host.translation.distance_squared(target_pos) > snap_distance_sq {
                    // Too far behind to blend through; teleport.
                    host.translation = target_pos;
                } else {
                    host.translation = host.translation.lerp(target_pos, alpha);
                }
                host.rotation = host.rotation.slerp(target_rot, alpha);
                host.scale = host.scale.lerp(target_scale, alpha);
            }
            BodyInterpolation::Extrapolate => {
                // Predict one step ahead of the solver via linear velocity,
                // in fixed-point so the prediction itself stays exact.
                let step = FixedNum::from_num(1.0) / FixedNum::from_num(sim_config.tick_rate);
                let velocity = body.map(|b| b.linear_velocity).unwrap_or(FixedVec3::ZERO);
                let predicted = pose.position + velocity * step;
                host.translation = predicted.to_vec3();
                host.rotation = host.rotation.slerp(target_rot, alpha);
                host.scale = host.scale.lerp(target_scale, alpha);
            }
        }
        count += 1;
    }

    profile_log!(tick, "pushed {} sim poses to host", count);
}
