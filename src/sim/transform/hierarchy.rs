//! Parent resolution and world-matrix composition.
//!
//! The parent link is a non-owning back-reference resolved once at init by
//! walking the host's `ChildOf` relation upward to the nearest entity that
//! carries a [`SimTransform`]. The upward walk is bounded and keeps a
//! visited list, so a malformed (cyclic) hierarchy degrades to a truncated
//! chain and a warning instead of hanging the step.

use bevy::ecs::hierarchy::ChildOf;
use bevy::prelude::*;
use smallvec::SmallVec;

use super::components::{SimPose, SimTransform};
use crate::sim::body::SimBody;
use crate::sim::config::SimConfig;
use crate::sim::fixed_math::{FixedMat3, FixedMat4};

/// Hard ceiling on ancestor walks, independent of the configured limit.
pub const MAX_PARENT_DEPTH: usize = 64;

/// Nearest ancestor of `entity` (via `ChildOf`) for which `is_node` holds.
pub fn resolve_parent(
    entity: Entity,
    links: &Query<&ChildOf>,
    is_node: impl Fn(Entity) -> bool,
) -> Option<Entity> {
    let mut current = entity;
    for _ in 0..MAX_PARENT_DEPTH {
        let Ok(link) = links.get(current) else {
            return None;
        };
        let parent = link.parent();
        if is_node(parent) {
            return Some(parent);
        }
        current = parent;
    }
    warn!(
        "parent chain of {:?} exceeds {} links; treating node as a root",
        entity, MAX_PARENT_DEPTH
    );
    None
}

/// World matrix of a node: its own rotation and translation, composed with
/// the rotations of its ancestors up to the root.
///
/// Ancestor scale and translation are intentionally excluded: parents act
/// purely as rotation frames here. Scale never enters the matrix at all; it
/// is applied by the point/vector transforms.
///
/// `lookup` returns the effective pose and parent link of an entity, or
/// `None` when it is not a transform node (a vanished ancestor simply
/// truncates the chain).
pub fn world_matrix_with<F>(entity: Entity, max_depth: usize, lookup: F) -> FixedMat4
where
    F: Fn(Entity) -> Option<(SimPose, Option<Entity>)>,
{
    let Some((pose, mut parent)) = lookup(entity) else {
        return FixedMat4::IDENTITY;
    };
    let mut matrix = pose.matrix();

    let depth_limit = max_depth.min(MAX_PARENT_DEPTH);
    let mut visited: SmallVec<[Entity; 8]> = SmallVec::new();
    visited.push(entity);

    while let Some(ancestor) = parent {
        if visited.len() > depth_limit {
            warn!(
                "ancestor walk from {:?} exceeded depth {}; truncating",
                entity, depth_limit
            );
            break;
        }
        if visited.contains(&ancestor) {
            warn!(
                "cyclic parent chain detected at {:?} (walk from {:?}); truncating",
                ancestor, entity
            );
            break;
        }
        visited.push(ancestor);

        let Some((ancestor_pose, next)) = lookup(ancestor) else {
            break;
        };
        let rotation = FixedMat4::from_rotation(FixedMat3::from_quaternion(ancestor_pose.rotation));
        matrix = rotation * matrix;
        parent = next;
    }

    matrix
}

/// [`world_matrix_with`] reading straight from a `World`; proxied poses are
/// read through each node's body, and the depth bound comes from the
/// configured [`SimConfig::max_parent_depth`] (falling back to the hard
/// ceiling when the resource is absent).
pub fn world_matrix(world: &World, entity: Entity) -> FixedMat4 {
    let max_depth = world
        .get_resource::<SimConfig>()
        .map(|config| config.max_parent_depth)
        .unwrap_or(MAX_PARENT_DEPTH);
    world_matrix_with(entity, max_depth, |e| {
        let node = world.get::<SimTransform>(e)?;
        Some((node.pose(world.get::<SimBody>(e)), node.parent))
    })
}
