//! Change tracking for standalone nodes.
//!
//! Nodes without a body register here at init so their cached pose can be
//! reapplied to the host scene pose when the simulation stops running.
//! Iteration is always in sorted entity order: the registry is consulted
//! on the sim→edit transition, and that write-back must happen in the same
//! order on every machine.

use bevy::prelude::*;
use rustc_hash::FxHashSet;

/// Registry of standalone transform nodes.
#[derive(Resource, Default)]
pub struct PoseChangeTracker {
    entities: FxHashSet<Entity>,
}

impl PoseChangeTracker {
    pub fn register(&mut self, entity: Entity) {
        self.entities.insert(entity);
    }

    pub fn unregister(&mut self, entity: Entity) {
        self.entities.remove(&entity);
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.entities.contains(&entity)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Registered entities in sorted order. The hash set iterates in an
    /// arbitrary order; sorting restores the stable order lockstep needs.
    pub fn sorted(&self) -> Vec<Entity> {
        let mut entities: Vec<Entity> = self.entities.iter().copied().collect();
        entities.sort();
        entities
    }
}

/// Drop registry entries for despawned nodes.
pub fn prune_tracker(
    mut tracker: ResMut<PoseChangeTracker>,
    mut removed: RemovedComponents<super::components::SimTransform>,
) {
    for entity in removed.read() {
        tracker.unregister(entity);
    }
}
