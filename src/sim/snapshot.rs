//! Pose snapshots for lockstep desync detection.
//!
//! Peers in a lockstep session periodically exchange a [`PoseSnapshot`]
//! checksum; a mismatch means the simulations diverged. Full snapshots can
//! also be written to disk (zlib-compressed bincode) for offline diffing of
//! the step where two machines disagreed.

use std::fs::File;
use std::hash::Hasher;
use std::io::{BufReader, BufWriter};

use bevy::prelude::*;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use rustc_hash::FxHasher;
use serde::{Deserialize, Serialize};

use crate::sim::body::SimBody;
use crate::sim::transform::{SimPose, SimTransform};

pub const SNAPSHOT_VERSION: u32 = 1;

/// Effective poses of every initialized transform node at one tick,
/// in sorted entity order so the encoding is identical on every machine.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PoseSnapshot {
    pub version: u32,
    pub tick: u64,
    /// `(entity bits, pose)` pairs; the entity bits key matching entries
    /// across peers that spawned identically.
    pub poses: Vec<(u64, SimPose)>,
}

impl PoseSnapshot {
    /// Capture from a world. Proxied poses are read through each node's
    /// body, so the snapshot reflects what the simulation actually agreed
    /// on, not stale caches.
    pub fn capture(world: &mut World, tick: u64) -> Self {
        let mut poses: Vec<(u64, SimPose)> = Vec::new();
        let mut query = world.query::<(Entity, &SimTransform, Option<&SimBody>)>();
        for (entity, node, body) in query.iter(world) {
            if !node.initialized {
                continue;
            }
            poses.push((entity.to_bits(), node.pose(body)));
        }
        poses.sort_by_key(|(bits, _)| *bits);
        Self {
            version: SNAPSHOT_VERSION,
            tick,
            poses,
        }
    }

    /// Order-sensitive checksum over the bincode encoding. Cheap enough to
    /// exchange every tick.
    pub fn checksum(&self) -> u64 {
        let bytes = bincode::serialize(self).unwrap_or_default();
        let mut hasher = FxHasher::default();
        hasher.write(&bytes);
        hasher.finish()
    }

    pub fn save(&self, path: &str) -> Result<(), Box<dyn std::error::Error>> {
        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        let mut encoder = ZlibEncoder::new(writer, Compression::default());
        bincode::serialize_into(&mut encoder, self)?;
        encoder.finish()?;
        Ok(())
    }

    pub fn load(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let mut decoder = ZlibDecoder::new(reader);
        let snapshot: PoseSnapshot = bincode::deserialize_from(&mut decoder)?;
        Ok(snapshot)
    }
}
