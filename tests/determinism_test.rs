use bevy::prelude::*;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use kestrel::sim::body::{BodyInterpolation, SimBody, SimCollider};
use kestrel::sim::config::SimConfig;
use kestrel::sim::fixed_math::{FixedNum, FixedVec3};
use kestrel::sim::snapshot::{PoseSnapshot, SNAPSHOT_VERSION};
use kestrel::sim::transform::{SimPose, SimTick, SimTransform, SimulationActive, TransformSet};
use kestrel::sim::SimPlugin;

const SEED: u64 = 0x5EED;
const BODIES: usize = 24;
const STEPS: usize = 200;

/// Stand-in solver: integrate linear velocity in sorted entity order so
/// both peers see the identical write sequence.
fn integrate_bodies(sim_config: Res<SimConfig>, mut bodies: Query<(Entity, &mut SimBody)>) {
    let delta = FixedNum::from_num(1.0) / FixedNum::from_num(sim_config.tick_rate);
    let mut bodies: Vec<_> = bodies.iter_mut().collect();
    bodies.sort_by_key(|(entity, _)| *entity);
    for (_, body) in bodies.iter_mut() {
        if body.linear_velocity.length_squared() > FixedNum::ZERO {
            body.position = body.position + body.linear_velocity * delta;
        }
    }
}

fn build_peer(seed: u64) -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.add_plugins(bevy::asset::AssetPlugin::default());
    app.add_plugins(SimPlugin);
    app.add_systems(FixedUpdate, integrate_bodies.before(TransformSet::Sync));
    app.insert_resource(SimulationActive(true));

    let mut rng = StdRng::seed_from_u64(seed);
    for i in 0..BODIES {
        let position = FixedVec3::from_f32(
            rng.random_range(-50.0..50.0),
            0.0,
            rng.random_range(-50.0..50.0),
        );
        let velocity = FixedVec3::from_f32(
            rng.random_range(-2.0..2.0),
            0.0,
            rng.random_range(-2.0..2.0),
        );
        let interpolation = match i % 3 {
            0 => BodyInterpolation::Snap,
            1 => BodyInterpolation::Interpolate,
            _ => BodyInterpolation::Extrapolate,
        };
        // The scene is authored on the node; the init handoff moves it
        // into the solver's body state.
        app.world_mut().spawn((
            Transform::from_translation(position.to_vec3()),
            SimTransform::from_pose(SimPose::from_position(position)),
            SimBody {
                linear_velocity: velocity,
                initialized: true,
                interpolation,
                ..default()
            },
            SimCollider::new(FixedVec3::from_f32(0.0, 0.5, 0.0)),
        ));
    }

    // One standalone parent/child pair so the hierarchy path is covered.
    let parent = app
        .world_mut()
        .spawn((Transform::IDENTITY, SimTransform::default()))
        .id();
    app.world_mut().spawn((
        Transform::from_xyz(1.0, 0.0, 0.0),
        SimTransform::default(),
        bevy::ecs::hierarchy::ChildOf(parent),
    ));

    // Pause virtual time and fire Startup once; stepping happens by running
    // FixedUpdate directly so wall clock never influences the step count.
    app.world_mut().resource_mut::<Time<Virtual>>().pause();
    app.update();
    app
}

fn step(app: &mut App) {
    app.world_mut().run_schedule(FixedUpdate);
}

#[test]
fn test_two_peers_stay_in_lockstep() {
    // Two independently constructed apps with identical input must produce
    // bit-identical pose checksums on every step.
    let mut peer_a = build_peer(SEED);
    let mut peer_b = build_peer(SEED);

    for i in 0..STEPS {
        step(&mut peer_a);
        step(&mut peer_b);

        let tick_a = peer_a.world().resource::<SimTick>().0;
        let tick_b = peer_b.world().resource::<SimTick>().0;
        assert_eq!(tick_a, tick_b, "tick counters diverged at step {}", i);

        let snap_a = PoseSnapshot::capture(peer_a.world_mut(), tick_a);
        let snap_b = PoseSnapshot::capture(peer_b.world_mut(), tick_b);
        assert_eq!(
            snap_a.checksum(),
            snap_b.checksum(),
            "pose checksums diverged at step {}",
            i
        );
        // Spot-check the full payload, not just the hash.
        if i % 50 == 0 {
            assert_eq!(snap_a, snap_b, "snapshots diverged at step {}", i);
        }
    }
}

#[test]
fn test_divergent_input_is_detected() {
    // Different seeds mean different scenes; the checksum must notice.
    let mut peer_a = build_peer(SEED);
    let mut peer_b = build_peer(SEED + 1);

    step(&mut peer_a);
    step(&mut peer_b);

    let snap_a = PoseSnapshot::capture(peer_a.world_mut(), 1);
    let snap_b = PoseSnapshot::capture(peer_b.world_mut(), 1);
    assert_ne!(snap_a.checksum(), snap_b.checksum());
}

#[test]
fn test_capture_is_stable_within_one_world() {
    let mut peer = build_peer(SEED);
    for _ in 0..10 {
        step(&mut peer);
    }
    let tick = peer.world().resource::<SimTick>().0;
    let first = PoseSnapshot::capture(peer.world_mut(), tick);
    let second = PoseSnapshot::capture(peer.world_mut(), tick);
    assert_eq!(first, second);
    assert_eq!(first.checksum(), second.checksum());
}

#[test]
fn test_snapshot_save_load_roundtrip() {
    let mut peer = build_peer(SEED);
    for _ in 0..5 {
        step(&mut peer);
    }
    let tick = peer.world().resource::<SimTick>().0;
    let snapshot = PoseSnapshot::capture(peer.world_mut(), tick);
    assert_eq!(snapshot.version, SNAPSHOT_VERSION);
    assert!(!snapshot.poses.is_empty());

    let path = std::env::temp_dir().join("kestrel_snapshot_roundtrip.bin");
    let path = path.to_string_lossy().to_string();
    snapshot.save(&path).expect("Failed to save snapshot");
    let loaded = PoseSnapshot::load(&path).expect("Failed to load snapshot");
    let _ = std::fs::remove_file(&path);

    assert_eq!(snapshot, loaded);
    assert_eq!(snapshot.checksum(), loaded.checksum());
}
