use bevy::prelude::*;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use kestrel::sim::body::{BodyInterpolation, SimBody, SimCollider};
use kestrel::sim::fixed_math::{FixedNum, FixedVec3};
use kestrel::sim::snapshot::PoseSnapshot;
use kestrel::sim::transform::{SimPose, SimTick, SimTransform, SimulationActive};
use kestrel::sim::SimPlugin;

use std::fs;
use std::path::PathBuf;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEMO_SEED: u64 = 0xFA1C0;
const DEMO_BODIES: usize = 32;
const DEMO_STEPS: usize = 300;

fn setup_file_logging() -> String {
    // Create logs directory if it doesn't exist
    let log_dir = PathBuf::from("logs");
    if !log_dir.exists() {
        fs::create_dir_all(&log_dir).expect("Failed to create logs directory");
    }

    // Clean up old log files, keeping only the last 25
    cleanup_old_logs(&log_dir, 25);

    // Generate timestamped filename
    let now = chrono::Local::now();
    let log_filename = format!("kestrel_{}.log", now.format("%Y%m%d_%H%M%S"));
    let log_file_path = log_dir.join(&log_filename);
    let log_path_str = log_file_path.to_string_lossy().to_string();

    let file_appender = RollingFileAppender::new(
        Rotation::NEVER, // One file per run
        &log_dir,
        &log_filename,
    );

    let file_layer = fmt::layer().with_writer(file_appender).with_ansi(false);

    let stdout_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(false);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("bevy_ecs=info,kestrel=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stdout_layer)
        .init();

    log_path_str
}

fn cleanup_old_logs(log_dir: &PathBuf, keep_count: usize) {
    if let Ok(entries) = fs::read_dir(log_dir) {
        let mut log_files: Vec<_> = entries
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.path()
                    .file_name()
                    .and_then(|n| n.to_str())
                    .map(|s| s.starts_with("kestrel") && s.ends_with(".log"))
                    .unwrap_or(false)
            })
            .collect();

        // Sort by modified time (oldest first)
        log_files.sort_by_key(|e| e.metadata().ok().and_then(|m| m.modified().ok()));

        if log_files.len() > keep_count {
            for file in log_files.iter().take(log_files.len() - keep_count) {
                let _ = fs::remove_file(file.path());
            }
        }
    }
}

/// Stand-in for the external rigid-body solver: integrate linear velocity
/// in a stable iteration order before the transform sync runs.
fn integrate_bodies(
    sim_config: Res<kestrel::sim::config::SimConfig>,
    mut bodies: Query<(Entity, &mut SimBody)>,
) {
    let delta = FixedNum::from_num(1.0) / FixedNum::from_num(sim_config.tick_rate);
    let mut bodies: Vec<_> = bodies.iter_mut().collect();
    bodies.sort_by_key(|(entity, _)| *entity);
    for (_, body) in bodies.iter_mut() {
        if body.linear_velocity.length_squared() > FixedNum::ZERO {
            body.position = body.position + body.linear_velocity * delta;
        }
    }
}

/// One headless lockstep peer with a seeded scene.
fn build_peer() -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.add_plugins(bevy::asset::AssetPlugin::default());
    app.add_plugins(SimPlugin);
    app.add_systems(
        FixedUpdate,
        integrate_bodies.before(kestrel::sim::transform::TransformSet::Sync),
    );
    app.insert_resource(SimulationActive(true));

    let mut rng = StdRng::seed_from_u64(DEMO_SEED);
    for i in 0..DEMO_BODIES {
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

    // One standalone parent/child pair to exercise the hierarchy path.
    let parent = app
        .world_mut()
        .spawn((Transform::IDENTITY, SimTransform::default()))
        .id();
    app.world_mut().spawn((
        Transform::from_xyz(1.0, 0.0, 0.0),
        SimTransform::default(),
        bevy::ecs::hierarchy::ChildOf(parent),
    ));

    app
}

fn main() {
    let log_file = setup_file_logging();
    info!("kestrel lockstep demo - logging to {}", log_file);

    // Two peers, identical input: their pose checksums must agree on
    // every step or the math is not deterministic.
    let mut peer_a = build_peer();
    let mut peer_b = build_peer();

    // Pause virtual time so the first update only fires Startup; stepping
    // happens by running FixedUpdate directly, decoupled from wall clock.
    for peer in [&mut peer_a, &mut peer_b] {
        peer.world_mut().resource_mut::<Time<Virtual>>().pause();
        peer.update();
    }

    let mut divergences = 0usize;
    for step in 0..DEMO_STEPS {
        peer_a.world_mut().run_schedule(FixedUpdate);
        peer_b.world_mut().run_schedule(FixedUpdate);

        let tick = peer_a.world().resource::<SimTick>().0;
        let checksum_a = PoseSnapshot::capture(peer_a.world_mut(), tick).checksum();
        let checksum_b = PoseSnapshot::capture(peer_b.world_mut(), tick).checksum();
        if checksum_a != checksum_b {
            divergences += 1;
            error!(
                "step {}: desync! {:#018x} vs {:#018x}",
                step, checksum_a, checksum_b
            );
        } else if step % 50 == 0 {
            info!("step {}: checksum {:#018x}", step, checksum_a);
        }
    }

    if divergences == 0 {
        info!("{} steps, peers agreed on every checksum", DEMO_STEPS);
    } else {
        error!("{} steps, {} divergent checksums", DEMO_STEPS, divergences);
    }
}
