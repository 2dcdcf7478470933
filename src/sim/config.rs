use bevy::prelude::*;
use bevy_common_assets::ron::RonAssetPlugin;
use serde::{Deserialize, Serialize};

/// Static configuration loaded once at startup. These values feed the
/// deterministic simulation, so changing them mid-game would desync
/// lockstep peers; they are read synchronously before the first step and
/// then left alone.
#[derive(Resource, Deserialize, Serialize, Clone, Debug)]
pub struct InitialConfig {
    /// Fixed steps per second.
    pub tick_rate: f64,
    /// Ancestor-walk bound for world-matrix composition.
    pub max_parent_depth: usize,
}

impl Default for InitialConfig {
    fn default() -> Self {
        Self {
            tick_rate: 30.0,
            max_parent_depth: 16,
        }
    }
}

/// Simulation configuration as the systems consume it.
///
/// Derived from [`InitialConfig`] exactly once at startup; the RON file is
/// the only place these values are authored.
#[derive(Resource, Clone, Debug)]
pub struct SimConfig {
    pub tick_rate: f64,
    pub max_parent_depth: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self::from_initial(&InitialConfig::default())
    }
}

impl SimConfig {
    pub fn from_initial(initial: &InitialConfig) -> Self {
        Self {
            tick_rate: initial.tick_rate,
            max_parent_depth: initial.max_parent_depth,
        }
    }
}

/// Render-side configuration, hot-reloadable during play.
///
/// Nothing here feeds the fixed-point simulation (these values only shape
/// how poses are blended into the host scene), so a reload can never
/// desync lockstep peers.
#[derive(Deserialize, Serialize, Asset, TypePath, Clone, Copy, Debug)]
pub struct RenderConfig {
    /// Blend factor per second toward the simulated pose.
    pub interpolation_rate: f32,
    /// Distance beyond which interpolation teleports instead of chasing.
    pub snap_distance: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            interpolation_rate: 12.0,
            snap_distance: 5.0,
        }
    }
}

#[derive(Resource)]
pub struct RenderConfigHandle(pub Handle<RenderConfig>);

pub struct SimConfigPlugin;

impl Plugin for SimConfigPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(RonAssetPlugin::<RenderConfig>::new(&["render_config.ron"]))
            .add_systems(Startup, (load_initial_config, setup_render_config).chain());
    }
}

/// Load static initial configuration synchronously at startup and derive
/// the fixed-point [`SimConfig`] plus the fixed timestep from it. Missing
/// or malformed files degrade to defaults with an error log rather than
/// aborting.
fn load_initial_config(mut commands: Commands) {
    let path = "assets/initial_config.ron";

    let initial = match std::fs::read_to_string(path) {
        Ok(contents) => match ron::from_str::<InitialConfig>(&contents) {
            Ok(config) => {
                info!("Loaded initial config from {}", path);
                config
            }
            Err(e) => {
                error!("Failed to parse initial config: {}", e);
                error!("Using default InitialConfig");
                InitialConfig::default()
            }
        },
        Err(e) => {
            error!("Failed to read {}: {}", path, e);
            error!("Using default InitialConfig");
            InitialConfig::default()
        }
    };

    commands.insert_resource(Time::<Fixed>::from_hz(initial.tick_rate));
    commands.insert_resource(SimConfig::from_initial(&initial));
    commands.insert_resource(initial);
}

/// Kick off the asynchronous (hot-reloadable) render config load.
fn setup_render_config(mut commands: Commands, asset_server: Res<AssetServer>) {
    let handle = asset_server.load("render_config.ron");
    commands.insert_resource(RenderConfigHandle(handle));
}
