use bevy::prelude::*;
use std::env;
use std::path::PathBuf;

use track_engine::{
    divide, extrude, profile_preview, smooth_uniform, Path as TrackPath, TrackBuilder, TrackConfig, TrackMesh,
};

mod track_mesh;

use track_mesh::{to_bevy_mesh, ProfilePreviewMarker, TrackMeshMarker};

/// Passes applied by the "smooth path" shortcut.
const SMOOTH_PATH_PASSES: usize = 3;
/// Length of the straight strip showing the cross-section.
const PREVIEW_LENGTH: f32 = 8.0;

#[derive(Resource)]
struct EditorState {
    config_path: Option<PathBuf>,
    config: TrackConfig,
    path: TrackPath,
    mesh: TrackMesh,
    /// Suffix appended to the seed string on regeneration.
    reroll: u32,
    show_preview: bool,
    dirty: bool,
}

impl EditorState {
    fn new(config_path: Option<PathBuf>, config: TrackConfig) -> Self {
        Self {
            config_path,
            config,
            path: TrackPath::new(),
            mesh: TrackMesh::default(),
            reroll: 0,
            show_preview: false,
            dirty: false,
        }
    }

    fn regenerate(&mut self) {
        let mut config = self.config.clone();
        if self.reroll > 0 {
            config.generator.seed = format!("{}#{}", config.generator.seed, self.reroll);
        }
        match TrackBuilder::new(config).build() {
            Ok(track) => {
                info!("Track path has {} waypoints", track.path.len());
                if let Some(report) = track.smoothing {
                    info!("Intersection smoothing: {} passes, converged: {}", report.passes, report.converged);
                }
                self.path = track.path;
                self.mesh = track.mesh;
                self.dirty = true;
            }
            Err(e) => error!("Failed to generate track: {e}"),
        }
    }

    /// Re-extrudes after an in-place path edit.
    fn edited(&mut self) {
        self.mesh = extrude(&self.path, &self.config.profile(), self.config.extrude.uv_mode());
        self.dirty = true;
    }

    fn reload(&mut self) {
        let Some(path) = self.config_path.clone() else {
            warn!("No config file given, keeping defaults");
            return;
        };
        match TrackConfig::load(&path) {
            Ok(config) => {
                self.config = config;
                self.reroll = 0;
                self.regenerate();
            }
            Err(e) => error!("Failed to reload {}: {e}", path.display()),
        }
    }
}

fn setup_scene(mut commands: Commands, mut state: ResMut<EditorState>) {
    commands.spawn(Camera3dBundle {
        transform: Transform::from_xyz(0.0, 120.0, 160.0).looking_at(Vec3::ZERO, Vec3::Y),
        ..default()
    });
    commands.spawn(DirectionalLightBundle {
        directional_light: DirectionalLight { illuminance: 10_000.0, ..default() },
        transform: Transform::from_xyz(50.0, 100.0, 30.0).looking_at(Vec3::ZERO, Vec3::Y),
        ..default()
    });
    state.regenerate();
}

fn handle_keys(keys: Res<Input<KeyCode>>, mut state: ResMut<EditorState>) {
    if keys.just_pressed(KeyCode::R) {
        state.reroll += 1;
        state.regenerate();
    }
    if keys.just_pressed(KeyCode::S) {
        state.config.smooth_intersections = !state.config.smooth_intersections;
        info!("Intersection smoothing {}", if state.config.smooth_intersections { "on" } else { "off" });
        state.regenerate();
    }
    if keys.just_pressed(KeyCode::D) {
        divide(&mut state.path);
        info!("Divided path into {} waypoints", state.path.len());
        state.edited();
    }
    if keys.just_pressed(KeyCode::U) {
        smooth_uniform(&mut state.path, SMOOTH_PATH_PASSES);
        state.edited();
    }
    if keys.just_pressed(KeyCode::L) {
        state.reload();
    }
    if keys.just_pressed(KeyCode::P) {
        state.show_preview = !state.show_preview;
        state.dirty = true;
    }
}

fn rebuild_mesh(
    mut commands: Commands,
    mut state: ResMut<EditorState>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    existing: Query<Entity, Or<(With<TrackMeshMarker>, With<ProfilePreviewMarker>)>>,
) {
    if !state.dirty {
        return;
    }
    state.dirty = false;

    for entity in existing.iter() {
        commands.entity(entity).despawn();
    }
    let material = materials.add(StandardMaterial {
        base_color: Color::rgb(0.32, 0.32, 0.36),
        perceptual_roughness: 0.9,
        cull_mode: None,
        double_sided: true,
        ..default()
    });
    commands.spawn((
        PbrBundle { mesh: meshes.add(to_bevy_mesh(&state.mesh)), material: material.clone(), ..default() },
        TrackMeshMarker,
    ));
    info!("Track mesh: {} vertices, {} triangles", state.mesh.vertex_count(), state.mesh.triangle_count());

    if state.show_preview {
        let preview = profile_preview(&state.config.profile(), PREVIEW_LENGTH);
        commands.spawn((
            PbrBundle {
                mesh: meshes.add(to_bevy_mesh(&preview)),
                material,
                transform: Transform::from_xyz(0.0, 20.0, 0.0).with_scale(Vec3::splat(4.0)),
                ..default()
            },
            ProfilePreviewMarker,
        ));
    }
}

fn main() -> anyhow::Result<()> {
    let config_path = env::args().nth(1).map(PathBuf::from);
    let config = match &config_path {
        Some(path) => TrackConfig::load(path)?,
        None => TrackConfig::default(),
    };

    App::new()
        .insert_resource(ClearColor(Color::rgb(0.53, 0.81, 0.92)))
        .insert_resource(EditorState::new(config_path, config))
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Track Editor".into(),
                resolution: (1280.0, 720.0).into(),
                resizable: true,
                ..default()
            }),
            ..default()
        }))
        .add_systems(Startup, setup_scene)
        .add_systems(Update, (handle_keys, rebuild_mesh).chain())
        .run();
    Ok(())
}
