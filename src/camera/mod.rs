//! Camera system
//!
//! Follow camera for the graphical shell: tracks the player from an
//! elevated chase position with mouse-wheel and keyboard zoom. Also
//! feeds the camera position to the performance governor each frame for
//! effect distance culling.

use bevy::input::mouse::MouseWheel;
use bevy::prelude::*;

use crate::keybindings::{GameAction, Keybindings};
use crate::world::components::Player;
use crate::world::perf::PerfGovernor;
use crate::world::systems::FramePhase;

/// Marker for the world camera.
#[derive(Component)]
pub struct WorldCamera;

/// Global camera settings
#[derive(Resource)]
pub struct CameraSettings {
    /// Current zoom level (distance from the player)
    pub zoom: f32,
    pub zoom_min: f32,
    pub zoom_max: f32,
    /// Camera movement smoothing factor
    pub smoothing: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            zoom: 26.0,
            zoom_min: 10.0,
            zoom_max: 48.0,
            smoothing: 0.12,
        }
    }
}

/// Plugin for camera management
pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CameraSettings>()
            .add_systems(Startup, spawn_camera)
            .add_systems(
                Update,
                (camera_zoom, follow_player, sync_governor_camera)
                    .chain()
                    .in_set(FramePhase::CameraFollow),
            );
    }
}

fn spawn_camera(mut commands: Commands) {
    commands.spawn((
        Camera3d::default(),
        Transform::from_xyz(-20.0, 24.0, -20.0).looking_at(Vec3::ZERO, Vec3::Y),
        WorldCamera,
    ));
}

/// Mouse wheel and bound keys adjust the zoom distance.
fn camera_zoom(
    mut settings: ResMut<CameraSettings>,
    keys: Res<ButtonInput<KeyCode>>,
    bindings: Res<Keybindings>,
    mut wheel: EventReader<MouseWheel>,
) {
    for event in wheel.read() {
        settings.zoom -= event.y * 2.0;
    }
    if keys.pressed(bindings.key_for(GameAction::CameraZoomIn)) {
        settings.zoom -= 0.5;
    }
    if keys.pressed(bindings.key_for(GameAction::CameraZoomOut)) {
        settings.zoom += 0.5;
    }
    settings.zoom = settings.zoom.clamp(settings.zoom_min, settings.zoom_max);
}

/// Chase the player from behind-and-above, smoothed.
fn follow_player(
    settings: Res<CameraSettings>,
    player: Query<&Transform, (With<Player>, Without<WorldCamera>)>,
    mut camera: Query<&mut Transform, With<WorldCamera>>,
) {
    let Ok(player_transform) = player.get_single() else {
        return;
    };
    let Ok(mut camera_transform) = camera.get_single_mut() else {
        return;
    };

    let target = player_transform.translation;
    let desired = target + Vec3::new(0.0, settings.zoom * 0.9, -settings.zoom * 0.7);
    camera_transform.translation = camera_transform
        .translation
        .lerp(desired, settings.smoothing);
    camera_transform.look_at(target + Vec3::Y * 1.0, Vec3::Y);
}

/// The governor culls far-away effect spawns against this position.
fn sync_governor_camera(
    mut governor: ResMut<PerfGovernor>,
    camera: Query<&Transform, With<WorldCamera>>,
) {
    if let Ok(transform) = camera.get_single() {
        governor.camera_pos = transform.translation;
    }
}
