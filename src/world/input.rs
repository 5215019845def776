//! Input Resolution (graphical mode)
//!
//! Translates raw keyboard/mouse input into the core's command events.
//! Mouse clicks are resolved into hit-test results here - the combat core
//! never performs its own ray intersection; it only consumes the resolved
//! `{enemy | ground}` outcome.

use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use crate::combat::events::{CastCommand, HitKind, HitTestEvent};
use crate::keybindings::{GameAction, Keybindings};
use crate::world::components::{Enemy, Player, Vitals};
use crate::world::skills::types::AbilityKey;

/// Radius around a click point within which an enemy counts as clicked.
const CLICK_PICK_RADIUS: f32 = 1.6;

/// Skill-slot keys fire cast commands with no explicit point; the combat
/// core auto-aims from there.
pub fn keyboard_casts(
    keys: Res<ButtonInput<KeyCode>>,
    bindings: Res<Keybindings>,
    mut casts: EventWriter<CastCommand>,
) {
    let slots = [
        (GameAction::CastSlot1, AbilityKey::Slot1),
        (GameAction::CastSlot2, AbilityKey::Slot2),
        (GameAction::CastSlot3, AbilityKey::Slot3),
        (GameAction::CastSlot4, AbilityKey::Slot4),
    ];
    for (action, key) in slots {
        if keys.just_pressed(bindings.key_for(action)) {
            casts.send(CastCommand { key, point: None });
        }
    }
}

/// Resolve left clicks against the world: an alive enemy near the ray's
/// ground intersection yields an enemy hit, anything else a ground hit.
pub fn mouse_hit_tests(
    buttons: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    cameras: Query<(&Camera, &GlobalTransform)>,
    enemies: Query<(Entity, &Transform, &Vitals), (With<Enemy>, Without<Player>)>,
    mut hits: EventWriter<HitTestEvent>,
) {
    if !buttons.just_pressed(MouseButton::Left) {
        return;
    }
    let Ok(window) = windows.get_single() else {
        return;
    };
    let Some(cursor) = window.cursor_position() else {
        return;
    };
    let Ok((camera, camera_transform)) = cameras.get_single() else {
        return;
    };
    let Ok(ray) = camera.viewport_to_world(camera_transform, cursor) else {
        return;
    };

    // Intersect the ground plane (y = 0).
    let denom = ray.direction.y;
    if denom.abs() < 1e-4 {
        return;
    }
    let t = -ray.origin.y / denom;
    if t <= 0.0 {
        return;
    }
    let point = ray.origin + ray.direction * t;

    let clicked_enemy = enemies
        .iter()
        .filter(|(_, _, vitals)| vitals.is_alive())
        .map(|(entity, transform, _)| {
            let p = transform.translation;
            (entity, Vec3::new(p.x - point.x, 0.0, p.z - point.z).length())
        })
        .filter(|(_, d)| *d <= CLICK_PICK_RADIUS)
        .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap())
        .map(|(entity, _)| entity);

    match clicked_enemy {
        Some(enemy) => hits.send(HitTestEvent {
            kind: HitKind::Enemy,
            enemy: Some(enemy),
            point: Some(point),
        }),
        None => hits.send(HitTestEvent {
            kind: HitKind::Ground,
            enemy: None,
            point: Some(point),
        }),
    };
}
