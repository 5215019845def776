//! Scene & Effect Rendering (graphical mode)
//!
//! Attaches meshes and materials to logic entities after they spawn
//! (`Added<..>` queries, so the simulation itself stays headless-safe)
//! and keeps effect material opacity in sync with the fade pass. The
//! simulation treats all of this as an opaque collaborator.

use bevy::color::LinearRgba;
use bevy::prelude::*;

use crate::world::components::{Enemy, Player, Vitals};
use crate::world::effects::entity::{FxFade, FxShape};
use crate::world::zones::VillageMap;

/// Marker inserted once an actor's visual hierarchy has been attached.
#[derive(Component)]
struct VisualAttached;

/// Plugin for world and effect rendering.
pub struct RenderingPlugin;

impl Plugin for RenderingPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, setup_world_scene)
            .add_systems(
                Update,
                (attach_actor_visuals, attach_fx_visuals, sync_fx_alpha),
            );
    }
}

/// Ground plane, lighting, and village ground decals.
fn setup_world_scene(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    villages: Res<VillageMap>,
) {
    commands.spawn((
        DirectionalLight {
            illuminance: 18000.0,
            shadows_enabled: false,
            ..default()
        },
        Transform::from_xyz(30.0, 60.0, 30.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    let ground = meshes.add(Plane3d::default().mesh().size(130.0, 130.0));
    let ground_material = materials.add(StandardMaterial {
        base_color: Color::srgb(0.16, 0.2, 0.16),
        perceptual_roughness: 1.0,
        ..default()
    });
    commands.spawn((Mesh3d(ground), MeshMaterial3d(ground_material)));

    // Village boundary rings.
    for village in &villages.villages {
        let ring = meshes.add(Torus {
            minor_radius: 0.2,
            major_radius: village.radius,
        });
        let ring_material = materials.add(StandardMaterial {
            base_color: Color::srgba(0.9, 0.85, 0.5, 0.8),
            emissive: LinearRgba::rgb(1.2, 1.0, 0.4),
            ..default()
        });
        commands.spawn((
            Mesh3d(ring),
            MeshMaterial3d(ring_material),
            Transform::from_translation(village.center + Vec3::Y * 0.05),
        ));
    }
}

/// Give newly spawned actors a capsule body.
fn attach_actor_visuals(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    actors: Query<(Entity, Option<&Player>, Option<&Enemy>), (Added<Vitals>, Without<VisualAttached>)>,
) {
    for (entity, player, enemy) in actors.iter() {
        let color = if player.is_some() {
            Color::srgb(0.3, 0.55, 0.95)
        } else if enemy.is_some() {
            Color::srgb(0.8, 0.25, 0.2)
        } else {
            Color::srgb(0.6, 0.6, 0.6)
        };

        let mesh = meshes.add(Capsule3d::new(0.45, 1.1));
        let material = materials.add(StandardMaterial {
            base_color: color,
            ..default()
        });

        commands.entity(entity).try_insert(VisualAttached);
        let body = commands
            .spawn((
                Mesh3d(mesh),
                MeshMaterial3d(material),
                Transform::from_xyz(0.0, 1.0, 0.0),
            ))
            .id();
        commands.entity(entity).add_child(body);
    }
}

fn fx_material(color: Color, additive: bool) -> StandardMaterial {
    StandardMaterial {
        base_color: color.with_alpha(0.85),
        emissive: color.to_linear() * 2.0,
        alpha_mode: if additive { AlphaMode::Add } else { AlphaMode::Blend },
        ..default()
    }
}

/// Mesh in world space connecting two points, in the cylinder-as-beam
/// style: positioned at the midpoint, scaled to the span, rotated from Y.
fn beam_transform(from: Vec3, to: Vec3) -> Transform {
    let span = to - from;
    let length = span.length().max(0.01);
    Transform {
        translation: (from + to) / 2.0,
        rotation: Quat::from_rotation_arc(Vec3::Y, span.normalize_or_zero()),
        scale: Vec3::new(1.0, length, 1.0),
    }
}

/// Attach meshes/materials to newly enqueued effect entities.
fn attach_fx_visuals(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    effects: Query<(Entity, &FxShape), (Added<FxShape>, Without<Mesh3d>)>,
) {
    for (entity, shape) in effects.iter() {
        match shape {
            FxShape::Beam { from, to, width, color } => {
                let mesh = meshes.add(Cylinder::new(*width, 1.0));
                let material = materials.add(fx_material(*color, false));
                commands.entity(entity).try_insert((
                    Mesh3d(mesh),
                    MeshMaterial3d(material),
                    beam_transform(*from, *to),
                ));
            }
            FxShape::Arc { points, width, color } => {
                // One segment mesh per pair of consecutive points.
                for pair in points.windows(2) {
                    let mesh = meshes.add(Cylinder::new(*width, 1.0));
                    let material = materials.add(fx_material(*color, false));
                    let segment = commands
                        .spawn((
                            Mesh3d(mesh),
                            MeshMaterial3d(material),
                            beam_transform(pair[0], pair[1]),
                        ))
                        .id();
                    commands.entity(entity).add_child(segment);
                }
            }
            FxShape::Pillar { height, radius, color } => {
                let mesh = meshes.add(Cylinder::new(*radius, *height));
                let material = materials.add(fx_material(*color, false));
                commands
                    .entity(entity)
                    .try_insert((Mesh3d(mesh), MeshMaterial3d(material)));
            }
            FxShape::Ring { radius, color } => {
                let mesh = meshes.add(Torus {
                    minor_radius: 0.12,
                    major_radius: *radius,
                });
                let material = materials.add(fx_material(*color, false));
                commands
                    .entity(entity)
                    .try_insert((Mesh3d(mesh), MeshMaterial3d(material)));
            }
            FxShape::Sphere { radius, color } | FxShape::Bolt { radius, color } | FxShape::Orb { radius, color } => {
                let mesh = meshes.add(Sphere::new(*radius));
                let material = materials.add(fx_material(*color, false));
                commands
                    .entity(entity)
                    .try_insert((Mesh3d(mesh), MeshMaterial3d(material)));
            }
            FxShape::Shield { radius, color } => {
                let mesh = meshes.add(Sphere::new(*radius));
                let material = materials.add(fx_material(*color, true));
                commands
                    .entity(entity)
                    .try_insert((Mesh3d(mesh), MeshMaterial3d(material)));
            }
            // Popups are drawn by the HUD overlay, not the 3D scene.
            FxShape::Popup { .. } => {}
        }
    }
}

/// Push fade alpha into the effect materials, including one level of
/// children (arc segments, cage bars, orbiting orbs).
fn sync_fx_alpha(
    faded: Query<(&FxFade, Option<&MeshMaterial3d<StandardMaterial>>, Option<&Children>), Changed<FxFade>>,
    child_materials: Query<&MeshMaterial3d<StandardMaterial>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    for (fade, own_material, children) in faded.iter() {
        let alpha = fade.alpha * 0.85;
        if let Some(handle) = own_material {
            if let Some(material) = materials.get_mut(&handle.0) {
                material.base_color = material.base_color.with_alpha(alpha);
            }
        }
        if let Some(children) = children {
            for child in children.iter() {
                if let Ok(handle) = child_materials.get(*child) {
                    if let Some(material) = materials.get_mut(&handle.0) {
                        material.base_color = material.base_color.with_alpha(alpha);
                    }
                }
            }
        }
    }
}
