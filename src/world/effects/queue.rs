//! Effect Update Queue
//!
//! The per-frame update pass over all live effect entities. Systems run
//! chained in a fixed order so fade always reflects the frame's final
//! opacity and eviction always happens after a removed entity's final
//! frame has been fully animated:
//!
//! 1. `process_fx_sequences` - fire due stages of self-scheduled choreography
//! 2. `shed_fx_load`        - shorten expiries when over the FPS ceiling
//! 3. `integrate_fx_particles` / `integrate_fx_projectiles` - motion
//! 4. (combat core applies projectile impacts here)
//! 5. `animate_fx_shapes`   - shockwave/scale/orbit/pulse/spin/follow
//! 6. `apply_fx_fades`      - FPS-coupled opacity decay
//! 7. `evict_expired_fx`    - dispose exactly once

use bevy::prelude::*;
use std::collections::HashSet;

use super::entity::*;
use super::primitives::FxContext;
use crate::world::components::{GameRng, SimClock};
use crate::world::perf::PerfGovernor;

/// Fraction of surviving entities whose expiry is also shortened when the
/// pool is over its ceiling, so pressure keeps draining gracefully.
const SHED_SOFT_FRACTION: f32 = 0.2;

/// Grace window given to soft-shed entities before they expire.
const SHED_SOFT_GRACE: f32 = 0.25;

/// Fire any choreography stages whose delay has elapsed, then self-dispose
/// finished sequence carriers. Stage timing is scheduled here, outside the
/// pool's per-entity expiry; the entities each stage spawns obey the normal
/// expiry/fade contract once created.
pub fn process_fx_sequences(
    clock: Res<SimClock>,
    mut commands: Commands,
    governor: Res<PerfGovernor>,
    mut rng: ResMut<GameRng>,
    mut sequences: Query<(Entity, &mut FxSequence)>,
) {
    let now = clock.now;
    for (entity, mut seq) in sequences.iter_mut() {
        while seq.next < seq.stages.len() {
            let stage = seq.stages[seq.next].clone();
            if now < seq.started_at + stage.delay {
                break;
            }
            seq.next += 1;

            let mut fx = FxContext {
                commands: &mut commands,
                governor: &governor,
                rng: &mut rng,
                now,
            };
            match stage.spec {
                FxStageSpec::Eruption { center, radius, intensity, color } => {
                    fx.impact_burst(center, radius, color, intensity);
                    fx.flash_sphere(center + Vec3::Y * 0.5, radius * 0.35, color, 0.4, 2.0);
                    fx.particle_burst(center, 10, color, 3.0);
                }
                FxStageSpec::Flash { center, radius, color } => {
                    fx.flash_sphere(center, radius, color, 0.35, 1.5);
                }
                FxStageSpec::RingBlast { center, radius, color } => {
                    fx.ring(center, radius * 0.4, color, 0.6, Some(radius));
                }
            }
        }

        if seq.next >= seq.stages.len() {
            commands.entity(entity).despawn();
        }
    }
}

/// Load shedding: when the live count exceeds the FPS-derived ceiling,
/// the oldest overflow entities get their expiry shortened to *now* (they
/// still receive this frame's full animation before eviction), and a
/// further fraction of the survivors is shortened to a short grace window
/// so the pool keeps draining. Expiries are only ever shortened.
pub fn shed_fx_load(
    clock: Res<SimClock>,
    governor: Res<PerfGovernor>,
    mut stats: ResMut<FxStats>,
    mut effects: Query<(Entity, &mut FxLifetime)>,
) {
    let live = effects.iter().count();
    let ceiling = governor.fx_ceiling();
    if live <= ceiling {
        return;
    }

    let mut by_age: Vec<(Entity, f32)> = effects
        .iter()
        .map(|(entity, life)| (entity, life.spawned_at))
        .collect();
    by_age.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap());

    let overflow = live - ceiling;
    let soft = ((live as f32) * SHED_SOFT_FRACTION) as usize;
    let hard_set: HashSet<Entity> = by_age.iter().take(overflow).map(|(e, _)| *e).collect();
    let soft_set: HashSet<Entity> = by_age
        .iter()
        .skip(overflow)
        .take(soft)
        .map(|(e, _)| *e)
        .collect();

    let mut shed = 0u64;
    for (entity, mut life) in effects.iter_mut() {
        if hard_set.contains(&entity) {
            life.shorten_to(clock.now);
            shed += 1;
        } else if soft_set.contains(&entity) {
            life.shorten_to(clock.now + SHED_SOFT_GRACE);
            shed += 1;
        }
    }
    stats.shed_total += shed;
    debug!(
        "fx load shed: {} live over ceiling {}, shortened {}",
        live, ceiling, shed
    );
}

/// Integrate free-particle and drift motion.
pub fn integrate_fx_particles(
    clock: Res<SimClock>,
    mut effects: Query<(&mut FxModifiers, &mut Transform)>,
) {
    let dt = clock.delta;
    for (mut modifiers, mut transform) in effects.iter_mut() {
        for modifier in modifiers.0.iter_mut() {
            match modifier {
                FxModifier::Particle { velocity, gravity } => {
                    velocity.y -= *gravity * dt;
                    transform.translation += *velocity * dt;
                }
                FxModifier::VerticalDrift { rate } => {
                    transform.translation.y += *rate * dt;
                }
                _ => {}
            }
        }
    }
}

/// Advance projectiles along their travel window and emit the impact
/// payload exactly once on arrival.
pub fn integrate_fx_projectiles(
    clock: Res<SimClock>,
    mut commands: Commands,
    governor: Res<PerfGovernor>,
    mut rng: ResMut<GameRng>,
    mut impacts: EventWriter<ProjectileImpactEvent>,
    mut projectiles: Query<(&mut FxProjectile, &mut Transform, &mut FxLifetime, &FxShape)>,
) {
    let dt = clock.delta;
    let now = clock.now;

    for (mut proj, mut transform, mut life, shape) in projectiles.iter_mut() {
        proj.elapsed += dt;
        let progress = proj.progress();

        let span = proj.to - proj.from;
        let side = span.cross(Vec3::Y).normalize_or_zero();
        // Envelope zeroes the wobble at both endpoints so the projectile
        // leaves and lands exactly on its anchors.
        let wobble = side
            * (progress * std::f32::consts::TAU * proj.wobble_rate).sin()
            * proj.wobble_amplitude
            * (progress * std::f32::consts::PI).sin();
        let pos = proj.from.lerp(proj.to, progress) + wobble;

        if proj.trail {
            proj.trail_accum += dt;
            if proj.trail_accum >= 0.07 {
                proj.trail_accum = 0.0;
                if governor.should_spawn_vfx(crate::world::perf::FxKind::TrailBeam, pos) {
                    let color = match shape {
                        FxShape::Bolt { color, .. } => *color,
                        _ => Color::WHITE,
                    };
                    let back = (proj.from - proj.to).normalize_or_zero();
                    let mut fx = FxContext {
                        commands: &mut commands,
                        governor: &governor,
                        rng: &mut rng,
                        now,
                    };
                    fx.beam(pos + back * 0.9, pos, 0.05, color, 0.18);
                }
            }
        }

        transform.translation = pos;

        if progress >= 1.0 {
            transform.translation = proj.to;
            // The payload is taken exactly once; later frames see None.
            if let Some(payload) = proj.payload.take() {
                impacts.send(ProjectileImpactEvent { point: proj.to, payload });
            }
            life.shorten_to(now);
        }
    }
}

/// Shape-specific animation: shockwave expansion, scale rates, orbiting,
/// pulsing, spinning, and owner following.
pub fn animate_fx_shapes(
    clock: Res<SimClock>,
    mut effects: Query<(&FxModifiers, &mut Transform, Option<&FxLifetime>)>,
    owners: Query<&Transform, Without<FxModifiers>>,
) {
    let dt = clock.delta;
    let now = clock.now;

    for (modifiers, mut transform, life) in effects.iter_mut() {
        for modifier in modifiers.0.iter() {
            match *modifier {
                FxModifier::ScaleRate { per_sec } => {
                    transform.scale += Vec3::splat(per_sec * dt);
                }
                FxModifier::Shockwave { start_radius, end_radius, duration } => {
                    let Some(life) = life else { continue };
                    let t = ((now - life.spawned_at) / duration.max(0.05)).clamp(0.0, 1.0);
                    let radius = start_radius + (end_radius - start_radius) * t;
                    transform.scale = Vec3::splat(radius / start_radius.max(0.01));
                }
                FxModifier::Pulse { base_scale, amplitude, rate } => {
                    transform.scale = Vec3::splat(base_scale * (1.0 + amplitude * (now * rate).sin()));
                }
                FxModifier::Spin { rate } => {
                    transform.rotation = Quat::from_rotation_y(rate * dt) * transform.rotation;
                }
                FxModifier::Orbit { radius, rate, phase } => {
                    let angle = now * rate + phase;
                    transform.translation.x = angle.cos() * radius;
                    transform.translation.z = angle.sin() * radius;
                }
                FxModifier::Follow { owner, offset } => {
                    if let Ok(owner_transform) = owners.get(owner) {
                        transform.translation = owner_transform.translation + offset;
                    }
                }
                _ => {}
            }
        }
    }
}

/// Opacity decay, scaled up when the frame rate drops so low-end devices
/// don't accumulate stale effects. Runs after shape animation so fade
/// reflects the frame's final state.
pub fn apply_fx_fades(
    clock: Res<SimClock>,
    governor: Res<PerfGovernor>,
    mut effects: Query<(&FxModifiers, &mut FxFade)>,
) {
    let dt = clock.delta;
    let boost = governor.fade_boost();

    for (modifiers, mut fade) in effects.iter_mut() {
        for modifier in modifiers.0.iter() {
            if let FxModifier::Fade { rate } = *modifier {
                fade.alpha = (fade.alpha - rate * boost * dt).clamp(0.0, 1.0);
            }
        }
    }
}

/// Evict and dispose every entity whose expiry has been reached. Disposal
/// releases the renderable hierarchy exactly once; an entity is never
/// updated again after this pass removes it.
pub fn evict_expired_fx(
    clock: Res<SimClock>,
    mut commands: Commands,
    mut stats: ResMut<FxStats>,
    effects: Query<(Entity, &FxLifetime)>,
) {
    let mut total = 0usize;
    let mut evicted = 0usize;
    for (entity, life) in effects.iter() {
        total += 1;
        if life.expires_at <= clock.now {
            commands.entity(entity).despawn_recursive();
            evicted += 1;
            stats.disposed_total += 1;
        }
    }
    stats.live = total - evicted;
}
